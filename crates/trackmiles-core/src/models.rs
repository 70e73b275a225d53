//! Core data models shared between the engine and its traffic source.

use serde::{Deserialize, Deserializer, Serialize};

use crate::geo;

/// A route point flown by (flyby), with optional speed/altitude constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Calibrated airspeed constraint (m/s)
    #[serde(default, deserialize_with = "constraint")]
    pub speed_constraint_cas_mps: Option<f64>,
    /// Altitude constraint (m)
    #[serde(default, deserialize_with = "constraint")]
    pub altitude_constraint_m: Option<f64>,
}

impl Waypoint {
    /// Create an unconstrained waypoint.
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            speed_constraint_cas_mps: None,
            altitude_constraint_m: None,
        }
    }

    /// Attach speed (CAS, m/s) and altitude (m) constraints.
    pub fn with_constraints(mut self, cas_mps: Option<f64>, altitude_m: Option<f64>) -> Self {
        self.speed_constraint_cas_mps = cas_mps.filter(|v| *v >= 0.0);
        self.altitude_constraint_m = altitude_m.filter(|v| *v >= 0.0);
        self
    }
}

/// Legacy route files mark "unconstrained" with a negative number (usually -999).
fn constraint<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite() && *v >= 0.0))
}

/// Ordered waypoints of one aircraft plus the index of the one to be reached next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<Waypoint>,
    active: Option<usize>,
}

impl Route {
    /// Build a route with the first waypoint active.
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        let active = if waypoints.is_empty() { None } else { Some(0) };
        Self { waypoints, active }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Index of the waypoint to be reached next, `None` when exhausted.
    pub fn active_index(&self) -> Option<usize> {
        self.active.filter(|&i| i < self.waypoints.len())
    }

    pub fn active_waypoint(&self) -> Option<&Waypoint> {
        self.active_index().map(|i| &self.waypoints[i])
    }

    /// Make `index` the active waypoint. Out of range exhausts the route.
    pub fn set_active(&mut self, index: usize) {
        self.active = (index < self.waypoints.len()).then_some(index);
    }

    /// Sequence to the next waypoint. Returns the new active index.
    pub fn advance(&mut self) -> Option<usize> {
        if let Some(i) = self.active {
            self.set_active(i + 1);
        }
        self.active
    }

    /// Course of the leg leaving waypoint `index`, `None` for the last one.
    pub fn leg_course(&self, index: usize) -> Option<f64> {
        let from = self.waypoints.get(index)?;
        let to = self.waypoints.get(index + 1)?;
        Some(geo::bearing_deg(from.lat, from.lon, to.lat, to.lon))
    }

    /// Active waypoint in the shape the engine consumes it.
    pub fn active_leg(&self) -> Option<ActiveWaypoint> {
        let index = self.active_index()?;
        let wp = &self.waypoints[index];
        Some(ActiveWaypoint {
            lat: wp.lat,
            lon: wp.lon,
            next_course_deg: self.leg_course(index),
            speed_constraint_cas_mps: wp.speed_constraint_cas_mps,
            altitude_constraint_m: wp.altitude_constraint_m,
        })
    }
}

/// The waypoint an aircraft is currently flying to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveWaypoint {
    pub lat: f64,
    pub lon: f64,
    /// Course flown after passing the waypoint; `None` at the end of the route
    pub next_course_deg: Option<f64>,
    pub speed_constraint_cas_mps: Option<f64>,
    pub altitude_constraint_m: Option<f64>,
}

/// Kinematic state of one aircraft as seen at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AircraftKinematics {
    pub lat: f64,
    pub lon: f64,
    /// True heading (degrees)
    pub heading_deg: f64,
    pub tas_mps: f64,
    pub gs_mps: f64,
    pub altitude_m: f64,
    /// Cumulative ground distance flown since creation (m)
    pub distance_flown_m: f64,
    /// Autopilot is steering along the route
    pub lnav_engaged: bool,
    pub active_waypoint: Option<ActiveWaypoint>,
}

/// Read-only view of the traffic the engine estimates for.
///
/// Indices are the simulator's aircraft slots; they stay stable between
/// `on_aircraft_created` / `on_aircraft_removed` notifications.
pub trait TrafficSource {
    /// Number of aircraft currently in the simulation.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kinematics(&self, index: usize) -> Option<AircraftKinematics>;

    fn route(&self, index: usize) -> Option<&Route>;

    /// Arrival or stack name assigned to the aircraft, if any.
    fn arrival(&self, _index: usize) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_route_activates_first_waypoint() {
        let route = Route::new(vec![Waypoint::new("A", 52.0, 4.0), Waypoint::new("B", 52.1, 4.0)]);
        assert_eq!(route.active_index(), Some(0));
        assert!(Route::new(Vec::new()).active_index().is_none());
    }

    #[test]
    fn advance_exhausts_route_after_last_waypoint() {
        let mut route =
            Route::new(vec![Waypoint::new("A", 52.0, 4.0), Waypoint::new("B", 52.1, 4.0)]);
        assert_eq!(route.advance(), Some(1));
        assert_eq!(route.advance(), None);
        assert_eq!(route.advance(), None);
        assert!(route.active_leg().is_none());
    }

    #[test]
    fn last_waypoint_has_no_next_course() {
        let mut route =
            Route::new(vec![Waypoint::new("A", 52.0, 4.0), Waypoint::new("B", 53.0, 4.0)]);
        let leg = route.active_leg().unwrap();
        assert!(leg.next_course_deg.unwrap().abs() < 1e-6);
        route.advance();
        assert!(route.active_leg().unwrap().next_course_deg.is_none());
    }

    #[test]
    fn negative_constraints_deserialize_as_unconstrained() {
        let wp: Waypoint = serde_json::from_str(
            r#"{"name":"ARTIP","lat":52.51,"lon":5.57,"speed_constraint_cas_mps":-999.0,"altitude_constraint_m":3048.0}"#,
        )
        .unwrap();
        assert!(wp.speed_constraint_cas_mps.is_none());
        assert_eq!(wp.altitude_constraint_m, Some(3048.0));
    }
}
