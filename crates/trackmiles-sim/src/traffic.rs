//! Minimal point-mass traffic flying flyby routes.

use trackmiles_core::aero::G0;
use trackmiles_core::{calc_turn, geo, AircraftKinematics, Route, TrafficSource};

/// One simulated aircraft. Ground speed equals true airspeed (no wind).
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub callsign: String,
    pub lat: f64,
    pub lon: f64,
    pub heading_deg: f64,
    pub tas_mps: f64,
    pub altitude_m: f64,
    pub distance_flown_m: f64,
    pub lnav_engaged: bool,
    /// Heading flown while lnav is off
    pub selected_heading_deg: f64,
    pub route: Route,
    pub arrival: Option<String>,
}

impl Aircraft {
    /// Aircraft on lnav, heading for the first waypoint of `route`.
    pub fn new(
        callsign: impl Into<String>,
        lat: f64,
        lon: f64,
        tas_mps: f64,
        altitude_m: f64,
        route: Route,
    ) -> Self {
        let heading_deg = route
            .active_waypoint()
            .map(|wp| geo::bearing_deg(lat, lon, wp.lat, wp.lon))
            .unwrap_or(0.0);
        Self {
            callsign: callsign.into(),
            lat,
            lon,
            heading_deg,
            tas_mps,
            altitude_m,
            distance_flown_m: 0.0,
            lnav_engaged: true,
            selected_heading_deg: heading_deg,
            route,
            arrival: None,
        }
    }

    pub fn with_arrival(mut self, arrival: impl Into<String>) -> Self {
        self.arrival = Some(arrival.into());
        self
    }

    pub fn kinematics(&self) -> AircraftKinematics {
        AircraftKinematics {
            lat: self.lat,
            lon: self.lon,
            heading_deg: self.heading_deg,
            tas_mps: self.tas_mps,
            gs_mps: self.tas_mps,
            altitude_m: self.altitude_m,
            distance_flown_m: self.distance_flown_m,
            lnav_engaged: self.lnav_engaged,
            active_waypoint: self.route.active_leg(),
        }
    }

    /// Route flown to the end.
    pub fn is_finished(&self) -> bool {
        self.route.active_index().is_none()
    }

    fn step(&mut self, dt: f64, bank_rad: f64) {
        let target = if self.lnav_engaged {
            self.lnav_target(dt, bank_rad)
        } else {
            Some(self.selected_heading_deg)
        };

        if let Some(target) = target {
            let max_rate_deg = (G0 * bank_rad.tan() / self.tas_mps.max(1.0)).to_degrees();
            let max_change = max_rate_deg * dt;
            let change = geo::wrap180(target - self.heading_deg).clamp(-max_change, max_change);
            self.heading_deg = geo::wrap360(self.heading_deg + change);
        }

        let step_m = self.tas_mps * dt;
        let (lat, lon) = geo::offset_by_bearing(self.lat, self.lon, step_m, self.heading_deg);
        self.lat = lat;
        self.lon = lon;
        self.distance_flown_m += step_m;
    }

    /// Heading to steer on lnav, sequencing flyby waypoints on the way.
    fn lnav_target(&mut self, dt: f64, bank_rad: f64) -> Option<f64> {
        let leg = self.route.active_leg()?;
        let (qdr, dist_nm) = geo::qdr_dist(self.lat, self.lon, leg.lat, leg.lon);

        let turn_start_m = leg
            .next_course_deg
            .map(|next| calc_turn(self.tas_mps, bank_rad, qdr, next, None).distance_m)
            .unwrap_or(0.0);

        if dist_nm * trackmiles_core::aero::NM <= turn_start_m.max(self.tas_mps * dt) {
            self.route.advance();
            let next = self.route.active_waypoint()?;
            return Some(geo::bearing_deg(self.lat, self.lon, next.lat, next.lon));
        }
        Some(qdr)
    }
}

/// The simulated traffic, indexed by creation order.
pub struct Traffic {
    aircraft: Vec<Aircraft>,
    bank_angle_rad: f64,
}

impl Traffic {
    pub fn new(bank_angle_rad: f64) -> Self {
        Self {
            aircraft: Vec::new(),
            bank_angle_rad,
        }
    }

    /// Add an aircraft and return its index.
    pub fn create(&mut self, aircraft: Aircraft) -> usize {
        tracing::debug!("Created {} at {:.4}, {:.4}", aircraft.callsign, aircraft.lat, aircraft.lon);
        self.aircraft.push(aircraft);
        self.aircraft.len() - 1
    }

    /// Remove aircraft by index; remaining ones shift down.
    pub fn remove(&mut self, indices: &[usize]) {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for &index in sorted.iter().rev() {
            if index < self.aircraft.len() {
                let removed = self.aircraft.remove(index);
                tracing::debug!("Removed {}", removed.callsign);
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&Aircraft> {
        self.aircraft.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aircraft> {
        self.aircraft.iter()
    }

    pub fn index_of(&self, callsign: &str) -> Option<usize> {
        self.aircraft.iter().position(|a| a.callsign == callsign)
    }

    /// Controller heading: disengages lnav.
    pub fn set_heading(&mut self, index: usize, heading_deg: f64) -> bool {
        let Some(aircraft) = self.aircraft.get_mut(index) else {
            return false;
        };
        aircraft.selected_heading_deg = geo::wrap360(heading_deg);
        aircraft.lnav_engaged = false;
        true
    }

    /// Resume own navigation along the route.
    pub fn engage_lnav(&mut self, index: usize) -> bool {
        let Some(aircraft) = self.aircraft.get_mut(index) else {
            return false;
        };
        aircraft.lnav_engaged = !aircraft.is_finished();
        aircraft.lnav_engaged
    }

    /// Proceed direct to a named waypoint further down the route.
    pub fn direct_to(&mut self, index: usize, waypoint: &str) -> bool {
        let Some(aircraft) = self.aircraft.get_mut(index) else {
            return false;
        };
        let from = aircraft.route.active_index().unwrap_or(0);
        let Some(offset) = aircraft.route.waypoints[from..]
            .iter()
            .position(|wp| wp.name.eq_ignore_ascii_case(waypoint))
        else {
            return false;
        };
        aircraft.route.set_active(from + offset);
        aircraft.lnav_engaged = true;
        true
    }

    /// Advance every aircraft by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        for aircraft in &mut self.aircraft {
            aircraft.step(dt, self.bank_angle_rad);
        }
    }

    /// Indices of aircraft that have flown their whole route.
    pub fn finished(&self) -> Vec<usize> {
        self.aircraft
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_finished())
            .map(|(i, _)| i)
            .collect()
    }
}

impl TrafficSource for Traffic {
    fn len(&self) -> usize {
        self.aircraft.len()
    }

    fn kinematics(&self, index: usize) -> Option<AircraftKinematics> {
        self.aircraft.get(index).map(Aircraft::kinematics)
    }

    fn route(&self, index: usize) -> Option<&Route> {
        self.aircraft.get(index).map(|a| &a.route)
    }

    fn arrival(&self, index: usize) -> Option<&str> {
        self.aircraft.get(index).and_then(|a| a.arrival.as_deref())
    }
}
