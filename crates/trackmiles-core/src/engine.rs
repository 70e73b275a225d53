//! Fleet-wide distance-to-go estimation, run once per simulation tick.

use serde::{Deserialize, Serialize};

use crate::aero::NM;
use crate::config::TrackmilesConfig;
use crate::distance::{
    next_leg_distance, next_leg_distance_straight, remaining_route_distance,
    remaining_route_distance_straight,
};
use crate::geo;
use crate::models::{AircraftKinematics, Route, TrafficSource};
use crate::tbar::TbarTable;
use crate::tracker::{is_aligned, TrackInputs, TrackMode, TurnReference};

/// Published estimate for one aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackmilesResult {
    pub dtg_nm: f64,
    pub mode: TrackMode,
    /// Direct distance to the T-bar of the aircraft's arrival
    pub tbar_nm: Option<f64>,
}

impl Default for TrackmilesResult {
    fn default() -> Self {
        Self {
            dtg_nm: 0.0,
            mode: TrackMode::OnTrack,
            tbar_nm: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    reference: TurnReference,
    result: TrackmilesResult,
}

/// Distance-to-go engine.
///
/// Owns one turn reference per aircraft slot of the traffic source and the
/// last published result for each. Slots follow the traffic indices: the
/// simulator reports creations and removals so both stay in step.
pub struct TrackmilesEngine {
    config: TrackmilesConfig,
    tbar: TbarTable,
    slots: Vec<Slot>,
}

impl Default for TrackmilesEngine {
    fn default() -> Self {
        Self::new(TrackmilesConfig::default())
    }
}

impl TrackmilesEngine {
    pub fn new(config: TrackmilesConfig) -> Self {
        let tbar = TbarTable::new(&config.tbar_points);
        Self {
            config,
            tbar,
            slots: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrackmilesConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Allocate `n` trackers for newly created aircraft, appended at the end.
    pub fn on_aircraft_created(&mut self, n: usize) {
        self.slots.resize_with(self.slots.len() + n, Slot::default);
        tracing::debug!("Allocated {} turn reference(s), {} total", n, self.slots.len());
    }

    /// Release the trackers of removed aircraft.
    ///
    /// Remaining slots shift down to keep matching the traffic indices.
    pub fn on_aircraft_removed(&mut self, indices: &[usize]) {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.slots.len())
            .collect();
        sorted.sort_unstable();
        sorted.dedup();

        for &index in sorted.iter().rev() {
            self.slots.remove(index);
        }
        tracing::debug!("Released {} turn reference(s), {} left", sorted.len(), self.slots.len());
    }

    /// Recompute the distance-to-go of every aircraft in `traffic`.
    pub fn update<T: TrafficSource + ?Sized>(&mut self, traffic: &T) {
        let count = traffic.len();
        if self.slots.len() < count {
            // Aircraft the simulator never announced start uncaptured
            self.slots.resize_with(count, Slot::default);
        }

        for index in 0..count {
            let Some(kin) = traffic.kinematics(index) else {
                self.slots[index].result = TrackmilesResult::default();
                continue;
            };

            let tbar_nm = traffic
                .arrival(index)
                .and_then(|arrival| self.tbar.distance_nm(&kin, arrival));

            let slot = &mut self.slots[index];
            let (mode, dtg_nm) = match traffic.route(index) {
                Some(route) => estimate(&self.config, &mut slot.reference, &kin, route, index),
                None => (TrackMode::OnTrack, 0.0),
            };

            slot.result = TrackmilesResult {
                dtg_nm,
                mode,
                tbar_nm,
            };
        }
    }

    /// Last published DTG (nm).
    pub fn dtg_nm(&self, index: usize) -> Option<f64> {
        self.slots.get(index).map(|s| s.result.dtg_nm)
    }

    pub fn mode(&self, index: usize) -> Option<TrackMode> {
        self.slots.get(index).map(|s| s.result.mode)
    }

    pub fn tbar_nm(&self, index: usize) -> Option<f64> {
        self.slots.get(index).and_then(|s| s.result.tbar_nm)
    }

    pub fn result(&self, index: usize) -> Option<TrackmilesResult> {
        self.slots.get(index).map(|s| s.result)
    }

    pub fn results(&self) -> impl Iterator<Item = TrackmilesResult> + '_ {
        self.slots.iter().map(|s| s.result)
    }

    pub fn reference(&self, index: usize) -> Option<&TurnReference> {
        self.slots.get(index).map(|s| &s.reference)
    }
}

fn estimate(
    config: &TrackmilesConfig,
    reference: &mut TurnReference,
    kin: &AircraftKinematics,
    route: &Route,
    index: usize,
) -> (TrackMode, f64) {
    let (Some(active), Some(wp)) = (route.active_index(), kin.active_waypoint) else {
        return (TrackMode::OnTrack, 0.0);
    };

    let bearing = geo::bearing_deg(kin.lat, kin.lon, wp.lat, wp.lon);
    let inputs = TrackInputs {
        aligned: is_aligned(kin.heading_deg, bearing, config.alignment_tolerance_deg),
        lnav_engaged: kin.lnav_engaged,
        distance_flown_nm: kin.distance_flown_m / NM,
    };

    let was_turning = reference.is_turning();
    let (mode, dtg) = reference.step(inputs, || {
        if config.flyby_correction {
            next_leg_distance(kin, config) + remaining_route_distance(route, active, config)
        } else {
            next_leg_distance_straight(kin) + remaining_route_distance_straight(route, active)
        }
    });

    if was_turning != reference.is_turning() {
        tracing::debug!(
            "Aircraft {} turn reference {} (lnav {}, dtg {:.1} nm)",
            index,
            if reference.is_turning() { "frozen" } else { "released" },
            kin.lnav_engaged,
            dtg
        );
    }

    // Interpolating past the waypoint would otherwise go negative
    (mode, dtg.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aero::KTS;
    use crate::models::{ActiveWaypoint, Waypoint};
    use crate::tbar::TbarPoint;

    /// Minimal traffic source holding aircraft by value.
    #[derive(Default)]
    struct Fleet {
        aircraft: Vec<(AircraftKinematics, Option<Route>, Option<String>)>,
    }

    impl TrafficSource for Fleet {
        fn len(&self) -> usize {
            self.aircraft.len()
        }

        fn kinematics(&self, index: usize) -> Option<AircraftKinematics> {
            self.aircraft.get(index).map(|a| a.0)
        }

        fn route(&self, index: usize) -> Option<&Route> {
            self.aircraft.get(index).and_then(|a| a.1.as_ref())
        }

        fn arrival(&self, index: usize) -> Option<&str> {
            self.aircraft.get(index).and_then(|a| a.2.as_deref())
        }
    }

    fn schiphol_east() -> (AircraftKinematics, Route) {
        let route = Route::new(vec![Waypoint::new("EH001", 52.30, 5.00)]);
        let kin = AircraftKinematics {
            lat: 52.30,
            lon: 4.76,
            heading_deg: 90.0,
            tas_mps: 250.0 * KTS,
            gs_mps: 250.0 * KTS,
            altitude_m: 3000.0,
            distance_flown_m: 0.0,
            lnav_engaged: true,
            active_waypoint: Some(ActiveWaypoint {
                lat: 52.30,
                lon: 5.00,
                next_course_deg: Some(90.0),
                speed_constraint_cas_mps: None,
                altitude_constraint_m: None,
            }),
        };
        (kin, route)
    }

    #[test]
    fn aligned_aircraft_gets_direct_distance() {
        let (kin, route) = schiphol_east();
        let mut fleet = Fleet::default();
        fleet.aircraft.push((kin, Some(route), None));

        let mut engine = TrackmilesEngine::default();
        engine.on_aircraft_created(1);
        engine.update(&fleet);

        let direct = geo::distance_nm(52.30, 4.76, 52.30, 5.00);
        let dtg = engine.dtg_nm(0).unwrap();
        assert!((dtg - direct).abs() < 0.01, "dtg {dtg} vs direct {direct}");
        assert!((dtg - 8.8).abs() < 0.05, "dtg {dtg}");
        assert_eq!(engine.mode(0), Some(TrackMode::OnTrack));

        let snapshot = engine.reference(0).unwrap().snapshot().unwrap();
        assert_eq!(snapshot.dtg_nm, dtg);
        assert_eq!(snapshot.distance_flown_nm, 0.0);
        assert!(!engine.reference(0).unwrap().is_turning());
    }

    #[test]
    fn controller_heading_tracks_flown_distance() {
        let (mut kin, route) = schiphol_east();
        let mut fleet = Fleet::default();
        fleet.aircraft.push((kin, Some(route.clone()), None));

        let mut engine = TrackmilesEngine::default();
        engine.on_aircraft_created(1);
        engine.update(&fleet);
        let start = engine.dtg_nm(0).unwrap();

        // Three ticks on a controller heading, 0.5 nm each, still pointing at the waypoint
        kin.lnav_engaged = false;
        for _ in 0..3 {
            let bearing = geo::bearing_deg(kin.lat, kin.lon, 52.30, 5.00);
            let (lat, lon) = geo::offset_by_bearing(kin.lat, kin.lon, 0.5 * NM, bearing);
            kin.lat = lat;
            kin.lon = lon;
            kin.heading_deg = bearing;
            kin.distance_flown_m += 0.5 * NM;
            fleet.aircraft[0] = (kin, Some(route.clone()), None);
            engine.update(&fleet);
            assert!(engine.reference(0).unwrap().is_turning());
        }

        let end = engine.dtg_nm(0).unwrap();
        assert!((start - end - 1.5).abs() < 1e-3, "dropped {}", start - end);

        let reference = engine.reference(0).unwrap();
        let frozen = reference.interpolate(kin.distance_flown_m / NM).unwrap();
        assert!((frozen - end).abs() < 1e-9);
    }

    #[test]
    fn misaligned_lnav_aircraft_interpolates_after_first_capture() {
        let (mut kin, route) = schiphol_east();
        let mut fleet = Fleet::default();
        fleet.aircraft.push((kin, Some(route.clone()), None));

        let mut engine = TrackmilesEngine::default();
        engine.on_aircraft_created(1);
        engine.update(&fleet);
        let start = engine.dtg_nm(0).unwrap();

        kin.heading_deg = 120.0;
        kin.distance_flown_m += 0.2 * NM;
        fleet.aircraft[0] = (kin, Some(route), None);
        engine.update(&fleet);

        assert_eq!(engine.mode(0), Some(TrackMode::Turning));
        assert!((engine.dtg_nm(0).unwrap() - (start - 0.2)).abs() < 1e-9);
    }

    #[test]
    fn published_dtg_never_goes_below_zero() {
        let (mut kin, route) = schiphol_east();
        let mut fleet = Fleet::default();
        fleet.aircraft.push((kin, Some(route.clone()), None));

        let mut engine = TrackmilesEngine::default();
        engine.on_aircraft_created(1);
        engine.update(&fleet);

        // Still turning long after the frozen reference ran out
        kin.heading_deg = 200.0;
        kin.distance_flown_m += 20.0 * NM;
        fleet.aircraft[0] = (kin, Some(route), None);
        engine.update(&fleet);

        assert_eq!(engine.mode(0), Some(TrackMode::Turning));
        assert_eq!(engine.dtg_nm(0), Some(0.0));
    }

    #[test]
    fn missing_route_publishes_zero() {
        let (kin, _) = schiphol_east();
        let mut fleet = Fleet::default();
        fleet.aircraft.push((kin, None, None));
        fleet.aircraft.push((kin, Some(Route::default()), None));

        let mut engine = TrackmilesEngine::default();
        engine.on_aircraft_created(2);
        engine.update(&fleet);

        assert_eq!(engine.dtg_nm(0), Some(0.0));
        assert_eq!(engine.dtg_nm(1), Some(0.0));
        assert!(engine.reference(1).unwrap().snapshot().is_none());
    }

    #[test]
    fn unannounced_aircraft_are_allocated_lazily() {
        let (kin, route) = schiphol_east();
        let mut fleet = Fleet::default();
        fleet.aircraft.push((kin, Some(route), None));

        let mut engine = TrackmilesEngine::default();
        engine.update(&fleet);
        assert_eq!(engine.len(), 1);
        assert!(engine.dtg_nm(0).unwrap() > 0.0);
    }

    #[test]
    fn removal_shifts_remaining_trackers() {
        let mut engine = TrackmilesEngine::default();
        engine.on_aircraft_created(4);
        let (kin, route) = schiphol_east();
        let mut fleet = Fleet::default();
        for i in 0..4 {
            let mut kin = kin;
            kin.distance_flown_m = i as f64 * NM;
            fleet.aircraft.push((kin, Some(route.clone()), None));
        }
        engine.update(&fleet);

        engine.on_aircraft_removed(&[2, 0, 2, 9]);
        assert_eq!(engine.len(), 2);
        let flown: Vec<f64> = (0..2)
            .map(|i| engine.reference(i).unwrap().snapshot().unwrap().distance_flown_nm)
            .collect();
        assert_eq!(flown, vec![1.0, 3.0]);
    }

    #[test]
    fn publishes_tbar_distance_for_known_arrivals() {
        let config = TrackmilesConfig {
            tbar_points: vec![TbarPoint {
                arrival: "RIVER".into(),
                lat: 52.30,
                lon: 5.00,
            }],
            ..TrackmilesConfig::default()
        };
        let (kin, route) = schiphol_east();
        let mut fleet = Fleet::default();
        fleet.aircraft.push((kin, Some(route.clone()), Some("RIVER".into())));
        fleet.aircraft.push((kin, Some(route), Some("SUGOL".into())));

        let mut engine = TrackmilesEngine::new(config);
        engine.on_aircraft_created(2);
        engine.update(&fleet);

        let expected = geo::distance_nm(52.30, 4.76, 52.30, 5.00);
        assert!((engine.tbar_nm(0).unwrap() - expected).abs() < 1e-12);
        assert!(engine.tbar_nm(1).is_none());
    }

    #[test]
    fn straight_mode_ignores_flyby_arcs() {
        let route = Route::new(vec![
            Waypoint::new("A", 52.0, 4.0),
            Waypoint::new("B", 52.5, 4.0),
            Waypoint::new("C", 52.5, 4.8),
        ]);
        let kin = AircraftKinematics {
            lat: 51.9,
            lon: 4.0,
            heading_deg: 0.0,
            tas_mps: 128.0,
            gs_mps: 128.0,
            altitude_m: 3000.0,
            distance_flown_m: 0.0,
            lnav_engaged: true,
            active_waypoint: route.active_leg(),
        };
        let mut fleet = Fleet::default();
        fleet.aircraft.push((kin, Some(route.clone()), None));

        let mut curved = TrackmilesEngine::default();
        curved.update(&fleet);
        let mut straight = TrackmilesEngine::new(TrackmilesConfig {
            flyby_correction: false,
            ..TrackmilesConfig::default()
        });
        straight.update(&fleet);

        let legs = geo::distance_nm(51.9, 4.0, 52.0, 4.0)
            + crate::distance::remaining_route_distance_straight(&route, 0);
        assert!((straight.dtg_nm(0).unwrap() - legs).abs() < 1e-9);
        assert!(curved.dtg_nm(0).unwrap() < straight.dtg_nm(0).unwrap());
    }
}
