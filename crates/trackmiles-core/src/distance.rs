//! Distance-to-go along a route, with flyby arcs.
//!
//! All results are in nautical miles.

use crate::aero::{cas2tas, NM};
use crate::config::TrackmilesConfig;
use crate::geo;
use crate::models::{AircraftKinematics, Route, Waypoint};
use crate::turn::calc_turn;

/// Sum of the straight legs from waypoint `from` to the end of the route.
pub fn remaining_route_distance_straight(route: &Route, from: usize) -> f64 {
    route
        .waypoints
        .get(from..)
        .unwrap_or_default()
        .windows(2)
        .map(|leg| geo::distance_nm(leg[0].lat, leg[0].lon, leg[1].lat, leg[1].lon))
        .sum()
}

/// Flight-path distance from waypoint `from` to the end of the route.
///
/// Every interior waypoint after `from` is flown by: the two straight
/// cut-offs around it are replaced by the turn arc.
pub fn remaining_route_distance(route: &Route, from: usize, config: &TrackmilesConfig) -> f64 {
    let wps = &route.waypoints;
    if from + 2 > wps.len() {
        return 0.0;
    }

    let mut total = remaining_route_distance_straight(route, from);

    for i in (from + 1)..(wps.len() - 1) {
        let (prev, wp, next) = (&wps[i - 1], &wps[i], &wps[i + 1]);
        let qdr_in = geo::bearing_deg(prev.lat, prev.lon, wp.lat, wp.lon);
        let qdr_out = geo::bearing_deg(wp.lat, wp.lon, next.lat, next.lon);

        let tas = waypoint_tas(wp, config);
        let turn = calc_turn(tas, config.bank_angle_rad, qdr_in, qdr_out, None);

        // A corner can never cut more than the shorter of its two legs
        let shorter_leg = geo::distance_nm(prev.lat, prev.lon, wp.lat, wp.lon)
            .min(geo::distance_nm(wp.lat, wp.lon, next.lat, next.lon));
        total += (turn.path_correction_m(qdr_in, qdr_out) / NM).max(-shorter_leg);
    }

    total
}

/// True airspeed expected while flying by `wp`.
///
/// Needs both constraints to convert CAS; otherwise the configured default is used.
fn waypoint_tas(wp: &Waypoint, config: &TrackmilesConfig) -> f64 {
    match (wp.speed_constraint_cas_mps, wp.altitude_constraint_m) {
        (Some(cas), Some(alt)) => cas2tas(cas, alt),
        _ => config.default_waypoint_tas_mps,
    }
}

/// Direct distance from the aircraft to its active waypoint, 0 without one.
pub fn next_leg_distance_straight(kin: &AircraftKinematics) -> f64 {
    kin.active_waypoint
        .map(|wp| geo::distance_nm(kin.lat, kin.lon, wp.lat, wp.lon))
        .unwrap_or(0.0)
}

/// Distance from the aircraft to its active waypoint, following the arc flown around it.
///
/// The aircraft is assumed to head straight for the waypoint and turn onto
/// the next course there. At the end of the route there is no next course and
/// the direct distance is returned.
pub fn next_leg_distance(kin: &AircraftKinematics, config: &TrackmilesConfig) -> f64 {
    let Some(wp) = kin.active_waypoint else {
        return 0.0;
    };
    let (bearing, direct) = geo::qdr_dist(kin.lat, kin.lon, wp.lat, wp.lon);

    let Some(next_course) = wp.next_course_deg else {
        return direct;
    };
    let next_course = geo::wrap360(next_course);

    // Without a speed constraint the current speed is the best guess
    let tas = match wp.speed_constraint_cas_mps {
        Some(cas) => cas2tas(cas, wp.altitude_constraint_m.unwrap_or(kin.altitude_m)),
        None => kin.tas_mps,
    };

    let turn = calc_turn(tas, config.bank_angle_rad, bearing, next_course, None);
    (direct + turn.path_correction_m(bearing, next_course) / NM).max(0.0)
}
