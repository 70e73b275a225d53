//! Great-circle geometry on a spherical earth.
//!
//! Distances come back in meters unless the function name says otherwise;
//! bearings are true degrees in `[0, 360)`.

use crate::aero::NM;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points in meters using Haversine formula.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Great-circle distance in nautical miles.
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_distance(lat1, lon1, lat2, lon2) / NM
}

/// Initial great-circle bearing from point 1 to point 2, in degrees `[0, 360)`.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y).to_degrees().rem_euclid(360.0)
}

/// Bearing (degrees) and distance (nm) from point 1 to point 2 in one call.
pub fn qdr_dist(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    (
        bearing_deg(lat1, lon1, lat2, lon2),
        distance_nm(lat1, lon1, lat2, lon2),
    )
}

/// Wrap an angle difference onto `[-180, 180)` degrees.
///
/// 359° − 1° is −2°, not 358°.
pub fn wrap180(angle_deg: f64) -> f64 {
    (angle_deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Normalize a heading onto `[0, 360)` degrees.
pub fn wrap360(angle_deg: f64) -> f64 {
    angle_deg.rem_euclid(360.0)
}

/// Absolute heading change between two courses, in degrees `[0, 180]`.
pub fn heading_change_deg(from_deg: f64, to_deg: f64) -> f64 {
    wrap180(to_deg - from_deg).abs()
}

/// Offset a position by distance and bearing.
///
/// # Arguments
/// * `lat`, `lon` - Starting position in degrees
/// * `distance_m` - Distance in meters
/// * `bearing_deg` - True bearing in degrees
///
/// # Returns
/// (new_lat, new_lon) in degrees
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_deg: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let bearing_rad = bearing_deg.to_radians();
    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 =
        (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_distance(52.3086, 4.7639, 52.3086, 4.7639);
        assert!(dist < 0.001);
    }

    #[test]
    fn one_degree_of_latitude_is_sixty_nm() {
        let dist = distance_nm(52.0, 4.0, 53.0, 4.0);
        assert!((dist - 60.0).abs() < 0.1, "got {dist}");
    }

    #[test]
    fn wrap180_treats_north_crossing_as_small_difference() {
        assert!((wrap180(359.0 - 1.0) - -2.0).abs() < 1e-9);
        assert!((wrap180(1.0 - 359.0) - 2.0).abs() < 1e-9);
        assert!((heading_change_deg(359.0, 1.0) - 2.0).abs() < 1e-9);
        assert!((heading_change_deg(1.0, 359.0) - 2.0).abs() < 1e-9);
        assert!((wrap180(90.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_cardinal_directions() {
        assert!(bearing_deg(52.0, 4.0, 53.0, 4.0).abs() < 1e-6);
        let east = bearing_deg(0.0, 0.0, 0.0, 1.0);
        assert!((east - 90.0).abs() < 1e-6, "got {east}");
        let west = bearing_deg(0.0, 1.0, 0.0, 0.0);
        assert!((west - 270.0).abs() < 1e-6, "got {west}");
    }

    #[test]
    fn offset_then_measure_returns_same_distance() {
        let (lat, lon) = offset_by_bearing(52.3, 4.76, 10.0 * NM, 45.0);
        let (qdr, dist) = qdr_dist(52.3, 4.76, lat, lon);
        assert!((dist - 10.0).abs() < 1e-6, "got {dist}");
        assert!((qdr - 45.0).abs() < 0.01, "got {qdr}");
    }
}
