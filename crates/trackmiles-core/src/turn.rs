//! Flyby turn geometry.
//!
//! An aircraft flying by a waypoint starts its turn `distance_m` before the
//! waypoint and rolls out the same distance after it, flying a circular arc
//! of `radius_m` in between. Route distance corrections replace the two
//! straight cut-offs with that arc.

use crate::aero::{G0, NM};
use crate::geo::heading_change_deg;

/// Floor for `tan(bank)` so a zero bank angle cannot blow up the radius.
const MIN_TAN_BANK: f64 = 0.01;

/// Heading change (degrees) from which a turn counts as a course reversal.
/// The cut-off `r·tan(½Δ)` diverges there, so no flyby cut-off is modelled.
const REVERSAL_DEG: f64 = 180.0 - 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Turn {
    /// Distance before the waypoint at which the turn starts (m)
    pub distance_m: f64,
    pub radius_m: f64,
}

impl Turn {
    /// Length of the arc flown while turning from `qdr_in` to `qdr_out` (m).
    pub fn arc_length_m(&self, qdr_in_deg: f64, qdr_out_deg: f64) -> f64 {
        finite_or_zero(self.radius_m * heading_change_deg(qdr_in_deg, qdr_out_deg).to_radians())
    }

    /// Net change of path length when flying the arc instead of the corner (m).
    ///
    /// Never positive: the arc is shorter than the two cut-off legs it replaces.
    /// A course reversal has no cut-off and therefore no correction.
    pub fn path_correction_m(&self, qdr_in_deg: f64, qdr_out_deg: f64) -> f64 {
        (self.arc_length_m(qdr_in_deg, qdr_out_deg) - 2.0 * self.distance_m).min(0.0)
    }
}

/// Calculate turn cut-off distance and turn radius in meters.
///
/// # Arguments
/// * `tas_mps` - True airspeed through the turn
/// * `bank_rad` - Assumed bank angle
/// * `qdr_in_deg`, `qdr_out_deg` - Inbound and outbound courses
/// * `radius_override_nm` - Fixed turn radius, bypassing the speed/bank model
pub fn calc_turn(
    tas_mps: f64,
    bank_rad: f64,
    qdr_in_deg: f64,
    qdr_out_deg: f64,
    radius_override_nm: Option<f64>,
) -> Turn {
    let radius_m = match radius_override_nm {
        Some(radius_nm) if radius_nm >= 0.0 => radius_nm * NM,
        _ => tas_mps * tas_mps / (bank_rad.tan().max(MIN_TAN_BANK) * G0),
    };
    let radius_m = finite_or_zero(radius_m);

    let change_deg = heading_change_deg(qdr_in_deg, qdr_out_deg);
    let distance_m = if change_deg >= REVERSAL_DEG {
        0.0
    } else {
        let half_turn = 0.5 * change_deg.to_radians();
        finite_or_zero((radius_m * half_turn.tan()).abs())
    };

    Turn {
        distance_m,
        radius_m,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aero::KTS;

    const BANK: f64 = 0.436;

    #[test]
    fn radius_follows_speed_and_bank() {
        let tas = 250.0 * KTS;
        let turn = calc_turn(tas, BANK, 0.0, 90.0, None);
        let expected = tas * tas / (BANK.tan() * G0);
        assert!((turn.radius_m - expected).abs() < 1e-6);
        // 90° turn: cut-off equals the radius
        assert!((turn.distance_m - turn.radius_m).abs() < 1e-6);
    }

    #[test]
    fn straight_ahead_has_no_cutoff() {
        let turn = calc_turn(128.0, BANK, 45.0, 45.0, None);
        assert_eq!(turn.distance_m, 0.0);
        assert_eq!(turn.arc_length_m(45.0, 45.0), 0.0);
        assert_eq!(turn.path_correction_m(45.0, 45.0), 0.0);
    }

    #[test]
    fn wraps_across_north() {
        let across = calc_turn(128.0, BANK, 359.0, 1.0, None);
        let plain = calc_turn(128.0, BANK, 10.0, 12.0, None);
        assert!((across.distance_m - plain.distance_m).abs() < 1e-9);
        assert!(across.distance_m < 0.02 * across.radius_m);
        assert!((across.arc_length_m(359.0, 1.0) - across.radius_m * 2f64.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn zero_bank_is_clamped() {
        let turn = calc_turn(128.0, 0.0, 0.0, 30.0, None);
        assert!(turn.radius_m.is_finite());
        assert!((turn.radius_m - 128.0 * 128.0 / (MIN_TAN_BANK * G0)).abs() < 1e-6);
    }

    #[test]
    fn radius_override_in_nm() {
        let turn = calc_turn(128.0, BANK, 0.0, 90.0, Some(1.5));
        assert!((turn.radius_m - 1.5 * NM).abs() < 1e-9);
        // A negative override is the "not set" sentinel
        let computed = calc_turn(128.0, BANK, 0.0, 90.0, Some(-999.0));
        assert!((computed.radius_m - calc_turn(128.0, BANK, 0.0, 90.0, None).radius_m).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs_never_produce_nan() {
        let turn = calc_turn(f64::NAN, BANK, 0.0, 90.0, None);
        assert_eq!(turn, Turn::default());
    }

    #[test]
    fn course_reversal_has_no_cutoff() {
        for (qdr_in, qdr_out) in [(0.0, 180.0), (90.0, 270.0), (350.0, 170.0)] {
            let reversal = calc_turn(128.0, BANK, qdr_in, qdr_out, None);
            assert_eq!(reversal.distance_m, 0.0, "{qdr_in} -> {qdr_out}");
            assert!(reversal.radius_m > 0.0);
            assert_eq!(reversal.path_correction_m(qdr_in, qdr_out), 0.0);
        }

        // Just short of a reversal the cut-off is large but finite
        let nearly = calc_turn(128.0, BANK, 0.0, 179.9, None);
        assert!(nearly.distance_m.is_finite() && nearly.distance_m > 0.0);
        assert!(nearly.path_correction_m(0.0, 179.9) < 0.0);
    }

    #[test]
    fn arc_is_shorter_than_cut_corner() {
        let turn = calc_turn(128.0, BANK, 0.0, 60.0, None);
        assert!(turn.path_correction_m(0.0, 60.0) < 0.0);
    }
}
