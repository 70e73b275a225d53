//! Per-aircraft turn tracking.
//!
//! While an aircraft turns, the direct bearing to its active waypoint swings
//! quickly and the live geometric estimate jumps around. The tracker keeps the
//! last trusted (distance flown, DTG) pair and, while turning, deducts the
//! distance flown since from it instead.
//!
//! ```text
//! OnTrack --[lnav, heading off the direct bearing]--> Turning
//! Turning --[heading realigned, or lnav off]--------> OnTrack
//! ```
//!
//! `turning` covers two situations with one flag: the aircraft is physically
//! mid-turn, or a controller took it off lnav. The flag is informational and
//! does not gate the estimate: any lnav tick with the heading off the direct
//! bearing uses the frozen reference once one has been captured, whether or
//! not `turning` was already set.

use serde::{Deserialize, Serialize};

use crate::geo::heading_change_deg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackMode {
    /// Live geometry is trusted and refreshes the reference
    OnTrack,
    /// DTG is interpolated from the frozen reference
    Turning,
}

impl TrackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackMode::OnTrack => "on_track",
            TrackMode::Turning => "turning",
        }
    }
}

impl std::fmt::Display for TrackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference pair captured the last time live geometry was trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub distance_flown_nm: f64,
    pub dtg_nm: f64,
}

/// What the tracker needs to know about an aircraft this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackInputs {
    /// Heading within tolerance of the direct bearing to the active waypoint
    pub aligned: bool,
    pub lnav_engaged: bool,
    pub distance_flown_nm: f64,
}

/// Turn reference state of one aircraft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnReference {
    snapshot: Option<Snapshot>,
    turning: bool,
}

impl TurnReference {
    /// Fresh state: no snapshot captured, not turning.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot
    }

    /// Whether the last tick left the aircraft turning or off lnav.
    pub fn is_turning(&self) -> bool {
        self.turning
    }

    pub fn capture(&mut self, distance_flown_nm: f64, dtg_nm: f64) {
        self.snapshot = Some(Snapshot {
            distance_flown_nm,
            dtg_nm,
        });
    }

    /// DTG from the frozen reference, `None` before the first capture.
    pub fn interpolate(&self, distance_flown_nm: f64) -> Option<f64> {
        self.snapshot
            .map(|s| s.dtg_nm + s.distance_flown_nm - distance_flown_nm)
    }

    /// Advance the state machine by one tick and return the DTG estimate.
    ///
    /// `live` computes the geometric DTG; it is only called when that
    /// estimate is going to be used.
    pub fn step(&mut self, inputs: TrackInputs, live: impl FnOnce() -> f64) -> (TrackMode, f64) {
        let frozen = if inputs.lnav_engaged && !inputs.aligned {
            self.interpolate(inputs.distance_flown_nm)
        } else {
            None
        };

        if let Some(dtg) = frozen {
            self.turning = true;
            return (TrackMode::Turning, dtg);
        }

        let dtg = live();
        self.capture(inputs.distance_flown_nm, dtg);
        if !inputs.lnav_engaged {
            self.turning = true;
        } else if inputs.aligned {
            self.turning = false;
        }
        (TrackMode::OnTrack, dtg)
    }
}

/// Heading within `tolerance_deg` of the direct bearing, wrap-around aware.
pub fn is_aligned(heading_deg: f64, bearing_deg: f64, tolerance_deg: f64) -> bool {
    heading_change_deg(bearing_deg, heading_deg) < tolerance_deg
}
