//! Tunables for distance-to-go estimation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tbar::TbarPoint;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackmilesConfig {
    /// Bank angle assumed for flyby turns (radians, 25°)
    pub bank_angle_rad: f64,
    /// True airspeed assumed at waypoints without speed/altitude constraints (m/s)
    pub default_waypoint_tas_mps: f64,
    /// Heading vs. direct bearing difference still counted as "on track" (degrees)
    pub alignment_tolerance_deg: f64,
    /// Account for the arcs flown around flyby waypoints
    pub flyby_correction: bool,
    /// Distance reference points per arrival
    pub tbar_points: Vec<TbarPoint>,
}

impl Default for TrackmilesConfig {
    fn default() -> Self {
        Self {
            bank_angle_rad: 0.436,
            default_waypoint_tas_mps: 128.0,
            alignment_tolerance_deg: 1.0,
            flyby_correction: true,
            tbar_points: Vec::new(),
        }
    }
}

impl TrackmilesConfig {
    /// Parse and validate a JSON configuration. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("bank_angle_rad", self.bank_angle_rad)?;
        positive("default_waypoint_tas_mps", self.default_waypoint_tas_mps)?;
        positive("alignment_tolerance_deg", self.alignment_tolerance_deg)?;

        if self.bank_angle_rad >= std::f64::consts::FRAC_PI_2 {
            return Err(ConfigError::BankTooSteep(self.bank_angle_rad));
        }

        let mut seen = HashSet::new();
        for point in &self.tbar_points {
            if !seen.insert(point.arrival.as_str()) {
                return Err(ConfigError::DuplicateTbar(point.arrival.clone()));
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
