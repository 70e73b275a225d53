//! Direct distance to the T-bar point of an arrival.
//!
//! Approach controllers space traffic on the distance each aircraft still has
//! to the T-bar of its arrival stream, independent of the route it flies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geo;
use crate::models::AircraftKinematics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TbarPoint {
    /// Arrival or stack name, matched case-insensitively
    pub arrival: String,
    pub lat: f64,
    pub lon: f64,
}

/// Lookup of T-bar points by arrival name.
#[derive(Debug, Clone, Default)]
pub struct TbarTable {
    points: HashMap<String, TbarPoint>,
}

impl TbarTable {
    pub fn new(points: &[TbarPoint]) -> Self {
        let points = points
            .iter()
            .map(|p| (p.arrival.to_uppercase(), p.clone()))
            .collect();
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, arrival: &str) -> Option<&TbarPoint> {
        self.points.get(&arrival.to_uppercase())
    }

    /// Distance (nm) from the aircraft to the T-bar of `arrival`, if one is configured.
    pub fn distance_nm(&self, kin: &AircraftKinematics, arrival: &str) -> Option<f64> {
        let point = self.get(arrival)?;
        Some(geo::distance_nm(kin.lat, kin.lon, point.lat, point.lon))
    }
}
