//! Scenario files: initial traffic plus timed controller commands.

use std::collections::HashSet;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use trackmiles_core::aero::{FT, KTS};
use trackmiles_core::{geo, Route, Waypoint};

use crate::error::SimError;
use crate::traffic::Aircraft;

/// Amsterdam Schiphol reference point.
const SCHIPHOL_LAT: f64 = 52.3086;
const SCHIPHOL_LON: f64 = 4.7639;
const RANDOM_RANGE_NM: std::ops::Range<f64> = 35.0..60.0;
const DEFAULT_SPEED_KTS: f64 = 250.0;
const DEFAULT_ALTITUDE_FT: f64 = 7000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftSpec {
    pub callsign: String,
    pub lat: f64,
    pub lon: f64,
    /// Defaults to the bearing toward the first waypoint
    #[serde(default)]
    pub heading_deg: Option<f64>,
    #[serde(default = "default_speed_kts")]
    pub speed_kts: f64,
    #[serde(default = "default_altitude_ft")]
    pub altitude_ft: f64,
    #[serde(default)]
    pub arrival: Option<String>,
    pub route: Vec<Waypoint>,
}

fn default_speed_kts() -> f64 {
    DEFAULT_SPEED_KTS
}

fn default_altitude_ft() -> f64 {
    DEFAULT_ALTITUDE_FT
}

impl AircraftSpec {
    pub fn to_aircraft(&self) -> Aircraft {
        let mut aircraft = Aircraft::new(
            self.callsign.clone(),
            self.lat,
            self.lon,
            self.speed_kts * KTS,
            self.altitude_ft * FT,
            Route::new(self.route.clone()),
        );
        if let Some(heading) = self.heading_deg {
            aircraft.heading_deg = geo::wrap360(heading);
            aircraft.selected_heading_deg = aircraft.heading_deg;
        }
        aircraft.arrival = self.arrival.clone();
        aircraft
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Fly a controller-assigned heading (lnav off)
    Heading { heading_deg: f64 },
    /// Resume lnav along the route
    Lnav,
    /// Proceed direct to a waypoint further along the route
    Direct { waypoint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCommand {
    /// Simulation time at which the command is issued (seconds)
    pub at_s: f64,
    pub callsign: String,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub aircraft: Vec<AircraftSpec>,
    #[serde(default)]
    pub commands: Vec<ScenarioCommand>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let mut callsigns = HashSet::new();
        for spec in &self.aircraft {
            if spec.route.is_empty() {
                return Err(SimError::EmptyRoute(spec.callsign.clone()));
            }
            if !callsigns.insert(spec.callsign.as_str()) {
                return Err(SimError::DuplicateCallsign(spec.callsign.clone()));
            }
        }
        for command in &self.commands {
            if !callsigns.contains(command.callsign.as_str()) {
                return Err(SimError::UnknownCallsign {
                    callsign: command.callsign.clone(),
                    at_s: command.at_s,
                });
            }
        }
        Ok(())
    }
}

/// Two arrivals into Schiphol; the second gets vectored off its route and back.
pub fn schiphol_demo() -> Scenario {
    let river = vec![
        Waypoint::new("RIVER", 51.9128, 4.1325),
        Waypoint::new("EH610", 52.1420, 4.2740),
        Waypoint::new("EH612", 52.3290, 4.3910)
            .with_constraints(Some(220.0 * KTS), Some(4000.0 * FT)),
        Waypoint::new("TBAR", 52.4796, 4.5134),
    ];
    let artip = vec![
        Waypoint::new("ARTIP", 52.5106, 5.5694),
        Waypoint::new("EH628", 52.5720, 5.0420)
            .with_constraints(Some(220.0 * KTS), Some(6000.0 * FT)),
        Waypoint::new("EH630", 52.6420, 4.7650),
        Waypoint::new("TBAR", 52.5839, 4.5134),
    ];

    Scenario {
        aircraft: vec![
            AircraftSpec {
                callsign: "KLM1234".into(),
                lat: 51.7500,
                lon: 3.9500,
                heading_deg: None,
                speed_kts: 250.0,
                altitude_ft: 7000.0,
                arrival: Some("RIVER".into()),
                route: river,
            },
            AircraftSpec {
                callsign: "TRA5678".into(),
                lat: 52.4300,
                lon: 6.0500,
                heading_deg: None,
                speed_kts: 240.0,
                altitude_ft: 9000.0,
                arrival: Some("ARTIP".into()),
                route: artip,
            },
        ],
        commands: vec![
            ScenarioCommand {
                at_s: 240.0,
                callsign: "TRA5678".into(),
                action: Action::Heading { heading_deg: 320.0 },
            },
            ScenarioCommand {
                at_s: 330.0,
                callsign: "TRA5678".into(),
                action: Action::Lnav,
            },
        ],
    }
}

/// Random arrivals converging on Schiphol from all directions.
pub fn random_scenario(count: usize, rng: &mut impl Rng) -> Scenario {
    let aircraft = (0..count)
        .map(|i| {
            let bearing_out = rng.random_range(0.0..360.0);
            let range_nm = rng.random_range(RANDOM_RANGE_NM);
            let (lat, lon) = geo::offset_by_bearing(
                SCHIPHOL_LAT,
                SCHIPHOL_LON,
                range_nm * trackmiles_core::aero::NM,
                bearing_out,
            );

            // Two doglegs on the way in, then the field
            let route = [0.65, 0.3]
                .iter()
                .enumerate()
                .map(|(n, fraction)| {
                    let offset = rng.random_range(-25.0..25.0);
                    let (wlat, wlon) = geo::offset_by_bearing(
                        SCHIPHOL_LAT,
                        SCHIPHOL_LON,
                        fraction * range_nm * trackmiles_core::aero::NM,
                        bearing_out + offset,
                    );
                    Waypoint::new(format!("RND{}{}", i, n + 1), wlat, wlon)
                })
                .chain(std::iter::once(Waypoint::new("EHAM", SCHIPHOL_LAT, SCHIPHOL_LON)))
                .collect();

            AircraftSpec {
                callsign: format!("SIM{:03}", i + 1),
                lat,
                lon,
                heading_deg: None,
                speed_kts: rng.random_range(210.0..280.0),
                altitude_ft: rng.random_range(5000.0..11000.0),
                arrival: None,
                route,
            }
        })
        .collect();

    Scenario {
        aircraft,
        commands: Vec::new(),
    }
}
