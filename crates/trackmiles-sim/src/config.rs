//! Driver configuration from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use trackmiles_core::TrackmilesConfig;

use crate::error::SimError;

#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed simulation tick (milliseconds of simulated time)
    pub tick_ms: u64,
    /// Interval between DTG reports in the log (seconds)
    pub report_secs: u64,
    /// Optional JSON file with engine tunables
    pub engine_config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            report_secs: 5,
            engine_config_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tick_ms: env::var("TRACKMILES_TICK_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.tick_ms),
            report_secs: env::var("TRACKMILES_REPORT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.report_secs),
            engine_config_path: env::var("TRACKMILES_ENGINE_CONFIG").ok().map(PathBuf::from),
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Engine tunables from `engine_config_path`, or the defaults.
    pub fn load_engine_config(&self) -> Result<TrackmilesConfig, SimError> {
        let Some(path) = &self.engine_config_path else {
            return Ok(TrackmilesConfig::default());
        };
        let json = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(TrackmilesConfig::from_json(&json)?)
    }
}
