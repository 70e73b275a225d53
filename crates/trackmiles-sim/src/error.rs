use std::path::PathBuf;

use thiserror::Error;
use trackmiles_core::ConfigError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("aircraft {0} has an empty route")]
    EmptyRoute(String),
    #[error("duplicate callsign {0}")]
    DuplicateCallsign(String),
    #[error("command at {at_s}s targets unknown callsign {callsign}")]
    UnknownCallsign { callsign: String, at_s: f64 },
    #[error("engine configuration: {0}")]
    Config(#[from] ConfigError),
}
