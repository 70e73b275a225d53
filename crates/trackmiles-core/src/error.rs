use thiserror::Error;

/// Rejected engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {value} (must be finite and positive)")]
    NotPositive { field: &'static str, value: f64 },
    #[error("bank angle {0} rad is not below 90 degrees")]
    BankTooSteep(f64),
    #[error("duplicate T-bar point for arrival {0}")]
    DuplicateTbar(String),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
