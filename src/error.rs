//! Error types for configuration loading.
//!
//! The per-tick path never returns errors: bad steps are logged and skipped.
//! Only building a simulation from host-supplied configuration can fail.

use thiserror::Error;

/// Configuration rejected before a simulation is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed into a configuration.
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A scalar was NaN or infinite.
    #[error("Configuration field `{field}` is not a finite number")]
    NonFinite { field: &'static str },

    /// Domain bounds must be positive and finite.
    #[error("Invalid bounds {width} x {height}")]
    InvalidBounds { width: f64, height: f64 },

    /// The body does not fit inside the domain.
    #[error("Body of diameter {diameter} does not fit in {width} x {height} bounds")]
    BodyTooLarge { diameter: f64, width: f64, height: f64 },
}

/// Convenience alias for `Result<T, ConfigError>`.
pub type PhyslabResult<T> = Result<T, ConfigError>;
