//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `FleetError` as one
//! variant where they need to surface a core failure.

use thiserror::Error;

/// The top-level error type for `fleet-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid time of day {0:?}: expected HH:MM in 00:00..=23:59")]
    InvalidTime(String),

    #[error("invalid point {0:?}: expected \"x;y\"")]
    InvalidPoint(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `fleet-*` crates.
pub type FleetResult<T> = Result<T, FleetError>;
