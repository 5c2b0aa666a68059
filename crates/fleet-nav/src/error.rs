//! Navigation error type.

use thiserror::Error;

use fleet_core::Point;

/// Errors produced by `fleet-nav`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NavError {
    #[error("point {0} is not traversable")]
    Unreachable(Point),

    #[error("no path from {from} to {to}")]
    NoPath { from: Point, to: Point },

    #[error("invalid navigation grid: {0}")]
    Grid(String),
}

pub type NavResult<T> = Result<T, NavError>;
