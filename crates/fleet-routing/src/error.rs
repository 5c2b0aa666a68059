use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("router configuration error: {0}")]
    Config(String),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
