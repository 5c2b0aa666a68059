use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown dispatch strategy {0:?} (expected \"first-available\" or \"earliest-arrival\")")]
    UnknownStrategy(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
