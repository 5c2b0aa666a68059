use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task file line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("task file targets map {found:?}, expected {expected:?}")]
    MapMismatch { expected: String, found: String },

    #[error("malformed task file: {0}")]
    Format(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TaskResult<T> = Result<T, TaskError>;
