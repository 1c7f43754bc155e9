use thiserror::Error;

/// The error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// An error related to I/O operations.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// An error related to JSON serialization.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// An error related to parsing.
    #[error("Parsing error: {0}")]
    Parsing(String),
    /// An error related to illegal arguments.
    #[error("Illegal argument error: {0}")]
    IllegalArgument(String),
}

/// A specialized [`Result`] type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
