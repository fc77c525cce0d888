//! Log triage error types.

use thiserror::Error;

/// Errors raised by the I/O collaborators around the analysis engine.
///
/// Parsing and analysis themselves never fail; these cover reading and
/// following log sources.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("source not found: {0}")]
    NotFound(String),
}

impl LogError {
    /// Map an `std::io::Error` for `path`, keeping not-found distinct.
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_string())
        } else {
            Self::Io(format!("{path}: {err}"))
        }
    }
}

/// Convenience alias for log triage results.
pub type LogResult<T> = Result<T, LogError>;
