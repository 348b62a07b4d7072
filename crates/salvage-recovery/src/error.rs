//! Failure signal for array recovery

use thiserror::Error;

/// Why no records could be recovered from a model response
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryError {
    /// The text holds no `[` at all (or is empty)
    #[error("no JSON array found in text")]
    NoJsonFound,

    /// A JSON-like structure was located but every strategy failed
    #[error("JSON-like structure found but could not be recovered")]
    UnrecoverableMalformed,
}
