//! Common result and error types for the hwgraph compiler.

/// The standard result type for operations that can only fail on a builder bug.
///
/// `Err` indicates an unrecoverable internal error (a broken graph invariant),
/// not a problem with the netlist being compiled. Malformed input is reported
/// through the per-crate error enums instead.
pub type HwResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in the graph builder, not a user input problem.
///
/// These errors should never occur during normal operation. If one does occur,
/// the produced graph would have been silently wrong, so the build is aborted.
#[derive(Debug, thiserror::Error)]
#[error("internal builder error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
