//! Common result and error types for the GRCI toolchain.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an unrecoverable internal error (a bug in GRCI), not a
/// user-facing error. User errors are reported through the diagnostic sink
/// or the simulation error type.
pub type GrciResult<T> = Result<T, InternalError>;

/// An internal compiler error indicating a bug in GRCI, not a user input problem.
///
/// These errors should never occur during normal operation. If one does occur,
/// it means an invariant of the netlist or the simulation graph was violated.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("unresolved input slot");
        assert_eq!(format!("{err}"), "internal error: unresolved input slot");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }

    #[test]
    fn result_alias() {
        let ok: GrciResult<u32> = Ok(7);
        assert_eq!(ok.ok(), Some(7));
        let err: GrciResult<u32> = Err(InternalError::new("bad"));
        assert!(err.is_err());
    }
}
