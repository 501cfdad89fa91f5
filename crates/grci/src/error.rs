//! The public error type and its wire-format message shape.
//!
//! Every failure renders as `GRCI <phase> error near line N: <detail>`,
//! with the line clause present only for compilation errors that carry a
//! source location.

use grci_diagnostics::Diagnostic;
use grci_sim::SimError;
use grci_common::SourceDb;
use std::fmt;

/// An error from the public compile/instantiate/step surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A mistake in the source program.
    Compilation {
        /// The 1-indexed source line, when known.
        line: Option<u32>,
        /// The underlying diagnostic message.
        detail: String,
    },
    /// A bad runtime request, e.g. an unknown module or submodule name.
    Simulation {
        /// The failure description.
        detail: String,
    },
    /// A violated internal invariant.
    Internal {
        /// The failure description.
        detail: String,
    },
}

impl Error {
    /// Converts the first compile diagnostic into the public error shape,
    /// resolving its span to a line number.
    pub(crate) fn from_diagnostic(diag: &Diagnostic, sources: &SourceDb) -> Self {
        let line = if diag.primary_span.is_synthetic() {
            None
        } else {
            Some(sources.line_of(diag.primary_span))
        };
        Error::Compilation {
            line,
            detail: diag.message.clone(),
        }
    }

    /// Maps a simulator error into the public error shape.
    pub(crate) fn from_sim(err: SimError) -> Self {
        match err {
            SimError::Internal(detail) => Error::Internal { detail },
            other => Error::Simulation {
                detail: other.to_string(),
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compilation {
                line: Some(line),
                detail,
            } => {
                write!(f, "GRCI compilation error near line {line}: {detail}")
            }
            Error::Compilation { line: None, detail } => {
                write!(f, "GRCI compilation error: {detail}")
            }
            Error::Simulation { detail } => write!(f, "GRCI simulation error: {detail}"),
            Error::Internal { detail } => write!(f, "GRCI internal error: {detail}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compilation_with_line() {
        let e = Error::Compilation {
            line: Some(7),
            detail: "unresolved identifier 'ghost'".into(),
        };
        assert_eq!(
            e.to_string(),
            "GRCI compilation error near line 7: unresolved identifier 'ghost'"
        );
    }

    #[test]
    fn compilation_without_line() {
        let e = Error::Compilation {
            line: None,
            detail: "bad".into(),
        };
        assert_eq!(e.to_string(), "GRCI compilation error: bad");
    }

    #[test]
    fn simulation_has_no_line_clause() {
        let e = Error::Simulation {
            detail: "no submodule named 'acc'".into(),
        };
        assert_eq!(
            e.to_string(),
            "GRCI simulation error: no submodule named 'acc'"
        );
    }

    #[test]
    fn internal_shape() {
        let e = Error::Internal {
            detail: "unresolved input slot".into(),
        };
        assert_eq!(e.to_string(), "GRCI internal error: unresolved input slot");
    }

    #[test]
    fn from_sim_splits_internal() {
        let e = Error::from_sim(SimError::Internal("bad graph".into()));
        assert!(matches!(e, Error::Internal { .. }));
        let e = Error::from_sim(SimError::UnknownSubmodule("x".into()));
        assert!(matches!(e, Error::Simulation { .. }));
    }
}
