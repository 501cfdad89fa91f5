//! Simulation error types.
//!
//! Simulation errors are rare by construction; the expected one is a request
//! for a submodule name that was never declared. Everything else indicates
//! either a circuit that only a DFF-free cycle could produce, or a violated
//! internal invariant.

/// Errors that can occur during graph construction or stepping.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A named-submodule request did not match any named part.
    #[error("no submodule named '{0}'")]
    UnknownSubmodule(String),

    /// A state buffer of the wrong length was supplied.
    #[error("state for '{name}' is {given} bits, expected {expected}")]
    StateSizeMismatch {
        /// The requested submodule path.
        name: String,
        /// The supplied buffer length in bits.
        given: u32,
        /// The submodule's state length in bits.
        expected: u32,
    },

    /// A ROM image does not fit the RAM.
    #[error("ROM image of {words} words does not fit the RAM")]
    RomTooLarge {
        /// The supplied image length in 16-bit words.
        words: usize,
    },

    /// The combinational evaluator exceeded its depth bound, which only a
    /// cycle not broken by a DFF can cause.
    #[error("combinational depth limit exceeded; the circuit has a cycle not broken by a DFF")]
    DepthLimit,

    /// An invariant of the elaborated graph was violated.
    #[error("internal error: {0}")]
    Internal(String),
}
