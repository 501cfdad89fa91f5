//! Shared foundational types for the GRCI HDL compiler and simulator.
//!
//! This crate provides interned identifiers, packed bit vectors used for
//! input/output vectors and state buffers, source-text storage with span
//! tracking for error lines, and the common internal-error type.

#![warn(missing_docs)]

pub mod bits;
pub mod ident;
pub mod result;
pub mod source;
pub mod span;

pub use bits::BitVec;
pub use ident::{Ident, Interner};
pub use result::{GrciResult, InternalError};
pub use source::{SourceDb, SourceText};
pub use span::{SourceId, Span};
