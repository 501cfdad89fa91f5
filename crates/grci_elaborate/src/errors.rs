//! Diagnostic emission helpers for the elaboration stage.
//!
//! Width inference and lowering errors use the E2xx block, limit overflows
//! the E3xx block, and lint-style findings the W block.

use grci_diagnostics::code::{Category, DiagnosticCode};
use grci_diagnostics::{Diagnostic, DiagnosticSink};
use grci_common::Span;

/// Emits an elaboration error with the given code number.
pub(crate) fn error(sink: &DiagnosticSink, number: u16, msg: impl Into<String>, span: Span) {
    sink.emit(Diagnostic::error(
        DiagnosticCode::new(Category::Error, number),
        msg,
        span,
    ));
}

/// Emits an elaboration warning with the given code number.
pub(crate) fn warning(sink: &DiagnosticSink, number: u16, msg: impl Into<String>, span: Span) {
    sink.emit(Diagnostic::warning(
        DiagnosticCode::new(Category::Warning, number),
        msg,
        span,
    ));
}

/// Unknown module referenced by a part instantiation.
pub(crate) const UNKNOWN_MODULE: u16 = 201;
/// A module name was defined twice (or shadows a built-in).
pub(crate) const DUPLICATE_MODULE: u16 = 202;
/// A symbol was bound twice within one module body.
pub(crate) const DUPLICATE_SYMBOL: u16 = 203;
/// Argument or binding count differs from the callee's interface.
pub(crate) const ARITY_MISMATCH: u16 = 204;
/// Inferred and declared widths disagree.
pub(crate) const WIDTH_MISMATCH: u16 = 205;
/// An identifier resolves to nothing in the module body.
pub(crate) const UNRESOLVED_IDENT: u16 = 206;
/// A literal other than 0 or 1 in a wiring position.
pub(crate) const BAD_LITERAL: u16 = 207;
/// A slice selects bits outside its base symbol.
pub(crate) const SLICE_OUT_OF_BOUNDS: u16 = 208;
/// A module output was read, or a wire expansion reached an illegal net.
pub(crate) const ILLEGAL_NET: u16 = 209;
/// An output bit has more than one driver.
pub(crate) const MULTIPLE_DRIVERS: u16 = 210;
/// An output bit has no driver.
pub(crate) const UNDRIVEN_OUTPUT: u16 = 211;
/// A binding position was misused (sliced fresh symbol, driven input).
pub(crate) const BAD_BINDING: u16 = 212;
/// A wire was referenced by another wire before its definition.
pub(crate) const WIRE_BEFORE_DEFINITION: u16 = 213;
/// Two sibling parts share an instance name.
pub(crate) const DUPLICATE_INSTANCE: u16 = 214;

/// Module exceeds the part-count limit.
pub(crate) const LIMIT_PARTS: u16 = 301;
/// Module exceeds the wire-count limit.
pub(crate) const LIMIT_WIRES: u16 = 302;
/// Module exceeds the input-bit limit.
pub(crate) const LIMIT_INPUT_BITS: u16 = 303;
/// Module exceeds the output-bit limit.
pub(crate) const LIMIT_OUTPUT_BITS: u16 = 304;
/// Session exceeds the module-definition limit.
pub(crate) const LIMIT_MODULES: u16 = 305;

/// A wire whose output nothing consumes.
pub(crate) const UNUSED_WIRE: u16 = 1;
