//! GRCI: a compiler and simulator for a small structural hardware
//! description language.
//!
//! Source text declares modules whose bodies instantiate previously declared
//! modules ("parts") and aggregate bits into buses ("wires"). Three
//! primitives are built in — a two-input NAND gate, a D flip-flop, and a
//! 64 KiB RAM with a 16-bit port — and everything else decomposes into
//! them, up to a full toy CPU.
//!
//! ```
//! use grci::Compiler;
//!
//! let mut compiler = Compiler::new();
//! compiler
//!     .compile(
//!         "gates.hdl",
//!         "module Not(in) -> out { Nand(in, in) -> out }",
//!     )
//!     .unwrap();
//!
//! let mut sim = compiler.instantiate("Not").unwrap();
//! sim.set_input(0, false);
//! sim.step().unwrap();
//! assert_eq!(sim.outputs(), &[true]);
//! ```

#![warn(missing_docs)]

mod error;
mod simulation;

pub use error::Error;
pub use grci_common::BitVec;
pub use grci_diagnostics::{Diagnostic, Severity};
pub use simulation::Simulation;

use grci_diagnostics::DiagnosticSink;
use grci_elaborate::compile_file;
use grci_hdl_parser::{lex, HdlParser};
use grci_ir::DescTable;
use grci_sim::SimGraph;
use grci_common::SourceDb;

/// A compilation session: source database, interner, and the table of
/// compiled module descriptions, with the built-ins pre-registered.
///
/// Compilation is additive: each [`compile`](Self::compile) call may define
/// further modules on top of everything compiled before. A failing call
/// leaves the modules it compiled before the failure registered; callers
/// that need atomicity discard the session.
pub struct Compiler {
    interner: grci_common::Interner,
    sources: SourceDb,
    table: DescTable,
    warnings: Vec<Diagnostic>,
}

impl Compiler {
    /// Creates a session with `Nand`, `Dff`, and `Ram64K` registered.
    pub fn new() -> Self {
        let interner = grci_common::Interner::new();
        let table = DescTable::new(&interner);
        Self {
            interner,
            sources: SourceDb::new(),
            table,
            warnings: Vec::new(),
        }
    }

    /// Parses, infers, and lowers the module definitions of one source
    /// string. `name` identifies the source in diagnostics.
    ///
    /// The first error encountered aborts the call; warnings accumulate on
    /// the session and are retrievable via [`warnings`](Self::warnings).
    pub fn compile(&mut self, name: &str, source: &str) -> Result<(), Error> {
        let sink = DiagnosticSink::new();
        let source_id = self.sources.add_source(name, source.to_string());

        let tokens = lex(source, source_id, &sink);
        if !sink.has_errors() {
            let mut parser = HdlParser::new(tokens, source, source_id, &self.interner, &sink);
            let ast = parser.parse_source_file();
            if !sink.has_errors() {
                compile_file(&ast, &mut self.table, &self.interner, &sink);
            }
        }

        let mut first_error = None;
        for diag in sink.take_all() {
            if diag.severity.is_error() {
                if first_error.is_none() {
                    first_error = Some(diag);
                }
            } else {
                self.warnings.push(diag);
            }
        }
        match first_error {
            Some(diag) => Err(Error::from_diagnostic(&diag, &self.sources)),
            None => Ok(()),
        }
    }

    /// The warnings accumulated across all compile calls of this session.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Elaborates a flat simulation instance of the named module.
    pub fn instantiate(&self, module: &str) -> Result<Simulation, Error> {
        let desc = self
            .interner
            .get(module)
            .and_then(|ident| self.table.lookup(ident));
        let Some(desc) = desc else {
            return Err(Error::Simulation {
                detail: format!("module '{module}' is not defined"),
            });
        };
        let graph = SimGraph::build(&self.table, desc, &self.interner).map_err(Error::from_sim)?;
        Ok(Simulation::new(grci_sim::Simulation::new(graph)))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_instantiable_without_source() {
        let compiler = Compiler::new();
        let sim = compiler.instantiate("Nand").unwrap();
        assert_eq!(sim.input_count(), 2);
        assert_eq!(sim.output_count(), 1);
    }

    #[test]
    fn unknown_module_is_a_simulation_error() {
        let compiler = Compiler::new();
        let err = compiler.instantiate("Mystery").unwrap_err();
        assert_eq!(
            err.to_string(),
            "GRCI simulation error: module 'Mystery' is not defined"
        );
    }

    #[test]
    fn compile_reports_line_numbers() {
        let mut compiler = Compiler::new();
        let err = compiler
            .compile(
                "bad.hdl",
                "module Not(in) -> out { Nand(in, in) -> out }\n\
                 module Broken(a) -> out {\n\
                 Nand(a, ghost) -> out\n\
                 }",
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "GRCI compilation error near line 3: unresolved identifier 'ghost'"
        );
    }

    #[test]
    fn partial_state_survives_a_failing_compile() {
        let mut compiler = Compiler::new();
        let err = compiler.compile(
            "mixed.hdl",
            "module Not(in) -> out { Nand(in, in) -> out } \
             module Bad(a) -> out { Mystery(a) -> out }",
        );
        assert!(err.is_err());
        // Not compiled before the failure and stays usable
        assert!(compiler.instantiate("Not").is_ok());
    }

    #[test]
    fn compilation_is_additive_across_calls() {
        let mut compiler = Compiler::new();
        compiler
            .compile("lib.hdl", "module Not(in) -> out { Nand(in, in) -> out }")
            .unwrap();
        compiler
            .compile("top.hdl", "module Buf(a) -> out { Not(a) -> na Not(na) -> out }")
            .unwrap();
        let mut sim = compiler.instantiate("Buf").unwrap();
        sim.set_input(0, true);
        sim.step().unwrap();
        assert_eq!(sim.outputs(), &[true]);
    }

    #[test]
    fn warnings_accumulate_without_failing() {
        let mut compiler = Compiler::new();
        compiler
            .compile(
                "lint.hdl",
                "module A(a) -> out { {a, a} -> scratch Nand(a, a) -> out }",
            )
            .unwrap();
        assert_eq!(compiler.warnings().len(), 1);
        assert!(compiler.warnings()[0].message.contains("scratch"));
    }

    #[test]
    fn lexer_errors_carry_lines() {
        let mut compiler = Compiler::new();
        let err = compiler
            .compile("bad.hdl", "module A(a) -> out {\n/* unterminated")
            .unwrap_err();
        let msg = err.to_string();
        assert!(
            msg.starts_with("GRCI compilation error near line 2:"),
            "got: {msg}"
        );
    }
}
