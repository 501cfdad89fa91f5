//! AST-to-IR elaboration for GRCI HDL: symbol collection, width inference,
//! and netlist lowering.
//!
//! [`compile_file`] processes a parsed source file module by module, in
//! declaration order, registering each lowered [`ModuleDesc`](grci_ir::ModuleDesc)
//! into the session's [`DescTable`]. Parts may only reference modules
//! declared earlier (the built-ins included), so the table is always
//! self-contained. The pipeline stops at the first error.

#![warn(missing_docs)]

mod errors;
mod infer;
mod lower;
mod module;
mod symbols;

use errors::error;
use grci_common::Interner;
use grci_diagnostics::DiagnosticSink;
use grci_hdl_parser::ast::HdlSourceFile;
use grci_ir::limits::MAX_MODULES;
use grci_ir::DescTable;

/// Compiles every module of a parsed source file into the description table.
///
/// Modules are processed in declaration order; each may instantiate the
/// built-ins and any module registered earlier (including by a previous
/// call — compilation is additive). Returns `false` once a diagnostic with
/// error severity has been emitted; modules lowered before the failure
/// remain registered.
pub fn compile_file(
    ast: &HdlSourceFile,
    table: &mut DescTable,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> bool {
    for decl in &ast.modules {
        if table.lookup(decl.name).is_some() {
            error(
                sink,
                errors::DUPLICATE_MODULE,
                format!("module '{}' is already defined", interner.resolve(decl.name)),
                decl.span,
            );
            return false;
        }
        if table.len() >= MAX_MODULES {
            error(
                sink,
                errors::LIMIT_MODULES,
                format!("the session exceeds {MAX_MODULES} module definitions"),
                decl.span,
            );
            return false;
        }
        match module::lower_module(decl, table, interner, sink) {
            Some(desc) => {
                table.insert(desc);
            }
            None => return false,
        }
    }
    !sink.has_errors()
}
