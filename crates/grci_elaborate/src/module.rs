//! Per-module elaboration context and orchestration.
//!
//! Lowering one module declaration runs four passes in order: resolve (split
//! the body, bind callees, check arity and the hard limits), collect (symbol
//! definitions), infer (widths), and lower (connections, drivers, counts).
//! Each pass stops at the first error.

use crate::errors::{self, error};
use crate::symbols::SymbolTable;
use crate::{infer, lower, symbols};
use grci_common::Interner;
use grci_diagnostics::DiagnosticSink;
use grci_hdl_parser::ast::{BodyItem, ModuleDecl, PartStmt, WireStmt};
use grci_ir::limits::{MAX_INPUT_BITS, MAX_OUTPUT_BITS, MAX_PARTS, MAX_WIRES};
use grci_ir::{DescId, DescTable, ModuleDesc};

/// A part statement with its resolved callee.
pub(crate) struct PartInfo {
    /// The part statement from the AST.
    pub stmt: PartStmt,
    /// The callee's description.
    pub desc: DescId,
}

/// Working state for lowering one module declaration.
pub(crate) struct ModuleCx<'a> {
    pub decl: &'a ModuleDecl,
    pub table: &'a DescTable,
    pub interner: &'a Interner,
    pub symbols: SymbolTable,
    /// Parts in declaration order, callees resolved.
    pub parts: Vec<PartInfo>,
    /// Wires in declaration order.
    pub wires: Vec<WireStmt>,
    /// Per-wire usage flag, set during lowering for the unused-wire lint.
    pub wire_used: Vec<bool>,
}

/// Lowers one module declaration to a [`ModuleDesc`].
///
/// Returns `None` after the first diagnostic; the sink holds the error.
pub(crate) fn lower_module<'a>(
    decl: &'a ModuleDecl,
    table: &'a DescTable,
    interner: &'a Interner,
    sink: &DiagnosticSink,
) -> Option<ModuleDesc> {
    let mut cx = ModuleCx {
        decl,
        table,
        interner,
        symbols: SymbolTable::new(),
        parts: Vec::new(),
        wires: Vec::new(),
        wire_used: Vec::new(),
    };

    resolve_body(&mut cx, sink)?;
    check_io_limits(&cx, sink)?;
    symbols::collect(&mut cx, sink)?;
    infer::run(&mut cx, sink)?;
    lower::run(&mut cx, sink)
}

/// Splits the body into parts and wires, resolves every callee, and checks
/// arity against the callee interfaces and the part/wire count limits.
fn resolve_body(cx: &mut ModuleCx<'_>, sink: &DiagnosticSink) -> Option<()> {
    for item in &cx.decl.body {
        match item {
            BodyItem::Part(stmt) => {
                let Some(desc_id) = cx.table.lookup(stmt.callee) else {
                    error(
                        sink,
                        errors::UNKNOWN_MODULE,
                        format!("unknown module '{}'", cx.interner.resolve(stmt.callee)),
                        stmt.span,
                    );
                    return None;
                };
                let callee = cx.table.get(desc_id);
                if stmt.args.len() != callee.inputs.len() {
                    error(
                        sink,
                        errors::ARITY_MISMATCH,
                        format!(
                            "module '{}' takes {} inputs, {} given",
                            cx.interner.resolve(stmt.callee),
                            callee.inputs.len(),
                            stmt.args.len()
                        ),
                        stmt.span,
                    );
                    return None;
                }
                if stmt.bindings.len() != callee.outputs.len() {
                    error(
                        sink,
                        errors::ARITY_MISMATCH,
                        format!(
                            "module '{}' produces {} outputs, {} bound",
                            cx.interner.resolve(stmt.callee),
                            callee.outputs.len(),
                            stmt.bindings.len()
                        ),
                        stmt.span,
                    );
                    return None;
                }
                if cx.parts.len() == MAX_PARTS {
                    error(
                        sink,
                        errors::LIMIT_PARTS,
                        format!("module body exceeds {MAX_PARTS} parts"),
                        stmt.span,
                    );
                    return None;
                }
                cx.parts.push(PartInfo {
                    stmt: stmt.clone(),
                    desc: desc_id,
                });
            }
            BodyItem::Wire(stmt) => {
                if cx.wires.len() == MAX_WIRES {
                    error(
                        sink,
                        errors::LIMIT_WIRES,
                        format!("module body exceeds {MAX_WIRES} wires"),
                        stmt.span,
                    );
                    return None;
                }
                cx.wires.push(stmt.clone());
            }
        }
    }
    cx.wire_used = vec![false; cx.wires.len()];
    Some(())
}

fn check_io_limits(cx: &ModuleCx<'_>, sink: &DiagnosticSink) -> Option<()> {
    let input_bits: u32 = cx.decl.params.iter().map(|p| p.bit_width()).sum();
    if input_bits > MAX_INPUT_BITS {
        error(
            sink,
            errors::LIMIT_INPUT_BITS,
            format!("module declares {input_bits} input bits, the limit is {MAX_INPUT_BITS}"),
            cx.decl.span,
        );
        return None;
    }
    let output_bits: u32 = cx.decl.outputs.iter().map(|p| p.bit_width()).sum();
    if output_bits > MAX_OUTPUT_BITS {
        error(
            sink,
            errors::LIMIT_OUTPUT_BITS,
            format!("module declares {output_bits} output bits, the limit is {MAX_OUTPUT_BITS}"),
            cx.decl.span,
        );
        return None;
    }
    Some(())
}
