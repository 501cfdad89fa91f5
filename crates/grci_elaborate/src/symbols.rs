//! Per-module symbol tables for elaboration.
//!
//! A symbol is anything an expression can reference by name: a module input,
//! a module output, a part's output parameter, or a wire. Collection walks
//! the body once in declaration order and registers every *definition*;
//! references are resolved against the finished table, so parts may
//! forward-reference symbols bound later in the body (sequential feedback
//! through DFFs depends on this).

use crate::errors::{self, error};
use crate::module::ModuleCx;
use grci_common::{Ident, Span};
use grci_diagnostics::DiagnosticSink;
use grci_hdl_parser::ast::{BodyItem, ModuleDecl};
use std::collections::HashMap;

/// What a name refers to within a module body.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    /// A module input parameter bit range.
    Input {
        /// Absolute bit offset within the module's input vector.
        offset: u32,
    },
    /// A module output parameter bit range. Outputs are write-only nets.
    Output {
        /// Absolute bit offset within the module's output vector.
        offset: u32,
    },
    /// An output parameter of a part instance.
    PartOutput {
        /// Index of the part in the module's part list.
        part: u32,
        /// Bit offset within that part's output vector.
        offset: u32,
    },
    /// A wire statement's aggregated bus.
    Wire {
        /// Index of the wire in the module's wire list.
        wire: u32,
    },
}

/// One symbol entry: name, what it refers to, and its bit width.
///
/// Width is `None` for a wire until inference computes it.
#[derive(Clone, Debug)]
pub struct Symbol {
    /// The symbol's name.
    pub name: Ident,
    /// What the name refers to.
    pub kind: SymbolKind,
    /// Bit width, `None` while still unknown.
    pub width: Option<u32>,
    /// Where the symbol was introduced.
    pub span: Span,
}

/// The symbol table of one module body.
#[derive(Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<Ident, usize>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new symbol. Returns `false` if the name is already taken.
    pub fn define(&mut self, symbol: Symbol) -> bool {
        if self.by_name.contains_key(&symbol.name) {
            return false;
        }
        self.by_name.insert(symbol.name, self.symbols.len());
        self.symbols.push(symbol);
        true
    }

    /// Looks up a symbol by name.
    pub fn lookup(&self, name: Ident) -> Option<&Symbol> {
        self.by_name.get(&name).map(|&i| &self.symbols[i])
    }

    /// Sets the width of a symbol whose width was unknown.
    pub fn set_width(&mut self, name: Ident, width: u32) {
        if let Some(&i) = self.by_name.get(&name) {
            self.symbols[i].width = Some(width);
        }
    }
}

/// Collects every symbol definition of the module into `cx.symbols`.
///
/// Registers input and output parameters with their cumulative bit offsets,
/// then walks the body registering part output bindings (width taken from
/// the callee's interface) and wire targets (width left unknown). Returns
/// `None` after emitting a diagnostic for the first duplicate or misused
/// binding.
pub(crate) fn collect(cx: &mut ModuleCx<'_>, sink: &DiagnosticSink) -> Option<()> {
    let decl = cx.decl;

    collect_params(cx, decl, sink)?;

    // Body definitions, in declaration order. Parts and wires were already
    // split into cx.parts / cx.wires by the resolve pass.
    let mut part_idx: u32 = 0;
    let mut wire_idx: u32 = 0;
    for item in &decl.body {
        match item {
            BodyItem::Part(_) => {
                collect_part_bindings(cx, part_idx, sink)?;
                part_idx += 1;
            }
            BodyItem::Wire(_) => {
                collect_wire_target(cx, wire_idx, sink)?;
                wire_idx += 1;
            }
        }
    }
    Some(())
}

fn collect_params(cx: &mut ModuleCx<'_>, decl: &ModuleDecl, sink: &DiagnosticSink) -> Option<()> {
    let mut offset = 0u32;
    for param in &decl.params {
        let ok = cx.symbols.define(Symbol {
            name: param.name,
            kind: SymbolKind::Input { offset },
            width: Some(param.bit_width()),
            span: param.span,
        });
        if !ok {
            duplicate(cx, param.name, param.span, sink);
            return None;
        }
        offset += param.bit_width();
    }

    let mut offset = 0u32;
    for output in &decl.outputs {
        let ok = cx.symbols.define(Symbol {
            name: output.name,
            kind: SymbolKind::Output { offset },
            width: Some(output.bit_width()),
            span: output.span,
        });
        if !ok {
            duplicate(cx, output.name, output.span, sink);
            return None;
        }
        offset += output.bit_width();
    }
    Some(())
}

fn collect_part_bindings(cx: &mut ModuleCx<'_>, part: u32, sink: &DiagnosticSink) -> Option<()> {
    let info = &cx.parts[part as usize];
    let callee = cx.table.get(info.desc);
    let stmt = info.stmt.clone();

    let mut offset = 0u32;
    for (binding, out_param) in stmt.bindings.iter().zip(&callee.outputs) {
        match cx.symbols.lookup(binding.name).map(|s| s.kind) {
            // Driving a declared output; resolved during lowering.
            Some(SymbolKind::Output { .. }) => {}
            Some(SymbolKind::Input { .. }) => {
                error(
                    sink,
                    errors::BAD_BINDING,
                    format!(
                        "module input '{}' cannot be driven",
                        cx.interner.resolve(binding.name)
                    ),
                    binding.span,
                );
                return None;
            }
            Some(_) => {
                duplicate(cx, binding.name, binding.span, sink);
                return None;
            }
            None => {
                if binding.slice.is_some() {
                    error(
                        sink,
                        errors::BAD_BINDING,
                        "a slice in binding position requires a declared output",
                        binding.span,
                    );
                    return None;
                }
                cx.symbols.define(Symbol {
                    name: binding.name,
                    kind: SymbolKind::PartOutput { part, offset },
                    width: Some(out_param.width),
                    span: binding.span,
                });
            }
        }
        offset += out_param.width;
    }
    Some(())
}

fn collect_wire_target(cx: &mut ModuleCx<'_>, wire: u32, sink: &DiagnosticSink) -> Option<()> {
    let target = cx.wires[wire as usize].target.clone();
    match cx.symbols.lookup(target.name).map(|s| s.kind) {
        Some(SymbolKind::Output { .. }) => {}
        Some(SymbolKind::Input { .. }) => {
            error(
                sink,
                errors::BAD_BINDING,
                format!(
                    "module input '{}' cannot be driven",
                    cx.interner.resolve(target.name)
                ),
                target.span,
            );
            return None;
        }
        Some(_) => {
            duplicate(cx, target.name, target.span, sink);
            return None;
        }
        None => {
            if target.slice.is_some() {
                error(
                    sink,
                    errors::BAD_BINDING,
                    "a slice in binding position requires a declared output",
                    target.span,
                );
                return None;
            }
            cx.symbols.define(Symbol {
                name: target.name,
                kind: SymbolKind::Wire { wire },
                width: None,
                span: target.span,
            });
        }
    }
    Some(())
}

fn duplicate(cx: &ModuleCx<'_>, name: Ident, span: Span, sink: &DiagnosticSink) {
    error(
        sink,
        errors::DUPLICATE_SYMBOL,
        format!("'{}' is already defined", cx.interner.resolve(name)),
        span,
    );
}
