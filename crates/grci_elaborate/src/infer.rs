//! Bit-width inference.
//!
//! Widths are derived in two phases per module, each walking in declaration
//! order. Phase one visits part connections: a bare reference to a
//! still-unknown wire adopts the callee parameter's declared width, and any
//! already-known width is cross-checked. Phase two visits wires: a wire's
//! width is the sum of its source widths, where sources resolve through
//! module inputs, part outputs, earlier-defined wires, and the literals
//! 0 and 1. A final contradiction pass re-checks every part connection and
//! never modifies a width.

use crate::errors::{self, error};
use crate::module::ModuleCx;
use crate::symbols::SymbolKind;
use grci_diagnostics::DiagnosticSink;
use grci_hdl_parser::ast::Expr;

pub(crate) fn run(cx: &mut ModuleCx<'_>, sink: &DiagnosticSink) -> Option<()> {
    phase_parts(cx, sink)?;
    phase_wires(cx, sink)?;
    check_parts(cx, sink)
}

/// Computes an expression's width without reporting anything.
///
/// Returns `None` when the width depends on a symbol whose width is still
/// unknown (or that does not resolve at all).
fn expr_width(cx: &ModuleCx<'_>, expr: &Expr) -> Option<u32> {
    match expr {
        Expr::Literal { .. } => Some(1),
        Expr::Ref { name, slice, .. } => {
            let sym = cx.symbols.lookup(*name)?;
            match slice {
                Some(slice) => Some(slice.width()),
                None => sym.width,
            }
        }
        Expr::Concat { parts, .. } => {
            let mut total = 0;
            for part in parts {
                total += expr_width(cx, part)?;
            }
            Some(total)
        }
    }
}

/// Computes an expression's width, reporting any failure to the sink.
///
/// Used once every width can be known: unresolved identifiers, reads of
/// module outputs, forward wire references, out-of-range slices, and
/// literals other than 0 and 1 are compile errors here.
pub(crate) fn strict_expr_width(
    cx: &ModuleCx<'_>,
    expr: &Expr,
    sink: &DiagnosticSink,
) -> Option<u32> {
    match expr {
        Expr::Literal { value, span } => {
            if *value > 1 {
                error(
                    sink,
                    errors::BAD_LITERAL,
                    format!("literal {value} cannot be wired; only 0 and 1 can"),
                    *span,
                );
                return None;
            }
            Some(1)
        }
        Expr::Ref { name, slice, span } => {
            let Some(sym) = cx.symbols.lookup(*name) else {
                error(
                    sink,
                    errors::UNRESOLVED_IDENT,
                    format!("unresolved identifier '{}'", cx.interner.resolve(*name)),
                    *span,
                );
                return None;
            };
            if matches!(sym.kind, SymbolKind::Output { .. }) {
                error(
                    sink,
                    errors::ILLEGAL_NET,
                    format!(
                        "module output '{}' cannot be read",
                        cx.interner.resolve(*name)
                    ),
                    *span,
                );
                return None;
            }
            let Some(base_width) = sym.width else {
                error(
                    sink,
                    errors::WIRE_BEFORE_DEFINITION,
                    format!(
                        "wire '{}' is referenced before its definition",
                        cx.interner.resolve(*name)
                    ),
                    *span,
                );
                return None;
            };
            match slice {
                Some(slice) => {
                    if slice.end >= base_width {
                        error(
                            sink,
                            errors::SLICE_OUT_OF_BOUNDS,
                            format!(
                                "slice [{}..{}] exceeds the {base_width}-bit symbol '{}'",
                                slice.start,
                                slice.end,
                                cx.interner.resolve(*name)
                            ),
                            slice.span,
                        );
                        return None;
                    }
                    Some(slice.width())
                }
                None => Some(base_width),
            }
        }
        Expr::Concat { parts, .. } => {
            let mut total = 0;
            for part in parts {
                total += strict_expr_width(cx, part, sink)?;
            }
            Some(total)
        }
    }
}

/// Phase one: adopt callee parameter widths into unknown wires and check
/// output bindings against the callee's interface.
fn phase_parts(cx: &mut ModuleCx<'_>, sink: &DiagnosticSink) -> Option<()> {
    for p in 0..cx.parts.len() {
        let stmt = cx.parts[p].stmt.clone();
        let callee = cx.table.get(cx.parts[p].desc);
        let in_widths: Vec<u32> = callee.inputs.iter().map(|i| i.width).collect();
        let out_widths: Vec<u32> = callee.outputs.iter().map(|o| o.width).collect();
        let callee_name = callee.name;

        for (arg, &param_width) in stmt.args.iter().zip(&in_widths) {
            match expr_width(cx, arg) {
                Some(found) => {
                    if found != param_width {
                        error(
                            sink,
                            errors::WIDTH_MISMATCH,
                            format!(
                                "argument to '{}' is {found} bits wide, expected {param_width}",
                                cx.interner.resolve(callee_name)
                            ),
                            arg.span(),
                        );
                        return None;
                    }
                }
                None => {
                    // A bare reference to a not-yet-inferred wire adopts the
                    // parameter's declared width.
                    if let Expr::Ref {
                        name, slice: None, ..
                    } = arg
                    {
                        let is_unknown_wire = cx
                            .symbols
                            .lookup(*name)
                            .is_some_and(|s| s.width.is_none());
                        if is_unknown_wire {
                            cx.symbols.set_width(*name, param_width);
                        }
                    }
                }
            }
        }

        for (binding, &out_width) in stmt.bindings.iter().zip(&out_widths) {
            let Some(sym) = cx.symbols.lookup(binding.name) else {
                continue;
            };
            if !matches!(sym.kind, SymbolKind::Output { .. }) {
                continue;
            }
            let sym_width = sym.width.unwrap_or(1);
            let target_width = match binding.slice {
                Some(slice) => {
                    if slice.end >= sym_width {
                        error(
                            sink,
                            errors::SLICE_OUT_OF_BOUNDS,
                            format!(
                                "slice [{}..{}] exceeds the {sym_width}-bit output '{}'",
                                slice.start,
                                slice.end,
                                cx.interner.resolve(binding.name)
                            ),
                            slice.span,
                        );
                        return None;
                    }
                    slice.width()
                }
                None => sym_width,
            };
            if target_width != out_width {
                error(
                    sink,
                    errors::WIDTH_MISMATCH,
                    format!(
                        "binding '{}' is {target_width} bits wide, part output is {out_width}",
                        cx.interner.resolve(binding.name)
                    ),
                    binding.span,
                );
                return None;
            }
        }
    }
    Some(())
}

/// Phase two: each wire's width is the sum of its source widths.
fn phase_wires(cx: &mut ModuleCx<'_>, sink: &DiagnosticSink) -> Option<()> {
    for w in 0..cx.wires.len() {
        let sources = cx.wires[w].sources.clone();
        let target = cx.wires[w].target.clone();

        let mut total = 0u32;
        for source in &sources {
            total += strict_expr_width(cx, source, sink)?;
        }

        match cx.symbols.lookup(target.name).map(|s| (s.kind, s.width)) {
            Some((SymbolKind::Wire { .. }, Some(adopted))) => {
                // Width was adopted from a part connection in phase one;
                // contradiction checks never modify it.
                if adopted != total {
                    error(
                        sink,
                        errors::WIDTH_MISMATCH,
                        format!(
                            "wire '{}' aggregates {total} bits but is used as {adopted}",
                            cx.interner.resolve(target.name)
                        ),
                        target.span,
                    );
                    return None;
                }
            }
            Some((SymbolKind::Wire { .. }, None)) => {
                cx.symbols.set_width(target.name, total);
            }
            Some((SymbolKind::Output { .. }, width)) => {
                let sym_width = width.unwrap_or(1);
                let target_width = match target.slice {
                    Some(slice) => {
                        if slice.end >= sym_width {
                            error(
                                sink,
                                errors::SLICE_OUT_OF_BOUNDS,
                                format!(
                                    "slice [{}..{}] exceeds the {sym_width}-bit output '{}'",
                                    slice.start,
                                    slice.end,
                                    cx.interner.resolve(target.name)
                                ),
                                slice.span,
                            );
                            return None;
                        }
                        slice.width()
                    }
                    None => sym_width,
                };
                if target_width != total {
                    error(
                        sink,
                        errors::WIDTH_MISMATCH,
                        format!(
                            "wire drives {target_width} output bits but aggregates {total}",
                            ),
                        target.span,
                    );
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(())
}

/// Final contradiction pass over part connections; by now every width is
/// known, so every argument either checks out or is a definite error.
fn check_parts(cx: &mut ModuleCx<'_>, sink: &DiagnosticSink) -> Option<()> {
    for p in 0..cx.parts.len() {
        let stmt = cx.parts[p].stmt.clone();
        let callee = cx.table.get(cx.parts[p].desc);
        let in_widths: Vec<u32> = callee.inputs.iter().map(|i| i.width).collect();
        let callee_name = callee.name;

        for (arg, &param_width) in stmt.args.iter().zip(&in_widths) {
            let found = strict_expr_width(cx, arg, sink)?;
            if found != param_width {
                error(
                    sink,
                    errors::WIDTH_MISMATCH,
                    format!(
                        "argument to '{}' is {found} bits wide, expected {param_width}",
                        cx.interner.resolve(callee_name)
                    ),
                    arg.span(),
                );
                return None;
            }
        }
    }
    Some(())
}
