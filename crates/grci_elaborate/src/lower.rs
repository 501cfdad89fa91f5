//! Netlist lowering: symbolic wiring to connection lists and driver tables.
//!
//! For every part input bit the source resolves to an enclosing-module input
//! (`External`), a sibling part's output bit (`Internal`), or a constant;
//! wires expand transitively, contributing one entry per source bit in wire
//! order. Module output bits resolve analogously into the driver table.
//! Afterwards the per-input sink counts and aggregate node counts are summed
//! over the part tree, propagating the numbers published by the primitives.

use crate::errors::{self, error, warning};
use crate::module::ModuleCx;
use crate::symbols::SymbolKind;
use grci_diagnostics::DiagnosticSink;
use grci_hdl_parser::ast::Expr;
use grci_ir::{Connection, DescKind, Driver, ModuleDesc, ParamDesc, PartDesc};
use grci_common::Span;
use std::collections::HashSet;

/// The position a bit source is being resolved for. Wires may not reach a
/// module output when feeding a part, and may not reach a module input when
/// driving an output.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ResolvePos {
    PartInput,
    OutputDriver,
}

pub(crate) fn run(cx: &mut ModuleCx<'_>, sink: &DiagnosticSink) -> Option<ModuleDesc> {
    let inputs = layout_params(cx, true);
    let outputs = layout_params(cx, false);
    let input_bits: u32 = inputs.iter().map(|p| p.width).sum();
    let output_bits: u32 = outputs.iter().map(|p| p.width).sum();

    check_instance_names(cx, sink)?;

    // Part connection lists.
    let mut parts = Vec::with_capacity(cx.parts.len());
    for p in 0..cx.parts.len() {
        let stmt = cx.parts[p].stmt.clone();
        let desc_id = cx.parts[p].desc;
        let callee_bits = cx.table.get(desc_id).input_bits() as usize;

        let mut connections = Vec::with_capacity(callee_bits);
        for arg in &stmt.args {
            resolve_bits(cx, arg, ResolvePos::PartInput, sink, &mut connections)?;
        }
        debug_assert_eq!(connections.len(), callee_bits);

        parts.push(PartDesc {
            desc: desc_id,
            instance_name: stmt.instance_name,
            connections,
            span: stmt.span,
        });
    }

    // Output driver table, filled from part bindings and wire targets.
    let mut drivers: Vec<Option<Driver>> = vec![None; output_bits as usize];
    fill_drivers_from_bindings(cx, &mut drivers, sink)?;
    fill_drivers_from_wires(cx, &mut drivers, sink)?;

    let mut resolved = Vec::with_capacity(drivers.len());
    for (bit, driver) in drivers.into_iter().enumerate() {
        match driver {
            Some(d) => resolved.push(d),
            None => {
                let (name, local) = output_bit_name(cx, &outputs, bit as u32);
                error(
                    sink,
                    errors::UNDRIVEN_OUTPUT,
                    format!("output '{name}' bit {local} has no driver"),
                    cx.decl.span,
                );
                return None;
            }
        }
    }

    // Per-input sink counts, propagated from the callees' published counts.
    let mut input_sink_counts = vec![0u32; input_bits as usize];
    for part in &parts {
        let callee = cx.table.get(part.desc);
        for (bit, connection) in part.connections.iter().enumerate() {
            if let Connection::External(k) = connection {
                input_sink_counts[*k as usize] += callee.input_sink_counts[bit];
            }
        }
    }

    // Aggregate counts pre-size the simulation arenas.
    let node_count = parts.iter().map(|p| cx.table.get(p.desc).node_count).sum();
    let dff_count = parts.iter().map(|p| cx.table.get(p.desc).dff_count).sum();
    let ram_count = parts.iter().map(|p| cx.table.get(p.desc).ram_count).sum();

    warn_unused_wires(cx, sink);

    Some(ModuleDesc {
        name: cx.decl.name,
        span: cx.decl.span,
        kind: DescKind::Composite,
        inputs,
        outputs,
        parts,
        drivers: resolved,
        input_sink_counts,
        node_count,
        dff_count,
        ram_count,
    })
}

fn layout_params(cx: &ModuleCx<'_>, inputs: bool) -> Vec<ParamDesc> {
    let decls = if inputs {
        &cx.decl.params
    } else {
        &cx.decl.outputs
    };
    let mut offset = 0u32;
    let mut params = Vec::with_capacity(decls.len());
    for decl in decls {
        params.push(ParamDesc {
            name: decl.name,
            offset,
            width: decl.bit_width(),
        });
        offset += decl.bit_width();
    }
    params
}

fn check_instance_names(cx: &ModuleCx<'_>, sink: &DiagnosticSink) -> Option<()> {
    let mut seen = HashSet::new();
    for info in &cx.parts {
        if let Some(name) = info.stmt.instance_name {
            if !seen.insert(name) {
                error(
                    sink,
                    errors::DUPLICATE_INSTANCE,
                    format!(
                        "instance name '{}' is used twice",
                        cx.interner.resolve(name)
                    ),
                    info.stmt.span,
                );
                return None;
            }
        }
    }
    Some(())
}

/// Appends one [`Connection`] per bit of `expr`, in bit order.
fn resolve_bits(
    cx: &mut ModuleCx<'_>,
    expr: &Expr,
    pos: ResolvePos,
    sink: &DiagnosticSink,
    out: &mut Vec<Connection>,
) -> Option<()> {
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
            out.push(Connection::Const(*value == 1));
            Some(())
        }
        Expr::Concat { parts, .. } => {
            for part in parts {
                resolve_bits(cx, part, pos, sink, out)?;
            }
            Some(())
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
            let width = sym.width.unwrap_or(0);
            let (lo, hi) = match slice {
                Some(s) => (s.start, s.end),
                None => (0, width.saturating_sub(1)),
            };
            match sym.kind {
                SymbolKind::Input { offset } => {
                    if pos == ResolvePos::OutputDriver {
                        error(
                            sink,
                            errors::ILLEGAL_NET,
                            format!(
                                "a module output cannot be driven by module input '{}'",
                                cx.interner.resolve(*name)
                            ),
                            *span,
                        );
                        return None;
                    }
                    for bit in lo..=hi {
                        out.push(Connection::External(offset + bit));
                    }
                    Some(())
                }
                SymbolKind::Output { .. } => {
                    error(
                        sink,
                        errors::ILLEGAL_NET,
                        format!(
                            "module output '{}' cannot be read",
                            cx.interner.resolve(*name)
                        ),
                        *span,
                    );
                    None
                }
                SymbolKind::PartOutput { part, offset } => {
                    for bit in lo..=hi {
                        out.push(Connection::Internal {
                            part,
                            bit: offset + bit,
                        });
                    }
                    Some(())
                }
                SymbolKind::Wire { wire } => {
                    cx.wire_used[wire as usize] = true;
                    let sources = cx.wires[wire as usize].sources.clone();
                    let mut bits = Vec::new();
                    for source in &sources {
                        resolve_bits(cx, source, pos, sink, &mut bits)?;
                    }
                    if hi as usize >= bits.len() {
                        error(
                            sink,
                            errors::SLICE_OUT_OF_BOUNDS,
                            format!(
                                "slice [{lo}..{hi}] exceeds the {}-bit wire '{}'",
                                bits.len(),
                                cx.interner.resolve(*name)
                            ),
                            *span,
                        );
                        return None;
                    }
                    out.extend_from_slice(&bits[lo as usize..=hi as usize]);
                    Some(())
                }
            }
        }
    }
}

fn fill_drivers_from_bindings(
    cx: &mut ModuleCx<'_>,
    drivers: &mut [Option<Driver>],
    sink: &DiagnosticSink,
) -> Option<()> {
    for p in 0..cx.parts.len() {
        let stmt = cx.parts[p].stmt.clone();
        let callee = cx.table.get(cx.parts[p].desc);
        let out_params: Vec<(u32, u32)> =
            callee.outputs.iter().map(|o| (o.offset, o.width)).collect();

        for (binding, &(part_offset, width)) in stmt.bindings.iter().zip(&out_params) {
            let Some(sym) = cx.symbols.lookup(binding.name) else {
                continue;
            };
            let SymbolKind::Output { offset } = sym.kind else {
                continue;
            };
            let start = offset + binding.slice.map_or(0, |s| s.start);
            for bit in 0..width {
                set_driver(
                    drivers,
                    start + bit,
                    Driver::Part {
                        part: p as u32,
                        bit: part_offset + bit,
                    },
                    binding.span,
                    sink,
                )?;
            }
        }
    }
    Some(())
}

fn fill_drivers_from_wires(
    cx: &mut ModuleCx<'_>,
    drivers: &mut [Option<Driver>],
    sink: &DiagnosticSink,
) -> Option<()> {
    for w in 0..cx.wires.len() {
        let target = cx.wires[w].target.clone();
        let Some(sym) = cx.symbols.lookup(target.name) else {
            continue;
        };
        let SymbolKind::Output { offset } = sym.kind else {
            continue;
        };

        cx.wire_used[w] = true;
        let sources = cx.wires[w].sources.clone();
        let mut bits = Vec::new();
        for source in &sources {
            resolve_bits(cx, source, ResolvePos::OutputDriver, sink, &mut bits)?;
        }

        let start = offset + target.slice.map_or(0, |s| s.start);
        for (i, bit) in bits.iter().enumerate() {
            let driver = match *bit {
                Connection::Internal { part, bit } => Driver::Part { part, bit },
                Connection::Const(value) => Driver::Const(value),
                // Resolution in output-driver position rejects inputs.
                Connection::External(_) => unreachable!("external bit in output driver"),
            };
            set_driver(drivers, start + i as u32, driver, target.span, sink)?;
        }
    }
    Some(())
}

fn set_driver(
    drivers: &mut [Option<Driver>],
    bit: u32,
    driver: Driver,
    span: Span,
    sink: &DiagnosticSink,
) -> Option<()> {
    let slot = &mut drivers[bit as usize];
    if slot.is_some() {
        error(
            sink,
            errors::MULTIPLE_DRIVERS,
            format!("output bit {bit} has more than one driver"),
            span,
        );
        return None;
    }
    *slot = Some(driver);
    Some(())
}

/// Maps an absolute output bit back to its parameter name and local bit.
fn output_bit_name(cx: &ModuleCx<'_>, outputs: &[ParamDesc], bit: u32) -> (String, u32) {
    for param in outputs {
        if bit >= param.offset && bit < param.offset + param.width {
            return (
                cx.interner.resolve(param.name).to_string(),
                bit - param.offset,
            );
        }
    }
    ("?".to_string(), bit)
}

fn warn_unused_wires(cx: &ModuleCx<'_>, sink: &DiagnosticSink) {
    for (w, used) in cx.wire_used.iter().enumerate() {
        if !used {
            let target = &cx.wires[w].target;
            warning(
                sink,
                errors::UNUSED_WIRE,
                format!(
                    "wire '{}' is never used",
                    cx.interner.resolve(target.name)
                ),
                target.span,
            );
        }
    }
}
