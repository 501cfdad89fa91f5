//! Module descriptions — the lowered form every declared module compiles to.
//!
//! A [`ModuleDesc`] is fully concrete: every parameter has a bit offset and
//! width, every part input bit has exactly one [`Connection`], and every
//! output bit has exactly one [`Driver`]. The aggregate counts let the
//! elaborator pre-size its node and DFF storage before instantiation.

use crate::ids::DescId;
use grci_common::{Ident, Span};
use serde::{Deserialize, Serialize};

/// Distinguishes the three built-in primitives from user-declared modules.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DescKind {
    /// A user-declared module lowered to parts and wires.
    Composite,
    /// The built-in two-input NAND gate.
    Nand,
    /// The built-in D-type flip-flop.
    Dff,
    /// The built-in 64 KiB RAM with a 16-bit data port.
    Ram64k,
}

impl DescKind {
    /// Returns `true` for the three built-in primitives.
    pub fn is_primitive(self) -> bool {
        self != DescKind::Composite
    }
}

/// An input or output parameter with its resolved bit layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParamDesc {
    /// The parameter name.
    pub name: Ident,
    /// Bit offset within the module's flattened input or output vector.
    pub offset: u32,
    /// Bit width (at least 1).
    pub width: u32,
}

/// The resolved source feeding one input bit of a part.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Connection {
    /// An enclosing-module input bit, by absolute index.
    External(u32),
    /// A sibling part's output bit.
    Internal {
        /// Index of the sibling part in the enclosing module's part list.
        part: u32,
        /// Output bit index within that part.
        bit: u32,
    },
    /// The constant 0 or 1.
    Const(bool),
}

/// The resolved driver of one module output bit.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Driver {
    /// Driven by a part's output bit.
    Part {
        /// Index of the part in the module's part list.
        part: u32,
        /// Output bit index within that part.
        bit: u32,
    },
    /// Driven by the constant 0 or 1.
    Const(bool),
}

/// One part instance inside a module description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartDesc {
    /// The instantiated module.
    pub desc: DescId,
    /// The user-assigned instance name, if any (enables state snapshots).
    pub instance_name: Option<Ident>,
    /// One connection per callee input bit, in callee bit order.
    pub connections: Vec<Connection>,
    /// Source span of the instantiation.
    pub span: Span,
}

/// A fully lowered module description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModuleDesc {
    /// The module name.
    pub name: Ident,
    /// Source span of the declaration ([`Span::SYNTHETIC`] for built-ins).
    pub span: Span,
    /// Whether this is a built-in primitive or a composite.
    pub kind: DescKind,
    /// Input parameters with resolved offsets, in declaration order.
    pub inputs: Vec<ParamDesc>,
    /// Output parameters with resolved offsets, in declaration order.
    pub outputs: Vec<ParamDesc>,
    /// Part instances, in declaration order.
    pub parts: Vec<PartDesc>,
    /// One driver per output bit.
    pub drivers: Vec<Driver>,
    /// Per input bit: how many primitive sinks that bit ultimately drives.
    pub input_sink_counts: Vec<u32>,
    /// Total primitive node count of the elaborated subtree.
    pub node_count: u32,
    /// Total DFF count of the elaborated subtree.
    pub dff_count: u32,
    /// Total RAM block count of the elaborated subtree.
    pub ram_count: u32,
}

impl ModuleDesc {
    /// Total input bit count (sum of input parameter widths).
    pub fn input_bits(&self) -> u32 {
        self.inputs.iter().map(|p| p.width).sum()
    }

    /// Total output bit count (sum of output parameter widths).
    pub fn output_bits(&self) -> u32 {
        self.outputs.iter().map(|p| p.width).sum()
    }

    /// Looks up an input parameter by name.
    pub fn find_input(&self, name: Ident) -> Option<&ParamDesc> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Looks up an output parameter by name.
    pub fn find_output(&self, name: Ident) -> Option<&ParamDesc> {
        self.outputs.iter().find(|p| p.name == name)
    }
}
