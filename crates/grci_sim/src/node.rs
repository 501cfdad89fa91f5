//! Primitive nodes of the elaborated simulation graph.
//!
//! The graph is a flat indexed store: nodes reference their drivers by
//! [`NodeId`], never by pointer. During elaboration, input slots start as
//! [`NodeId::INVALID`] placeholders and are assigned exactly once; a
//! validation pass rejects any slot left unresolved.

use grci_ir::ArenaId;
use serde::{Deserialize, Serialize};

/// Bytes of backing storage per RAM block.
pub const RAM_BYTES: usize = 65536;

/// Opaque, copyable ID for a node in the simulation graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Placeholder for an input slot that elaboration has not yet assigned.
    pub const INVALID: NodeId = NodeId(u32::MAX);

    /// Creates an ID from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns `true` for the unassigned placeholder.
    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }
}

impl ArenaId for NodeId {
    fn from_raw(index: u32) -> Self {
        Self(index)
    }

    fn as_raw(self) -> u32 {
        self.0
    }
}

/// Opaque, copyable ID for a RAM block in the simulation graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct RamId(u32);

impl RamId {
    /// Creates an ID from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl ArenaId for RamId {
    fn from_raw(index: u32) -> Self {
        Self(index)
    }

    fn as_raw(self) -> u32 {
        self.0
    }
}

/// The tagged variants of a primitive node.
///
/// The set is closed and small; connections are plain IDs into the node
/// arena, so the whole kind is `Copy`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum NodeKind {
    /// A constant bit: the shared 0 and 1 nodes, and the per-input-bit
    /// nodes the kernel rewrites at the start of every step.
    Const,
    /// A two-input NAND gate.
    Nand {
        /// Driver of the first input.
        a: NodeId,
        /// Driver of the second input.
        b: NodeId,
    },
    /// A D flip-flop; `state` holds its registered value.
    Dff {
        /// Driver of the data input.
        d: NodeId,
    },
    /// One data-out bit of a RAM block.
    RamOut {
        /// The owning RAM block.
        ram: RamId,
        /// Bit position within the 16-bit data word.
        bit: u8,
    },
}

/// A node with its kind and current value.
///
/// For a `Const` node the value is the constant; for a `Dff` it is the
/// registered last state. `Nand` and `RamOut` values live in the kernel's
/// per-step caches instead.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Node {
    /// The node's primitive kind and input slots.
    pub kind: NodeKind,
    /// The constant value or registered state.
    pub state: bool,
}

impl Node {
    /// Creates a node with the given kind and a low initial state.
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, state: false }
    }
}

/// A RAM block: 64 KiB of byte storage plus its input slots and the 16
/// [`NodeKind::RamOut`] nodes it owns.
///
/// A 16-bit word at address `A` occupies bytes `(2A) mod 65536` and the one
/// after it, low byte first, little-bit-endian within each byte.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RamBlock {
    /// The byte-backed storage.
    pub mem: Vec<u8>,
    /// Drivers of the 16 data-in bits.
    pub data: [NodeId; 16],
    /// Driver of the load bit.
    pub load: NodeId,
    /// Drivers of the 16 address bits.
    pub addr: [NodeId; 16],
    /// The 16 data-out nodes, bit 0 first.
    pub outs: [NodeId; 16],
}

impl RamBlock {
    /// Creates a zeroed block with every slot unassigned.
    pub fn new() -> Self {
        Self {
            mem: vec![0; RAM_BYTES],
            data: [NodeId::INVALID; 16],
            load: NodeId::INVALID,
            addr: [NodeId::INVALID; 16],
            outs: [NodeId::INVALID; 16],
        }
    }

    /// Byte offset of the word at the given address.
    fn byte_offset(addr: u16) -> usize {
        (addr as usize * 2) % RAM_BYTES
    }

    /// Reads the 16-bit word at the given address.
    pub fn read_word(&self, addr: u16) -> u16 {
        let base = Self::byte_offset(addr);
        u16::from_le_bytes([self.mem[base], self.mem[base + 1]])
    }

    /// Writes the 16-bit word at the given address.
    pub fn write_word(&mut self, addr: u16, word: u16) {
        let base = Self::byte_offset(addr);
        let bytes = word.to_le_bytes();
        self.mem[base] = bytes[0];
        self.mem[base + 1] = bytes[1];
    }
}

impl Default for RamBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// A typed reference to one primitive input slot, used while elaboration
/// defers external connections to the enclosing instance's caller.
#[derive(Clone, Copy, Debug)]
pub enum Sink {
    /// The first input of a NAND node.
    NandA(NodeId),
    /// The second input of a NAND node.
    NandB(NodeId),
    /// The data input of a DFF node.
    DffD(NodeId),
    /// One data-in bit of a RAM block.
    RamData {
        /// The RAM block.
        ram: RamId,
        /// Bit position within the data word.
        bit: u8,
    },
    /// The load bit of a RAM block.
    RamLoad {
        /// The RAM block.
        ram: RamId,
    },
    /// One address bit of a RAM block.
    RamAddr {
        /// The RAM block.
        ram: RamId,
        /// Bit position within the address.
        bit: u8,
    },
}
