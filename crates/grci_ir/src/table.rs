//! The description table: every compiled module plus the three built-ins.

use crate::arena::Arena;
use crate::description::{DescKind, ModuleDesc, ParamDesc};
use crate::ids::DescId;
use grci_common::{Ident, Interner, Span};
use std::collections::HashMap;

/// All module descriptions of a compilation session, indexed by [`DescId`]
/// and by interned name.
///
/// Construction registers the built-in primitives `Nand`, `Dff`, and
/// `Ram64K`; those names always resolve and cannot be redefined. Repeat
/// compile calls add descriptions; nothing is ever removed.
pub struct DescTable {
    descs: Arena<DescId, ModuleDesc>,
    by_name: HashMap<Ident, DescId>,
    nand: DescId,
    dff: DescId,
    ram: DescId,
}

impl DescTable {
    /// Creates a table with the three built-in primitives registered.
    pub fn new(interner: &Interner) -> Self {
        let mut descs = Arena::new();
        let mut by_name = HashMap::new();

        let nand = descs.alloc(nand_desc(interner));
        let dff = descs.alloc(dff_desc(interner));
        let ram = descs.alloc(ram_desc(interner));
        by_name.insert(descs[nand].name, nand);
        by_name.insert(descs[dff].name, dff);
        by_name.insert(descs[ram].name, ram);

        Self {
            descs,
            by_name,
            nand,
            dff,
            ram,
        }
    }

    /// Returns the description with the given ID.
    pub fn get(&self, id: DescId) -> &ModuleDesc {
        &self.descs[id]
    }

    /// Looks up a description by interned name.
    pub fn lookup(&self, name: Ident) -> Option<DescId> {
        self.by_name.get(&name).copied()
    }

    /// Inserts a compiled description, registering its name.
    ///
    /// The caller is responsible for rejecting duplicate names and enforcing
    /// the definition-count limit beforehand.
    pub fn insert(&mut self, desc: ModuleDesc) -> DescId {
        let name = desc.name;
        let id = self.descs.alloc(desc);
        self.by_name.insert(name, id);
        id
    }

    /// The number of registered descriptions, built-ins included.
    pub fn len(&self) -> usize {
        self.descs.len()
    }

    /// Returns `true` if no descriptions are registered (never the case
    /// after construction).
    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    /// The built-in NAND gate.
    pub fn nand_id(&self) -> DescId {
        self.nand
    }

    /// The built-in D flip-flop.
    pub fn dff_id(&self) -> DescId {
        self.dff
    }

    /// The built-in RAM.
    pub fn ram_id(&self) -> DescId {
        self.ram
    }
}

fn nand_desc(interner: &Interner) -> ModuleDesc {
    ModuleDesc {
        name: interner.get_or_intern("Nand"),
        span: Span::SYNTHETIC,
        kind: DescKind::Nand,
        inputs: vec![
            ParamDesc {
                name: interner.get_or_intern("a"),
                offset: 0,
                width: 1,
            },
            ParamDesc {
                name: interner.get_or_intern("b"),
                offset: 1,
                width: 1,
            },
        ],
        outputs: vec![ParamDesc {
            name: interner.get_or_intern("out"),
            offset: 0,
            width: 1,
        }],
        parts: Vec::new(),
        drivers: Vec::new(),
        input_sink_counts: vec![1, 1],
        node_count: 1,
        dff_count: 0,
        ram_count: 0,
    }
}

fn dff_desc(interner: &Interner) -> ModuleDesc {
    ModuleDesc {
        name: interner.get_or_intern("Dff"),
        span: Span::SYNTHETIC,
        kind: DescKind::Dff,
        inputs: vec![ParamDesc {
            name: interner.get_or_intern("in"),
            offset: 0,
            width: 1,
        }],
        outputs: vec![ParamDesc {
            name: interner.get_or_intern("out"),
            offset: 0,
            width: 1,
        }],
        parts: Vec::new(),
        drivers: Vec::new(),
        input_sink_counts: vec![1],
        node_count: 1,
        dff_count: 1,
        ram_count: 0,
    }
}

/// The RAM's input layout is the 16 data bits, then the load bit, then the
/// 16 address bits (33 sinks total); its outputs are the 16 data-out bits.
fn ram_desc(interner: &Interner) -> ModuleDesc {
    ModuleDesc {
        name: interner.get_or_intern("Ram64K"),
        span: Span::SYNTHETIC,
        kind: DescKind::Ram64k,
        inputs: vec![
            ParamDesc {
                name: interner.get_or_intern("in"),
                offset: 0,
                width: 16,
            },
            ParamDesc {
                name: interner.get_or_intern("load"),
                offset: 16,
                width: 1,
            },
            ParamDesc {
                name: interner.get_or_intern("address"),
                offset: 17,
                width: 16,
            },
        ],
        outputs: vec![ParamDesc {
            name: interner.get_or_intern("out"),
            offset: 0,
            width: 16,
        }],
        parts: Vec::new(),
        drivers: Vec::new(),
        input_sink_counts: vec![1; 33],
        node_count: 16,
        dff_count: 0,
        ram_count: 1,
    }
}
