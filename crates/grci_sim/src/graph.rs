//! Hierarchy flattening: module descriptions to a flat simulation graph.
//!
//! Instantiation is recursive and post-order: a part's primitive nodes exist
//! before the enclosing module wires them up. Connections internal to a
//! module are assigned immediately; connections to the enclosing module's
//! inputs are deferred by handing the affected [`Sink`]s up to the caller,
//! which knows the actual drivers. The top level backs every input bit with
//! a dedicated constant node the kernel rewrites each step.

use crate::error::SimError;
use crate::node::{Node, NodeId, NodeKind, RamBlock, RamId, Sink};
use grci_common::Interner;
use grci_ir::{Arena, Connection, DescId, DescKind, DescTable, Driver};
use std::collections::HashMap;

/// The state a named submodule exposes: a range of the declaration-order DFF
/// list, or a whole RAM block when the named part is directly a `Ram64K`.
#[derive(Clone, Copy, Debug)]
pub enum StateRegion {
    /// A contiguous range of the graph's DFF list.
    Dffs {
        /// First DFF index of the subtree.
        start: usize,
        /// Number of DFFs in the subtree.
        len: usize,
    },
    /// A RAM block's 64 KiB store.
    Ram(RamId),
}

/// The flat, fully wired simulation graph of one module instance.
#[derive(Debug)]
pub struct SimGraph {
    /// All primitive nodes, in elaboration order.
    pub nodes: Arena<NodeId, Node>,
    /// All RAM blocks, in elaboration order.
    pub rams: Arena<RamId, RamBlock>,
    /// DFF nodes in elaboration order (depth-first, left to right).
    pub dffs: Vec<NodeId>,
    /// The constant nodes backing each top-level input bit.
    pub inputs: Vec<NodeId>,
    /// The driver node of each top-level output bit.
    pub outputs: Vec<NodeId>,
    /// The shared constant-0 node.
    pub const0: NodeId,
    /// The shared constant-1 node.
    pub const1: NodeId,
    /// Named submodule state regions, keyed by dotted path.
    pub submodules: HashMap<String, StateRegion>,
}

impl SimGraph {
    /// Elaborates the given description into a flat graph.
    ///
    /// Storage is pre-sized from the description's aggregate counts, and a
    /// final validation pass checks that every input slot was assigned
    /// exactly once and the counts came out as published.
    pub fn build(
        table: &DescTable,
        top: DescId,
        interner: &Interner,
    ) -> Result<SimGraph, SimError> {
        let desc = table.get(top);
        let input_bits = desc.input_bits() as usize;

        let mut builder = Builder {
            table,
            interner,
            nodes: Arena::with_capacity(desc.node_count as usize + 2 + input_bits),
            rams: Arena::with_capacity(desc.ram_count as usize),
            dffs: Vec::with_capacity(desc.dff_count as usize),
            submodules: HashMap::new(),
            const0: NodeId::INVALID,
            const1: NodeId::INVALID,
        };
        builder.const0 = builder.nodes.alloc(Node::new(NodeKind::Const));
        builder.const1 = builder.nodes.alloc(Node {
            kind: NodeKind::Const,
            state: true,
        });

        let inputs: Vec<NodeId> = (0..input_bits)
            .map(|_| builder.nodes.alloc(Node::new(NodeKind::Const)))
            .collect();

        let instance = builder.instantiate(top, Some(""))?;
        for (bit, sinks) in instance.sinks.into_iter().enumerate() {
            for sink in sinks {
                builder.assign(sink, inputs[bit])?;
            }
        }

        let graph = SimGraph {
            nodes: builder.nodes,
            rams: builder.rams,
            dffs: builder.dffs,
            inputs,
            outputs: instance.outputs,
            const0: builder.const0,
            const1: builder.const1,
            submodules: builder.submodules,
        };
        graph.validate(desc.node_count, desc.dff_count, desc.ram_count)?;
        Ok(graph)
    }

    /// Checks every input slot was resolved and the counts match the
    /// description's published totals.
    fn validate(&self, node_count: u32, dff_count: u32, ram_count: u32) -> Result<(), SimError> {
        let expected_nodes = node_count as usize + 2 + self.inputs.len();
        if self.nodes.len() != expected_nodes {
            return Err(SimError::Internal(format!(
                "graph has {} nodes, the description published {expected_nodes}",
                self.nodes.len()
            )));
        }
        if self.dffs.len() != dff_count as usize {
            return Err(SimError::Internal(format!(
                "graph has {} DFFs, the description published {dff_count}",
                self.dffs.len()
            )));
        }
        if self.rams.len() != ram_count as usize {
            return Err(SimError::Internal(format!(
                "graph has {} RAMs, the description published {ram_count}",
                self.rams.len()
            )));
        }

        for (_, node) in self.nodes.iter() {
            match node.kind {
                NodeKind::Nand { a, b } if a.is_invalid() || b.is_invalid() => {
                    return Err(SimError::Internal("unresolved NAND input slot".into()));
                }
                NodeKind::Dff { d } if d.is_invalid() => {
                    return Err(SimError::Internal("unresolved DFF input slot".into()));
                }
                _ => {}
            }
        }
        for (_, ram) in self.rams.iter() {
            let unresolved = ram.load.is_invalid()
                || ram.data.iter().any(|id| id.is_invalid())
                || ram.addr.iter().any(|id| id.is_invalid())
                || ram.outs.iter().any(|id| id.is_invalid());
            if unresolved {
                return Err(SimError::Internal("unresolved RAM slot".into()));
            }
        }
        for output in &self.outputs {
            if output.is_invalid() {
                return Err(SimError::Internal("unresolved output driver".into()));
            }
        }
        Ok(())
    }
}

/// A freshly instantiated module: the input slots its caller must drive, and
/// the nodes driving its outputs.
struct Instance {
    /// Per input bit, every primitive slot that bit feeds.
    sinks: Vec<Vec<Sink>>,
    /// Per output bit, the driving node.
    outputs: Vec<NodeId>,
}

struct Builder<'a> {
    table: &'a DescTable,
    interner: &'a Interner,
    nodes: Arena<NodeId, Node>,
    rams: Arena<RamId, RamBlock>,
    dffs: Vec<NodeId>,
    submodules: HashMap<String, StateRegion>,
    const0: NodeId,
    const1: NodeId,
}

impl Builder<'_> {
    /// Instantiates one description. `prefix` is `Some` while the instance
    /// is reachable through named parts from the top; named parts inside an
    /// unnamed part are not addressable.
    fn instantiate(&mut self, desc_id: DescId, prefix: Option<&str>) -> Result<Instance, SimError> {
        let desc = self.table.get(desc_id);
        match desc.kind {
            DescKind::Nand => {
                let id = self.nodes.alloc(Node::new(NodeKind::Nand {
                    a: NodeId::INVALID,
                    b: NodeId::INVALID,
                }));
                Ok(Instance {
                    sinks: vec![vec![Sink::NandA(id)], vec![Sink::NandB(id)]],
                    outputs: vec![id],
                })
            }
            DescKind::Dff => {
                let id = self.nodes.alloc(Node::new(NodeKind::Dff { d: NodeId::INVALID }));
                self.dffs.push(id);
                Ok(Instance {
                    sinks: vec![vec![Sink::DffD(id)]],
                    outputs: vec![id],
                })
            }
            DescKind::Ram64k => Ok(self.instantiate_ram()),
            DescKind::Composite => self.instantiate_composite(desc_id, prefix),
        }
    }

    /// The RAM's sink layout mirrors its interface: the 16 data-in bits,
    /// then load, then the 16 address bits.
    fn instantiate_ram(&mut self) -> Instance {
        let ram = self.rams.alloc(RamBlock::new());
        let mut outs = [NodeId::INVALID; 16];
        for (bit, out) in outs.iter_mut().enumerate() {
            *out = self
                .nodes
                .alloc(Node::new(NodeKind::RamOut { ram, bit: bit as u8 }));
        }
        self.rams.get_mut(ram).outs = outs;

        let mut sinks = Vec::with_capacity(33);
        for bit in 0..16u8 {
            sinks.push(vec![Sink::RamData { ram, bit }]);
        }
        sinks.push(vec![Sink::RamLoad { ram }]);
        for bit in 0..16u8 {
            sinks.push(vec![Sink::RamAddr { ram, bit }]);
        }
        Instance {
            sinks,
            outputs: outs.to_vec(),
        }
    }

    fn instantiate_composite(
        &mut self,
        desc_id: DescId,
        prefix: Option<&str>,
    ) -> Result<Instance, SimError> {
        let desc = self.table.get(desc_id);

        // Post-order: build every child first, recording the DFF and RAM
        // ranges its subtree occupies for named-state access.
        let mut children = Vec::with_capacity(desc.parts.len());
        for part in &desc.parts {
            let dff_mark = self.dffs.len();
            let ram_mark = self.rams.len();

            let child_path = match (prefix, part.instance_name) {
                (Some(prefix), Some(name)) => {
                    let name = self.interner.resolve(name);
                    Some(if prefix.is_empty() {
                        name.to_string()
                    } else {
                        format!("{prefix}.{name}")
                    })
                }
                _ => None,
            };

            let child = self.instantiate(part.desc, child_path.as_deref())?;

            if let Some(path) = child_path {
                let region = if self.table.get(part.desc).kind == DescKind::Ram64k {
                    StateRegion::Ram(RamId::from_raw(ram_mark as u32))
                } else {
                    StateRegion::Dffs {
                        start: dff_mark,
                        len: self.dffs.len() - dff_mark,
                    }
                };
                self.submodules.insert(path, region);
            }
            children.push(child);
        }

        // Wire every child sink according to the connection list. External
        // connections accumulate into this instance's own sink sets.
        let mut sinks: Vec<Vec<Sink>> = desc
            .input_sink_counts
            .iter()
            .map(|&count| Vec::with_capacity(count as usize))
            .collect();
        for (p, part) in desc.parts.iter().enumerate() {
            let child_sinks = std::mem::take(&mut children[p].sinks);
            for (bit, slots) in child_sinks.into_iter().enumerate() {
                match part.connections[bit] {
                    Connection::External(k) => sinks[k as usize].extend(slots),
                    Connection::Internal { part: q, bit: j } => {
                        let driver = children[q as usize].outputs[j as usize];
                        for slot in slots {
                            self.assign(slot, driver)?;
                        }
                    }
                    Connection::Const(value) => {
                        let driver = if value { self.const1 } else { self.const0 };
                        for slot in slots {
                            self.assign(slot, driver)?;
                        }
                    }
                }
            }
        }

        let outputs = desc
            .drivers
            .iter()
            .map(|driver| match *driver {
                Driver::Part { part, bit } => children[part as usize].outputs[bit as usize],
                Driver::Const(value) => {
                    if value {
                        self.const1
                    } else {
                        self.const0
                    }
                }
            })
            .collect();

        Ok(Instance { sinks, outputs })
    }

    /// Points one input slot at its driver. Every slot is assigned exactly
    /// once; a second assignment means the lowered description violated the
    /// single-driver invariant.
    fn assign(&mut self, sink: Sink, driver: NodeId) -> Result<(), SimError> {
        let slot: &mut NodeId = match sink {
            Sink::NandA(id) => match &mut self.nodes.get_mut(id).kind {
                NodeKind::Nand { a, .. } => a,
                _ => return Err(SimError::Internal("sink does not address a NAND".into())),
            },
            Sink::NandB(id) => match &mut self.nodes.get_mut(id).kind {
                NodeKind::Nand { b, .. } => b,
                _ => return Err(SimError::Internal("sink does not address a NAND".into())),
            },
            Sink::DffD(id) => match &mut self.nodes.get_mut(id).kind {
                NodeKind::Dff { d } => d,
                _ => return Err(SimError::Internal("sink does not address a DFF".into())),
            },
            Sink::RamData { ram, bit } => &mut self.rams.get_mut(ram).data[bit as usize],
            Sink::RamLoad { ram } => &mut self.rams.get_mut(ram).load,
            Sink::RamAddr { ram, bit } => &mut self.rams.get_mut(ram).addr[bit as usize],
        };
        if !slot.is_invalid() {
            return Err(SimError::Internal("input slot assigned twice".into()));
        }
        *slot = driver;
        Ok(())
    }
}
