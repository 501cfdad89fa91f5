//! The step kernel: clocking, register commits, and combinational evaluation.
//!
//! A step is one clock half-cycle. The clock starts high, so the first step
//! is a falling edge and the first observed rising edge is the first true
//! cycle after reset. On a rising edge every register input — each DFF's
//! data bit and each RAM's address, load, and data-in bits — is sampled
//! against the pre-edge state; RAM stores and DFF commits then apply, in
//! that order, before the memoised combinational pass evaluates the module
//! outputs against the new state.

use crate::error::SimError;
use crate::graph::{SimGraph, StateRegion};
use crate::node::{NodeId, NodeKind, RamId, RAM_BYTES};
use grci_common::BitVec;

/// Number of RAM words a ROM image may occupy (one word per byte pair).
const RAM_WORDS: usize = RAM_BYTES / 2;

/// A stepping simulation of one elaborated module.
///
/// Input bits are staged with the setter methods and published to the graph
/// at the start of the next [`step`](Self::step); output bits reflect the
/// state after the most recent step. Named submodule state can be read and
/// written between steps.
#[derive(Debug)]
pub struct Simulation {
    graph: SimGraph,
    /// Current clock level; starts high so the first step is a falling edge.
    clock: bool,
    inputs: Vec<bool>,
    outputs: Vec<bool>,
    /// Per-node memoisation marks, valid within one evaluation pass.
    visited: Vec<bool>,
    cached: Vec<bool>,
    /// Active evaluation depth, bounded by the node count to catch cycles.
    depth: usize,
}

impl Simulation {
    /// Creates a simulation over the given graph with all inputs low.
    pub fn new(graph: SimGraph) -> Self {
        let node_count = graph.nodes.len();
        Self {
            inputs: vec![false; graph.inputs.len()],
            outputs: vec![false; graph.outputs.len()],
            visited: vec![false; node_count],
            cached: vec![false; node_count],
            clock: true,
            depth: 0,
            graph,
        }
    }

    /// The number of input bits.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// The number of output bits.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// The current clock level.
    pub fn clock_level(&self) -> bool {
        self.clock
    }

    /// Stages one input bit for the next step.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= input_count()`.
    pub fn set_input(&mut self, bit: usize, value: bool) {
        self.inputs[bit] = value;
    }

    /// Stages the whole input vector for the next step.
    ///
    /// # Panics
    ///
    /// Panics if the slice length differs from `input_count()`.
    pub fn set_inputs(&mut self, bits: &[bool]) {
        assert_eq!(bits.len(), self.inputs.len(), "input vector length");
        self.inputs.copy_from_slice(bits);
    }

    /// Stages the input vector from the low bits of a `u64`.
    ///
    /// # Panics
    ///
    /// Panics if the module has more than 64 input bits.
    pub fn set_inputs_u64(&mut self, value: u64) {
        assert!(self.inputs.len() <= 64, "too many input bits for u64");
        for bit in 0..self.inputs.len() {
            self.inputs[bit] = (value >> bit) & 1 != 0;
        }
    }

    /// The output bits after the most recent step, bit 0 first.
    pub fn outputs(&self) -> &[bool] {
        &self.outputs
    }

    /// The output bits packed into a `u64`.
    ///
    /// # Panics
    ///
    /// Panics if the module has more than 64 output bits.
    pub fn output_u64(&self) -> u64 {
        assert!(self.outputs.len() <= 64, "too many output bits for u64");
        self.outputs
            .iter()
            .enumerate()
            .fold(0, |acc, (bit, &v)| acc | ((v as u64) << bit))
    }

    /// Advances one half-cycle and returns the new clock level.
    ///
    /// A rising edge is a state-updating tick; a falling edge only
    /// re-evaluates the combinational outputs against the staged inputs.
    pub fn step(&mut self) -> Result<bool, SimError> {
        // Publish the staged inputs into their backing constant nodes.
        for bit in 0..self.graph.inputs.len() {
            let id = self.graph.inputs[bit];
            self.graph.nodes.get_mut(id).state = self.inputs[bit];
        }

        self.clock = !self.clock;
        if self.clock {
            self.rising_edge()?;
        }

        self.clear_marks();
        for bit in 0..self.graph.outputs.len() {
            let id = self.graph.outputs[bit];
            self.outputs[bit] = self.eval(id)?;
        }
        Ok(self.clock)
    }

    /// Samples every register input against the pre-edge state, then
    /// commits: RAM stores first, DFF states second.
    fn rising_edge(&mut self) -> Result<(), SimError> {
        self.clear_marks();

        let dff_count = self.graph.dffs.len();
        let mut shadow = vec![false; dff_count];
        for i in 0..dff_count {
            let id = self.graph.dffs[i];
            let NodeKind::Dff { d } = self.graph.nodes.get(id).kind else {
                return Err(SimError::Internal("non-DFF node in the DFF list".into()));
            };
            shadow[i] = self.eval(d)?;
        }

        // RAM inputs sample the same pre-edge world; a RamOut reached here
        // reads pre-store memory.
        let ram_count = self.graph.rams.len();
        let mut stores: Vec<Option<(u16, u16)>> = vec![None; ram_count];
        for r in 0..ram_count {
            let ram_id = RamId::from_raw(r as u32);
            let block = self.graph.rams.get(ram_id);
            let (load_slot, data_slots, addr_slots) = (block.load, block.data, block.addr);

            if self.eval(load_slot)? {
                let mut addr = 0u16;
                for (bit, slot) in addr_slots.iter().enumerate() {
                    if self.eval(*slot)? {
                        addr |= 1 << bit;
                    }
                }
                let mut word = 0u16;
                for (bit, slot) in data_slots.iter().enumerate() {
                    if self.eval(*slot)? {
                        word |= 1 << bit;
                    }
                }
                stores[r] = Some((addr, word));
            }
        }

        // Stores happen on the rising edge, before the reads that feed the
        // output pass.
        for (r, store) in stores.into_iter().enumerate() {
            if let Some((addr, word)) = store {
                self.graph.rams.get_mut(RamId::from_raw(r as u32)).write_word(addr, word);
            }
        }
        for i in 0..dff_count {
            let id = self.graph.dffs[i];
            self.graph.nodes.get_mut(id).state = shadow[i];
        }
        Ok(())
    }

    /// Memoised combinational evaluation of one node.
    ///
    /// A DFF yields its registered state without recursing — registers are
    /// the only thing that breaks cycles. The depth counter can exceed the
    /// node count only on a cycle no DFF breaks.
    fn eval(&mut self, id: NodeId) -> Result<bool, SimError> {
        let idx = id.as_raw() as usize;
        if self.visited[idx] {
            return Ok(self.cached[idx]);
        }
        self.depth += 1;
        if self.depth > self.graph.nodes.len() + 1 {
            return Err(SimError::DepthLimit);
        }

        let kind = self.graph.nodes.get(id).kind;
        let value = match kind {
            NodeKind::Const | NodeKind::Dff { .. } => self.graph.nodes.get(id).state,
            NodeKind::Nand { a, b } => {
                let a = self.eval(a)?;
                let b = self.eval(b)?;
                !(a && b)
            }
            NodeKind::RamOut { ram, .. } => {
                self.ram_read(ram)?;
                self.depth -= 1;
                return Ok(self.cached[idx]);
            }
        };

        self.depth -= 1;
        self.visited[idx] = true;
        self.cached[idx] = value;
        Ok(value)
    }

    /// On first touch, reads the word at the RAM's current address and
    /// distributes the 16 bits into the block's RamOut caches.
    fn ram_read(&mut self, ram: RamId) -> Result<(), SimError> {
        let addr_slots = self.graph.rams.get(ram).addr;
        let mut addr = 0u16;
        for (bit, slot) in addr_slots.iter().enumerate() {
            if self.eval(*slot)? {
                addr |= 1 << bit;
            }
        }

        let word = self.graph.rams.get(ram).read_word(addr);
        let outs = self.graph.rams.get(ram).outs;
        for (bit, out) in outs.iter().enumerate() {
            let idx = out.as_raw() as usize;
            self.visited[idx] = true;
            self.cached[idx] = (word >> bit) & 1 != 0;
        }
        Ok(())
    }

    fn clear_marks(&mut self) {
        self.visited.fill(false);
        self.depth = 0;
    }

    /// Reads a named submodule's state buffer.
    ///
    /// For a composite, bit i is the i-th DFF of its subtree in declaration
    /// order. For a RAM, the buffer is the 64 KiB store packed
    /// little-bit-endian within each byte (bit i of byte j at index j·8+i).
    pub fn submodule_state(&self, path: &str) -> Result<BitVec, SimError> {
        match self.graph.submodules.get(path) {
            None => Err(SimError::UnknownSubmodule(path.to_string())),
            Some(&StateRegion::Dffs { start, len }) => {
                let mut bits = BitVec::new(len as u32);
                for i in 0..len {
                    let id = self.graph.dffs[start + i];
                    bits.set(i as u32, self.graph.nodes.get(id).state);
                }
                Ok(bits)
            }
            Some(&StateRegion::Ram(ram)) => {
                let block = self.graph.rams.get(ram);
                let mut bits = BitVec::new((RAM_BYTES * 8) as u32);
                for (byte_idx, &byte) in block.mem.iter().enumerate() {
                    for bit in 0..8 {
                        if (byte >> bit) & 1 != 0 {
                            bits.set((byte_idx * 8 + bit) as u32, true);
                        }
                    }
                }
                Ok(bits)
            }
        }
    }

    /// Writes a named submodule's state buffer; takes effect immediately.
    pub fn set_submodule_state(&mut self, path: &str, state: &BitVec) -> Result<(), SimError> {
        let region = match self.graph.submodules.get(path) {
            None => return Err(SimError::UnknownSubmodule(path.to_string())),
            Some(region) => *region,
        };
        match region {
            StateRegion::Dffs { start, len } => {
                if state.width() != len as u32 {
                    return Err(SimError::StateSizeMismatch {
                        name: path.to_string(),
                        given: state.width(),
                        expected: len as u32,
                    });
                }
                for i in 0..len {
                    let id = self.graph.dffs[start + i];
                    self.graph.nodes.get_mut(id).state = state.get(i as u32);
                }
            }
            StateRegion::Ram(ram) => {
                let expected = (RAM_BYTES * 8) as u32;
                if state.width() != expected {
                    return Err(SimError::StateSizeMismatch {
                        name: path.to_string(),
                        given: state.width(),
                        expected,
                    });
                }
                let block = self.graph.rams.get_mut(ram);
                for (byte_idx, byte) in block.mem.iter_mut().enumerate() {
                    let mut value = 0u8;
                    for bit in 0..8 {
                        if state.get((byte_idx * 8 + bit) as u32) {
                            value |= 1 << bit;
                        }
                    }
                    *byte = value;
                }
            }
        }
        Ok(())
    }

    /// Loads a ROM image into a named RAM submodule, word 0 at address 0.
    pub fn load_rom(&mut self, path: &str, words: &[u16]) -> Result<(), SimError> {
        let region = match self.graph.submodules.get(path) {
            None => return Err(SimError::UnknownSubmodule(path.to_string())),
            Some(region) => *region,
        };
        let StateRegion::Ram(ram) = region else {
            return Err(SimError::Internal(format!(
                "submodule '{path}' is not a RAM"
            )));
        };
        if words.len() > RAM_WORDS {
            return Err(SimError::RomTooLarge { words: words.len() });
        }
        let block = self.graph.rams.get_mut(ram);
        for (addr, &word) in words.iter().enumerate() {
            block.write_word(addr as u16, word);
        }
        Ok(())
    }
}
