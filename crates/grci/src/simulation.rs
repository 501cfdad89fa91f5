//! The public simulation handle.

use crate::error::Error;
use grci_common::BitVec;

/// A stepping simulation of one instantiated module.
///
/// Created by [`Compiler::instantiate`](crate::Compiler::instantiate).
/// Inputs staged through the setters are published at the start of the next
/// [`step`](Self::step); outputs reflect the most recent step. Named
/// submodule state is readable and writable between steps.
#[derive(Debug)]
pub struct Simulation {
    inner: grci_sim::Simulation,
}

impl Simulation {
    pub(crate) fn new(inner: grci_sim::Simulation) -> Self {
        Self { inner }
    }

    /// The number of input bits.
    pub fn input_count(&self) -> usize {
        self.inner.input_count()
    }

    /// The number of output bits.
    pub fn output_count(&self) -> usize {
        self.inner.output_count()
    }

    /// The current clock level.
    pub fn clock_level(&self) -> bool {
        self.inner.clock_level()
    }

    /// Stages one input bit for the next step.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= input_count()`.
    pub fn set_input(&mut self, bit: usize, value: bool) {
        self.inner.set_input(bit, value);
    }

    /// Stages the whole input vector for the next step.
    ///
    /// # Panics
    ///
    /// Panics if the slice length differs from `input_count()`.
    pub fn set_inputs(&mut self, bits: &[bool]) {
        self.inner.set_inputs(bits);
    }

    /// Stages the input vector from the low bits of a `u64`.
    ///
    /// # Panics
    ///
    /// Panics if the module has more than 64 input bits.
    pub fn set_inputs_u64(&mut self, value: u64) {
        self.inner.set_inputs_u64(value);
    }

    /// The output bits after the most recent step, bit 0 first.
    pub fn outputs(&self) -> &[bool] {
        self.inner.outputs()
    }

    /// The output bits packed into a `u64`.
    ///
    /// # Panics
    ///
    /// Panics if the module has more than 64 output bits.
    pub fn output_u64(&self) -> u64 {
        self.inner.output_u64()
    }

    /// Advances one half-cycle and returns the new clock level. A rising
    /// edge is a state-updating tick.
    pub fn step(&mut self) -> Result<bool, Error> {
        self.inner.step().map_err(Error::from_sim)
    }

    /// Reads a named submodule's state buffer.
    ///
    /// For a composite, bit i is the i-th DFF of its subtree in declaration
    /// order; for a `Ram64K` part, the 64 KiB store packed
    /// little-bit-endian within each byte. Submodules nest by dotted path
    /// (`"cpu.acc"`).
    pub fn submodule_state(&self, path: &str) -> Result<BitVec, Error> {
        self.inner.submodule_state(path).map_err(Error::from_sim)
    }

    /// Writes a named submodule's state buffer; takes effect immediately.
    pub fn set_submodule_state(&mut self, path: &str, state: &BitVec) -> Result<(), Error> {
        self.inner
            .set_submodule_state(path, state)
            .map_err(Error::from_sim)
    }

    /// Loads a ROM image into a named RAM submodule, word 0 at address 0.
    pub fn load_rom(&mut self, path: &str, words: &[u16]) -> Result<(), Error> {
        self.inner.load_rom(path, words).map_err(Error::from_sim)
    }
}
