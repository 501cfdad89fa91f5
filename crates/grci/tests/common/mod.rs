//! Shared gate library and helpers for the end-to-end tests.
#![allow(dead_code)]

use grci::{Compiler, Simulation};

/// The combinational and register building blocks every test circuit is
/// assembled from. Everything bottoms out in the built-in NAND and DFF.
pub const GATE_LIB: &str = "\
module Not(in) -> out { Nand(in, in) -> out }
module And(a, b) -> out { Nand(a, b) -> nab Not(nab) -> out }
module Or(a, b) -> out { Not(a) -> na Not(b) -> nb Nand(na, nb) -> out }
module Xor(a, b) -> out { Nand(a, b) -> nab Nand(a, nab) -> p Nand(b, nab) -> q Nand(p, q) -> out }
module Mux(a, b, sel) -> out { Not(sel) -> ns Nand(a, ns) -> t1 Nand(b, sel) -> t2 Nand(t1, t2) -> out }
module HalfAdder(a, b) -> sum, carry { Xor(a, b) -> sum And(a, b) -> carry }
module FullAdder(a, b, cin) -> sum, carry { Xor(a, b) -> ab Xor(ab, cin) -> sum And(a, b) -> t1 And(ab, cin) -> t2 Or(t1, t2) -> carry }
module BitReg(in, load) -> out { Dff(d) -> q Mux(q, in, load) -> d q -> out }
";

/// Compiles the gate library plus `extra` and instantiates `top`.
pub fn simulate(extra: &str, top: &str) -> Simulation {
    let mut compiler = Compiler::new();
    compiler.compile("gates.hdl", GATE_LIB).expect("gate library");
    if !extra.is_empty() {
        compiler.compile("extra.hdl", extra).expect("test circuit");
    }
    compiler.instantiate(top).expect("instantiate")
}

/// Steps one full clock cycle: a falling edge, then a rising edge.
pub fn cycle(sim: &mut Simulation) {
    let low = sim.step().expect("falling edge");
    assert!(!low, "expected a falling edge");
    let high = sim.step().expect("rising edge");
    assert!(high, "expected a rising edge");
}

/// Renders the outputs most significant bit first, the way a register dump
/// prints them.
pub fn outputs_msb_first(sim: &Simulation) -> String {
    sim.outputs()
        .iter()
        .rev()
        .map(|&bit| if bit { '1' } else { '0' })
        .collect()
}
