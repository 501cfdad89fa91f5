//! End-to-end tests for purely combinational circuits.

mod common;

use common::{outputs_msb_first, simulate};
use grci::Compiler;

#[test]
fn nand_primitive_truth_table() {
    // Nothing needs to be compiled; the primitive is built in.
    let compiler = Compiler::new();
    let mut sim = compiler.instantiate("Nand").unwrap();
    for (a, b, expected) in [
        (false, false, true),
        (false, true, true),
        (true, false, true),
        (true, true, false),
    ] {
        sim.set_inputs(&[a, b]);
        sim.step().unwrap();
        assert_eq!(sim.outputs(), &[expected], "NAND({a}, {b})");
    }
}

#[test]
fn and_from_two_gates() {
    let mut compiler = Compiler::new();
    compiler
        .compile(
            "and.hdl",
            "module Not(in) -> out { Nand(in, in) -> out } \
             module And(a,b) -> out { Nand(a,b) -> t Not(t) -> out }",
        )
        .unwrap();
    let mut sim = compiler.instantiate("And").unwrap();
    for (a, b, expected) in [
        (false, false, false),
        (false, true, false),
        (true, false, false),
        (true, true, true),
    ] {
        sim.set_inputs(&[a, b]);
        sim.step().unwrap();
        assert_eq!(sim.outputs(), &[expected], "AND({a}, {b})");
    }
}

#[test]
fn xor_truth_table() {
    let mut sim = simulate("", "Xor");
    for (a, b, expected) in [
        (false, false, false),
        (false, true, true),
        (true, false, true),
        (true, true, false),
    ] {
        sim.set_inputs(&[a, b]);
        sim.step().unwrap();
        assert_eq!(sim.outputs(), &[expected], "XOR({a}, {b})");
    }
}

#[test]
fn mux_selects() {
    let mut sim = simulate("", "Mux");
    // sel low picks a, sel high picks b
    for (a, b, sel, expected) in [
        (true, false, false, true),
        (true, false, true, false),
        (false, true, false, false),
        (false, true, true, true),
    ] {
        sim.set_inputs(&[a, b, sel]);
        sim.step().unwrap();
        assert_eq!(sim.outputs(), &[expected], "MUX({a}, {b}, {sel})");
    }
}

#[test]
fn full_adder_sums() {
    let mut sim = simulate("", "FullAdder");
    for a in 0..2u64 {
        for b in 0..2u64 {
            for cin in 0..2u64 {
                sim.set_inputs_u64(a | (b << 1) | (cin << 2));
                sim.step().unwrap();
                assert_eq!(sim.output_u64(), a + b + cin, "{a}+{b}+{cin}");
            }
        }
    }
}

const ADD8: &str = "\
module Add8(a[8], b[8]) -> out[8] {
HalfAdder(a[0], b[0]) -> out[0], c0
FullAdder(a[1], b[1], c0) -> out[1], c1
FullAdder(a[2], b[2], c1) -> out[2], c2
FullAdder(a[3], b[3], c2) -> out[3], c3
FullAdder(a[4], b[4], c3) -> out[4], c4
FullAdder(a[5], b[5], c4) -> out[5], c5
FullAdder(a[6], b[6], c5) -> out[6], c6
FullAdder(a[7], b[7], c6) -> out[7], c7
}
";

#[test]
fn add8_thirty_two_plus_ten_is_forty_two() {
    let mut sim = simulate(ADD8, "Add8");
    assert_eq!(sim.input_count(), 16);
    assert_eq!(sim.output_count(), 8);

    // a = 32 and b = 10, both presented bit 0 first
    sim.set_inputs_u64(32 | (10 << 8));
    sim.step().unwrap();
    assert_eq!(sim.output_u64(), 42);
    // Read most significant bit first, the outputs spell the byte 42
    assert_eq!(outputs_msb_first(&sim), "00101010");
}

#[test]
fn add8_exhaustive_carry_chain() {
    let mut sim = simulate(ADD8, "Add8");
    for (a, b) in [(0u64, 0u64), (255, 1), (128, 128), (200, 100), (1, 254)] {
        sim.set_inputs_u64(a | (b << 8));
        sim.step().unwrap();
        assert_eq!(sim.output_u64(), (a + b) & 0xFF, "{a}+{b}");
    }
}

#[test]
fn combinational_outputs_ignore_clock_level() {
    let mut sim = simulate(ADD8, "Add8");
    sim.set_inputs_u64(77 | (33 << 8));
    for _ in 0..5 {
        sim.step().unwrap();
        assert_eq!(sim.output_u64(), 110);
    }
}
