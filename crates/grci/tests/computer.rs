//! End-to-end test of the full toy computer.
//!
//! A two-phase accumulator machine: every instruction takes a fetch cycle
//! (the instruction register captures the word at the program counter) and
//! an execute cycle (the ALU result commits to the accumulator, stores hit
//! memory, and the program counter advances). Instruction words carry the
//! operand address in bits 0..11 and the opcode in bits 12..15.

mod common;

use common::GATE_LIB;
use grci::Compiler;

const WIDE_GATES: &str = "\
module And4(a, b, c, d) -> out {
And(a, b) -> t1
And(c, d) -> t2
And(t1, t2) -> out
}
module Not16(in[16]) -> out[16] {
Not(in[0]) -> out[0]
Not(in[1]) -> out[1]
Not(in[2]) -> out[2]
Not(in[3]) -> out[3]
Not(in[4]) -> out[4]
Not(in[5]) -> out[5]
Not(in[6]) -> out[6]
Not(in[7]) -> out[7]
Not(in[8]) -> out[8]
Not(in[9]) -> out[9]
Not(in[10]) -> out[10]
Not(in[11]) -> out[11]
Not(in[12]) -> out[12]
Not(in[13]) -> out[13]
Not(in[14]) -> out[14]
Not(in[15]) -> out[15]
}
module Mux16(a[16], b[16], sel) -> out[16] {
Mux(a[0], b[0], sel) -> out[0]
Mux(a[1], b[1], sel) -> out[1]
Mux(a[2], b[2], sel) -> out[2]
Mux(a[3], b[3], sel) -> out[3]
Mux(a[4], b[4], sel) -> out[4]
Mux(a[5], b[5], sel) -> out[5]
Mux(a[6], b[6], sel) -> out[6]
Mux(a[7], b[7], sel) -> out[7]
Mux(a[8], b[8], sel) -> out[8]
Mux(a[9], b[9], sel) -> out[9]
Mux(a[10], b[10], sel) -> out[10]
Mux(a[11], b[11], sel) -> out[11]
Mux(a[12], b[12], sel) -> out[12]
Mux(a[13], b[13], sel) -> out[13]
Mux(a[14], b[14], sel) -> out[14]
Mux(a[15], b[15], sel) -> out[15]
}
module Add16(a[16], b[16], cin) -> out[16] {
FullAdder(a[0], b[0], cin) -> out[0], c0
FullAdder(a[1], b[1], c0) -> out[1], c1
FullAdder(a[2], b[2], c1) -> out[2], c2
FullAdder(a[3], b[3], c2) -> out[3], c3
FullAdder(a[4], b[4], c3) -> out[4], c4
FullAdder(a[5], b[5], c4) -> out[5], c5
FullAdder(a[6], b[6], c5) -> out[6], c6
FullAdder(a[7], b[7], c6) -> out[7], c7
FullAdder(a[8], b[8], c7) -> out[8], c8
FullAdder(a[9], b[9], c8) -> out[9], c9
FullAdder(a[10], b[10], c9) -> out[10], c10
FullAdder(a[11], b[11], c10) -> out[11], c11
FullAdder(a[12], b[12], c11) -> out[12], c12
FullAdder(a[13], b[13], c12) -> out[13], c13
FullAdder(a[14], b[14], c13) -> out[14], c14
FullAdder(a[15], b[15], c14) -> out[15], c15
}
module Register16(in[16], load) -> out[16] {
BitReg(in[0], load) -> out[0]
BitReg(in[1], load) -> out[1]
BitReg(in[2], load) -> out[2]
BitReg(in[3], load) -> out[3]
BitReg(in[4], load) -> out[4]
BitReg(in[5], load) -> out[5]
BitReg(in[6], load) -> out[6]
BitReg(in[7], load) -> out[7]
BitReg(in[8], load) -> out[8]
BitReg(in[9], load) -> out[9]
BitReg(in[10], load) -> out[10]
BitReg(in[11], load) -> out[11]
BitReg(in[12], load) -> out[12]
BitReg(in[13], load) -> out[13]
BitReg(in[14], load) -> out[14]
BitReg(in[15], load) -> out[15]
}
";

/// Opcode decoder: LDA=1, ADD=2, SUB=3, STA=4, HLT=5.
const DECODE: &str = "\
module Decode(op[4]) -> lda, add, sub, sta, hlt {
Not(op[0]) -> n0
Not(op[1]) -> n1
Not(op[2]) -> n2
Not(op[3]) -> n3
And4(op[0], n1, n2, n3) -> lda
And4(n0, op[1], n2, n3) -> add
And4(op[0], op[1], n2, n3) -> sub
And4(n0, n1, op[2], n3) -> sta
And4(op[0], n1, op[2], n3) -> hlt
}
";

const COMPUTER: &str = "\
module Computer() -> halt {
ph: BitReg(phnext, 1) -> phq
hl: BitReg(hlnext, 1) -> hlq
Not(phq) -> nph
Not(hlq) -> nhl
And(nph, nhl) -> fetch
And(phq, nhl) -> exec
pc: Register16(pcnext, exec) -> pcq
ir: Register16(ramq, fetch) -> irq
acc: Register16(alu, exec) -> accq
Decode(irq[12..15]) -> lda, add, sub, sta, hltop
{irq[0..11], 0, 0, 0, 0} -> iaddr
Mux16(pcq, iaddr, phq) -> maddr
And(exec, sta) -> wr
ram: Ram64K(accq, wr, maddr) -> ramq
{0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0} -> zero16
Add16(pcq, zero16, 1) -> pcnext
Add16(accq, ramq, 0) -> sum
Not16(ramq) -> nram
Add16(accq, nram, 1) -> diff
Mux16(accq, ramq, lda) -> alu1
Mux16(alu1, sum, add) -> alu2
Mux16(alu2, diff, sub) -> alu
Mux(nph, phq, hlq) -> phnext
And(exec, hltop) -> hltnow
Or(hlq, hltnow) -> hlnext
hlq -> halt
}
";

const OP_LDA: u16 = 1 << 12;
const OP_ADD: u16 = 2 << 12;
const OP_SUB: u16 = 3 << 12;
const OP_STA: u16 = 4 << 12;
const OP_HLT: u16 = 5 << 12;

fn computer() -> grci::Simulation {
    let mut compiler = Compiler::new();
    compiler.compile("gates.hdl", GATE_LIB).expect("gate library");
    compiler.compile("wide.hdl", WIDE_GATES).expect("wide gates");
    compiler.compile("decode.hdl", DECODE).expect("decoder");
    compiler.compile("computer.hdl", COMPUTER).expect("computer");
    compiler.instantiate("Computer").expect("instantiate")
}

/// Steps until the halt output goes high on a rising edge.
fn run_until_halt(sim: &mut grci::Simulation, max_steps: usize) {
    for _ in 0..max_steps {
        let high = sim.step().expect("step");
        if high && sim.outputs()[0] {
            return;
        }
    }
    panic!("computer did not halt within {max_steps} steps");
}

#[test]
fn toy_computer_runs_its_program() {
    let mut sim = computer();

    // LDA 15; ADD 14; SUB 11; STA 3; HLT — with 30, 5, and 7 as data
    let mut rom = vec![
        OP_LDA | 15,
        OP_ADD | 14,
        OP_SUB | 11,
        OP_STA | 3,
        OP_HLT,
    ];
    rom.resize(16, 0);
    rom[11] = 7;
    rom[14] = 5;
    rom[15] = 30;
    sim.load_rom("ram", &rom).unwrap();

    run_until_halt(&mut sim, 100);

    // acc = mem[15] + mem[14] - mem[11]
    let acc = sim.submodule_state("acc").unwrap();
    assert_eq!(acc.range_u64(0, 16), 30 + 5 - 7);

    // STA 3 wrote the accumulator into memory
    let ram = sim.submodule_state("ram").unwrap();
    assert_eq!(ram.range_u64(3 * 2 * 8, 16), 30 + 5 - 7);

    // The program counter sits past the HLT instruction
    let pc = sim.submodule_state("pc").unwrap();
    assert_eq!(pc.range_u64(0, 16), 5);
}

#[test]
fn toy_computer_halts_in_ten_cycles() {
    let mut sim = computer();
    let mut rom = vec![OP_LDA | 15, OP_ADD | 14, OP_SUB | 11, OP_STA | 3, OP_HLT];
    rom.resize(16, 0);
    rom[11] = 7;
    rom[14] = 5;
    rom[15] = 30;
    sim.load_rom("ram", &rom).unwrap();

    // Five instructions, two cycles each: halt is visible on step 20
    let mut halted_at = None;
    for step in 1..=40 {
        let high = sim.step().unwrap();
        if high && sim.outputs()[0] {
            halted_at = Some(step);
            break;
        }
    }
    assert_eq!(halted_at, Some(20));
}

#[test]
fn accumulator_tracks_each_instruction() {
    let mut sim = computer();
    let mut rom = vec![OP_LDA | 8, OP_ADD | 9, OP_ADD | 9, OP_HLT];
    rom.resize(10, 0);
    rom[8] = 100;
    rom[9] = 11;
    sim.load_rom("ram", &rom).unwrap();

    let mut acc_after_cycle = Vec::new();
    // Each instruction takes a fetch and an execute cycle
    for _ in 0..6 {
        sim.step().unwrap();
        sim.step().unwrap();
        let acc = sim.submodule_state("acc").unwrap();
        acc_after_cycle.push(acc.range_u64(0, 16));
    }
    // fetch, exec(LDA), fetch, exec(ADD), fetch, exec(ADD)
    assert_eq!(acc_after_cycle, vec![0, 100, 100, 111, 111, 122]);
}

#[test]
fn subtraction_wraps_two_complement() {
    let mut sim = computer();
    let mut rom = vec![OP_LDA | 4, OP_SUB | 5, OP_HLT];
    rom.resize(6, 0);
    rom[4] = 10;
    rom[5] = 12;
    sim.load_rom("ram", &rom).unwrap();

    run_until_halt(&mut sim, 100);
    let acc = sim.submodule_state("acc").unwrap();
    // 10 - 12 in 16-bit two's complement
    assert_eq!(acc.range_u64(0, 16), 0xFFFE);
}

#[test]
fn halt_freezes_the_machine() {
    let mut sim = computer();
    let mut rom = vec![OP_LDA | 3, OP_HLT];
    rom.resize(4, 0);
    rom[3] = 55;
    sim.load_rom("ram", &rom).unwrap();

    run_until_halt(&mut sim, 100);
    let pc_at_halt = sim.submodule_state("pc").unwrap().range_u64(0, 16);
    let acc_at_halt = sim.submodule_state("acc").unwrap().range_u64(0, 16);
    assert_eq!(acc_at_halt, 55);

    for _ in 0..10 {
        sim.step().unwrap();
    }
    assert_eq!(
        sim.submodule_state("pc").unwrap().range_u64(0, 16),
        pc_at_halt
    );
    assert_eq!(
        sim.submodule_state("acc").unwrap().range_u64(0, 16),
        acc_at_halt
    );
    // Halt stays asserted
    assert!(sim.outputs()[0]);
}
