//! End-to-end scenarios straight out of the core's testable-properties list:
//! literal memory images and register state, run for a fixed number of
//! instructions, checked against the documented final state.
//!
//! Scenarios 1, 2, 4, and 5 exercise the CPU core directly against a flat
//! 64 KiB harness (no RAM mirroring), since the documented addresses
//! overlap what a real NES's $0000-$1FFF mirroring would otherwise alias.
//! Scenario 6 needs the PPU and runs through the full `Nes` motherboard.

use nes_core::devices::bus::Motherboard;
use nes_core::devices::cpu::{self, Cpu6502, Status, WithCpu};
use nes_core::Nes;

/// Route `log::warn!`/`log::debug!` (unknown-opcode, unmapped-access
/// diagnostics) to stderr when these tests run with `--nocapture`. Safe to
/// call more than once; every test calls it, and only the first init wins.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct FlatBus {
    cpu: Cpu6502,
    mem: [u8; 0x10000],
}

impl FlatBus {
    fn new() -> FlatBus {
        FlatBus {
            cpu: Cpu6502::new(),
            mem: [0u8; 0x10000],
        }
    }

    fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.mem[addr as usize + i] = b;
        }
    }
}

impl WithCpu for FlatBus {
    fn cpu(&self) -> &Cpu6502 {
        &self.cpu
    }
    fn cpu_mut(&mut self) -> &mut Cpu6502 {
        &mut self.cpu
    }
}

impl Motherboard for FlatBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }
    fn peek(&self, addr: u16) -> Option<u8> {
        Some(self.mem[addr as usize])
    }
    fn write(&mut self, addr: u16, data: u8) {
        self.mem[addr as usize] = data;
    }
}

#[test]
fn scenario_1_adc_immediate() {
    init_logging();
    let mut bus = FlatBus::new();
    bus.load(0x0000, &[0xA9, 0x05, 0x69, 0x03]); // LDA #5; ADC #3
    bus.cpu.state.pc = 0x0000;
    bus.cpu.state.status.remove(Status::CARRY);

    cpu::exec(&mut bus);
    cpu::exec(&mut bus);

    assert_eq!(bus.cpu.state.acc, 0x08);
    assert!(!bus.cpu.state.status.contains(Status::ZERO));
    assert!(!bus.cpu.state.status.contains(Status::NEGATIVE));
    assert!(!bus.cpu.state.status.contains(Status::CARRY));
    assert!(!bus.cpu.state.status.contains(Status::OVERFLOW));
}

#[test]
fn scenario_2_sbc_immediate_with_carry_set_first() {
    init_logging();
    let mut bus = FlatBus::new();
    bus.load(0x0000, &[0x38, 0xA9, 0x05, 0xE9, 0x03]); // SEC; LDA #5; SBC #3
    bus.cpu.state.pc = 0x0000;

    cpu::exec(&mut bus);
    cpu::exec(&mut bus);
    cpu::exec(&mut bus);

    assert_eq!(bus.cpu.state.acc, 0x02);
    assert!(bus.cpu.state.status.contains(Status::CARRY));
    assert!(!bus.cpu.state.status.contains(Status::ZERO));
    assert!(!bus.cpu.state.status.contains(Status::NEGATIVE));
    assert!(!bus.cpu.state.status.contains(Status::OVERFLOW));
}

#[test]
fn scenario_3_indirect_jmp_page_boundary_bug() {
    init_logging();
    let mut bus = FlatBus::new();
    bus.mem[0x00FF] = 0x34;
    bus.mem[0x0000] = 0x12; // the page bug reads the high byte from here
    bus.mem[0x1000] = 0x40; // decoy: if the bug were absent, $0100 would read this
    bus.load(0x2000, &[0x6C, 0xFF, 0x00]); // JMP ($00FF)
    bus.cpu.state.pc = 0x2000;

    cpu::exec(&mut bus);

    assert_eq!(bus.cpu.state.pc, 0x1234);
}

#[test]
fn scenario_4_branch_cross_page_cost() {
    init_logging();
    let mut bus = FlatBus::new();
    bus.load(0x10F0, &[0xA9, 0x00, 0xF0, 0x10]); // LDA #0; BEQ +$10
    bus.cpu.state.pc = 0x10F0;

    cpu::exec(&mut bus); // LDA #0
    cpu::exec(&mut bus); // BEQ, taken, crosses from page $10 to $11

    // Relative addressing measures from the PC immediately after the 2-byte
    // branch instruction ($10F4), not from the opcode's own address, so
    // +$10 lands at $1104 (see DESIGN.md for why this differs from the
    // literal PC the distilled spec's scenario quotes).
    assert_eq!(bus.cpu.state.pc, 0x1104);
    // 2 base + 1 taken + 1 page-cross = 4, minus the cycle `exec` already
    // billed for entering the instruction.
    assert_eq!(bus.cpu.cycles, 3);
}

#[test]
fn scenario_5_jsr_then_rts_round_trips_to_the_byte_after_the_operand() {
    init_logging();
    let mut bus = FlatBus::new();
    bus.load(0x0000, &[0x20, 0x05, 0x00, 0xEA, 0xEA]); // JSR $0005; NOP; NOP
    bus.mem[0x0005] = 0x60; // RTS
    bus.cpu.state.pc = 0x0000;
    bus.cpu.state.stack = 0xFD;

    cpu::exec(&mut bus); // JSR
    assert_eq!(bus.cpu.state.pc, 0x0005);
    assert_eq!(bus.mem[0x01FC], 0x02);
    assert_eq!(bus.mem[0x01FD], 0x00);

    cpu::exec(&mut bus); // RTS

    assert_eq!(bus.cpu.state.pc, 0x0003);
    assert_eq!(bus.cpu.state.stack, 0xFD);
}

/// Builds a minimal NROM image with a given reset vector and NMI vector.
/// The reset vector points at a `JMP` back to itself, so the CPU idles in
/// place (no stack traffic) until an interrupt pulls it away, rather than
/// running off the end of a zeroed PRG bank into a string of `BRK`s.
fn rom_with_vectors(reset_pc: u16, nmi_pc: u16) -> Vec<u8> {
    let mut bytes = vec![0x4E, 0x45, 0x53, 0x1A, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    bytes.resize(16 + 0x4000 * 2, 0);
    let prg_offset = 16 + (reset_pc - 0x8000) as usize;
    let [reset_lo, reset_hi] = reset_pc.to_le_bytes();
    bytes[prg_offset] = 0x4C; // JMP absolute
    bytes[prg_offset + 1] = reset_lo;
    bytes[prg_offset + 2] = reset_hi;
    let end = 16 + 0x4000 * 2;
    let [nmi_lo, nmi_hi] = nmi_pc.to_le_bytes();
    bytes[end - 6] = nmi_lo;
    bytes[end - 5] = nmi_hi;
    bytes[end - 4] = reset_lo;
    bytes[end - 3] = reset_hi;
    bytes.resize(bytes.len() + 0x2000, 0);
    bytes
}

#[test]
fn scenario_6_vblank_nmi_vectors_the_cpu_at_scanline_241_dot_1() {
    init_logging();
    use nes_core::devices::ppu::{PpuControlFlags, WithPpu};

    let rom = rom_with_vectors(0x8000, 0x00C0);
    let mut nes = Nes::from_rom(&rom).unwrap();

    // CTRL bit 7 = 1 (enable VBlank NMI).
    nes.write(0x2000, PpuControlFlags::VBLANK_NMI_ENABLE.bits());
    let sp_before = nes.cpu().state.stack;

    // Drive dots until the PPU crosses scanline 241 dot 1, then let the CPU
    // finish whatever instruction it was mid-execution of and service the
    // latched NMI on the next fetch.
    while !(nes.ppu().state().scanline == 241 && nes.ppu().state().dot == 1) {
        nes.step();
    }
    // One more dot delivers the NMI-request edge to the CPU's latch.
    nes.step();
    // Run long enough for the in-flight instruction to retire and the NMI
    // to be serviced on the next instruction boundary.
    for _ in 0..30 {
        nes.step();
    }

    assert_eq!(nes.cpu().state.pc, 0x00C0);
    assert_eq!(nes.cpu().state.stack, sp_before.wrapping_sub(3));
    // Interrupt service pushes PC-high, PC-low, then status, so status ends
    // up two slots below where the stack pointer started.
    let flags_addr = 0x0100 | u16::from(sp_before.wrapping_sub(2));
    let pushed_flags = Status::from_bits_truncate(nes.peek(flags_addr).unwrap());
    assert!(!pushed_flags.contains(Status::BREAK));
    assert!(pushed_flags.contains(Status::UNUSED));
}
