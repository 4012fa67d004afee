//! CPU register state, addressing modes, and instruction mnemonics.

bitflags! {
    /// The 2A03's processor status register.
    ///
    /// `BREAK` and `UNUSED` never reach the ALU; they only exist in the
    /// copy of `P` that gets pushed to the stack by `BRK`/`PHP` versus
    /// `IRQ`/`NMI` (the famous "B flag" quirk).
    pub struct Status: u8 {
        const CARRY             = 0b0000_0001;
        const ZERO              = 0b0000_0010;
        const INTERRUPT_DISABLE = 0b0000_0100;
        const DECIMAL           = 0b0000_1000;
        const BREAK             = 0b0001_0000;
        const UNUSED            = 0b0010_0000;
        const OVERFLOW          = 0b0100_0000;
        const NEGATIVE          = 0b1000_0000;
    }
}

impl Status {
    /// Set or clear `ZERO`/`NEGATIVE` from a computed byte, as almost every
    /// instruction does.
    pub fn set_zn(&mut self, val: u8) {
        self.set(Status::ZERO, val == 0);
        self.set(Status::NEGATIVE, val & 0x80 != 0);
    }
}

/// The 13 addressing modes the decoder can dispatch an opcode through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
}

/// The 56 official 6502 mnemonics. Illegal/unofficial opcodes are not
/// represented here; the decoder maps unlisted opcode bytes to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Instruction {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS,
    CLC, CLD, CLI, CLV, CMP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX,
    INY, JMP, JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA, PHP, PLA, PLP,
    ROL, ROR, RTI, RTS, SBC, SEC, SED, SEI, STA, STX, STY, TAX, TAY,
    TSX, TXA, TXS, TYA,
}

/// A single entry in the 256-slot opcode dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeEntry {
    pub instruction: Instruction,
    pub mode: AddressingMode,
    /// Base cycle cost, excluding page-cross/branch-taken penalties.
    pub cycles: u8,
    /// Whether crossing a page boundary while computing the effective
    /// address costs one extra cycle (the classic "oops" cycle). Never set
    /// for read-modify-write opcodes or stores, which always pay the
    /// worst-case cost up front.
    pub page_cross_penalty: bool,
    /// Read-modify-write: the opcode reads a memory operand, modifies it,
    /// and writes it back in the same cycle budget (ASL/LSR/ROL/ROR/INC/DEC
    /// on a memory operand).
    pub rmw: bool,
}

/// The 6502's architectural register state — what a debugger or a test
/// harness would call "the registers". Scheduling bookkeeping (cycles
/// remaining, pending interrupts) lives on [`super::cpu::Cpu6502`] instead,
/// since it isn't part of the chip's visible state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    pub acc: u8,
    pub x: u8,
    pub y: u8,
    pub stack: u8,
    pub pc: u16,
    pub status: Status,
}

/// The CPU's register state immediately after power-on, before `reset()`
/// loads the reset vector into `pc`.
///
/// cf. <http://wiki.nesdev.com/w/index.php/CPU_power_up_state>
pub const POWERON_CPU_STATE: CpuState = CpuState {
    acc: 0,
    x: 0,
    y: 0,
    stack: 0xFD,
    pc: 0,
    status: Status::from_bits_truncate(0x24),
};
