//! Emulator for the 2A03 (a MOS 6502 without decimal mode).
//!
//! Instructions execute in one shot: `exec` performs the whole fetch/
//! decode/address/operate sequence and leaves the correct total cycle
//! count sitting in `Cpu6502::cycles`. The clock coordinator calls `tick`
//! every cycle; `tick` just burns down that counter and reports when it's
//! time to call `exec` again. This keeps register state changes atomic
//! (handy for tests and for driving the PPU in lockstep) while still
//! billing every instruction its correct 6502 timing.

use std::num::Wrapping;

use super::super::bus::Motherboard;
use super::decode;
use super::structs::{AddressingMode, CpuState, Instruction, Status, POWERON_CPU_STATE};
use crate::error::log_unknown_opcode;

macro_rules! reg {
    (get $reg:ident, $mb:expr) => {
        $mb.cpu().state.$reg
    };
    (set $reg:ident, $mb:expr, $val:expr) => {
        $mb.cpu_mut().state.$reg = $val
    };
}

macro_rules! bytes_to_addr {
    ($lo:expr, $hi:expr) => {
        (u16::from($hi) << 8) | u16::from($lo)
    };
}

/// The NMI and IRQ vectors, plus the shared reset/BRK vector base.
const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

/// Owns the CPU's architectural state plus the scheduling bookkeeping
/// needed to drive it a cycle at a time.
pub struct Cpu6502 {
    pub state: CpuState,
    /// Cycles left to burn before the next `exec` call.
    pub cycles: u32,
    /// Total cycles elapsed since power-on, for diagnostics and for
    /// `step_frame`'s budget.
    pub total_cycles: u64,
    /// Edge-latched: set the instant the PPU's NMI line goes low, cleared
    /// once serviced. NMI cannot be masked and is never re-triggered by a
    /// line that's still low.
    nmi_latched: bool,
    /// Level-sensitive: true for as long as a mapped device is asserting
    /// IRQ. Ignored while `Status::INTERRUPT_DISABLE` is set.
    pub irq_line: bool,
    /// Cycles remaining in an OAM DMA stall. While nonzero the CPU does
    /// nothing but burn cycles; see `Nes::run_oam_dma`.
    pub dma_stall: u32,
}

impl Cpu6502 {
    pub fn new() -> Cpu6502 {
        Cpu6502 {
            state: POWERON_CPU_STATE,
            cycles: 0,
            total_cycles: 0,
            nmi_latched: false,
            irq_line: false,
            dma_stall: 0,
        }
    }

    /// Latch a falling edge on the NMI line. Idempotent: calling this while
    /// already latched (the line hasn't gone high and come back down)
    /// does nothing, matching real hardware's edge sensitivity.
    pub fn assert_nmi(&mut self) {
        self.nmi_latched = true;
    }
}

impl Default for Cpu6502 {
    fn default() -> Self {
        Self::new()
    }
}

/// A device that owns a `Cpu6502`, e.g. the motherboard or a test harness.
pub trait WithCpu {
    fn cpu(&self) -> &Cpu6502;
    fn cpu_mut(&mut self) -> &mut Cpu6502;
}

/// Advance the clock by one cycle. Returns `true` once the current
/// instruction's cycles have been exhausted and the CPU is ready for
/// `exec` to run the next one.
pub fn tick<T: WithCpu>(mb: &mut T) -> bool {
    let cpu = mb.cpu_mut();
    if cpu.dma_stall > 0 {
        cpu.dma_stall -= 1;
        cpu.total_cycles += 1;
        return false;
    }
    if cpu.cycles > 0 {
        cpu.cycles -= 1;
        cpu.total_cycles += 1;
        return false;
    }
    true
}

/// Load the CPU's registers into their hardware power-up/reset state and
/// vector the program counter from $FFFC/$FFFD.
pub fn reset<T: WithCpu + Motherboard>(mb: &mut T) {
    let fst = mb.read(RESET_VECTOR);
    let snd = mb.read(RESET_VECTOR.wrapping_add(1));
    let cpu = mb.cpu_mut();
    cpu.state.acc = 0;
    cpu.state.x = 0;
    cpu.state.y = 0;
    cpu.state.stack = 0xFD;
    cpu.state.status = Status::from_bits_truncate(0x24);
    cpu.state.pc = bytes_to_addr!(fst, snd);
    cpu.cycles = 0;
}

/// Process a pending NMI or IRQ, if one is outstanding. Returns whether an
/// interrupt was serviced (and thus consumed 7 cycles).
fn service_interrupt<T: WithCpu + Motherboard>(mb: &mut T) -> bool {
    let nmi = mb.cpu().nmi_latched;
    let irq = !nmi && mb.cpu().irq_line && !mb.cpu().state.status.contains(Status::INTERRUPT_DISABLE);
    if !nmi && !irq {
        return false;
    }
    mb.cpu_mut().nmi_latched = false;
    let pc_bytes = reg!(get pc, mb).to_le_bytes();
    push_stack(mb, pc_bytes[1]);
    push_stack(mb, pc_bytes[0]);
    let mut status = reg!(get status, mb);
    status.remove(Status::BREAK);
    status.insert(Status::UNUSED);
    push_stack(mb, status.bits());
    mb.cpu_mut().state.status.insert(Status::INTERRUPT_DISABLE);
    let vector = if nmi { NMI_VECTOR } else { IRQ_VECTOR };
    let fst = mb.read(vector);
    let snd = mb.read(vector.wrapping_add(1));
    reg!(set pc, mb, bytes_to_addr!(fst, snd));
    mb.cpu_mut().cycles = 6;
    // `tick` only counts the 6 cycles left in `cpu.cycles`; this one, spent
    // dispatching the interrupt itself, has to be billed here.
    mb.cpu_mut().total_cycles += 1;
    true
}

/// Fetch, decode, address, and execute the next instruction. The total
/// 6502 cycle cost is left (minus 1, for this cycle) in `cpu.cycles`.
pub fn exec<T: WithCpu + Motherboard>(mb: &mut T) {
    if service_interrupt(mb) {
        return;
    }
    let pc = reg!(get pc, mb);
    let opcode = mb.read(pc);
    let op1 = mb.read(pc.wrapping_add(1));
    let op2 = mb.read(pc.wrapping_add(2));

    let entry = match decode::decode(opcode) {
        Some(entry) => entry,
        None => {
            log_unknown_opcode(pc, opcode);
            reg!(set pc, mb, pc.wrapping_add(1));
            mb.cpu_mut().cycles = 0;
            // One cycle spent, none left for `tick` to count down.
            mb.cpu_mut().total_cycles += 1;
            return;
        }
    };

    reg!(set pc, mb, pc.wrapping_add(1));
    let resolved = resolve_address(mb, entry.mode, op1, op2);
    let mut total_cycles = entry.cycles as u32;
    if entry.page_cross_penalty && resolved.page_crossed {
        total_cycles += 1;
    }

    let extra = execute(mb, entry.instruction, entry.mode, resolved.addr);
    total_cycles = total_cycles.wrapping_add(extra);

    // `cpu.cycles` holds every cycle but this one; `tick` counts those down
    // one at a time, so this instruction's first cycle has to be billed to
    // `total_cycles` here instead.
    mb.cpu_mut().cycles = total_cycles.saturating_sub(1);
    mb.cpu_mut().total_cycles += 1;
}

struct Resolved {
    addr: u16,
    page_crossed: bool,
}

/// Compute the effective address for an instruction, advancing `pc` past
/// any operand bytes the addressing mode consumes.
fn resolve_address<T: WithCpu + Motherboard>(
    mb: &mut T,
    mode: AddressingMode,
    op1: u8,
    op2: u8,
) -> Resolved {
    use AddressingMode::*;
    match mode {
        Implied | Accumulator => Resolved {
            addr: 0,
            page_crossed: false,
        },
        Immediate => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(1));
            // There's no effective address to compute; stash the operand
            // byte itself in `addr` so `execute`'s read path can pick it
            // up without touching the bus.
            Resolved {
                addr: u16::from(op1),
                page_crossed: false,
            }
        }
        ZeroPage => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(1));
            Resolved {
                addr: u16::from(op1),
                page_crossed: false,
            }
        }
        ZeroPageX => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(1));
            let addr = op1.wrapping_add(reg!(get x, mb));
            Resolved {
                addr: u16::from(addr),
                page_crossed: false,
            }
        }
        ZeroPageY => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(1));
            let addr = op1.wrapping_add(reg!(get y, mb));
            Resolved {
                addr: u16::from(addr),
                page_crossed: false,
            }
        }
        Relative => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(1));
            let base = reg!(get pc, mb);
            let addr = base.wrapping_add((op1 as i8) as u16);
            Resolved {
                addr,
                page_crossed: (base & 0xFF00) != (addr & 0xFF00),
            }
        }
        Absolute => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(2));
            Resolved {
                addr: bytes_to_addr!(op1, op2),
                page_crossed: false,
            }
        }
        AbsoluteX => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(2));
            let base = bytes_to_addr!(op1, op2);
            let addr = base.wrapping_add(u16::from(reg!(get x, mb)));
            Resolved {
                addr,
                page_crossed: (base & 0xFF00) != (addr & 0xFF00),
            }
        }
        AbsoluteY => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(2));
            let base = bytes_to_addr!(op1, op2);
            let addr = base.wrapping_add(u16::from(reg!(get y, mb)));
            Resolved {
                addr,
                page_crossed: (base & 0xFF00) != (addr & 0xFF00),
            }
        }
        Indirect => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(2));
            // The indirect-JMP page bug: if the pointer's low byte is $FF,
            // the high byte is fetched from the *start* of the same page,
            // not the next page.
            let ptr = bytes_to_addr!(op1, op2);
            let ptr_hi = bytes_to_addr!(op1.wrapping_add(1), op2);
            let fst = mb.read(ptr);
            let snd = mb.read(ptr_hi);
            Resolved {
                addr: bytes_to_addr!(fst, snd),
                page_crossed: false,
            }
        }
        IndirectX => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(1));
            let ptr = op1.wrapping_add(reg!(get x, mb));
            let fst = mb.read(u16::from(ptr));
            let snd = mb.read(u16::from(ptr.wrapping_add(1)));
            Resolved {
                addr: bytes_to_addr!(fst, snd),
                page_crossed: false,
            }
        }
        IndirectY => {
            reg!(set pc, mb, reg!(get pc, mb).wrapping_add(1));
            let fst = mb.read(u16::from(op1));
            let snd = mb.read(u16::from(op1.wrapping_add(1)));
            let base = bytes_to_addr!(fst, snd);
            let addr = base.wrapping_add(u16::from(reg!(get y, mb)));
            Resolved {
                addr,
                page_crossed: (base & 0xFF00) != (addr & 0xFF00),
            }
        }
    }
}

fn push_stack<T: WithCpu + Motherboard>(mb: &mut T, data: u8) {
    let addr = bytes_to_addr!(reg!(get stack, mb), 0x01u8);
    mb.write(addr, data);
    reg!(set stack, mb, reg!(get stack, mb).wrapping_sub(1));
}

fn pop_stack<T: WithCpu + Motherboard>(mb: &mut T) -> u8 {
    reg!(set stack, mb, reg!(get stack, mb).wrapping_add(1));
    let addr = bytes_to_addr!(reg!(get stack, mb), 0x01u8);
    mb.read(addr)
}

fn set_zn<T: WithCpu>(mb: &mut T, val: u8) {
    let mut status = reg!(get status, mb);
    status.set_zn(val);
    reg!(set status, mb, status);
}

fn set_flag<T: WithCpu>(mb: &mut T, flag: Status, on: bool) {
    let mut status = reg!(get status, mb);
    status.set(flag, on);
    reg!(set status, mb, status);
}

/// Run the operation itself. Returns any cycle delta not already captured
/// by the decode table (branch-taken/page-cross, which are data-dependent).
fn execute<T: WithCpu + Motherboard>(
    mb: &mut T,
    instr: Instruction,
    mode: AddressingMode,
    addr: u16,
) -> u32 {
    use Instruction::*;

    // Immediate operands were fetched as `op1` during address resolution
    // but not threaded through as `addr`; re-derive via a second read path
    // for the handful of addressing modes that don't touch the bus.
    let read = |mb: &mut T| -> u8 {
        match mode {
            AddressingMode::Accumulator => reg!(get acc, mb),
            AddressingMode::Immediate => addr as u8,
            _ => mb.read(addr),
        }
    };

    match instr {
        ADC => {
            let op = read(mb);
            adc(mb, op);
            0
        }
        SBC => {
            let op = read(mb);
            adc(mb, !op);
            0
        }
        AND => {
            let val = reg!(get acc, mb) & read(mb);
            reg!(set acc, mb, val);
            set_zn(mb, val);
            0
        }
        ORA => {
            let val = reg!(get acc, mb) | read(mb);
            reg!(set acc, mb, val);
            set_zn(mb, val);
            0
        }
        EOR => {
            let val = reg!(get acc, mb) ^ read(mb);
            reg!(set acc, mb, val);
            set_zn(mb, val);
            0
        }
        BIT => {
            let op = read(mb);
            let res = reg!(get acc, mb) & op;
            set_flag(mb, Status::ZERO, res == 0);
            set_flag(mb, Status::OVERFLOW, op & 0x40 != 0);
            set_flag(mb, Status::NEGATIVE, op & 0x80 != 0);
            0
        }
        ASL => {
            let op = read(mb);
            let res = (op as u16) << 1;
            set_flag(mb, Status::CARRY, res & 0x100 != 0);
            let res = res as u8;
            set_zn(mb, res);
            store_shift_result(mb, mode, addr, res);
            0
        }
        LSR => {
            let op = read(mb);
            set_flag(mb, Status::CARRY, op & 0x01 != 0);
            let res = op >> 1;
            set_zn(mb, res);
            store_shift_result(mb, mode, addr, res);
            0
        }
        ROL => {
            let op = read(mb);
            let carry_in = reg!(get status, mb).contains(Status::CARRY) as u16;
            let res = ((op as u16) << 1) | carry_in;
            set_flag(mb, Status::CARRY, res & 0x100 != 0);
            let res = res as u8;
            set_zn(mb, res);
            store_shift_result(mb, mode, addr, res);
            0
        }
        ROR => {
            let op = read(mb);
            let carry_in = if reg!(get status, mb).contains(Status::CARRY) {
                0x80
            } else {
                0
            };
            let res = (op >> 1) | carry_in;
            set_flag(mb, Status::CARRY, op & 0x01 != 0);
            set_zn(mb, res);
            store_shift_result(mb, mode, addr, res);
            0
        }
        INC => {
            let res = read(mb).wrapping_add(1);
            set_zn(mb, res);
            mb.write(addr, res);
            0
        }
        DEC => {
            let res = read(mb).wrapping_sub(1);
            set_zn(mb, res);
            mb.write(addr, res);
            0
        }
        CMP => {
            compare(mb, reg!(get acc, mb), read(mb));
            0
        }
        CPX => {
            compare(mb, reg!(get x, mb), read(mb));
            0
        }
        CPY => {
            compare(mb, reg!(get y, mb), read(mb));
            0
        }
        LDA => {
            let val = read(mb);
            reg!(set acc, mb, val);
            set_zn(mb, val);
            0
        }
        LDX => {
            let val = read(mb);
            reg!(set x, mb, val);
            set_zn(mb, val);
            0
        }
        LDY => {
            let val = read(mb);
            reg!(set y, mb, val);
            set_zn(mb, val);
            0
        }
        STA => {
            mb.write(addr, reg!(get acc, mb));
            0
        }
        STX => {
            mb.write(addr, reg!(get x, mb));
            0
        }
        STY => {
            mb.write(addr, reg!(get y, mb));
            0
        }
        TAX => {
            let val = reg!(get acc, mb);
            reg!(set x, mb, val);
            set_zn(mb, val);
            0
        }
        TXA => {
            let val = reg!(get x, mb);
            reg!(set acc, mb, val);
            set_zn(mb, val);
            0
        }
        TAY => {
            let val = reg!(get acc, mb);
            reg!(set y, mb, val);
            set_zn(mb, val);
            0
        }
        TYA => {
            let val = reg!(get y, mb);
            reg!(set acc, mb, val);
            set_zn(mb, val);
            0
        }
        TSX => {
            let val = reg!(get stack, mb);
            reg!(set x, mb, val);
            set_zn(mb, val);
            0
        }
        TXS => {
            reg!(set stack, mb, reg!(get x, mb));
            0
        }
        INX => {
            let val = reg!(get x, mb).wrapping_add(1);
            reg!(set x, mb, val);
            set_zn(mb, val);
            0
        }
        DEX => {
            let val = reg!(get x, mb).wrapping_sub(1);
            reg!(set x, mb, val);
            set_zn(mb, val);
            0
        }
        INY => {
            let val = reg!(get y, mb).wrapping_add(1);
            reg!(set y, mb, val);
            set_zn(mb, val);
            0
        }
        DEY => {
            let val = reg!(get y, mb).wrapping_sub(1);
            reg!(set y, mb, val);
            set_zn(mb, val);
            0
        }
        CLC => {
            set_flag(mb, Status::CARRY, false);
            0
        }
        SEC => {
            set_flag(mb, Status::CARRY, true);
            0
        }
        CLI => {
            set_flag(mb, Status::INTERRUPT_DISABLE, false);
            0
        }
        SEI => {
            set_flag(mb, Status::INTERRUPT_DISABLE, true);
            0
        }
        CLV => {
            set_flag(mb, Status::OVERFLOW, false);
            0
        }
        CLD => {
            set_flag(mb, Status::DECIMAL, false);
            0
        }
        SED => {
            set_flag(mb, Status::DECIMAL, true);
            0
        }
        NOP => 0,
        JMP => {
            reg!(set pc, mb, addr);
            0
        }
        JSR => {
            let ret = reg!(get pc, mb).wrapping_sub(1);
            let bytes = ret.to_le_bytes();
            push_stack(mb, bytes[1]);
            push_stack(mb, bytes[0]);
            reg!(set pc, mb, addr);
            0
        }
        RTS => {
            let fst = pop_stack(mb);
            let snd = pop_stack(mb);
            reg!(set pc, mb, bytes_to_addr!(fst, snd).wrapping_add(1));
            0
        }
        RTI => {
            let flags = pop_stack(mb);
            let mut status = Status::from_bits_truncate(flags);
            status.insert(Status::UNUSED);
            status.remove(Status::BREAK);
            reg!(set status, mb, status);
            let fst = pop_stack(mb);
            let snd = pop_stack(mb);
            reg!(set pc, mb, bytes_to_addr!(fst, snd));
            0
        }
        BRK => {
            let ret = reg!(get pc, mb).wrapping_add(1);
            let bytes = ret.to_le_bytes();
            push_stack(mb, bytes[1]);
            push_stack(mb, bytes[0]);
            let mut status = reg!(get status, mb);
            status.insert(Status::BREAK);
            status.insert(Status::UNUSED);
            push_stack(mb, status.bits());
            set_flag(mb, Status::INTERRUPT_DISABLE, true);
            let fst = mb.read(IRQ_VECTOR);
            let snd = mb.read(IRQ_VECTOR.wrapping_add(1));
            reg!(set pc, mb, bytes_to_addr!(fst, snd));
            0
        }
        PHA => {
            push_stack(mb, reg!(get acc, mb));
            0
        }
        PHP => {
            let mut status = reg!(get status, mb);
            status.insert(Status::BREAK);
            status.insert(Status::UNUSED);
            push_stack(mb, status.bits());
            0
        }
        PLA => {
            let val = pop_stack(mb);
            reg!(set acc, mb, val);
            set_zn(mb, val);
            0
        }
        PLP => {
            let flags = pop_stack(mb);
            let mut status = Status::from_bits_truncate(flags);
            status.insert(Status::UNUSED);
            status.remove(Status::BREAK);
            reg!(set status, mb, status);
            0
        }
        BPL | BMI | BVC | BVS | BCC | BCS | BNE | BEQ => branch(mb, instr, addr),
    }
}

/// Write a shift/rotate result back to the accumulator or to the same
/// memory cell it was read from.
fn store_shift_result<T: WithCpu + Motherboard>(mb: &mut T, mode: AddressingMode, addr: u16, res: u8) {
    if mode == AddressingMode::Accumulator {
        reg!(set acc, mb, res);
    } else {
        mb.write(addr, res);
    }
}

fn compare<T: WithCpu>(mb: &mut T, reg_val: u8, operand: u8) {
    set_flag(mb, Status::CARRY, reg_val >= operand);
    let res = reg_val.wrapping_sub(operand);
    set_zn(mb, res);
}

fn adc<T: WithCpu>(mb: &mut T, operand: u8) {
    let carry_in = reg!(get status, mb).contains(Status::CARRY) as u16;
    let acc = reg!(get acc, mb);
    let sum = Wrapping(acc as u16) + Wrapping(operand as u16) + Wrapping(carry_in);
    set_flag(mb, Status::CARRY, sum.0 & 0x100 != 0);
    let overflow = (!(acc ^ operand) & (acc ^ sum.0 as u8)) & 0x80 != 0;
    set_flag(mb, Status::OVERFLOW, overflow);
    let result = sum.0 as u8;
    reg!(set acc, mb, result);
    set_zn(mb, result);
}

fn branch<T: WithCpu + Motherboard>(mb: &mut T, instr: Instruction, target: u16) -> u32 {
    use Instruction::*;
    let status = reg!(get status, mb);
    let taken = match instr {
        BPL => !status.contains(Status::NEGATIVE),
        BMI => status.contains(Status::NEGATIVE),
        BVC => !status.contains(Status::OVERFLOW),
        BVS => status.contains(Status::OVERFLOW),
        BCC => !status.contains(Status::CARRY),
        BCS => status.contains(Status::CARRY),
        BNE => !status.contains(Status::ZERO),
        BEQ => status.contains(Status::ZERO),
        _ => unreachable!("branch() called with a non-branch instruction"),
    };
    if !taken {
        return 0;
    }
    let old_pc = reg!(get pc, mb);
    reg!(set pc, mb, target);
    if old_pc & 0xFF00 != target & 0xFF00 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::bus::Motherboard;

    struct Harness {
        cpu: Cpu6502,
        mem: [u8; 0x10000],
    }

    impl Harness {
        fn new() -> Harness {
            Harness {
                cpu: Cpu6502::new(),
                mem: [0u8; 0x10000],
            }
        }
    }

    impl WithCpu for Harness {
        fn cpu(&self) -> &Cpu6502 {
            &self.cpu
        }
        fn cpu_mut(&mut self) -> &mut Cpu6502 {
            &mut self.cpu
        }
    }

    impl Motherboard for Harness {
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
    fn reset_vectors_the_pc_and_sets_documented_poweron_state() {
        let mut h = Harness::new();
        h.mem[0xFFFC] = 0x00;
        h.mem[0xFFFD] = 0x80;
        reset(&mut h);
        assert_eq!(h.cpu.state.pc, 0x8000);
        assert_eq!(h.cpu.state.stack, 0xFD);
        assert_eq!(h.cpu.state.acc, 0);
        assert!(h.cpu.state.status.contains(Status::INTERRUPT_DISABLE));
    }

    #[test]
    fn adc_immediate_sets_carry_and_overflow() {
        let mut h = Harness::new();
        h.cpu.state.pc = 0x8000;
        h.cpu.state.acc = 0x7F;
        h.mem[0x8000] = 0x69; // ADC #imm
        h.mem[0x8001] = 0x01;
        exec(&mut h);
        assert_eq!(h.cpu.state.acc, 0x80);
        assert!(h.cpu.state.status.contains(Status::OVERFLOW));
        assert!(!h.cpu.state.status.contains(Status::CARRY));
        assert_eq!(h.cpu.cycles, 1); // 2-cycle instruction, 1 already spent
    }

    #[test]
    fn jsr_then_rts_round_trips_to_the_instruction_after_jsr() {
        let mut h = Harness::new();
        h.cpu.state.pc = 0x8000;
        h.cpu.state.stack = 0xFD;
        h.mem[0x8000] = 0x20; // JSR $9000
        h.mem[0x8001] = 0x00;
        h.mem[0x8002] = 0x90;
        h.mem[0x9000] = 0x60; // RTS
        exec(&mut h);
        assert_eq!(h.cpu.state.pc, 0x9000);
        h.cpu.cycles = 0;
        exec(&mut h);
        assert_eq!(h.cpu.state.pc, 0x8003);
    }

    #[test]
    fn indirect_jmp_reproduces_the_page_boundary_bug() {
        let mut h = Harness::new();
        h.cpu.state.pc = 0x8000;
        h.mem[0x8000] = 0x6C; // JMP ($30FF)
        h.mem[0x8001] = 0xFF;
        h.mem[0x8002] = 0x30;
        h.mem[0x30FF] = 0x00;
        h.mem[0x3000] = 0x40; // bug: wraps to $3000, not $3100
        h.mem[0x3100] = 0x80;
        exec(&mut h);
        assert_eq!(h.cpu.state.pc, 0x4000);
    }

    #[test]
    fn branch_not_taken_costs_two_cycles() {
        let mut h = Harness::new();
        h.cpu.state.pc = 0x8000;
        h.cpu.state.status.insert(Status::ZERO);
        h.mem[0x8000] = 0xD0; // BNE, not taken since ZERO is set
        h.mem[0x8001] = 0x10;
        exec(&mut h);
        assert_eq!(h.cpu.state.pc, 0x8002);
        assert_eq!(h.cpu.cycles, 1);
    }

    #[test]
    fn branch_crossing_a_page_costs_an_extra_cycle() {
        let mut h = Harness::new();
        h.cpu.state.pc = 0x80F0;
        h.mem[0x80F0] = 0xF0; // BEQ +$20, crosses from page $80 to $81
        h.mem[0x80F1] = 0x20;
        h.cpu.state.status.insert(Status::ZERO);
        exec(&mut h);
        assert_eq!(h.cpu.state.pc, 0x8112);
        assert_eq!(h.cpu.cycles, 3); // 2 base + taken + page-cross, minus 1
    }

    #[test]
    fn unknown_opcode_costs_one_cycle_and_changes_nothing_else() {
        let mut h = Harness::new();
        h.cpu.state.pc = 0x8000;
        h.cpu.state.acc = 0x42;
        h.mem[0x8000] = 0x02; // illegal JAM opcode
        exec(&mut h);
        assert_eq!(h.cpu.state.pc, 0x8001);
        assert_eq!(h.cpu.state.acc, 0x42);
        assert_eq!(h.cpu.cycles, 0);
    }
}
