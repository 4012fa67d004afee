//! The motherboard: wires the CPU, PPU, RAM, controllers, and cartridge
//! together over the CPU address bus and drives the clock.

use super::bus::{cpu_memory_map, BusDevice, BusPeekResult, Motherboard};
use super::cartridge::{self, ICartridge, WithCartridge};
use super::controller::Controller;
use super::cpu::{self, WithCpu};
use super::mem::Ram;
use super::ppu::{self, WithPpu};
use crate::error::{log_unmapped_access, InvalidRom, UnmappedAccessKind};

/// PPU dots per CPU cycle on NTSC hardware.
const PPU_DOTS_PER_CPU_CYCLE: u32 = 3;
/// CPU cycles in one NTSC frame (29780.5, rounded down; `step_frame` instead
/// runs until the PPU reports a completed frame, so this is only a budget
/// used to catch a runaway simulation).
const MAX_CYCLES_PER_FRAME: u32 = 100_000;

/// The NES as a whole: the CPU-visible address bus plus the clock
/// coordinator that keeps the CPU and PPU in lockstep.
pub struct Nes {
    cpu: cpu::Cpu6502,
    ppu: ppu::Ppu2C02,
    ram: Ram,
    controller: Controller,
    cart: Box<dyn ICartridge>,
    last_bus_value: u8,
    /// Whether the CPU has finished the cycles of its last instruction and
    /// is ready for `exec` to run the next one.
    cpu_idle: bool,
    /// Counts PPU dots mod 3 so every third dot also steps the CPU.
    dot_counter: u32,
}

impl Nes {
    /// Construct all state, with no cartridge mounted yet. Equivalent to
    /// the hardware's power-on reset plus zeroing RAM; the cartridge slot
    /// reads as all-zeroes (see [`cartridge::NullCartridge`]) until
    /// [`Nes::load_rom`] mounts a real one.
    pub fn power_on() -> Nes {
        let mut nes = Nes {
            cpu: cpu::Cpu6502::new(),
            ppu: ppu::Ppu2C02::new(),
            ram: Ram::new(0x0800),
            controller: Controller::new(),
            cart: Box::new(cartridge::NullCartridge::new()),
            last_bus_value: 0,
            cpu_idle: true,
            dot_counter: 0,
        };
        cpu::reset(&mut nes);
        nes
    }

    /// Power on with a cartridge already parsed from a ROM image.
    fn new(cart: Box<dyn ICartridge>) -> Nes {
        let mut nes = Nes::power_on();
        nes.cart = cart;
        cpu::reset(&mut nes);
        nes
    }

    /// Parse an iNES ROM image and mount it, replacing whatever cartridge
    /// (if any) is currently seated. Does not itself reset the CPU; call
    /// [`Nes::reset`] afterwards so `pc` vectors from the new cartridge's
    /// reset vector.
    pub fn load_rom(&mut self, buf: &[u8]) -> Result<(), InvalidRom> {
        self.cart = cartridge::from_rom(buf)?;
        Ok(())
    }

    /// Parse an iNES ROM image and power on with it loaded.
    pub fn from_rom(buf: &[u8]) -> Result<Nes, InvalidRom> {
        let cart = cartridge::from_rom(buf)?;
        Ok(Nes::new(cart))
    }

    /// Trigger a hardware reset: CPU registers return to their documented
    /// power-up state and `pc` is vectored from $FFFC/$FFFD. RAM and the PPU
    /// are left alone, matching the physical reset line.
    pub fn reset(&mut self) {
        cpu::reset(self);
        self.cpu_idle = true;
    }

    /// Set a controller port's button state, as a standard NES button
    /// bitfield (A, B, Select, Start, Up, Down, Left, Right from bit 0).
    pub fn set_controller(&mut self, port: usize, state: u8) {
        self.controller.set_state(port, state);
    }

    pub fn frame_buffer(&self) -> &[u8] {
        self.ppu.frame_buffer()
    }

    /// Advance the whole machine by one PPU dot, running a CPU instruction
    /// every third dot as NTSC timing requires.
    pub fn step(&mut self) {
        ppu::clock(self);
        if self.ppu.take_nmi_request() {
            self.cpu.assert_nmi();
        }
        self.dot_counter = (self.dot_counter + 1) % PPU_DOTS_PER_CPU_CYCLE;
        if self.dot_counter != 0 {
            return;
        }
        if self.cpu_idle {
            cpu::exec(self);
        }
        self.cpu_idle = cpu::tick(self);
    }

    /// Run until the PPU reports a freshly completed frame, returning the
    /// number of CPU cycles consumed.
    pub fn step_frame(&mut self) -> u32 {
        let start_cycles = self.cpu.total_cycles;
        let mut dots = 0u32;
        while !self.ppu.is_frame_ready() {
            self.step();
            dots += 1;
            if dots > MAX_CYCLES_PER_FRAME {
                break;
            }
        }
        (self.cpu.total_cycles - start_cycles) as u32
    }

    fn run_oam_dma(&mut self, page: u8) {
        let oam_addr = self.ppu.oam_addr();
        for i in 0..256u16 {
            let byte = self.read((page as u16) << 8 | i);
            let addr = oam_addr.wrapping_add(i as u8);
            self.ppu.write_oam(addr, byte);
        }
        // An extra idle cycle is inserted when the transfer starts on an odd
        // CPU cycle, since the DMA unit has to wait for the next "get" cycle
        // to line up.
        let stall = if self.cpu.total_cycles % 2 == 0 { 513 } else { 514 };
        self.cpu.dma_stall += stall;
    }
}

impl Motherboard for Nes {
    fn read(&mut self, addr: u16) -> u8 {
        let (device, local) = cpu_memory_map::match_addr(addr);
        let result = match device {
            cpu_memory_map::Device::Ram => self.ram.read(local, self.last_bus_value),
            cpu_memory_map::Device::PpuRegister => ppu::control_port_read(self, local),
            cpu_memory_map::Device::OamDma => self.last_bus_value,
            cpu_memory_map::Device::Controller(port) => {
                self.controller.read(port as u16, self.last_bus_value)
            }
            cpu_memory_map::Device::Disabled => 0,
            cpu_memory_map::Device::Cartridge => self.cart.read_prg(local, self.last_bus_value),
            cpu_memory_map::Device::Unmapped => {
                log_unmapped_access(addr, UnmappedAccessKind::Read);
                0
            }
        };
        self.last_bus_value = result;
        result
    }

    fn peek(&self, addr: u16) -> Option<u8> {
        let (device, local) = cpu_memory_map::match_addr(addr);
        match device {
            cpu_memory_map::Device::Ram => self.ram.peek(local),
            cpu_memory_map::Device::PpuRegister => BusPeekResult::MutableRead,
            cpu_memory_map::Device::OamDma => BusPeekResult::Unmapped,
            cpu_memory_map::Device::Controller(_) => BusPeekResult::MutableRead,
            cpu_memory_map::Device::Disabled => BusPeekResult::Result(0),
            cpu_memory_map::Device::Cartridge => self.cart.peek_prg(local),
            cpu_memory_map::Device::Unmapped => BusPeekResult::Unmapped,
        }
        .to_optional()
    }

    fn write(&mut self, addr: u16, data: u8) {
        let (device, local) = cpu_memory_map::match_addr(addr);
        match device {
            cpu_memory_map::Device::Ram => self.ram.write(local, data),
            cpu_memory_map::Device::PpuRegister => ppu::control_port_write(self, local, data),
            cpu_memory_map::Device::OamDma => self.run_oam_dma(data),
            cpu_memory_map::Device::Controller(port) => {
                if port == 0 {
                    self.controller.write(0, data);
                }
            }
            cpu_memory_map::Device::Disabled => {}
            cpu_memory_map::Device::Cartridge => self.cart.write_prg(local, data),
            cpu_memory_map::Device::Unmapped => {
                log_unmapped_access(addr, UnmappedAccessKind::Write);
            }
        }
        self.last_bus_value = data;
    }
}

impl WithCpu for Nes {
    fn cpu(&self) -> &cpu::Cpu6502 {
        &self.cpu
    }

    fn cpu_mut(&mut self) -> &mut cpu::Cpu6502 {
        &mut self.cpu
    }
}

impl WithPpu for Nes {
    fn ppu(&self) -> &ppu::Ppu2C02 {
        &self.ppu
    }

    fn ppu_mut(&mut self) -> &mut ppu::Ppu2C02 {
        &mut self.ppu
    }
}

impl WithCartridge for Nes {
    fn cart(&self) -> &dyn ICartridge {
        self.cart.as_ref()
    }

    fn cart_mut(&mut self) -> &mut dyn ICartridge {
        self.cart.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom_with_reset_vector(pc: u16) -> Vec<u8> {
        let mut bytes = vec![0x4E, 0x45, 0x53, 0x1A, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        bytes.resize(16 + 0x4000 * 2, 0);
        let [lo, hi] = pc.to_le_bytes();
        // reset vector lives at the very end of the fixed PRG bank
        let vector_offset = bytes.len() - 4;
        bytes[vector_offset] = lo;
        bytes[vector_offset + 1] = hi;
        bytes.resize(bytes.len() + 0x2000, 0);
        bytes
    }

    #[test]
    fn powers_on_and_vectors_pc_from_the_cartridge() {
        let rom = rom_with_reset_vector(0xC000);
        let nes = Nes::from_rom(&rom).unwrap();
        assert_eq!(nes.cpu().state.pc, 0xC000);
    }

    #[test]
    fn rejects_an_unsupported_mapper() {
        let mut rom = rom_with_reset_vector(0x8000);
        rom[6] = 0x10; // mapper 1 in the low nibble
        assert_eq!(
            Nes::from_rom(&rom),
            Err(InvalidRom::UnsupportedMapper { mapper: 1 })
        );
    }

    #[test]
    fn oam_dma_copies_a_full_page_and_stalls_the_cpu() {
        let rom = rom_with_reset_vector(0x8000);
        let mut nes = Nes::from_rom(&rom).unwrap();
        nes.ram.write(0x0000, 0xAB);
        nes.ram.write(0x00FF, 0xCD);
        let stall_before = nes.cpu.dma_stall;
        nes.write(0x4014, 0x00);
        assert_eq!(nes.ppu.state().oam[0], 0xAB);
        assert_eq!(nes.ppu.state().oam[0xFF], 0xCD);
        assert!(nes.cpu.dma_stall - stall_before >= 513);
    }

    #[test]
    fn controller_strobe_reloads_and_shifts_out_lsb_first() {
        let rom = rom_with_reset_vector(0x8000);
        let mut nes = Nes::from_rom(&rom).unwrap();
        nes.set_controller(0, 0b0000_0101);
        nes.write(0x4016, 1);
        nes.write(0x4016, 0);
        assert_eq!(nes.read(0x4016) & 1, 1);
        assert_eq!(nes.read(0x4016) & 1, 0);
        assert_eq!(nes.read(0x4016) & 1, 1);
    }

    #[test]
    fn power_on_needs_no_cartridge_and_load_rom_mounts_one_afterwards() {
        let mut nes = Nes::power_on();
        assert_eq!(nes.cpu().state.pc, 0); // NullCartridge's vectors read 0
        let rom = rom_with_reset_vector(0xC000);
        nes.load_rom(&rom).unwrap();
        nes.reset();
        assert_eq!(nes.cpu().state.pc, 0xC000);
    }

    #[test]
    fn reads_outside_every_mapped_region_return_zero_not_open_bus() {
        let mut nes = Nes::power_on();
        nes.last_bus_value = 0xAB;
        assert_eq!(nes.read(0x4015), 0);
    }

    #[test]
    fn step_frame_returns_elapsed_cpu_cycles_not_instruction_count() {
        let rom = rom_with_reset_vector(0x8000);
        let mut nes = Nes::from_rom(&rom).unwrap();
        let cycles = nes.step_frame();
        // A full NTSC frame is ~29780.5 CPU cycles; an instruction count
        // would be off by the average per-instruction cycle cost (2-7x).
        assert!(cycles > 1000);
        assert_eq!(cycles, (nes.cpu.total_cycles) as u32);
    }
}
