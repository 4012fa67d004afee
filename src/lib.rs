//! Core emulation engine for the Nintendo Entertainment System.
//!
//! This crate implements the 2A03 CPU (a decimal-mode-less MOS 6502), the
//! CPU-addressable memory map, a 2C02 PPU timing core with register I/O, and
//! an iNES/NROM cartridge loader. It does not implement audio, controller
//! input backends, or frame presentation — those are host collaborators; see
//! [`devices::nes::Nes`] for the surface the host drives.

#[macro_use]
extern crate bitflags;

pub mod devices;
pub mod error;

pub use devices::nes::Nes;
pub use error::InvalidRom;
