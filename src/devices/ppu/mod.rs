//! The 2C02 PPU: register state, timing core, and register I/O.

pub mod ppu;
pub mod structs;

pub use ppu::{clock, control_port_read, control_port_write, Ppu2C02, WithPpu};
pub use structs::{PpuControlFlags, PpuMaskFlags, PpuState, PpuStatusFlags};
