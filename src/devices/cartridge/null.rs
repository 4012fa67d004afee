//! The cartridge slot's contents before a ROM has been loaded.
//!
//! `Nes::power_on` needs something mounted at $4020-$FFFF (CPU side) and
//! $0000-$1FFF/nametable space (PPU side) before a cartridge exists; this
//! behaves like the rest of the bus's unbacked regions (spec.md §4.1):
//! reads return 0, writes are dropped.

use super::traits::ICartridge;
use crate::devices::bus::BusPeekResult;

pub struct NullCartridge;

impl NullCartridge {
    pub fn new() -> NullCartridge {
        NullCartridge
    }
}

impl Default for NullCartridge {
    fn default() -> Self {
        Self::new()
    }
}

impl ICartridge for NullCartridge {
    fn read_chr(&mut self, _addr: u16, _last_bus_value: u8) -> u8 {
        0
    }

    fn peek_chr(&self, _addr: u16) -> BusPeekResult {
        BusPeekResult::Result(0)
    }

    fn write_chr(&mut self, _addr: u16, _value: u8) {}

    fn read_prg(&mut self, _addr: u16, _last_bus_value: u8) -> u8 {
        0
    }

    fn peek_prg(&self, _addr: u16) -> BusPeekResult {
        BusPeekResult::Result(0)
    }

    fn write_prg(&mut self, _addr: u16, _value: u8) {}
}
