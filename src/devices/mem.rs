//! Memory devices: internal RAM.

use super::bus::{BusDevice, BusPeekResult};

/// The NES's 2 KiB of internal work RAM, addressed by the CPU at
/// $0000-$1FFF (mirrored four times).
pub struct Ram {
    buf: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Ram {
        Ram {
            buf: vec![0u8; size],
        }
    }
}

impl BusDevice for Ram {
    fn read(&mut self, addr: u16, last_bus_value: u8) -> u8 {
        self.peek(addr).unwrap(last_bus_value)
    }

    fn peek(&self, addr: u16) -> BusPeekResult {
        match self.buf.get(addr as usize) {
            Some(val) => BusPeekResult::Result(*val),
            None => BusPeekResult::Unmapped,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let Some(slot) = self.buf.get_mut(addr as usize) {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_writes() {
        let mut ram = Ram::new(0x0800);
        ram.write(0x0123, 0xAB);
        assert_eq!(ram.read(0x0123, 0), 0xAB);
    }

    #[test]
    fn out_of_range_reads_return_last_bus_value() {
        let mut ram = Ram::new(0x0800);
        assert_eq!(ram.read(0x1000, 0x5A), 0x5A);
    }
}
