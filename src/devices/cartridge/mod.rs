//! iNES ROM loading and mapper implementations.
//!
//! Only mapper 0 (NROM) is implemented; any other mapper number in the
//! header is reported as [`InvalidRom::UnsupportedMapper`].

mod ines;
mod nrom;
mod null;
mod traits;

pub use traits::{ICartridge, WithCartridge};
pub(crate) use null::NullCartridge;

use crate::error::InvalidRom;

/// Parse an iNES ROM image and build the cartridge it describes.
pub fn from_rom(buf: &[u8]) -> Result<Box<dyn ICartridge>, InvalidRom> {
    let (header, prg_start) = ines::parse_ines_header(buf)?;
    match header.mapper() {
        0 => Ok(Box::new(nrom::NromCartridge::new(header, buf, prg_start))),
        mapper => Err(InvalidRom::UnsupportedMapper { mapper }),
    }
}
