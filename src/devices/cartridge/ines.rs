//! Parsing for the 16-byte iNES header.

use crate::error::InvalidRom;

const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A]; // "NES\x1A"
const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;
const PRG_BANK_SIZE: usize = 0x4000;
const CHR_BANK_SIZE: usize = 0x2000;

/// A parsed iNES header (spec §5 "Cartridge / Mapper 0").
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct INesHeader {
    /// PRG-ROM size, in 16 KiB units. Never 0.
    pub prg_size: usize,
    /// CHR-ROM size, in 8 KiB units. May be 0, meaning the board provides
    /// CHR-RAM instead (not modeled; treated as one bank of zeroes).
    pub chr_size: usize,
    pub flags_6: INesFlags6,
    pub flags_7: INesFlags7,
}

impl INesHeader {
    /// The mapper number, assembled from the high nibbles of flags 6 and 7.
    pub fn mapper(&self) -> u8 {
        ((self.flags_6.bits() & INesFlags6::MAPPER_LOW_NIBBLE.bits()) >> 4)
            | (self.flags_7.bits() & INesFlags7::MAPPER_HIGH_NIBBLE.bits())
    }

    pub fn has_trainer(&self) -> bool {
        self.flags_6.contains(INesFlags6::HAS_TRAINER)
    }
}

bitflags! {
    pub struct INesFlags6: u8 {
        /// 0 = horizontal mirroring, 1 = vertical. Mappers with their own
        /// nametable control (not NROM) ignore this bit.
        const MIRRORING        = 0x01;
        const HAS_PERSISTENT_MEMORY = 0x02;
        const HAS_TRAINER      = 0x04;
        const USE_FOUR_SCREEN_VRAM = 0x08;
        const MAPPER_LOW_NIBBLE = 0xF0;
    }
}

bitflags! {
    pub struct INesFlags7: u8 {
        const VS_UNISYSTEM   = 0x01;
        const PLAYCHOICE_10  = 0x02;
        const IS_INES_2_0    = 0x0C;
        const MAPPER_HIGH_NIBBLE = 0xF0;
    }
}

/// Parse and validate an iNES image, returning the header and the offset
/// at which PRG-ROM begins (past the header and any trainer).
pub fn parse_ines_header(buf: &[u8]) -> Result<(INesHeader, usize), InvalidRom> {
    if buf.len() < HEADER_SIZE {
        return Err(InvalidRom::Truncated {
            expected: HEADER_SIZE,
            actual: buf.len(),
        });
    }
    if buf[0..4] != MAGIC {
        return Err(InvalidRom::BadMagic);
    }
    let header = INesHeader {
        prg_size: if buf[4] == 0 { 1 } else { buf[4] as usize },
        chr_size: buf[5] as usize,
        flags_6: INesFlags6::from_bits_truncate(buf[6]),
        flags_7: INesFlags7::from_bits_truncate(buf[7]),
    };
    let prg_start = HEADER_SIZE + if header.has_trainer() { TRAINER_SIZE } else { 0 };
    let prg_end = prg_start + header.prg_size * PRG_BANK_SIZE;
    let chr_end = prg_end + header.chr_size * CHR_BANK_SIZE;
    if buf.len() < chr_end {
        return Err(InvalidRom::Truncated {
            expected: chr_end,
            actual: buf.len(),
        });
    }
    Ok((header, prg_start))
}
