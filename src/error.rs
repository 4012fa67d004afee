//! Error types surfaced across the crate boundary.
//!
//! Per the core's error handling design, `InvalidRom` is the only error
//! that propagates to the host as a `Result`. Decode- and bus-time
//! anomalies (`UnknownOpcode`, `UnmappedAccess`) are not fatal and are
//! reported through the `log` facade instead; see [`log_unknown_opcode`]
//! and [`log_unmapped_access`].

use thiserror::Error;

/// A ROM image could not be loaded.
#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum InvalidRom {
    /// The first four header bytes were not `N`, `E`, `S`, $1A.
    #[error("bad iNES magic")]
    BadMagic,
    /// The header names a mapper this core does not implement.
    #[error("unsupported mapper {mapper}")]
    UnsupportedMapper { mapper: u8 },
    /// The file ended before the header promised it would.
    #[error("truncated ROM: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// The kind of bus access that missed every mapped device.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum UnmappedAccessKind {
    Read,
    Write,
}

/// Logs an opcode the decoder has no official table entry for.
///
/// Per the core's Non-goals, illegal opcodes are never emulated: the CPU
/// consumes one cycle and leaves state untouched. This only reports the
/// occurrence for diagnostics.
pub fn log_unknown_opcode(pc: u16, byte: u8) {
    log::warn!("unknown opcode ${byte:02X} at PC=${pc:04X}; treating as a 1-cycle no-op");
}

/// Logs a bus access that fell outside every mapped region.
pub fn log_unmapped_access(addr: u16, kind: UnmappedAccessKind) {
    log::debug!("unmapped {kind:?} at ${addr:04X}");
}
