//! PPU register state and the palette table.
//!
//! The rendering pipeline itself (background/sprite shift registers, tile
//! fetch pipeline) is out of scope here: this core owns the PPU's *timing*
//! and *register* behavior bit-for-bit, and emits the backdrop color for
//! every pixel rather than a composited picture. Everything a program
//! polling $2002/$2004/$2007 or waiting on VBlank/NMI observes is accurate;
//! what ends up in the frame buffer is not.

bitflags! {
    /// $PPUCTRL.
    pub struct PpuControlFlags: u8 {
        const NAMETABLE_BASE_SELECT  = 0x03;
        const VRAM_INCREMENT_SELECT  = 0x04;
        const SPRITE_TILE_SELECT     = 0x08;
        const BG_TILE_SELECT         = 0x10;
        const SPRITE_MODE_SELECT     = 0x20;
        const PPU_BG_COLOR_SELECT    = 0x40;
        const VBLANK_NMI_ENABLE      = 0x80;
    }
}

bitflags! {
    /// $PPUMASK.
    pub struct PpuMaskFlags: u8 {
        const USE_GRAYSCALE        = 0x01;
        const BG_LEFT_ENABLE       = 0x02;
        const SPRITE_LEFT_ENABLE   = 0x04;
        const BG_ENABLE            = 0x08;
        const SPRITE_ENABLE        = 0x10;
        const COLOR_EMPHASIS_RED   = 0x20;
        const COLOR_EMPHASIS_GREEN = 0x40;
        const COLOR_EMPHASIS_BLUE  = 0x80;
    }
}

bitflags! {
    /// $PPUSTATUS. Bits 0-4 are open-bus and carry whatever was last
    /// driven onto the bus by another write.
    pub struct PpuStatusFlags: u8 {
        const SPRITE_OVERFLOW = 0x20;
        const SPRITE_0_HIT    = 0x40;
        const VBLANK          = 0x80;
    }
}

/// The PPU's CPU-visible register file and the scheduling state needed to
/// drive it a dot at a time.
pub struct PpuState {
    pub control: PpuControlFlags,
    pub mask: PpuMaskFlags,
    pub status: PpuStatusFlags,

    /// $OAMADDR.
    pub oam_addr: u8,
    /// 256 bytes of sprite attribute memory.
    pub oam: Vec<u8>,

    /// The 15-bit current VRAM address ("v" in Loopy's terminology). Not
    /// used for rendering here, but $PPUSCROLL/$PPUADDR/$PPUDATA's address
    /// increment and the w-latch toggle still need somewhere to live.
    pub v: u16,
    /// The 15-bit temporary VRAM address ("t").
    pub t: u16,
    /// Fine X scroll, 3 bits.
    pub fine_x: u8,
    /// The shared write-twice latch for $PPUSCROLL/$PPUADDR.
    pub write_latch: bool,

    /// The one-cycle-delayed read buffer backing $PPUDATA reads from
    /// non-palette addresses.
    pub data_read_buffer: u8,
    /// The last byte driven onto the PPU register bus, used to fill the
    /// open-bus bits of reads from write-only registers.
    pub last_bus_value: u8,

    /// Current dot within the scanline, 0-340.
    pub dot: u16,
    /// Current scanline, 0-261 (240 is the idle/post-render line, 261 is
    /// the pre-render line).
    pub scanline: u16,
    /// Toggles every frame; used to skip dot 0 of the pre-render line on
    /// odd frames when rendering is enabled.
    pub odd_frame: bool,
    /// Set for one PPU step when a frame's final dot has been reached.
    pub frame_ready: bool,

    /// The RGBA8 frame buffer, 256x240.
    pub frame: Vec<u8>,
}

impl PpuState {
    pub fn new() -> PpuState {
        PpuState {
            control: PpuControlFlags::empty(),
            mask: PpuMaskFlags::empty(),
            status: PpuStatusFlags::empty(),
            oam_addr: 0,
            oam: vec![0u8; 256],
            v: 0,
            t: 0,
            fine_x: 0,
            write_latch: false,
            data_read_buffer: 0,
            last_bus_value: 0,
            dot: 0,
            scanline: 0,
            odd_frame: false,
            frame_ready: false,
            frame: vec![0u8; 256 * 240 * 4],
        }
    }
}

impl Default for PpuState {
    fn default() -> Self {
        Self::new()
    }
}

/// NTSC palette, taken from NESDev's reference table: 64 RGB triplets.
/// Indexed as `PALETTE_TABLE[index * 3 .. index * 3 + 3]`.
#[rustfmt::skip]
pub const PALETTE_TABLE: [u8; 192] = [
    101, 101, 101,   0,  45, 105,  19,  31, 127,  60,  19, 124,
     96,  11,  98, 115,  10,  55, 113,  15,   7,  90,  26,   0,
     52,  40,   0,  11,  52,   0,   0,  60,   0,   0,  61,  16,
      0,  56,  64,   0,   0,   0,   0,   0,   0,   0,   0,   0,

    174, 174, 174,  15,  99, 179,  64,  81, 208, 120,  65, 204,
    167,  54, 169, 192,  52, 112, 189,  60,  48, 159,  74,   0,
    109,  92,   0,  54, 109,   0,   7, 119,   4,   0, 121,  61,
      0, 114, 125,   0,   0,   0,   0,   0,   0,   0,   0,   0,

    254, 254, 255,  93, 179, 255, 143, 161, 255, 200, 144, 255,
    247, 133, 250, 255, 131, 192, 255, 139, 127, 239, 154,  73,
    189, 172,  44, 133, 188,  47,  85, 199,  83,  60, 201, 140,
     62, 194, 205,  78,  78,  78,   0,   0,   0,   0,   0,   0,

    254, 254, 255, 188, 223, 255, 209, 216, 255, 232, 209, 255,
    251, 205, 253, 255, 204, 229, 255, 207, 202, 248, 213, 180,
    228, 220, 168, 204, 227, 169, 185, 232, 184, 174, 232, 208,
    175, 229, 234, 182, 182, 182,   0,   0,   0,   0,   0,   0,
];
