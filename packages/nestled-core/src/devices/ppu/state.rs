//! PPU register bit assignments and the shell's state block.

bitflags! {
    /// $2000 PPUCTRL
    pub struct PpuCtrl: u8 {
        const NAMETABLE_BASE = 0x03;
        /// 0: PPUDATA accesses step the VRAM address by 1; 1: by 32.
        const VRAM_INCREMENT = 0x04;
        const SPRITE_TILE_SELECT = 0x08;
        const BG_TILE_SELECT = 0x10;
        const SPRITE_SIZE = 0x20;
        const MASTER_SLAVE = 0x40;
        /// Generate an NMI at the start of vblank.
        const NMI_ENABLE = 0x80;
    }
}

bitflags! {
    /// $2001 PPUMASK
    pub struct PpuMask: u8 {
        const GREYSCALE = 0x01;
        const BG_LEFT_COLUMN = 0x02;
        const SPRITE_LEFT_COLUMN = 0x04;
        const BG_ENABLE = 0x08;
        const SPRITE_ENABLE = 0x10;
        const EMPHASIZE_RED = 0x20;
        const EMPHASIZE_GREEN = 0x40;
        const EMPHASIZE_BLUE = 0x80;
    }
}

bitflags! {
    /// $2002 PPUSTATUS
    pub struct PpuStatus: u8 {
        const SPRITE_OVERFLOW = 0x20;
        const SPRITE_0_HIT = 0x40;
        const VBLANK = 0x80;
    }
}

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const SCANLINES_PER_FRAME: u16 = 262;
pub const VBLANK_SCANLINE: u16 = 241;
pub const PRERENDER_SCANLINE: u16 = 261;

pub struct PpuState {
    /// Horizontal position within the scanline, 0-340.
    pub dot: u16,
    /// Vertical position, 0-261. 0-239 visible, 240 post-render,
    /// 241-260 vblank, 261 pre-render.
    pub scanline: u16,
    /// Completed-frame counter.
    pub frame: u64,

    pub control: PpuCtrl,
    pub mask: PpuMask,
    pub status: PpuStatus,

    pub oam_addr: u8,
    pub oam: [u8; 256],

    /// The live 15-bit VRAM address register.
    pub v: u16,
    /// The temporary VRAM address register the latch pair builds into.
    pub t: u16,
    /// Fine X scroll, 3 bits.
    pub fine_x: u8,
    /// The shared PPUSCROLL/PPUADDR write latch; reset by PPUSTATUS reads.
    pub w: bool,

    /// The one-byte delay buffer behind PPUDATA reads.
    pub data_buffer: u8,

    /// Latched NMI request, drained by the motherboard between instructions.
    pub nmi_pending: bool,
    /// Set when a frame wraps; drained by the motherboard.
    pub frame_ready: bool,
}

pub const PPU_POWERON_STATE: PpuState = PpuState {
    dot: 0,
    scanline: 0,
    frame: 0,
    control: PpuCtrl::empty(),
    mask: PpuMask::empty(),
    status: PpuStatus::empty(),
    oam_addr: 0,
    oam: [0u8; 256],
    v: 0,
    t: 0,
    fine_x: 0,
    w: false,
    data_buffer: 0,
    nmi_pending: false,
    frame_ready: false,
};
