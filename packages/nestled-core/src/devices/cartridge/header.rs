//! iNES container header parsing.

use thiserror::Error;

pub const INES_HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
pub const PRG_PAGE_LEN: usize = 16 * 1024;
pub const CHR_PAGE_LEN: usize = 8 * 1024;

/// The magic at the start of every iNES file: "NES" followed by an EOF byte.
const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

#[derive(Debug, Error)]
pub enum RomError {
    #[error("not an iNES file (bad magic)")]
    BadMagic,
    #[error("truncated iNES file: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("iNES header declares no PRG-ROM pages")]
    NoPrgRom,
    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u8),
    #[error("failed to read ROM file: {0}")]
    Io(#[from] std::io::Error),
}

bitflags! {
    pub struct INesFlags6: u8 {
        /// 0 = horizontal (vertical arrangement), 1 = vertical mirroring.
        const VERTICAL_MIRRORING = 0x01;
        const HAS_PERSISTENT_MEMORY = 0x02;
        const HAS_TRAINER = 0x04;
        const USE_FOUR_SCREEN_VRAM = 0x08;
        const LOWER_MAPPER_NIBBLE = 0xF0;
    }
}

bitflags! {
    pub struct INesFlags7: u8 {
        const VS_UNISYSTEM_ROM = 0x01;
        const PLAYCHOICE_10 = 0x02;
        /// When equal to 0b10, the rest of the header is NES 2.0 format.
        const IS_INES_2_0 = 0x0C;
        const UPPER_MAPPER_NIBBLE = 0xF0;
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct INesHeader {
    /// PRG-ROM size in 16 KB pages. Never 0 for a valid header.
    pub prg_pages: usize,
    /// CHR-ROM size in 8 KB pages. 0 means the cart supplies CHR-RAM.
    pub chr_pages: usize,
    pub flags_6: INesFlags6,
    pub flags_7: INesFlags7,
}

impl INesHeader {
    pub fn mapper(&self) -> u8 {
        let lower = (self.flags_6 & INesFlags6::LOWER_MAPPER_NIBBLE).bits() >> 4;
        let upper = (self.flags_7 & INesFlags7::UPPER_MAPPER_NIBBLE).bits();
        upper | lower
    }

    pub fn has_trainer(&self) -> bool {
        self.flags_6.contains(INesFlags6::HAS_TRAINER)
    }

    pub fn vertical_mirroring(&self) -> bool {
        self.flags_6.contains(INesFlags6::VERTICAL_MIRRORING)
    }

    /// Offset of PRG-ROM in the file (the trainer, when present, comes first).
    pub fn prg_offset(&self) -> usize {
        INES_HEADER_LEN + if self.has_trainer() { TRAINER_LEN } else { 0 }
    }

    pub fn prg_len(&self) -> usize {
        self.prg_pages * PRG_PAGE_LEN
    }

    pub fn chr_len(&self) -> usize {
        self.chr_pages * CHR_PAGE_LEN
    }

    /// Total file length this header implies.
    pub fn expected_len(&self) -> usize {
        self.prg_offset() + self.prg_len() + self.chr_len()
    }
}

/// Parse and validate an iNES header against the buffer that holds it.
pub fn parse_header(buf: &[u8]) -> Result<INesHeader, RomError> {
    if buf.len() < INES_HEADER_LEN {
        return Err(RomError::Truncated {
            expected: INES_HEADER_LEN,
            actual: buf.len(),
        });
    }
    if buf[0..4] != INES_MAGIC {
        return Err(RomError::BadMagic);
    }
    let header = INesHeader {
        prg_pages: buf[4] as usize,
        chr_pages: buf[5] as usize,
        flags_6: INesFlags6::from_bits_truncate(buf[6]),
        flags_7: INesFlags7::from_bits_truncate(buf[7]),
    };
    if header.prg_pages == 0 {
        return Err(RomError::NoPrgRom);
    }
    if buf.len() < header.expected_len() {
        return Err(RomError::Truncated {
            expected: header.expected_len(),
            actual: buf.len(),
        });
    }
    Ok(header)
}
