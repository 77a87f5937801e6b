//! Mapper 0 (NROM): fixed PRG at $8000-$FFFF, fixed CHR.

use super::header::{INesHeader, RomError, CHR_PAGE_LEN};
use super::Cartridge;

const PRG_BASE: u16 = 0x8000;

pub struct Nrom {
    prg: Vec<u8>,
    chr: Vec<u8>,
    /// CHR is writable only when the cart ships CHR-RAM (no CHR pages).
    chr_writable: bool,
    /// 16 KB carts mirror $8000-$BFFF into $C000-$FFFF.
    mirror_16k: bool,
    vertical_mirroring: bool,
}

impl Nrom {
    pub fn new(header: &INesHeader, buf: &[u8]) -> Result<Nrom, RomError> {
        let prg_start = header.prg_offset();
        let prg = buf[prg_start..prg_start + header.prg_len()].to_vec();
        let chr_start = prg_start + header.prg_len();
        let chr_writable = header.chr_pages == 0;
        let chr = if chr_writable {
            vec![0u8; CHR_PAGE_LEN]
        } else {
            buf[chr_start..chr_start + header.chr_len()].to_vec()
        };
        Ok(Nrom {
            prg,
            chr,
            chr_writable,
            mirror_16k: header.prg_pages == 1,
            vertical_mirroring: header.vertical_mirroring(),
        })
    }

    fn prg_index(&self, addr: u16) -> Option<usize> {
        if addr < PRG_BASE {
            return None;
        }
        let local = (addr - PRG_BASE) as usize;
        Some(if self.mirror_16k {
            local & 0x3FFF
        } else {
            local
        })
    }
}

impl Cartridge for Nrom {
    fn read_prg(&self, addr: u16) -> u8 {
        match self.prg_index(addr) {
            Some(idx) => self.prg[idx],
            // $4020-$7FFF has nothing mounted on NROM.
            None => 0,
        }
    }

    fn write_prg(&mut self, _addr: u16, _value: u8) {
        // PRG is mask ROM; hardware drops the write.
    }

    fn read_chr(&self, addr: u16) -> u8 {
        self.chr[(addr as usize) & (self.chr.len() - 1)]
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        if self.chr_writable {
            let len = self.chr.len();
            self.chr[(addr as usize) & (len - 1)] = value;
        }
    }

    fn vertical_mirroring(&self) -> bool {
        self.vertical_mirroring
    }

    fn prg(&self) -> &[u8] {
        &self.prg
    }
}
