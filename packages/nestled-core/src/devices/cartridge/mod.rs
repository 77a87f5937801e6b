mod header;
mod nrom;

pub use header::{parse_header, INesFlags6, INesFlags7, INesHeader, RomError, INES_HEADER_LEN};

/// A cartridge is attached to both the CPU bus (PRG) and the PPU bus (CHR),
/// so it doesn't fit the single-bus `BusDevice` shape.
///
/// PRG addresses are full CPU addresses ($4020-$FFFF); CHR addresses are PPU
/// pattern-table addresses ($0000-$1FFF). Neither side has read side effects
/// on the mappers supported here, so reads take `&self` and double as the
/// debug peek.
pub trait Cartridge: Send {
    fn read_prg(&self, addr: u16) -> u8;

    /// Writes into PRG-ROM space are silently ignored on unbanked carts.
    fn write_prg(&mut self, addr: u16, value: u8);

    fn read_chr(&self, addr: u16) -> u8;

    fn write_chr(&mut self, addr: u16, value: u8);

    /// True when the header requested vertical nametable mirroring.
    fn vertical_mirroring(&self) -> bool;

    /// The raw PRG-ROM image, for the disassembly listing.
    fn prg(&self) -> &[u8];
}

/// Parse an iNES image and build the cartridge for its mapper.
pub fn from_ines(buf: &[u8]) -> Result<Box<dyn Cartridge>, RomError> {
    let header = parse_header(buf)?;
    match header.mapper() {
        0 => Ok(Box::new(nrom::Nrom::new(&header, buf)?)),
        mapper => Err(RomError::UnsupportedMapper(mapper)),
    }
}
