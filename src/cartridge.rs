use log::info;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::vec::Vec;
use thiserror::Error;

use crate::common::Byte;

/// iNES declares PRG-ROM in 16KB units and CHR-ROM in 8KB units.
pub const INES_PRG_BANK_SIZE: usize = 0x4000;
pub const INES_CHR_BANK_SIZE: usize = 0x2000;

const INES_HEADER_SIZE: usize = 16;
const INES_MAGIC: [u8; 4] = [b'N', b'E', b'S', 0x1A];

#[derive(Debug, Error)]
pub enum FormatError {
  #[error("couldn't open ROM file for binary read: {0}")]
  Open(std::io::Error),
  #[error("file doesn't contain valid iNES header (bad magic {0:02x?})")]
  BadMagic([u8; 4]),
  #[error("couldn't read iNES header (reached EOF early)")]
  TruncatedHeader,
  #[error("couldn't read PRG-ROM (reached EOF early)")]
  TruncatedPrg,
  #[error("couldn't read CHR-ROM (reached EOF early)")]
  TruncatedChr,
  #[error("read error on ROM source: {0}")]
  Io(#[from] std::io::Error),
}

pub struct Cartridge {
  prg_rom: Vec<Byte>,
  chr_rom: Vec<Byte>,
  mapper_id: Byte,
  ines_flags: Byte,
}

impl Cartridge {
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FormatError> {
    info!("Reading ROM content from {}", path.as_ref().display());
    let rom_file = File::open(path).map_err(FormatError::Open)?;
    Self::from_reader(BufReader::new(rom_file))
  }

  pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
    Self::from_reader(data)
  }

  /// Consumes the source strictly in header -> PRG -> CHR order, so any
  /// non-seekable reader works.
  pub fn from_reader<T: Read>(mut reader: T) -> Result<Self, FormatError> {
    let mut header = [0 as Byte; INES_HEADER_SIZE];
    reader.read_exact(&mut header).map_err(|e| {
      if e.kind() == std::io::ErrorKind::UnexpectedEof {
        FormatError::TruncatedHeader
      } else {
        FormatError::Io(e)
      }
    })?;

    if header[0..4] != INES_MAGIC {
      let mut magic = [0 as Byte; 4];
      magic.copy_from_slice(&header[0..4]);
      return Err(FormatError::BadMagic(magic));
    }

    // A declared count of 0 just means an empty region, not an error.
    let banks = header[4];
    let vbanks = header[5];
    info!(
      "Load header finished. 16KB PRG-ROM Banks: {}, 8KB CHR-ROM Banks: {}",
      banks, vbanks
    );

    let prg_rom = read_span(&mut reader, banks as usize * INES_PRG_BANK_SIZE)?
      .ok_or(FormatError::TruncatedPrg)?;
    let chr_rom = read_span(&mut reader, vbanks as usize * INES_CHR_BANK_SIZE)?
      .ok_or(FormatError::TruncatedChr)?;

    let mapper_id = ((header[6] & 0xF0) >> 4) | (header[7] & 0xF0);
    let ines_flags = (header[6] & 0x0F) | ((header[7] & 0x0F) << 4);
    info!("Mapper: {}, iNES flags: {:#04x}", mapper_id, ines_flags);

    Ok(Self {
      prg_rom,
      chr_rom,
      mapper_id,
      ines_flags,
    })
  }

  pub fn get_prg_rom(&self) -> &Vec<Byte> {
    &self.prg_rom
  }

  pub fn get_chr_rom(&self) -> &Vec<Byte> {
    &self.chr_rom
  }

  pub fn get_mapper(&self) -> Byte {
    self.mapper_id
  }

  pub fn get_ines_flags(&self) -> Byte {
    self.ines_flags
  }
}

/// Reads exactly `size` bytes; `Ok(None)` marks a short read.
fn read_span<T: Read>(
  reader: &mut T,
  size: usize,
) -> Result<Option<Vec<Byte>>, FormatError> {
  let mut buf = Vec::with_capacity(size);
  reader.by_ref().take(size as u64).read_to_end(&mut buf)?;
  if buf.len() != size {
    return Ok(None);
  }
  Ok(Some(buf))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn make_rom(prg_banks: u8, chr_banks: u8, byte6: u8, byte7: u8) -> Vec<u8> {
    let mut rom = vec![b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, byte6, byte7];
    rom.resize(INES_HEADER_SIZE, 0);
    rom.resize(
      INES_HEADER_SIZE
        + prg_banks as usize * INES_PRG_BANK_SIZE
        + chr_banks as usize * INES_CHR_BANK_SIZE,
      0xAB,
    );
    rom
  }

  #[test]
  fn well_formed_rom_loads() {
    let cart = Cartridge::from_bytes(&make_rom(2, 1, 0, 0)).unwrap();
    assert_eq!(cart.get_prg_rom().len(), 2 * INES_PRG_BANK_SIZE);
    assert_eq!(cart.get_chr_rom().len(), INES_CHR_BANK_SIZE);
  }

  #[test]
  fn zero_bank_counts_yield_empty_regions() {
    let cart = Cartridge::from_bytes(&make_rom(0, 0, 0, 0)).unwrap();
    assert!(cart.get_prg_rom().is_empty());
    assert!(cart.get_chr_rom().is_empty());

    let cart = Cartridge::from_bytes(&make_rom(1, 0, 0, 0)).unwrap();
    assert_eq!(cart.get_prg_rom().len(), INES_PRG_BANK_SIZE);
    assert!(cart.get_chr_rom().is_empty());
  }

  #[test]
  fn bad_magic_is_rejected() {
    let mut rom = make_rom(1, 1, 0, 0);
    rom[3] = b'!';
    assert!(matches!(
      Cartridge::from_bytes(&rom),
      Err(FormatError::BadMagic(_))
    ));

    // lowercase is not the magic either
    let mut rom = make_rom(1, 1, 0, 0);
    rom[0] = b'n';
    assert!(matches!(
      Cartridge::from_bytes(&rom),
      Err(FormatError::BadMagic(_))
    ));
  }

  #[test]
  fn truncated_header_is_rejected() {
    let rom = [b'N', b'E', b'S', 0x1A, 1, 1];
    assert!(matches!(
      Cartridge::from_bytes(&rom),
      Err(FormatError::TruncatedHeader)
    ));
  }

  #[test]
  fn truncated_payload_is_rejected() {
    let mut rom = make_rom(1, 0, 0, 0);
    rom.truncate(rom.len() - 1);
    assert!(matches!(
      Cartridge::from_bytes(&rom),
      Err(FormatError::TruncatedPrg)
    ));

    let mut rom = make_rom(1, 1, 0, 0);
    rom.truncate(rom.len() - 1);
    assert!(matches!(
      Cartridge::from_bytes(&rom),
      Err(FormatError::TruncatedChr)
    ));
  }

  #[test]
  fn mapper_id_combines_high_nibbles() {
    let pairs = [
      (0x10u8, 0x20u8, 0x21u8),
      (0xF0, 0x00, 0x0F),
      (0x4A, 0xC5, 0xC4),
    ];
    for (byte6, byte7, want) in pairs {
      let cart = Cartridge::from_bytes(&make_rom(0, 0, byte6, byte7)).unwrap();
      assert_eq!(cart.get_mapper(), want);
    }
  }

  #[test]
  fn flags_combine_low_nibbles() {
    let pairs = [
      (0x05u8, 0x0Au8, 0xA5u8),
      (0x0F, 0x00, 0x0F),
      (0x4A, 0xC5, 0x5A),
    ];
    for (byte6, byte7, want) in pairs {
      let cart = Cartridge::from_bytes(&make_rom(0, 0, byte6, byte7)).unwrap();
      assert_eq!(cart.get_ines_flags(), want);
    }
  }
}
