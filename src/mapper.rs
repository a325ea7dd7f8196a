use thiserror::Error;

use crate::cartridge::Cartridge;
use crate::common::{Byte, KIBI};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BankRangeError {
  #[error("this mapper isn't known to feature {region}-ROM banking")]
  NoBanking { region: &'static str },
  #[error("{region}-ROM bank number {bank} is too high (only {count} bank(s))")]
  OutOfRange {
    region: &'static str,
    bank: usize,
    count: usize,
  },
}

/// Static per-family banking metadata. A bank size of 0 means the mapper
/// doesn't bank that region: the whole buffer is one unit.
pub struct MapperInfo {
  pub name: &'static str,
  pub prg_bank_size: usize,
  pub chr_bank_size: usize,
}

static MAPPER_BAD: MapperInfo = MapperInfo {
  name: "Unsupported",
  prg_bank_size: 0,
  chr_bank_size: 0,
};
static MAPPER_NROM: MapperInfo = MapperInfo {
  name: "NROM",
  prg_bank_size: 0,
  chr_bank_size: 0,
};
static MAPPER_MMC1: MapperInfo = MapperInfo {
  name: "MMC1",
  prg_bank_size: 16 * KIBI,
  chr_bank_size: 4 * KIBI,
};
static MAPPER_UNROM: MapperInfo = MapperInfo {
  name: "UNROM",
  prg_bank_size: 16 * KIBI,
  chr_bank_size: 0,
};
static MAPPER_CNROM: MapperInfo = MapperInfo {
  name: "CNROM",
  prg_bank_size: 0,
  chr_bank_size: 8 * KIBI,
};
static MAPPER_MMC3: MapperInfo = MapperInfo {
  name: "MMC3",
  prg_bank_size: 8 * KIBI,
  chr_bank_size: KIBI,
};
static MAPPER_MMC5: MapperInfo = MapperInfo {
  name: "MMC5",
  prg_bank_size: 8 * KIBI,
  chr_bank_size: KIBI,
};
static MAPPER_AOROM: MapperInfo = MapperInfo {
  name: "AOROM",
  prg_bank_size: 32 * KIBI,
  chr_bank_size: 0,
};
static MAPPER_MMC2: MapperInfo = MapperInfo {
  name: "MMC2",
  prg_bank_size: 8 * KIBI,
  chr_bank_size: 4 * KIBI,
};
static MAPPER_MMC4: MapperInfo = MapperInfo {
  name: "MMC4",
  prg_bank_size: 16 * KIBI,
  chr_bank_size: 4 * KIBI,
};
static MAPPER_BANDAI: MapperInfo = MapperInfo {
  name: "BANDAI",
  prg_bank_size: 16 * KIBI,
  chr_bank_size: KIBI,
};

/// Total lookup: unknown ids land on the shared "Unsupported" entry
/// instead of an error.
pub fn get_mapper_info(mapper_id: Byte) -> &'static MapperInfo {
  match mapper_id {
    0 => &MAPPER_NROM,
    1 => &MAPPER_MMC1,
    2 => &MAPPER_UNROM,
    3 => &MAPPER_CNROM,
    4 => &MAPPER_MMC3,
    5 => &MAPPER_MMC5,
    7 => &MAPPER_AOROM,
    9 => &MAPPER_MMC2,
    10 => &MAPPER_MMC4,
    16 => &MAPPER_BANDAI,
    _ => &MAPPER_BAD,
  }
}

impl MapperInfo {
  /// Whole banks only: a trailing partial bank is not counted. With no
  /// banking granularity the buffer counts as a single bank even when empty.
  pub fn count_prg_banks(&self, cart: &Cartridge) -> usize {
    if self.prg_bank_size == 0 {
      return 1;
    }
    cart.get_prg_rom().len() / self.prg_bank_size
  }

  pub fn count_chr_banks(&self, cart: &Cartridge) -> usize {
    if self.chr_bank_size == 0 {
      return 1;
    }
    cart.get_chr_rom().len() / self.chr_bank_size
  }

  pub fn get_prg_bank<'a>(
    &self,
    cart: &'a Cartridge,
    bank: usize,
  ) -> Result<&'a [Byte], BankRangeError> {
    slice_bank("PRG", cart.get_prg_rom(), self.prg_bank_size, bank)
  }

  pub fn get_chr_bank<'a>(
    &self,
    cart: &'a Cartridge,
    bank: usize,
  ) -> Result<&'a [Byte], BankRangeError> {
    slice_bank("CHR", cart.get_chr_rom(), self.chr_bank_size, bank)
  }
}

fn slice_bank<'a>(
  region: &'static str,
  rom: &'a [Byte],
  bank_size: usize,
  bank: usize,
) -> Result<&'a [Byte], BankRangeError> {
  if bank_size == 0 {
    return Err(BankRangeError::NoBanking { region });
  }
  let count = rom.len() / bank_size;
  if bank >= count {
    return Err(BankRangeError::OutOfRange {
      region,
      bank,
      count,
    });
  }
  let start = bank * bank_size;
  Ok(&rom[start..start + bank_size])
}
