use std::io::Write;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

use nesdump::cartridge::Cartridge;
use nesdump::logger;
use nesdump::mapper::{get_mapper_info, MapperInfo};

#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
  /// Path to an iNES ROM image
  rom_path: String,

  /// What to dump: "info", "prg[:bank]" or "chr[:bank]"
  item: String,

  /// Log ROM details while loading
  #[clap(short, long)]
  verbose: bool,
}

/// One arm per thing the tool can print. No bank number means the whole
/// region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Item {
  Info,
  Prg(Option<usize>),
  Chr(Option<usize>),
}

impl FromStr for Item {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    let (name, part) = match s.find(':') {
      Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
      None => (s, None),
    };
    let bank = match part {
      Some(part) => Some(parse_bank(part)?),
      None => None,
    };
    match name {
      "info" if bank.is_none() => Ok(Item::Info),
      "prg" => Ok(Item::Prg(bank)),
      "chr" => Ok(Item::Chr(bank)),
      _ => bail!("unknown item {:?} (expected info, prg[:bank] or chr[:bank])", s),
    }
  }
}

fn parse_bank(part: &str) -> Result<usize> {
  let parsed = match part.strip_prefix("0x") {
    Some(hex) => usize::from_str_radix(hex, 16),
    None => part.parse(),
  };
  parsed.map_err(|_| anyhow!("bad bank number {:?}", part))
}

fn print_info(cart: &Cartridge, info: &MapperInfo) {
  println!("ROM Info:");
  println!("  Mapper:       {} ({})", info.name, cart.get_mapper());
  println!("  iNES flags:   {:x}", cart.get_ines_flags());
  println!(
    "  PRG-ROM size: {}K ({} bank(s))",
    cart.get_prg_rom().len() / 1024,
    info.count_prg_banks(cart)
  );
  println!(
    "  CHR-ROM size: {}K ({} bank(s))",
    cart.get_chr_rom().len() / 1024,
    info.count_chr_banks(cart)
  );
}

fn run(args: &Args) -> Result<()> {
  let item = args.item.parse::<Item>()?;
  let cart = Cartridge::from_file(&args.rom_path)?;
  let info = get_mapper_info(cart.get_mapper());

  let stdout = std::io::stdout();
  let mut out = stdout.lock();
  match item {
    Item::Info => print_info(&cart, info),
    Item::Prg(None) => out.write_all(cart.get_prg_rom()).context("write failed")?,
    Item::Prg(Some(bank)) => out
      .write_all(info.get_prg_bank(&cart, bank)?)
      .context("write failed")?,
    Item::Chr(None) => out.write_all(cart.get_chr_rom()).context("write failed")?,
    Item::Chr(Some(bank)) => out
      .write_all(info.get_chr_bank(&cart, bank)?)
      .context("write failed")?,
  }
  Ok(())
}

fn main() {
  let args = Args::parse();
  match logger::init(args.verbose) {
    Err(_) => return,
    Ok(_) => {}
  };
  if let Err(e) = run(&args) {
    eprintln!("An error occured:");
    eprintln!("  {}", e);
    std::process::exit(2);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn item_parsing() {
    assert_eq!("info".parse::<Item>().unwrap(), Item::Info);
    assert_eq!("prg".parse::<Item>().unwrap(), Item::Prg(None));
    assert_eq!("chr".parse::<Item>().unwrap(), Item::Chr(None));
    assert_eq!("prg:3".parse::<Item>().unwrap(), Item::Prg(Some(3)));
    assert_eq!("chr:0x10".parse::<Item>().unwrap(), Item::Chr(Some(16)));
  }

  #[test]
  fn bad_items_are_rejected() {
    assert!("nametable".parse::<Item>().is_err());
    assert!("prg:x".parse::<Item>().is_err());
    assert!("info:1".parse::<Item>().is_err());
    assert!("prg:".parse::<Item>().is_err());
  }
}
