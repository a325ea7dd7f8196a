pub mod cartridge;
pub mod common;
pub mod logger;
pub mod mapper;
