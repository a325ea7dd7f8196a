pub type Byte = u8;

pub const KIBI: usize = 1024;
