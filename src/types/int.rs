use std::fmt;

use crate::error::Result;
use crate::reader::RecordReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntEncoding {
    Default,
    Signed,
    Char,
    Bool,
    /// any other combination of encoding bits
    Unknown(u8),
}

impl From<u32> for IntEncoding {
    fn from(val: u32) -> Self {
        match (val >> 24) & 0xf {
            0 => IntEncoding::Default,
            1 => IntEncoding::Signed,
            2 => IntEncoding::Char,
            4 => IntEncoding::Bool,
            other => IntEncoding::Unknown(other as u8),
        }
    }
}

impl fmt::Display for IntEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntEncoding::Default => write!(f, "Default"),
            IntEncoding::Signed => write!(f, "Signed"),
            IntEncoding::Char => write!(f, "Char"),
            IntEncoding::Bool => write!(f, "Bool"),
            IntEncoding::Unknown(bits) => write!(f, "Unknown({:#x})", bits),
        }
    }
}

// https://docs.kernel.org/bpf/btf.html#btf-kind-int
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Int {
    pub name_off: u32,
    /// size in bytes
    pub size: u32,
    pub encoding: IntEncoding,
    /// the start offset and bits for bitfield
    pub offset: u8,
    pub bits: u8,
}

impl Int {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        let _info = reader.read_u32()?;
        let size = reader.read_u32()?;
        let attr = reader.read_u32()?;

        Ok(Int {
            name_off,
            size,
            encoding: IntEncoding::from(attr),
            offset: ((attr & 0x00ff0000) >> 16) as u8,
            bits: (attr & 0x000000ff) as u8,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_signed(&self) -> bool {
        self.encoding == IntEncoding::Signed
    }

    pub fn is_bitfield(&self) -> bool {
        self.offset != 0 || self.bits as u32 != self.size * 8
    }

    pub fn is_bool(&self) -> bool {
        self.encoding == IntEncoding::Bool
    }

    pub fn is_char(&self) -> bool {
        self.encoding == IntEncoding::Char
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "INT size: {}, encoding: {}, bitfield:({}, {})",
            self.size, self.encoding, self.offset, self.bits
        )
    }
}
