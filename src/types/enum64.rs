use super::{info_kind_flag, info_vlen};
use crate::error::Result;
use crate::reader::RecordReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enum64Item {
    Signed(i64),
    Unsigned(u64),
}

// https://docs.kernel.org/bpf/btf.html#btf-kind-enum64
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum64 {
    pub name_off: u32,
    pub size: u32,
    /// (name_off, value) pairs
    pub enums: Vec<(u32, Enum64Item)>,
}

impl Enum64 {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        let info = reader.read_u32()?;
        let size = reader.read_u32()?;
        let signed = info_kind_flag!(info) == 1;
        let mut enums = Vec::with_capacity(info_vlen!(info) as usize);

        for _ in 0..info_vlen!(info) {
            let item_name = reader.read_u32()?;
            let low = reader.read_u32()? as u64;
            let high = reader.read_u32()? as u64;
            let val = (high << 32) | low;
            let item = if signed {
                Enum64Item::Signed(val as i64)
            } else {
                Enum64Item::Unsigned(val)
            };
            enums.push((item_name, item));
        }

        Ok(Enum64 {
            name_off,
            size,
            enums,
        })
    }
}
