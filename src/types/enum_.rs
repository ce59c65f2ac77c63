use super::{info_kind_flag, info_vlen};
use crate::error::Result;
use crate::reader::RecordReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumItem {
    Signed(i32),
    Unsigned(u32),
}

// https://docs.kernel.org/bpf/btf.html#btf-kind-enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub name_off: u32,
    // 1/2/4/8
    pub size: u32,
    /// (name_off, value) pairs
    pub enums: Vec<(u32, EnumItem)>,
}

impl Enum {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        let info = reader.read_u32()?;
        let size = reader.read_u32()?;

        let signed = info_kind_flag!(info) == 1;
        let mut enums = Vec::with_capacity(info_vlen!(info) as usize);

        for _ in 0..info_vlen!(info) {
            let item_name = reader.read_u32()?;
            let item = if signed {
                EnumItem::Signed(reader.read_i32()?)
            } else {
                EnumItem::Unsigned(reader.read_u32()?)
            };
            enums.push((item_name, item));
        }

        Ok(Enum {
            name_off,
            size,
            enums,
        })
    }
}
