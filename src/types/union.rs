use super::{info_kind_flag, info_vlen, BtfMember};
use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-union
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    pub name_off: u32,
    pub members: Vec<BtfMember>,
    pub size: u32,
}

impl Union {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        let info = reader.read_u32()?;
        let size = reader.read_u32()?;
        let has_bitfield = info_kind_flag!(info) == 1;

        let mut members = Vec::with_capacity(info_vlen!(info) as usize);
        for _ in 0..info_vlen!(info) {
            members.push(BtfMember::from_reader(reader, has_bitfield)?);
        }

        Ok(Union {
            name_off,
            members,
            size,
        })
    }
}
