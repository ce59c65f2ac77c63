use super::{info_kind_flag, info_vlen, BtfMember};
use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub name_off: u32,
    pub members: Vec<BtfMember>,
    pub size: u32,
    pub has_bitfield: bool,
}

impl Struct {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        let info = reader.read_u32()?;
        let size = reader.read_u32()?;

        // the bit 31 of struct_type->info, previously reserved, now is used to indicate whether bitfield_size is
        // encoded in btf_member or not.
        let has_bitfield = info_kind_flag!(info) == 1;

        let mut members = Vec::with_capacity(info_vlen!(info) as usize);
        for _ in 0..info_vlen!(info) {
            members.push(BtfMember::from_reader(reader, has_bitfield)?);
        }

        Ok(Struct {
            name_off,
            members,
            size,
            has_bitfield,
        })
    }

    pub fn has_bitfield(&self) -> bool {
        self.has_bitfield
    }
}
