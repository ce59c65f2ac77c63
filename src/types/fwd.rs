use super::info_kind_flag;
use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-fwd
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fwd {
    pub name_off: u32,
    // struct or union
    pub is_struct: bool,
}

impl Fwd {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        let info = reader.read_u32()?;
        let is_struct = info_kind_flag!(info) == 0;
        reader.skip(4);

        Ok(Fwd {
            name_off,
            is_struct,
        })
    }
}
