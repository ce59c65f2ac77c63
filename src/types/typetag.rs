use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-type-tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTag {
    pub name_off: u32,
    pub type_id: u32,
}

impl TypeTag {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        reader.skip(4);
        Ok(TypeTag {
            name_off,
            type_id: reader.read_u32()?,
        })
    }
}
