use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-decl-tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclTag {
    pub name_off: u32,
    pub type_id: u32,
    /// -1 when the tag applies to the type itself
    pub component_idx: i32,
}

impl DeclTag {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        reader.skip(4);
        Ok(DeclTag {
            name_off,
            type_id: reader.read_u32()?,
            component_idx: reader.read_i32()?,
        })
    }
}
