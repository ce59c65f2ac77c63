use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-const
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Const {
    pub name_off: u32,
    pub type_id: u32,
}

impl Const {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        reader.skip(4);
        Ok(Const {
            name_off,
            type_id: reader.read_u32()?,
        })
    }
}
