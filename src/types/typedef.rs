use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-typedef
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Typedef {
    pub name_off: u32,
    pub type_id: u32,
}

impl Typedef {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        reader.skip(4);
        Ok(Typedef {
            name_off,
            type_id: reader.read_u32()?,
        })
    }
}
