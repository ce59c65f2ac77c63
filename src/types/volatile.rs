use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-volatile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volatile {
    pub name_off: u32,
    pub type_id: u32,
}

impl Volatile {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        reader.skip(4);
        Ok(Volatile {
            name_off,
            type_id: reader.read_u32()?,
        })
    }
}
