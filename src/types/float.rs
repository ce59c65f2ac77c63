use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-float
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Float {
    pub name_off: u32,
    pub size: u32,
}

impl Float {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        reader.skip(4);

        Ok(Float {
            name_off,
            size: reader.read_u32()?,
        })
    }
}
