use crate::error::Result;
use crate::reader::RecordReader;
use std::fmt;

// https://docs.kernel.org/bpf/btf.html#btf-kind-ptr
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ptr {
    pub type_id: u32,
}

impl Ptr {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        reader.skip(8);
        Ok(Ptr {
            type_id: reader.read_u32()?,
        })
    }
}

impl fmt::Display for Ptr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pointer: {}", self.type_id)
    }
}
