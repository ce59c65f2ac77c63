use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Array {
    pub elem_type_id: u32,
    pub index_type_id: u32,
    pub nelems: u32,
}

impl Array {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        reader.skip(12);

        Ok(Array {
            elem_type_id: reader.read_u32()?,
            index_type_id: reader.read_u32()?,
            nelems: reader.read_u32()?,
        })
    }
}
