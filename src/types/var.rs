use crate::error::Result;
use crate::reader::RecordReader;

// https://docs.kernel.org/bpf/btf.html#btf-kind-var
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub name_off: u32,
    pub type_id: u32,
    /// 0 static, 1 global, 2 extern
    pub linkage: u32,
}

impl Var {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        reader.skip(4);
        let type_id = reader.read_u32()?;
        let linkage = reader.read_u32()?;
        Ok(Var {
            name_off,
            type_id,
            linkage,
        })
    }
}
