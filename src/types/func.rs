use super::info_vlen;
use crate::error::Result;
use crate::reader::RecordReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncLinkage {
    Static,
    Global,
    Extern,
    Unknown(u32),
}

impl From<u32> for FuncLinkage {
    fn from(val: u32) -> Self {
        match val {
            0 => FuncLinkage::Static,
            1 => FuncLinkage::Global,
            2 => FuncLinkage::Extern,
            other => FuncLinkage::Unknown(other),
        }
    }
}

// https://docs.kernel.org/bpf/btf.html#btf-kind-func
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Func {
    pub name_off: u32,
    /// stored in the vlen bits of the info word
    pub linkage: FuncLinkage,
    /// id of the FUNC_PROTO describing the signature
    pub type_id: u32,
}

impl Func {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        let info = reader.read_u32()?;
        let type_id = reader.read_u32()?;
        Ok(Func {
            name_off,
            linkage: FuncLinkage::from(info_vlen!(info)),
            type_id,
        })
    }
}
