use super::info_vlen;
use crate::error::Result;
use crate::reader::RecordReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncParam {
    pub name_off: u32,
    /// 0 for the variadic `...` marker
    pub type_id: u32,
}

impl FuncParam {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        Ok(FuncParam {
            name_off: reader.read_u32()?,
            type_id: reader.read_u32()?,
        })
    }
}

// https://docs.kernel.org/bpf/btf.html#btf-kind-func-proto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncProto {
    pub params: Vec<FuncParam>,
    pub return_type_id: u32,
}

impl FuncProto {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        reader.skip(4);
        let info = reader.read_u32()?;
        let return_type_id = reader.read_u32()?;

        let mut params = Vec::with_capacity(info_vlen!(info) as usize);
        for _ in 0..info_vlen!(info) {
            params.push(FuncParam::from_reader(reader)?);
        }

        Ok(FuncProto {
            params,
            return_type_id,
        })
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.params.last(), Some(p) if p.type_id == 0 && p.name_off == 0)
    }
}
