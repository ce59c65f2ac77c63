use super::info_vlen;
use crate::error::Result;
use crate::reader::RecordReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSecInfo {
    pub type_id: u32,
    pub offset: u32,
    pub size: u32,
}

// https://docs.kernel.org/bpf/btf.html#btf-kind-datasec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSec {
    pub name_off: u32,
    pub size: u32,
    pub secs: Vec<DataSecInfo>,
}

impl DataSec {
    pub(crate) fn from_reader(reader: &mut RecordReader) -> Result<Self> {
        let name_off = reader.read_u32()?;
        let info = reader.read_u32()?;
        let size = reader.read_u32()?;

        let mut secs = Vec::with_capacity(info_vlen!(info) as usize);
        for _ in 0..info_vlen!(info) {
            secs.push(DataSecInfo {
                type_id: reader.read_u32()?,
                offset: reader.read_u32()?,
                size: reader.read_u32()?,
            });
        }

        Ok(DataSec {
            name_off,
            size,
            secs,
        })
    }
}
