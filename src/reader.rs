use byteorder::{ByteOrder, NativeEndian};
use std::fmt;

use crate::error::{BtfError, Result};

/// Cursor over one host-order type record.
pub(crate) struct RecordReader<'a> {
    data: &'a [u8],
    cursor: usize,
    /// offset of the record within its type section, for error reporting
    offset: usize,
}

impl fmt::Debug for RecordReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordReader")
            .field("len", &self.data.len())
            .field("cursor", &self.cursor)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a> RecordReader<'a> {
    pub(crate) fn new(data: &'a [u8], offset: usize) -> Self {
        RecordReader {
            data,
            cursor: 0,
            offset,
        }
    }

    fn peek_u32(&self, at: usize) -> Result<u32> {
        let start = self.cursor + at;
        self.data
            .get(start..start + 4)
            .map(NativeEndian::read_u32)
            .ok_or(BtfError::CorruptRecord {
                offset: self.offset,
            })
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let ret = self.peek_u32(0)?;
        self.cursor += 4;
        Ok(ret)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub(crate) fn skip(&mut self, len: usize) {
        self.cursor += len;
    }
}
