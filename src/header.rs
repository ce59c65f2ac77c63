use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use std::ops::Range;

use crate::error::{BtfError, Result};

pub const BTF_MAGIC: u16 = 0xeb9f;
pub const BTF_VERSION: u8 = 1;
pub const BTF_HEADER_SIZE: usize = 24;

/// Byte order of a BTF image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the running host.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        }
    }
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::native()
    }
}

// https://docs.kernel.org/bpf/btf.html#btf-type-and-string-encoding
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct BtfHeader {
    pub magic: u16,
    pub version: u8,
    pub flags: u8,
    pub hdr_len: u32,
    pub type_off: u32,
    pub type_len: u32,
    pub str_off: u32,
    pub str_len: u32,
}

impl BtfHeader {
    /// A standard header for an image with the given section sizes, types first.
    pub fn new(type_len: u32, str_len: u32) -> Self {
        BtfHeader {
            magic: BTF_MAGIC,
            version: BTF_VERSION,
            flags: 0,
            hdr_len: BTF_HEADER_SIZE as u32,
            type_off: 0,
            type_len,
            str_off: type_len,
            str_len,
        }
    }

    fn read<E: ByteOrder>(data: &[u8]) -> BtfHeader {
        BtfHeader {
            magic: E::read_u16(&data[0..]),
            version: data[2],
            flags: data[3],
            hdr_len: E::read_u32(&data[4..]),
            type_off: E::read_u32(&data[8..]),
            type_len: E::read_u32(&data[12..]),
            str_off: E::read_u32(&data[16..]),
            str_len: E::read_u32(&data[20..]),
        }
    }

    fn write<E: ByteOrder>(&self, buf: &mut [u8]) {
        E::write_u16(&mut buf[0..], self.magic);
        buf[2] = self.version;
        buf[3] = self.flags;
        E::write_u32(&mut buf[4..], self.hdr_len);
        E::write_u32(&mut buf[8..], self.type_off);
        E::write_u32(&mut buf[12..], self.type_len);
        E::write_u32(&mut buf[16..], self.str_off);
        E::write_u32(&mut buf[20..], self.str_len);
    }

    /// Serializes the fixed 24-byte header in the given byte order.
    pub fn to_bytes(&self, endianness: Endianness) -> [u8; BTF_HEADER_SIZE] {
        let mut buf = [0u8; BTF_HEADER_SIZE];
        match endianness {
            Endianness::Little => self.write::<LittleEndian>(&mut buf),
            Endianness::Big => self.write::<BigEndian>(&mut buf),
        }
        buf
    }

    /// Validates the header at the start of `data`. A header in the opposite
    /// byte order is rewritten in place to host order, and `true` is returned
    /// alongside it.
    pub(crate) fn parse(data: &mut [u8]) -> Result<(BtfHeader, bool)> {
        if data.len() < BTF_HEADER_SIZE {
            log::debug!("BTF header not found, data size: {}", data.len());
            return Err(BtfError::TruncatedInput {
                offset: data.len(),
            });
        }

        let magic = NativeEndian::read_u16(data);
        let mut swapped = false;
        if magic == BTF_MAGIC.swap_bytes() {
            let hdr_len = NativeEndian::read_u32(&data[4..]).swap_bytes();
            if hdr_len as usize != BTF_HEADER_SIZE {
                log::debug!("unsupported swapped BTF header length: {}", hdr_len);
                return Err(BtfError::UnsupportedVersion { hdr_len });
            }
            let hdr = BtfHeader::read::<NativeEndian>(data);
            let hdr = hdr.swapped();
            hdr.write::<NativeEndian>(data);
            swapped = true;
        } else if magic != BTF_MAGIC {
            log::debug!("invalid BTF magic: {:#06x}", magic);
            return Err(BtfError::BadMagic { magic });
        }

        let hdr = BtfHeader::read::<NativeEndian>(data);
        log::debug!("swapped endian: {}, BtfHeader: {:#X?}", swapped, hdr);

        let hdr_len = hdr.hdr_len as usize;
        if hdr_len < BTF_HEADER_SIZE {
            return Err(BtfError::UnsupportedVersion {
                hdr_len: hdr.hdr_len,
            });
        }
        if data.len() < hdr_len {
            log::debug!("BTF header length {} exceeds data size {}", hdr_len, data.len());
            return Err(BtfError::TruncatedInput {
                offset: data.len(),
            });
        }

        let meta_left = (data.len() - hdr_len) as u64;
        let str_end = hdr.str_off as u64 + hdr.str_len as u64;
        if meta_left < str_end {
            log::debug!("BTF string section [{}, {}) exceeds data", hdr.str_off, str_end);
            return Err(BtfError::TruncatedInput {
                offset: data.len(),
            });
        }

        let type_end = hdr.type_off as u64 + hdr.type_len as u64;
        if type_end > hdr.str_off as u64 {
            log::debug!("BTF type section overlaps string section");
            return Err(BtfError::OverlappingSections {
                type_off: hdr.type_off,
                type_end,
                str_off: hdr.str_off,
            });
        }

        if hdr.type_off % 4 != 0 {
            log::debug!("BTF type section is not aligned to 4 bytes");
            return Err(BtfError::MisalignedSection {
                type_off: hdr.type_off,
            });
        }

        Ok((hdr, swapped))
    }

    fn swapped(&self) -> BtfHeader {
        BtfHeader {
            magic: self.magic.swap_bytes(),
            version: self.version,
            flags: self.flags,
            hdr_len: self.hdr_len.swap_bytes(),
            type_off: self.type_off.swap_bytes(),
            type_len: self.type_len.swap_bytes(),
            str_off: self.str_off.swap_bytes(),
            str_len: self.str_len.swap_bytes(),
        }
    }

    /// Byte range of the type section within the raw image. Only meaningful
    /// once the header passed [`BtfHeader::parse`].
    pub fn types_range(&self) -> Range<usize> {
        let start = self.hdr_len as usize + self.type_off as usize;
        start..start + self.type_len as usize
    }

    /// Byte range of the string section within the raw image.
    pub fn strs_range(&self) -> Range<usize> {
        let start = self.hdr_len as usize + self.str_off as usize;
        start..start + self.str_len as usize
    }
}
