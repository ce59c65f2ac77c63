use byteorder::{ByteOrder, NativeEndian};
use std::fmt;
use std::ops::Deref;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::path::Path;

use crate::error::{BtfError, InvalidReason, Result};
use crate::header::{BtfHeader, Endianness, BTF_HEADER_SIZE};
use crate::kind::{BtfKind, BTF_TYPE_SIZE};
use crate::reader::RecordReader;
use crate::strset::{StringSet, BTF_MAX_STR_OFFSET};
use crate::types::{info_kind_flag, info_vlen, BtfType};
use crate::{validate, walker};

pub const VMLINUX_BTF_PATH: &str = "/sys/kernel/btf/vmlinux";

/// Names the kernel uses for `long`, whose size gives away the pointer size.
const LONG_ALIASES: &[&str] = &[
    "long",
    "long int",
    "int long",
    "unsigned long",
    "long unsigned",
    "unsigned long int",
    "unsigned int long",
    "long unsigned int",
    "long int unsigned",
    "int unsigned long",
    "int long unsigned",
];

/// The image a split BTF is layered on. Who releases it is decided by the
/// caller when the split image is built.
#[derive(Debug)]
pub enum BtfBase<'base> {
    /// outlives the split image, which never releases it
    Borrowed(&'base Btf<'base>),
    /// released together with the split image
    Owned(Box<Btf<'base>>),
}

impl<'base> Deref for BtfBase<'base> {
    type Target = Btf<'base>;

    fn deref(&self) -> &Self::Target {
        match self {
            BtfBase::Borrowed(btf) => btf,
            BtfBase::Owned(btf) => btf,
        }
    }
}

/// Memory of one image. A freshly decoded image slices header, types and
/// strings out of its copy of the input buffer; a modifiable one owns them
/// separately, with strings interned through a [`StringSet`].
enum Storage {
    Contiguous {
        raw: Vec<u8>,
        hdr: BtfHeader,
    },
    Split {
        hdr: BtfHeader,
        types: Vec<u8>,
        strs: StringSet,
    },
}

impl Storage {
    fn hdr(&self) -> &BtfHeader {
        match self {
            Storage::Contiguous { hdr, .. } | Storage::Split { hdr, .. } => hdr,
        }
    }

    fn types(&self) -> &[u8] {
        match self {
            Storage::Contiguous { raw, hdr } => &raw[hdr.types_range()],
            Storage::Split { types, .. } => types,
        }
    }

    fn strs(&self) -> &[u8] {
        match self {
            Storage::Contiguous { raw, hdr } => &raw[hdr.strs_range()],
            Storage::Split { strs, .. } => strs.data(),
        }
    }
}

/// Borrowed view of one host-order type record.
#[derive(Debug, Clone, Copy)]
pub struct RawType<'a> {
    id: u32,
    kind: BtfKind,
    /// offset of the record within its image's type section
    offset: usize,
    data: &'a [u8],
}

impl<'a> RawType<'a> {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn kind(&self) -> BtfKind {
        self.kind
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn name_off(&self) -> u32 {
        NativeEndian::read_u32(&self.data[0..])
    }

    pub fn info(&self) -> u32 {
        NativeEndian::read_u32(&self.data[4..])
    }

    pub fn vlen(&self) -> u16 {
        let info = self.info();
        info_vlen!(info) as u16
    }

    pub fn kind_flag(&self) -> bool {
        let info = self.info();
        info_kind_flag!(info) == 1
    }

    /// Byte size or referenced type id, depending on the kind.
    pub fn size_or_type(&self) -> u32 {
        NativeEndian::read_u32(&self.data[8..])
    }

    /// The whole record, fixed part included.
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// The kind-specific data after the fixed part.
    pub fn payload(&self) -> &'a [u8] {
        &self.data[BTF_TYPE_SIZE..]
    }

    pub fn parse(&self) -> Result<BtfType> {
        let mut reader = RecordReader::new(self.data, self.offset);
        BtfType::from_reader(self.kind, &mut reader)
    }
}

/// A decoded BTF image, possibly layered on a base image.
pub struct Btf<'base> {
    storage: Storage,
    swapped_endian: bool,
    /// type_offs[0] is the record of type `start_id`
    type_offs: Vec<u32>,
    /// number of types owned by this image, void excluded
    nr_types: u32,
    start_id: u32,
    start_str_off: u32,
    base: Option<BtfBase<'base>>,
    strs_deduped: bool,
    /// set once the image is loaded into the kernel
    fd: Option<OwnedFd>,
    ptr_sz: Option<usize>,
}

impl fmt::Debug for Btf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Btf")
            .field("hdr", self.storage.hdr())
            .field("modifiable", &self.is_modifiable())
            .field("swapped_endian", &self.swapped_endian)
            .field("nr_types", &self.nr_types)
            .field("start_id", &self.start_id)
            .field("start_str_off", &self.start_str_off)
            .field("owns_base", &self.owns_base())
            .finish()
    }
}

impl Btf<'static> {
    /// Decodes a standalone image.
    pub fn from_bytes(data: &[u8]) -> Result<Btf<'static>> {
        Btf::new(data, None)
    }

    pub fn from_file<P>(path: P) -> Result<Btf<'static>>
    where
        P: AsRef<Path>,
    {
        Btf::decode(read_file(path.as_ref())?, None)
    }

    /// Loads the running kernel's BTF.
    pub fn load_vmlinux() -> Result<Btf<'static>> {
        let path = Path::new(VMLINUX_BTF_PATH);
        if !path.exists() {
            log::warn!(
                "kernel BTF is missing at '{}', was CONFIG_DEBUG_INFO_BTF enabled?",
                VMLINUX_BTF_PATH
            );
        }
        Btf::from_file(path)
    }
}

impl<'base> Btf<'base> {
    /// Decodes `data`, layered on `base` when given. The input is copied, so the
    /// caller keeps ownership of `data`.
    pub fn new(data: &[u8], base: Option<BtfBase<'base>>) -> Result<Btf<'base>> {
        let mut raw = Vec::new();
        raw.try_reserve_exact(data.len())?;
        raw.extend_from_slice(data);
        Btf::decode(raw, base)
    }

    /// Decodes a split image on top of a base that outlives it.
    pub fn from_split_bytes(data: &[u8], base: &'base Btf<'base>) -> Result<Btf<'base>> {
        Btf::new(data, Some(BtfBase::Borrowed(base)))
    }

    /// Decodes a split image that takes ownership of its base.
    pub fn from_split_bytes_owned(data: &[u8], base: Btf<'base>) -> Result<Btf<'base>> {
        Btf::new(data, Some(BtfBase::Owned(Box::new(base))))
    }

    pub fn from_split_file<P>(path: P, base: &'base Btf<'base>) -> Result<Btf<'base>>
    where
        P: AsRef<Path>,
    {
        Btf::decode(read_file(path.as_ref())?, Some(BtfBase::Borrowed(base)))
    }

    fn decode(mut raw: Vec<u8>, base: Option<BtfBase<'base>>) -> Result<Btf<'base>> {
        let (hdr, swapped_endian) = BtfHeader::parse(&mut raw)?;

        let (start_id, start_str_off) = match &base {
            Some(base) => (base.type_cnt(), base.total_string_length()),
            None => (1, 0),
        };

        check_str_sec(&raw[hdr.strs_range()], base.is_some())?;
        let type_offs = walker::parse_type_sec(&mut raw[hdr.types_range()], swapped_endian)?;
        let nr_types = type_offs.len() as u32;
        start_id
            .checked_add(nr_types)
            .ok_or(BtfError::graph(u32::MAX, InvalidReason::UnknownTypeId))?;
        start_str_off
            .checked_add(hdr.str_len)
            .ok_or(BtfError::InvalidStringSection)?;

        let btf = Btf {
            storage: Storage::Contiguous { raw, hdr },
            swapped_endian,
            type_offs,
            nr_types,
            start_id,
            start_str_off,
            base,
            strs_deduped: false,
            fd: None,
            ptr_sz: None,
        };
        validate::validate(&btf)?;

        log::debug!(
            "Btf: {} btf types, start id: {}, start string offset: {}",
            btf.nr_types,
            btf.start_id,
            btf.start_str_off
        );
        Ok(btf)
    }

    /// Current header, in host order.
    pub fn header(&self) -> BtfHeader {
        *self.storage.hdr()
    }

    /// Number of types owned by this image, void excluded.
    pub fn nr_types(&self) -> u32 {
        self.nr_types
    }

    /// Number of non-void types in this image and all of its bases.
    pub fn total_type_count(&self) -> u32 {
        self.nr_types + self.base.as_ref().map_or(0, |base| base.total_type_count())
    }

    /// One past the largest valid type id.
    pub fn type_cnt(&self) -> u32 {
        self.start_id + self.nr_types
    }

    pub fn start_id(&self) -> u32 {
        self.start_id
    }

    pub fn start_str_off(&self) -> u32 {
        self.start_str_off
    }

    /// Size of the logical string space of this image and all of its bases.
    pub fn total_string_length(&self) -> u32 {
        self.start_str_off + self.storage.strs().len() as u32
    }

    pub fn base(&self) -> Option<&Btf<'base>> {
        self.base.as_deref()
    }

    pub fn owns_base(&self) -> bool {
        matches!(self.base, Some(BtfBase::Owned(_)))
    }

    /// Byte order of the data this image was decoded from.
    pub fn endianness(&self) -> Endianness {
        if self.swapped_endian {
            Endianness::native().opposite()
        } else {
            Endianness::native()
        }
    }

    pub fn is_swapped(&self) -> bool {
        self.swapped_endian
    }

    /// Looks up the record of type `id`, following the base chain. Returns
    /// `None` for the void type.
    pub fn raw_type_by_id(&self, id: u32) -> Result<Option<RawType<'_>>> {
        if id == 0 {
            return Ok(None);
        }
        if id < self.start_id {
            return match &self.base {
                Some(base) => base.raw_type_by_id(id),
                None => Err(BtfError::graph(id, InvalidReason::MissingBase)),
            };
        }

        let idx = (id - self.start_id) as usize;
        let offset = *self
            .type_offs
            .get(idx)
            .ok_or(BtfError::graph(id, InvalidReason::UnknownTypeId))? as usize;
        let types = self.storage.types();
        let (kind, size) = walker::record_layout(types, offset)?;
        let data = types
            .get(offset..offset + size)
            .ok_or(BtfError::CorruptRecord { offset })?;

        Ok(Some(RawType {
            id,
            kind,
            offset,
            data,
        }))
    }

    /// Looks up and decodes type `id`; id 0 is [`BtfType::Void`].
    pub fn type_by_id(&self, id: u32) -> Result<BtfType> {
        match self.raw_type_by_id(id)? {
            Some(raw) => raw.parse(),
            None => Ok(BtfType::Void),
        }
    }

    /// The types owned by this image, in id order.
    pub fn types(&self) -> Box<dyn Iterator<Item = Result<(u32, BtfType)>> + '_> {
        Box::new(
            (self.start_id..self.type_cnt()).map(move |id| self.type_by_id(id).map(|ty| (id, ty))),
        )
    }

    /// First type of the given kind and name, searching base types first.
    pub fn find_by_name_kind(&self, name: &str, kind: BtfKind) -> Result<Option<u32>> {
        for id in 1..self.type_cnt() {
            let raw = match self.raw_type_by_id(id)? {
                Some(raw) => raw,
                None => continue,
            };
            if raw.kind() == kind && self.string_at(raw.name_off())? == name {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    pub fn find_func(&self, name: &str) -> Result<Option<u32>> {
        self.find_by_name_kind(name, BtfKind::Func)
    }

    /// The NUL-terminated string at logical `offset`, following the base chain.
    pub fn string_at(&self, offset: u32) -> Result<&str> {
        if offset < self.start_str_off {
            return match &self.base {
                Some(base) => base.string_at(offset),
                None => Err(BtfError::InvalidStringOffset { offset }),
            };
        }

        let strs = self.storage.strs();
        let local = (offset - self.start_str_off) as usize;
        let tail = strs
            .get(local..)
            .filter(|tail| !tail.is_empty())
            .ok_or(BtfError::InvalidStringOffset { offset })?;
        let nul = tail
            .iter()
            .position(|&c| c == 0)
            .ok_or(BtfError::InvalidStringOffset { offset })?;
        std::str::from_utf8(&tail[..nul]).map_err(|_| BtfError::InvalidStringOffset { offset })
    }

    pub fn name_of(&self, ty: &BtfType) -> Result<&str> {
        self.string_at(ty.name_off())
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.storage, Storage::Split { .. })
    }

    /// Whether the string section is known to hold no repeated strings.
    pub fn strs_deduped(&self) -> bool {
        self.strs_deduped
    }

    /// Breaks the contiguous buffer into separately owned header, types and
    /// strings, indexing the strings for interning.
    pub fn ensure_modifiable(&mut self) -> Result<()> {
        if self.is_modifiable() {
            return Ok(());
        }

        let hdr = *self.storage.hdr();
        let src = self.storage.types();
        let mut types = Vec::new();
        types.try_reserve_exact(src.len())?;
        types.extend_from_slice(src);
        let (strs, duplicated) = StringSet::with_data(BTF_MAX_STR_OFFSET, self.storage.strs())?;

        log::debug!(
            "BTF made modifiable, {} string bytes, duplicated strings: {}",
            strs.len(),
            duplicated
        );
        self.strs_deduped = !duplicated;
        self.storage = Storage::Split { hdr, types, strs };
        Ok(())
    }

    /// Logical offset of `s` if this image or one of its bases holds it.
    pub fn find_str(&self, s: &str) -> Option<u32> {
        if let Some(off) = self.base.as_ref().and_then(|base| base.find_str(s)) {
            return Some(off);
        }

        let local = match &self.storage {
            Storage::Split { strs, .. } => strs.find(s),
            Storage::Contiguous { .. } => {
                let mut off = 0u32;
                let mut found = None;
                for item in self.storage.strs().split(|&c| c == 0) {
                    if item == s.as_bytes() {
                        found = Some(off);
                        break;
                    }
                    off += item.len() as u32 + 1;
                }
                found
            }
        };
        local.map(|off| self.start_str_off + off)
    }

    /// Interns `s`, reusing a base string when one matches, and returns its
    /// logical offset. Makes the image modifiable.
    pub fn add_str(&mut self, s: &str) -> Result<u32> {
        if let Some(off) = self.base.as_ref().and_then(|base| base.find_str(s)) {
            return Ok(off);
        }

        self.ensure_modifiable()?;
        let start_str_off = self.start_str_off;
        match &mut self.storage {
            Storage::Split { hdr, strs, .. } => {
                let off = strs.add(s)?;
                hdr.str_len = strs.len() as u32;
                start_str_off
                    .checked_add(off)
                    .ok_or(BtfError::StringSetFull {
                        max_len: BTF_MAX_STR_OFFSET,
                    })
            }
            Storage::Contiguous { .. } => unreachable!("storage was just made modifiable"),
        }
    }

    /// Serializes this image's own header, types and strings into one buffer
    /// in the given byte order.
    pub fn raw_data(&self, endianness: Endianness) -> Result<Vec<u8>> {
        let types = self.storage.types();
        let strs = self.storage.strs();
        let src = self.storage.hdr();
        let hdr = BtfHeader {
            version: src.version,
            flags: src.flags,
            ..BtfHeader::new(types.len() as u32, strs.len() as u32)
        };

        let mut out = Vec::new();
        out.try_reserve_exact(BTF_HEADER_SIZE + types.len() + strs.len())?;
        out.extend_from_slice(&hdr.to_bytes(endianness));
        out.extend_from_slice(types);
        if endianness != Endianness::native() {
            for &offset in &self.type_offs {
                let offset = offset as usize;
                let (_, size) = walker::record_layout(types, offset)?;
                let start = BTF_HEADER_SIZE + offset;
                walker::swap_words(&mut out[start..start + size], offset)?;
            }
        }
        out.extend_from_slice(strs);
        Ok(out)
    }

    /// Pointer size of the target this image describes, in bytes.
    pub fn pointer_size(&self) -> usize {
        self.ptr_sz
            .or_else(|| self.base.as_ref().and_then(|base| base.ptr_sz))
            .or_else(|| self.guess_pointer_size())
            .unwrap_or(std::mem::size_of::<usize>())
    }

    /// Overrides the guessed pointer size; only 4 and 8 are accepted.
    pub fn set_pointer_size(&mut self, size: usize) -> Result<()> {
        if size != 4 && size != 8 {
            return Err(BtfError::InvalidPointerSize { size });
        }
        self.ptr_sz = Some(size);
        Ok(())
    }

    fn guess_pointer_size(&self) -> Option<usize> {
        for id in 1..self.type_cnt() {
            let raw = match self.raw_type_by_id(id) {
                Ok(Some(raw)) if raw.kind() == BtfKind::Int => raw,
                _ => continue,
            };
            let size = raw.size_or_type();
            if size != 4 && size != 8 {
                continue;
            }
            match self.string_at(raw.name_off()) {
                Ok(name) if LONG_ALIASES.contains(&name) => return Some(size as usize),
                _ => continue,
            }
        }
        None
    }

    /// Records the kernel object this image was loaded as. The descriptor is
    /// closed when the image is dropped.
    pub fn set_fd(&mut self, fd: OwnedFd) {
        self.fd = Some(fd);
    }

    pub fn fd(&self) -> Option<BorrowedFd<'_>> {
        self.fd.as_ref().map(|fd| fd.as_fd())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|error| BtfError::FileError {
        path: path.to_owned(),
        error,
    })
}

fn check_str_sec(strs: &[u8], is_split: bool) -> Result<()> {
    if is_split && strs.is_empty() {
        return Ok(());
    }
    if strs.is_empty() || strs.len() - 1 > BTF_MAX_STR_OFFSET || strs.last() != Some(&0) {
        log::debug!("invalid BTF string section");
        return Err(BtfError::InvalidStringSection);
    }
    if !is_split && strs[0] != 0 {
        log::debug!("BTF string section does not start with an empty string");
        return Err(BtfError::InvalidStringSection);
    }
    Ok(())
}
