use std::collections::TryReserveError;
use std::fmt;
use std::path::PathBuf;

/// Errors returned while decoding or querying a BTF image.
#[derive(thiserror::Error, Debug)]
pub enum BtfError {
    #[error("invalid BTF magic: {magic:#06x}")]
    BadMagic { magic: u16 },

    #[error("unsupported BTF header length: {hdr_len}")]
    UnsupportedVersion { hdr_len: u32 },

    #[error("BTF data truncated at offset {offset}")]
    TruncatedInput { offset: usize },

    #[error("BTF type section [{type_off}, {type_end}) overlaps string section at {str_off}")]
    OverlappingSections {
        type_off: u32,
        type_end: u64,
        str_off: u32,
    },

    #[error("BTF type section offset {type_off} is not 4-byte aligned")]
    MisalignedSection { type_off: u32 },

    #[error("unknown BTF kind {kind} at type offset {offset}")]
    UnknownKind { kind: u32, offset: usize },

    #[error("corrupt BTF type record at type offset {offset}")]
    CorruptRecord { offset: usize },

    #[error("invalid BTF type [{type_id}]: {reason}")]
    InvalidTypeGraph { type_id: u32, reason: InvalidReason },

    #[error("invalid BTF string section")]
    InvalidStringSection,

    #[error("invalid BTF string offset: {offset}")]
    InvalidStringOffset { offset: u32 },

    #[error("string contains an interior NUL byte")]
    InvalidString,

    #[error("BTF string section would exceed {max_len} bytes")]
    StringSetFull { max_len: usize },

    #[error("invalid pointer size: {size}")]
    InvalidPointerSize { size: usize },

    #[error("out of memory")]
    OutOfMemory(#[from] TryReserveError),

    #[error("error reading {path}")]
    FileError {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl BtfError {
    pub(crate) fn graph(type_id: u32, reason: InvalidReason) -> Self {
        BtfError::InvalidTypeGraph { type_id, reason }
    }
}

/// Reason code attached to [`BtfError::InvalidTypeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// the id is past the last type of the image chain
    UnknownTypeId,
    /// the id belongs to a base image but none is attached
    MissingBase,
    DanglingReference { referenced: u32 },
    SelfReference,
    UnexpectedVlen { vlen: u16 },
    InvalidSize { size: u32 },
    InvalidIntEncoding { encoding: u8 },
    InvalidBitfield { offset: u8, bits: u8 },
    InvalidLinkage { linkage: u32 },
    InvalidComponentIdx { component_idx: i32 },
    InvalidNameOffset { name_off: u32 },
    FuncWithoutProto { referenced: u32 },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::UnknownTypeId => write!(f, "unknown type id"),
            InvalidReason::MissingBase => write!(f, "type id belongs to a missing base"),
            InvalidReason::DanglingReference { referenced } => {
                write!(f, "references unknown type [{}]", referenced)
            }
            InvalidReason::SelfReference => write!(f, "references itself"),
            InvalidReason::UnexpectedVlen { vlen } => write!(f, "unexpected vlen {}", vlen),
            InvalidReason::InvalidSize { size } => write!(f, "invalid size {}", size),
            InvalidReason::InvalidIntEncoding { encoding } => {
                write!(f, "invalid int encoding {:#x}", encoding)
            }
            InvalidReason::InvalidBitfield { offset, bits } => {
                write!(f, "invalid int bitfield ({}, {})", offset, bits)
            }
            InvalidReason::InvalidLinkage { linkage } => write!(f, "invalid linkage {}", linkage),
            InvalidReason::InvalidComponentIdx { component_idx } => {
                write!(f, "invalid component index {}", component_idx)
            }
            InvalidReason::InvalidNameOffset { name_off } => {
                write!(f, "invalid name offset {}", name_off)
            }
            InvalidReason::FuncWithoutProto { referenced } => {
                write!(f, "func references non-proto type [{}]", referenced)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BtfError>;
