use std::fmt;

/// Size of the fixed `btf_type` part of every record: name_off, info, size/type.
pub const BTF_TYPE_SIZE: usize = 12;

// https://docs.kernel.org/bpf/btf.html#type-encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BtfKind {
    Void = 0,
    Int = 1,
    Ptr = 2,
    Array = 3,
    Struct = 4,
    Union = 5,
    Enum = 6,
    Fwd = 7,
    Typedef = 8,
    Volatile = 9,
    Const = 10,
    Restrict = 11,
    Func = 12,
    FuncProto = 13,
    Var = 14,
    DataSec = 15,
    Float = 16,
    DeclTag = 17,
    TypeTag = 18,
    Enum64 = 19,
}

/// Shape of the data following the fixed `btf_type` part of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trailing {
    None,
    /// one extra struct of the given size
    Single(usize),
    /// `vlen` entries of the given size
    PerVlen(usize),
}

impl BtfKind {
    /// Maps the kind bits of a record's info word. Kind 0 never appears in a
    /// record, only as the implicit void type.
    pub fn from_kind_bits(kind: u32) -> Option<BtfKind> {
        let kind = match kind {
            1 => BtfKind::Int,
            2 => BtfKind::Ptr,
            3 => BtfKind::Array,
            4 => BtfKind::Struct,
            5 => BtfKind::Union,
            6 => BtfKind::Enum,
            7 => BtfKind::Fwd,
            8 => BtfKind::Typedef,
            9 => BtfKind::Volatile,
            10 => BtfKind::Const,
            11 => BtfKind::Restrict,
            12 => BtfKind::Func,
            13 => BtfKind::FuncProto,
            14 => BtfKind::Var,
            15 => BtfKind::DataSec,
            16 => BtfKind::Float,
            17 => BtfKind::DeclTag,
            18 => BtfKind::TypeTag,
            19 => BtfKind::Enum64,
            _ => return None,
        };
        Some(kind)
    }

    pub(crate) fn trailing(self) -> Trailing {
        match self {
            BtfKind::Void
            | BtfKind::Ptr
            | BtfKind::Fwd
            | BtfKind::Typedef
            | BtfKind::Volatile
            | BtfKind::Const
            | BtfKind::Restrict
            | BtfKind::Func
            | BtfKind::Float
            | BtfKind::TypeTag => Trailing::None,
            // encoding word
            BtfKind::Int => Trailing::Single(4),
            // type, index_type, nelems
            BtfKind::Array => Trailing::Single(12),
            // linkage
            BtfKind::Var => Trailing::Single(4),
            // component_idx
            BtfKind::DeclTag => Trailing::Single(4),
            // name_off, type, offset
            BtfKind::Struct | BtfKind::Union => Trailing::PerVlen(12),
            // name_off, val
            BtfKind::Enum => Trailing::PerVlen(8),
            // name_off, val_lo32, val_hi32
            BtfKind::Enum64 => Trailing::PerVlen(12),
            // name_off, type
            BtfKind::FuncProto => Trailing::PerVlen(8),
            // type, offset, size
            BtfKind::DataSec => Trailing::PerVlen(12),
        }
    }

    /// Size in bytes of the data following the fixed part of a record.
    pub(crate) fn trailing_size(self, vlen: u16) -> usize {
        match self.trailing() {
            Trailing::None => 0,
            Trailing::Single(size) => size,
            Trailing::PerVlen(size) => size * vlen as usize,
        }
    }

    /// Total size in bytes of a record of this kind.
    pub fn record_size(self, vlen: u16) -> usize {
        BTF_TYPE_SIZE + self.trailing_size(vlen)
    }

    /// Kinds whose size_or_type slot names exactly one other type and that
    /// carry no trailing data.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            BtfKind::Ptr
                | BtfKind::Typedef
                | BtfKind::Volatile
                | BtfKind::Const
                | BtfKind::Restrict
                | BtfKind::TypeTag
        )
    }
}

impl fmt::Display for BtfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BtfKind::Void => "VOID",
            BtfKind::Int => "INT",
            BtfKind::Ptr => "PTR",
            BtfKind::Array => "ARRAY",
            BtfKind::Struct => "STRUCT",
            BtfKind::Union => "UNION",
            BtfKind::Enum => "ENUM",
            BtfKind::Fwd => "FWD",
            BtfKind::Typedef => "TYPEDEF",
            BtfKind::Volatile => "VOLATILE",
            BtfKind::Const => "CONST",
            BtfKind::Restrict => "RESTRICT",
            BtfKind::Func => "FUNC",
            BtfKind::FuncProto => "FUNC_PROTO",
            BtfKind::Var => "VAR",
            BtfKind::DataSec => "DATASEC",
            BtfKind::Float => "FLOAT",
            BtfKind::DeclTag => "DECL_TAG",
            BtfKind::TypeTag => "TYPE_TAG",
            BtfKind::Enum64 => "ENUM64",
        };
        write!(f, "{}", name)
    }
}
