use crate::error::Result;
use crate::kind::BtfKind;
use crate::reader::RecordReader;

pub(crate) mod array;
pub(crate) mod const_;
pub(crate) mod datasec;
pub(crate) mod decltag;
pub(crate) mod enum64;
pub(crate) mod enum_;
pub(crate) mod float;
pub(crate) mod func;
pub(crate) mod func_proto;
pub(crate) mod fwd;
pub(crate) mod int;
pub(crate) mod ptr;
pub(crate) mod restrict;
pub(crate) mod struct_;
pub(crate) mod typedef;
pub(crate) mod typetag;
pub(crate) mod union;
pub(crate) mod var;
pub(crate) mod volatile;

use self::{
    array::Array, const_::Const, datasec::DataSec, decltag::DeclTag, enum64::Enum64, enum_::Enum,
    float::Float, func::Func, func_proto::FuncProto, fwd::Fwd, int::Int, ptr::Ptr,
    restrict::Restrict, struct_::Struct, typedef::Typedef, typetag::TypeTag, union::Union,
    var::Var, volatile::Volatile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BtfMember {
    pub name_off: u32,
    pub type_id: u32,
    offset: u32,
    has_bitfield: bool,
}

impl BtfMember {
    fn from_reader(reader: &mut RecordReader, has_bitfield: bool) -> Result<Self> {
        Ok(BtfMember {
            name_off: reader.read_u32()?,
            type_id: reader.read_u32()?,
            offset: reader.read_u32()?,
            has_bitfield,
        })
    }

    // offset in bits
    pub fn offset(&self) -> u32 {
        self.offset_bitfield().0
    }

    // offset in bits
    // bitfield offset and bitfield size
    pub fn offset_bitfield(&self) -> (u32, u32) {
        if self.has_bitfield {
            ((self.offset & 0xffffff), self.offset >> 24)
        } else {
            (self.offset, 0)
        }
    }
}

macro_rules! info_kind {
    ($info: ident) => {
        (($info >> 24) & 0x1f)
    };
}

macro_rules! info_kind_flag {
    ($info: ident) => {
        ($info >> 31)
    };
}

macro_rules! info_vlen {
    ($info: ident) => {
        ($info & 0xffff)
    };
}

pub(crate) use {info_kind, info_kind_flag, info_vlen};

// https://docs.kernel.org/bpf/btf.html#type-encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BtfType {
    Void,
    Int(Int),
    Ptr(Ptr),
    Array(Array),
    Struct(Struct),
    Union(Union),
    Enum(Enum),
    Fwd(Fwd),
    Typedef(Typedef),
    Volatile(Volatile),
    Const(Const),
    Restrict(Restrict),
    Func(Func),
    FuncProto(FuncProto),
    Var(Var),
    DataSec(DataSec),
    Float(Float),
    DeclTag(DeclTag),
    TypeTag(TypeTag),
    Enum64(Enum64),
}

impl From<&BtfType> for BtfKind {
    fn from(ty: &BtfType) -> Self {
        match ty {
            BtfType::Void => BtfKind::Void,
            BtfType::Int(_) => BtfKind::Int,
            BtfType::Ptr(_) => BtfKind::Ptr,
            BtfType::Array(_) => BtfKind::Array,
            BtfType::Struct(_) => BtfKind::Struct,
            BtfType::Union(_) => BtfKind::Union,
            BtfType::Enum(_) => BtfKind::Enum,
            BtfType::Fwd(_) => BtfKind::Fwd,
            BtfType::Typedef(_) => BtfKind::Typedef,
            BtfType::Volatile(_) => BtfKind::Volatile,
            BtfType::Const(_) => BtfKind::Const,
            BtfType::Restrict(_) => BtfKind::Restrict,
            BtfType::Func(_) => BtfKind::Func,
            BtfType::FuncProto(_) => BtfKind::FuncProto,
            BtfType::Var(_) => BtfKind::Var,
            BtfType::DataSec(_) => BtfKind::DataSec,
            BtfType::Float(_) => BtfKind::Float,
            BtfType::DeclTag(_) => BtfKind::DeclTag,
            BtfType::TypeTag(_) => BtfKind::TypeTag,
            BtfType::Enum64(_) => BtfKind::Enum64,
        }
    }
}

impl BtfType {
    pub(crate) fn from_reader(kind: BtfKind, reader: &mut RecordReader) -> Result<BtfType> {
        let ty = match kind {
            BtfKind::Void => BtfType::Void,
            BtfKind::Int => BtfType::Int(Int::from_reader(reader)?),
            BtfKind::Ptr => BtfType::Ptr(Ptr::from_reader(reader)?),
            BtfKind::Array => BtfType::Array(Array::from_reader(reader)?),
            BtfKind::Struct => BtfType::Struct(Struct::from_reader(reader)?),
            BtfKind::Union => BtfType::Union(Union::from_reader(reader)?),
            BtfKind::Enum => BtfType::Enum(Enum::from_reader(reader)?),
            BtfKind::Fwd => BtfType::Fwd(Fwd::from_reader(reader)?),
            BtfKind::Typedef => BtfType::Typedef(Typedef::from_reader(reader)?),
            BtfKind::Volatile => BtfType::Volatile(Volatile::from_reader(reader)?),
            BtfKind::Const => BtfType::Const(Const::from_reader(reader)?),
            BtfKind::Restrict => BtfType::Restrict(Restrict::from_reader(reader)?),
            BtfKind::Func => BtfType::Func(Func::from_reader(reader)?),
            BtfKind::FuncProto => BtfType::FuncProto(FuncProto::from_reader(reader)?),
            BtfKind::Var => BtfType::Var(Var::from_reader(reader)?),
            BtfKind::DataSec => BtfType::DataSec(DataSec::from_reader(reader)?),
            BtfKind::Float => BtfType::Float(Float::from_reader(reader)?),
            BtfKind::DeclTag => BtfType::DeclTag(DeclTag::from_reader(reader)?),
            BtfKind::TypeTag => BtfType::TypeTag(TypeTag::from_reader(reader)?),
            BtfKind::Enum64 => BtfType::Enum64(Enum64::from_reader(reader)?),
        };
        Ok(ty)
    }

    pub fn kind(&self) -> BtfKind {
        BtfKind::from(self)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, BtfType::Ptr(_))
    }

    /// Offset of the type's name in the string section, 0 for anonymous types.
    pub fn name_off(&self) -> u32 {
        match self {
            BtfType::Void | BtfType::Ptr(_) | BtfType::Array(_) | BtfType::FuncProto(_) => 0,
            BtfType::Int(t) => t.name_off,
            BtfType::Struct(t) => t.name_off,
            BtfType::Union(t) => t.name_off,
            BtfType::Enum(t) => t.name_off,
            BtfType::Fwd(t) => t.name_off,
            BtfType::Typedef(t) => t.name_off,
            BtfType::Volatile(t) => t.name_off,
            BtfType::Const(t) => t.name_off,
            BtfType::Restrict(t) => t.name_off,
            BtfType::Func(t) => t.name_off,
            BtfType::Var(t) => t.name_off,
            BtfType::DataSec(t) => t.name_off,
            BtfType::Float(t) => t.name_off,
            BtfType::DeclTag(t) => t.name_off,
            BtfType::TypeTag(t) => t.name_off,
            BtfType::Enum64(t) => t.name_off,
        }
    }

    /// Every type id this record refers to, in record order.
    pub fn referenced_ids(&self) -> Vec<u32> {
        match self {
            BtfType::Void | BtfType::Int(_) | BtfType::Fwd(_) | BtfType::Float(_) => Vec::new(),
            BtfType::Enum(_) | BtfType::Enum64(_) => Vec::new(),
            BtfType::Ptr(t) => vec![t.type_id],
            BtfType::Typedef(t) => vec![t.type_id],
            BtfType::Volatile(t) => vec![t.type_id],
            BtfType::Const(t) => vec![t.type_id],
            BtfType::Restrict(t) => vec![t.type_id],
            BtfType::TypeTag(t) => vec![t.type_id],
            BtfType::Func(t) => vec![t.type_id],
            BtfType::Var(t) => vec![t.type_id],
            BtfType::DeclTag(t) => vec![t.type_id],
            BtfType::Array(t) => vec![t.elem_type_id, t.index_type_id],
            BtfType::Struct(t) => t.members.iter().map(|m| m.type_id).collect(),
            BtfType::Union(t) => t.members.iter().map(|m| m.type_id).collect(),
            BtfType::FuncProto(t) => std::iter::once(t.return_type_id)
                .chain(t.params.iter().map(|p| p.type_id))
                .collect(),
            BtfType::DataSec(t) => t.secs.iter().map(|s| s.type_id).collect(),
        }
    }
}
