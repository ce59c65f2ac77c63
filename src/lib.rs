//! Decoder for BTF, the BPF Type Format.
//!
//! A raw BTF image is copied, its header checked, its type section indexed and
//! every type validated before a [`Btf`] is handed out. Types are then looked up
//! by id in constant time. Split images (a kernel module's BTF on top of
//! vmlinux's) extend the id and string spaces of a base image without copying it.

pub mod btf;
pub mod error;
pub mod header;
pub mod kind;
pub mod strset;

mod reader;
mod types;
mod validate;
mod walker;

pub use types::{
    array::Array,
    const_::Const,
    datasec::{DataSec, DataSecInfo},
    decltag::DeclTag,
    enum64::{Enum64, Enum64Item},
    enum_::{Enum, EnumItem},
    float::Float,
    func::{Func, FuncLinkage},
    func_proto::{FuncParam, FuncProto},
    fwd::Fwd,
    int::{Int, IntEncoding},
    ptr::Ptr,
    restrict::Restrict,
    struct_::Struct,
    typedef::Typedef,
    typetag::TypeTag,
    union::Union,
    var::Var,
    volatile::Volatile,
    BtfMember, BtfType,
};

pub use btf::{Btf, BtfBase, RawType};
pub use error::{BtfError, InvalidReason, Result};
pub use header::{BtfHeader, Endianness};
pub use kind::BtfKind;
pub use strset::StringSet;
