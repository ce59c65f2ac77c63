//! Structural checks run over every type of a freshly indexed image.
//!
//! The walker only knows how long each record is; this pass checks what the
//! records say: referenced ids exist in the image chain, name offsets point into
//! the string space, and each kind's fields are self-consistent.

use crate::btf::{Btf, RawType};
use crate::error::{BtfError, InvalidReason, Result};
use crate::kind::BtfKind;
use crate::types::{int::IntEncoding, BtfMember, BtfType};

const BITS_PER_U128: u32 = 128;

pub(crate) fn validate(btf: &Btf) -> Result<()> {
    for id in btf.start_id()..btf.type_cnt() {
        let raw = btf
            .raw_type_by_id(id)?
            .ok_or(BtfError::graph(id, InvalidReason::UnknownTypeId))?;
        let ty = raw.parse()?;

        check_name(btf, id, raw.name_off())?;
        for referenced in ty.referenced_ids() {
            if referenced >= btf.type_cnt() {
                log::debug!("BTF type [{}] references unknown type [{}]", id, referenced);
                return Err(BtfError::graph(
                    id,
                    InvalidReason::DanglingReference { referenced },
                ));
            }
        }
        check_kind(btf, &raw, &ty)?;
    }
    Ok(())
}

fn check_name(btf: &Btf, id: u32, name_off: u32) -> Result<()> {
    if name_off != 0 && name_off >= btf.total_string_length() {
        return Err(BtfError::graph(
            id,
            InvalidReason::InvalidNameOffset { name_off },
        ));
    }
    Ok(())
}

fn expect_no_vlen(raw: &RawType) -> Result<()> {
    if raw.vlen() != 0 {
        return Err(BtfError::graph(
            raw.id(),
            InvalidReason::UnexpectedVlen { vlen: raw.vlen() },
        ));
    }
    Ok(())
}

fn expect_size(raw: &RawType, size: u32, allowed: &[u32]) -> Result<()> {
    if !allowed.contains(&size) {
        return Err(BtfError::graph(raw.id(), InvalidReason::InvalidSize { size }));
    }
    Ok(())
}

fn expect_linkage(raw: &RawType, linkage: u32) -> Result<()> {
    if linkage > 2 {
        return Err(BtfError::graph(
            raw.id(),
            InvalidReason::InvalidLinkage { linkage },
        ));
    }
    Ok(())
}

fn check_members(btf: &Btf, raw: &RawType, size: u32, members: &[BtfMember]) -> Result<()> {
    let bits = size as u64 * 8;
    for member in members {
        check_name(btf, raw.id(), member.name_off)?;
        if member.offset() as u64 > bits {
            log::debug!(
                "BTF type [{}] member at bit {} lies past its size {}",
                raw.id(),
                member.offset(),
                size
            );
            return Err(BtfError::graph(raw.id(), InvalidReason::InvalidSize { size }));
        }
    }
    Ok(())
}

fn check_kind(btf: &Btf, raw: &RawType, ty: &BtfType) -> Result<()> {
    let id = raw.id();
    if raw.kind().is_modifier() {
        expect_no_vlen(raw)?;
        if raw.size_or_type() == id {
            return Err(BtfError::graph(id, InvalidReason::SelfReference));
        }
        return Ok(());
    }

    match ty {
        BtfType::Int(int) => {
            expect_no_vlen(raw)?;
            expect_size(raw, int.size, &[1, 2, 4, 8, 16])?;
            if let IntEncoding::Unknown(encoding) = int.encoding {
                return Err(BtfError::graph(
                    id,
                    InvalidReason::InvalidIntEncoding { encoding },
                ));
            }
            let (offset, bits) = (int.offset as u32, int.bits as u32);
            if bits > BITS_PER_U128 || offset + bits > BITS_PER_U128 || offset + bits > int.size * 8
            {
                return Err(BtfError::graph(
                    id,
                    InvalidReason::InvalidBitfield {
                        offset: int.offset,
                        bits: int.bits,
                    },
                ));
            }
        }
        BtfType::Array(array) => {
            expect_no_vlen(raw)?;
            if array.elem_type_id == id {
                return Err(BtfError::graph(id, InvalidReason::SelfReference));
            }
        }
        BtfType::Struct(st) => check_members(btf, raw, st.size, &st.members)?,
        BtfType::Union(un) => check_members(btf, raw, un.size, &un.members)?,
        BtfType::Enum(en) => {
            expect_size(raw, en.size, &[1, 2, 4, 8])?;
            for (name_off, _) in &en.enums {
                check_name(btf, id, *name_off)?;
            }
        }
        BtfType::Enum64(en) => {
            expect_size(raw, en.size, &[1, 2, 4, 8])?;
            for (name_off, _) in &en.enums {
                check_name(btf, id, *name_off)?;
            }
        }
        BtfType::Fwd(_) => expect_no_vlen(raw)?,
        BtfType::Func(func) => {
            expect_linkage(raw, raw.vlen() as u32)?;
            let referenced = func.type_id;
            let is_proto = matches!(
                btf.raw_type_by_id(referenced)?,
                Some(target) if target.kind() == BtfKind::FuncProto
            );
            if !is_proto {
                return Err(BtfError::graph(
                    id,
                    InvalidReason::FuncWithoutProto { referenced },
                ));
            }
        }
        BtfType::FuncProto(proto) => {
            for param in &proto.params {
                check_name(btf, id, param.name_off)?;
            }
        }
        BtfType::Var(var) => {
            expect_no_vlen(raw)?;
            expect_linkage(raw, var.linkage)?;
        }
        BtfType::DataSec(_) => {}
        BtfType::Float(float) => {
            expect_no_vlen(raw)?;
            expect_size(raw, float.size, &[2, 4, 8, 12, 16])?;
        }
        BtfType::DeclTag(tag) => {
            expect_no_vlen(raw)?;
            let component_idx = tag.component_idx;
            let in_range = match component_idx {
                -1 => true,
                idx if idx < -1 => false,
                // a member of a struct/union or a parameter of a func_proto
                idx => match btf.raw_type_by_id(tag.type_id)? {
                    Some(target)
                        if matches!(
                            target.kind(),
                            BtfKind::Struct | BtfKind::Union | BtfKind::FuncProto
                        ) =>
                    {
                        (idx as u32) < target.vlen() as u32
                    }
                    _ => false,
                },
            };
            if !in_range {
                return Err(BtfError::graph(
                    id,
                    InvalidReason::InvalidComponentIdx { component_idx },
                ));
            }
        }
        BtfType::Void
        | BtfType::Ptr(_)
        | BtfType::Typedef(_)
        | BtfType::Volatile(_)
        | BtfType::Const(_)
        | BtfType::Restrict(_)
        | BtfType::TypeTag(_) => {}
    }
    Ok(())
}
