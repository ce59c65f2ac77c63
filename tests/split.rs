mod common;

use btfparse::{Btf, BtfError, BtfKind, BtfType, Endianness, InvalidReason};
use common::{sample, BtfBuilder};
use std::io::Read;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;

fn base() -> Btf<'static> {
    Btf::from_bytes(&sample().build_native()).unwrap()
}

/// A module-like image referencing base types 1 and 3.
fn module(base: &Btf) -> BtfBuilder {
    let mut b = BtfBuilder::new_split(base.type_cnt(), base.total_string_length());
    let sock = b.add_struct("sock", 16, &[("refcnt", 1, 0), ("peer", 3, 64)]);
    b.add_ptr(sock);
    b.add_modifier(BtfKind::Typedef, "sock_t", sock);
    b
}

#[test]
fn test_split_on_borrowed_base() {
    let base = base();
    let data = module(&base).build_native();
    let split = Btf::from_split_bytes(&data, &base).unwrap();

    assert_eq!(split.start_id(), 22);
    assert_eq!(split.nr_types(), 3);
    assert_eq!(split.type_cnt(), 25);
    assert_eq!(split.total_type_count(), 24);
    assert_eq!(split.start_str_off(), base.total_string_length());
    assert!(!split.owns_base());
    assert!(split.base().is_some());

    for id in 0..base.type_cnt() {
        assert_eq!(split.type_by_id(id).unwrap(), base.type_by_id(id).unwrap());
    }

    match split.type_by_id(22).unwrap() {
        BtfType::Struct(st) => {
            assert_eq!(split.string_at(st.name_off).unwrap(), "sock");
            assert_eq!(st.members[1].type_id, 3);
            assert_eq!(split.string_at(st.members[1].name_off).unwrap(), "peer");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(split.raw_type_by_id(23).unwrap().unwrap().kind(), BtfKind::Ptr);
    assert!(matches!(
        split.type_by_id(25),
        Err(BtfError::InvalidTypeGraph {
            type_id: 25,
            reason: InvalidReason::UnknownTypeId
        })
    ));

    // base strings resolve through the split image
    assert_eq!(split.string_at(1).unwrap(), "int");
    assert_eq!(split.find_by_name_kind("pair", BtfKind::Struct).unwrap(), Some(3));
    assert_eq!(split.find_by_name_kind("sock_t", BtfKind::Typedef).unwrap(), Some(24));
    assert_eq!(split.types().count(), 3);
}

#[test]
fn test_split_on_owned_base() {
    let base = base();
    let data = module(&base).build_native();
    let split = Btf::from_split_bytes_owned(&data, base).unwrap();

    assert!(split.owns_base());
    assert_eq!(split.base().unwrap().nr_types(), 21);
    assert_eq!(split.total_type_count(), 24);
    assert!(matches!(split.type_by_id(1).unwrap(), BtfType::Int(_)));
}

#[test]
fn test_split_opposite_endianness() {
    let base = base();
    let native = Btf::from_split_bytes(&module(&base).build_native(), &base).unwrap();
    let data = module(&base).build(Endianness::native().opposite());
    let swapped = Btf::from_split_bytes(&data, &base).unwrap();

    assert!(swapped.is_swapped());
    for id in native.start_id()..native.type_cnt() {
        assert_eq!(swapped.type_by_id(id).unwrap(), native.type_by_id(id).unwrap());
    }
}

#[test]
fn test_split_chain() {
    let base = base();
    let first_data = module(&base).build_native();
    let first = Btf::from_split_bytes(&first_data, &base).unwrap();

    let mut b = BtfBuilder::new_split(first.type_cnt(), first.total_string_length());
    b.add_ptr(24);
    b.add_modifier(BtfKind::Const, "", 1);
    let second_data = b.build_native();
    let second = Btf::from_split_bytes(&second_data, &first).unwrap();

    assert_eq!(second.start_id(), 25);
    assert_eq!(second.type_cnt(), 27);
    assert_eq!(second.total_type_count(), 26);
    assert_eq!(second.start_str_off(), first.total_string_length());

    match second.type_by_id(25).unwrap() {
        BtfType::Ptr(ptr) => assert_eq!(ptr.type_id, 24),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(second.type_by_id(24).unwrap(), BtfType::Typedef(_)));
    assert!(matches!(second.type_by_id(1).unwrap(), BtfType::Int(_)));
    assert_eq!(second.string_at(1).unwrap(), "int");
}

#[test]
fn test_split_empty_strings() {
    let base = base();
    let mut b = BtfBuilder::new_split(base.type_cnt(), base.total_string_length());
    b.add_ptr(1);
    b.add_modifier(BtfKind::Volatile, "", 22);
    let data = b.build_native();
    assert_eq!(data.len(), 24 + 24);

    let split = Btf::from_split_bytes(&data, &base).unwrap();
    assert_eq!(split.nr_types(), 2);
    assert_eq!(split.total_string_length(), base.total_string_length());
    assert_eq!(split.string_at(0).unwrap(), "");
}

#[test]
fn test_split_reference_past_chain() {
    let base = base();
    let mut b = BtfBuilder::new_split(base.type_cnt(), base.total_string_length());
    b.add_ptr(30);
    assert!(matches!(
        Btf::from_split_bytes(&b.build_native(), &base),
        Err(BtfError::InvalidTypeGraph {
            type_id: 22,
            reason: InvalidReason::DanglingReference { referenced: 30 }
        })
    ));
}

#[test]
fn test_split_bytes_without_base() {
    let base = base();
    // the split string section does not start with the empty string
    let data = module(&base).build_native();
    assert!(matches!(
        Btf::from_bytes(&data),
        Err(BtfError::InvalidStringSection)
    ));
}

#[test]
fn test_split_failure_leaves_base_usable() {
    let base = base();
    let data = module(&base).build_native();
    assert!(Btf::from_split_bytes(&data[..data.len() - 1], &base).is_err());
    assert_eq!(base.nr_types(), 21);
    assert!(Btf::from_split_bytes(&data, &base).is_ok());
}

#[test]
fn test_drop_split_keeps_borrowed_base() {
    let base = base();
    let data = module(&base).build_native();
    let split = Btf::from_split_bytes(&data, &base).unwrap();
    assert!(!split.owns_base());
    drop(split);

    assert_eq!(base.nr_types(), 21);
    assert!(matches!(base.type_by_id(3).unwrap(), BtfType::Struct(_)));
    assert_eq!(base.string_at(1).unwrap(), "int");

    // the base can carry another split image afterwards
    let again = Btf::from_split_bytes(&data, &base).unwrap();
    assert_eq!(again.type_cnt(), 25);
}

#[test]
fn test_drop_split_releases_owned_base() {
    let mut base = base();
    let (local, mut peer) = UnixStream::pair().unwrap();
    base.set_fd(OwnedFd::from(local));
    let data = module(&base).build_native();
    let split = Btf::from_split_bytes_owned(&data, base).unwrap();
    assert!(split.owns_base());
    assert!(split.base().unwrap().fd().is_some());
    drop(split);

    // the base went down with the split image, closing its descriptor
    let mut buf = [0u8; 8];
    assert_eq!(peer.read(&mut buf).unwrap(), 0);
}
