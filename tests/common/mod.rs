#![allow(dead_code)]

use btfparse::{BtfHeader, BtfKind, Endianness};

pub fn info(kind: BtfKind, vlen: u32, kind_flag: bool) -> u32 {
    (kind_flag as u32) << 31 | (kind as u32) << 24 | vlen
}

/// Assembles synthetic BTF images word by word.
pub struct BtfBuilder {
    words: Vec<u32>,
    strings: Vec<u8>,
    nr_types: u32,
    start_id: u32,
    start_str_off: u32,
}

impl BtfBuilder {
    pub fn new() -> Self {
        BtfBuilder {
            words: Vec::new(),
            strings: vec![0],
            nr_types: 0,
            start_id: 1,
            start_str_off: 0,
        }
    }

    /// A builder for a split image on top of a base with the given
    /// `type_cnt()` and `total_string_length()`.
    pub fn new_split(start_id: u32, start_str_off: u32) -> Self {
        BtfBuilder {
            words: Vec::new(),
            strings: Vec::new(),
            nr_types: 0,
            start_id,
            start_str_off,
        }
    }

    pub fn add_str(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return 0;
        }
        let off = self.start_str_off + self.strings.len() as u32;
        self.strings.extend_from_slice(s.as_bytes());
        self.strings.push(0);
        off
    }

    /// Appends a record made of the given words and returns its id.
    pub fn add_raw(&mut self, words: &[u32]) -> u32 {
        let id = self.start_id + self.nr_types;
        self.words.extend_from_slice(words);
        self.nr_types += 1;
        id
    }

    pub fn add_int(&mut self, name: &str, size: u32, encoding: u32, bits: u32) -> u32 {
        let name = self.add_str(name);
        self.add_raw(&[name, info(BtfKind::Int, 0, false), size, encoding << 24 | bits])
    }

    pub fn add_ptr(&mut self, type_id: u32) -> u32 {
        self.add_raw(&[0, info(BtfKind::Ptr, 0, false), type_id])
    }

    pub fn add_modifier(&mut self, kind: BtfKind, name: &str, type_id: u32) -> u32 {
        let name = self.add_str(name);
        self.add_raw(&[name, info(kind, 0, false), type_id])
    }

    pub fn add_array(&mut self, elem: u32, index: u32, nelems: u32) -> u32 {
        self.add_raw(&[0, info(BtfKind::Array, 0, false), 0, elem, index, nelems])
    }

    pub fn add_struct(&mut self, name: &str, size: u32, members: &[(&str, u32, u32)]) -> u32 {
        self.add_composite(BtfKind::Struct, name, size, members)
    }

    pub fn add_union(&mut self, name: &str, size: u32, members: &[(&str, u32, u32)]) -> u32 {
        self.add_composite(BtfKind::Union, name, size, members)
    }

    fn add_composite(
        &mut self,
        kind: BtfKind,
        name: &str,
        size: u32,
        members: &[(&str, u32, u32)],
    ) -> u32 {
        let name = self.add_str(name);
        let mut words = vec![name, info(kind, members.len() as u32, false), size];
        for (member, type_id, offset) in members {
            words.extend_from_slice(&[self.add_str(member), *type_id, *offset]);
        }
        self.add_raw(&words)
    }

    pub fn add_enum(&mut self, name: &str, values: &[(&str, i32)]) -> u32 {
        let name = self.add_str(name);
        let mut words = vec![name, info(BtfKind::Enum, values.len() as u32, true), 4];
        for (item, val) in values {
            words.extend_from_slice(&[self.add_str(item), *val as u32]);
        }
        self.add_raw(&words)
    }

    pub fn add_enum64(&mut self, name: &str, values: &[(&str, u64)]) -> u32 {
        let name = self.add_str(name);
        let mut words = vec![name, info(BtfKind::Enum64, values.len() as u32, false), 8];
        for (item, val) in values {
            words.extend_from_slice(&[self.add_str(item), *val as u32, (*val >> 32) as u32]);
        }
        self.add_raw(&words)
    }

    pub fn add_fwd(&mut self, name: &str, is_union: bool) -> u32 {
        let name = self.add_str(name);
        self.add_raw(&[name, info(BtfKind::Fwd, 0, is_union), 0])
    }

    pub fn add_func_proto(&mut self, ret: u32, params: &[(&str, u32)]) -> u32 {
        let mut words = vec![0, info(BtfKind::FuncProto, params.len() as u32, false), ret];
        for (param, type_id) in params {
            words.extend_from_slice(&[self.add_str(param), *type_id]);
        }
        self.add_raw(&words)
    }

    pub fn add_func(&mut self, name: &str, proto: u32, linkage: u32) -> u32 {
        let name = self.add_str(name);
        self.add_raw(&[name, info(BtfKind::Func, linkage, false), proto])
    }

    pub fn add_var(&mut self, name: &str, type_id: u32, linkage: u32) -> u32 {
        let name = self.add_str(name);
        self.add_raw(&[name, info(BtfKind::Var, 0, false), type_id, linkage])
    }

    pub fn add_datasec(&mut self, name: &str, size: u32, secs: &[(u32, u32, u32)]) -> u32 {
        let name = self.add_str(name);
        let mut words = vec![name, info(BtfKind::DataSec, secs.len() as u32, false), size];
        for (type_id, offset, size) in secs {
            words.extend_from_slice(&[*type_id, *offset, *size]);
        }
        self.add_raw(&words)
    }

    pub fn add_float(&mut self, name: &str, size: u32) -> u32 {
        let name = self.add_str(name);
        self.add_raw(&[name, info(BtfKind::Float, 0, false), size])
    }

    pub fn add_decl_tag(&mut self, name: &str, type_id: u32, component_idx: i32) -> u32 {
        let name = self.add_str(name);
        self.add_raw(&[
            name,
            info(BtfKind::DeclTag, 0, false),
            type_id,
            component_idx as u32,
        ])
    }

    /// Direct access to the type section words, for corrupting records.
    pub fn words_mut(&mut self) -> &mut Vec<u32> {
        &mut self.words
    }

    pub fn type_cnt(&self) -> u32 {
        self.start_id + self.nr_types
    }

    pub fn build(&self, endianness: Endianness) -> Vec<u8> {
        let type_len = self.words.len() as u32 * 4;
        let hdr = BtfHeader::new(type_len, self.strings.len() as u32);
        let mut data = hdr.to_bytes(endianness).to_vec();
        for word in &self.words {
            match endianness {
                Endianness::Little => data.extend_from_slice(&word.to_le_bytes()),
                Endianness::Big => data.extend_from_slice(&word.to_be_bytes()),
            }
        }
        data.extend_from_slice(&self.strings);
        data
    }

    pub fn build_native(&self) -> Vec<u8> {
        self.build(Endianness::native())
    }
}

/// An image exercising every kind:
///
/// [1] INT 'int' size 4
/// [2] PTR -> [1]
/// [3] STRUCT 'pair' { a: int, b: int * }
/// [4] ARRAY int[16]
/// [5] TYPEDEF 'pair_t' -> [3]
/// [6] CONST -> [5]
/// [7] VOLATILE -> [1]
/// [8] RESTRICT -> [2]
/// [9] UNION 'either' { x: int, y: int * }
/// [10] ENUM 'state' { ON = 1, OFF = -1 }
/// [11] FWD 'later'
/// [12] FUNC_PROTO int (pair_t *p, int n) -- params reference [13]
/// [13] PTR -> [5]
/// [14] FUNC 'do_pair' -> [12]
/// [15] VAR 'counter' int
/// [16] DATASEC '.data' { [15] }
/// [17] FLOAT 'double'
/// [18] DECL_TAG 'tag' on [3] member 0
/// [19] TYPE_TAG 'user' -> [1]
/// [20] ENUM64 'big' { HUGE = 0x1_0000_0002 }
/// [21] INT 'long int' size 8
pub fn sample() -> BtfBuilder {
    let mut b = BtfBuilder::new();
    let int = b.add_int("int", 4, 1, 32);
    let ptr = b.add_ptr(int);
    let pair = b.add_struct("pair", 16, &[("a", int, 0), ("b", ptr, 64)]);
    b.add_array(int, int, 16);
    let pair_t = b.add_modifier(BtfKind::Typedef, "pair_t", pair);
    b.add_modifier(BtfKind::Const, "", pair_t);
    b.add_modifier(BtfKind::Volatile, "", int);
    b.add_modifier(BtfKind::Restrict, "", ptr);
    b.add_union("either", 8, &[("x", int, 0), ("y", ptr, 0)]);
    b.add_enum("state", &[("ON", 1), ("OFF", -1)]);
    b.add_fwd("later", false);
    let proto = b.add_func_proto(int, &[("p", 13), ("n", int)]);
    b.add_ptr(pair_t);
    b.add_func("do_pair", proto, 1);
    let var = b.add_var("counter", int, 1);
    b.add_datasec(".data", 4, &[(var, 0, 4)]);
    b.add_float("double", 8);
    b.add_decl_tag("tag", pair, 0);
    b.add_modifier(BtfKind::TypeTag, "user", int);
    b.add_enum64("big", &[("HUGE", 0x1_0000_0002)]);
    b.add_int("long int", 8, 1, 64);
    b
}
