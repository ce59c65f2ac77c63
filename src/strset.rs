use hashbrown::HashTable;

use crate::error::{BtfError, Result};

/// Largest string section the BTF format can address.
pub const BTF_MAX_STR_OFFSET: usize = 0x7fff_ffff;

/// Deduplicating string blob. Every string is stored NUL-terminated and is
/// identified by the offset of its first byte; equal strings share an offset.
pub struct StringSet {
    data: Vec<u8>,
    max_len: usize,
    hasher: ahash::RandomState,
    /// offsets of unique strings, keyed by a hash of their content
    index: HashTable<u32>,
}

fn str_at(data: &[u8], off: u32) -> &[u8] {
    let tail = data.get(off as usize..).unwrap_or(&[]);
    let len = tail.iter().position(|&c| c == 0).unwrap_or(tail.len());
    &tail[..len]
}

impl StringSet {
    /// An empty set holding only the empty string at offset 0.
    pub fn new(max_len: usize) -> Self {
        let mut set = StringSet::empty(max_len);
        set.data.push(0);
        let hash = set.hasher.hash_one(b"".as_slice());
        set.index.insert_unique(hash, 0, |_| hash);
        set
    }

    fn empty(max_len: usize) -> Self {
        StringSet {
            data: Vec::new(),
            max_len,
            hasher: ahash::RandomState::new(),
            index: HashTable::new(),
        }
    }

    /// Builds a set over an existing string section. Offsets of the existing
    /// strings are preserved; when content repeats, the first occurrence is
    /// the one returned by lookups. Also reports whether any repeat was seen.
    pub fn with_data(max_len: usize, init: &[u8]) -> Result<(Self, bool)> {
        let mut set = StringSet::empty(max_len);
        set.data.try_reserve_exact(init.len())?;
        set.data.extend_from_slice(init);

        let data = &set.data;
        let hasher = &set.hasher;
        let index = &mut set.index;
        let mut duplicated = false;
        let mut off = 0usize;
        while off < data.len() {
            let s = str_at(data, off as u32);
            let hash = hasher.hash_one(s);
            if index.find(hash, |&o| str_at(data, o) == s).is_some() {
                duplicated = true;
            } else {
                index.insert_unique(hash, off as u32, |&o| hasher.hash_one(str_at(data, o)));
            }
            off += s.len() + 1;
        }

        Ok((set, duplicated))
    }

    /// Offset of `s` if it is already interned.
    pub fn find(&self, s: &str) -> Option<u32> {
        let hash = self.hasher.hash_one(s.as_bytes());
        self.index
            .find(hash, |&o| str_at(&self.data, o) == s.as_bytes())
            .copied()
    }

    /// Interns `s`, returning the offset of its existing copy or of the newly
    /// appended one.
    pub fn add(&mut self, s: &str) -> Result<u32> {
        let bytes = s.as_bytes();
        if bytes.contains(&0) {
            return Err(BtfError::InvalidString);
        }
        if let Some(off) = self.find(s) {
            return Ok(off);
        }

        let off = self.data.len();
        let new_len = off + bytes.len() + 1;
        if new_len > self.max_len {
            return Err(BtfError::StringSetFull {
                max_len: self.max_len,
            });
        }
        self.data.try_reserve(bytes.len() + 1)?;
        self.data.extend_from_slice(bytes);
        self.data.push(0);

        let data = &self.data;
        let hasher = &self.hasher;
        let hash = hasher.hash_one(bytes);
        self.index
            .insert_unique(hash, off as u32, |&o| hasher.hash_one(str_at(data, o)));
        Ok(off as u32)
    }

    /// The string at `off`, without its NUL terminator.
    pub fn get(&self, off: u32) -> Option<&[u8]> {
        if off as usize >= self.data.len() {
            return None;
        }
        Some(str_at(&self.data, off))
    }

    /// The whole blob, as it would be laid out in a string section.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
