use byteorder::{ByteOrder, NativeEndian};

use crate::error::{BtfError, Result};
use crate::kind::{BtfKind, BTF_TYPE_SIZE};
use crate::types::{info_kind, info_vlen};

/// Walks the type section once, rewriting every record to host byte order when
/// `swapped` is set, and returns the offset of each record.
pub(crate) fn parse_type_sec(types: &mut [u8], swapped: bool) -> Result<Vec<u32>> {
    let end = types.len();
    let mut type_offs: Vec<u32> = Vec::new();
    let mut cursor = 0usize;

    while cursor + BTF_TYPE_SIZE <= end {
        if swapped {
            swap_words(&mut types[cursor..cursor + BTF_TYPE_SIZE], cursor)?;
        }

        let (kind, size) = record_layout(types, cursor)?;
        let next = cursor
            .checked_add(size)
            .ok_or(BtfError::TruncatedInput { offset: cursor })?;
        if next > end {
            log::debug!(
                "BTF {} record at offset {} needs {} bytes, {} left",
                kind,
                cursor,
                size,
                end - cursor
            );
            return Err(BtfError::TruncatedInput { offset: cursor });
        }

        if swapped {
            swap_words(&mut types[cursor + BTF_TYPE_SIZE..next], cursor)?;
        }

        type_offs.try_reserve(1)?;
        type_offs.push(cursor as u32);
        cursor = next;
    }

    if cursor != end {
        log::debug!("BTF type section has {} trailing bytes", end - cursor);
        return Err(BtfError::TruncatedInput { offset: cursor });
    }

    log::debug!("BTF type section: {} types", type_offs.len());
    Ok(type_offs)
}

/// Kind and total size of the host-order record starting at `offset`.
pub(crate) fn record_layout(types: &[u8], offset: usize) -> Result<(BtfKind, usize)> {
    let base = types
        .get(offset..offset + BTF_TYPE_SIZE)
        .ok_or(BtfError::TruncatedInput { offset })?;
    let info = NativeEndian::read_u32(&base[4..]);
    let kind = BtfKind::from_kind_bits(info_kind!(info)).ok_or_else(|| {
        log::debug!("unsupported BTF kind {} at offset {}", info_kind!(info), offset);
        BtfError::UnknownKind {
            kind: info_kind!(info),
            offset,
        }
    })?;
    Ok((kind, kind.record_size(info_vlen!(info) as u16)))
}

/// Every field of a type record is a 32-bit word, so a record is normalized
/// by swapping each word in turn.
pub(crate) fn swap_words(buf: &mut [u8], offset: usize) -> Result<()> {
    if buf.len() % 4 != 0 {
        return Err(BtfError::CorruptRecord { offset });
    }
    for word in buf.chunks_exact_mut(4) {
        let val = NativeEndian::read_u32(word);
        NativeEndian::write_u32(word, val.swap_bytes());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(words: &[u32], swapped: bool) -> Vec<u8> {
        words
            .iter()
            .flat_map(|w| {
                if swapped {
                    w.swap_bytes().to_ne_bytes()
                } else {
                    w.to_ne_bytes()
                }
            })
            .collect()
    }

    fn info(kind: u32, vlen: u32) -> u32 {
        kind << 24 | vlen
    }

    // int, ptr to it, struct { int a; int *b; }
    #[rustfmt::skip]
    fn sample() -> Vec<u32> {
        vec![
            1, info(1, 0), 4, 32,
            0, info(2, 0), 1,
            2, info(4, 2), 16,
            3, 1, 0,
            4, 2, 64,
        ]
    }

    #[test]
    fn test_walk_native() {
        let mut types = words(&sample(), false);
        let offs = parse_type_sec(&mut types, false).unwrap();
        assert_eq!(offs, vec![0, 16, 28]);
    }

    #[test]
    fn test_walk_swapped_normalizes() {
        let mut types = words(&sample(), true);
        let offs = parse_type_sec(&mut types, true).unwrap();
        assert_eq!(offs, vec![0, 16, 28]);
        assert_eq!(types, words(&sample(), false));
    }

    #[test]
    fn test_walk_empty() {
        let mut types: Vec<u8> = Vec::new();
        assert!(parse_type_sec(&mut types, false).unwrap().is_empty());
    }

    #[test]
    fn test_walk_unknown_kind() {
        let mut types = words(&[0, info(25, 0), 0], false);
        assert!(matches!(
            parse_type_sec(&mut types, false),
            Err(BtfError::UnknownKind { kind: 25, offset: 0 })
        ));

        let mut types = words(&[1, info(1, 0), 4, 32, 0, info(0, 0), 0], false);
        assert!(matches!(
            parse_type_sec(&mut types, false),
            Err(BtfError::UnknownKind { kind: 0, offset: 16 })
        ));
    }

    #[test]
    fn test_walk_vlen_past_end() {
        let mut raw = sample();
        raw[8] = info(4, 3);
        let mut types = words(&raw, false);
        assert!(matches!(
            parse_type_sec(&mut types, false),
            Err(BtfError::TruncatedInput { offset: 28 })
        ));
    }

    #[test]
    fn test_walk_trailing_bytes() {
        let mut types = words(&sample(), false);
        types.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(
            parse_type_sec(&mut types, false),
            Err(BtfError::TruncatedInput { offset: 64 })
        ));
    }

    #[test]
    fn test_swap_words_rejects_partial_word() {
        let mut buf = [1u8, 2, 3, 4, 5, 6];
        assert!(matches!(
            swap_words(&mut buf, 8),
            Err(BtfError::CorruptRecord { offset: 8 })
        ));
    }
}
