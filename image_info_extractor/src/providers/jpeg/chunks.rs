//! Payloads that JPEG splits across several segments.
//!
//! ICC profiles and ExtendedXMP don't fit in one 64 KiB segment, so writers
//! chop them up. The pieces are collected while walking, then put back
//! together once the walk ends.

use std::collections::BTreeMap;

use crate::{commons::latin1, cursor::ByteCursor};

use super::JpegError;

/// A piece of an ExtendedXMP payload.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct ExtendedXmpChunk {
    /// The MD5 of the full payload, as 32 hex characters.
    pub guid: String,

    /// The length of the whole payload.
    pub full_len: u32,

    /// Where this piece goes.
    pub offset: u32,

    pub content: Vec<u8>,
}

impl ExtendedXmpChunk {
    /// Reads a chunk from an `APP1` payload, after the namespace identifier.
    pub(super) fn parse(data: &[u8]) -> Option<Self> {
        let c = ByteCursor::be(data);
        Some(Self {
            guid: latin1(c.bytes_at(0, 32)?),
            full_len: c.u32_at(32)?,
            offset: c.u32_at(36)?,
            content: data.get(40..)?.to_vec(),
        })
    }
}

/// Puts ExtendedXMP back together.
///
/// Chunks are placed by offset. The first chunk's GUID and full length win;
/// chunks belonging to another GUID are dropped. Gaps, overlaps, or a
/// length mismatch give `None`.
pub(super) fn merge_extended_xmp(chunks: Vec<ExtendedXmpChunk>) -> Option<Vec<u8>> {
    let first = chunks.first()?;
    let (guid, full_len) = (first.guid.clone(), first.full_len);

    let mut by_offset = BTreeMap::new();
    for chunk in chunks {
        if chunk.guid != guid {
            log::warn!(
                "Dropping ExtendedXMP chunk for GUID `{}`; expected `{guid}`.",
                chunk.guid
            );
            continue;
        }
        by_offset.insert(chunk.offset, chunk.content);
    }

    let mut merged = Vec::with_capacity(full_len as usize);
    for (offset, content) in by_offset {
        if offset as usize != merged.len() {
            log::warn!(
                "ExtendedXMP chunk offset mismatch. expected: `{}`, found: `{offset}`",
                merged.len()
            );
            return None;
        }
        merged.extend(content);
    }

    if merged.len() != full_len as usize {
        log::warn!(
            "ExtendedXMP full length mismatch. declared: `{full_len}`, found: `{}`",
            merged.len()
        );
        return None;
    }

    Some(merged)
}

/// A piece of an ICC profile.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct IccChunk {
    /// One-based sequence number.
    pub number: u8,

    /// How many chunks make up the profile.
    pub total: u8,

    pub content: Vec<u8>,
}

impl IccChunk {
    /// Reads a chunk from an `APP2` payload, after the identifier.
    pub(super) fn parse(data: &[u8]) -> Option<Self> {
        Some(Self {
            number: *data.first()?,
            total: *data.get(1)?,
            content: data.get(2..)?.to_vec(),
        })
    }
}

/// Sorts ICC chunks by sequence number and joins them.
///
/// Gives `None` if the number of chunks doesn't match what the first chunk
/// declared.
pub(super) fn merge_icc(mut chunks: Vec<IccChunk>) -> Option<Vec<u8>> {
    let expected = chunks.first()?.total;
    if chunks.len() != usize::from(expected) {
        log::warn!(
            "ICC chunk count mismatch. declared: `{expected}`, found: `{}`",
            chunks.len()
        );
        return None;
    }

    chunks.sort_by_key(|chunk| chunk.number);
    Some(crate::commons::concat_arrays(
        &chunks.into_iter().map(|c| c.content).collect::<Vec<_>>(),
    ))
}

/// The Photoshop image resource that holds IPTC-IIM.
const IPTC_RESOURCE_ID: u16 = 0x0404;

const RESOURCE_SIGNATURE: &[u8; 4] = b"8BIM";

/// Finds the IPTC block among Photoshop image resource blocks.
///
/// Each block is `8BIM`, a resource ID, a Pascal-string name padded to an
/// even length, a `u32` size, then data (also padded to even).
pub(super) fn find_iptc(data: &[u8]) -> Result<Option<&[u8]>, JpegError> {
    let c = ByteCursor::be(data);
    let mut offset = 0_usize;

    while offset < c.len() {
        let truncated = || {
            log::error!("Image resource block at `{offset}` is truncated.");
            JpegError::TruncatedResourceBlock { offset }
        };

        let signature = c.fourcc_at(offset).ok_or_else(truncated)?;
        if &signature != RESOURCE_SIGNATURE {
            log::error!(
                "Expected image resource signature `8BIM`, got `{}`.",
                latin1(&signature)
            );
            return Err(JpegError::BadResourceSignature { found: signature });
        }

        let resource_id = c.u16_at(offset + 4).ok_or_else(truncated)?;
        let name_len = usize::from(c.u8_at(offset + 6).ok_or_else(truncated)?);
        // length byte plus name, padded to even
        let name_field = (1 + name_len + 1) & !1;

        let size_at = offset + 6 + name_field;
        let size = c.u32_at(size_at).ok_or_else(truncated)? as usize;
        let block = c.bytes_at(size_at + 4, size).ok_or_else(truncated)?;

        if resource_id == IPTC_RESOURCE_ID {
            log::debug!("Found IPTC image resource (`{size}` bytes).");
            return Ok(Some(block));
        }

        log::trace!("Skipping image resource `{resource_id:#06x}`.");
        offset = size_at + 4 + ((size + 1) & !1);
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::{ExtendedXmpChunk, IccChunk, find_iptc, merge_extended_xmp, merge_icc};
    use crate::{providers::jpeg::JpegError, util::logger};

    fn xmp_chunk(guid: &str, full_len: u32, offset: u32, content: &[u8]) -> ExtendedXmpChunk {
        ExtendedXmpChunk {
            guid: guid.into(),
            full_len,
            offset,
            content: content.to_vec(),
        }
    }

    #[test]
    fn extended_xmp_is_ordered_by_offset() {
        logger();
        let merged = merge_extended_xmp(vec![
            xmp_chunk("A", 6, 3, b"def"),
            xmp_chunk("B", 6, 0, b"zzz"),
            xmp_chunk("A", 6, 0, b"abc"),
        ]);
        assert_eq!(merged.as_deref(), Some(b"abcdef".as_slice()));
    }

    #[test]
    fn extended_xmp_gaps_and_short_totals() {
        logger();
        assert_eq!(
            merge_extended_xmp(vec![xmp_chunk("A", 6, 0, b"ab"), xmp_chunk("A", 6, 3, b"def")]),
            None
        );
        assert_eq!(merge_extended_xmp(vec![xmp_chunk("A", 9, 0, b"abc")]), None);
    }

    #[test]
    fn extended_xmp_chunk_layout() {
        logger();
        let mut data = b"0123456789ABCDEF0123456789ABCDEF".to_vec();
        data.extend(10_u32.to_be_bytes());
        data.extend(4_u32.to_be_bytes());
        data.extend(b"body");

        let chunk = ExtendedXmpChunk::parse(&data).unwrap();
        assert_eq!(chunk.guid, "0123456789ABCDEF0123456789ABCDEF");
        assert_eq!((chunk.full_len, chunk.offset), (10, 4));
        assert_eq!(chunk.content, b"body");
    }

    #[test]
    fn icc_chunks_are_sorted_by_number() {
        logger();
        let chunks = [[2, 3, b'b'], [1, 3, b'a'], [3, 3, b'c']];
        let parsed = chunks
            .iter()
            .map(|c| IccChunk::parse(c).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(merge_icc(parsed).as_deref(), Some(b"abc".as_slice()));
    }

    #[test]
    fn icc_count_mismatch() {
        logger();
        let chunks = [[1, 3, b'a'], [2, 3, b'b']];
        let parsed = chunks
            .iter()
            .map(|c| IccChunk::parse(c).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(merge_icc(parsed), None);
    }

    fn resource(id: u16, name: &[u8], data: &[u8]) -> Vec<u8> {
        let mut b = b"8BIM".to_vec();
        b.extend(id.to_be_bytes());
        b.push(name.len() as u8);
        b.extend(name);
        if name.len() % 2 == 0 {
            b.push(0);
        }
        b.extend((data.len() as u32).to_be_bytes());
        b.extend(data);
        if data.len() % 2 == 1 {
            b.push(0);
        }
        b
    }

    #[test]
    fn finds_iptc_resource() {
        logger();
        let mut blocks = resource(0x03ED, b"res", b"odd");
        blocks.extend(resource(0x0404, b"", &[0x1C, 2, 5, 0, 1, b'x']));
        assert_eq!(find_iptc(&blocks).unwrap(), Some([0x1C, 2, 5, 0, 1, b'x'].as_slice()));

        assert_eq!(find_iptc(&resource(0x03ED, b"", b"no")).unwrap(), None);
    }

    #[test]
    fn bad_resource_signature() {
        logger();
        assert_eq!(
            find_iptc(b"8BIX\x04\x04\0\0\0\0\0\0"),
            Err(JpegError::BadResourceSignature { found: *b"8BIX" })
        );
    }
}
