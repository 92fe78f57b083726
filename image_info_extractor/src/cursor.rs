//! An endianness-aware view over a byte buffer.
//!
//! Every metadata parser reads through a [`ByteCursor`]. The `*_at` methods
//! read at an absolute offset without moving the cursor, while the `read_*`
//! methods consume from the current position. Both return `None` instead of
//! reading out of bounds.

use winnow::{Parser, binary, error::EmptyError, token::take};

pub use winnow::binary::Endianness;

/// A read position over a borrowed byte region.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endianness,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at position zero.
    pub const fn new(buf: &'a [u8], endian: Endianness) -> Self {
        Self {
            buf,
            pos: 0,
            endian,
        }
    }

    /// A big-endian cursor.
    pub const fn be(buf: &'a [u8]) -> Self {
        Self::new(buf, Endianness::Big)
    }

    /// A little-endian cursor.
    pub const fn le(buf: &'a [u8]) -> Self {
        Self::new(buf, Endianness::Little)
    }

    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub const fn bytes(&self) -> &'a [u8] {
        self.buf
    }

    pub const fn endianness(&self) -> Endianness {
        self.endian
    }

    pub fn set_endianness(&mut self, endian: Endianness) {
        self.endian = endian;
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position.
    pub const fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Moves to an absolute offset. Fails past the end.
    pub fn seek(&mut self, pos: usize) -> Option<()> {
        (pos <= self.buf.len()).then(|| self.pos = pos)
    }

    /// Moves forward by `n` bytes. Fails past the end.
    pub fn skip(&mut self, n: usize) -> Option<()> {
        self.seek(self.pos.checked_add(n)?)
    }

    /// A new cursor over `[start, end)` sharing this cursor's endianness.
    pub fn sub(&self, start: usize, end: usize) -> Option<ByteCursor<'a>> {
        Some(Self::new(self.slice(start, end)?, self.endian))
    }

    /// Runs a parser at `off` without consuming anything.
    fn peek_at<O>(&self, off: usize, mut parser: impl Parser<&'a [u8], O, EmptyError>) -> Option<O> {
        let input: &'a [u8] = self.buf.get(off..)?;
        parser.parse_peek(input).ok().map(|(_rest, out)| out)
    }

    /// Runs a parser at the current position, moving past what it took.
    fn consume<O>(&mut self, mut parser: impl Parser<&'a [u8], O, EmptyError>) -> Option<O> {
        let mut input: &'a [u8] = self.buf.get(self.pos..)?;
        let before = input.len();
        let out = parser.parse_next(&mut input).ok()?;
        self.pos += before - input.len();
        Some(out)
    }

    pub fn u8_at(&self, off: usize) -> Option<u8> {
        self.buf.get(off).copied()
    }

    pub fn i8_at(&self, off: usize) -> Option<i8> {
        self.peek_at(off, binary::i8)
    }

    pub fn u16_at(&self, off: usize) -> Option<u16> {
        self.peek_at(off, binary::u16(self.endian))
    }

    pub fn i16_at(&self, off: usize) -> Option<i16> {
        self.peek_at(off, binary::i16(self.endian))
    }

    pub fn u32_at(&self, off: usize) -> Option<u32> {
        self.peek_at(off, binary::u32(self.endian))
    }

    pub fn i32_at(&self, off: usize) -> Option<i32> {
        self.peek_at(off, binary::i32(self.endian))
    }

    pub fn u64_at(&self, off: usize) -> Option<u64> {
        self.peek_at(off, binary::u64(self.endian))
    }

    pub fn f32_at(&self, off: usize) -> Option<f32> {
        self.peek_at(off, binary::f32(self.endian))
    }

    pub fn f64_at(&self, off: usize) -> Option<f64> {
        self.peek_at(off, binary::f64(self.endian))
    }

    /// The bytes in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Option<&'a [u8]> {
        self.buf.get(start..end)
    }

    /// `len` bytes starting at `off`.
    pub fn bytes_at(&self, off: usize, len: usize) -> Option<&'a [u8]> {
        self.peek_at(off, take(len))
    }

    /// A four-character code at `off`.
    pub fn fourcc_at(&self, off: usize) -> Option<[u8; 4]> {
        self.bytes_at(off, 4)?.try_into().ok()
    }

    /// Checks whether the bytes at `off` start with `prefix`.
    pub fn starts_with_at(&self, off: usize, prefix: &[u8]) -> bool {
        crate::commons::starts_with_array(self.buf, prefix, off)
    }

    /// Latin-1 text of `len` bytes at `off`.
    pub fn latin1_at(&self, off: usize, len: usize) -> Option<String> {
        self.bytes_at(off, len).map(crate::commons::latin1)
    }

    /// Latin-1 text with NULs removed and trailing whitespace trimmed.
    pub fn text_at(&self, off: usize, len: usize) -> Option<String> {
        let raw = self.bytes_at(off, len)?;
        let text: String = raw.iter().filter(|b| **b != 0).map(|b| char::from(*b)).collect();
        Some(text.trim_end().to_string())
    }

    /// UTF-16BE text of `len` bytes at `off`. Unpaired surrogates are
    /// replaced.
    pub fn utf16be_at(&self, off: usize, len: usize) -> Option<String> {
        let units: Vec<u16> = self
            .bytes_at(off, len)?
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Some(String::from_utf16_lossy(&units))
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.consume(binary::u8)
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        let endian = self.endian;
        self.consume(binary::u16(endian))
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        let endian = self.endian;
        self.consume(binary::u32(endian))
    }

    pub fn read_u64(&mut self) -> Option<u64> {
        let endian = self.endian;
        self.consume(binary::u64(endian))
    }

    /// Takes `len` bytes from the current position.
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        self.consume(take(len))
    }

    pub fn read_fourcc(&mut self) -> Option<[u8; 4]> {
        self.read_bytes(4)?.try_into().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteCursor, Endianness};
    use crate::util::logger;

    #[test]
    fn reads_respect_endianness() {
        logger();
        let bytes = [0x12, 0x34, 0x56, 0x78];

        assert_eq!(ByteCursor::be(&bytes).u16_at(0), Some(0x1234));
        assert_eq!(ByteCursor::le(&bytes).u16_at(0), Some(0x3412));
        assert_eq!(ByteCursor::be(&bytes).u32_at(0), Some(0x1234_5678));
        assert_eq!(ByteCursor::le(&bytes).u32_at(0), Some(0x7856_3412));

        let mut cursor = ByteCursor::be(&bytes);
        cursor.set_endianness(Endianness::Little);
        assert_eq!(cursor.u16_at(2), Some(0x7856));
    }

    #[test]
    fn out_of_bounds_reads_are_none() {
        logger();
        let bytes = [1, 2, 3];
        let cursor = ByteCursor::be(&bytes);

        assert_eq!(cursor.u32_at(0), None);
        assert_eq!(cursor.u16_at(2), None);
        assert_eq!(cursor.u8_at(3), None);
        assert_eq!(cursor.slice(2, 4), None);
        assert_eq!(cursor.bytes_at(usize::MAX, 1), None);
    }

    #[test]
    fn sequential_reads_advance() {
        logger();
        let bytes = b"\x00\x02abcd";
        let mut cursor = ByteCursor::be(bytes);

        assert_eq!(cursor.read_u16(), Some(2));
        assert_eq!(cursor.read_bytes(2), Some(b"ab".as_slice()));
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.read_u32(), None);
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.read_fourcc(), None);
    }

    #[test]
    fn text_helpers() {
        logger();
        let bytes = b"sRGB\0\0  \x00h\x00i";
        let cursor = ByteCursor::be(bytes);

        assert_eq!(cursor.text_at(0, 8).as_deref(), Some("sRGB"));
        assert_eq!(cursor.utf16be_at(8, 4).as_deref(), Some("hi"));
        assert_eq!(cursor.fourcc_at(0), Some(*b"sRGB"));
    }
}
