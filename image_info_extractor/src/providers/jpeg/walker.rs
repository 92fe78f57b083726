//! Lazily walks the marker segments at the start of a JPEG file.
//!
//! JPEG files can be huge, but their metadata all lives before the first
//! scan. So, instead of reading the whole file, the walker asks its source
//! for growing ranges until it reaches `SOS`.

use crate::source::ByteSource;

use super::JpegError;

/// How much to read at first.
const FIRST_CHUNK_LEN: usize = 64 * 1024;

/// Chunk sizes double after each read, until they reach this.
const MAX_CHUNK_LEN: usize = 2 * 1024 * 1024;

/// The first marker code, `SOI` (start of image).
pub(super) const SOI_MARKER_CODE: u8 = 0xD8;

/// `DRI` (define restart interval) always has a four-byte length.
const DRI_MARKER_CODE: u8 = 0xDD;

/// One marker and its payload.
#[derive(Debug, PartialEq)]
pub(super) struct Segment<'buf> {
    /// The marker's second byte, like `0xE1` for `APP1`.
    pub marker: u8,

    /// The payload, without the marker or its length bytes.
    ///
    /// Empty for `RSTn`, `SOI`, `EOI` and `SOS`.
    pub data: &'buf [u8],
}

/// Walks segments from a [`ByteSource`], growing its buffer on demand.
pub(super) struct SegmentWalker<'s, S: ByteSource + ?Sized> {
    source: &'s S,

    /// Every byte read so far, starting from the beginning of the file.
    buf: Vec<u8>,

    /// How much to ask for next time.
    chunk_len: usize,

    /// Where the next segment starts.
    pos: usize,
}

impl<'s, S: ByteSource + ?Sized> SegmentWalker<'s, S> {
    /// Reads the first chunk of the file and checks for `SOI`.
    ///
    /// Returns `Ok(None)` when the file is too small to hold anything.
    pub(super) fn new(source: &'s S) -> Result<Option<Self>, JpegError> {
        let mut walker = Self {
            source,
            buf: Vec::new(),
            chunk_len: FIRST_CHUNK_LEN,
            pos: 0,
        };
        walker.grow()?;

        if walker.buf.len() < 4 {
            log::warn!("JPEG is too short to contain any segments.");
            return Ok(None);
        }

        let (b0, b1) = (walker.buf[0], walker.buf[1]);
        if b0 != 0xFF || b1 != SOI_MARKER_CODE {
            let marker = u16::from_be_bytes([b0, b1]);
            log::error!("JPEG didn't start with `SOI`! found: `{marker:#06X}`");
            return Err(JpegError::FirstMarkerWasNotSoi { marker });
        }

        walker.pos = 2;
        Ok(Some(walker))
    }

    /// Appends the next chunk of the source to the buffer.
    fn grow(&mut self) -> Result<(), JpegError> {
        let start = self.buf.len();
        let end = start.saturating_add(self.chunk_len).min(self.source.len());
        let bytes = self.source.read_range(start, end)?;
        log::trace!("Read `{}` more bytes of JPEG at offset `{start}`.", bytes.len());

        self.buf.extend_from_slice(&bytes);
        if self.chunk_len < MAX_CHUNK_LEN {
            self.chunk_len *= 2;
        }
        Ok(())
    }

    /// Makes sure the buffer holds at least `len` bytes.
    ///
    /// Returns `false` if the file ends first.
    fn ensure(&mut self, len: usize) -> Result<bool, JpegError> {
        while self.buf.len() < len {
            if self.buf.len() >= self.source.len() {
                return Ok(false);
            }
            self.grow()?;
        }
        Ok(true)
    }

    /// Grabs the next segment.
    ///
    /// Returns `Ok(None)` at the end of the file, on a truncated segment, or
    /// when a reserved marker below `0xC0` shows up.
    pub(super) fn next_segment(&mut self) -> Result<Option<Segment<'_>>, JpegError> {
        if !self.ensure(self.pos + 4)? {
            return Ok(None);
        }

        // any marker may be preceded by `0xFF` fill bytes
        while self.buf[self.pos] == 0xFF && self.buf[self.pos + 1] == 0xFF {
            self.pos += 1;
            if !self.ensure(self.pos + 4)? {
                return Ok(None);
            }
        }

        let pos = self.pos;
        let (b0, marker) = (self.buf[pos], self.buf[pos + 1]);
        if b0 != 0xFF {
            let marker = u16::from_be_bytes([b0, marker]);
            log::error!("Unexpected JPEG segment marker `{marker:#06X}` at offset `{pos}`.");
            return Err(JpegError::UnexpectedMarker {
                marker,
                offset: pos as u64,
            });
        }

        let len = match marker {
            0xD0..=0xD9 => 0,
            DRI_MARKER_CODE => 4,
            _ => usize::from(u16::from_be_bytes([self.buf[pos + 2], self.buf[pos + 3]])),
        };

        if marker < 0xC0 {
            log::warn!("Stopping at reserved JPEG marker `{marker:#04X}` at offset `{pos}`.");
            return Ok(None);
        }

        let data_start = pos + 4;
        let data = if (0xD0..=0xDA).contains(&marker) {
            data_start..data_start
        } else {
            let data_end = data_start + len.saturating_sub(2);
            if !self.ensure(data_end)? {
                log::warn!("JPEG segment `{marker:#04X}` at `{pos}` is truncated.");
                return Ok(None);
            }
            data_start..data_end
        };

        self.pos = pos + 2 + len;
        Ok(Some(Segment {
            marker,
            data: &self.buf[data],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{JpegError, Segment, SegmentWalker};
    use crate::util::logger;

    fn segment(marker: u8, data: &[u8]) -> Vec<u8> {
        let mut b = vec![0xFF, marker];
        b.extend_from_slice(&(data.len() as u16 + 2).to_be_bytes());
        b.extend_from_slice(data);
        b
    }

    #[test]
    fn walks_segments_in_order() {
        logger();
        let mut file = vec![0xFF, 0xD8];
        file.extend(segment(0xE0, b"JFIF\0"));
        file.extend([0xFF, 0xDD, 0, 4, 0, 16]);
        file.extend([0xFF, 0xD0]);
        file.extend(segment(0xDB, &[1, 2, 3]));
        file.extend([0xFF, 0xD9]);

        let mut walker = SegmentWalker::new(file.as_slice()).unwrap().unwrap();
        assert_eq!(
            walker.next_segment().unwrap(),
            Some(Segment {
                marker: 0xE0,
                data: b"JFIF\0"
            })
        );
        assert_eq!(
            walker.next_segment().unwrap(),
            Some(Segment {
                marker: 0xDD,
                data: &[0, 16]
            })
        );
        assert_eq!(
            walker.next_segment().unwrap(),
            Some(Segment {
                marker: 0xD0,
                data: &[]
            })
        );
        assert_eq!(
            walker.next_segment().unwrap(),
            Some(Segment {
                marker: 0xDB,
                data: &[1, 2, 3]
            })
        );
    }

    #[test]
    fn grows_past_the_first_chunk() {
        logger();
        let mut file = vec![0xFF, 0xD8];
        for _ in 0..3 {
            file.extend(segment(0xE5, &[7; 60_000]));
        }
        file.extend(segment(0xE6, b"last"));

        let mut walker = SegmentWalker::new(file.as_slice()).unwrap().unwrap();
        for _ in 0..3 {
            let seg = walker.next_segment().unwrap().unwrap();
            assert_eq!((seg.marker, seg.data.len()), (0xE5, 60_000));
        }
        let last = walker.next_segment().unwrap().unwrap();
        assert_eq!(last.data, b"last");
        assert_eq!(walker.next_segment().unwrap(), None);
    }

    #[test]
    fn bad_starts() {
        logger();
        assert!(matches!(SegmentWalker::new([0xFF, 0xD8].as_slice()), Ok(None)));
        assert!(matches!(
            SegmentWalker::new([0x89, b'P', b'N', b'G'].as_slice()),
            Err(JpegError::FirstMarkerWasNotSoi { marker: 0x8950 })
        ));

        let file = [0xFF, 0xD8, 0x12, 0x34, 0, 0];
        let mut walker = SegmentWalker::new(file.as_slice()).unwrap().unwrap();
        assert!(matches!(
            walker.next_segment(),
            Err(JpegError::UnexpectedMarker {
                marker: 0x1234,
                offset: 2
            })
        ));
    }

    #[test]
    fn truncated_segment_ends_the_walk() {
        logger();
        let mut file = vec![0xFF, 0xD8];
        file.extend([0xFF, 0xE1, 0x01, 0x00, 1, 2, 3]);
        let mut walker = SegmentWalker::new(file.as_slice()).unwrap().unwrap();
        assert_eq!(walker.next_segment().unwrap(), None);
    }
}
