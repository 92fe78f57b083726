//! Where a file's bytes come from.
//!
//! Most readers want the whole file at once, but the JPEG reader asks for
//! growing ranges so that it can stop before reading pixel data. A
//! [`ByteSource`] supports both.

use std::{
    borrow::Cow,
    fs::File,
    io::{Read as _, Seek as _, SeekFrom},
    path::Path,
};

use parking_lot::Mutex;

use crate::error::SourceError;

/// A blob of bytes that can be read in ranges.
pub trait ByteSource {
    /// The total length of the blob.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `[start, end)`. An `end` past the blob is clamped to its length.
    ///
    /// # Errors
    ///
    /// Fails if `start` lies after the end of the blob, or the underlying
    /// storage can't be read.
    fn read_range(&self, start: usize, end: usize) -> Result<Cow<'_, [u8]>, SourceError>;

    /// Reads the whole blob.
    fn read_all(&self) -> Result<Cow<'_, [u8]>, SourceError> {
        self.read_range(0, self.len())
    }
}

/// Clamps a requested range to a blob of length `len`.
fn clamp(start: usize, end: usize, len: usize) -> Result<core::ops::Range<usize>, SourceError> {
    if start > len {
        log::error!("Requested range starts past the end. start: `{start}`, len: `{len}`");
        return Err(SourceError::OutOfRange { start, len });
    }
    Ok(start..end.clamp(start, len))
}

impl ByteSource for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn read_range(&self, start: usize, end: usize) -> Result<Cow<'_, [u8]>, SourceError> {
        let range = clamp(start, end, <[u8]>::len(self))?;
        Ok(Cow::Borrowed(&self[range]))
    }
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn read_range(&self, start: usize, end: usize) -> Result<Cow<'_, [u8]>, SourceError> {
        self.as_slice().read_range(start, end)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read_range(&self, start: usize, end: usize) -> Result<Cow<'_, [u8]>, SourceError> {
        (**self).read_range(start, end)
    }
}

/// A file on disk, read on demand.
#[derive(Debug)]
pub struct FileSource {
    file: Mutex<File>,
    len: usize,
}

impl FileSource {
    /// Opens the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Self::new(File::open(path)?)
    }

    /// Wraps an already-open file.
    pub fn new(file: File) -> Result<Self, SourceError> {
        let len = file.metadata()?.len();
        let len = usize::try_from(len).map_err(|_| {
            log::error!("File is too large to address on this platform. len: `{len}`");
            SourceError::OutOfRange {
                start: 0,
                len: usize::MAX,
            }
        })?;

        Ok(Self {
            file: Mutex::new(file),
            len,
        })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> usize {
        self.len
    }

    fn read_range(&self, start: usize, end: usize) -> Result<Cow<'_, [u8]>, SourceError> {
        let range = clamp(start, end, self.len)?;
        let mut buf = vec![0_u8; range.len()];

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(range.start as u64))?;
        file.read_exact(&mut buf)?;
        log::trace!("Read `{}` bytes from file at offset `{}`.", buf.len(), range.start);

        Ok(Cow::Owned(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::ByteSource;
    use crate::{error::SourceError, util::logger};

    #[test]
    fn slices_clamp_the_end() {
        logger();
        let bytes: &[u8] = &[1, 2, 3, 4];

        assert_eq!(&*bytes.read_range(1, 3).unwrap(), &[2, 3]);
        assert_eq!(&*bytes.read_range(2, 100).unwrap(), &[3, 4]);
        assert_eq!(&*bytes.read_range(4, 8).unwrap(), &[] as &[u8]);
        assert_eq!(
            bytes.read_range(5, 8),
            Err(SourceError::OutOfRange { start: 5, len: 4 })
        );
    }

    #[test]
    fn file_source_reads_ranges() {
        logger();
        let path = std::env::temp_dir().join("image_info_extractor_source_test.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let source = super::FileSource::open(&path).unwrap();
        assert_eq!(source.len(), 10);
        assert_eq!(&*source.read_range(3, 6).unwrap(), b"345");
        assert_eq!(&*source.read_range(8, 64).unwrap(), b"89");
        assert_eq!(&*source.read_all().unwrap(), b"0123456789");

        _ = std::fs::remove_file(&path);
    }
}
