use crate::error::SourceError;

/// A problem that stopped a JPEG file from being read.
#[derive(Clone, Debug, PartialEq)]
pub enum JpegError {
    /// The byte source failed.
    Source(SourceError),

    /// The first marker in a JPEG file should be a `SOI`.
    ///
    /// However, this file had another marker first.
    FirstMarkerWasNotSoi {
        /// The first two bytes of the file.
        marker: u16,
    },

    /// The first byte of a marker should be `0xFF`.
    ///
    /// It wasn't!
    UnexpectedMarker {
        /// The two bytes found where a marker should have been.
        marker: u16,

        /// Where they were found.
        offset: u64,
    },

    /// A Photoshop image resource block didn't start with `8BIM`.
    BadResourceSignature { found: [u8; 4] },

    /// A Photoshop image resource block ran past the end of its segment.
    TruncatedResourceBlock { offset: usize },
}

impl core::fmt::Display for JpegError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            JpegError::Source(e) => write!(f, "Couldn't read the JPEG file. err: {e}"),
            JpegError::FirstMarkerWasNotSoi { marker } => write!(
                f,
                "The first marker of a JPEG file should be `SOI` (`0xFFD8`), \
                but it was: `{marker:#06X}`"
            ),
            JpegError::UnexpectedMarker { marker, offset } => write!(
                f,
                "Unexpected segment marker `{marker:#06X}` at offset `{offset}`."
            ),
            JpegError::BadResourceSignature { found } => write!(
                f,
                "Expected image resource signature `8BIM`, but got `{}`.",
                crate::commons::latin1(found)
            ),
            JpegError::TruncatedResourceBlock { offset } => write!(
                f,
                "Image resource block at offset `{offset}` runs past the end of its segment."
            ),
        }
    }
}

impl core::error::Error for JpegError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            JpegError::Source(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SourceError> for JpegError {
    fn from(value: SourceError) -> Self {
        JpegError::Source(value)
    }
}
