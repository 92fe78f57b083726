use crate::error::SourceError;

/// A problem that stopped a PNG file from being read.
#[derive(Clone, Debug, PartialEq)]
pub enum PngError {
    /// The byte source failed.
    Source(SourceError),

    /// The file didn't start with the eight-byte PNG signature.
    NoSignature,
}

impl core::fmt::Display for PngError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PngError::Source(e) => write!(f, "Couldn't read the PNG file. err: {e}"),
            PngError::NoSignature => f.write_str("Not a PNG file: the signature is missing."),
        }
    }
}

impl core::error::Error for PngError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            PngError::Source(e) => Some(e),
            PngError::NoSignature => None,
        }
    }
}

impl From<SourceError> for PngError {
    fn from(value: SourceError) -> Self {
        PngError::Source(value)
    }
}
