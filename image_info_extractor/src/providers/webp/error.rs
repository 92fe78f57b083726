use crate::error::SourceError;

/// A problem that stopped a WebP file from being read.
#[derive(Clone, Debug, PartialEq)]
pub enum WebpError {
    /// The byte source failed.
    Source(SourceError),

    /// The file didn't start with `RIFF....WEBP`.
    NoHeader,

    /// The RIFF header's size doesn't match the file.
    SizeMismatch {
        /// What the header says the file's length is.
        expected: u64,

        /// The file's real length.
        actual: u64,
    },
}

impl core::fmt::Display for WebpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WebpError::Source(e) => write!(f, "Couldn't read the WebP file. err: {e}"),
            WebpError::NoHeader => f.write_str("Not a WebP file: the RIFF header is missing."),
            WebpError::SizeMismatch { expected, actual } => write!(
                f,
                "Expected file length to be `{expected}`, but got `{actual}`."
            ),
        }
    }
}

impl core::error::Error for WebpError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            WebpError::Source(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SourceError> for WebpError {
    fn from(value: SourceError) -> Self {
        WebpError::Source(value)
    }
}
