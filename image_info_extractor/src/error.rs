use crate::providers::{
    heif::HeifError, jpeg::JpegError, png::PngError, svg::SvgError, webp::WebpError,
};

/// Reading bytes from a [`ByteSource`](crate::ByteSource) failed.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceError {
    /// The underlying storage reported an I/O error.
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },

    /// A range started past the end of the source.
    OutOfRange { start: usize, len: usize },
}

impl core::fmt::Display for SourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io { kind, message } => {
                write!(f, "Failed to read from source. kind: `{kind}`, err: {message}")
            }
            Self::OutOfRange { start, len } => write!(
                f,
                "Requested a range starting at `{start}`, \
                but the source is only `{len}` bytes long."
            ),
        }
    }
}

impl core::error::Error for SourceError {}

impl From<std::io::Error> for SourceError {
    fn from(value: std::io::Error) -> Self {
        Self::Io {
            kind: value.kind(),
            message: value.to_string(),
        }
    }
}

/// An error that stopped [`read_file`](crate::read_file) from producing a
/// result.
#[derive(Clone, Debug, PartialEq)]
pub enum ReadError {
    /// No reader handles this kind of file.
    ///
    /// Holds the MIME type that was declared or detected, if any.
    UnsupportedType(Option<String>),

    /// The bytes couldn't be read.
    Source(SourceError),

    Jpeg(JpegError),
    Png(PngError),
    Webp(WebpError),
    Heif(HeifError),
    Svg(SvgError),
}

impl core::fmt::Display for ReadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedType(Some(mime)) => write!(f, "Unsupported file type: `{mime}`"),
            Self::UnsupportedType(None) => {
                f.write_str("Unsupported file type: couldn't detect what kind of file this is.")
            }
            Self::Source(e) => write!(f, "Failed to read file. err: {e}"),
            Self::Jpeg(e) => write!(f, "Failed to read JPEG. err: {e}"),
            Self::Png(e) => write!(f, "Failed to read PNG. err: {e}"),
            Self::Webp(e) => write!(f, "Failed to read WebP. err: {e}"),
            Self::Heif(e) => write!(f, "Failed to read HEIF-like file. err: {e}"),
            Self::Svg(e) => write!(f, "Failed to read SVG. err: {e}"),
        }
    }
}

impl core::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::UnsupportedType(_) => None,
            Self::Source(e) => Some(e),
            Self::Jpeg(e) => Some(e),
            Self::Png(e) => Some(e),
            Self::Webp(e) => Some(e),
            Self::Heif(e) => Some(e),
            Self::Svg(e) => Some(e),
        }
    }
}

impl From<SourceError> for ReadError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

macro_rules! from_reader_error {
    ($($variant:ident($ty:ty),)+) => {
        $(
            impl From<$ty> for ReadError {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

from_reader_error! {
    Jpeg(JpegError),
    Png(PngError),
    Webp(WebpError),
    Heif(HeifError),
    Svg(SvgError),
}
