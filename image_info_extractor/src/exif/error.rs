/// A problem that stopped an Exif block from being parsed at all.
///
/// Problems with single fields never show up here. Those fields just have no
/// value.
#[derive(Clone, Debug, PartialEq, PartialOrd, Hash)]
pub enum ExifError {
    /// The block ended before the IFD0 offset.
    TooShort { len: usize },

    /// The block didn't start with `II*\0` or `MM\0*`.
    BadByteOrderMarker { found: [u8; 4] },

    /// IFD0's offset pointed back into the header.
    IfdOffsetInsideHeader { offset: u32 },
}

impl core::fmt::Display for ExifError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooShort { len } => write!(
                f,
                "Invalid Exif data: ends before the IFD0 offset. len: `{len}` bytes"
            ),
            Self::BadByteOrderMarker { found } => write!(
                f,
                "Invalid Exif data: expected a byte order marker (`II*\\0` or `MM\\0*`), \
                but got: `{found:x?}`"
            ),
            Self::IfdOffsetInsideHeader { offset } => write!(
                f,
                "Invalid Exif data: IFD0 offset must be at least 8, but was `{offset}`."
            ),
        }
    }
}

impl core::error::Error for ExifError {}
