/// A problem that stopped an IPTC block from being parsed.
#[derive(Clone, Debug, PartialEq, PartialOrd, Hash)]
pub enum IptcError {
    /// A dataset didn't start with the `0x1C` tag marker.
    BadMarker { offset: usize, found: u8 },

    /// A dataset header or its data ran past the end of the block.
    Truncated { offset: usize, len: usize },

    /// A fixed-width dataset had the wrong length.
    UnexpectedLength {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl core::fmt::Display for IptcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BadMarker { offset, found } => write!(
                f,
                "Expected IPTC tag marker `0x1C` at offset `{offset}`, but got `{found:#04x}`."
            ),
            Self::Truncated { offset, len } => write!(
                f,
                "IPTC dataset at offset `{offset}` runs past the end of the block. \
                block len: `{len}`"
            ),
            Self::UnexpectedLength {
                name,
                expected,
                found,
            } => write!(
                f,
                "IPTC dataset `{name}` should be `{expected}` bytes long, but was `{found}`."
            ),
        }
    }
}

impl core::error::Error for IptcError {}
