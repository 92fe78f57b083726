use crate::commons::latin1;

/// A problem that stopped an ICC profile from being parsed.
#[derive(Clone, Debug, PartialEq, PartialOrd, Hash)]
pub enum IccError {
    /// The profile is too short to hold its header and tag count.
    TooShort { len: usize },

    /// The header's size field disagrees with the profile's length.
    LengthMismatch { declared: u32, actual: usize },

    /// Offset 36 didn't hold `acsp`.
    BadSignature { found: [u8; 4] },

    /// The tag table itself ran past the end of the profile.
    TagTableOutOfBounds { count: u32 },

    /// A tag's data lay outside the profile.
    TagOutOfBounds {
        signature: [u8; 4],
        offset: u32,
        size: u32,
    },

    /// A decoder couldn't make sense of a tag's data.
    MalformedTag { signature: [u8; 4], ty: [u8; 4] },
}

impl core::fmt::Display for IccError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooShort { len } => write!(
                f,
                "ICC profile is too short to hold a header. len: `{len}` bytes"
            ),
            Self::LengthMismatch { declared, actual } => write!(
                f,
                "Expected ICC profile length to be `{declared}`, but got `{actual}`."
            ),
            Self::BadSignature { found } => write!(
                f,
                "Expected ICC file signature `acsp`, but got `{}`.",
                latin1(found)
            ),
            Self::TagTableOutOfBounds { count } => write!(
                f,
                "ICC tag table with `{count}` entries runs past the end of the profile."
            ),
            Self::TagOutOfBounds {
                signature,
                offset,
                size,
            } => write!(
                f,
                "ICC tag `{}` is out of bounds. offset: `{offset}`, size: `{size}`",
                latin1(signature)
            ),
            Self::MalformedTag { signature, ty } => write!(
                f,
                "ICC tag `{}` has malformed `{}` data.",
                latin1(signature),
                latin1(ty)
            ),
        }
    }
}

impl core::error::Error for IccError {}
