#[derive(Clone, Debug, PartialEq, PartialOrd, Hash)]
pub enum JfifError {
    /// The payload ended before its fixed-size fields did.
    TooShort { len: usize, needed: usize },
}

impl core::fmt::Display for JfifError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooShort { len, needed } => write!(
                f,
                "JFIF payload was `{len}` bytes long, but its header needs `{needed}` bytes."
            ),
        }
    }
}

impl core::error::Error for JfifError {}
