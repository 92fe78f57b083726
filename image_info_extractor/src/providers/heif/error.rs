use core::fmt::Write as _;

use crate::error::SourceError;

/// A problem that stopped an AVIF, HEIF or HEIC file from being read.
#[derive(Clone, Debug, PartialEq)]
pub enum HeifError {
    /// The byte source failed.
    Source(SourceError),

    /// Files shorter than an `ftyp` box header can't be BMFF.
    TooShort { len: usize },

    /// All HEIF-like files must start with an `ftyp` box.
    ///
    /// However, this file didn't.
    NoFtypBox,

    /// The `ftyp` box's major brand isn't one of AVIF, HEIF or HEIC.
    UnsupportedBrand { major_brand: [u8; 4] },

    /// A box inside `meta` couldn't be parsed.
    MalformedBox { box_type: [u8; 4] },

    /// An item was listed in `iinf`, but `iloc` doesn't say where it is.
    MissingItemLocation { item_id: u32 },

    /// An item's extent points outside the file.
    ItemOutOfBounds { item_id: u32 },
}

fn write_fourcc(f: &mut core::fmt::Formatter<'_>, fourcc: &[u8; 4]) -> core::fmt::Result {
    for c in fourcc {
        f.write_char(*c as char)?;
    }
    Ok(())
}

impl core::fmt::Display for HeifError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Source(e) => write!(f, "Couldn't read the HEIF file. err: {e}"),
            Self::TooShort { len } => {
                write!(f, "File is too short to be ISO BMFF. len: `{len}`")
            }
            Self::NoFtypBox => f.write_str("File did not start with an `ftyp` box."),
            Self::UnsupportedBrand { major_brand } => {
                f.write_str("Not an AVIF, HEIF or HEIC file. major brand: `")?;
                write_fourcc(f, major_brand)?;
                f.write_char('`')
            }
            Self::MalformedBox { box_type } => {
                f.write_str("Failed to parse the `")?;
                write_fourcc(f, box_type)?;
                f.write_str("` box.")
            }
            Self::MissingItemLocation { item_id } => write!(
                f,
                "Item `#{item_id}` has no entry in the `iloc` box."
            ),
            Self::ItemOutOfBounds { item_id } => write!(
                f,
                "Item `#{item_id}` points outside the file."
            ),
        }
    }
}

impl core::error::Error for HeifError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SourceError> for HeifError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}
