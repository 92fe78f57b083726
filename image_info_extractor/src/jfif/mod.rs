//! JFIF lives in a JPEG's APP0 segment.
//!
//! Its payload (after the `JFIF\0` identifier) is a fixed header followed by
//! an optional uncompressed RGB thumbnail. A second APP0 segment, JFXX, may
//! hold a thumbnail in another encoding.

use winnow::{
    ModalResult, Parser as _,
    binary::{be_u16, u8},
    error::EmptyError,
};

pub use self::error::JfifError;

mod error;

/// The length of JFIF's fixed header.
const JFIF_HEADER_LEN: usize = 9;

/// The size of a JFXX palette: 256 RGB entries.
const PALETTE_LEN: usize = 768;

/// A parsed JFIF APP0 payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Jfif {
    /// Major and minor version, like `(1, 2)`.
    pub version: (u8, u8),

    /// `0` for no units (aspect ratio only), `1` for DPI, `2` for dots/cm.
    pub density_units: u8,
    pub x_density: u16,
    pub y_density: u16,

    pub x_thumbnail: u8,
    pub y_thumbnail: u8,

    /// Packed RGB pixels. Empty when there's no thumbnail.
    pub thumbnail: Vec<u8>,
}

/// A parsed JFXX APP0 payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Jfxx {
    /// `0x10`: a complete JPEG stream.
    Jpeg { data: Vec<u8> },

    /// `0x11`: one palette index per pixel.
    Palette {
        width: u8,
        height: u8,
        palette: Vec<u8>,
        pixels: Vec<u8>,
    },

    /// `0x13`: packed RGB pixels.
    Rgb {
        width: u8,
        height: u8,
        pixels: Vec<u8>,
    },
}

impl Jfxx {
    /// The format byte this thumbnail was stored with.
    pub const fn format(&self) -> u8 {
        match self {
            Self::Jpeg { .. } => 0x10,
            Self::Palette { .. } => 0x11,
            Self::Rgb { .. } => 0x13,
        }
    }
}

fn jfif_header(input: &mut &[u8]) -> ModalResult<(u8, u8, u8, u16, u16, u8, u8), EmptyError> {
    (u8, u8, u8, be_u16, be_u16, u8, u8).parse_next(input)
}

/// Parses a JFIF payload.
pub fn parse(bytes: &[u8]) -> Result<Jfif, JfifError> {
    let mut input = bytes;
    let (major, minor, density_units, x_density, y_density, x_thumbnail, y_thumbnail) =
        jfif_header(&mut input).map_err(|_: winnow::error::ErrMode<EmptyError>| {
            log::error!("JFIF payload is too short. len: `{}`", bytes.len());
            JfifError::TooShort {
                len: bytes.len(),
                needed: JFIF_HEADER_LEN,
            }
        })?;

    Ok(Jfif {
        version: (major, minor),
        density_units,
        x_density,
        y_density,
        x_thumbnail,
        y_thumbnail,
        thumbnail: input.to_vec(),
    })
}

/// Parses a JFXX payload.
///
/// Returns `Ok(None)` for thumbnail formats other than `0x10`, `0x11` and
/// `0x13`.
pub fn parse_jfxx(bytes: &[u8]) -> Result<Option<Jfxx>, JfifError> {
    let too_short = |needed: usize| {
        log::error!(
            "JFXX payload is too short. len: `{}`, needed: `{needed}`",
            bytes.len()
        );
        JfifError::TooShort {
            len: bytes.len(),
            needed,
        }
    };

    let Some((&format, rest)) = bytes.split_first() else {
        return Err(too_short(1));
    };

    let jfxx = match format {
        0x10 => Jfxx::Jpeg {
            data: rest.to_vec(),
        },
        0x11 => {
            let [width, height, rest @ ..] = rest else {
                return Err(too_short(3));
            };
            let Some((palette, pixels)) = rest.split_at_checked(PALETTE_LEN) else {
                return Err(too_short(3 + PALETTE_LEN));
            };
            Jfxx::Palette {
                width: *width,
                height: *height,
                palette: palette.to_vec(),
                pixels: pixels.to_vec(),
            }
        }
        0x13 => {
            let [width, height, pixels @ ..] = rest else {
                return Err(too_short(3));
            };
            Jfxx::Rgb {
                width: *width,
                height: *height,
                pixels: pixels.to_vec(),
            }
        }
        other => {
            log::warn!("Unexpected JFXX thumbnail format: `{other:#04x}`");
            return Ok(None);
        }
    };

    Ok(Some(jfxx))
}
