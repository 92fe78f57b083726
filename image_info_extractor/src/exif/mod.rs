//! Exif is a binary metadata format, mostly written by cameras.
//!
//! A block starts with a TIFF header: a byte order marker and the offset of
//! the first IFD (image file directory). IFD0 describes the main image and
//! may point at more IFDs:
//!
//! - IFD1, chained right after IFD0, describes an embedded thumbnail
//! - the Exif IFD (`ExifOffset`) holds camera settings
//! - the GPS IFD (`GPSInfo`) holds location data
//! - the Interop IFD (`InteropOffset`, from IFD0 or the Exif IFD)
//!
//! Only a malformed header is fatal. Any other IFD that can't be read is
//! left out, and fields with bad types or out-of-bounds values are kept with
//! no value.

pub use image_info_extractor_types::exif::{Endianness, ifd::IfdGroup};

use image_info_extractor_types::exif::ExifTagNames;

use crate::cursor::{self, ByteCursor};

pub use self::{
    error::ExifError,
    value::{ExifField, ExifValue, Ifd},
};

mod error;
pub mod helpers;
mod ifd;
mod value;

/// A parsed Exif block.
#[derive(Clone, Debug, PartialEq)]
pub struct Exif {
    pub endianness: Endianness,

    /// IFD0. `None` if its entry table ran out of bounds.
    pub tiff: Option<Ifd>,
    pub thumbnail: Option<Ifd>,
    pub exif: Option<Ifd>,
    pub gps: Option<Ifd>,
    pub interop: Option<Ifd>,
}

impl Exif {
    /// Grabs the IFD for a group, if it was present.
    pub fn ifd(&self, group: IfdGroup) -> Option<&Ifd> {
        match group {
            IfdGroup::Tiff => self.tiff.as_ref(),
            IfdGroup::Thumbnail => self.thumbnail.as_ref(),
            IfdGroup::Exif => self.exif.as_ref(),
            IfdGroup::Gps => self.gps.as_ref(),
            IfdGroup::Interop => self.interop.as_ref(),
        }
    }

    /// IFD0's `Orientation`, if present.
    pub fn orientation(&self) -> Option<u32> {
        self.tiff.as_ref()?.get("Orientation")?.as_u32()
    }
}

/// Parses an Exif block with the built-in tag names.
pub fn parse(bytes: &[u8]) -> Result<Exif, ExifError> {
    parse_with(bytes, &ExifTagNames::default())
}

/// Parses an Exif block, naming tags with the given table.
pub fn parse_with(bytes: &[u8], names: &ExifTagNames) -> Result<Exif, ExifError> {
    if bytes.len() <= 8 {
        log::error!("Exif block is too short for a TIFF header. len: `{}`", bytes.len());
        return Err(ExifError::TooShort { len: bytes.len() });
    }

    let mut cursor = ByteCursor::be(bytes);
    let endianness = match cursor.fourcc_at(0) {
        Some([b'I', b'I', b'*', 0]) => Endianness::Little,
        Some([b'M', b'M', 0, b'*']) => Endianness::Big,
        other => {
            let found = other.unwrap_or_default();
            log::error!("Exif block has no byte order marker. found: `{found:x?}`");
            return Err(ExifError::BadByteOrderMarker { found });
        }
    };
    cursor.set_endianness(match endianness {
        Endianness::Little => cursor::Endianness::Little,
        Endianness::Big => cursor::Endianness::Big,
    });
    log::trace!("Exif endianness: `{endianness:?}`");

    let ifd0_offset: u32 = cursor
        .u32_at(4)
        .ok_or(ExifError::TooShort { len: bytes.len() })?;
    if ifd0_offset < 8 {
        log::error!("IFD0 offset points into the TIFF header. offset: `{ifd0_offset}`");
        return Err(ExifError::IfdOffsetInsideHeader {
            offset: ifd0_offset,
        });
    }
    let ifd0_offset = ifd0_offset as usize;

    let tiff = ifd::read_ifd(&cursor, ifd0_offset, IfdGroup::Tiff, names);

    let thumbnail = match ifd::next_ifd_offset(&cursor, ifd0_offset) {
        Some(0) | None => None,
        Some(ifd1_offset) => {
            ifd::read_ifd(&cursor, ifd1_offset as usize, IfdGroup::Thumbnail, names)
        }
    };

    // sub-IFDs are found through pointer tags on IFD0
    let pointer = |ifd: Option<&Ifd>, name: &str| -> Option<usize> {
        ifd?.get(name)?.as_u32().filter(|p| *p > 0).map(|p| p as usize)
    };

    let exif = pointer(tiff.as_ref(), "ExifOffset")
        .and_then(|off| ifd::read_ifd(&cursor, off, IfdGroup::Exif, names));
    let gps = pointer(tiff.as_ref(), "GPSInfo")
        .and_then(|off| ifd::read_ifd(&cursor, off, IfdGroup::Gps, names));
    let interop = pointer(tiff.as_ref(), "InteropOffset")
        .or_else(|| pointer(exif.as_ref(), "InteropOffset"))
        .and_then(|off| ifd::read_ifd(&cursor, off, IfdGroup::Interop, names));

    Ok(Exif {
        endianness,
        tiff,
        thumbnail,
        exif,
        gps,
        interop,
    })
}
