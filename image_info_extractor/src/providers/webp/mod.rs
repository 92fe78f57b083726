//! WebP is a RIFF container holding VP8 or VP8L image data.
//!
//! Only the "extended" format (with a `VP8X` chunk first) can carry
//! metadata. Its flags say which of the `ICCP`, `EXIF` and `XMP ` chunks to
//! expect, so the walk can stop as soon as they've all shown up.

use crate::{
    commons::starts_with_array,
    cursor::ByteCursor,
    result::{ImageInfo, Metadata, MetadataFlags, ReadResult},
    source::ByteSource,
};

use self::chunk::RiffChunk;

use super::ContainerReader;

mod chunk;
mod error;
mod header;

pub use error::WebpError;

/// `VP8X` feature bits: `|Rsv|I|L|E|X|A|R|`
const ICC_FEATURE: u8 = 0b0010_0000;
const ALPHA_FEATURE: u8 = 0b0001_0000;
const EXIF_FEATURE: u8 = 0b0000_1000;
const XMP_FEATURE: u8 = 0b0000_0100;
const ANIMATION_FEATURE: u8 = 0b0000_0010;

/// Canvas dimensions are stored minus one, and clipped to this.
const DIMENSION_MASK: u16 = 0x3FFF;

/// A WebP file.
#[derive(Clone, Copy, Debug)]
pub struct Webp;

impl ContainerReader for Webp {
    type Error = WebpError;

    fn magic_number(input: &[u8]) -> bool {
        starts_with_array(input, b"RIFF", 0) && starts_with_array(input, b"WEBP", 8)
    }

    fn read<S: ByteSource + ?Sized>(source: &S) -> Result<Option<ReadResult>, Self::Error> {
        let file = source.read_all()?;
        let mut input: &[u8] = &file;

        let header = header::webp_file_header(&mut input).map_err(|e| {
            log::error!("Couldn't find the WebP header. err: {e}");
            WebpError::NoHeader
        })?;

        let expected = u64::from(header.riff_size) + 8;
        let actual = file.len() as u64;
        if expected != actual {
            log::error!("WebP length mismatch. expected: `{expected}`, actual: `{actual}`");
            return Err(WebpError::SizeMismatch { expected, actual });
        }

        let mut result = ReadResult::default();
        let mut info = ImageInfo::default();
        let mut flags = MetadataFlags::default();
        let mut found_header = false;

        // which metadata chunks `VP8X` promised, in `MetadataFlags` bits
        let mut expected_flags = MetadataFlags::default();

        while !input.is_empty() {
            let chunk: RiffChunk<'_> = match chunk::chunk(&mut input) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!(
                        "Invalid RIFF chunk in WebP file! Returning \
                        results before erroneous chunk. err: {e}"
                    );
                    break;
                }
            };

            match &chunk.fourcc {
                b"VP8X" => {
                    let Some(features) = read_extended_header(chunk.data, &mut info) else {
                        log::warn!("`VP8X` chunk is too short. Skipping it.");
                        continue;
                    };

                    for (feature, flag) in [
                        (ICC_FEATURE, MetadataFlags::ICC),
                        (EXIF_FEATURE, MetadataFlags::EXIF),
                        (XMP_FEATURE, MetadataFlags::XMP),
                    ] {
                        if features & feature != 0 {
                            expected_flags.set(flag);
                        }
                    }
                    found_header = true;
                }

                b"VP8 " | b"VP8L" => {
                    info.lossless = &chunk.fourcc == b"VP8L";
                    if expected_flags.bits() == 0 {
                        log::trace!("No metadata chunks were promised. Stopping at the bitstream.");
                        break;
                    }
                    continue;
                }

                b"EXIF" => {
                    log::debug!("Found Exif.");
                    result.exif = Some(Metadata::new(chunk.data.to_vec()));
                    flags.set(MetadataFlags::EXIF);
                }
                b"ICCP" => {
                    log::debug!("Found ICC profile.");
                    result.icc = Some(Metadata::new(chunk.data.to_vec()));
                    flags.set(MetadataFlags::ICC);
                }
                b"XMP " => {
                    log::debug!("Found XMP.");
                    result.xmp = Some(Metadata::new(chunk.data.to_vec()));
                    flags.set(MetadataFlags::XMP);
                }

                _ => continue,
            }

            if expected_flags.bits() != 0 && flags.has(expected_flags.bits()) {
                log::trace!("Found every promised metadata chunk.");
                break;
            }
        }

        if flags.bits() == 0 {
            log::debug!("WebP has no metadata.");
            return Ok(None);
        }

        if found_header {
            info.flags = flags;
            result.info = Some(info);
        }

        Ok(Some(result))
    }
}

/// Reads a `VP8X` chunk into `info`, returning its feature flags.
fn read_extended_header(data: &[u8], info: &mut ImageInfo) -> Option<u8> {
    let c = ByteCursor::le(data);
    let features = c.u8_at(0)?;
    let width = (c.u16_at(4)? & DIMENSION_MASK) + 1;
    let height = (c.u16_at(7)? & DIMENSION_MASK) + 1;

    info.width = Some(u32::from(width));
    info.height = Some(u32::from(height));
    info.bit_depth = Some(8);
    info.alpha = features & ALPHA_FEATURE != 0;
    info.animation = features & ANIMATION_FEATURE != 0;

    log::debug!("Extended WebP: `{width}x{height}`, features: `{features:#010b}`");
    Some(features)
}
