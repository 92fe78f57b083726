//! PNG, or the Portable Network Graphics format.
//!
//! A PNG is a signature followed by length-prefixed chunks. Metadata chunks
//! come before the image data by convention, so reading stops at the first
//! `IDAT`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{
    commons::{inflate, latin1, starts_with_array},
    cursor::ByteCursor,
    result::{ColorInfo, ImageInfo, Metadata, MetadataFlags, ReadResult},
    source::ByteSource,
};

use self::chunk::{PngChunk, icc_profile, international_text};

use super::ContainerReader;

mod chunk;
mod error;

pub use error::PngError;

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp";
const CREATION_TIME_KEYWORD: &[u8] = b"Creation Time";

/// The only compression method PNG defines: zlib.
const DEFLATE: u8 = 0;

/// A PNG (or APNG) file.
#[derive(Clone, Copy, Debug)]
pub struct Png;

impl ContainerReader for Png {
    type Error = PngError;

    fn magic_number(input: &[u8]) -> bool {
        starts_with_array(input, &SIGNATURE, 0)
    }

    fn read<S: ByteSource + ?Sized>(source: &S) -> Result<Option<ReadResult>, Self::Error> {
        let file = source.read_all()?;
        if !Self::magic_number(&file) {
            log::error!("PNG signature is missing.");
            return Err(PngError::NoSignature);
        }

        let mut reader = ChunkReader::default();
        let mut input = &file[SIGNATURE.len()..];

        while !input.is_empty() {
            let chunk = match chunk::chunk(&mut input) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!(
                        "Invalid PNG chunk! Returning results before erroneous chunk. err: {e}"
                    );
                    break;
                }
            };

            log::trace!("Found PNG chunk `{}`.", latin1(&chunk.ty));
            if reader.chunk(&chunk) == Walk::Stop {
                break;
            }
        }

        Ok(Some(reader.finish()))
    }
}

#[derive(Debug, PartialEq)]
enum Walk {
    Continue,
    Stop,
}

/// Collects what the chunks say, as they're walked.
#[derive(Default)]
struct ChunkReader {
    result: ReadResult,
    info: ImageInfo,
    found_header: bool,
    color: ColorInfo,
    found_color: bool,
    flags: MetadataFlags,
}

impl ChunkReader {
    fn chunk(&mut self, chunk: &PngChunk<'_>) -> Walk {
        let c = ByteCursor::be(chunk.data);

        match &chunk.ty {
            b"IHDR" => self.header(&c),

            b"eXIf" => {
                log::debug!("Found Exif in `eXIf`.");
                self.result.exif = Some(Metadata::new(chunk.data.to_vec()));
                self.flags.set(MetadataFlags::EXIF);
            }

            b"iTXt" => self.international_text(chunk.data),

            b"iCCP" | b"iCCN" => self.icc(chunk.data),

            b"sRGB" => {
                self.info.color_space = Some("srgb".into());
                self.info.rendering_intent = c.u8_at(0);
            }

            b"cICP" => self.color(|color| {
                color.color_primaries = c.u8_at(0).map(u16::from);
                color.transfer_function = c.u8_at(1).map(u16::from);
                color.matrix_coefficients = c.u8_at(2).map(u16::from);
                color.video_full_range = c.u8_at(3).map(|b| b != 0);
            }),

            b"cHRM" => self.color(|color| {
                let point = |off| {
                    Some((
                        fixed(c.u32_at(off)?, 100_000.0),
                        fixed(c.u32_at(off + 4)?, 100_000.0),
                    ))
                };
                color.white_point = point(0);
                color.red_primary = point(8);
                color.green_primary = point(16);
                color.blue_primary = point(24);
            }),

            b"gAMA" => self.color(|color| {
                color.gamma = c.u32_at(0).filter(|g| *g != 0).map(|g| 100_000.0 / f64::from(g));
            }),

            b"mDCv" => self.color(|color| {
                let point = |off| {
                    Some((
                        fixed(u32::from(c.u16_at(off)?), 50_000.0),
                        fixed(u32::from(c.u16_at(off + 2)?), 50_000.0),
                    ))
                };
                color.red_primary = point(0);
                color.green_primary = point(4);
                color.blue_primary = point(8);
                color.white_point = point(12);
                color.maximum_luminance = c.u32_at(16).map(|l| fixed(l, 10_000.0));
                color.minimum_luminance = c.u32_at(20).map(|l| fixed(l, 10_000.0));
            }),

            b"cLLi" => self.color(|color| {
                color.max_content_light_level = c.u32_at(0).map(|l| fixed(l, 10_000.0));
                color.max_frame_average_light_level = c.u32_at(4).map(|l| fixed(l, 10_000.0));
            }),

            b"tIME" => self.info.modification_time = modification_time(&c),

            b"acTL" => {
                log::debug!("Found `acTL`: this is an animated PNG.");
                self.info.animation = true;
                return Walk::Stop;
            }

            b"IDAT" | b"IEND" => return Walk::Stop,

            _ => (),
        }

        Walk::Continue
    }

    fn header(&mut self, c: &ByteCursor<'_>) {
        let (Some(width), Some(height), Some(bit_depth), Some(color_type), Some(interlace)) =
            (c.u32_at(0), c.u32_at(4), c.u8_at(8), c.u8_at(9), c.u8_at(12))
        else {
            log::warn!("`IHDR` is too short. Skipping it.");
            return;
        };

        self.info.width = Some(width);
        self.info.height = Some(height);
        self.info.bit_depth = Some(bit_depth);
        self.info.alpha = color_type & 0b100 != 0;
        self.info.progressive = interlace == 1;
        self.info.lossless = true;
        self.info.animation = false;
        self.found_header = true;
    }

    fn international_text(&mut self, data: &[u8]) {
        let Some(itxt) = international_text(data) else {
            log::warn!("Malformed `iTXt` chunk. Skipping it.");
            return;
        };

        match itxt.keyword {
            XMP_KEYWORD => {
                let text = if !itxt.compressed {
                    itxt.text.to_vec()
                } else if itxt.compression_method == DEFLATE {
                    match inflate(itxt.text) {
                        Ok(text) => text,
                        Err(e) => {
                            log::warn!("Couldn't inflate XMP in `iTXt`. err: {e}");
                            return;
                        }
                    }
                } else {
                    log::warn!(
                        "Unknown `iTXt` compression method `{}`. Skipping XMP.",
                        itxt.compression_method
                    );
                    return;
                };

                log::debug!("Found XMP in `iTXt`.");
                self.result.xmp = Some(Metadata::new(text));
                self.flags.set(MetadataFlags::XMP);
            }

            CREATION_TIME_KEYWORD if !itxt.compressed => {
                let text = String::from_utf8_lossy(itxt.text);
                self.info.creation_time = parse_creation_time(text.trim());
                if self.info.creation_time.is_none() {
                    log::warn!("Couldn't read PNG creation time: `{text}`");
                }
            }

            _ => (),
        }
    }

    fn icc(&mut self, data: &[u8]) {
        let Some((name, method, profile)) = icc_profile(data) else {
            log::warn!("Malformed `iCCP` chunk. Skipping it.");
            return;
        };

        if method != DEFLATE {
            log::warn!("Unknown `iCCP` compression method `{method}`. Skipping it.");
            return;
        }

        match inflate(profile) {
            Ok(profile) => {
                log::debug!("Found ICC profile `{}`.", latin1(name));
                self.result.icc = Some(Metadata::new(profile));
                self.flags.set(MetadataFlags::ICC);
            }
            Err(e) => log::warn!("Couldn't inflate ICC profile. err: {e}"),
        }
    }

    fn color(&mut self, f: impl FnOnce(&mut ColorInfo)) {
        f(&mut self.color);
        self.found_color = true;
    }

    fn finish(mut self) -> ReadResult {
        if self.found_color {
            self.info.color_info = Some(self.color);
        }

        if self.found_header {
            self.info.flags = self.flags;
            self.result.info = Some(self.info);
        } else {
            log::warn!("PNG has no `IHDR` chunk, so there's no image info.");
        }

        self.result
    }
}

/// Divides a fixed-point value by its scale.
fn fixed(value: u32, scale: f64) -> f64 {
    f64::from(value) / scale
}

/// Reads a `tIME` chunk as milliseconds since the epoch, in UTC.
fn modification_time(c: &ByteCursor<'_>) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(
        i32::from(c.u16_at(0)?),
        u32::from(c.u8_at(2)?),
        u32::from(c.u8_at(3)?),
    )?;
    let time = date.and_hms_opt(
        u32::from(c.u8_at(4)?),
        u32::from(c.u8_at(5)?),
        u32::from(c.u8_at(6)?),
    )?;
    Some(time.and_utc().timestamp_millis())
}

/// Reads the free-form `Creation Time` text, which is usually RFC 1123 or
/// ISO 8601.
fn parse_creation_time(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }

    const NAIVE: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y:%m:%d %H:%M:%S"];
    NAIVE
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
}
