//! ICC color profiles.
//!
//! A profile is a 128-byte header, a tag table, and the tag data the table
//! points into. Everything is big-endian.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use image_info_extractor_types::icc::IccTagNames;
use rustc_hash::FxHashSet;

use crate::{
    commons::{latin1, to_hex_string},
    cursor::ByteCursor,
};

pub use self::{
    error::IccError,
    tags::{Colorant, DictEntry, IccDecoder, IccTagValue, IccTypeDecoders, Lut, Measurement},
};

mod error;
mod tags;

const HEADER_LEN: usize = 128;
const TAG_ENTRY_LEN: usize = 12;

/// The fixed profile header.
#[derive(Clone, Debug, PartialEq)]
pub struct IccHeader {
    pub cmm: String,

    /// Major and minor version, like `4.3`.
    pub version: String,
    pub device_class: String,
    pub color_space: String,
    pub connection_space: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub platform: String,
    pub flags: u32,
    pub manufacturer: String,
    pub model: String,
    pub attributes: u64,
    pub rendering_intent: u32,
    pub illuminant: [f64; 3],
    pub creator: String,

    /// The profile ID (an MD5) as lowercase hex.
    pub id: String,
}

/// A parsed ICC profile.
#[derive(Clone, Debug, PartialEq)]
pub struct Icc {
    pub header: IccHeader,

    /// Tag name (or raw signature, if unnamed) to value.
    pub tags: BTreeMap<String, IccTagValue>,
}

impl Icc {
    /// The profile's description, if it has one.
    pub fn description(&self) -> Option<&str> {
        self.tags.get("profileDescription")?.as_str()
    }
}

/// Parses a profile with the built-in tables.
pub fn parse(bytes: &[u8]) -> Result<Icc, IccError> {
    parse_with(bytes, &IccTagNames::default(), &IccTypeDecoders::default())
}

/// Parses a profile, naming tags and decoding types with the given tables.
pub fn parse_with(
    bytes: &[u8],
    names: &IccTagNames,
    decoders: &IccTypeDecoders,
) -> Result<Icc, IccError> {
    let c = ByteCursor::be(bytes);
    if c.len() < HEADER_LEN + 4 {
        log::error!("ICC profile is too short. len: `{}`", c.len());
        return Err(IccError::TooShort { len: c.len() });
    }

    let too_short = || IccError::TooShort { len: bytes.len() };

    let declared = c.u32_at(0).ok_or_else(too_short)?;
    if declared as usize != c.len() {
        log::error!(
            "ICC profile length mismatch. declared: `{declared}`, actual: `{}`",
            c.len()
        );
        return Err(IccError::LengthMismatch {
            declared,
            actual: c.len(),
        });
    }

    let signature = c.fourcc_at(36).ok_or_else(too_short)?;
    if &signature != b"acsp" {
        log::error!("ICC profile has a bad signature: `{signature:x?}`");
        return Err(IccError::BadSignature { found: signature });
    }

    let header = parse_header(&c).ok_or_else(too_short)?;
    log::debug!(
        "ICC profile v{}, class `{}`, color space `{}`",
        header.version,
        header.device_class,
        header.color_space
    );

    let count = c.u32_at(HEADER_LEN).ok_or_else(too_short)?;
    let table_end = (count as usize)
        .checked_mul(TAG_ENTRY_LEN)
        .and_then(|len| len.checked_add(HEADER_LEN + 4));
    if table_end.is_none_or(|end| end > c.len()) {
        log::error!("ICC tag table with `{count}` entries runs past the profile's end.");
        return Err(IccError::TagTableOutOfBounds { count });
    }

    let mut tags = BTreeMap::new();
    let mut warned = FxHashSet::default();

    for i in 0..count as usize {
        let entry = HEADER_LEN + 4 + i * TAG_ENTRY_LEN;
        let (Some(tag_sig), Some(offset), Some(size)) = (
            c.fourcc_at(entry),
            c.u32_at(entry + 4),
            c.u32_at(entry + 8),
        ) else {
            return Err(IccError::TagTableOutOfBounds { count });
        };

        let out_of_bounds = || {
            log::error!(
                "ICC tag `{}` is out of bounds. offset: `{offset}`, size: `{size}`",
                latin1(&tag_sig)
            );
            IccError::TagOutOfBounds {
                signature: tag_sig,
                offset,
                size,
            }
        };

        let start = offset as usize;
        let end = start.checked_add(size as usize).ok_or_else(out_of_bounds)?;
        let tag = c.sub(start, end).ok_or_else(out_of_bounds)?;
        let ty = tag.fourcc_at(0).ok_or_else(out_of_bounds)?;

        let decoder = match decoders.get(&ty) {
            Some(Some(decoder)) => decoder,
            known => {
                if warned.insert(ty) {
                    let what = if known.is_some() {
                        "Not implemented"
                    } else {
                        "Unrecognized"
                    };
                    log::warn!("{what} ICC tag type: `{}`", latin1(&ty));
                }
                continue;
            }
        };

        let value = decoder(&tag).ok_or_else(|| {
            log::error!(
                "Couldn't decode ICC tag `{}` of type `{}`.",
                latin1(&tag_sig),
                latin1(&ty)
            );
            IccError::MalformedTag {
                signature: tag_sig,
                ty,
            }
        })?;

        let name = names
            .get(&tag_sig)
            .map_or_else(|| latin1(&tag_sig), ToString::to_string);
        tags.insert(name, value);
    }

    Ok(Icc { header, tags })
}

/// Four bytes of text, optionally cut at the first NUL.
fn sig_text(c: &ByteCursor<'_>, off: usize, strip: bool) -> Option<String> {
    let raw = c.bytes_at(off, 4)?;
    let raw = match (strip, raw.iter().position(|b| *b == 0)) {
        (true, Some(nul)) => &raw[..nul],
        _ => raw,
    };
    Some(latin1(raw))
}

fn parse_header(c: &ByteCursor<'_>) -> Option<IccHeader> {
    // `0x04300000` is version 4.3
    let version_hex = format!("{:08x}", c.u32_at(8)?);
    let version = format!("{}.{}", &version_hex[1..2], &version_hex[2..3]);

    Some(IccHeader {
        cmm: sig_text(c, 4, true)?,
        version,
        device_class: sig_text(c, 12, false)?,
        color_space: sig_text(c, 16, false)?.trim_end().to_string(),
        connection_space: sig_text(c, 20, false)?.trim_end().to_string(),
        creation_date: tags::date_time_number(c, 24)?,
        platform: sig_text(c, 40, true)?,
        flags: c.u32_at(44)?,
        manufacturer: sig_text(c, 48, true)?.trim_end().to_string(),
        model: sig_text(c, 52, true)?.trim_end().to_string(),
        attributes: c.u64_at(56)?,
        rendering_intent: c.u32_at(64)?,
        illuminant: [
            f64::from(c.i32_at(68)?) / 65536.0,
            f64::from(c.i32_at(72)?) / 65536.0,
            f64::from(c.i32_at(76)?) / 65536.0,
        ],
        creator: sig_text(c, 80, true)?.trim_end().to_string(),
        id: to_hex_string(c.bytes_at(84, 16)?),
    })
}
