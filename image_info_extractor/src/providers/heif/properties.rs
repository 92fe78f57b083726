//! Item properties, from `iprp` → `ipco`.
//!
//! These describe the image without needing its coded data: size, colour,
//! orientation and timestamps.

use winnow::{
    ModalResult, Parser as _,
    binary::{be_u16, be_u32, be_u64, u8},
    error::ContextError,
    token::rest,
};

use crate::providers::shared::desc;

use super::boxes::{BoxType, FullBox, children, fourcc};

/// Milliseconds between 1904-01-01 and 1970-01-01, both UTC.
const MAC_EPOCH_OFFSET_MS: i64 = 2_082_844_800_000;

/// One property we know how to read.
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    /// `colr` with an `nclx` colour type.
    Nclx {
        colour_primaries: u16,
        transfer_characteristics: u16,
        matrix_coefficients: u16,
        full_range: bool,
    },

    /// `colr` with a `prof` or `rICC` colour type.
    IccProfile(Vec<u8>),

    /// `ispe`
    Extent { width: u32, height: u32 },

    /// `pixi`: channel count, and the first channel's bit depth.
    PixelInfo { channels: u8, bit_depth: Option<u8> },

    /// `irot`: counter-clockwise rotation in degrees.
    Rotation(u16),

    /// `imir`: `0` flips left-right, `1` flips top-bottom.
    Mirror { axis: u8 },

    /// `crtt`, in milliseconds since the Unix epoch.
    CreationTime(i64),

    /// `mdft`, in milliseconds since the Unix epoch.
    ModificationTime(i64),
}

/// Reads every known property in an `iprp` box's payload.
///
/// Properties that fail to parse are skipped with a warning.
pub fn item_properties(iprp: &[u8]) -> Vec<Property> {
    let Some((_, ipco)) = children(iprp)
        .into_iter()
        .find(|(header, _)| header.box_type == BoxType::Id(*b"ipco"))
    else {
        log::debug!("`iprp` has no `ipco` box.");
        return Vec::new();
    };

    children(ipco)
        .into_iter()
        .filter_map(|(header, mut payload)| {
            let BoxType::Id(ty) = header.box_type else {
                return None;
            };

            let parsed = match &ty {
                b"colr" => colour_information(&mut payload),
                b"ispe" => image_spatial_extents(&mut payload).map(Some),
                b"pixi" => pixel_information(&mut payload).map(Some),
                b"irot" => image_rotation(&mut payload).map(Some),
                b"imir" => image_mirror(&mut payload).map(Some),
                b"crtt" => timestamp(&mut payload).map(|t| t.map(Property::CreationTime)),
                b"mdft" => timestamp(&mut payload).map(|t| t.map(Property::ModificationTime)),
                other => {
                    log::trace!("Skipping `{}` property.", String::from_utf8_lossy(other));
                    return None;
                }
            };

            parsed
                .inspect_err(|e| {
                    log::warn!(
                        "Skipping malformed `{}` property. err: {e}",
                        String::from_utf8_lossy(&ty)
                    )
                })
                .ok()
                .flatten()
        })
        .collect()
}

fn colour_information(input: &mut &[u8]) -> ModalResult<Option<Property>, ContextError> {
    let colour_type = fourcc.context(desc("colour type")).parse_next(input)?;

    match &colour_type {
        b"nclx" => {
            let colour_primaries = be_u16.context(desc("colour primaries")).parse_next(input)?;
            let transfer_characteristics = be_u16
                .context(desc("transfer characteristics"))
                .parse_next(input)?;
            let matrix_coefficients = be_u16
                .context(desc("matrix coefficients"))
                .parse_next(input)?;
            let full_range = u8.context(desc("full range flag")).parse_next(input)? >> 7 == 1;

            Ok(Some(Property::Nclx {
                colour_primaries,
                transfer_characteristics,
                matrix_coefficients,
                full_range,
            }))
        }

        b"prof" | b"rICC" => {
            let profile: &[u8] = rest.parse_next(input)?;

            // a profile's first four bytes are its own length
            let declared = profile
                .get(..4)
                .and_then(|b| <[u8; 4]>::try_from(b).ok())
                .map(|b| u32::from_be_bytes(b) as usize);
            let profile = match declared {
                Some(len) if len <= profile.len() => &profile[..len],
                _ => profile,
            };

            Ok(Some(Property::IccProfile(profile.to_vec())))
        }

        other => {
            log::debug!(
                "Unknown colour type: `{}`",
                String::from_utf8_lossy(other)
            );
            Ok(None)
        }
    }
}

fn image_spatial_extents(input: &mut &[u8]) -> ModalResult<Property, ContextError> {
    FullBox::new(input)?;
    let width = be_u32.context(desc("image width")).parse_next(input)?;
    let height = be_u32.context(desc("image height")).parse_next(input)?;
    Ok(Property::Extent { width, height })
}

fn pixel_information(input: &mut &[u8]) -> ModalResult<Property, ContextError> {
    FullBox::new(input)?;
    let channels = u8.context(desc("channel count")).parse_next(input)?;
    let bit_depth = if channels > 0 {
        Some(u8.context(desc("bits per channel")).parse_next(input)?)
    } else {
        None
    };
    Ok(Property::PixelInfo {
        channels,
        bit_depth,
    })
}

fn image_rotation(input: &mut &[u8]) -> ModalResult<Property, ContextError> {
    let angle = u8.context(desc("rotation")).parse_next(input)? & 0b11;
    Ok(Property::Rotation(u16::from(angle) * 90))
}

fn image_mirror(input: &mut &[u8]) -> ModalResult<Property, ContextError> {
    let axis = u8.context(desc("mirror axis")).parse_next(input)? & 0b1;
    Ok(Property::Mirror { axis })
}

/// Reads a `crtt`/`mdft` timestamp: microseconds since 1904, in UTC.
///
/// Times that don't fit in an `i64` of milliseconds are dropped.
fn timestamp(input: &mut &[u8]) -> ModalResult<Option<i64>, ContextError> {
    FullBox::new(input)?;
    let micros = be_u64.context(desc("timestamp")).parse_next(input)?;

    let ms = i64::try_from(micros / 1000)
        .ok()
        .and_then(|ms| ms.checked_sub(MAC_EPOCH_OFFSET_MS));
    if ms.is_none() {
        log::warn!("Timestamp is out of range. value: `{micros}`");
    }
    Ok(ms)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Property, item_properties};
    use crate::{
        providers::heif::boxes::tests::{bmff_box, full_box},
        util::logger,
    };

    /// An `iprp` box holding an `ipco` with the given properties.
    pub(crate) fn iprp(properties: &[Vec<u8>]) -> Vec<u8> {
        let ipco = bmff_box(b"ipco", &properties.concat());
        bmff_box(b"iprp", &ipco)
    }

    pub(crate) fn ispe(width: u32, height: u32) -> Vec<u8> {
        let mut body = width.to_be_bytes().to_vec();
        body.extend_from_slice(&height.to_be_bytes());
        full_box(b"ispe", 0, &body)
    }

    /// Microseconds since 1904 for the given Unix milliseconds.
    pub(crate) fn mac_time(unix_ms: i64) -> [u8; 8] {
        (((unix_ms + 2_082_844_800_000) * 1000) as u64).to_be_bytes()
    }

    #[test]
    fn known_properties() {
        logger();
        let mut nclx = b"nclx".to_vec();
        nclx.extend_from_slice(&[0, 9, 0, 16, 0, 9, 0x80]);

        let mut pixi = vec![3];
        pixi.extend_from_slice(&[10, 10, 10]);

        let bytes = iprp(&[
            ispe(640, 480),
            bmff_box(b"colr", &nclx),
            full_box(b"pixi", 0, &pixi),
            bmff_box(b"irot", &[3]),
            bmff_box(b"imir", &[1]),
            full_box(b"crtt", 0, &mac_time(1_700_000_000_000)),
            bmff_box(b"av1C", &[0x81, 0, 0, 0]),
        ]);

        assert_eq!(
            item_properties(&bytes[8..]),
            [
                Property::Extent {
                    width: 640,
                    height: 480
                },
                Property::Nclx {
                    colour_primaries: 9,
                    transfer_characteristics: 16,
                    matrix_coefficients: 9,
                    full_range: true
                },
                Property::PixelInfo {
                    channels: 3,
                    bit_depth: Some(10)
                },
                Property::Rotation(270),
                Property::Mirror { axis: 1 },
                Property::CreationTime(1_700_000_000_000),
            ]
        );
    }

    #[test]
    fn icc_profile_is_bounded_by_its_length() {
        logger();
        let mut colr = b"prof".to_vec();
        colr.extend_from_slice(&6_u32.to_be_bytes());
        colr.extend_from_slice(&[1, 2, 3, 4]);

        let bytes = iprp(&[bmff_box(b"colr", &colr)]);
        assert_eq!(
            item_properties(&bytes[8..]),
            [Property::IccProfile(vec![0, 0, 0, 6, 1, 2])]
        );
    }

    #[test]
    fn malformed_properties_are_skipped() {
        logger();
        let bytes = iprp(&[full_box(b"ispe", 0, &[0, 0, 1]), ispe(2, 2)]);
        assert_eq!(
            item_properties(&bytes[8..]),
            [Property::Extent {
                width: 2,
                height: 2
            }]
        );

        assert!(item_properties(&bmff_box(b"free", &[])).is_empty());
    }
}
