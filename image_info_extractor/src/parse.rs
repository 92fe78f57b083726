//! The second pass: turning located blocks into structured values.
//!
//! Each kind of metadata is parsed on its own, so a broken ICC profile
//! won't take the Exif block down with it. Failures are kept in
//! [`Metadata::parsed`](crate::result::Metadata::parsed) and logged.

use crate::{
    config::ParserConfig,
    exif, icc, iptc, jfif,
    result::{ImageInfo, Metadata, ReadResult},
    xmp,
};

/// Parses every block in `result` with the built-in tables.
///
/// See [`parse_result_with`].
pub fn parse_result(result: &mut ReadResult) {
    parse_result_with(result, &ParserConfig::default());
}

/// Parses every block in `result`, filling in each block's `parsed` field.
///
/// When the container didn't give a rotation and mirroring, they're taken
/// from the Exif `Orientation` tag instead.
pub fn parse_result_with(result: &mut ReadResult, config: &ParserConfig) {
    if let Some(block) = &mut result.jfif {
        fill(block, "JFIF", jfif::parse);

        if let Some(thumbnail) = &mut result.jfxx {
            match jfif::parse_jfxx(&thumbnail.content) {
                Ok(Some(parsed)) => thumbnail.parsed = Some(Ok(parsed)),
                Ok(None) => log::debug!("JFXX thumbnail has an unknown format."),
                Err(e) => {
                    log::warn!("Failed to parse JFXX. err: {e}");
                    thumbnail.parsed = Some(Err(e));
                }
            }
        }
    }

    if let Some(block) = &mut result.exif {
        fill(block, "Exif", |bytes| {
            exif::parse_with(bytes, &config.exif_tag_names)
        });

        let orientation = block.parsed_ok().and_then(exif::Exif::orientation);
        if let (Some(info), Some(orientation)) = (&mut result.info, orientation) {
            apply_orientation(info, orientation);
        }
    }

    if let Some(block) = &mut result.xmp {
        fill(block, "XMP", |bytes| xmp::parse_with(bytes, &config.xmp_tag_types));

        if let Some(extended) = &mut result.extended_xmp {
            fill(extended, "ExtendedXMP", |bytes| {
                xmp::parse_with(bytes, &config.xmp_tag_types)
            });
        }
    }

    if let Some(block) = &mut result.iptc {
        fill(block, "IPTC", |bytes| {
            iptc::parse_with(bytes, &config.iptc_datasets)
        });
    }

    if let Some(block) = &mut result.icc {
        fill(block, "ICC", |bytes| {
            icc::parse_with(bytes, &config.icc_tag_names, &config.icc_type_decoders)
        });
    }
}

fn fill<P, E: core::fmt::Display>(
    metadata: &mut Metadata<P, E>,
    label: &str,
    parse: impl FnOnce(&[u8]) -> Result<P, E>,
) {
    let parsed = parse(&metadata.content);
    if let Err(e) = &parsed {
        log::warn!("Failed to parse {label}. err: {e}");
    }
    metadata.parsed = Some(parsed);
}

/// Sets `rotate` and `mirror` from an Exif orientation, unless the
/// container already gave both.
fn apply_orientation(info: &mut ImageInfo, orientation: u32) {
    if info.rotate.is_some() && info.mirror.is_some() {
        log::trace!("Container already set rotation and mirroring.");
        return;
    }

    let (rotate, mirror) = match orientation {
        1 => (0, 0),
        2 => (0, 1),
        3 => (180, 0),
        4 => (180, 1),
        5 => (270, 1),
        6 => (90, 0),
        7 => (90, 1),
        8 => (270, 0),
        other => {
            log::warn!("Unknown Exif orientation: `{other}`");
            (0, 0)
        }
    };
    log::debug!("Orientation `{orientation}` gives rotate: `{rotate}`, mirror: `{mirror}`");

    info.rotate = Some(rotate);
    info.mirror = Some(mirror);
}

#[cfg(test)]
mod tests {
    use super::{apply_orientation, parse_result};
    use crate::{
        result::{ImageInfo, Metadata, ReadResult},
        util::logger,
    };

    /// A little-endian Exif block with only IFD0's `Orientation`.
    fn exif_with_orientation(orientation: u16) -> Vec<u8> {
        let mut bytes = b"II*\0".to_vec();
        bytes.extend_from_slice(&8_u32.to_le_bytes());
        bytes.extend_from_slice(&1_u16.to_le_bytes());
        bytes.extend_from_slice(&0x0112_u16.to_le_bytes());
        bytes.extend_from_slice(&3_u16.to_le_bytes());
        bytes.extend_from_slice(&1_u32.to_le_bytes());
        bytes.extend_from_slice(&orientation.to_le_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&0_u32.to_le_bytes());
        bytes
    }

    #[test]
    fn orientation_backfills_info() {
        logger();
        let mut result = ReadResult {
            info: Some(ImageInfo::default()),
            exif: Some(Metadata::new(exif_with_orientation(6))),
            ..Default::default()
        };
        parse_result(&mut result);

        let exif = result.exif.as_ref().unwrap().parsed_ok().unwrap();
        assert_eq!(exif.orientation(), Some(6));

        let info = result.info.unwrap();
        assert_eq!((info.rotate, info.mirror), (Some(90), Some(0)));
    }

    #[test]
    fn container_orientation_wins() {
        logger();
        let mut info = ImageInfo {
            rotate: Some(180),
            mirror: Some(0),
            ..Default::default()
        };
        apply_orientation(&mut info, 7);
        assert_eq!((info.rotate, info.mirror), (Some(180), Some(0)));

        // only half given, so both get replaced
        let mut info = ImageInfo {
            rotate: Some(180),
            ..Default::default()
        };
        apply_orientation(&mut info, 5);
        assert_eq!((info.rotate, info.mirror), (Some(270), Some(1)));
    }

    #[test]
    fn failures_stay_per_kind() {
        logger();
        let mut result = ReadResult {
            info: Some(ImageInfo::default()),
            exif: Some(Metadata::new(exif_with_orientation(3))),
            icc: Some(Metadata::new(vec![0; 10])),
            xmp: Some(Metadata::new(b"<x:xmpmeta".to_vec())),
            ..Default::default()
        };
        parse_result(&mut result);

        assert!(matches!(result.icc.unwrap().parsed, Some(Err(_))));
        assert!(matches!(result.xmp.unwrap().parsed, Some(Err(_))));
        assert!(matches!(result.exif.unwrap().parsed, Some(Ok(_))));
        assert_eq!(result.info.unwrap().rotate, Some(180));
    }

    #[test]
    fn jfxx_needs_jfif() {
        logger();
        let mut result = ReadResult {
            jfxx: Some(Metadata::new(vec![0x10, 0xFF, 0xD8])),
            ..Default::default()
        };
        parse_result(&mut result);
        assert_eq!(result.jfxx.unwrap().parsed, None);

        let mut jfif = vec![1, 2, 0, 0, 1, 0, 1, 0, 0];
        let mut result = ReadResult {
            jfif: Some(Metadata::new(jfif.clone())),
            jfxx: Some(Metadata::new(vec![0x10, 0xFF, 0xD8])),
            ..Default::default()
        };
        parse_result(&mut result);
        assert!(result.jfif.unwrap().parsed_ok().is_some());
        assert!(result.jfxx.unwrap().parsed_ok().is_some());

        jfif.truncate(3);
        let mut result = ReadResult {
            jfif: Some(Metadata::new(jfif)),
            ..Default::default()
        };
        parse_result(&mut result);
        assert!(matches!(result.jfif.unwrap().parsed, Some(Err(_))));
    }
}
