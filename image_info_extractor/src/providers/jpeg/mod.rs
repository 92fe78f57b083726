//! JPEG is an older image format designed with old-school compression in mind.
//!
//! Its metadata lives in `APPn` segments ahead of the first scan, each one
//! tagged with an identifier string. The frame header (`SOFn`) gives the
//! image's dimensions.

use crate::{
    commons::starts_with_array,
    result::{ImageInfo, Metadata, MetadataFlags, ReadResult},
    source::ByteSource,
};

use self::{
    chunks::{ExtendedXmpChunk, IccChunk, find_iptc, merge_extended_xmp, merge_icc},
    walker::{SOI_MARKER_CODE, SegmentWalker},
};

use super::ContainerReader;

mod chunks;
mod error;
mod walker;

pub use error::JpegError;

/// The last marker code, `EOI` (end of image).
const EOI_MARKER_CODE: u8 = 0xD9;

/// The start of scan code, `SOS`.
const SOS_MARKER_CODE: u8 = 0xDA;

const APP0_MARKER_CODE: u8 = 0xE0;
const APP1_MARKER_CODE: u8 = 0xE1;
const APP2_MARKER_CODE: u8 = 0xE2;
const APP13_MARKER_CODE: u8 = 0xED;

/// Start-of-frame markers. `DHT`, `JPG` and `DAC` share the range, so
/// they're left out.
const SOF_MARKER_CODES: [u8; 13] = [
    0xC0, 0xC1, 0xC2, 0xC3, 0xC5, 0xC6, 0xC7, 0xC9, 0xCA, 0xCB, 0xCD, 0xCE, 0xCF,
];

/// `SOF55`, from JPEG-LS.
const SOF55_MARKER_CODE: u8 = 0xF7;

const PROGRESSIVE_SOF_CODES: [u8; 4] = [0xC2, 0xC5, 0xCA, 0xCE];
const LOSSLESS_SOF_CODES: [u8; 5] = [0xC3, 0xC7, 0xCB, 0xCF, SOF55_MARKER_CODE];

const JFIF_IDENTIFIER: &[u8] = b"JFIF\0";
const JFXX_IDENTIFIER: &[u8] = b"JFXX\0";
const EXIF_IDENTIFIER: &[u8] = b"Exif\0\0";
const XMP_IDENTIFIER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const EXTENDED_XMP_IDENTIFIER: &[u8] = b"http://ns.adobe.com/xmp/extension/\0";
const MJPG_IDENTIFIER: &[u8] = b"mjpg";
const ICC_IDENTIFIER: &[u8] = b"ICC_PROFILE\0";
const PHOTOSHOP_IDENTIFIER: &[u8] = b"Photoshop 3.0\0";

/// A JPEG file.
#[derive(Clone, Copy, Debug)]
pub struct Jpeg;

impl ContainerReader for Jpeg {
    type Error = JpegError;

    fn magic_number(input: &[u8]) -> bool {
        starts_with_array(input, &[0xFF, SOI_MARKER_CODE, 0xFF], 0)
    }

    fn read<S: ByteSource + ?Sized>(source: &S) -> Result<Option<ReadResult>, Self::Error> {
        let Some(mut walker) = SegmentWalker::new(source)? else {
            return Ok(None);
        };

        let mut result = ReadResult::default();
        let mut info = ImageInfo::default();
        let mut found_frame = false;
        let mut flags = MetadataFlags::default();

        let mut extended_xmp = Vec::new();
        let mut icc = Vec::new();

        while let Some(segment) = walker.next_segment()? {
            let data = segment.data;
            let has = |identifier: &[u8]| starts_with_array(data, identifier, 0);

            match segment.marker {
                SOS_MARKER_CODE | EOI_MARKER_CODE => {
                    log::trace!("Reached marker `{:#04X}`. Done walking.", segment.marker);
                    break;
                }

                APP0_MARKER_CODE if has(JFIF_IDENTIFIER) => {
                    log::debug!("Found JFIF.");
                    result.jfif = Some(Metadata::new(data[JFIF_IDENTIFIER.len()..].to_vec()));
                    flags.set(MetadataFlags::JFIF);
                }
                APP0_MARKER_CODE if has(JFXX_IDENTIFIER) => {
                    log::debug!("Found JFXX.");
                    result.jfxx = Some(Metadata::new(data[JFXX_IDENTIFIER.len()..].to_vec()));
                    flags.set(MetadataFlags::JFXX);
                }

                APP1_MARKER_CODE if has(EXIF_IDENTIFIER) => {
                    log::debug!("Found Exif.");
                    result.exif = Some(Metadata::new(data[EXIF_IDENTIFIER.len()..].to_vec()));
                    flags.set(MetadataFlags::EXIF);
                }
                APP1_MARKER_CODE if has(XMP_IDENTIFIER) => {
                    log::debug!("Found StandardXMP.");
                    result.xmp = Some(Metadata::new(data[XMP_IDENTIFIER.len()..].to_vec()));
                    flags.set(MetadataFlags::XMP);
                }
                APP1_MARKER_CODE if has(EXTENDED_XMP_IDENTIFIER) => {
                    match ExtendedXmpChunk::parse(&data[EXTENDED_XMP_IDENTIFIER.len()..]) {
                        Some(c) => {
                            log::debug!("Found ExtendedXMP chunk at offset `{}`.", c.offset);
                            extended_xmp.push(c);
                        }
                        None => log::warn!("ExtendedXMP chunk is too short. Skipping it."),
                    }
                }
                APP1_MARKER_CODE if has(MJPG_IDENTIFIER) => {
                    log::debug!("Found a motion JPEG marker.");
                    info.animation = true;
                }

                APP2_MARKER_CODE if has(ICC_IDENTIFIER) => {
                    match IccChunk::parse(&data[ICC_IDENTIFIER.len()..]) {
                        Some(c) => {
                            log::debug!("Found ICC chunk `{}` of `{}`.", c.number, c.total);
                            icc.push(c);
                        }
                        None => log::warn!("ICC chunk is too short. Skipping it."),
                    }
                }

                APP13_MARKER_CODE if has(PHOTOSHOP_IDENTIFIER) => {
                    if let Some(iptc) = find_iptc(&data[PHOTOSHOP_IDENTIFIER.len()..])? {
                        result.iptc = Some(Metadata::new(iptc.to_vec()));
                    }
                }

                m if SOF_MARKER_CODES.contains(&m) || m == SOF55_MARKER_CODE => {
                    read_frame_header(m, data, &mut info);
                    found_frame = true;
                }

                other => log::trace!("Skipping segment `{other:#04X}`."),
            }
        }

        if !extended_xmp.is_empty() {
            result.extended_xmp = merge_extended_xmp(extended_xmp).map(Metadata::new);
        }

        if !icc.is_empty() {
            if let Some(profile) = merge_icc(icc) {
                result.icc = Some(Metadata::new(profile));
                flags.set(MetadataFlags::ICC);
            }
        }

        if found_frame {
            info.flags = flags;
            result.info = Some(info);
        }

        Ok(Some(result))
    }
}

/// Reads precision and dimensions from a `SOFn` payload.
fn read_frame_header(marker: u8, data: &[u8], info: &mut ImageInfo) {
    let c = crate::cursor::ByteCursor::be(data);
    let (Some(bit_depth), Some(lines), Some(width)) = (c.u8_at(0), c.u16_at(1), c.u16_at(3))
    else {
        log::warn!("Frame header `{marker:#04X}` is too short. Skipping it.");
        return;
    };

    info.bit_depth = Some(bit_depth);
    info.width = Some(u32::from(width));

    // zero lines means a later `DNL` marker has the height
    if lines != 0 {
        info.height = Some(u32::from(lines));
    }

    if PROGRESSIVE_SOF_CODES.contains(&marker) {
        info.progressive = true;
    }
    if LOSSLESS_SOF_CODES.contains(&marker) {
        info.lossless = true;
    }

    log::debug!(
        "Frame: `{width}x{lines}` at `{bit_depth}` bits per sample. marker: `{marker:#04X}`"
    );
}

#[cfg(test)]
mod tests {
    use super::{ContainerReader as _, Jpeg, JpegError};
    use crate::{result::MetadataFlags, util::logger};

    fn segment(marker: u8, data: &[u8]) -> Vec<u8> {
        let mut b = vec![0xFF, marker];
        b.extend_from_slice(&(data.len() as u16 + 2).to_be_bytes());
        b.extend_from_slice(data);
        b
    }

    fn with_id(id: &[u8], rest: &[u8]) -> Vec<u8> {
        [id, rest].concat()
    }

    fn jpeg(segments: &[Vec<u8>]) -> Vec<u8> {
        let mut file = vec![0xFF, 0xD8];
        segments.iter().for_each(|s| file.extend(s));
        file.extend(segment(0xDA, &[0; 10]));
        file.extend([0xAB; 32]);
        file.extend([0xFF, 0xD9]);
        file
    }

    fn sof(marker: u8, height: u16, width: u16) -> Vec<u8> {
        let mut data = vec![8];
        data.extend(height.to_be_bytes());
        data.extend(width.to_be_bytes());
        data.extend([3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);
        segment(marker, &data)
    }

    #[test]
    fn magic_number() {
        logger();
        assert!(Jpeg::magic_number(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!Jpeg::magic_number(&[0xFF, 0xD8]));
        assert!(!Jpeg::magic_number(b"\x89PNG"));
    }

    #[test]
    fn collects_app_segments() {
        logger();
        let file = jpeg(&[
            segment(0xE0, &with_id(b"JFIF\0", &[1, 2, 0, 0, 1, 0, 1, 0, 0])),
            segment(0xE1, &with_id(b"Exif\0\0", b"II*\0")),
            segment(0xE1, &with_id(b"http://ns.adobe.com/xap/1.0/\0", b"<x:xmpmeta/>")),
            sof(0xC2, 480, 640),
        ]);

        let result = Jpeg::read(file.as_slice()).unwrap().unwrap();
        assert_eq!(result.jfif.unwrap().content, [1, 2, 0, 0, 1, 0, 1, 0, 0]);
        assert_eq!(result.exif.unwrap().content, b"II*\0");
        assert_eq!(result.xmp.unwrap().content, b"<x:xmpmeta/>");

        let info = result.info.unwrap();
        assert_eq!((info.width, info.height), (Some(640), Some(480)));
        assert_eq!(info.bit_depth, Some(8));
        assert!(info.progressive);
        assert!(!info.lossless);
        assert!(!info.animation);
        assert_eq!(
            info.flags.bits(),
            MetadataFlags::JFIF | MetadataFlags::EXIF | MetadataFlags::XMP
        );
    }

    #[test]
    fn icc_chunks_arrive_out_of_order() {
        logger();
        let icc = |n: u8, body: &[u8]| {
            segment(0xE2, &with_id(b"ICC_PROFILE\0", &[[n, 3].as_slice(), body].concat()))
        };
        let file = jpeg(&[icc(2, b"BB"), icc(1, b"AA"), icc(3, b"CC"), sof(0xC0, 1, 1)]);

        let result = Jpeg::read(file.as_slice()).unwrap().unwrap();
        assert_eq!(result.icc.unwrap().content, b"AABBCC");
        assert!(result.info.unwrap().flags.has(MetadataFlags::ICC));
    }

    #[test]
    fn missing_icc_chunk_drops_the_profile() {
        logger();
        let icc = |n: u8| segment(0xE2, &with_id(b"ICC_PROFILE\0", &[n, 3, 0]));
        let file = jpeg(&[icc(1), icc(2), sof(0xC0, 1, 1)]);

        let result = Jpeg::read(file.as_slice()).unwrap().unwrap();
        assert!(result.icc.is_none());
        assert!(!result.info.unwrap().flags.has(MetadataFlags::ICC));
    }

    #[test]
    fn extended_xmp_and_iptc() {
        logger();
        let ext = |offset: u32, body: &[u8]| {
            let mut data = b"http://ns.adobe.com/xmp/extension/\0".to_vec();
            data.extend([b'F'; 32]);
            data.extend(6_u32.to_be_bytes());
            data.extend(offset.to_be_bytes());
            data.extend(body);
            segment(0xE1, &data)
        };

        let mut photoshop = b"Photoshop 3.0\08BIM\x04\x04\0\0".to_vec();
        photoshop.extend(6_u32.to_be_bytes());
        photoshop.extend([0x1C, 2, 5, 0, 1, b'x']);

        let file = jpeg(&[ext(3, b"def"), ext(0, b"abc"), segment(0xED, &photoshop)]);
        let result = Jpeg::read(file.as_slice()).unwrap().unwrap();

        assert_eq!(result.extended_xmp.unwrap().content, b"abcdef");
        assert_eq!(result.iptc.unwrap().content, [0x1C, 2, 5, 0, 1, b'x']);

        // no frame header, so no info
        assert!(result.info.is_none());
    }

    #[test]
    fn lossless_and_motion() {
        logger();
        let file = jpeg(&[segment(0xE1, b"mjpg"), sof(0xC3, 0, 16)]);
        let info = Jpeg::read(file.as_slice()).unwrap().unwrap().info.unwrap();

        assert!(info.lossless);
        assert!(info.animation);
        assert_eq!((info.width, info.height), (Some(16), None));
    }

    #[test]
    fn comments_and_extension_segments_are_skipped() {
        logger();
        let file = jpeg(&[
            segment(0xFE, b"made by hand"),
            segment(0xF1, &[1, 2, 3]),
            sof(0xC0, 20, 10),
            segment(0xE1, &with_id(b"Exif\0\0", b"II*\0")),
        ]);

        let result = Jpeg::read(file.as_slice()).unwrap().unwrap();
        assert_eq!(result.exif.unwrap().content, b"II*\0");
        let info = result.info.unwrap();
        assert_eq!((info.width, info.height), (Some(10), Some(20)));
    }

    #[test]
    fn jpeg_ls_frames_are_lossless() {
        logger();
        let mut file = vec![0xFF, 0xD8, 0xFF, 0xFF];
        file.extend(sof(0xF7, 4, 6));
        file.extend([0xFF, 0xD9]);

        let info = Jpeg::read(file.as_slice()).unwrap().unwrap().info.unwrap();
        assert!(info.lossless);
        assert!(!info.progressive);
        assert_eq!((info.width, info.height), (Some(6), Some(4)));
    }

    #[test]
    fn stops_at_start_of_scan() {
        logger();
        let mut file = jpeg(&[sof(0xC0, 2, 2)]);
        // metadata after the scan is never reached
        file.extend(segment(0xE1, &with_id(b"Exif\0\0", b"MM\0*")));

        let result = Jpeg::read(file.as_slice()).unwrap().unwrap();
        assert!(result.exif.is_none());
    }

    #[test]
    fn not_a_jpeg() {
        logger();
        assert!(matches!(
            Jpeg::read(b"GIF89a".as_slice()),
            Err(JpegError::FirstMarkerWasNotSoi { marker: 0x4749 })
        ));
    }
}
