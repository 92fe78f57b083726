//! A reader generic over AVIF, HEIF, HEIC, and other formats with identical
//! structure.
//!
//! These are all ISO BMFF files: a flat run of boxes, starting with `ftyp`.
//! Metadata lives in the `meta` box as "items" (Exif and XMP) and "item
//! properties" (size, colour, orientation).
//!
//! Here's a nice resource explaining the file structure:
//!
//! https://github.com/spacestation93/heif_howto

use winnow::error::{ContextError, ErrMode};

use crate::{
    result::{ColorInfo, ImageInfo, Metadata, MetadataFlags, ReadResult},
    source::ByteSource,
};

use self::{
    boxes::{BoxHeader, BoxType, FtypBox, FullBox, children},
    items::{ConstructionMethod, ItemInfoBox, ItemInfoEntry, ItemLocationBox, PrimaryItemBox},
    properties::Property,
};

use super::ContainerReader;

mod boxes;
mod error;
mod items;
mod properties;

pub use error::HeifError;

pub const AVIF_BRANDS: [[u8; 4]; 2] = [*b"avif", *b"avis"];
pub const HEIF_BRANDS: [[u8; 4]; 2] = [*b"mif1", *b"msf1"];
pub const HEIC_BRANDS: [[u8; 4]; 4] = [*b"heic", *b"heix", *b"hevc", *b"hevx"];

/// Brands for image sequences rather than still images.
const ANIMATED_BRANDS: [[u8; 4]; 4] = [*b"avis", *b"msf1", *b"hevc", *b"hevx"];

/// The smallest file that could hold an `ftyp` box with a brand.
const MIN_FILE_LEN: usize = 12;

/// An AVIF, HEIF or HEIC file.
#[derive(Clone, Copy, Debug)]
pub struct Heif;

impl Heif {
    /// Whether `brand` is one this reader accepts as a major brand.
    pub fn is_supported_brand(brand: &[u8; 4]) -> bool {
        AVIF_BRANDS.contains(brand) || HEIF_BRANDS.contains(brand) || HEIC_BRANDS.contains(brand)
    }
}

impl ContainerReader for Heif {
    type Error = HeifError;

    fn magic_number(input: &[u8]) -> bool {
        input.get(4..8) == Some(b"ftyp".as_slice())
            && input
                .get(8..12)
                .and_then(|b| <[u8; 4]>::try_from(b).ok())
                .is_some_and(|brand| Self::is_supported_brand(&brand))
    }

    fn read<S: ByteSource + ?Sized>(source: &S) -> Result<Option<ReadResult>, Self::Error> {
        let file = source.read_all()?;
        if file.len() < MIN_FILE_LEN {
            log::error!("File is too short to be ISO BMFF. len: `{}`", file.len());
            return Err(HeifError::TooShort { len: file.len() });
        }

        // grab the `ftyp` box, which must be the first in the file.
        let input = &mut &file[..];
        let ftyp = FtypBox::new(input).ok_or_else(|| {
            log::error!(
                "The `ftyp` box was not found. It may not be the first \
                box in the file."
            );
            HeifError::NoFtypBox
        })?;
        log::trace!("found ftyp box! major brand: {:?}", ftyp.major_brand);

        if !Self::is_supported_brand(&ftyp.major_brand) {
            log::error!("Not a HEIF-like file. major brand: `{:?}`", ftyp.major_brand);
            return Err(HeifError::UnsupportedBrand {
                major_brand: ftyp.major_brand,
            });
        }

        let mut result = ReadResult::default();
        let mut info = ImageInfo::default();
        let mut flags = MetadataFlags::default();

        if let Some(meta) = find_meta(input) {
            read_meta(&file, meta, &mut result, &mut info, &mut flags)?;
        }

        info.animation = ANIMATED_BRANDS.contains(&ftyp.major_brand);
        info.bit_depth.get_or_insert(8);
        info.flags = flags;
        result.info = Some(info);

        Ok(Some(result))
    }
}

/// Walks top-level boxes until `meta`, returning its payload.
///
/// Gives up at `mdat`, since `meta` comes before the media data.
fn find_meta<'input>(input: &mut &'input [u8]) -> Option<&'input [u8]> {
    while !input.is_empty() {
        let header = BoxHeader::new(input)
            .inspect_err(|e| log::warn!("Failed to parse a top-level box header. err: {e}"))
            .ok()?;
        let payload = header.payload(input).ok()?;

        match header.box_type {
            BoxType::Id(ref id) if id == b"meta" => {
                log::trace!("Found the `meta` box.");
                return Some(payload);
            }
            BoxType::Id(ref id) if id == b"mdat" => {
                log::debug!("Hit `mdat` before any `meta` box.");
                return None;
            }
            other => log::trace!("Skipping top-level box: `{other:?}`"),
        }
    }

    None
}

/// The `meta` box's children that we care about.
#[derive(Default)]
struct MetaBox<'input> {
    primary_item: Option<PrimaryItemBox>,
    item_info: Option<ItemInfoBox>,
    item_location: Option<ItemLocationBox>,
    item_properties: Option<&'input [u8]>,
}

impl<'input> MetaBox<'input> {
    fn new(mut meta: &'input [u8]) -> Result<Self, HeifError> {
        let input = &mut meta;
        FullBox::new(input).map_err(|e| {
            log::error!("Failed to parse the `meta` box's version. err: {e}");
            HeifError::MalformedBox { box_type: *b"meta" }
        })?;

        let mut out = Self::default();
        for (header, mut payload) in children(*input) {
            let BoxType::Id(ty) = header.box_type else {
                continue;
            };

            let malformed = |e: ErrMode<ContextError>| {
                log::error!(
                    "Failed to parse `{}` inside `meta`. err: {e}",
                    String::from_utf8_lossy(&ty)
                );
                HeifError::MalformedBox { box_type: ty }
            };

            match &ty {
                b"pitm" => {
                    out.primary_item = Some(PrimaryItemBox::new(&mut payload).map_err(malformed)?);
                }
                b"iinf" => {
                    out.item_info = Some(ItemInfoBox::new(&mut payload).map_err(malformed)?);
                }
                b"iloc" => {
                    out.item_location = Some(ItemLocationBox::new(&mut payload).map_err(malformed)?);
                }
                b"iprp" => out.item_properties = Some(payload),
                other => log::trace!(
                    "Skipping `{}` inside `meta`.",
                    String::from_utf8_lossy(other)
                ),
            }
        }

        Ok(out)
    }
}

fn read_meta(
    file: &[u8],
    meta: &[u8],
    result: &mut ReadResult,
    info: &mut ImageInfo,
    flags: &mut MetadataFlags,
) -> Result<(), HeifError> {
    let meta = MetaBox::new(meta)?;

    if let Some(ref iinf) = meta.item_info {
        let entries = &iinf.item_infos;

        let primary = meta
            .primary_item
            .and_then(|pitm| entries.iter().find(|e| e.item_id == pitm.item_id));
        if primary.is_some_and(|e| e.is_type(b"grid")) {
            log::debug!("Primary item is a grid.");
            info.grid = Some(true);
        }

        if let Some(item) = entries.iter().find(|e| e.is_type(b"Exif")) {
            let content = item_data(file, meta.item_location.as_ref(), item)?;
            if !content.is_empty() {
                log::debug!("Found Exif item `#{}`.", item.item_id);
                result.exif = Some(Metadata::new(content));
                flags.set(MetadataFlags::EXIF);
            }
        }

        if let Some(item) = entries.iter().find(|e| is_xmp_item(e)) {
            let content = item_data(file, meta.item_location.as_ref(), item)?;
            if !content.is_empty() {
                log::debug!("Found XMP item `#{}`.", item.item_id);
                result.xmp = Some(Metadata::new(content));
                flags.set(MetadataFlags::XMP);
            }
        }
    }

    if let Some(iprp) = meta.item_properties {
        apply_properties(properties::item_properties(iprp), result, info, flags);
    }

    Ok(())
}

fn is_xmp_item(entry: &ItemInfoEntry) -> bool {
    entry.item_name.as_deref() == Some("XMP")
        || (entry.is_type(b"mime")
            && entry.content_type.as_deref() == Some("application/rdf+xml"))
}

/// Copies an item's bytes out of the file.
///
/// Extents are joined in the order `iloc` lists them. Exif items start with
/// a four-byte offset to the TIFF header, which is skipped.
fn item_data(
    file: &[u8],
    iloc: Option<&ItemLocationBox>,
    item: &ItemInfoEntry,
) -> Result<Vec<u8>, HeifError> {
    let item_id = item.item_id;
    let Some(location) = iloc.and_then(|iloc| iloc.find(item_id)) else {
        log::error!("Item `#{item_id}` has no location.");
        return Err(HeifError::MissingItemLocation { item_id });
    };

    if location.construction_method != ConstructionMethod::File {
        log::warn!(
            "Item `#{item_id}` uses construction method `{:?}`, which isn't supported. \
            Skipping it.",
            location.construction_method
        );
        return Ok(Vec::new());
    }

    let mut data = Vec::new();
    for extent in &location.extents {
        let out_of_bounds = || {
            log::error!("Item `#{item_id}` extent is out of bounds. extent: `{extent:?}`");
            HeifError::ItemOutOfBounds { item_id }
        };

        let start = location
            .base_offset
            .checked_add(extent.extent_offset)
            .and_then(|s| usize::try_from(s).ok())
            .ok_or_else(out_of_bounds)?;
        let end = match extent.extent_length {
            0 => file.len(),
            len => usize::try_from(len)
                .ok()
                .and_then(|len| start.checked_add(len))
                .ok_or_else(out_of_bounds)?,
        };

        data.extend_from_slice(file.get(start..end).ok_or_else(out_of_bounds)?);
    }

    if !item.is_type(b"Exif") {
        return Ok(data);
    }

    // some writers leave the offset out, starting right at the TIFF header
    if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        log::warn!("Exif item `#{item_id}` has no TIFF header offset. Assuming zero...");
        return Ok(data);
    }

    let skip = data
        .get(..4)
        .and_then(|b| <[u8; 4]>::try_from(b).ok())
        .map(|b| u32::from_be_bytes(b) as usize)
        .and_then(|offset| offset.checked_add(4));
    match skip {
        Some(skip) if skip <= data.len() => Ok(data.split_off(skip)),
        _ => {
            log::warn!("Exif item `#{item_id}` has a bad TIFF header offset. Skipping it.");
            Ok(Vec::new())
        }
    }
}

/// Folds item properties into the result.
fn apply_properties(
    properties: Vec<Property>,
    result: &mut ReadResult,
    info: &mut ImageInfo,
    flags: &mut MetadataFlags,
) {
    for property in properties {
        match property {
            Property::IccProfile(profile) => {
                log::debug!("Found ICC profile.");
                result.icc = Some(Metadata::new(profile));
                flags.set(MetadataFlags::ICC);
            }
            Property::Nclx {
                colour_primaries,
                transfer_characteristics,
                matrix_coefficients,
                full_range,
            } => {
                let color = info.color_info.get_or_insert_with(ColorInfo::default);
                color.color_primaries = Some(colour_primaries);
                color.transfer_function = Some(transfer_characteristics);
                color.matrix_coefficients = Some(matrix_coefficients);
                color.video_full_range = Some(full_range);
            }

            // thumbnails and tiles have their own `ispe`, so keep the
            // largest. this is a guess without `ipma` associations
            Property::Extent { width, height } => {
                let area = u64::from(width) * u64::from(height);
                let current = match (info.width, info.height) {
                    (Some(w), Some(h)) => Some(u64::from(w) * u64::from(h)),
                    _ => None,
                };
                if current.is_none_or(|current| area > current) {
                    info.width = Some(width);
                    info.height = Some(height);
                }
            }

            Property::PixelInfo {
                channels,
                bit_depth,
            } => {
                if channels >= 3 && info.bit_depth.is_none() {
                    info.bit_depth = bit_depth;
                }
                if channels == 1 || channels > 3 {
                    info.alpha = true;
                }
            }

            // both stay in the boxes' own terms: `irot` counter-clockwise,
            // `imir` as its axis times 90
            Property::Rotation(angle) => info.rotate = Some(angle),
            Property::Mirror { axis } => info.mirror = Some(u16::from(axis) * 90),
            Property::CreationTime(t) => info.creation_time = Some(t),
            Property::ModificationTime(t) => info.modification_time = Some(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Heif, HeifError};
    use crate::{
        providers::{
            ContainerReader as _,
            heif::{
                boxes::tests::{bmff_box, full_box},
                items::tests::infe,
                properties::tests::{iprp, ispe, mac_time},
            },
        },
        result::MetadataFlags,
        util::logger,
    };

    const EXIF: &[u8] = b"MM\0*\0\0\0\x08\0\0";
    const XMP: &[u8] = b"<x:xmpmeta xmlns:x='adobe:ns:meta/'/>";

    /// An `iloc` (v0, 4-byte offsets and lengths) for `(id, offset, len)`.
    fn iloc(items: &[(u16, u32, u32)]) -> Vec<u8> {
        let mut body = vec![0x44, 0x00];
        body.extend_from_slice(&(items.len() as u16).to_be_bytes());
        for (id, offset, len) in items {
            body.extend_from_slice(&id.to_be_bytes());
            body.extend_from_slice(&[0, 0, 0, 1]);
            body.extend_from_slice(&offset.to_be_bytes());
            body.extend_from_slice(&len.to_be_bytes());
        }
        full_box(b"iloc", 0, &body)
    }

    fn iinf(entries: &[Vec<u8>]) -> Vec<u8> {
        let mut body = (entries.len() as u16).to_be_bytes().to_vec();
        body.extend(entries.concat());
        full_box(b"iinf", 0, &body)
    }

    /// Builds a file with `ftyp`, `meta` and an `mdat` holding the Exif (with
    /// its offset prefix) and XMP payloads.
    fn make_heif_sample(brand: &[u8; 4], properties: &[Vec<u8>]) -> Vec<u8> {
        let ftyp = bmff_box(b"ftyp", &[brand.as_slice(), b"\0\0\0\0mif1".as_slice()].concat());

        let mut exif_item = 0_u32.to_be_bytes().to_vec();
        exif_item.extend_from_slice(EXIF);

        // the `meta` box's size doesn't depend on offsets, so build it twice
        let build_meta = |mdat_payload_start: u32| {
            let exif_at = mdat_payload_start;
            let xmp_at = exif_at + exif_item.len() as u32;

            let children = [
                full_box(b"hdlr", 0, b"\0\0\0\0pict\0\0\0\0\0\0\0\0\0\0\0\0\0"),
                full_box(b"pitm", 0, &[0, 1]),
                iinf(&[
                    infe(1, b"grid", "", None),
                    infe(2, b"Exif", "", None),
                    infe(3, b"mime", "XMP", Some("application/rdf+xml")),
                ]),
                iloc(&[
                    (2, exif_at, exif_item.len() as u32),
                    (3, xmp_at, XMP.len() as u32),
                ]),
                iprp(properties),
            ]
            .concat();
            full_box(b"meta", 0, &children)
        };

        let draft = build_meta(0);
        let mdat_payload_start = (ftyp.len() + draft.len() + 8) as u32;
        let meta = build_meta(mdat_payload_start);

        let mdat = bmff_box(b"mdat", &[exif_item.as_slice(), XMP].concat());
        [ftyp, meta, mdat].concat()
    }

    #[test]
    fn items_and_properties() {
        logger();
        let mut nclx = b"nclx".to_vec();
        nclx.extend_from_slice(&[0, 1, 0, 13, 0, 6, 0]);

        let file = make_heif_sample(
            b"avif",
            &[
                ispe(64, 64),
                ispe(1920, 1080),
                full_box(b"pixi", 0, &[3, 10, 10, 10]),
                bmff_box(b"colr", &nclx),
                full_box(b"mdft", 0, &mac_time(1_600_000_000_000)),
            ],
        );

        let result = Heif::read(&file).unwrap().unwrap();
        assert_eq!(result.exif.unwrap().content, EXIF);
        assert_eq!(result.xmp.unwrap().content, XMP);
        assert!(result.icc.is_none());

        let info = result.info.unwrap();
        assert_eq!((info.width, info.height), (Some(1920), Some(1080)));
        assert_eq!(info.bit_depth, Some(10));
        assert_eq!(info.grid, Some(true));
        assert!(!info.alpha);
        assert!(!info.animation);
        assert_eq!(info.modification_time, Some(1_600_000_000_000));
        assert_eq!(info.rotate, None);

        let color = info.color_info.unwrap();
        assert_eq!(color.color_primaries, Some(1));
        assert_eq!(color.transfer_function, Some(13));
        assert_eq!(color.video_full_range, Some(false));

        assert_eq!(
            info.flags.bits(),
            MetadataFlags::EXIF | MetadataFlags::XMP
        );
    }

    #[test]
    fn icc_orientation_and_animation() {
        logger();
        let mut prof = b"prof".to_vec();
        prof.extend_from_slice(&8_u32.to_be_bytes());
        prof.extend_from_slice(b"acsp");

        let file = make_heif_sample(
            b"heis",
            &[bmff_box(b"colr", &prof)],
        );
        assert_eq!(
            Heif::read(&file),
            Err(HeifError::UnsupportedBrand {
                major_brand: *b"heis"
            })
        );

        let file = make_heif_sample(
            b"hevc",
            &[
                bmff_box(b"colr", &prof),
                bmff_box(b"irot", &[1]),
                bmff_box(b"imir", &[1]),
                full_box(b"pixi", 0, &[1, 8]),
            ],
        );
        let result = Heif::read(&file).unwrap().unwrap();
        assert_eq!(result.icc.unwrap().content, [0, 0, 0, 8, b'a', b'c', b's', b'p']);

        let info = result.info.unwrap();
        assert!(info.animation);
        assert!(info.alpha);
        assert_eq!(info.bit_depth, Some(8));

        // raw `irot` and `imir` values, both in quarter turns
        assert_eq!(info.rotate, Some(90));
        assert_eq!(info.mirror, Some(90));
        assert!(info.flags.has(MetadataFlags::ICC));
    }

    #[test]
    fn orientation_boxes_are_raw() {
        logger();
        let info = |properties: &[Vec<u8>]| {
            Heif::read(&make_heif_sample(b"avif", properties))
                .unwrap()
                .unwrap()
                .info
                .unwrap()
        };

        let only_rotation = info(&[bmff_box(b"irot", &[1])]);
        assert_eq!(only_rotation.rotate, Some(90));
        assert_eq!(only_rotation.mirror, None);

        let only_mirror = info(&[bmff_box(b"imir", &[0])]);
        assert_eq!(only_mirror.rotate, None);
        assert_eq!(only_mirror.mirror, Some(0));

        let both = info(&[bmff_box(b"irot", &[3]), bmff_box(b"imir", &[1])]);
        assert_eq!((both.rotate, both.mirror), (Some(270), Some(90)));

        assert_eq!(info(&[]).rotate, None);
    }

    #[test]
    fn no_meta_still_has_info() {
        logger();
        let mut file = bmff_box(b"ftyp", b"mif1\0\0\0\0");
        file.extend(bmff_box(b"mdat", &[0; 16]));
        file.extend(full_box(b"meta", 0, &[]));

        let result = Heif::read(&file).unwrap().unwrap();
        let info = result.info.unwrap();
        assert_eq!(info.bit_depth, Some(8));
        assert_eq!(info.flags.bits(), 0);
        assert!(result.exif.is_none());
    }

    #[test]
    fn rejects_bad_files() {
        logger();
        assert_eq!(
            Heif::read(b"\0\0\0\x0cftyp".as_slice()),
            Err(HeifError::TooShort { len: 8 })
        );

        let file = bmff_box(b"free", b"avif\0\0\0\0");
        assert_eq!(Heif::read(&file), Err(HeifError::NoFtypBox));
    }

    #[test]
    fn missing_location_is_fatal() {
        logger();
        let meta = full_box(
            b"meta",
            0,
            &[iinf(&[infe(5, b"Exif", "", None)]), iloc(&[])].concat(),
        );
        let file = [bmff_box(b"ftyp", b"heic\0\0\0\0"), meta].concat();
        assert_eq!(
            Heif::read(&file),
            Err(HeifError::MissingItemLocation { item_id: 5 })
        );
    }

    #[test]
    fn magic_numbers() {
        logger();
        assert!(Heif::magic_number(b"\0\0\0\x18ftypavif"));
        assert!(Heif::magic_number(b"\0\0\0\x18ftypheix"));
        assert!(!Heif::magic_number(b"\0\0\0\x18ftypisom"));
        assert!(!Heif::magic_number(b"\0\0\0\x18ftyp"));
    }
}
