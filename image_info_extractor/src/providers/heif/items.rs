//! The `meta` box's item tables.
//!
//! HEIF stores everything (image tiles, Exif, XMP) as "items". `iinf` says
//! what each item is, `iloc` says where its bytes live, and `pitm` says
//! which one is the image you'd show.
//!
//! Each parser here takes the box's payload (everything after its header).

use winnow::{
    ModalResult, Parser as _,
    binary::{be_u16, be_u32},
    combinator::{fail, opt},
    error::ContextError,
    token::take,
};

use crate::providers::shared::{desc, parse_nul_terminated_str};

use super::boxes::{BoxType, FullBox, children, fourcc};

/// `pitm`: names the primary item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimaryItemBox {
    pub item_id: u32,
}

impl PrimaryItemBox {
    pub fn new(input: &mut &[u8]) -> ModalResult<Self, ContextError> {
        let full_box = FullBox::new(input)?;
        let item_id = if full_box.version == 0 {
            u32::from(be_u16.context(desc("item id (u16)")).parse_next(input)?)
        } else {
            be_u32.context(desc("item id (u32)")).parse_next(input)?
        };
        Ok(Self { item_id })
    }
}

/// `iinf`: the list of items.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemInfoBox {
    pub item_infos: Vec<ItemInfoEntry>,
}

impl ItemInfoBox {
    pub fn new(input: &mut &[u8]) -> ModalResult<Self, ContextError> {
        let full_box = FullBox::new(input)?;

        // depending on the version number, grab entry count as u16 or u32
        let entry_count: u32 = match full_box.version {
            0 => u32::from(be_u16.context(desc("entry count (u16)")).parse_next(input)?),
            _ => be_u32.context(desc("entry count (u32)")).parse_next(input)?,
        };

        let mut item_infos = Vec::with_capacity((entry_count as usize).min(input.len() / 8));
        for (header, mut payload) in children(*input) {
            if header.box_type != BoxType::Id(*b"infe") {
                log::trace!("Skipping `{:?}` inside `iinf`.", header.box_type);
                continue;
            }

            match ItemInfoEntry::new(&mut payload) {
                Ok(entry) => item_infos.push(entry),
                Err(e) => log::warn!("Skipping a malformed `infe` box. err: {e}"),
            }
        }
        *input = &[];

        if item_infos.len() != entry_count as usize {
            log::warn!(
                "`iinf` declared `{entry_count}` entries, but `{}` were readable.",
                item_infos.len()
            );
        }

        Ok(Self { item_infos })
    }
}

/// An `infe` box, describing one item.
///
/// Versions 0 and 1 only name content by MIME type. Versions 2 and 3 add a
/// four-character item type, where `mime` items also carry a content type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemInfoEntry {
    pub version: u8,
    pub item_id: u32,
    pub item_protection_index: u16,

    /// Versions 2 and 3 only.
    pub item_type: Option<[u8; 4]>,
    pub item_name: Option<String>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,

    /// `uri ` items only.
    pub item_uri_type: Option<String>,
}

impl ItemInfoEntry {
    pub fn new(input: &mut &[u8]) -> ModalResult<Self, ContextError> {
        let full_box = FullBox::new(input)?;
        let version = full_box.version;
        log::trace!("ItemInfoEntry is version `{version}`.");

        let item_id: u32 = match version {
            0..=2 => u32::from(be_u16.context(desc("item id (u16)")).parse_next(input)?),
            3 => be_u32.context(desc("item id (u32)")).parse_next(input)?,
            other => {
                log::error!("Unsupported `infe` version: `{other}`");
                return fail.context(desc("supported infe version")).parse_next(input);
            }
        };

        let item_protection_index = be_u16
            .context(desc("item protection index"))
            .parse_next(input)?;

        let mut entry = Self {
            version,
            item_id,
            item_protection_index,
            ..Default::default()
        };

        // the strings are all optional at the end of the box
        let next_str = |input: &mut &[u8]| -> ModalResult<Option<String>, ContextError> {
            opt(parse_nul_terminated_str)
                .map(|s| s.map(ToString::to_string))
                .parse_next(input)
        };

        if version < 2 {
            entry.item_name = next_str(input)?;
            entry.content_type = next_str(input)?;
            entry.content_encoding = next_str(input)?;
            return Ok(entry);
        }

        let item_type = fourcc.context(desc("item type")).parse_next(input)?;
        entry.item_type = Some(item_type);
        entry.item_name = next_str(input)?;

        match &item_type {
            b"mime" => {
                entry.content_type = next_str(input)?;
                entry.content_encoding = next_str(input)?;
            }
            b"uri " => entry.item_uri_type = next_str(input)?,
            _ => (),
        }

        Ok(entry)
    }

    pub fn is_type(&self, ty: &[u8; 4]) -> bool {
        self.item_type.as_ref() == Some(ty)
    }
}

/// Where an item's bytes come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructionMethod {
    /// Absolute file offsets.
    File,

    /// Offsets into the `meta` box's `idat`.
    Idat,

    /// Offsets into another item.
    Item,
}

/// `iloc`: where each item's bytes are.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemLocationBox {
    pub version: u8,
    pub items: Vec<ItemLocationEntry>,
}

/// Field widths, in bytes, read from the start of an `iloc` box.
#[derive(Clone, Copy, Debug)]
struct FieldSizes {
    offset: u8,
    length: u8,
    base_offset: u8,
    index: u8,
}

impl ItemLocationBox {
    pub fn new(input: &mut &[u8]) -> ModalResult<Self, ContextError> {
        let full_box = FullBox::new(input)?;
        let version = full_box.version;

        let bits: u16 = be_u16.context(desc("field sizes")).parse_next(input)?;
        let sizes = FieldSizes {
            offset: ((bits >> 12) & 0xF) as u8,
            length: ((bits >> 8) & 0xF) as u8,
            base_offset: ((bits >> 4) & 0xF) as u8,
            index: if version == 1 || version == 2 {
                (bits & 0xF) as u8
            } else {
                0
            },
        };

        for (name, size) in [
            ("offset", sizes.offset),
            ("length", sizes.length),
            ("base offset", sizes.base_offset),
            ("index", sizes.index),
        ] {
            if ![0, 1, 2, 4, 8].contains(&size) {
                log::error!("`iloc` {name} size is a weird value: `{size}`");
                return fail.context(desc("field size of 0, 1, 2, 4 or 8")).parse_next(input);
            }
        }

        let item_count: u32 = if version < 2 {
            u32::from(be_u16.context(desc("item count (u16)")).parse_next(input)?)
        } else {
            be_u32.context(desc("item count (u32)")).parse_next(input)?
        };

        let mut items = Vec::with_capacity((item_count as usize).min(input.len() / 4));
        for _ in 0..item_count {
            items.push(ItemLocationEntry::new(input, version, sizes)?);
        }

        Ok(Self { version, items })
    }

    pub fn find(&self, item_id: u32) -> Option<&ItemLocationEntry> {
        self.items.iter().find(|item| item.item_id == item_id)
    }
}

/// One item's location.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemLocationEntry {
    pub item_id: u32,
    pub construction_method: ConstructionMethod,
    pub data_reference_index: u16,
    pub base_offset: u64,
    pub extents: Vec<ItemExtent>,
}

impl ItemLocationEntry {
    fn new(input: &mut &[u8], version: u8, sizes: FieldSizes) -> ModalResult<Self, ContextError> {
        let item_id: u32 = if version < 2 {
            u32::from(be_u16.context(desc("item id (u16)")).parse_next(input)?)
        } else {
            be_u32.context(desc("item id (u32)")).parse_next(input)?
        };

        let construction_method = if version == 0 {
            ConstructionMethod::File
        } else {
            // 12 reserved bits, then the method
            let method = be_u16
                .context(desc("construction method"))
                .parse_next(input)?
                & 0xF;
            match method {
                0 => ConstructionMethod::File,
                1 => ConstructionMethod::Idat,
                2 => ConstructionMethod::Item,
                _ => {
                    return fail
                        .context(desc("construction method of at most 2"))
                        .parse_next(input);
                }
            }
        };

        let data_reference_index = be_u16
            .context(desc("data reference index"))
            .parse_next(input)?;

        let base_offset = sized_uint(sizes.base_offset)
            .context(desc("base offset"))
            .parse_next(input)?;

        let extent_count: u16 = be_u16.context(desc("extent count")).parse_next(input)?;

        let mut extents = Vec::with_capacity(extent_count.into());
        for _ in 0..extent_count {
            let extent_index = if sizes.index > 0 {
                Some(
                    sized_uint(sizes.index)
                        .context(desc("extent index"))
                        .parse_next(input)?,
                )
            } else {
                None
            };

            extents.push(ItemExtent {
                extent_index,
                extent_offset: sized_uint(sizes.offset)
                    .context(desc("extent offset"))
                    .parse_next(input)?,
                extent_length: sized_uint(sizes.length)
                    .context(desc("extent length"))
                    .parse_next(input)?,
            });
        }

        Ok(Self {
            item_id,
            construction_method,
            data_reference_index,
            base_offset,
            extents,
        })
    }
}

/// An extent on an item.
///
/// A length of zero means "to the end of the file".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemExtent {
    pub extent_index: Option<u64>,
    pub extent_offset: u64,
    pub extent_length: u64,
}

/// Reads a big-endian unsigned integer `size` bytes wide.
///
/// A size of zero reads nothing and gives `0`.
fn sized_uint<'input>(size: u8) -> impl FnMut(&mut &'input [u8]) -> ModalResult<u64, ContextError> {
    move |input: &mut &'input [u8]| {
        take(size)
            .map(|slice: &[u8]| {
                slice
                    .iter()
                    .fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte))
            })
            .parse_next(input)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        ConstructionMethod, ItemExtent, ItemInfoBox, ItemInfoEntry, ItemLocationBox,
        PrimaryItemBox,
    };
    use crate::{providers::heif::boxes::tests::full_box, util::logger};

    /// An `infe` box (v2) with the given id, type and name.
    pub(crate) fn infe(id: u16, ty: &[u8; 4], name: &str, content_type: Option<&str>) -> Vec<u8> {
        let mut body = id.to_be_bytes().to_vec();
        body.extend_from_slice(&[0, 0]);
        body.extend_from_slice(ty);
        body.extend_from_slice(name.as_bytes());
        body.push(0);
        if let Some(ct) = content_type {
            body.extend_from_slice(ct.as_bytes());
            body.extend_from_slice(&[0, 0]);
        }
        full_box(b"infe", 2, &body)
    }

    /// Strips the box header, as the parsers expect.
    fn payload(bytes: &[u8]) -> &[u8] {
        &bytes[8..]
    }

    #[test]
    fn primary_item() {
        logger();
        let v0 = full_box(b"pitm", 0, &[0, 7]);
        assert_eq!(
            PrimaryItemBox::new(&mut payload(&v0)).unwrap(),
            PrimaryItemBox { item_id: 7 }
        );

        let v1 = full_box(b"pitm", 1, &[0, 1, 0, 0]);
        assert_eq!(
            PrimaryItemBox::new(&mut payload(&v1)).unwrap().item_id,
            0x1_0000
        );
    }

    #[test]
    fn item_info_versions() {
        logger();
        let mut entries = 3_u16.to_be_bytes().to_vec();
        entries.extend(infe(1, b"av01", "", None));
        entries.extend(infe(2, b"mime", "XMP", Some("application/rdf+xml")));

        // v0: id, protection index, then name and content type
        let mut v0 = vec![0, 3, 0, 0];
        v0.extend_from_slice(b"thumb\0image/jpeg\0\0");
        entries.extend(full_box(b"infe", 0, &v0));

        let iinf = full_box(b"iinf", 0, &entries);
        let ItemInfoBox { item_infos } = ItemInfoBox::new(&mut payload(&iinf)).unwrap();
        assert_eq!(item_infos.len(), 3);

        assert!(item_infos[0].is_type(b"av01"));
        assert_eq!(item_infos[0].item_name.as_deref(), Some(""));

        assert_eq!(item_infos[1].item_id, 2);
        assert_eq!(item_infos[1].item_name.as_deref(), Some("XMP"));
        assert_eq!(
            item_infos[1].content_type.as_deref(),
            Some("application/rdf+xml")
        );
        assert_eq!(item_infos[1].content_encoding.as_deref(), Some(""));

        assert_eq!(
            item_infos[2],
            ItemInfoEntry {
                version: 0,
                item_id: 3,
                item_name: Some("thumb".into()),
                content_type: Some("image/jpeg".into()),
                content_encoding: Some("".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn item_locations() {
        logger();
        // v1: offset 4, length 4, base offset 0, index 0
        let mut body = vec![0x44, 0x00];
        body.extend_from_slice(&2_u16.to_be_bytes());

        // item 1: file offsets, two extents
        body.extend_from_slice(&[0, 1, 0, 0, 0, 0, 0, 2]);
        body.extend_from_slice(&[0, 0, 0, 100, 0, 0, 0, 10]);
        body.extend_from_slice(&[0, 0, 0, 200, 0, 0, 0, 20]);

        // item 2: idat
        body.extend_from_slice(&[0, 2, 0, 1, 0, 0, 0, 1]);
        body.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 4]);

        let iloc = full_box(b"iloc", 1, &body);
        let iloc = ItemLocationBox::new(&mut payload(&iloc)).unwrap();
        assert_eq!(iloc.items.len(), 2);

        let first = iloc.find(1).unwrap();
        assert_eq!(first.construction_method, ConstructionMethod::File);
        assert_eq!(
            first.extents,
            [
                ItemExtent {
                    extent_index: None,
                    extent_offset: 100,
                    extent_length: 10
                },
                ItemExtent {
                    extent_index: None,
                    extent_offset: 200,
                    extent_length: 20
                },
            ]
        );
        assert_eq!(iloc.find(2).unwrap().construction_method, ConstructionMethod::Idat);
        assert!(iloc.find(3).is_none());
    }

    #[test]
    fn item_location_v0_with_base_offset() {
        logger();
        // offset 4, length 2, base offset 8
        let mut body = vec![0x42, 0x80];
        body.extend_from_slice(&1_u16.to_be_bytes());
        body.extend_from_slice(&[0, 9, 0, 0]);
        body.extend_from_slice(&1000_u64.to_be_bytes());
        body.extend_from_slice(&[0, 1, 0, 0, 0, 5, 0, 3]);

        let iloc = full_box(b"iloc", 0, &body);
        let iloc = ItemLocationBox::new(&mut payload(&iloc)).unwrap();
        let item = iloc.find(9).unwrap();
        assert_eq!(item.base_offset, 1000);
        assert_eq!(item.extents[0].extent_offset, 5);
        assert_eq!(item.extents[0].extent_length, 3);
    }

    #[test]
    fn weird_field_sizes_fail() {
        logger();
        let mut body = vec![0x34, 0x00];
        body.extend_from_slice(&0_u16.to_be_bytes());
        let iloc = full_box(b"iloc", 0, &body);
        assert!(ItemLocationBox::new(&mut payload(&iloc)).is_err());
    }
}
