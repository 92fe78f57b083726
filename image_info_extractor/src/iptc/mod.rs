//! IPTC-IIM, as found in a JPEG's Photoshop (APP13) segment.
//!
//! The block is a run of datasets. Each one is a `0x1C` marker, a record
//! number, a dataset number, a big-endian `u16` length, then the data.

use std::collections::BTreeMap;

use image_info_extractor_types::iptc::{IptcDatasets, IptcValueKind, record_name};

use crate::{commons::latin1, cursor::ByteCursor};

pub use self::error::IptcError;

mod error;

const TAG_MARKER: u8 = 0x1C;
const HEADER_LEN: usize = 5;

/// `ESC % G`, which switches text datasets to UTF-8.
const UTF8_CHARSET: &[u8] = b"\x1b%G";

/// A decoded dataset value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IptcValue {
    Text(String),
    Number(u32),
    Bytes(Vec<u8>),

    /// Every occurrence of a repeatable dataset, in order.
    List(Vec<IptcValue>),
}

impl IptcValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Dataset name to value, for one record.
pub type IptcRecord = BTreeMap<String, IptcValue>;

/// A parsed IPTC block, keyed by record name (`"Application"`, ...).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Iptc {
    pub records: BTreeMap<String, IptcRecord>,
}

impl Iptc {
    /// Grabs a single value, like `("Application", "ObjectName")`.
    pub fn get(&self, record: &str, dataset: &str) -> Option<&IptcValue> {
        self.records.get(record)?.get(dataset)
    }
}

/// Parses an IPTC block with the built-in dataset table.
pub fn parse(bytes: &[u8]) -> Result<Iptc, IptcError> {
    parse_with(bytes, &IptcDatasets::default())
}

/// Parses an IPTC block, naming datasets with the given table.
///
/// Datasets missing from the table are skipped.
pub fn parse_with(bytes: &[u8], datasets: &IptcDatasets) -> Result<Iptc, IptcError> {
    let cursor = ByteCursor::be(bytes);
    let mut iptc = Iptc::default();
    let mut utf8 = false;
    let mut offset = 0_usize;

    while offset < cursor.len() {
        let marker = cursor.u8_at(offset).ok_or(IptcError::Truncated {
            offset,
            len: cursor.len(),
        })?;
        if marker != TAG_MARKER {
            log::error!("IPTC dataset at `{offset}` has a bad marker: `{marker:#04x}`");
            return Err(IptcError::BadMarker {
                offset,
                found: marker,
            });
        }

        let (Some(record_no), Some(dataset_no), Some(len)) = (
            cursor.u8_at(offset + 1),
            cursor.u8_at(offset + 2),
            cursor.u16_at(offset + 3),
        ) else {
            log::error!("IPTC dataset header at `{offset}` is truncated.");
            return Err(IptcError::Truncated {
                offset,
                len: cursor.len(),
            });
        };
        let data_start = offset + HEADER_LEN;

        // extended datasets store the length of their length in the low bits
        if len & 0x8000 != 0 {
            let at = offset;
            let truncated = || {
                log::error!(
                    "Extended IPTC dataset `{record_no}:{dataset_no}` runs past the block's end."
                );
                IptcError::Truncated {
                    offset: at,
                    len: cursor.len(),
                }
            };

            let len_of_len = usize::from(len & 0x7FFF);
            if len_of_len > size_of::<usize>() {
                return Err(truncated());
            }
            let data_len = cursor
                .bytes_at(data_start, len_of_len)
                .map(|b| b.iter().fold(0_usize, |acc, b| (acc << 8) | usize::from(*b)))
                .ok_or_else(truncated)?;
            log::warn!(
                "Skipping extended IPTC dataset `{record_no}:{dataset_no}` \
                (`{data_len}` bytes)."
            );

            offset = (data_start + len_of_len)
                .checked_add(data_len)
                .filter(|end| *end <= cursor.len())
                .ok_or_else(truncated)?;
            continue;
        }

        let len = usize::from(len);
        let Some(data) = cursor.bytes_at(data_start, len) else {
            log::error!("IPTC dataset `{record_no}:{dataset_no}` runs past the block's end.");
            return Err(IptcError::Truncated {
                offset,
                len: cursor.len(),
            });
        };
        offset = data_start + len;

        if (record_no, dataset_no) == (1, 90) {
            utf8 = data == UTF8_CHARSET;
        }

        let Some(desc) = datasets.get(record_no, dataset_no) else {
            log::trace!("Skipping unknown IPTC dataset `{record_no}:{dataset_no}`.");
            continue;
        };

        let value = match desc.kind {
            IptcValueKind::String | IptcValueKind::Digits => IptcValue::Text(if utf8 {
                String::from_utf8_lossy(data).into_owned()
            } else {
                latin1(data)
            }),
            IptcValueKind::Undefined => IptcValue::Bytes(data.to_vec()),
            fixed @ (IptcValueKind::Uint8 | IptcValueKind::Uint16 | IptcValueKind::Uint32) => {
                let expected = fixed.fixed_len().unwrap_or_default();
                if len != expected {
                    log::error!(
                        "IPTC dataset `{}` has length `{len}`, expected `{expected}`.",
                        desc.name
                    );
                    return Err(IptcError::UnexpectedLength {
                        name: desc.name.to_string(),
                        expected,
                        found: len,
                    });
                }
                IptcValue::Number(data.iter().fold(0_u32, |acc, b| (acc << 8) | u32::from(*b)))
            }
        };

        let record_label = record_name(record_no)
            .map_or_else(|| record_no.to_string(), ToString::to_string);
        let record = iptc.records.entry(record_label).or_default();

        if desc.repeatable {
            match record
                .entry(desc.name.to_string())
                .or_insert_with(|| IptcValue::List(Vec::new()))
            {
                IptcValue::List(list) => list.push(value),
                other => *other = IptcValue::List(vec![value]),
            }
        } else {
            record.insert(desc.name.to_string(), value);
        }
    }

    Ok(iptc)
}
