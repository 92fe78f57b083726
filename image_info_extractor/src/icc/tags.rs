//! ICC tag types and their decoders.
//!
//! Every decoder receives a cursor over exactly one tag's data, starting at
//! its four-byte type signature. Offsets inside a tag (like `mluc` string
//! offsets) are relative to that start.

use chrono::{DateTime, NaiveDate, Utc};
use rustc_hash::FxHashMap;

use crate::cursor::ByteCursor;

/// Reads one tag's data. `None` means the data was malformed.
pub type IccDecoder = fn(&ByteCursor<'_>) -> Option<IccTagValue>;

/// A decoded tag.
#[derive(Clone, Debug, PartialEq)]
pub enum IccTagValue {
    /// `desc`, `mluc` (first record), `text`, and text `data`.
    Text(String),

    /// `sig `: a four-character signature.
    Signature(String),

    /// `curv`: an empty list means identity, one entry is a gamma.
    Curve(Vec<u16>),

    /// `para`
    ParametricCurve { function_type: u16, parameters: Vec<f64> },

    /// `XYZ `: the first XYZ triple.
    Xyz([f64; 3]),

    /// `dtim`. `None` if the stored fields don't form a date.
    DateTime(Option<DateTime<Utc>>),

    /// `meas`
    Measurement(Measurement),

    /// `clro`: colorant indices, in printing order.
    ColorantOrder(Vec<u8>),

    /// `clrt`
    ColorantTable(Vec<Colorant>),

    /// `chrm`: `(x, y)` per channel.
    Chromaticity {
        colorant_type: u16,
        channels: Vec<(f64, f64)>,
    },

    /// `cicp`: coding-independent code points.
    Cicp {
        color_primaries: u8,
        transfer_characteristics: u8,
        matrix_coefficients: u8,
        video_full_range: bool,
    },

    /// `dict`
    Dict(Vec<DictEntry>),

    /// `mft1` and `mft2`
    Lut(Lut),

    /// `view`
    ViewingConditions {
        illuminant: [f64; 3],
        surround: [f64; 3],
        illuminant_type: u32,
    },

    /// Binary `data`.
    Data(Vec<u8>),

    /// `sf32` and `uf32`
    Reals(Vec<f64>),

    /// `ui08`
    U8s(Vec<u8>),
    /// `ui16`
    U16s(Vec<u16>),
    /// `ui32`
    U32s(Vec<u32>),
    /// `ui64`
    U64s(Vec<u64>),
}

impl IccTagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Signature(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub standard_observer: u32,
    pub backing: [f64; 3],
    pub geometry: u32,
    pub flare: f64,
    pub standard_illuminant: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Colorant {
    pub name: String,
    pub pcs_values: [u16; 3],
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DictEntry {
    pub name: String,
    pub value: String,
    pub display_name: Option<String>,
    pub display_value: Option<String>,
}

/// A lookup-table transform. `mft1` entries are widened to `u16`.
#[derive(Clone, Debug, PartialEq)]
pub struct Lut {
    pub input_channels: u8,
    pub output_channels: u8,
    pub grid_points: u8,
    pub matrix: [f64; 9],
    pub input_entries: u16,
    pub output_entries: u16,
    pub input_tables: Vec<u16>,
    pub clut: Vec<u16>,
    pub output_tables: Vec<u16>,
}

/// Tag type signature to decoder.
///
/// A `None` decoder marks a type that's known but not implemented. Those
/// tags are skipped with a warning, as are tags of unknown types.
#[derive(Clone, Debug)]
pub struct IccTypeDecoders(FxHashMap<[u8; 4], Option<IccDecoder>>);

impl Default for IccTypeDecoders {
    fn default() -> Self {
        let decoders: [([u8; 4], Option<IccDecoder>); 31] = [
            (*b"desc", Some(text_description)),
            (*b"chrm", Some(chromaticity)),
            (*b"cicp", Some(cicp)),
            (*b"clro", Some(colorant_order)),
            (*b"clrt", Some(colorant_table)),
            (*b"curv", Some(curve)),
            (*b"data", Some(data)),
            (*b"dtim", Some(date_time)),
            (*b"dict", Some(dict)),
            (*b"mft2", Some(lut16)),
            (*b"mft1", Some(lut8)),
            (*b"mAB ", None),
            (*b"mBA ", None),
            (*b"meas", Some(measurement)),
            (*b"mluc", Some(multi_localized_unicode)),
            (*b"mpet", None),
            (*b"ncl2", None),
            (*b"para", Some(parametric_curve)),
            (*b"pseq", None),
            (*b"psid", None),
            (*b"rcs2", None),
            (*b"sf32", Some(s15_fixed16_array)),
            (*b"sig ", Some(signature)),
            (*b"text", Some(text)),
            (*b"uf32", Some(u16_fixed16_array)),
            (*b"ui08", Some(u8_array)),
            (*b"ui16", Some(u16_array)),
            (*b"ui32", Some(u32_array)),
            (*b"ui64", Some(u64_array)),
            (*b"view", Some(viewing_conditions)),
            (*b"XYZ ", Some(xyz_type)),
        ];
        Self(decoders.into_iter().collect())
    }
}

impl IccTypeDecoders {
    /// A table that decodes nothing.
    pub fn empty() -> Self {
        Self(FxHashMap::default())
    }

    /// Looks up a type.
    ///
    /// The outer `Option` says whether the type is known at all. The inner
    /// one says whether it's implemented.
    pub fn get(&self, ty: &[u8; 4]) -> Option<Option<IccDecoder>> {
        self.0.get(ty).copied()
    }

    /// Adds (or replaces) a decoder. Pass `None` to mark the type as known
    /// but unimplemented.
    pub fn insert(&mut self, ty: [u8; 4], decoder: Option<IccDecoder>) {
        self.0.insert(ty, decoder);
    }

    pub fn with(mut self, ty: [u8; 4], decoder: Option<IccDecoder>) -> Self {
        self.insert(ty, decoder);
        self
    }
}

//
// number readers
//

fn s15_fixed16(c: &ByteCursor<'_>, off: usize) -> Option<f64> {
    Some(f64::from(c.i32_at(off)?) / 65536.0)
}

fn u16_fixed16(c: &ByteCursor<'_>, off: usize) -> Option<f64> {
    Some(f64::from(c.u32_at(off)?) / 65536.0)
}

fn xyz_number(c: &ByteCursor<'_>, off: usize) -> Option<[f64; 3]> {
    Some([
        s15_fixed16(c, off)?,
        s15_fixed16(c, off + 4)?,
        s15_fixed16(c, off + 8)?,
    ])
}

/// Six big-endian `u16`s: year, month, day, hours, minutes, seconds.
pub(super) fn date_time_number(c: &ByteCursor<'_>, off: usize) -> Option<Option<DateTime<Utc>>> {
    let mut fields = [0_u16; 6];
    for (i, field) in fields.iter_mut().enumerate() {
        *field = c.u16_at(off + i * 2)?;
    }
    let [year, month, day, hour, minute, second] = fields.map(u32::from);

    Some(
        NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .map(|naive| naive.and_utc()),
    )
}

/// Reads `count` fixed-width items starting at `start`.
///
/// Checks the whole run against the tag's length first, so a bogus count
/// can't cause a huge allocation.
fn array<T>(
    c: &ByteCursor<'_>,
    start: usize,
    count: usize,
    width: usize,
    read: impl Fn(usize) -> Option<T>,
) -> Option<Vec<T>> {
    let end = start.checked_add(count.checked_mul(width)?)?;
    if end > c.len() {
        log::warn!(
            "ICC array of `{count}` items runs past its tag. tag len: `{}`",
            c.len()
        );
        return None;
    }
    (0..count).map(|i| read(start + i * width)).collect()
}

/// Items filling the rest of the tag after an 8-byte type header.
fn trailing_count(c: &ByteCursor<'_>, width: usize) -> usize {
    c.len().saturating_sub(8) / width
}

/// Latin-1 text with trailing NULs removed.
fn strip_nuls(c: &ByteCursor<'_>, off: usize, len: usize) -> Option<String> {
    let raw = c.bytes_at(off, len)?;
    let end = raw.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    Some(crate::commons::latin1(&raw[..end]))
}

fn utf16_strip_nuls(c: &ByteCursor<'_>, off: usize, len: usize) -> Option<String> {
    Some(c.utf16be_at(off, len)?.trim_end_matches('\0').to_string())
}

//
// decoders
//

/// `desc`: the ASCII description, falling back to the Unicode or
/// ScriptCode ones when it's empty.
fn text_description(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    let ascii_len = c.u32_at(8)? as usize;
    let ascii = strip_nuls(c, 12, ascii_len)?;

    let unicode_at = 12 + ascii_len;
    let unicode_len = c.u32_at(unicode_at + 4).map_or(0, |n| n as usize * 2);
    let unicode = utf16_strip_nuls(c, unicode_at + 8, unicode_len).unwrap_or_default();

    let script_at = unicode_at + 8 + unicode_len;
    let script = c
        .u8_at(script_at + 2)
        .and_then(|len| strip_nuls(c, script_at + 3, usize::from(len)))
        .unwrap_or_default();

    Some(IccTagValue::Text(
        [ascii, unicode, script]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_default(),
    ))
}

fn chromaticity(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    let count = usize::from(c.u16_at(8)?);
    let colorant_type = c.u16_at(10)?;
    let channels = array(c, 12, count, 8, |off| {
        Some((u16_fixed16(c, off)?, u16_fixed16(c, off + 4)?))
    })?;
    Some(IccTagValue::Chromaticity {
        colorant_type,
        channels,
    })
}

fn cicp(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    Some(IccTagValue::Cicp {
        color_primaries: c.u8_at(8)?,
        transfer_characteristics: c.u8_at(9)?,
        matrix_coefficients: c.u8_at(10)?,
        video_full_range: c.u8_at(11)? != 0,
    })
}

fn colorant_order(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    let count = c.u32_at(8)? as usize;
    Some(IccTagValue::ColorantOrder(c.bytes_at(12, count)?.to_vec()))
}

fn colorant_table(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    let count = c.u32_at(8)? as usize;
    array(c, 12, count, 38, |off| {
        Some(Colorant {
            name: strip_nuls(c, off, 32)?,
            pcs_values: [c.u16_at(off + 32)?, c.u16_at(off + 34)?, c.u16_at(off + 36)?],
        })
    })
    .map(IccTagValue::ColorantTable)
}

fn curve(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    let count = c.u32_at(8)? as usize;
    array(c, 12, count, 2, |off| c.u16_at(off)).map(IccTagValue::Curve)
}

fn data(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    let flag = c.u32_at(8)?;
    let rest = c.slice(12, c.len())?;
    Some(match flag {
        0 => IccTagValue::Text(crate::commons::latin1(rest)),
        _ => IccTagValue::Data(rest.to_vec()),
    })
}

fn date_time(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    date_time_number(c, 8).map(IccTagValue::DateTime)
}

fn dict(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    let count = c.u32_at(8)? as usize;
    let record_size = c.u32_at(12)? as usize;
    if !matches!(record_size, 16 | 24 | 32) {
        log::warn!("Invalid ICC `dict` record size: `{record_size}`");
        return None;
    }

    // a position is an (offset, length) pair, where zero length means absent
    let string_at = |pos: usize| -> Option<Option<String>> {
        let offset = c.u32_at(pos)? as usize;
        let len = c.u32_at(pos + 4)? as usize;
        if len == 0 {
            return Some(None);
        }
        utf16_strip_nuls(c, offset, len).map(Some)
    };

    array(c, 16, count, record_size, |rec| {
        Some(DictEntry {
            name: string_at(rec)?.unwrap_or_default(),
            value: string_at(rec + 8)?.unwrap_or_default(),
            display_name: if record_size >= 24 { string_at(rec + 16)? } else { None },
            display_value: if record_size >= 32 { string_at(rec + 24)? } else { None },
        })
    })
    .map(IccTagValue::Dict)
}

/// The shared layout of `mft1` and `mft2`.
fn lut(
    c: &ByteCursor<'_>,
    entries: Option<(u16, u16)>,
    width: usize,
    read: impl Fn(usize) -> Option<u16>,
) -> Option<IccTagValue> {
    let input_channels = c.u8_at(8)?;
    let output_channels = c.u8_at(9)?;
    let grid_points = c.u8_at(10)?;

    let mut matrix = [0.0; 9];
    for (i, m) in matrix.iter_mut().enumerate() {
        *m = s15_fixed16(c, 12 + i * 4)?;
    }

    let ((input_entries, output_entries), tables_at) = match entries {
        Some(fixed) => (fixed, 48),
        None => ((c.u16_at(48)?, c.u16_at(50)?), 52),
    };

    let input_len = usize::from(input_channels) * usize::from(input_entries);
    let clut_len = usize::from(grid_points)
        .checked_pow(u32::from(input_channels))?
        .checked_mul(usize::from(output_channels))?;
    let output_len = usize::from(output_channels) * usize::from(output_entries);

    let input_tables = array(c, tables_at, input_len, width, &read)?;
    let clut_at = tables_at + input_len * width;
    let clut = array(c, clut_at, clut_len, width, &read)?;
    let output_tables = array(c, clut_at + clut_len * width, output_len, width, &read)?;

    Some(IccTagValue::Lut(Lut {
        input_channels,
        output_channels,
        grid_points,
        matrix,
        input_entries,
        output_entries,
        input_tables,
        clut,
        output_tables,
    }))
}

fn lut16(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    lut(c, None, 2, |off| c.u16_at(off))
}

fn lut8(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    lut(c, Some((256, 256)), 1, |off| c.u8_at(off).map(u16::from))
}

fn measurement_at(c: &ByteCursor<'_>, off: usize) -> Option<Measurement> {
    Some(Measurement {
        standard_observer: c.u32_at(off)?,
        backing: xyz_number(c, off + 4)?,
        geometry: c.u32_at(off + 16)?,
        flare: u16_fixed16(c, off + 20)?,
        standard_illuminant: c.u32_at(off + 24)?,
    })
}

fn measurement(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    measurement_at(c, 8).map(IccTagValue::Measurement)
}

/// `mluc`: only the first record's text is kept.
fn multi_localized_unicode(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    let count = c.u32_at(8)?;
    let record_size = c.u32_at(12)?;
    if record_size != 12 {
        log::warn!("Invalid ICC `mluc` record size: `{record_size}`");
        return None;
    }
    if count == 0 {
        return Some(IccTagValue::Text(String::new()));
    }

    let len = c.u32_at(20)? as usize;
    let offset = c.u32_at(24)? as usize;
    utf16_strip_nuls(c, offset, len).map(IccTagValue::Text)
}

fn parametric_curve(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    let function_type = c.u16_at(8)?;
    let count = match function_type {
        0 => 1,
        1 => 3,
        2 => 4,
        3 => 5,
        4 => 7,
        other => {
            log::warn!("Unknown ICC parametric curve function type: `{other}`");
            return None;
        }
    };
    let parameters = array(c, 12, count, 4, |off| s15_fixed16(c, off))?;
    Some(IccTagValue::ParametricCurve {
        function_type,
        parameters,
    })
}

fn s15_fixed16_array(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    array(c, 8, trailing_count(c, 4), 4, |off| s15_fixed16(c, off)).map(IccTagValue::Reals)
}

fn signature(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    c.latin1_at(8, 4).map(IccTagValue::Signature)
}

fn text(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    strip_nuls(c, 8, c.len().saturating_sub(8)).map(IccTagValue::Text)
}

fn u16_fixed16_array(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    array(c, 8, trailing_count(c, 4), 4, |off| u16_fixed16(c, off)).map(IccTagValue::Reals)
}

fn u8_array(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    c.slice(8, c.len()).map(|b| IccTagValue::U8s(b.to_vec()))
}

fn u16_array(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    array(c, 8, trailing_count(c, 2), 2, |off| c.u16_at(off)).map(IccTagValue::U16s)
}

fn u32_array(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    array(c, 8, trailing_count(c, 4), 4, |off| c.u32_at(off)).map(IccTagValue::U32s)
}

fn u64_array(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    array(c, 8, trailing_count(c, 8), 8, |off| c.u64_at(off)).map(IccTagValue::U64s)
}

fn viewing_conditions(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    Some(IccTagValue::ViewingConditions {
        illuminant: xyz_number(c, 8)?,
        surround: xyz_number(c, 20)?,
        illuminant_type: c.u32_at(32)?,
    })
}

fn xyz_type(c: &ByteCursor<'_>) -> Option<IccTagValue> {
    xyz_number(c, 8).map(IccTagValue::Xyz)
}

#[cfg(test)]
mod tests {
    use super::{IccTagValue, IccTypeDecoders};
    use crate::{cursor::ByteCursor, util::logger};

    fn decode(tag: &[u8]) -> Option<IccTagValue> {
        let ty: [u8; 4] = tag[..4].try_into().unwrap();
        let decoder = IccTypeDecoders::default().get(&ty).flatten().unwrap();
        decoder(&ByteCursor::be(tag))
    }

    fn header(ty: &[u8; 4]) -> Vec<u8> {
        let mut b = ty.to_vec();
        b.extend_from_slice(&[0; 4]);
        b
    }

    #[test]
    fn xyz_and_curves() {
        logger();
        let mut xyz = header(b"XYZ ");
        for v in [0x0000_F6D6_u32, 0x0001_0000, 0x0000_D32D] {
            xyz.extend_from_slice(&v.to_be_bytes());
        }
        let Some(IccTagValue::Xyz([x, y, z])) = decode(&xyz) else {
            panic!("expected XYZ");
        };
        assert!((x - 0.9642).abs() < 1e-4);
        assert_eq!(y, 1.0);
        assert!((z - 0.8249).abs() < 1e-4);

        let mut curv = header(b"curv");
        curv.extend_from_slice(&1_u32.to_be_bytes());
        curv.extend_from_slice(&0x0233_u16.to_be_bytes());
        assert_eq!(decode(&curv), Some(IccTagValue::Curve(vec![0x0233])));

        let mut para = header(b"para");
        para.extend_from_slice(&[0, 0, 0, 0]);
        para.extend_from_slice(&0x0002_6666_u32.to_be_bytes());
        let Some(IccTagValue::ParametricCurve { function_type, parameters }) = decode(&para) else {
            panic!("expected para");
        };
        assert_eq!(function_type, 0);
        assert!((parameters[0] - 2.4).abs() < 1e-4);
    }

    #[test]
    fn mluc_first_record() {
        logger();
        let mut mluc = header(b"mluc");
        mluc.extend_from_slice(&1_u32.to_be_bytes());
        mluc.extend_from_slice(&12_u32.to_be_bytes());
        mluc.extend_from_slice(b"enUS");
        mluc.extend_from_slice(&8_u32.to_be_bytes());
        mluc.extend_from_slice(&28_u32.to_be_bytes());
        mluc.extend_from_slice(&[0, b's', 0, b'R', 0, b'G', 0, b'B']);
        assert_eq!(decode(&mluc), Some(IccTagValue::Text("sRGB".into())));

        // record size must be 12
        mluc[15] = 16;
        assert_eq!(decode(&mluc), None);
    }

    #[test]
    fn v2_description() {
        logger();
        let mut desc = header(b"desc");
        desc.extend_from_slice(&5_u32.to_be_bytes());
        desc.extend_from_slice(b"sRGB\0");
        assert_eq!(decode(&desc), Some(IccTagValue::Text("sRGB".into())));
    }

    #[test]
    fn bogus_counts_fail_without_allocating() {
        logger();
        let mut curv = header(b"curv");
        curv.extend_from_slice(&u32::MAX.to_be_bytes());
        assert_eq!(decode(&curv), None);
    }

    #[test]
    fn cicp_reads_each_field() {
        logger();
        let mut tag = header(b"cicp");
        tag.extend_from_slice(&[9, 16, 0, 1]);
        assert_eq!(
            decode(&tag),
            Some(IccTagValue::Cicp {
                color_primaries: 9,
                transfer_characteristics: 16,
                matrix_coefficients: 0,
                video_full_range: true
            })
        );
    }
}
