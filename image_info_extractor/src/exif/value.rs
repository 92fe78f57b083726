use image_info_extractor_types::exif::{ifd::IfdGroup, primitives::PrimitiveTy};

use crate::cursor::ByteCursor;

/// A decoded Exif value.
///
/// Rationals are divided out into a single float. Arrays keep one numeric
/// variant per signedness.
#[derive(Clone, Debug, PartialEq)]
pub enum ExifValue {
    /// `ASCII`, with NULs removed and trailing whitespace trimmed.
    Text(String),

    /// `UNDEFINED`: opaque bytes.
    Bytes(Vec<u8>),

    /// `BYTE`, `SHORT` or `LONG`.
    Unsigned(u32),

    /// `SBYTE`, `SSHORT` or `SLONG`.
    Signed(i32),

    /// `RATIONAL`, `SRATIONAL`, `FLOAT` or `DOUBLE`.
    Real(f64),

    UnsignedList(Vec<u32>),
    SignedList(Vec<i32>),
    RealList(Vec<f64>),
}

impl ExifValue {
    /// The value as an unsigned integer, if it is one.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Self::Unsigned(n) => Some(n),
            Self::Signed(n) => u32::try_from(n).ok(),
            _ => None,
        }
    }

    /// The value as a float. Integers convert losslessly.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Unsigned(n) => Some(n.into()),
            Self::Signed(n) => Some(n.into()),
            Self::Real(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Every element as a float. Scalars become a one-element list.
    pub fn to_f64_list(&self) -> Option<Vec<f64>> {
        match self {
            Self::RealList(l) => Some(l.clone()),
            Self::UnsignedList(l) => Some(l.iter().map(|n| f64::from(*n)).collect()),
            Self::SignedList(l) => Some(l.iter().map(|n| f64::from(*n)).collect()),
            other => other.as_f64().map(|n| vec![n]),
        }
    }
}

/// One entry of an IFD.
#[derive(Clone, Debug, PartialEq)]
pub struct ExifField {
    pub tag: u16,

    /// The tag's name, or its ID as four uppercase hex digits.
    pub name: String,

    /// `None` when the type was unknown or the value lay out of bounds.
    pub value: Option<ExifValue>,
}

/// A parsed image file directory.
#[derive(Clone, Debug, PartialEq)]
pub struct Ifd {
    pub group: IfdGroup,
    pub fields: Vec<ExifField>,
}

impl Ifd {
    /// Finds a field by name.
    ///
    /// Returns `None` for both missing fields and fields without a value.
    pub fn get(&self, name: &str) -> Option<&ExifValue> {
        self.field(name)?.value.as_ref()
    }

    /// Finds a field by name, even if it has no value.
    pub fn field(&self, name: &str) -> Option<&ExifField> {
        self.fields.iter().rev().find(|f| f.name == name)
    }

    /// Finds a field by tag ID.
    pub fn get_by_tag(&self, tag: u16) -> Option<&ExifValue> {
        self.fields.iter().rev().find(|f| f.tag == tag)?.value.as_ref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Decodes the value of the 12-byte entry starting at `entry`.
///
/// Inline values sit in the entry's last four bytes. Larger ones are found
/// through an offset from the start of the Exif block.
pub(super) fn read_value(cursor: &ByteCursor<'_>, entry: usize) -> Option<ExifValue> {
    let raw_ty: u16 = cursor.u16_at(entry + 2)?;
    let Ok(ty) = PrimitiveTy::try_from(raw_ty) else {
        log::warn!("Unrecognized Exif field type: `{raw_ty}`");
        return None;
    };

    let count: u32 = cursor.u32_at(entry + 4)?;
    let size: usize = usize::from(ty.size_bytes()).checked_mul(count as usize)?;

    let value_offset: usize = if size <= 4 {
        entry + 8
    } else {
        cursor.u32_at(entry + 8)? as usize
    };

    let Some(payload) = cursor.bytes_at(value_offset, size) else {
        log::warn!(
            "Exif field value lies outside the block. \
            offset: `{value_offset}`, size: `{size}`, block len: `{}`",
            cursor.len()
        );
        return None;
    };
    let payload = cursor.sub(value_offset, value_offset + payload.len())?;

    match ty {
        PrimitiveTy::Ascii => payload.text_at(0, size).map(ExifValue::Text),
        PrimitiveTy::Undefined => Some(ExifValue::Bytes(payload.bytes().to_vec())),
        _ => decode_numbers(&payload, ty, count as usize),
    }
}

fn decode_numbers(payload: &ByteCursor<'_>, ty: PrimitiveTy, count: usize) -> Option<ExifValue> {
    let step = usize::from(ty.size_bytes());
    let offsets = (0..count).map(|i| i * step);

    macro_rules! collect {
        ($variant:ident, $list:ident, $read:expr) => {{
            let list: Vec<_> = offsets.map($read).collect::<Option<_>>()?;
            if let [single] = list.as_slice() {
                ExifValue::$variant(*single)
            } else {
                ExifValue::$list(list)
            }
        }};
    }

    Some(match ty {
        PrimitiveTy::Byte => collect!(Unsigned, UnsignedList, |o| payload.u8_at(o).map(u32::from)),
        PrimitiveTy::Short => {
            collect!(Unsigned, UnsignedList, |o| payload.u16_at(o).map(u32::from))
        }
        PrimitiveTy::Long => collect!(Unsigned, UnsignedList, |o| payload.u32_at(o)),
        PrimitiveTy::SByte => collect!(Signed, SignedList, |o| payload.i8_at(o).map(i32::from)),
        PrimitiveTy::SShort => collect!(Signed, SignedList, |o| payload.i16_at(o).map(i32::from)),
        PrimitiveTy::SLong => collect!(Signed, SignedList, |o| payload.i32_at(o)),
        PrimitiveTy::Rational => collect!(Real, RealList, |o| {
            Some(f64::from(payload.u32_at(o)?) / f64::from(payload.u32_at(o + 4)?))
        }),
        PrimitiveTy::SRational => collect!(Real, RealList, |o| {
            Some(f64::from(payload.i32_at(o)?) / f64::from(payload.i32_at(o + 4)?))
        }),
        PrimitiveTy::Float => collect!(Real, RealList, |o| payload.f32_at(o).map(f64::from)),
        PrimitiveTy::Double => collect!(Real, RealList, |o| payload.f64_at(o)),
        PrimitiveTy::Ascii | PrimitiveTy::Undefined => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::{ExifValue, read_value};
    use crate::{cursor::ByteCursor, util::logger};

    #[test]
    fn inline_short_array() {
        logger();
        // tag 0x0102 (BitsPerSample), SHORT x2, inline [8, 8]
        let entry = [0x02, 0x01, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00, 0x08, 0x00, 0x08, 0x00];
        let value = read_value(&ByteCursor::le(&entry), 0);
        assert_eq!(value, Some(ExifValue::UnsignedList(vec![8, 8])));
    }

    #[test]
    fn rational_through_offset() {
        logger();
        let mut blob = vec![0x9D, 0x82, 0x05, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00];
        blob.extend_from_slice(&[28, 0, 0, 0, 10, 0, 0, 0]);
        let value = read_value(&ByteCursor::le(&blob), 0);
        assert_eq!(value, Some(ExifValue::Real(2.8)));
    }

    #[test]
    fn unknown_type_is_none() {
        logger();
        let entry = [0x00, 0x01, 0x0D, 0x00, 0x01, 0x00, 0x00, 0x00, 0, 0, 0, 0];
        assert_eq!(read_value(&ByteCursor::le(&entry), 0), None);
    }
}
