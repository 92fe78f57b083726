//! Value types for XMP properties.
//!
//! XMP stores everything as text. A handful of well-known properties carry
//! numbers, dates, or binary blobs, though, and the parser uses the table in
//! this module to coerce them.
//!
//! Keys are qualified names (`prefix:LocalName`), like `exif:FNumber`.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

pub mod tags;
pub mod vendor;

/// How a registered XMP property should be coerced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum XmpValueKind {
    /// `integer`: leading decimal digits, like `parseInt`.
    Integer,
    /// `integer[]`
    IntegerList,
    /// `boolean`: `True` or `False`.
    Boolean,
    /// `boolean[]`
    BooleanList,
    /// `real`: a floating-point number.
    Real,
    /// `real[]`
    RealList,
    /// `rational`: an `n/d` string.
    Rational,
    /// `rational[]`
    RationalList,
    /// `Date`: ISO 8601, or an Exif-style `YYYY:MM:DD hh:mm:ss` string.
    Date,
    /// `Date[]`
    DateList,
    /// `GPSCoordinate`: `D,M,S[NSEW]`, `D,M.m[NSEW]`, or a rational triple.
    GpsCoordinate,
    /// `base64`: binary data.
    Base64,
}

impl XmpValueKind {
    /// Parses the type names used by XMP tag tables (`"rational[]"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "integer" => Self::Integer,
            "integer[]" => Self::IntegerList,
            "boolean" => Self::Boolean,
            "boolean[]" => Self::BooleanList,
            "real" => Self::Real,
            "real[]" => Self::RealList,
            "rational" => Self::Rational,
            "rational[]" => Self::RationalList,
            "Date" => Self::Date,
            "Date[]" => Self::DateList,
            "GPSCoordinate" => Self::GpsCoordinate,
            "base64" => Self::Base64,
            _ => return None,
        })
    }

    /// The list form's element kind, if this is a list kind.
    pub const fn element(&self) -> Option<Self> {
        match self {
            Self::IntegerList => Some(Self::Integer),
            Self::BooleanList => Some(Self::Boolean),
            Self::RealList => Some(Self::Real),
            Self::RationalList => Some(Self::Rational),
            Self::DateList => Some(Self::Date),
            _ => None,
        }
    }
}

/// Qualified-name to value-kind mappings.
///
/// Unregistered names pass through the parser as text.
#[derive(Clone, Debug, PartialEq)]
pub struct XmpTagTypes(FxHashMap<Cow<'static, str>, XmpValueKind>);

impl Default for XmpTagTypes {
    fn default() -> Self {
        let mut types = Self::empty();
        types.extend(tags::CORE_TAG_TYPES.iter().map(|(k, v)| (*k, *v)));
        types
    }
}

impl XmpTagTypes {
    /// A registry that coerces nothing.
    pub fn empty() -> Self {
        Self(FxHashMap::default())
    }

    /// Looks up the kind for a qualified name.
    pub fn get(&self, qualified_name: &str) -> Option<XmpValueKind> {
        self.0.get(qualified_name).copied()
    }

    /// Adds (or replaces) a kind, returning the previous one.
    pub fn insert(
        &mut self,
        qualified_name: impl Into<Cow<'static, str>>,
        kind: XmpValueKind,
    ) -> Option<XmpValueKind> {
        self.0.insert(qualified_name.into(), kind)
    }

    /// Merges in another table, like one from [`vendor`].
    pub fn extend<N: Into<Cow<'static, str>>>(
        &mut self,
        types: impl IntoIterator<Item = (N, XmpValueKind)>,
    ) {
        self.0
            .extend(types.into_iter().map(|(name, kind)| (name.into(), kind)));
    }

    /// Builder form of [`XmpTagTypes::extend`].
    pub fn with<N: Into<Cow<'static, str>>>(
        mut self,
        types: impl IntoIterator<Item = (N, XmpValueKind)>,
    ) -> Self {
        self.extend(types);
        self
    }

    /// How many names are registered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{XmpTagTypes, XmpValueKind, vendor};

    #[test]
    fn vendor_tables_merge_without_touching_core() {
        let types = XmpTagTypes::default().with(vendor::dji());
        assert_eq!(types.get("exif:FNumber"), Some(XmpValueKind::Rational));
        assert_eq!(
            types.get("drone-dji:RelativeAltitude"),
            Some(XmpValueKind::Real)
        );
        assert_eq!(XmpTagTypes::default().get("drone-dji:RelativeAltitude"), None);
    }

    #[test]
    fn type_names_round_trip_into_kinds() {
        assert_eq!(
            XmpValueKind::from_name("rational[]"),
            Some(XmpValueKind::RationalList)
        );
        assert_eq!(
            XmpValueKind::RationalList.element(),
            Some(XmpValueKind::Rational)
        );
        assert_eq!(XmpValueKind::from_name("Time"), None);
    }
}
