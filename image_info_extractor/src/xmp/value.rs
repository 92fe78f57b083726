use std::collections::BTreeMap;

use base64::Engine as _;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use image_info_extractor_types::xmp::XmpValueKind;

/// Local name to value.
pub type XmpStruct = BTreeMap<String, XmpValue>;

/// One property's value.
///
/// Everything starts out as text, lists, or structs. Registered properties
/// are then coerced into the other variants.
#[derive(Clone, Debug, PartialEq)]
pub enum XmpValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Real(f64),
    Date(DateTime<FixedOffset>),
    Binary(Vec<u8>),
    List(Vec<XmpValue>),
    Struct(XmpStruct),

    /// A value with an unexpected shape, or one that failed coercion.
    Null,
}

impl XmpValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Real(n) => Some(n),
            Self::Integer(n) => Some(n as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[XmpValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&XmpStruct> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Converts a raw value into the registered kind.
///
/// Values that don't fit the kind become [`XmpValue::Null`].
pub(super) fn coerce(name: &str, kind: XmpValueKind, value: XmpValue) -> XmpValue {
    let scalar = |value: XmpValue, f: fn(&str) -> Option<XmpValue>| match value {
        XmpValue::Text(ref s) => f(s.trim()).unwrap_or_else(|| {
            log::warn!("Couldn't read `{name}` as `{kind:?}`. value: `{s}`");
            XmpValue::Null
        }),
        other => {
            log::warn!("Expected text for `{name}`, but got: `{other:?}`");
            XmpValue::Null
        }
    };
    let list = |value: XmpValue, f: fn(&str) -> Option<XmpValue>| match value {
        XmpValue::List(items) => XmpValue::List(
            items
                .into_iter()
                .map(|item| scalar(item, f))
                .collect(),
        ),
        other => {
            log::warn!("Expected a list for `{name}`, but got: `{other:?}`");
            XmpValue::Null
        }
    };

    match kind {
        XmpValueKind::Integer => scalar(value, integer),
        XmpValueKind::IntegerList => list(value, integer),
        XmpValueKind::Boolean => scalar(value, boolean),
        XmpValueKind::BooleanList => list(value, boolean),
        XmpValueKind::Real => scalar(value, real),
        XmpValueKind::RealList => list(value, real),
        XmpValueKind::Rational => scalar(value, rational),
        XmpValueKind::RationalList => list(value, rational),
        XmpValueKind::Date => scalar(value, date),
        XmpValueKind::DateList => list(value, date),
        XmpValueKind::GpsCoordinate => scalar(value, gps_coordinate),
        XmpValueKind::Base64 => scalar(value, binary),
    }
}

/// Reads leading digits (with an optional sign), ignoring the rest.
fn integer(s: &str) -> Option<XmpValue> {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok().map(XmpValue::Integer)
}

fn boolean(s: &str) -> Option<XmpValue> {
    if s.eq_ignore_ascii_case("true") {
        Some(XmpValue::Boolean(true))
    } else if s.eq_ignore_ascii_case("false") {
        Some(XmpValue::Boolean(false))
    } else {
        None
    }
}

fn real(s: &str) -> Option<XmpValue> {
    s.parse().ok().map(XmpValue::Real)
}

fn rational(s: &str) -> Option<XmpValue> {
    match s.split_once('/') {
        Some((n, d)) => {
            let n: f64 = n.trim().parse().ok()?;
            let d: f64 = d.trim().parse().ok()?;
            Some(XmpValue::Real(n / d))
        }
        None => real(s),
    }
}

/// Reads ISO 8601 dates, plus Exif-style `YYYY:MM:DD hh:mm:ss` ones.
///
/// Dates without a zone are taken as UTC.
fn date(s: &str) -> Option<XmpValue> {
    let normalized;
    let s = match (s.get(0..4), s.get(4..5), s.get(5..7), s.get(7..8), s.get(8..10), s.get(11..)) {
        (Some(y), Some(":"), Some(m), Some(":"), Some(d), Some(rest)) => {
            normalized = format!("{y}-{m}-{d}T{rest}");
            normalized.as_str()
        }
        _ => s,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(XmpValue::Date(dt));
    }

    // a zone without seconds, like `2024-03-01T10:15+01:00`
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Some(XmpValue::Date(dt));
    }

    const NAIVE: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    let naive = NAIVE
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            // `YYYY-MM-DD`, `YYYY-MM`, or `YYYY`
            let mut parts = s.splitn(3, '-');
            let year = parts.next()?.parse().ok()?;
            let month = parts.next().map_or(Some(1), |m| m.parse().ok())?;
            let day = parts.next().map_or(Some(1), |d| d.parse().ok())?;
            NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
        })?;

    Some(XmpValue::Date(naive.and_utc().fixed_offset()))
}

/// Reads `D,M,S[NSEW]`, `D,M.m[NSEW]`, or a rational triple like
/// `35/1 40/1 1234/100`.
fn gps_coordinate(s: &str) -> Option<XmpValue> {
    if let Some(hemisphere) = s.chars().last().filter(|c| "NSEW".contains(*c)) {
        let body = &s[..s.len() - 1];
        let mut parts = body.split(',');
        let degrees: f64 = parts.next()?.parse().ok()?;
        let minutes: f64 = parts.next()?.parse().ok()?;
        let seconds: f64 = match parts.next() {
            Some(sec) => sec.parse().ok()?,
            None => 0.0,
        };
        if parts.next().is_some() {
            return None;
        }

        let value = degrees + minutes / 60.0 + seconds / 3600.0;
        return Some(XmpValue::Real(match hemisphere {
            'S' | 'W' => -value,
            _ => value,
        }));
    }

    let parts = s
        .split_whitespace()
        .map(|part| {
            let (n, d) = part.split_once('/')?;
            Some(n.parse::<f64>().ok()? / d.parse::<f64>().ok()?)
        })
        .collect::<Option<Vec<_>>>()?;
    let [d, m, sec] = parts.as_slice() else {
        return None;
    };
    Some(XmpValue::Real(d + m / 60.0 + sec / 3600.0))
}

fn binary(s: &str) -> Option<XmpValue> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .ok()
        .map(XmpValue::Binary)
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone as _};
    use image_info_extractor_types::xmp::XmpValueKind as Kind;

    use super::{XmpValue, coerce};
    use crate::util::logger;

    fn text(s: &str) -> XmpValue {
        XmpValue::Text(s.into())
    }

    #[test]
    fn numbers() {
        logger();
        assert_eq!(coerce("t:A", Kind::Integer, text("42px")), XmpValue::Integer(42));
        assert_eq!(coerce("t:A", Kind::Real, text("2.5")), XmpValue::Real(2.5));
        assert_eq!(coerce("t:A", Kind::Rational, text("28/10")), XmpValue::Real(2.8));
        assert_eq!(coerce("t:A", Kind::Integer, text("abc")), XmpValue::Null);
        assert_eq!(
            coerce(
                "t:A",
                Kind::RationalList,
                XmpValue::List(vec![text("1/2"), text("3/4")])
            ),
            XmpValue::List(vec![XmpValue::Real(0.5), XmpValue::Real(0.75)])
        );
    }

    #[test]
    fn booleans() {
        logger();
        assert_eq!(coerce("t:B", Kind::Boolean, text("True")), XmpValue::Boolean(true));
        assert_eq!(coerce("t:B", Kind::Boolean, text("False")), XmpValue::Boolean(false));
        assert_eq!(coerce("t:B", Kind::Boolean, text("maybe")), XmpValue::Null);
    }

    #[test]
    fn dates() {
        logger();
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            coerce("t:D", Kind::Date, text("2021-05-04T10:20:30+02:00")),
            XmpValue::Date(tz.with_ymd_and_hms(2021, 5, 4, 10, 20, 30).unwrap())
        );
        assert_eq!(
            coerce("t:D", Kind::Date, text("2021:05:04 10:20:30+02:00")),
            XmpValue::Date(tz.with_ymd_and_hms(2021, 5, 4, 10, 20, 30).unwrap())
        );

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            coerce("t:D", Kind::Date, text("2021-05")),
            XmpValue::Date(utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn gps_coordinates() {
        logger();
        let lat = coerce("exif:GPSLatitude", Kind::GpsCoordinate, text("10,30,36S"));
        assert!((lat.as_f64().unwrap() + 10.51).abs() < 1e-9);
        assert_eq!(
            coerce("exif:GPSLongitude", Kind::GpsCoordinate, text("100,30.5E")),
            XmpValue::Real(100.0 + 30.5 / 60.0)
        );
        assert_eq!(
            coerce("exif:GPSLongitude", Kind::GpsCoordinate, text("10/1 30/1 0/1")),
            XmpValue::Real(10.5)
        );
        assert_eq!(
            coerce("exif:GPSLongitude", Kind::GpsCoordinate, text("nowhere")),
            XmpValue::Null
        );
    }

    #[test]
    fn base64_binary() {
        logger();
        assert_eq!(
            coerce("t:Blob", Kind::Base64, text("AAEC\n/w==")),
            XmpValue::Binary(vec![0, 1, 2, 255])
        );
    }
}
