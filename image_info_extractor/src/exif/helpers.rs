//! Values derived from parsed Exif: dates, the embedded thumbnail, and GPS
//! position.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike as _, Utc};

use super::{Exif, ExifValue, Ifd};

/// When the file was last changed (`ModifyDate`).
///
/// Uses the Exif IFD's `SubSecTime` and `OffsetTime` when present.
pub fn modify_date(exif: &Exif) -> Option<DateTime<FixedOffset>> {
    let date = exif.tiff.as_ref()?.get("ModifyDate")?.as_str()?;
    let sub = exif.exif.as_ref();
    parse_exif_date(
        date,
        text(sub, "SubSecTime"),
        text(sub, "OffsetTime"),
    )
}

/// When the photo was taken (`DateTimeOriginal`).
pub fn date_time_original(exif: &Exif) -> Option<DateTime<FixedOffset>> {
    let sub = exif.exif.as_ref();
    parse_exif_date(
        text(sub, "DateTimeOriginal")?,
        text(sub, "SubSecTimeOriginal"),
        text(sub, "OffsetTimeOriginal"),
    )
}

/// When the photo was digitized (`DateTimeDigitized`).
pub fn date_time_digitized(exif: &Exif) -> Option<DateTime<FixedOffset>> {
    let sub = exif.exif.as_ref();
    parse_exif_date(
        text(sub, "DateTimeDigitized")?,
        text(sub, "SubSecTimeDigitized"),
        text(sub, "OffsetTimeDigitized"),
    )
}

fn text<'a>(ifd: Option<&'a Ifd>, name: &str) -> Option<&'a str> {
    ifd?.get(name)?.as_str()
}

/// Parses an Exif date like `2023:06:13 15:28:01`.
///
/// A date that already carries a fraction or offset
/// (`2023:06:13 15:28:01.487+08:00`) keeps them. Otherwise, `sub_sec`
/// supplies milliseconds and `offset` supplies the zone. Dates without any
/// zone are taken as UTC.
pub fn parse_exif_date(
    date: &str,
    sub_sec: Option<&str>,
    offset: Option<&str>,
) -> Option<DateTime<FixedOffset>> {
    let date = date.trim();
    let naive = NaiveDateTime::parse_from_str(date.get(..19)?, "%Y:%m:%d %H:%M:%S")
        .inspect_err(|e| log::warn!("Couldn't parse Exif date `{date}`. err: {e}"))
        .ok()?;

    let rest = &date[19..];
    let (fraction, own_zone) = match rest.strip_prefix('.') {
        Some(r) => {
            let end = r.find(|c: char| !c.is_ascii_digit()).unwrap_or(r.len());
            (Some(&r[..end]), &r[end..])
        }
        None => (None, rest),
    };

    let fraction = fraction.or(sub_sec.map(str::trim)).filter(|f| !f.is_empty());
    let millis: u32 = match fraction {
        Some(f) => {
            let digits: String = f.chars().take(3).collect();
            format!("{digits:0<3}").parse().unwrap_or(0)
        }
        None => 0,
    };
    let naive = naive.with_nanosecond(millis * 1_000_000)?;

    let zone = if own_zone.is_empty() {
        offset.and_then(parse_offset)
    } else {
        parse_offset(own_zone)
    }
    .unwrap_or(FixedOffset::east_opt(0)?);

    naive.and_local_timezone(zone).single()
}

/// Parses `+hh:mm`, `-hhmm`, or `Z`.
pub(crate) fn parse_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s == "Z" {
        return FixedOffset::east_opt(0);
    }

    let sign: i32 = match s.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = s[1..].chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// An embedded thumbnail, found through IFD1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thumbnail<'a> {
    pub data: &'a [u8],

    /// `image/jpeg` or `image/png`, when recognizable.
    pub mime: Option<&'static str>,
}

/// Finds the thumbnail bytes inside the Exif block they were parsed from.
pub fn thumbnail<'a>(exif: &Exif, content: &'a [u8]) -> Option<Thumbnail<'a>> {
    let ifd1 = exif.thumbnail.as_ref()?;
    let offset = ifd1.get("ThumbnailOffset")?.as_u32()? as usize;
    let length = ifd1.get("ThumbnailLength")?.as_u32()? as usize;
    if length == 0 {
        return None;
    }

    let Some(data) = content.get(offset..offset.checked_add(length)?) else {
        log::warn!(
            "Thumbnail lies outside the Exif block. \
            offset: `{offset}`, len: `{length}`, block len: `{}`",
            content.len()
        );
        return None;
    };

    let mime = if data.starts_with(&[0xFF, 0xD8]) {
        Some("image/jpeg")
    } else if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        Some("image/png")
    } else {
        None
    };

    Some(Thumbnail { data, mime })
}

/// The GPS fix time, from `GPSDateStamp` and `GPSTimeStamp`.
pub fn gps_time_stamp(gps: &Ifd) -> Option<DateTime<Utc>> {
    let date = gps.get("GPSDateStamp")?.as_str()?;
    let time = gps.get("GPSTimeStamp")?.to_f64_list()?;
    let [h, m, s] = time.as_slice() else {
        log::warn!("`GPSTimeStamp` should have three values, but had `{}`.", time.len());
        return None;
    };

    let mut ymd = date.split(':').map(|part| part.trim().parse::<u32>().ok());
    let (Some(Some(y)), Some(Some(mo)), Some(Some(d))) = (ymd.next(), ymd.next(), ymd.next())
    else {
        log::warn!("Couldn't parse `GPSDateStamp`: `{date}`");
        return None;
    };

    let millis = (s.fract() * 1000.0).round() as u32;
    let naive = NaiveDate::from_ymd_opt(i32::try_from(y).ok()?, mo, d)?.and_hms_milli_opt(
        *h as u32,
        *m as u32,
        s.trunc() as u32,
        millis.min(999),
    )?;
    Some(naive.and_utc())
}

/// A position read from the GPS IFD.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GpsCoordinates {
    /// Degrees, negative in the southern hemisphere.
    pub latitude: f64,

    /// Degrees, negative west of Greenwich.
    pub longitude: f64,

    /// Meters, negative below sea level.
    pub altitude: Option<f64>,

    /// Horizontal error in meters.
    pub accuracy: Option<f64>,

    /// Degrees.
    pub heading: Option<f64>,

    /// Kilometers per hour.
    pub speed: Option<f64>,
}

/// Reads the position from a GPS IFD.
///
/// Needs both `GPSLatitude` and `GPSLongitude`.
pub fn gps_coords(gps: &Ifd) -> Option<GpsCoordinates> {
    let latitude = to_degrees(gps.get("GPSLatitude")?, text(Some(gps), "GPSLatitudeRef"))?;
    let longitude = to_degrees(gps.get("GPSLongitude")?, text(Some(gps), "GPSLongitudeRef"))?;

    let altitude = gps.get("GPSAltitude").and_then(ExifValue::as_f64).map(|alt| {
        match gps.get("GPSAltitudeRef").and_then(ExifValue::as_u32) {
            Some(1) => -alt,
            _ => alt,
        }
    });

    let speed = gps.get("GPSSpeed").and_then(ExifValue::as_f64).map(|speed| {
        match text(Some(gps), "GPSSpeedRef") {
            Some("M") => speed * 1.609_344,
            Some("N") => speed * 1.852,
            _ => speed,
        }
    });

    Some(GpsCoordinates {
        latitude,
        longitude,
        altitude,
        accuracy: gps.get("GPSHPositioningError").and_then(ExifValue::as_f64),
        heading: gps.get("GPSImgDirection").and_then(ExifValue::as_f64),
        speed,
    })
}

/// Turns a degrees/minutes/seconds triple into signed degrees.
fn to_degrees(value: &ExifValue, hemisphere: Option<&str>) -> Option<f64> {
    let parts = value.to_f64_list()?;
    let [d, m, s] = parts.as_slice() else {
        log::warn!("GPS coordinate should have three values, but had `{}`.", parts.len());
        return None;
    };

    let degrees = d + m / 60.0 + s / 3600.0;
    Some(match hemisphere {
        Some("S" | "W") => -degrees,
        _ => degrees,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike as _, FixedOffset, TimeZone as _, Timelike as _, Utc};
    use image_info_extractor_types::exif::ifd::IfdGroup;

    use super::*;
    use crate::{
        exif::{Endianness, ExifField},
        util::logger,
    };

    fn ifd(group: IfdGroup, fields: Vec<(&str, ExifValue)>) -> Ifd {
        Ifd {
            group,
            fields: fields
                .into_iter()
                .map(|(name, value)| ExifField {
                    tag: 0,
                    name: name.to_string(),
                    value: Some(value),
                })
                .collect(),
        }
    }

    fn text(s: &str) -> ExifValue {
        ExifValue::Text(s.to_string())
    }

    #[test]
    fn dates_pick_up_sub_seconds_and_offsets() {
        logger();
        let exif = Exif {
            endianness: Endianness::Little,
            tiff: Some(ifd(IfdGroup::Tiff, vec![("ModifyDate", text("2023:06:13 15:28:01"))])),
            exif: Some(ifd(
                IfdGroup::Exif,
                vec![
                    ("DateTimeOriginal", text("2023:06:13 15:28:01")),
                    ("SubSecTimeOriginal", text("4871")),
                    ("OffsetTimeOriginal", text("+08:00")),
                    ("SubSecTime", text("5")),
                ],
            )),
            thumbnail: None,
            gps: None,
            interop: None,
        };

        let original = date_time_original(&exif).unwrap();
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            original,
            tz.with_ymd_and_hms(2023, 6, 13, 15, 28, 1).unwrap() + chrono::Duration::milliseconds(487)
        );

        let modified = modify_date(&exif).unwrap();
        assert_eq!(modified.offset().local_minus_utc(), 0);
        assert_eq!(modified.nanosecond(), 500_000_000);

        assert_eq!(date_time_digitized(&exif), None);
    }

    #[test]
    fn dates_with_their_own_zone() {
        logger();
        let parsed = parse_exif_date("2023:06:13 15:28:01.25-05:00", Some("999"), None).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(parsed.nanosecond(), 250_000_000);
        assert_eq!(parsed.day(), 13);
    }

    #[test]
    fn thumbnail_bytes_and_type() {
        logger();
        let mut content = vec![0_u8; 16];
        content.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xD9]);

        let exif = Exif {
            endianness: Endianness::Big,
            tiff: None,
            thumbnail: Some(ifd(
                IfdGroup::Thumbnail,
                vec![
                    ("ThumbnailOffset", ExifValue::Unsigned(16)),
                    ("ThumbnailLength", ExifValue::Unsigned(4)),
                ],
            )),
            exif: None,
            gps: None,
            interop: None,
        };

        let thumb = thumbnail(&exif, &content).unwrap();
        assert_eq!(thumb.mime, Some("image/jpeg"));
        assert_eq!(thumb.data, &[0xFF, 0xD8, 0xFF, 0xD9]);

        assert_eq!(thumbnail(&exif, &content[..18]), None);
    }

    #[test]
    fn gps_position_and_time() {
        logger();
        let gps = ifd(
            IfdGroup::Gps,
            vec![
                ("GPSLatitudeRef", text("S")),
                ("GPSLatitude", ExifValue::RealList(vec![33.0, 51.0, 36.0])),
                ("GPSLongitudeRef", text("E")),
                ("GPSLongitude", ExifValue::RealList(vec![151.0, 12.0, 0.0])),
                ("GPSAltitudeRef", ExifValue::Unsigned(1)),
                ("GPSAltitude", ExifValue::Real(12.5)),
                ("GPSSpeedRef", text("N")),
                ("GPSSpeed", ExifValue::Real(10.0)),
                ("GPSImgDirection", ExifValue::Real(270.0)),
                ("GPSDateStamp", text("2024:01:02")),
                ("GPSTimeStamp", ExifValue::RealList(vec![3.0, 4.0, 5.5])),
            ],
        );

        let coords = gps_coords(&gps).unwrap();
        assert!((coords.latitude + 33.86).abs() < 1e-9);
        assert!((coords.longitude - 151.2).abs() < 1e-9);
        assert_eq!(coords.altitude, Some(-12.5));
        assert!((coords.speed.unwrap() - 18.52).abs() < 1e-9);
        assert_eq!(coords.heading, Some(270.0));
        assert_eq!(coords.accuracy, None);

        let stamp = gps_time_stamp(&gps).unwrap();
        assert_eq!(
            stamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap() + chrono::Duration::milliseconds(500)
        );
    }
}
