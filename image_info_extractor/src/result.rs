//! What a container reader hands back.
//!
//! A [`ReadResult`] holds the raw bytes of each metadata block that was
//! found, alongside whatever [`ImageInfo`] the container's own framing
//! could provide. [`parse_result`](crate::parse_result) then fills in the
//! `parsed` half of each [`Metadata`].

use crate::{
    exif::{Exif, ExifError},
    icc::{Icc, IccError},
    iptc::{Iptc, IptcError},
    jfif::{Jfif, JfifError, Jfxx},
    xmp::{Xmp, XmpError},
};

/// One metadata block: its raw bytes, and (after parsing) its contents.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata<P, E> {
    /// The block's bytes, copied out of the file.
    pub content: Vec<u8>,

    /// `None` until the block is parsed. Also `None` if parsing produced
    /// nothing (like a JFXX thumbnail in an unknown format).
    pub parsed: Option<Result<P, E>>,
}

impl<P, E> Metadata<P, E> {
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            parsed: None,
        }
    }

    /// The parsed value, if parsing succeeded.
    pub fn parsed_ok(&self) -> Option<&P> {
        self.parsed.as_ref()?.as_ref().ok()
    }
}

/// Everything read out of one file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadResult {
    /// Container-level image properties.
    ///
    /// Present once the reader finds the image's dimensions.
    pub info: Option<ImageInfo>,

    pub exif: Option<Metadata<Exif, ExifError>>,
    pub xmp: Option<Metadata<Xmp, XmpError>>,

    /// JPEG only: the reassembled ExtendedXMP payload.
    pub extended_xmp: Option<Metadata<Xmp, XmpError>>,

    pub icc: Option<Metadata<Icc, IccError>>,

    /// JPEG only.
    pub iptc: Option<Metadata<Iptc, IptcError>>,

    /// JPEG only.
    pub jfif: Option<Metadata<Jfif, JfifError>>,

    /// JPEG only.
    pub jfxx: Option<Metadata<Jfxx, JfifError>>,
}

impl ReadResult {
    /// Lists the kinds of metadata present, in a stable order.
    pub fn kinds(&self) -> Vec<MetadataKind> {
        MetadataKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                MetadataKind::Info => self.info.is_some(),
                other => self.content(*other).is_some(),
            })
            .collect()
    }

    /// The raw bytes for a kind of metadata.
    ///
    /// [`MetadataKind::Info`] has no raw bytes, so it's always `None`.
    pub fn content(&self, kind: MetadataKind) -> Option<&[u8]> {
        match kind {
            MetadataKind::Info => None,
            MetadataKind::Exif => self.exif.as_ref().map(|m| m.content.as_slice()),
            MetadataKind::Xmp => self.xmp.as_ref().map(|m| m.content.as_slice()),
            MetadataKind::ExtendedXmp => self.extended_xmp.as_ref().map(|m| m.content.as_slice()),
            MetadataKind::Icc => self.icc.as_ref().map(|m| m.content.as_slice()),
            MetadataKind::Iptc => self.iptc.as_ref().map(|m| m.content.as_slice()),
            MetadataKind::Jfif => self.jfif.as_ref().map(|m| m.content.as_slice()),
            MetadataKind::Jfxx => self.jfxx.as_ref().map(|m| m.content.as_slice()),
        }
    }
}

/// A kind of metadata a file may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetadataKind {
    Info,
    Exif,
    Xmp,
    ExtendedXmp,
    Icc,
    Iptc,
    Jfif,
    Jfxx,
}

impl MetadataKind {
    pub const ALL: [Self; 8] = [
        Self::Info,
        Self::Exif,
        Self::Xmp,
        Self::ExtendedXmp,
        Self::Icc,
        Self::Iptc,
        Self::Jfif,
        Self::Jfxx,
    ];

    /// The conventional label, like `"EXIF"` or `"ExtendedXMP"`.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Exif => "EXIF",
            Self::Xmp => "XMP",
            Self::ExtendedXmp => "ExtendedXMP",
            Self::Icc => "ICC",
            Self::Iptc => "IPTC",
            Self::Jfif => "JFIF",
            Self::Jfxx => "JFXX",
        }
    }
}

impl core::fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A bitmask of the optional metadata kinds a reader located.
///
/// Bit assignments are the same for every format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MetadataFlags(pub u8);

impl MetadataFlags {
    pub const ICC: u8 = 0b0_0001;
    pub const XMP: u8 = 0b0_0010;
    pub const EXIF: u8 = 0b0_0100;
    pub const JFXX: u8 = 0b0_1000;
    pub const JFIF: u8 = 0b1_0000;

    pub fn set(&mut self, bit: u8) {
        self.0 |= bit;
    }

    pub const fn has(&self, bit: u8) -> bool {
        self.0 & bit == bit
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }
}

/// Image properties read from container framing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageInfo {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bit_depth: Option<u8>,
    pub alpha: bool,
    pub animation: bool,
    pub lossless: bool,
    pub progressive: bool,

    /// AVIF/HEIF only: the primary item is a grid of tiles.
    pub grid: Option<bool>,

    /// Rotation in degrees: 0, 90, 180 or 270.
    ///
    /// Clockwise when taken from Exif. HEIF files give their `irot` angle
    /// as is, which is counter-clockwise.
    pub rotate: Option<u16>,

    /// From Exif, `0` for none or `1` for a left-right flip, applied before
    /// `rotate`.
    ///
    /// HEIF files give their `imir` axis times 90: `0` for a left-right
    /// flip, `90` for a top-bottom one.
    pub mirror: Option<u16>,

    /// Milliseconds since the Unix epoch.
    pub creation_time: Option<i64>,

    /// Milliseconds since the Unix epoch.
    pub modification_time: Option<i64>,

    /// PNG only: `"srgb"` when an `sRGB` chunk is present.
    pub color_space: Option<String>,

    /// PNG only: the `sRGB` chunk's rendering intent.
    pub rendering_intent: Option<u8>,

    pub color_info: Option<ColorInfo>,

    pub flags: MetadataFlags,
}

/// A `(x, y)` chromaticity coordinate.
pub type Chromaticity = (f64, f64);

/// Colour description found outside of an ICC profile.
///
/// PNG fills these from its `cICP`, `cHRM`, `gAMA`, `mDCv` and `cLLi`
/// chunks. HEIF fills the coding-independent code points from an `nclx`
/// colour box.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorInfo {
    pub color_primaries: Option<u16>,
    pub transfer_function: Option<u16>,
    pub matrix_coefficients: Option<u16>,
    pub video_full_range: Option<bool>,

    pub white_point: Option<Chromaticity>,
    pub red_primary: Option<Chromaticity>,
    pub green_primary: Option<Chromaticity>,
    pub blue_primary: Option<Chromaticity>,

    pub gamma: Option<f64>,

    /// In cd/m².
    pub maximum_luminance: Option<f64>,
    pub minimum_luminance: Option<f64>,

    pub max_content_light_level: Option<f64>,
    pub max_frame_average_light_level: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::{ImageInfo, Metadata, MetadataFlags, MetadataKind, ReadResult};
    use crate::util::logger;

    #[test]
    fn kinds_follow_present_fields() {
        logger();
        let result = ReadResult {
            info: Some(ImageInfo::default()),
            xmp: Some(Metadata::new(b"<x:xmpmeta/>".to_vec())),
            icc: Some(Metadata::new(vec![0; 4])),
            ..Default::default()
        };

        assert_eq!(
            result.kinds(),
            [MetadataKind::Info, MetadataKind::Xmp, MetadataKind::Icc]
        );
        assert_eq!(result.content(MetadataKind::Icc), Some([0; 4].as_slice()));
        assert_eq!(result.content(MetadataKind::Exif), None);
    }

    #[test]
    fn flags() {
        logger();
        let mut flags = MetadataFlags::default();
        flags.set(MetadataFlags::ICC);
        flags.set(MetadataFlags::EXIF);

        assert_eq!(flags.bits(), 0b101);
        assert!(flags.has(MetadataFlags::ICC));
        assert!(!flags.has(MetadataFlags::XMP));
        assert_eq!(MetadataKind::ExtendedXmp.to_string(), "ExtendedXMP");
    }
}
