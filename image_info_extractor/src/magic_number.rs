//! Works out what kind of file we've been handed.
//!
//! A file's type comes from, in order of trust:
//!
//! 1. the MIME type the caller declared,
//! 2. its name's extension,
//! 3. magic numbers in its first few bytes.
//!
//! [`ImageType::read`] then hands the file to the matching
//! [`ContainerReader`].
//!
//! ```
//! use image_info_extractor::magic_number::ImageType;
//!
//! assert_eq!(ImageType::from_name("IMG_0001.HEIC"), Some(ImageType::Heic));
//! assert_eq!(ImageType::from_mime("image/webp"), Some(ImageType::Webp));
//! assert_eq!(ImageType::sniff(b"\x89PNG\r\n\x1a\n"), Some(ImageType::Png));
//! ```

use crate::{
    commons::{extname, starts_with_array},
    error::ReadError,
    providers::{ContainerReader, Heif, Jpeg, Png, Svg, Webp},
    result::ReadResult,
    source::ByteSource,
};

/// How much of a file [`ImageType::sniff`] wants to see.
///
/// Binary formats need far less, but an SVG's root tag may sit behind an
/// XML declaration and comments.
pub const SNIFF_LEN: usize = 256;

/// The JPEG XL container's signature box.
const JXL_CONTAINER: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, b'J', b'X', b'L', b' ', 0x0D, 0x0A, 0x87, 0x0A,
];

/// A bare JPEG XL codestream.
const JXL_CODESTREAM: [u8; 2] = [0xFF, 0x0A];

/// Dispatches a file to the reader named by `$reader`, if there is one.
macro_rules! read_with {
    ($source:expr, $ty:expr $(,)?) => {{
        log::error!("No reader handles `{}`.", $ty.mime());
        Err(ReadError::UnsupportedType(Some($ty.mime().to_owned())))
    }};

    ($source:expr, $ty:expr, $reader:ty $(,)?) => {
        <$reader as ContainerReader>::read($source).map_err(Into::into)
    };
}

/// This macro generates [`ImageType`] and its lookups from one table.
///
/// Each entry says:
///
/// - which MIME types it answers to (the first is canonical),
/// - which extensions it answers to,
/// - which [`ContainerReader`] handles it, if any.
macro_rules! generate {
    ( $(
        $variant:ident => {
            mimes: [$($mime:literal),+ $(,)?],
            extensions: [$($ext:literal),* $(,)?]
            $(, reader: $reader:ty)? $(,)?
        },
    )+) => {
        /// A kind of image file we can recognize.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum ImageType {
            $($variant,)+
        }

        impl ImageType {
            /// Every recognized type, in declaration order.
            pub const ALL: &[Self] = &[$(Self::$variant,)+];

            /// The canonical MIME type.
            pub const fn mime(&self) -> &'static str {
                match self {
                    $(Self::$variant => generate!(@first $($mime),+),)+
                }
            }

            /// Whether a [`ContainerReader`] exists for this type.
            pub const fn has_reader(&self) -> bool {
                match self {
                    $(Self::$variant => generate!(@has_reader $($reader)?),)+
                }
            }

            /// Finds the type for a declared MIME type.
            ///
            /// Matching ignores ASCII case and any `;` parameters.
            pub fn from_mime(mime: &str) -> Option<Self> {
                let essence = mime.split(';').next().unwrap_or_default().trim();
                $(
                    if [$($mime),+].iter().any(|m| m.eq_ignore_ascii_case(essence)) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }

            /// Finds the type for a file name by its extension.
            pub fn from_name(name: &str) -> Option<Self> {
                let ext = extname(name);
                if ext.is_empty() {
                    return None;
                }
                $(
                    if [$($ext),*].iter().any(|e: &&str| e.eq_ignore_ascii_case(ext)) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }

            /// Reads `source` with this type's reader.
            ///
            /// # Errors
            ///
            /// Types without a reader fail with
            /// [`ReadError::UnsupportedType`]. Otherwise, this is whatever
            /// the reader returns.
            pub fn read<S: ByteSource + ?Sized>(
                &self,
                source: &S,
            ) -> Result<Option<ReadResult>, ReadError> {
                match self {
                    $(Self::$variant => read_with!(source, self, $($reader)?),)+
                }
            }
        }
    };

    (@first $first:literal $(, $rest:literal)*) => { $first };
    (@has_reader) => { false };
    (@has_reader $reader:ty) => { true };
}

generate! {
    Jpeg => {
        mimes: ["image/jpeg", "image/jpg"],
        extensions: [".jpg", ".jpeg"],
        reader: Jpeg,
    },
    Png => {
        mimes: ["image/png"],
        extensions: [".png"],
        reader: Png,
    },
    Apng => {
        mimes: ["image/apng"],
        extensions: [".apng"],
        reader: Png,
    },
    Webp => {
        mimes: ["image/webp"],
        extensions: [".webp"],
        reader: Webp,
    },
    Avif => {
        mimes: ["image/avif"],
        extensions: [".avif", ".avifs"],
        reader: Heif,
    },
    AvifSequence => {
        mimes: ["image/avif-sequence"],
        extensions: [],
        reader: Heif,
    },
    Heif => {
        mimes: ["image/heif"],
        extensions: [".heif"],
        reader: Heif,
    },
    HeifSequence => {
        mimes: ["image/heif-sequence"],
        extensions: [".heifs"],
        reader: Heif,
    },
    Heic => {
        mimes: ["image/heic"],
        extensions: [".heic"],
        reader: Heif,
    },
    HeicSequence => {
        mimes: ["image/heic-sequence"],
        extensions: [".heics"],
        reader: Heif,
    },
    Svg => {
        mimes: ["image/svg+xml", "image/svg"],
        extensions: [".svg"],
        reader: Svg,
    },
    Jxl => {
        mimes: ["image/jxl"],
        extensions: [".jxl"],
    },
}

impl ImageType {
    /// Guesses the type from a file's first [`SNIFF_LEN`] bytes.
    pub fn sniff(head: &[u8]) -> Option<Self> {
        if Jpeg::magic_number(head) {
            return Some(Self::Jpeg);
        }
        if Png::magic_number(head) {
            return Some(Self::Png);
        }
        if Webp::magic_number(head) {
            return Some(Self::Webp);
        }

        if starts_with_array(head, b"ftyp", 4) {
            let brand: [u8; 4] = head.get(8..12)?.try_into().ok()?;
            return match &brand {
                b"avif" | b"avis" => Some(Self::Avif),
                b"mif1" => Some(Self::Heif),
                b"msf1" => Some(Self::HeifSequence),
                b"heic" | b"heix" => Some(Self::Heic),
                b"hevc" | b"hevx" => Some(Self::HeicSequence),
                other => {
                    log::debug!("Unknown `ftyp` brand: `{}`", String::from_utf8_lossy(other));
                    None
                }
            };
        }

        if head.starts_with(&JXL_CONTAINER) || head.starts_with(&JXL_CODESTREAM) {
            return Some(Self::Jxl);
        }

        Svg::magic_number(head).then_some(Self::Svg)
    }

    /// Finds the type from whatever the caller knows, then the content.
    ///
    /// A declared MIME type wins over the name, which wins over sniffing.
    pub fn detect(mime: Option<&str>, name: Option<&str>, head: &[u8]) -> Option<Self> {
        mime.and_then(Self::from_mime)
            .or_else(|| name.and_then(Self::from_name))
            .or_else(|| Self::sniff(head))
    }

    /// Whether [`crate::read_file`] can read this type.
    pub const fn is_supported(&self) -> bool {
        self.has_reader()
    }
}

impl core::fmt::Display for ImageType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.mime())
    }
}

/// A standalone metadata file, stored next to an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SidecarType {
    /// A raw TIFF-headed Exif block (`.exif`, `.exf`).
    Exif,

    /// An XMP packet (`.xmp`, `.rdf`).
    Xmp,

    /// An ICC profile (`.icc`, `.icm`).
    Icc,
}

impl SidecarType {
    /// Finds the type for a declared MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("application/vnd.iccprofile") {
            Some(Self::Icc)
        } else if essence.eq_ignore_ascii_case("application/rdf+xml") {
            Some(Self::Xmp)
        } else {
            None
        }
    }

    /// Finds the type for a file name by its extension.
    pub fn from_name(name: &str) -> Option<Self> {
        match extname(name).to_ascii_lowercase().as_str() {
            ".exif" | ".exf" => Some(Self::Exif),
            ".xmp" | ".rdf" => Some(Self::Xmp),
            ".icc" | ".icm" => Some(Self::Icc),
            _ => None,
        }
    }

    /// Guesses the type from a sidecar's content.
    pub fn sniff(content: &[u8]) -> Option<Self> {
        if content.starts_with(b"II*\0") || content.starts_with(b"MM\0*") {
            Some(Self::Exif)
        } else if content.starts_with(b"<?xpacket") || content.starts_with(b"<x:xmpmeta") {
            Some(Self::Xmp)
        } else if starts_with_array(content, b"acsp", 36) {
            Some(Self::Icc)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageType, SidecarType};
    use crate::{error::ReadError, util::logger};

    #[test]
    fn names_and_mimes() {
        logger();
        for (name, ty) in [
            ("a.jpg", ImageType::Jpeg),
            ("b.JPEG", ImageType::Jpeg),
            ("c.apng", ImageType::Apng),
            ("d.avifs", ImageType::Avif),
            ("e.heifs", ImageType::HeifSequence),
            ("f.heics", ImageType::HeicSequence),
            ("dir.v2/g.svg", ImageType::Svg),
            ("h.jxl", ImageType::Jxl),
        ] {
            assert_eq!(ImageType::from_name(name), Some(ty), "{name}");
        }
        assert_eq!(ImageType::from_name("noext"), None);
        assert_eq!(ImageType::from_name(".png"), None);
        assert_eq!(ImageType::from_name("x.gif"), None);

        assert_eq!(ImageType::from_mime("IMAGE/PNG"), Some(ImageType::Png));
        assert_eq!(ImageType::from_mime("image/svg"), Some(ImageType::Svg));
        assert_eq!(
            ImageType::from_mime("image/heic-sequence; codecs=x"),
            Some(ImageType::HeicSequence)
        );
        assert_eq!(ImageType::from_mime("image/gif"), None);

        for ty in ImageType::ALL {
            assert_eq!(ImageType::from_mime(ty.mime()), Some(*ty));
        }
        assert!(!ImageType::Jxl.is_supported());
        assert!(ImageType::Apng.is_supported());
    }

    #[test]
    fn sniffing() {
        logger();
        assert_eq!(ImageType::sniff(&[0xFF, 0xD8, 0xFF, 0xE1]), Some(ImageType::Jpeg));
        assert_eq!(ImageType::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageType::Webp));
        assert_eq!(
            ImageType::sniff(b"\0\0\0\x18ftypheix\0\0\0\0"),
            Some(ImageType::Heic)
        );
        assert_eq!(
            ImageType::sniff(b"\0\0\0\x18ftypmsf1\0\0\0\0"),
            Some(ImageType::HeifSequence)
        );
        assert_eq!(ImageType::sniff(b"\0\0\0\x18ftypqt  \0\0\0\0"), None);
        assert_eq!(
            ImageType::sniff(b"\0\0\0\x0CJXL \r\n\x87\n"),
            Some(ImageType::Jxl)
        );
        assert_eq!(ImageType::sniff(&[0xFF, 0x0A, 0xFA]), Some(ImageType::Jxl));
        assert_eq!(ImageType::sniff(b"  <svg/>"), Some(ImageType::Svg));
        assert_eq!(ImageType::sniff(b"GIF89a"), None);
    }

    #[test]
    fn detection_order() {
        logger();
        let png = b"\x89PNG\r\n\x1a\n";
        assert_eq!(
            ImageType::detect(Some("image/jpeg"), Some("a.webp"), png),
            Some(ImageType::Jpeg)
        );
        assert_eq!(
            ImageType::detect(Some("image/x-unknown"), Some("a.webp"), png),
            Some(ImageType::Webp)
        );
        assert_eq!(ImageType::detect(None, Some("a.bin"), png), Some(ImageType::Png));
        assert_eq!(ImageType::detect(None, None, b"nope"), None);
    }

    #[test]
    fn jxl_has_no_reader() {
        logger();
        assert_eq!(
            ImageType::Jxl.read(b"\xFF\x0A".as_slice()),
            Err(ReadError::UnsupportedType(Some("image/jxl".into())))
        );
    }

    #[test]
    fn sidecars() {
        logger();
        assert_eq!(SidecarType::from_name("a.EXF"), Some(SidecarType::Exif));
        assert_eq!(SidecarType::from_name("a.exif"), Some(SidecarType::Exif));
        assert_eq!(SidecarType::from_name("a.rdf"), Some(SidecarType::Xmp));
        assert_eq!(SidecarType::from_name("a.icm"), Some(SidecarType::Icc));
        assert_eq!(SidecarType::from_name("a.exi"), None);
        assert_eq!(
            SidecarType::from_mime("application/vnd.iccprofile"),
            Some(SidecarType::Icc)
        );
        assert_eq!(SidecarType::from_mime("text/plain"), None);

        assert_eq!(SidecarType::sniff(b"MM\0*\0\0\0\x08"), Some(SidecarType::Exif));
        assert_eq!(SidecarType::sniff(b"<?xpacket begin"), Some(SidecarType::Xmp));

        let mut icc = vec![0_u8; 36];
        icc.extend_from_slice(b"acsp");
        assert_eq!(SidecarType::sniff(&icc), Some(SidecarType::Icc));
        assert_eq!(SidecarType::sniff(b"hello"), None);
    }
}
