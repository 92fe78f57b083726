//! # `image_info_extractor`
//!
//! Reads image properties and embedded metadata out of image files, without
//! decoding any pixels.
//!
//! ## Supported formats
//!
//! | Container | Metadata found                                      |
//! | --------- | --------------------------------------------------- |
//! | JPEG      | Exif, XMP, Extended XMP, ICC, IPTC, JFIF, JFXX      |
//! | PNG/APNG  | Exif, XMP, ICC                                      |
//! | WebP      | Exif, XMP, ICC                                      |
//! | AVIF/HEIF | Exif, XMP, ICC                                      |
//! | SVG       | XMP                                                 |
//!
//! Standalone `.exif`, `.xmp` and `.icc` files can be read with
//! [`read_sidecar`].
//!
//! ## Usage
//!
//! Reading happens in two passes. First, [`read_file`] finds the container's
//! metadata blocks and reads whatever image properties its framing gives.
//! Then, [`parse_result`] parses each block it found:
//!
//! ```
//! # let bytes: Vec<u8> = {
//! #     let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
//! #     png.extend_from_slice(&13_u32.to_be_bytes());
//! #     png.extend_from_slice(b"IHDR");
//! #     png.extend_from_slice(&[0, 0, 0, 4, 0, 0, 0, 3, 8, 6, 0, 0, 0]);
//! #     png.extend_from_slice(&[0; 4]);
//! #     png.extend_from_slice(&[0, 0, 0, 0]);
//! #     png.extend_from_slice(b"IEND");
//! #     png.extend_from_slice(&[0; 4]);
//! #     png
//! # };
//! use image_info_extractor::{parse_result, read_bytes};
//!
//! let mut result = read_bytes(&bytes, None, Some("photo.png")).unwrap().unwrap();
//! parse_result(&mut result);
//!
//! let info = result.info.unwrap();
//! assert_eq!((info.width, info.height), (Some(4), Some(3)));
//! assert!(info.alpha);
//! ```
//!
//! ## Extending the tag tables
//!
//! Vendor tags can be taught to the parsers through a [`ParserConfig`],
//! then handed to [`parse_result_with`].

#![forbid(unsafe_code)]

use std::path::Path;

pub mod commons;
pub mod config;
pub mod cursor;
pub mod error;
pub mod exif;
pub mod icc;
pub mod iptc;
pub mod jfif;
pub mod magic_number;
pub mod providers;
pub mod result;
pub mod source;
pub mod xmp;

mod parse;

pub use crate::{
    config::ParserConfig,
    error::{ReadError, SourceError},
    magic_number::{ImageType, SidecarType},
    parse::{parse_result, parse_result_with},
    providers::ContainerReader,
    result::{ColorInfo, ImageInfo, Metadata, MetadataFlags, MetadataKind, ReadResult},
    source::{ByteSource, FileSource},
};

/// Finds a file's metadata blocks and container-level image properties.
///
/// The file's type is taken from `mime` if it's recognized, then from
/// `name`'s extension, then from the file's first bytes.
///
/// `Ok(None)` means the file was fine, but held nothing worth returning.
/// Only WebP files do this.
///
/// # Errors
///
/// Fails with [`ReadError::UnsupportedType`] when the type can't be worked
/// out or has no reader. Otherwise, the reader's own error is returned.
pub fn read_file<S: ByteSource + ?Sized>(
    source: &S,
    mime: Option<&str>,
    name: Option<&str>,
) -> Result<Option<ReadResult>, ReadError> {
    let head = source.read_range(0, magic_number::SNIFF_LEN)?;

    let Some(ty) = ImageType::detect(mime, name, &head) else {
        log::error!("Couldn't work out the file's type. mime: `{mime:?}`, name: `{name:?}`");
        return Err(ReadError::UnsupportedType(mime.map(str::to_owned)));
    };
    log::debug!("Reading file as `{ty}`.");

    ty.read(source)
}

/// Like [`read_file`], for bytes already in memory.
pub fn read_bytes(
    bytes: &[u8],
    mime: Option<&str>,
    name: Option<&str>,
) -> Result<Option<ReadResult>, ReadError> {
    read_file(bytes, mime, name)
}

/// Like [`read_file`], for a file on disk.
///
/// The path's file name is used to help find the type.
pub fn read_path(path: impl AsRef<Path>) -> Result<Option<ReadResult>, ReadError> {
    let path = path.as_ref();
    let source = FileSource::open(path)?;
    let name = path.file_name().and_then(|n| n.to_str());

    read_file(&source, None, name)
}

/// Wraps a standalone metadata file in a [`ReadResult`].
///
/// The kind is taken from `mime`, then `name`, then the content. The
/// matching block is filled in, ready for [`parse_result`]. There's no
/// [`ImageInfo`].
///
/// Returns `None` if the kind can't be worked out.
pub fn read_sidecar(bytes: &[u8], name: Option<&str>, mime: Option<&str>) -> Option<ReadResult> {
    let Some(kind) = mime
        .and_then(SidecarType::from_mime)
        .or_else(|| name.and_then(SidecarType::from_name))
        .or_else(|| SidecarType::sniff(bytes))
    else {
        log::warn!("Unknown sidecar file. mime: `{mime:?}`, name: `{name:?}`");
        return None;
    };
    log::debug!("Reading sidecar as `{kind:?}`.");

    let mut result = ReadResult::default();
    let content = bytes.to_vec();
    match kind {
        SidecarType::Exif => result.exif = Some(Metadata::new(content)),
        SidecarType::Xmp => result.xmp = Some(Metadata::new(content)),
        SidecarType::Icc => result.icc = Some(Metadata::new(content)),
    }

    Some(result)
}

/// Whether [`read_file`] supports a file with this name or MIME type.
///
/// A declared MIME type is trusted over the name.
pub fn is_supported_image_file(name: Option<&str>, mime: Option<&str>) -> bool {
    let ty = match mime.filter(|m| !m.is_empty()) {
        Some(mime) => ImageType::from_mime(mime),
        None => name.and_then(ImageType::from_name),
    };

    ty.is_some_and(|ty| ty.is_supported())
}

/// Whether a file looks like a standalone Exif, XMP or ICC file.
pub fn is_supported_sidecar_file(name: Option<&str>, mime: Option<&str>) -> bool {
    mime.and_then(SidecarType::from_mime).is_some()
        || name.and_then(SidecarType::from_name).is_some()
}

pub(crate) mod util {
    /// Helper function to initialize the logger for testing.
    #[cfg(test)]
    pub fn logger() {
        _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::max())
            .format_file(true)
            .format_line_number(true)
            .try_init();
    }
}
