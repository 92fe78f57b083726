//! # Providers
//!
//! Container readers, one per file format.
//!
//! Each reader walks its container's framing (markers, chunks, boxes) to
//! find the raw bytes of any embedded metadata, plus whatever image
//! properties the framing itself describes. None of them decode pixels or
//! parse the metadata blocks; that's [`parse_result`](crate::parse_result)'s
//! job.

use crate::{error::ReadError, result::ReadResult, source::ByteSource};

pub mod heif;
pub mod jpeg;
pub mod png;
pub mod svg;
pub mod webp;

mod shared;

pub use self::{heif::Heif, jpeg::Jpeg, png::Png, svg::Svg, webp::Webp};

/// A container format that can be searched for metadata.
pub trait ContainerReader {
    /// An error that can occur when calling [`ContainerReader::read`].
    type Error: core::error::Error + Into<ReadError>;

    /// Checks the first few bytes of a file for this format's signature.
    fn magic_number(input: &[u8]) -> bool;

    /// Reads the container, collecting its metadata blocks.
    ///
    /// `Ok(None)` means the file is fine, but there was nothing worth
    /// returning.
    ///
    /// # Errors
    ///
    /// Fails when the file isn't really this format, or when its framing is
    /// too broken to keep walking.
    fn read<S: ByteSource + ?Sized>(source: &S) -> Result<Option<ReadResult>, Self::Error>;
}
