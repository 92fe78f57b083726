//! Box framing shared by everything in a BMFF file.

use winnow::{
    ModalResult, Parser as _,
    binary::{be_u32, be_u64, u8},
    error::ContextError,
    token::take,
};

use crate::providers::shared::desc;

/// A box's header says:
///
/// - what "type" it is (might be UUID)
/// - how large it is
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxHeader {
    /// How long the header is.
    pub header_len: u8,

    /// How large the box is. This includes the header's size.
    pub box_size: BoxSize,

    /// The box's type.
    pub box_type: BoxType,
}

/// A BMFF box's type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxType {
    /// Uses a short ID. No UUID.
    Id([u8; 4]),

    /// The short ID was b'uuid', so the box's actual type is defined by this
    /// UUID.
    Uuid([u8; 16]),
}

impl BoxType {
    /// The four-character code, or `uuid` for extended types.
    pub const fn fourcc(&self) -> [u8; 4] {
        match self {
            Self::Id(id) => *id,
            Self::Uuid(_) => *b"uuid",
        }
    }
}

/// The size of a box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxSize {
    /// The box is small. u32::MAX is its maximum length.
    Small(u32),

    /// We got a big box of 64-bit size!
    Large(u64),

    /// This is the last box in its container, so it continues until the end.
    Eof,
}

impl BoxHeader {
    /// Parses the header at the start of `input`.
    ///
    /// The input is left at the start of the payload.
    pub fn new(input: &mut &[u8]) -> ModalResult<BoxHeader, ContextError> {
        parse_header(input)
    }

    /// Finds payload's length (which is everything after the header).
    ///
    /// This is optional since with an EOF case, we don't know how much is
    /// left. We just know to parse the rest of the slice.
    pub fn payload_len(&self) -> Option<u64> {
        match self.box_size {
            BoxSize::Small(n) => Some(u64::from(n).saturating_sub(u64::from(self.header_len))),
            BoxSize::Large(n) => Some(n.saturating_sub(u64::from(self.header_len))),
            BoxSize::Eof => None,
        }
    }

    /// Takes this box's payload off the front of `input`.
    ///
    /// `input` must sit right after the header.
    pub fn payload<'input>(&self, input: &mut &'input [u8]) -> ModalResult<&'input [u8], ContextError> {
        let len: u64 = self.payload_len().unwrap_or(input.len() as u64);
        take(len)
            .context(desc("box payload"))
            .parse_next(input)
            .inspect_err(|e| log::warn!("Failed to fetch box payload! payload len: `{len}`, err: {e}"))
    }
}

pub fn parse_header(input: &mut &[u8]) -> ModalResult<BoxHeader, ContextError> {
    // the amount of bytes we took is given in the `BoxHeader`
    let start_len = input.len();

    let raw_size: u32 = be_u32.context(desc("box size")).parse_next(input)?;
    let raw_type: [u8; 4] = fourcc.context(desc("box type")).parse_next(input)?;

    let size: BoxSize = match raw_size {
        // the real size follows as a `u64`
        1_u32 => BoxSize::Large(
            be_u64
                .context(desc("box size (large)"))
                .parse_next(input)
                .inspect_err(|e| log::error!("Failed to find large box size! err: {e}"))?,
        ),

        // runs to the end
        0_u32 => BoxSize::Eof,

        _ => BoxSize::Small(raw_size),
    };

    let ty: BoxType = match &raw_type {
        b"uuid" => BoxType::Uuid(
            take(16_usize)
                .try_map(<[u8; 16]>::try_from)
                .context(desc("box UUID"))
                .parse_next(input)?,
        ),
        _ => BoxType::Id(raw_type),
    };

    Ok(BoxHeader {
        header_len: (start_len.saturating_sub(input.len())) as u8,
        box_size: size,
        box_type: ty,
    })
}

/// Takes four bytes as an array.
pub fn fourcc(input: &mut &[u8]) -> ModalResult<[u8; 4], ContextError> {
    take(4_usize)
        .try_map(<[u8; 4]>::try_from)
        .context(desc("fourcc"))
        .parse_next(input)
}

/// A box with a version and flags after its header.
///
/// The header itself is parsed separately, so this is only the
/// version/flags prefix of the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FullBox {
    pub version: u8,
    pub flags: [u8; 3],
}

impl FullBox {
    pub fn new(input: &mut &[u8]) -> ModalResult<Self, ContextError> {
        let version: u8 = u8
            .context(desc("version"))
            .parse_next(input)
            .inspect_err(|e| log::error!("Failed to grab full box's version! err: {e}"))?;

        let flags: [u8; 3] = take(3_usize)
            .try_map(<[u8; 3]>::try_from)
            .context(desc("flags"))
            .parse_next(input)
            .inspect_err(|e| log::error!("Couldn't get full box's flags! err: {e}"))?;

        Ok(FullBox { version, flags })
    }
}

/// The `ftyp` box, which names the file's brands.
#[derive(Clone, Debug, PartialEq)]
pub struct FtypBox {
    pub header: BoxHeader,
    pub major_brand: [u8; 4],
    pub minor_version: u32,
    pub compatible_brands: Vec<[u8; 4]>,
}

impl FtypBox {
    /// Parses the `ftyp` box, which must be first in the file.
    ///
    /// Returns `None` when the first box is something else.
    pub fn new(input: &mut &[u8]) -> Option<Self> {
        let header: BoxHeader = parse_header(input).ok()?;

        let BoxType::Id(id) = header.box_type else {
            return None;
        };
        if &id != b"ftyp" {
            log::debug!("First box wasn't `ftyp`. found: `{id:?}`");
            return None;
        }

        let Some(payload_len) = header.payload_len() else {
            log::warn!(
                "Payload length was infinite, but we're parsing the `ftyp` box! \
                That's not expected..."
            );
            return None;
        };
        let mut payload: &[u8] = take::<_, _, ContextError>(payload_len)
            .parse_next(input)
            .ok()?;

        let major_brand: [u8; 4] = fourcc(&mut payload).ok()?;
        let minor_version: u32 = be_u32::<_, ContextError>.parse_next(&mut payload).ok()?;

        let compatible_brands: Vec<[u8; 4]> = payload
            .chunks_exact(4)
            .filter_map(|c| <[u8; 4]>::try_from(c).ok())
            .collect();

        Some(Self {
            header,
            major_brand,
            minor_version,
            compatible_brands,
        })
    }
}

/// Splits a container payload into its child boxes.
///
/// Stops quietly at the first child that doesn't fit.
pub fn children<'input>(mut payload: &'input [u8]) -> Vec<(BoxHeader, &'input [u8])> {
    let input = &mut payload;
    let mut boxes = Vec::new();

    while !input.is_empty() {
        let Ok(header) = BoxHeader::new(input)
            .inspect_err(|e| log::warn!("Failed to construct box header from input. err: {e}"))
        else {
            break;
        };

        let Ok(body) = header.payload(input) else {
            break;
        };
        boxes.push((header, body));
    }

    boxes
}
