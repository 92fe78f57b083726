use winnow::{
    ModalResult, Parser as _,
    binary::be_u32,
    error::ContextError,
    token::take,
};

use crate::providers::shared::desc;

/// One PNG chunk, borrowing its data from the file.
#[derive(Debug, PartialEq)]
pub struct PngChunk<'a> {
    pub ty: [u8; 4],
    pub data: &'a [u8],

    /// Read, but never checked.
    pub crc: u32,
}

/// Parses out a chunk of a PNG file.
///
/// The layout is:
///
/// - let len = input.read_u32()
/// - let ty = input.read(4)
/// - let data = input.read(len)
/// - let crc = input.read_u32()
pub fn chunk<'a>(input: &mut &'a [u8]) -> ModalResult<PngChunk<'a>, ContextError> {
    let len: u32 = be_u32
        .context(desc("chunk length"))
        .parse_next(input)?;

    let ty: [u8; 4] = take(4_usize)
        .try_map(<[u8; 4]>::try_from)
        .context(desc("chunk type"))
        .parse_next(input)?;

    let data: &[u8] = take(len)
        .context(desc("chunk data"))
        .parse_next(input)?;

    let crc: u32 = be_u32
        .context(desc("chunk CRC"))
        .parse_next(input)?;

    Ok(PngChunk { ty, data, crc })
}

/// An `iTXt` chunk's fields.
#[derive(Debug, PartialEq)]
pub struct InternationalText<'a> {
    pub keyword: &'a [u8],
    pub compressed: bool,
    pub compression_method: u8,
    pub language_tag: &'a [u8],
    pub translated_keyword: &'a [u8],

    /// Still compressed, if `compressed` is set.
    pub text: &'a [u8],
}

/// Splits off everything before the next NUL, consuming the NUL too.
fn nul_terminated<'a>(input: &mut &'a [u8]) -> Option<&'a [u8]> {
    let nul = input.iter().position(|b| *b == 0)?;
    let (before, after) = input.split_at(nul);
    *input = &after[1..];
    Some(before)
}

/// Splits an `iTXt` chunk into its fields.
pub fn international_text(mut data: &[u8]) -> Option<InternationalText<'_>> {
    let input = &mut data;

    let keyword = nul_terminated(input)?;
    let (&[flag, method], rest) = input.split_first_chunk::<2>()?;
    *input = rest;

    let language_tag = nul_terminated(input)?;
    let translated_keyword = nul_terminated(input)?;

    Some(InternationalText {
        keyword,
        compressed: flag != 0,
        compression_method: method,
        language_tag,
        translated_keyword,
        text: input,
    })
}

/// Splits an `iCCP` chunk into its profile name, compression method, and
/// compressed profile.
pub fn icc_profile(mut data: &[u8]) -> Option<(&[u8], u8, &[u8])> {
    let name = nul_terminated(&mut data)?;
    let (method, profile) = data.split_first()?;
    Some((name, *method, profile))
}
