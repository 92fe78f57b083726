use winnow::{
    ModalResult, Parser as _,
    binary::le_u32,
    error::ContextError,
    token::take,
};

use crate::providers::shared::desc;

#[derive(Debug, PartialEq)]
pub struct RiffChunk<'a> {
    pub fourcc: [u8; 4],
    pub data: &'a [u8],
}

/// Parses out a chunk of the RIFF data.
///
/// The format in WebP is simple:
///
/// - let fourcc = input.read(4)
/// - let len = input.read_u32()
/// - let data = input.read(chunk_len)
///
/// Chunks with an odd length carry a padding byte after their data. It's
/// consumed here, if present.
pub fn chunk<'a>(input: &mut &'a [u8]) -> ModalResult<RiffChunk<'a>, ContextError> {
    let fourcc: [u8; 4] = take(4_usize)
        .try_map(<[u8; 4]>::try_from)
        .context(desc("fourcc"))
        .parse_next(input)?;

    let len: u32 = le_u32
        .context(desc("chunk length"))
        .parse_next(input)?;

    let data: &[u8] = take(len)
        .context(desc("chunk data"))
        .parse_next(input)?;

    // the final chunk may leave its padding byte off
    if len % 2 == 1 && !input.is_empty() {
        log::trace!("Skipping a padding byte in this chunk.");
        *input = &input[1..];
    }

    Ok(RiffChunk { fourcc, data })
}

#[cfg(test)]
mod tests {
    use super::{RiffChunk, chunk};
    use crate::util::logger;

    #[test]
    fn odd_chunks_are_padded() {
        logger();
        let mut input = b"EXIF\x03\0\0\0abc\0XMP \x01\0\0\0x".as_slice();

        assert_eq!(
            chunk(&mut input).unwrap(),
            RiffChunk {
                fourcc: *b"EXIF",
                data: b"abc"
            }
        );
        assert_eq!(
            chunk(&mut input).unwrap(),
            RiffChunk {
                fourcc: *b"XMP ",
                data: b"x"
            }
        );
        assert!(input.is_empty());
    }

    #[test]
    fn short_chunk_fails() {
        logger();
        assert!(chunk(&mut b"ICCP\x10\0\0\0abc".as_slice()).is_err());
    }
}
