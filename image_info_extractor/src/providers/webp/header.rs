use winnow::{
    ModalResult, Parser as _,
    binary::le_u32,
    error::{ContextError, StrContext, StrContextValue},
    token::literal,
};

#[derive(Clone, Debug, PartialEq, PartialOrd, Hash)]
pub struct WebpFileHeader {
    /// How many bytes follow the size field.
    ///
    /// For a well-formed file, this is the file's length minus eight.
    pub riff_size: u32,
}

/// Parses out the WebP file header block.
///
/// This should be the first thing in the file: `RIFF`, a little-endian
/// size, then `WEBP`.
pub fn webp_file_header(input: &mut &[u8]) -> ModalResult<WebpFileHeader, ContextError> {
    const RIFF: &[u8] = b"RIFF";
    literal(RIFF)
        .void()
        .context(StrContext::Expected(StrContextValue::StringLiteral("RIFF")))
        .parse_next(input)?;

    let riff_size: u32 = le_u32
        .context(StrContext::Expected(StrContextValue::Description("RIFF size")))
        .parse_next(input)?;

    const WEBP: &[u8] = b"WEBP";
    literal(WEBP)
        .void()
        .context(StrContext::Expected(StrContextValue::StringLiteral("WEBP")))
        .parse_next(input)?;

    Ok(WebpFileHeader { riff_size })
}

#[cfg(test)]
mod tests {
    use super::{WebpFileHeader, webp_file_header};
    use crate::util::logger;

    #[test]
    fn reads_header() {
        logger();
        let mut input = b"RIFF\x04\0\0\0WEBPrest".as_slice();
        assert_eq!(
            webp_file_header(&mut input).unwrap(),
            WebpFileHeader { riff_size: 4 }
        );
        assert_eq!(input, b"rest");
    }

    #[test]
    fn rejects_other_riff_files() {
        logger();
        assert!(webp_file_header(&mut b"RIFF\x04\0\0\0WAVE".as_slice()).is_err());
        assert!(webp_file_header(&mut b"RIF".as_slice()).is_err());
    }
}
