//! # Shared
//!
//! Parsing helpers used by more than one container reader.

use winnow::{
    ModalResult, Parser as _,
    error::{ContextError, StrContext, StrContextValue},
    token::{literal, take_till},
};

/// Creates a string description for `winnow` context.
pub const fn desc(s: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(s))
}

/// Takes a NUL-terminated UTF-8 string, consuming the NUL.
///
/// Fails if there's no NUL or the bytes before it aren't UTF-8.
pub fn parse_nul_terminated_str<'input>(
    input: &mut &'input [u8],
) -> ModalResult<&'input str, ContextError> {
    let s: &str = take_till(0.., 0_u8)
        .try_map(core::str::from_utf8)
        .context(desc("UTF-8 string"))
        .parse_next(input)?;
    literal(0_u8).context(desc("NUL")).parse_next(input)?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::parse_nul_terminated_str;
    use crate::util::logger;

    #[test]
    fn nul_terminated() {
        logger();
        let mut input: &[u8] = b"XMP\0rest";
        assert_eq!(parse_nul_terminated_str(&mut input).unwrap(), "XMP");
        assert_eq!(input, b"rest");

        let mut empty: &[u8] = b"\0";
        assert_eq!(parse_nul_terminated_str(&mut empty).unwrap(), "");

        let mut unterminated: &[u8] = b"abc";
        assert!(parse_nul_terminated_str(&mut unterminated).is_err());
    }
}
