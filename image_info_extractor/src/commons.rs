//! Small byte and path helpers shared by every reader.

use std::io::Read as _;

use flate2::read::ZlibDecoder;

/// Checks whether `array` holds `search` starting at `position`.
///
/// Returns `false` when `search` would run past the end of `array`.
pub fn starts_with_array(array: &[u8], search: &[u8], position: usize) -> bool {
    let Some(end) = position.checked_add(search.len()) else {
        return false;
    };

    array.get(position..end).is_some_and(|window| window == search)
}

/// Finds the first index at or after `start` where `search` occurs.
///
/// An empty `search` is found at `start`, as long as `start` is within the
/// array.
pub fn index_of_array(array: &[u8], search: &[u8], start: usize) -> Option<usize> {
    if start.checked_add(search.len())? > array.len() {
        return None;
    }
    if search.is_empty() {
        return Some(start);
    }

    array[start..]
        .windows(search.len())
        .position(|window| window == search)
        .map(|found| found + start)
}

/// Renders bytes as lowercase hex, two characters per byte.
pub fn to_hex_string(bytes: &[u8]) -> String {
    use core::fmt::Write as _;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        _ = write!(s, "{b:02x}");
        s
    })
}

/// Parses a hex string back into bytes.
///
/// Returns `None` if the string has an odd length or a non-hex character.
pub fn from_hex_string(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }

    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let pair = core::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}

/// Finds the extension of a file name, including its leading dot.
///
/// Dotfiles (like `.rc`) and names without a dot have no extension.
pub fn extname(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[pos..],
        _ => "",
    }
}

/// Grabs the last path component, removing `ext` from its end if present.
pub fn basename<'a>(path: &'a str, ext: Option<&str>) -> &'a str {
    let name = path.rsplit_once('/').map_or(path, |(_, name)| name);

    match ext {
        Some(ext) if !ext.is_empty() => name.strip_suffix(ext).unwrap_or(name),
        _ => name,
    }
}

/// Joins byte slices into one buffer.
pub fn concat_arrays<T: AsRef<[u8]>>(sources: &[T]) -> Vec<u8> {
    let total: usize = sources.iter().map(|s| s.as_ref().len()).sum();

    sources
        .iter()
        .fold(Vec::with_capacity(total), |mut acc, source| {
            acc.extend_from_slice(source.as_ref());
            acc
        })
}

/// Inflates a zlib stream.
pub(crate) fn inflate(compressed: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(compressed).read_to_end(&mut out)?;
    Ok(out)
}

/// Decodes ISO-8859-1 bytes. Every byte maps to the code point of its value.
pub(crate) fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::logger;

    #[test]
    fn starts_with() {
        logger();
        assert!(starts_with_array(&[1, 2, 3, 4], &[1, 2, 3], 0));
        assert!(starts_with_array(&[1, 2, 3, 4], &[2, 3, 4], 1));
        assert!(!starts_with_array(&[1, 2, 3, 4], &[3, 4, 5], 2));
        assert!(!starts_with_array(&[1, 2], &[1], usize::MAX));
    }

    #[test]
    fn index_of() {
        logger();
        assert_eq!(index_of_array(&[1, 2, 3, 4], &[1, 2, 3], 0), Some(0));
        assert_eq!(index_of_array(&[1, 2, 3, 4], &[1, 3], 0), None);
        assert_eq!(index_of_array(&[1, 2, 3, 4], &[2, 3, 4], 1), Some(1));
        assert_eq!(index_of_array(&[1, 2, 3, 4], &[2, 3, 4], 2), None);
        assert_eq!(index_of_array(&[1, 2, 3, 4], &[], 3), Some(3));
        assert_eq!(index_of_array(&[1, 2, 1, 2, 3], &[1, 2, 3], 0), Some(2));
    }

    #[test]
    fn hex() {
        logger();
        let bytes = [
            0x20, 0xb4, 0xf4, 0x21, 0xb1, 0xf6, 0x4b, 0x3f, 0xa7, 0x46, 0x8f, 0x65, 0x77, 0xf0,
            0x0d, 0xa2,
        ];
        let hex = "20b4f421b1f64b3fa7468f6577f00da2";

        assert_eq!(to_hex_string(&bytes), hex);
        assert_eq!(from_hex_string(hex).as_deref(), Some(bytes.as_slice()));
        assert_eq!(from_hex_string("abc"), None);
        assert_eq!(from_hex_string("zz"), None);
    }

    #[test]
    fn file_names() {
        logger();
        assert_eq!(extname("README.txt"), ".txt");
        assert_eq!(extname("README"), "");
        assert_eq!(extname("a.tar.gz"), ".gz");
        assert_eq!(extname(".rc"), "");

        assert_eq!(basename("/photos/cat.jpg", None), "cat.jpg");
        assert_eq!(basename("/photos/cat.jpg", Some(".jpg")), "cat");
        assert_eq!(basename("cat.jpg", Some(".png")), "cat.jpg");
    }

    #[test]
    fn concat() {
        logger();
        let parts: [&[u8]; 4] = [&[2, 101], &[32], &[], &[87, 33]];
        let joined = concat_arrays(&parts);
        assert_eq!(joined, [2, 101, 32, 87, 33]);
    }
}
