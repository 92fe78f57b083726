//! SVG is text, so there's no framing to walk.
//!
//! XMP is found by searching for the `x:xmpmeta` element's tags, and the
//! root `<svg>` element gives the size. A file that isn't well-formed XML
//! keeps its XMP, but has no size.

use xmltree::Element;

use crate::{
    commons::index_of_array,
    error::SourceError,
    result::{ImageInfo, Metadata, MetadataFlags, ReadResult},
    source::ByteSource,
};

use super::ContainerReader;

const XMP_START: &[u8] = b"<x:xmpmeta";
const XMP_END: &[u8] = b"</x:xmpmeta>";

/// How far into the file [`Svg::magic_number`] looks for the root tag.
const SNIFF_LEN: usize = 256;

/// An SVG image.
#[derive(Clone, Copy, Debug)]
pub struct Svg;

impl ContainerReader for Svg {
    type Error = SvgError;

    fn magic_number(input: &[u8]) -> bool {
        let head = &input[..input.len().min(SNIFF_LEN)];
        let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
        let trimmed = head.trim_ascii_start();

        trimmed.starts_with(b"<svg")
            || (trimmed.starts_with(b"<?xml") && index_of_array(head, b"<svg", 0).is_some())
    }

    fn read<S: ByteSource + ?Sized>(source: &S) -> Result<Option<ReadResult>, Self::Error> {
        let file = source.read_all()?;

        let mut result = ReadResult::default();
        let mut flags = MetadataFlags::default();

        if let Some(xmp) = find_xmp(&file) {
            log::debug!("Found XMP. len: `{}`", xmp.len());
            result.xmp = Some(Metadata::new(xmp.to_vec()));
            flags.set(MetadataFlags::XMP);
        }

        let mut info = ImageInfo {
            alpha: true,
            lossless: true,
            flags,
            ..Default::default()
        };

        match Element::parse(&file[..]) {
            Ok(root) if root.name != "svg" => {
                log::error!("SVG root element is `{}`, not `svg`.", root.name);
                return Err(SvgError::NotSvg { root: root.name });
            }
            Ok(root) => {
                let (width, height) = root_size(&root);
                info.width = width;
                info.height = height;
            }
            Err(e) => log::warn!("SVG isn't well-formed XML, so it has no size. err: {e}"),
        }
        result.info = Some(info);

        Ok(Some(result))
    }
}

/// The root's `width` and `height`, each falling back to the `viewBox`.
fn root_size(root: &Element) -> (Option<u32>, Option<u32>) {
    let attr = |local: &str| {
        root.attributes
            .iter()
            .find(|(name, _)| name.local_name == local)
            .map(|(_, value)| value.as_str())
    };

    let view_box = attr("viewBox").and_then(view_box_size);
    (
        attr("width").and_then(length).or(view_box.map(|(w, _)| w)),
        attr("height").and_then(length).or(view_box.map(|(_, h)| h)),
    )
}

/// Finds `<x:xmpmeta ...>...</x:xmpmeta>`, tags included.
fn find_xmp(text: &[u8]) -> Option<&[u8]> {
    let start = index_of_array(text, XMP_START, 0)?;
    let end = index_of_array(text, XMP_END, start)?;
    Some(&text[start..end + XMP_END.len()])
}

/// Reads a length like `120`, `120.5px` or `3e2`, rounding to whole
/// pixels.
///
/// Percentages don't say anything about the image, so they're ignored.
fn length(value: &str) -> Option<u32> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }

    let end = value
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')))
        .unwrap_or(value.len());
    to_pixels(value[..end].parse().ok()?)
}

/// The width and height from a `viewBox`: its last two numbers.
fn view_box_size(value: &str) -> Option<(u32, u32)> {
    let numbers: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    let [_, _, width, height] = numbers.as_slice() else {
        log::warn!("Ignoring a malformed `viewBox`: `{value}`");
        return None;
    };
    Some((to_pixels(*width)?, to_pixels(*height)?))
}

fn to_pixels(n: f64) -> Option<u32> {
    (n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX)).then(|| n.round() as u32)
}

/// A problem that stopped an SVG file from being read.
#[derive(Clone, Debug, PartialEq)]
pub enum SvgError {
    /// The byte source failed.
    Source(SourceError),

    /// The XML's root element isn't `<svg>`.
    NotSvg { root: String },
}

impl core::fmt::Display for SvgError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Source(e) => write!(f, "Couldn't read the SVG file. err: {e}"),
            Self::NotSvg { root } => write!(f, "Root element is `{root}`, not `svg`."),
        }
    }
}

impl core::error::Error for SvgError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::NotSvg { .. } => None,
        }
    }
}

impl From<SourceError> for SvgError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Svg, SvgError, length, view_box_size};
    use crate::{providers::ContainerReader as _, result::MetadataFlags, util::logger};

    const XMP: &str = "<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"><rdf:RDF \
        xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\"/></x:xmpmeta>";

    #[test]
    fn size_and_xmp() {
        logger();
        let svg = format!(
            "<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" \
            width=\"120px\" height=\"80\"><metadata>{XMP}</metadata></svg>"
        );
        assert!(Svg::magic_number(svg.as_bytes()));

        let result = Svg::read(svg.as_bytes()).unwrap().unwrap();
        assert_eq!(result.xmp.unwrap().content, XMP.as_bytes());

        let info = result.info.unwrap();
        assert_eq!((info.width, info.height), (Some(120), Some(80)));
        assert!(info.alpha);
        assert!(info.lossless);
        assert_eq!(info.flags.bits(), MetadataFlags::XMP);
    }

    #[test]
    fn view_box_fallback() {
        logger();
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 300.4 150\"/>";
        let result = Svg::read(svg.as_slice()).unwrap().unwrap();
        assert!(result.xmp.is_none());

        let info = result.info.unwrap();
        assert_eq!((info.width, info.height), (Some(300), Some(150)));
        assert_eq!(info.flags.bits(), 0);
    }

    #[test]
    fn lengths() {
        logger();
        assert_eq!(length(" 42.6mm "), Some(43));
        assert_eq!(length("100%"), None);
        assert_eq!(length("auto"), None);
        assert_eq!(view_box_size("0,0,16,9"), Some((16, 9)));
        assert_eq!(view_box_size("0 0 16"), None);
    }

    #[test]
    fn malformed_xml_keeps_its_xmp() {
        logger();
        let svg = format!("<svg width=\"10\" height=\"10\"><metadata>{XMP}</metadata>");

        let result = Svg::read(svg.as_bytes()).unwrap().unwrap();
        assert_eq!(result.xmp.unwrap().content, XMP.as_bytes());

        let info = result.info.unwrap();
        assert_eq!((info.width, info.height), (None, None));
        assert_eq!(info.flags.bits(), MetadataFlags::XMP);

        let result = Svg::read(b"<svg width=\"1\"".as_slice()).unwrap().unwrap();
        assert!(result.xmp.is_none());
        assert_eq!(result.info.unwrap().width, None);
    }

    #[test]
    fn errors() {
        logger();
        assert_eq!(
            Svg::read(b"<html/>".as_slice()),
            Err(SvgError::NotSvg {
                root: "html".into()
            })
        );
        assert!(!Svg::magic_number(b"<html><svg/></html>"));
    }
}
