//! XMP is RDF serialized as XML.
//!
//! Properties live on `rdf:Description` elements inside a single `rdf:RDF`
//! element, either as attributes or as child elements. This parser reads
//! the anonymous descriptions (those with an empty or missing `rdf:about`)
//! and groups their properties by namespace prefix.
//!
//! Property values take their shape from the XML:
//!
//! - a leaf element gives its text
//! - a leaf with attributes gives a struct of those attributes
//! - `rdf:Seq` and `rdf:Bag` give lists, `rdf:Alt` gives its first item
//! - `rdf:parseType="Resource"` and nested `rdf:Description` give structs
//!
//! Properties registered in an [`XmpTagTypes`] table are then coerced into
//! numbers, dates, and so on.

use std::collections::BTreeMap;

use image_info_extractor_types::xmp::XmpTagTypes;
use xmltree::{AttributeName, Element, XMLNode};

pub use self::{
    error::XmpError,
    value::{XmpStruct, XmpValue},
};

mod error;
mod value;

/// This represents the `rdf:` prefix in various collection/container types in
/// XMP through the "RDF/XML" specification.
///
/// We use it to compare namespaces and check which elements we've got.
const RDF_NAMESPACE: &str = r"http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// The namespace of `x:xmpmeta` and its `x:xmptk` attribute.
const X_NAMESPACE: &str = r"adobe:ns:meta/";

/// The namespace of `xmpNote:HasExtendedXMP`.
const XMP_NOTE_NAMESPACE: &str = r"http://ns.adobe.com/xmp/note/";

/// Properties of one namespace, keyed by local name.
pub type XmpGroup = BTreeMap<String, XmpValue>;

/// A parsed XMP packet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Xmp {
    /// Namespace prefix (`"exif"`, `"dc"`, ...) to its properties.
    pub groups: BTreeMap<String, XmpGroup>,
}

impl Xmp {
    /// Grabs a property by prefix and local name.
    pub fn get(&self, prefix: &str, name: &str) -> Option<&XmpValue> {
        self.groups.get(prefix)?.get(name)
    }

    /// The GUID of the Extended XMP packet, if this packet announces one.
    pub fn extended_xmp_guid(&self) -> Option<&str> {
        self.get("xmpNote", "HasExtendedXMP")?.as_str()
    }
}

/// Parses an XMP packet with the built-in tag types.
pub fn parse(bytes: &[u8]) -> Result<Xmp, XmpError> {
    parse_with(bytes, &XmpTagTypes::default())
}

/// Parses an XMP packet, coercing properties with the given table.
pub fn parse_with(bytes: &[u8], types: &XmpTagTypes) -> Result<Xmp, XmpError> {
    let document = Element::parse(bytes).inspect_err(|e| {
        log::error!("Couldn't parse XMP as XML. err: {e}");
    })?;

    let mut xmp = Xmp::default();
    let walker = Walker { types };

    // a couple of attributes on the root are worth keeping
    for (key, value) in &document.attributes {
        let wanted = match key.namespace_ref() {
            Some(X_NAMESPACE) => key.local_name == "xmptk",
            Some(XMP_NOTE_NAMESPACE) => key.local_name == "HasExtendedXMP",
            _ => false,
        };
        if let (true, Some(prefix)) = (wanted, key.prefix_ref()) {
            xmp.groups
                .entry(prefix.to_string())
                .or_default()
                .insert(key.local_name.clone(), XmpValue::Text(value.clone()));
        }
    }

    let Some(rdf) = find_rdf(&document) else {
        log::warn!("XMP packet has no `rdf:RDF` element.");
        return Ok(xmp);
    };

    for description in child_elements(rdf) {
        if description.name != "Description" || !is_rdf(description.namespace.as_deref()) {
            log::trace!("Skipping `{}` inside `rdf:RDF`.", description.name);
            continue;
        }

        let about = description
            .attributes
            .iter()
            .find(|(key, _)| is_rdf_attr(key, "about"))
            .map(|(_, value)| value.as_str());
        if about.is_some_and(|about| !about.is_empty()) {
            log::debug!("Skipping `rdf:Description` about `{about:?}`.");
            continue;
        }

        for (key, value) in &description.attributes {
            let Some(prefix) = key.prefix_ref().filter(|p| !matches!(*p, "rdf" | "xmlns" | "xml"))
            else {
                continue;
            };
            let qualified = format!("{prefix}:{}", key.local_name);
            let value = walker.typed(&qualified, XmpValue::Text(value.clone()));
            xmp.groups
                .entry(prefix.to_string())
                .or_default()
                .insert(key.local_name.clone(), value);
        }

        for property in child_elements(description) {
            let Some(prefix) = property.prefix.as_deref().filter(|p| *p != "rdf") else {
                log::warn!("Skipping unprefixed property `{}`.", property.name);
                continue;
            };
            let qualified = format!("{prefix}:{}", property.name);
            let value = walker.typed(&qualified, walker.element_value(property));
            xmp.groups
                .entry(prefix.to_string())
                .or_default()
                .insert(property.name.clone(), value);
        }
    }

    log::debug!("Parsed XMP with `{}` groups.", xmp.groups.len());
    Ok(xmp)
}

/// Depth-first search for `rdf:RDF`, starting at `element` itself.
fn find_rdf(element: &Element) -> Option<&Element> {
    if element.name == "RDF" && is_rdf(element.namespace.as_deref()) {
        return Some(element);
    }
    child_elements(element).find_map(find_rdf)
}

fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(XMLNode::as_element)
}

fn is_rdf(namespace: Option<&str>) -> bool {
    namespace == Some(RDF_NAMESPACE)
}

fn is_rdf_attr(key: &AttributeName, local_name: &str) -> bool {
    key.local_name == local_name
        && (is_rdf(key.namespace_ref()) || key.prefix_ref() == Some("rdf"))
}

fn parse_type(element: &Element) -> Option<&str> {
    element
        .attributes
        .iter()
        .find(|(key, _)| is_rdf_attr(key, "parseType"))
        .map(|(_, value)| value.as_str())
}

fn text(element: &Element) -> String {
    element
        .get_text()
        .map(|text| text.into_owned())
        .unwrap_or_default()
}

/// Turns elements into values, coercing with a tag table.
struct Walker<'t> {
    types: &'t XmpTagTypes,
}

impl Walker<'_> {
    fn typed(&self, qualified_name: &str, value: XmpValue) -> XmpValue {
        match self.types.get(qualified_name) {
            Some(kind) => value::coerce(qualified_name, kind, value),
            None => value,
        }
    }

    /// Reads a property element by its shape.
    fn element_value(&self, element: &Element) -> XmpValue {
        let children: Vec<&Element> = child_elements(element).collect();

        match children.as_slice() {
            [] if element.attributes.is_empty() => XmpValue::Text(text(element)),
            [] => XmpValue::Struct(self.attributes_struct(element)),
            [only] if only.prefix.as_deref() == Some("rdf") => self.rdf_value(only),
            _ => match parse_type(element) {
                Some("Resource") => XmpValue::Struct(self.children_struct(element)),
                Some(other) => {
                    log::warn!("Unsupported `rdf:parseType`: `{other}`");
                    XmpValue::Null
                }
                None => {
                    log::warn!("Expected `rdf:parseType` on `{}`.", element.name);
                    XmpValue::Null
                }
            },
        }
    }

    /// Reads the single `rdf:` child of a property.
    fn rdf_value(&self, rdf: &Element) -> XmpValue {
        match rdf.name.as_str() {
            "Seq" | "Bag" => XmpValue::List(
                child_elements(rdf)
                    .map(|li| self.list_item(li))
                    .collect(),
            ),
            "Alt" => child_elements(rdf)
                .next()
                .map_or(XmpValue::Null, |li| XmpValue::Text(text(li))),
            "Description" => {
                let mut fields = self.attributes_struct(rdf);
                fields.extend(self.children_struct(rdf));
                XmpValue::Struct(fields)
            }
            other => {
                log::warn!("Unsupported child element: `rdf:{other}`");
                XmpValue::Null
            }
        }
    }

    fn list_item(&self, li: &Element) -> XmpValue {
        let has_fields = li
            .attributes
            .keys()
            .any(|key| !matches!(key.prefix_ref(), Some("rdf" | "xml")));

        if parse_type(li) == Some("Resource") {
            XmpValue::Struct(self.children_struct(li))
        } else if has_fields {
            XmpValue::Struct(self.attributes_struct(li))
        } else if child_elements(li).next().is_some() {
            self.element_value(li)
        } else {
            XmpValue::Text(text(li))
        }
    }

    /// Every attribute outside the `rdf:` and `xml:` namespaces.
    fn attributes_struct(&self, element: &Element) -> XmpStruct {
        element
            .attributes
            .iter()
            .filter_map(|(key, value)| {
                let prefix = key.prefix_ref().filter(|p| !matches!(*p, "rdf" | "xml"))?;
                let qualified = format!("{prefix}:{}", key.local_name);
                Some((
                    key.local_name.clone(),
                    self.typed(&qualified, XmpValue::Text(value.clone())),
                ))
            })
            .collect()
    }

    fn children_struct(&self, element: &Element) -> XmpStruct {
        child_elements(element)
            .map(|child| {
                let qualified = match child.prefix.as_deref() {
                    Some(prefix) => format!("{prefix}:{}", child.name),
                    None => child.name.clone(),
                };
                (
                    child.name.clone(),
                    self.typed(&qualified, self.element_value(child)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use image_info_extractor_types::xmp::{XmpTagTypes, XmpValueKind, vendor};

    use super::{XmpValue, parse, parse_with};
    use crate::util::logger;

    const PACKET: &str = r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/" x:xmptk="XMP Core 6.0.0">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:tiff="http://ns.adobe.com/tiff/1.0/"
        xmlns:exif="http://ns.adobe.com/exif/1.0/"
        xmlns:dc="http://purl.org/dc/elements/1.1/"
        xmlns:xmp="http://ns.adobe.com/xap/1.0/"
        tiff:Orientation="6"
        exif:FNumber="28/10"
        xmp:Rating="4">
      <dc:title>
        <rdf:Alt><rdf:li xml:lang="x-default">Harbour</rdf:li></rdf:Alt>
      </dc:title>
      <dc:subject>
        <rdf:Bag><rdf:li>boats</rdf:li><rdf:li>sunset</rdf:li></rdf:Bag>
      </dc:subject>
      <exif:Flash rdf:parseType="Resource">
        <exif:Fired>True</exif:Fired>
        <exif:Mode>2</exif:Mode>
      </exif:Flash>
    </rdf:Description>
    <rdf:Description rdf:about="uuid:other" xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:creator>Nobody</dc:creator>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#;

    #[test]
    fn reads_attributes_and_elements() {
        logger();
        let xmp = parse(PACKET.as_bytes()).unwrap();

        assert_eq!(
            xmp.get("x", "xmptk"),
            Some(&XmpValue::Text("XMP Core 6.0.0".into()))
        );
        assert_eq!(xmp.get("tiff", "Orientation"), Some(&XmpValue::Integer(6)));
        assert_eq!(xmp.get("exif", "FNumber"), Some(&XmpValue::Real(2.8)));
        assert_eq!(
            xmp.get("dc", "title").and_then(XmpValue::as_str),
            Some("Harbour")
        );
        assert_eq!(
            xmp.get("dc", "subject"),
            Some(&XmpValue::List(vec![
                XmpValue::Text("boats".into()),
                XmpValue::Text("sunset".into())
            ]))
        );

        let flash = xmp.get("exif", "Flash").and_then(XmpValue::as_struct).unwrap();
        assert_eq!(flash.get("Fired"), Some(&XmpValue::Boolean(true)));
        assert_eq!(flash.get("Mode"), Some(&XmpValue::Integer(2)));
    }

    #[test]
    fn skips_descriptions_about_other_subjects() {
        logger();
        let xmp = parse(PACKET.as_bytes()).unwrap();
        assert_eq!(xmp.get("dc", "creator"), None);
    }

    #[test]
    fn seq_of_attribute_structs() {
        logger();
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description xmlns:ns="ns:test/">
    <ns:Points>
      <rdf:Seq>
        <rdf:li ns:X="1" ns:Y="2"/>
        <rdf:li rdf:parseType="Resource"><ns:X>3</ns:X></rdf:li>
      </rdf:Seq>
    </ns:Points>
    <ns:Broken><ns:A>1</ns:A><ns:B>2</ns:B></ns:Broken>
  </rdf:Description>
</rdf:RDF>"#;

        let xmp = parse(xml.as_bytes()).unwrap();
        let points = xmp.get("ns", "Points").and_then(XmpValue::as_list).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[0].as_struct().unwrap().get("Y"),
            Some(&XmpValue::Text("2".into()))
        );
        assert_eq!(
            points[1].as_struct().unwrap().get("X"),
            Some(&XmpValue::Text("3".into()))
        );

        // two children and no `rdf:parseType`
        assert_eq!(xmp.get("ns", "Broken"), Some(&XmpValue::Null));
    }

    #[test]
    fn vendor_types_are_opt_in() {
        logger();
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about="" xmlns:drone-dji="http://www.dji.com/drone-dji/1.0/"
      drone-dji:GimbalYawDegree="-12.5"/>
</rdf:RDF>"#;

        let plain = parse(xml.as_bytes()).unwrap();
        assert_eq!(
            plain.get("drone-dji", "GimbalYawDegree"),
            Some(&XmpValue::Text("-12.5".into()))
        );

        let types = XmpTagTypes::default().with(vendor::dji());
        let typed = parse_with(xml.as_bytes(), &types).unwrap();
        assert_eq!(
            typed.get("drone-dji", "GimbalYawDegree"),
            Some(&XmpValue::Real(-12.5))
        );

        let custom = XmpTagTypes::empty().with([("drone-dji:GimbalYawDegree", XmpValueKind::Integer)]);
        assert_eq!(
            parse_with(xml.as_bytes(), &custom).unwrap().get("drone-dji", "GimbalYawDegree"),
            Some(&XmpValue::Integer(-12))
        );
    }

    #[test]
    fn missing_rdf_is_empty_and_bad_xml_is_an_error() {
        logger();
        let xmp = parse(br#"<x:xmpmeta xmlns:x="adobe:ns:meta/"/>"#).unwrap();
        assert!(xmp.groups.is_empty());

        assert!(parse(b"<x:xmpmeta").is_err());
    }
}
