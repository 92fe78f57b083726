//! Lookup tables handed to the metadata parsers.
//!
//! Parsers never read global tables. Instead, they borrow a [`ParserConfig`]
//! for the duration of a parse. Its defaults hold the built-in tables; extend
//! them before parsing to teach the parsers about vendor tags.

use image_info_extractor_types::{
    exif::ExifTagNames, icc::IccTagNames, iptc::IptcDatasets, xmp::XmpTagTypes,
};

use crate::icc::IccTypeDecoders;

/// The tables used to name and type parsed values.
#[derive(Clone, Debug, Default)]
pub struct ParserConfig {
    /// Exif tag ID to name, for the main and GPS IFDs.
    pub exif_tag_names: ExifTagNames,

    /// XMP `prefix:name` to value type.
    pub xmp_tag_types: XmpTagTypes,

    /// ICC tag signature to name.
    pub icc_tag_names: IccTagNames,

    /// ICC tag type to decoder.
    pub icc_type_decoders: IccTypeDecoders,

    /// IPTC `(record, dataset)` to name and type.
    pub iptc_datasets: IptcDatasets,
}

impl ParserConfig {
    pub fn with_exif_tag_names(mut self, names: ExifTagNames) -> Self {
        self.exif_tag_names = names;
        self
    }

    pub fn with_xmp_tag_types(mut self, types: XmpTagTypes) -> Self {
        self.xmp_tag_types = types;
        self
    }

    /// Merges more XMP tag types into the current table, replacing any
    /// existing entries with the same name.
    ///
    /// ```
    /// use image_info_extractor::ParserConfig;
    /// use image_info_extractor_types::xmp::vendor;
    ///
    /// let config = ParserConfig::default().extend_xmp_tag_types(vendor::dji());
    /// assert!(config.xmp_tag_types.get("drone-dji:GimbalYawDegree").is_some());
    /// ```
    pub fn extend_xmp_tag_types<N, I>(mut self, types: I) -> Self
    where
        N: Into<std::borrow::Cow<'static, str>>,
        I: IntoIterator<Item = (N, image_info_extractor_types::xmp::XmpValueKind)>,
    {
        self.xmp_tag_types.extend(types);
        self
    }

    pub fn with_icc_tag_names(mut self, names: IccTagNames) -> Self {
        self.icc_tag_names = names;
        self
    }

    pub fn with_icc_type_decoders(mut self, decoders: IccTypeDecoders) -> Self {
        self.icc_type_decoders = decoders;
        self
    }

    pub fn with_iptc_datasets(mut self, datasets: IptcDatasets) -> Self {
        self.iptc_datasets = datasets;
        self
    }
}
