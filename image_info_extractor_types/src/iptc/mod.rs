//! The IPTC-IIM dataset table.
//!
//! IIM datasets are addressed by a `(record, dataset)` number pair. Each one
//! has a name, a value type, and may be allowed to repeat (like `Keywords`).

use std::borrow::Cow;

use rustc_hash::FxHashMap;

/// How a dataset's bytes are decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IptcValueKind {
    /// Latin-1 text.
    String,
    /// Numeric characters, kept as text.
    Digits,
    /// A one-byte unsigned integer.
    Uint8,
    /// A big-endian two-byte unsigned integer.
    Uint16,
    /// A big-endian four-byte unsigned integer.
    Uint32,
    /// Raw bytes.
    Undefined,
}

impl IptcValueKind {
    /// The exact payload length this kind requires, if it's fixed-width.
    pub const fn fixed_len(&self) -> Option<usize> {
        match self {
            Self::Uint8 => Some(1),
            Self::Uint16 => Some(2),
            Self::Uint32 => Some(4),
            Self::String | Self::Digits | Self::Undefined => None,
        }
    }
}

/// A dataset's description.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IptcDataset {
    pub name: Cow<'static, str>,
    pub kind: IptcValueKind,

    /// Repeatable datasets collect every occurrence into a list.
    pub repeatable: bool,
}

/// Gives the human-readable name of an IIM record.
pub const fn record_name(record: u8) -> Option<&'static str> {
    Some(match record {
        1 => "Envelope",
        2 => "Application",
        3 => "NewsPhoto",
        7 => "PreObjectData",
        8 => "ObjectData",
        9 => "PostObjectData",
        _ => return None,
    })
}

use IptcValueKind::{Digits as D, String as S, Uint8 as U8, Uint16 as U16, Uint32 as U32, Undefined as B};

lookup_table! {
    /// `(record, dataset)` to `(name, kind, repeatable)`.
    pub static IPTC_DATASETS: (u8, u8) => (&'static str, IptcValueKind, bool) {
        // envelope
        (1, 0) => ("EnvelopeRecordVersion", U16, false),
        (1, 5) => ("Destination", S, true),
        (1, 20) => ("FileFormat", U16, false),
        (1, 22) => ("FileVersion", U16, false),
        (1, 30) => ("ServiceIdentifier", S, false),
        (1, 40) => ("EnvelopeNumber", D, false),
        (1, 50) => ("ProductID", S, true),
        (1, 60) => ("EnvelopePriority", D, false),
        (1, 70) => ("DateSent", D, false),
        (1, 80) => ("TimeSent", S, false),
        (1, 90) => ("CodedCharacterSet", S, false),
        (1, 100) => ("UniqueObjectName", S, false),
        (1, 120) => ("ARMIdentifier", U16, false),
        (1, 122) => ("ARMVersion", U16, false),

        // application
        (2, 0) => ("ApplicationRecordVersion", U16, false),
        (2, 3) => ("ObjectTypeReference", S, false),
        (2, 4) => ("ObjectAttributeReference", S, true),
        (2, 5) => ("ObjectName", S, false),
        (2, 7) => ("EditStatus", S, false),
        (2, 8) => ("EditorialUpdate", D, false),
        (2, 10) => ("Urgency", D, false),
        (2, 12) => ("SubjectReference", S, true),
        (2, 15) => ("Category", S, false),
        (2, 20) => ("SupplementalCategories", S, true),
        (2, 22) => ("FixtureIdentifier", S, false),
        (2, 25) => ("Keywords", S, true),
        (2, 26) => ("ContentLocationCode", S, true),
        (2, 27) => ("ContentLocationName", S, true),
        (2, 30) => ("ReleaseDate", D, false),
        (2, 35) => ("ReleaseTime", S, false),
        (2, 37) => ("ExpirationDate", D, false),
        (2, 38) => ("ExpirationTime", S, false),
        (2, 40) => ("SpecialInstructions", S, false),
        (2, 42) => ("ActionAdvised", D, false),
        (2, 45) => ("ReferenceService", S, true),
        (2, 47) => ("ReferenceDate", D, true),
        (2, 50) => ("ReferenceNumber", D, true),
        (2, 55) => ("DateCreated", D, false),
        (2, 60) => ("TimeCreated", S, false),
        (2, 62) => ("DigitalCreationDate", D, false),
        (2, 63) => ("DigitalCreationTime", S, false),
        (2, 65) => ("OriginatingProgram", S, false),
        (2, 70) => ("ProgramVersion", S, false),
        (2, 75) => ("ObjectCycle", S, false),
        (2, 80) => ("By-line", S, true),
        (2, 85) => ("By-lineTitle", S, true),
        (2, 90) => ("City", S, false),
        (2, 92) => ("Sub-location", S, false),
        (2, 95) => ("Province-State", S, false),
        (2, 100) => ("Country-PrimaryLocationCode", S, false),
        (2, 101) => ("Country-PrimaryLocationName", S, false),
        (2, 103) => ("OriginalTransmissionReference", S, false),
        (2, 105) => ("Headline", S, false),
        (2, 110) => ("Credit", S, false),
        (2, 115) => ("Source", S, false),
        (2, 116) => ("CopyrightNotice", S, false),
        (2, 118) => ("Contact", S, true),
        (2, 120) => ("Caption-Abstract", S, false),
        (2, 121) => ("LocalCaption", S, false),
        (2, 122) => ("Writer-Editor", S, true),
        (2, 125) => ("RasterizedCaption", B, false),
        (2, 130) => ("ImageType", S, false),
        (2, 131) => ("ImageOrientation", S, false),
        (2, 135) => ("LanguageIdentifier", S, false),
        (2, 150) => ("AudioType", S, false),
        (2, 151) => ("AudioSamplingRate", D, false),
        (2, 152) => ("AudioSamplingResolution", D, false),
        (2, 153) => ("AudioDuration", D, false),
        (2, 154) => ("AudioOutcue", S, false),
        (2, 184) => ("JobID", S, false),
        (2, 185) => ("MasterDocumentID", S, false),
        (2, 186) => ("ShortDocumentID", S, false),
        (2, 187) => ("UniqueDocumentID", S, false),
        (2, 188) => ("OwnerID", S, false),
        (2, 200) => ("ObjectPreviewFileFormat", U16, false),
        (2, 201) => ("ObjectPreviewFileVersion", U16, false),
        (2, 202) => ("ObjectPreviewData", B, false),
        (2, 221) => ("Prefs", S, false),
        (2, 225) => ("ClassifyState", S, false),
        (2, 228) => ("SimilarityIndex", S, false),
        (2, 230) => ("DocumentNotes", S, false),
        (2, 231) => ("DocumentHistory", S, false),
        (2, 232) => ("ExifCameraInfo", S, false),
        (2, 255) => ("CatalogSets", S, true),

        // news photo
        (3, 0) => ("NewsPhotoVersion", U16, false),
        (3, 10) => ("IPTCPictureNumber", S, false),
        (3, 20) => ("IPTCImageWidth", U16, false),
        (3, 30) => ("IPTCImageHeight", U16, false),
        (3, 40) => ("IPTCPixelWidth", U16, false),
        (3, 50) => ("IPTCPixelHeight", U16, false),
        (3, 55) => ("SupplementalType", U8, false),
        (3, 60) => ("ColorRepresentation", U16, false),
        (3, 64) => ("InterchangeColorSpace", U8, false),
        (3, 65) => ("ColorSequence", U8, false),
        (3, 66) => ("ICC_Profile", B, false),
        (3, 70) => ("ColorCalibrationMatrix", B, false),
        (3, 80) => ("LookupTable", B, false),
        (3, 84) => ("NumIndexEntries", U16, false),
        (3, 85) => ("ColorPalette", B, false),
        (3, 86) => ("IPTCBitsPerSample", U8, false),
        (3, 90) => ("SampleStructure", U8, false),
        (3, 100) => ("ScanningDirection", U8, false),
        (3, 102) => ("IPTCImageRotation", U8, false),
        (3, 110) => ("DataCompressionMethod", U32, false),
        (3, 120) => ("QuantizationMethod", U8, false),
        (3, 125) => ("EndPoints", B, false),
        (3, 130) => ("ExcursionTolerance", U8, false),
        (3, 135) => ("BitsPerComponent", U8, false),
        (3, 140) => ("MaximumDensityRange", U16, false),
        (3, 145) => ("GammaCompensatedValue", U16, false),

        // pre-object data
        (7, 10) => ("SizeMode", U8, false),
        (7, 20) => ("MaxSubfileSize", U32, false),
        (7, 90) => ("ObjectSizeAnnounced", U32, false),
        (7, 95) => ("MaximumObjectSize", U32, false),

        // object data
        (8, 10) => ("SubFile", B, true),

        // post-object data
        (9, 10) => ("ConfirmedObjectSize", U32, false),
    }
}

/// The dataset table, extendable by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct IptcDatasets(FxHashMap<(u8, u8), IptcDataset>);

impl Default for IptcDatasets {
    fn default() -> Self {
        Self(
            IPTC_DATASETS
                .iter()
                .map(|(key, (name, kind, repeatable))| {
                    (
                        *key,
                        IptcDataset {
                            name: Cow::Borrowed(*name),
                            kind: *kind,
                            repeatable: *repeatable,
                        },
                    )
                })
                .collect(),
        )
    }
}

impl IptcDatasets {
    /// A table that knows no datasets.
    pub fn empty() -> Self {
        Self(FxHashMap::default())
    }

    /// Finds a dataset's description.
    pub fn get(&self, record: u8, dataset: u8) -> Option<&IptcDataset> {
        self.0.get(&(record, dataset))
    }

    /// Adds (or replaces) a dataset description.
    pub fn insert(&mut self, record: u8, dataset: u8, desc: IptcDataset) -> Option<IptcDataset> {
        self.0.insert((record, dataset), desc)
    }
}

#[cfg(test)]
mod tests {
    use super::{IptcDatasets, IptcValueKind, record_name};

    #[test]
    fn keywords_repeat_and_versions_are_fixed_width() {
        let table = IptcDatasets::default();
        let keywords = table.get(2, 25).unwrap();
        assert_eq!(keywords.name, "Keywords");
        assert!(keywords.repeatable);

        let version = table.get(2, 0).unwrap();
        assert_eq!(version.kind, IptcValueKind::Uint16);
        assert_eq!(version.kind.fixed_len(), Some(2));
    }

    #[test]
    fn record_names() {
        assert_eq!(record_name(2), Some("Application"));
        assert_eq!(record_name(4), None);
    }
}
