//! Names for ICC profile tags.
//!
//! A profile's tag table stores each tag under a four-byte signature, like
//! `rXYZ`. Parsed output uses the names from ICC.1:2022 (`redMatrixColumn`)
//! instead. Signatures without a name pass through as-is.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

lookup_table! {
    /// Tag signature to tag name.
    pub static TAG_SIGNATURE_NAMES: [u8; 4] => &'static str {
        *b"A2B0" => "AToB0",
        *b"A2B1" => "AToB1",
        *b"A2B2" => "AToB2",
        *b"bXYZ" => "blueMatrixColumn",
        *b"bTRC" => "blueTRC",
        *b"B2A0" => "BToA0",
        *b"B2A1" => "BToA1",
        *b"B2A2" => "BToA2",
        *b"B2D0" => "BToD0",
        *b"B2D1" => "BToD1",
        *b"B2D2" => "BToD2",
        *b"B2D3" => "BToD3",
        *b"calt" => "calibrationDateTime",
        *b"targ" => "charTarget",
        *b"chad" => "chromaticAdaptation",
        *b"chrm" => "chromaticity",
        *b"cicp" => "cicp",
        *b"clro" => "colorantOrder",
        *b"clrt" => "colorantTable",
        *b"clot" => "colorantTableOut",
        *b"ciis" => "colorimetricIntentImageState",
        *b"cprt" => "copyright",
        *b"crdi" => "creditInfo", // removed in v4
        *b"data" => "data", // removed in v4
        *b"dtim" => "dateTime", // removed in v4
        *b"dmnd" => "deviceMfgDesc",
        *b"dmdd" => "deviceModelDesc",
        *b"devs" => "deviceSettings", // removed in v4
        *b"D2B0" => "DToB0",
        *b"D2B1" => "DToB1",
        *b"D2B2" => "DToB2",
        *b"D2B3" => "DToB3",
        *b"gamt" => "gamut",
        *b"kTRC" => "grayTRC",
        *b"gXYZ" => "greenMatrixColumn",
        *b"gTRC" => "greenTRC",
        *b"lumi" => "luminance",
        *b"meas" => "measurement",
        *b"meta" => "metadata",
        *b"bkpt" => "mediaBlackPoint", // removed in v4.4
        *b"wtpt" => "mediaWhitePoint",
        *b"ncol" => "namedColor", // obselete, use ncl2
        *b"ncl2" => "namedColor2",
        *b"resp" => "outputResponse",
        *b"rig0" => "perceptualRenderingIntentGamut",
        *b"pre0" => "preview0",
        *b"pre1" => "preview1",
        *b"pre2" => "preview2",
        *b"desc" => "profileDescription",
        *b"pseq" => "profileSequenceDesc",
        *b"psd0" => "ps2CRD0", // removed in v4
        *b"psd1" => "ps2CRD1", // removed in v4
        *b"psd2" => "ps2CRD2", // removed in v4
        *b"psd3" => "ps2CRD3", // removed in v4
        *b"ps2s" => "ps2CSA", // removed in v4.4
        *b"ps2i" => "ps2RenderingIntent", // removed in v4.4
        *b"rXYZ" => "redMatrixColumn",
        *b"rTRC" => "redTRC",
        *b"rig2" => "saturationRenderingIntentGamut",
        *b"scrd" => "screeningDesc", // removed in v4
        *b"scrn" => "screening", // removed in v4
        *b"tech" => "technology",
        *b"bfd " => "ucrBg", // removed in v4
        *b"vued" => "viewingCondDesc",
        *b"view" => "viewingConditions",
    }
}

/// Tag signature to tag name mappings, extendable by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct IccTagNames(FxHashMap<[u8; 4], Cow<'static, str>>);

impl Default for IccTagNames {
    fn default() -> Self {
        Self(
            TAG_SIGNATURE_NAMES
                .iter()
                .map(|(sig, name)| (*sig, Cow::Borrowed(*name)))
                .collect(),
        )
    }
}

impl IccTagNames {
    /// A registry with no names.
    pub fn empty() -> Self {
        Self(FxHashMap::default())
    }

    /// Finds the name for a tag signature.
    pub fn get(&self, signature: &[u8; 4]) -> Option<&str> {
        self.0.get(signature).map(AsRef::as_ref)
    }

    /// Adds (or replaces) a name, returning the previous one.
    pub fn insert(
        &mut self,
        signature: [u8; 4],
        name: impl Into<Cow<'static, str>>,
    ) -> Option<Cow<'static, str>> {
        self.0.insert(signature, name.into())
    }

    /// Builder form of [`IccTagNames::insert`].
    pub fn with(mut self, signature: [u8; 4], name: impl Into<Cow<'static, str>>) -> Self {
        _ = self.insert(signature, name);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::IccTagNames;

    #[test]
    fn known_signatures_have_names() {
        let names = IccTagNames::default();
        assert_eq!(names.get(b"rXYZ"), Some("redMatrixColumn"));
        assert_eq!(names.get(b"cicp"), Some("cicp"));
        assert_eq!(names.get(b"zzzz"), None);
    }
}
