//! Default XMP property types for the core namespaces.
//!
//! Covers Dublin Core, Exif, TIFF, XMP basic, dynamic media, media
//! management, rights, paged-text, and the resource event struct.

use crate::xmp::XmpValueKind::{self, *};

lookup_table! {
    /// Property types for the standard namespaces.
    pub static CORE_TAG_TYPES: &'static str => XmpValueKind {
        // dublin core
        "dc:Date" => DateList,

        // exif
        "exif:DateTimeOriginal" => Date,
        "exif:ColorSpace" => Integer,
        "exif:ExposureTime" => Rational,
        "exif:FNumber" => Rational,
        "exif:ExposureProgram" => Integer,
        "exifEX:PhotographicSensitivity" => Integer,
        "exifEX:SensitivityType" => Integer,
        "exif:ISOSpeedRatings" => Integer,
        "exifEX:StandardOutputSensitivity" => Integer,
        "exifEX:ISOSpeed" => Integer,
        "exifEX:ISOSpeedLatitudeyyy" => Integer,
        "exifEX:ISOSpeedLatitudezzz" => Integer,
        "exif:ShutterSpeedValue" => Rational,
        "exif:ApertureValue" => Rational,
        "exif:BrightnessValue" => Rational,
        "exif:ExposureBiasValue" => Rational,
        "exif:MaxApertureValue" => Rational,
        "exif:SubjectDistance" => Rational,
        "exif:MeteringMode" => Integer,
        "exif:LightSource" => Integer,
        "exif:FocalLength" => Rational,
        "exif:SubjectArea" => Integer,
        "exif:FlashEnergy" => Rational,
        "exif:FocalPlaneXResolution" => Rational,
        "exif:FocalPlaneYResolution" => Rational,
        "exif:SubjectLocation" => Integer,
        "exif:ExposureIndex" => Rational,
        "exif:SensingMethod" => Integer,
        "exif:FileSource" => Integer,
        "exif:SceneType" => Integer,
        "exif:CustomRendered" => Integer,
        "exif:ExposureMode" => Integer,
        "exif:WhiteBalance" => Integer,
        "exif:DigitalZoomRatio" => Rational,
        "exif:FocalLengthIn35mmFilm" => Integer,
        "exif:SceneCaptureType" => Integer,
        "exif:GainControl" => Integer,
        "exif:Contrast" => Integer,
        "exif:Saturation" => Integer,
        "exif:Sharpness" => Integer,
        "exif:DeviceSettingDescription" => Integer,
        "exif:SubjectDistanceRange" => Integer,
        "exifEX:LensSpecification" => RationalList,
        "exif:GPSLatitude" => GpsCoordinate,
        "exif:GPSLongitude" => GpsCoordinate,
        "exif:GPSAltitudeRef" => Integer,
        "exif:GPSAltitude" => Rational,
        "exif:GPSTimeStamp" => Date,
        "exif:GPSMeasureMode" => Integer,
        "exif:GPSDOP" => Rational,
        "exif:GPSSpeed" => Rational,
        "exif:GPSTrack" => Rational,
        "exif:GPSImgDirection" => Rational,
        "exif:GPSDestLatitude" => GpsCoordinate,
        "exif:GPSDestLongitude" => GpsCoordinate,
        "exif:GPSDestBearing" => Rational,
        "exif:GPSDestDistance" => Rational,
        "exif:GPSDifferential" => Integer,
        "exifEX:GPSHPositioningError" => Rational,
        "exifEX:Gamma" => Rational,
        "exif:ComponentsConfiguration" => Integer,
        "exif:CompressedBitsPerPixel" => Rational,
        "exif:PixelXDimension" => Integer,
        "exif:PixelYDimension" => Integer,
        "exif:Columns" => Integer,
        "exif:Rows" => Integer,
        "exif:Fired" => Boolean,
        "exif:Function" => Boolean,
        "exif:Mode" => Integer,
        "exif:RedEyeMode" => Boolean,
        "exif:Return" => Integer,

        // tiff
        "tiff:ImageWidth" => Integer,
        "tiff:ImageLength" => Integer,
        "tiff:DateTime" => Date,
        "tiff:ImageHeight" => Integer,
        "tiff:BitsPerSample" => Integer,
        "tiff:Compression" => Integer,
        "tiff:PhotometricInterpretation" => Integer,
        "tiff:Orientation" => Integer,
        "tiff:SamplesPerPixel" => Integer,
        "tiff:PlanarConfiguration" => Integer,
        "tiff:YCbCrSubSampling" => Integer,
        "tiff:YCbCrPositioning" => Integer,
        "tiff:XResolution" => Rational,
        "tiff:YResolution" => Rational,
        "tiff:ResolutionUnit" => Integer,
        "tiff:TransferFunction" => Integer,
        "tiff:WhitePoint" => RationalList,
        "tiff:PrimaryChromaticities" => RationalList,
        "tiff:YCbCrCoefficients" => RationalList,
        "tiff:ReferenceBlackWhite" => RationalList,

        // xmp
        "xmp:CreateDate" => Date,
        "xmp:MetadataDate" => Date,
        "xmp:ModifyDate" => Date,
        "xmp:PageImageHeight" => Integer,
        "xmp:PageImagePageNumber" => Integer,
        "xmp:PageImageWidth" => Integer,
        "xmp:Rating" => Real,
        "xmp:RatingPercent" => RealList,
        "xmp:ThumbnailHeight" => Integer,
        "xmp:ThumbnailWidth" => Integer,
        "xmp:PageNumber" => Integer,
        "xmp:Height" => Integer,
        "xmp:Width" => Integer,

        // xmp dynamic media
        "xmpDM:AltTimecodeValue" => Integer,
        "xmpDM:AudioModDate" => Date,
        "xmpDM:AudioSampleRate" => Integer,
        "xmpDM:BeatSpliceParamsRiseInDecibel" => Real,
        "xmpDM:BeatSpliceParamsRiseInTimeDurationScale" => Rational,
        "xmpDM:BeatSpliceParamsRiseInTimeDurationValue" => Integer,
        "xmpDM:BeatSpliceParamsUseFileBeatsMarker" => Boolean,
        "xmpDM:ContributedMediaDurationScale" => Rational,
        "xmpDM:ContributedMediaDurationValue" => Integer,
        "xmpDM:ContributedMediaManaged" => Boolean,
        "xmpDM:ContributedMediaStartTimeScale" => Rational,
        "xmpDM:ContributedMediaStartTimeValue" => Integer,
        "xmpDM:DurationScale" => Rational,
        "xmpDM:DurationValue" => Integer,
        "xmpDM:FileDataRate" => Rational,
        "xmpDM:Good" => Boolean,
        "xmpDM:IntroTimeScale" => Rational,
        "xmpDM:IntroTimeValue" => Integer,
        "xmpDM:Loop" => Boolean,
        "xmpDM:MarkersProbability" => Real,
        "xmpDM:MetadataModDate" => Date,
        "xmpDM:NumberOfBeats" => Real,
        "xmpDM:OutCueScale" => Rational,
        "xmpDM:OutCueValue" => Integer,
        "xmpDM:PartOfCompilation" => Boolean,
        "xmpDM:RelativeTimestampScale" => Rational,
        "xmpDM:RelativeTimestampValue" => Integer,
        "xmpDM:ReleaseDate" => Date,
        "xmpDM:ShotDate" => Date,
        "xmpDM:StartTimecodeValue" => Integer,
        "xmpDM:StartTimeSampleSize" => Integer,
        "xmpDM:TakeNumber" => Integer,
        "xmpDM:Tempo" => Real,
        "xmpDM:TimeScaleParamsFrameOverlappingPercentage" => Real,
        "xmpDM:TimeScaleParamsFrameSize" => Real,
        "xmpDM:TrackNumber" => Integer,
        "xmpDM:TracksMarkersProbability" => Real,
        "xmpDM:VideoAlphaPremultipleColorA" => Integer,
        "xmpDM:VideoAlphaPremultipleColorB" => Integer,
        "xmpDM:VideoAlphaPremultipleColorBlack" => Real,
        "xmpDM:VideoAlphaPremultipleColorBlue" => Integer,
        "xmpDM:VideoAlphaPremultipleColorCyan" => Real,
        "xmpDM:VideoAlphaPremultipleColorGray" => Integer,
        "xmpDM:VideoAlphaPremultipleColorGreen" => Integer,
        "xmpDM:VideoAlphaPremultipleColorL" => Real,
        "xmpDM:VideoAlphaPremultipleColorMagenta" => Real,
        "xmpDM:VideoAlphaPremultipleColorRed" => Integer,
        "xmpDM:VideoAlphaPremultipleColorTint" => Integer,
        "xmpDM:VideoAlphaPremultipleColorYellow" => Real,
        "xmpDM:VideoAlphaUnityIsTransparent" => Boolean,
        "xmpDM:VideoFrameRate" => Real,
        "xmpDM:VideoFrameSizeH" => Real,
        "xmpDM:VideoFrameSizeW" => Real,
        "xmpDM:VideoModDate" => Date,
        "xmpDM:VideoPixelAspectRatio" => Rational,
        "xmpDM:RiseInDecibel" => Real,
        "xmpDM:Scale" => Rational,
        "xmpDM:Value" => Integer,
        "xmpDM:Managed" => Boolean,
        "xmpDM:Probability" => Real,
        "xmpDM:FrameOverlappingPercentage" => Real,
        "xmpDM:FrameSize" => Real,
        "xmpDM:A" => Integer,
        "xmpDM:B" => Integer,
        "xmpDM:L" => Real,
        "xmpDM:Black" => Real,
        "xmpDM:Blue" => Integer,
        "xmpDM:Cyan" => Real,
        "xmpDM:Gray" => Integer,
        "xmpDM:Green" => Integer,
        "xmpDM:Magenta" => Real,
        "xmpDM:Red" => Integer,
        "xmpDM:Tint" => Integer,
        "xmpDM:Yellow" => Real,
        "xmpDM:H" => Real,
        "xmpDM:W" => Real,

        // xmp media management
        "xmpMM:DerivedFromLastModifyDate" => Date,
        "xmpMM:HistoryWhen" => Date,
        "xmpMM:IngredientsLastModifyDate" => Date,
        "xmpMM:ManagedFromLastModifyDate" => Date,
        "xmpMM:ManifestPlacedXResolution" => Real,
        "xmpMM:ManifestPlacedYResolution" => Real,
        "xmpMM:ManifestReferenceLastModifyDate" => Date,
        "xmpMM:RenditionOfLastModifyDate" => Date,
        "xmpMM:SaveID" => Integer,
        "xmpMM:VersionsEventWhen" => Date,
        "xmpMM:VersionsModifyDate" => Date,
        "xmpMM:LastModifyDate" => Date,
        "xmpMM:ResourceEvent" => Date,

        // other xmp-related
        "stEvt:when" => Date,
        "xmpRights:Marked" => Boolean,
        "xmpTPg:ColorantA" => Integer,
        "xmpTPg:ColorantB" => Integer,
        "xmpTPg:ColorantBlack" => Real,
        "xmpTPg:ColorantBlue" => Integer,
        "xmpTPg:ColorantCyan" => Real,
        "xmpTPg:ColorantGray" => Integer,
        "xmpTPg:ColorantGreen" => Integer,
        "xmpTPg:ColorantL" => Real,
        "xmpTPg:ColorantMagenta" => Real,
        "xmpTPg:ColorantRed" => Integer,
        "xmpTPg:ColorantTint" => Integer,
        "xmpTPg:ColorantYellow" => Real,
        "xmpTPg:FontComposite" => Boolean,
        "xmpTPg:HasVisibleOverprint" => Boolean,
        "xmpTPg:HasVisibleTransparency" => Boolean,
        "xmpTPg:MaxPageSizeH" => Real,
        "xmpTPg:MaxPageSizeW" => Real,
        "xmpTPg:NPages" => Integer,
        "xmpTPg:SwatchColorantA" => Integer,
        "xmpTPg:SwatchColorantB" => Integer,
        "xmpTPg:SwatchColorantBlack" => Real,
        "xmpTPg:SwatchColorantBlue" => Integer,
        "xmpTPg:SwatchColorantCyan" => Real,
        "xmpTPg:SwatchColorantGray" => Integer,
        "xmpTPg:SwatchColorantGreen" => Integer,
        "xmpTPg:SwatchColorantL" => Real,
        "xmpTPg:SwatchColorantMagenta" => Real,
        "xmpTPg:SwatchColorantRed" => Integer,
        "xmpTPg:SwatchColorantTint" => Integer,
        "xmpTPg:SwatchColorantYellow" => Real,
        "xmpTPg:SwatchGroupType" => Integer,
    }
}
