//! Opt-in property types for vendor namespaces.
//!
//! These aren't part of [`XmpTagTypes::default`][`crate::xmp::XmpTagTypes`].
//! Merge the ones you need:
//!
//! ```
//! use image_info_extractor_types::xmp::{XmpTagTypes, vendor};
//!
//! let types = XmpTagTypes::default().with(vendor::apple()).with(vendor::google());
//! assert!(types.get("GPano:UsePanoramaViewer").is_some());
//! ```

use crate::xmp::XmpValueKind::{self, *};

lookup_table! {
    static APPLE: &'static str => XmpValueKind {
        // face information written by the apple iphone 5
        "apple-fi:AngleInfoRoll" => Integer,
        "apple-fi:AngleInfoYaw" => Integer,
        "apple-fi:ConfidenceLevel" => Integer,
        "apple-fi:FaceID" => Integer,
        "apple-fi:TimeStamp" => Integer,

        // aas apple adjustment settings used by iphone/ipad.
        "aas:AffineA" => Real,
        "aas:AffineB" => Real,
        "aas:AffineC" => Real,
        "aas:AffineD" => Real,
        "aas:AffineX" => Real,
        "aas:AffineY" => Real,
        "aas:CropH" => IntegerList,
        "aas:CropW" => IntegerList,
        "aas:CropX" => IntegerList,
        "aas:CropY" => IntegerList,
        "aas:Curve0x" => Real,
        "aas:Curve0y" => Real,
        "aas:Curve1x" => Real,
        "aas:Curve1y" => Real,
        "aas:Curve2x" => Real,
        "aas:Curve2y" => Real,
        "aas:Curve3x" => Real,
        "aas:Curve3y" => Real,
        "aas:Curve4x" => Real,
        "aas:Curve4y" => Real,
        "aas:FaceBalanceOrigI" => Real,
        "aas:FaceBalanceOrigQ" => Real,
        "aas:FaceBalanceStrength" => Real,
        "aas:FaceBalanceWarmth" => Real,
        "aas:Highlights" => RealList,
        "aas:Shadows" => RealList,
        "aas:Vibrance" => RealList,
    }
}

lookup_table! {
    static DJI: &'static str => XmpValueKind {
        // dji drone
        "drone-dji:AbsoluteAltitude" => Real,
        "drone-dji:CalibratedFocalLength" => Real,
        "drone-dji:CalibratedOpticalCenterX" => Real,
        "drone-dji:CalibratedOpticalCenterY" => Real,
        "drone-dji:FlightPitchDegree" => Real,
        "drone-dji:FlightRollDegree" => Real,
        "drone-dji:FlightXSpeed" => Real,
        "drone-dji:FlightYSpeed" => Real,
        "drone-dji:FlightYawDegree" => Real,
        "drone-dji:FlightZSpeed" => Real,
        "drone-dji:GPSLatitude" => RealList,
        "drone-dji:GPSLongitude" => RealList,
        "drone-dji:GPSLongtitude" => Real,
        "drone-dji:GimbalPitchDegree" => Real,
        "drone-dji:GimbalRollDegree" => Real,
        "drone-dji:GimbalYawDegree" => Real,
        "drone-dji:Latitude" => Real,
        "drone-dji:Longitude" => Real,
        "drone-dji:RelativeAltitude" => Real,
        "drone-dji:RtkStdHgt" => Real,
        "drone-dji:RtkStdLat" => Real,
        "drone-dji:RtkStdLon" => Real,
    }
}

lookup_table! {
    static GOOGLE: &'static str => XmpValueKind {
        // google depth-map device
        "Device:CameraDepthMapFar" => Real,
        "Device:CameraDepthMapFocalTableEntryCount" => Integer,
        "Device:CameraDepthMapNear" => Real,
        "Device:CameraImagingModelDistortionCount" => Integer,
        "Device:CameraImagingModelFocalLengthX" => Real,
        "Device:CameraImagingModelFocalLengthY" => Real,
        "Device:CameraImagingModelImageHeight" => Integer,
        "Device:CameraImagingModelImageWidth" => Integer,
        "Device:CameraImagingModelPixelAspectRatio" => Real,
        "Device:CameraImagingModelPrincipalPointX" => Real,
        "Device:CameraImagingModelPrincipalPointY" => Real,
        "Device:CameraImagingModelSkew" => Real,
        "Device:CameraLightEstimateColorCorrectionB" => Real,
        "Device:CameraLightEstimateColorCorrectionG" => Real,
        "Device:CameraLightEstimateColorCorrectionR" => Real,
        "Device:CameraLightEstimatePixelIntensity" => Real,
        "Device:CameraPointCloudMetric" => Boolean,
        "Device:CameraPointCloudPointCloud" => Integer,
        "Device:CameraPosePositionX" => Real,
        "Device:CameraPosePositionY" => Real,
        "Device:CameraPosePositionZ" => Real,
        "Device:CameraPoseRotationW" => Real,
        "Device:CameraPoseRotationX" => Real,
        "Device:CameraPoseRotationY" => Real,
        "Device:CameraPoseRotationZ" => Real,
        "Device:CameraPoseTimestamp" => Integer,
        "Device:ContainerDirectoryItemLength" => Integer,
        "Device:ContainerDirectoryItemPadding" => Integer,
        "Device:EarthPosAltitude" => Real,
        "Device:EarthPosLatitude" => Real,
        "Device:EarthPosLongitude" => Real,
        "Device:EarthPosRotationW" => Real,
        "Device:EarthPosRotationX" => Real,
        "Device:EarthPosRotationY" => Real,
        "Device:EarthPosRotationZ" => Real,
        "Device:EarthPosTimestamp" => Integer,
        "Device:PlaneBoundaryVertexCount" => Integer,
        "Device:PlaneExtentX" => Real,
        "Device:PlaneExtentZ" => Real,
        "Device:PlanePosePositionX" => Real,
        "Device:PlanePosePositionY" => Real,
        "Device:PlanePosePositionZ" => Real,
        "Device:PlanePoseRotationW" => Real,
        "Device:PlanePoseRotationX" => Real,
        "Device:PlanePoseRotationY" => Real,
        "Device:PlanePoseRotationZ" => Real,
        "Device:PlanePoseTimestamp" => Integer,
        "Device:PosePositionX" => Real,
        "Device:PosePositionY" => Real,
        "Device:PosePositionZ" => Real,
        "Device:PoseRotationW" => Real,
        "Device:PoseRotationX" => Real,
        "Device:PoseRotationY" => Real,
        "Device:PoseRotationZ" => Real,
        "Device:PoseTimestamp" => Integer,
        "Device:ProfileCameraIndices" => Integer,

        // gaudio
        "GAudio:Data" => Base64,

        // gcamera
        "GCamera:MicroVideo" => Integer,
        "GCamera:MicroVideoOffset" => Integer,
        "GCamera:MicroVideoPresentationTimestampUs" => Integer,
        "GCamera:MicroVideoVersion" => Integer,

        // gcreations

        // gdepth
        "GDepth:Far" => RealList,
        "GDepth:ImageHeight" => RealList,
        "GDepth:ImageWidth" => RealList,
        "GDepth:Near" => RealList,

        // gfocus
        "GFocus:BlurAtInfinity" => Real,
        "GFocus:FocalDistance" => Real,
        "GFocus:FocalPointX" => Real,
        "GFocus:FocalPointY" => Real,

        // gimage
        "GImage:Data" => Base64,

        // gpano
        "GPano:CroppedAreaImageHeightPixels" => Real,
        "GPano:CroppedAreaImageWidthPixels" => Real,
        "GPano:CroppedAreaLeftPixels" => Real,
        "GPano:CroppedAreaTopPixels" => Real,
        "GPano:ExposureLockUsed" => Boolean,
        "GPano:FirstPhotoDate" => Date,
        "GPano:FullPanoHeightPixels" => Real,
        "GPano:FullPanoWidthPixels" => Real,
        "GPano:InitialCameraDolly" => Real,
        "GPano:InitialHorizontalFOVDegrees" => Real,
        "GPano:InitialVerticalFOVDegrees" => Real,
        "GPano:InitialViewHeadingDegrees" => Real,
        "GPano:InitialViewPitchDegrees" => Real,
        "GPano:InitialViewRollDegrees" => Real,
        "GPano:LargestValidInteriorRectHeight" => Real,
        "GPano:LargestValidInteriorRectLeft" => Real,
        "GPano:LargestValidInteriorRectTop" => Real,
        "GPano:LargestValidInteriorRectWidth" => Real,
        "GPano:LastPhotoDate" => Date,
        "GPano:PoseHeadingDegrees" => Real,
        "GPano:PosePitchDegrees" => Real,
        "GPano:PoseRollDegrees" => Real,
        "GPano:SourcePhotosCount" => Integer,
        "GPano:UsePanoramaViewer" => Boolean,

        // gspherical
        "GSpherical:CroppedAreaImageHeightPixels" => IntegerList,
        "GSpherical:CroppedAreaImageWidthPixels" => IntegerList,
        "GSpherical:CroppedAreaLeftPixels" => IntegerList,
        "GSpherical:CroppedAreaTopPixels" => IntegerList,
        "GSpherical:FullPanoHeightPixels" => IntegerList,
        "GSpherical:FullPanoWidthPixels" => IntegerList,
        "GSpherical:InitialViewHeadingDegrees" => RealList,
        "GSpherical:InitialViewPitchDegrees" => RealList,
        "GSpherical:InitialViewRollDegrees" => RealList,
        "GSpherical:SourceCount" => IntegerList,
        "GSpherical:Spherical" => BooleanList,
        "GSpherical:Stitched" => BooleanList,
        "GSpherical:TimeStamp" => IntegerList,
    }
}

/// Apple face info (`apple-fi`) and adjustment settings (`aas`).
pub fn apple() -> impl Iterator<Item = (&'static str, XmpValueKind)> {
    APPLE.iter().map(|(k, v)| (*k, *v))
}

/// DJI drone telemetry (`drone-dji`).
pub fn dji() -> impl Iterator<Item = (&'static str, XmpValueKind)> {
    DJI.iter().map(|(k, v)| (*k, *v))
}

/// Google camera namespaces (`Device`, `GAudio`, `GCamera`, `GDepth`, `GFocus`,
/// `GImage`, `GPano`, `GSpherical`).
pub fn google() -> impl Iterator<Item = (&'static str, XmpValueKind)> {
    GOOGLE.iter().map(|(k, v)| (*k, *v))
}
