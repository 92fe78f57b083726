//! Contains stuff related to IFDs.
//!
//! For more info, see the [`IfdGroup`] enumeration.

/// An IFD is a set of tags found within a file's Exif metadata.
///
/// An IFD group is NOT an abstraction - they are _literally_ present in the
/// metadata blob.
///
/// IFD 0 will (optionally) contain tags pointing at the locations of sub-IFDs
/// within the blob. These are like pointers, not direct embeds. The thumbnail
/// IFD (IFD 1) is instead chained directly after IFD 0's entry table.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub enum IfdGroup {
    /// Refers to "IFD 0".
    ///
    /// This one stems from TIFF and describes the main image.
    #[doc(alias = "IFD0")]
    #[doc(alias = "TIFF")]
    Tiff,

    /// "IFD 1", which describes the embedded thumbnail.
    #[doc(alias = "IFD1")]
    Thumbnail,

    /// The "Exif" IFD provides camera-based metadata.
    ///
    /// For example, it's home to important values like exposure information.
    #[doc(alias = "ExifIFD")]
    Exif,

    /// The GPS IFD contains location metadata.
    #[doc(alias = "GPSIFD")]
    Gps,

    /// The interoperability IFD specifies info about what software was used to
    /// write the Exif metadata.
    #[doc(alias = "InteropIFD")]
    Interop,
}

impl IfdGroup {
    /// All groups, in the order they're read.
    pub const ALL: [IfdGroup; 5] = [
        IfdGroup::Tiff,
        IfdGroup::Thumbnail,
        IfdGroup::Exif,
        IfdGroup::Gps,
        IfdGroup::Interop,
    ];

    /// The key this group is stored under in parsed output.
    pub const fn label(&self) -> &'static str {
        match self {
            IfdGroup::Tiff => "tiff",
            IfdGroup::Thumbnail => "thumbnail",
            IfdGroup::Exif => "exif",
            IfdGroup::Gps => "gps",
            IfdGroup::Interop => "interop",
        }
    }

    /// Whether this group's tags are named with the GPS table.
    ///
    /// GPS tag IDs overlap with the low IDs of the main table, so they need
    /// their own.
    pub const fn uses_gps_names(&self) -> bool {
        matches!(self, IfdGroup::Gps)
    }
}
