//! Names for Exif tags.
//!
//! Exif stores every value under a numeric tag ID. The tables here map those
//! IDs to the familiar names (`Orientation`, `DateTimeOriginal`, ...) that
//! parsed output is keyed by.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

use crate::exif::ifd::IfdGroup;

pub mod ifd;
pub mod primitives;
pub mod tags;

/// Each blob of Exif will start with a byte order marker - its endianness.
///
/// It's either `II` (Intel, for little-endian) or `MM` (Motorola, for
/// big-endian).
#[repr(u8)]
#[derive(Copy, Clone, Debug, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub enum Endianness {
    /// `II` for Intel, little-endian.
    Little,

    /// `MM` for Motorola. Big-endian.
    Big,
}

/// Tag ID to tag name mappings for each kind of IFD.
///
/// Starts out with the built-in tables. Callers may add or override names
/// (for vendor tags, for example) before handing it to the parser.
#[derive(Clone, Debug, PartialEq)]
pub struct ExifTagNames {
    main: FxHashMap<u16, Cow<'static, str>>,
    gps: FxHashMap<u16, Cow<'static, str>>,
}

impl Default for ExifTagNames {
    fn default() -> Self {
        Self {
            main: borrow_all(&tags::MAIN_TAG_NAMES),
            gps: borrow_all(&tags::GPS_TAG_NAMES),
        }
    }
}

impl ExifTagNames {
    /// A registry with no names at all.
    ///
    /// Every tag will be reported by its hex ID.
    pub fn empty() -> Self {
        Self {
            main: FxHashMap::default(),
            gps: FxHashMap::default(),
        }
    }

    /// Finds the name of a tag within the given IFD group.
    pub fn name(&self, group: IfdGroup, tag: u16) -> Option<&str> {
        self.table(group).get(&tag).map(AsRef::as_ref)
    }

    /// Adds (or replaces) a tag name, returning the previous one.
    pub fn insert(
        &mut self,
        group: IfdGroup,
        tag: u16,
        name: impl Into<Cow<'static, str>>,
    ) -> Option<Cow<'static, str>> {
        self.table_mut(group).insert(tag, name.into())
    }

    /// Builder form of [`ExifTagNames::insert`].
    pub fn with(mut self, group: IfdGroup, tag: u16, name: impl Into<Cow<'static, str>>) -> Self {
        _ = self.insert(group, tag, name);
        self
    }

    /// Merges many names into one group at once.
    pub fn extend<N: Into<Cow<'static, str>>>(
        &mut self,
        group: IfdGroup,
        names: impl IntoIterator<Item = (u16, N)>,
    ) {
        self.table_mut(group)
            .extend(names.into_iter().map(|(tag, name)| (tag, name.into())));
    }

    fn table(&self, group: IfdGroup) -> &FxHashMap<u16, Cow<'static, str>> {
        if group.uses_gps_names() {
            &self.gps
        } else {
            &self.main
        }
    }

    fn table_mut(&mut self, group: IfdGroup) -> &mut FxHashMap<u16, Cow<'static, str>> {
        if group.uses_gps_names() {
            &mut self.gps
        } else {
            &mut self.main
        }
    }
}

fn borrow_all(table: &FxHashMap<u16, &'static str>) -> FxHashMap<u16, Cow<'static, str>> {
    table
        .iter()
        .map(|(tag, name)| (*tag, Cow::Borrowed(*name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{ExifTagNames, ifd::IfdGroup};

    #[test]
    fn gps_and_main_tables_are_separate() {
        let names = ExifTagNames::default();
        assert_eq!(names.name(IfdGroup::Tiff, 0x0112), Some("Orientation"));
        assert_eq!(names.name(IfdGroup::Gps, 0x0002), Some("GPSLatitude"));
        assert_eq!(names.name(IfdGroup::Tiff, 0x0002), Some("InteropVersion"));
    }

    #[test]
    fn overrides_replace_defaults() {
        let names = ExifTagNames::default().with(IfdGroup::Exif, 0x9003, "Shot");
        assert_eq!(names.name(IfdGroup::Exif, 0x9003), Some("Shot"));
        assert_eq!(names.name(IfdGroup::Exif, 0xFFFF), None);
    }
}
