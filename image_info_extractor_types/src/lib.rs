//! # `image_info_extractor_types`
//!
//! Lookup tables used by `image_info_extractor` to give names and types to
//! the raw values it finds in metadata blocks.
//!
//! Every table here is a process-wide default. The parser never reads these
//! statics directly during a parse. Instead, it reads a registry (like
//! [`exif::ExifTagNames`] or [`xmp::XmpTagTypes`]) that starts out as a copy
//! of the default and can be extended by the caller before parsing.

#![forbid(unsafe_code)]

/// Builds a lazily-initialized lookup table.
///
/// Tables are `FxHashMap`s, since keys are small and hashing them shouldn't
/// cost more than the lookup itself.
macro_rules! lookup_table {
    (
        $(#[$meta:meta])*
        $vis:vis static $name:ident: $key:ty => $value:ty {
            $( $k:expr => $v:expr, )+
        }
    ) => {
        $(#[$meta])*
        $vis static $name: ::std::sync::LazyLock<::rustc_hash::FxHashMap<$key, $value>> =
            ::std::sync::LazyLock::new(|| {
                let mut map = ::rustc_hash::FxHashMap::default();
                $( map.insert($k, $v); )+
                map
            });
    };
}

pub mod exif;
pub mod icc;
pub mod iptc;
pub mod xmp;
