use image_info_extractor_types::exif::{ExifTagNames, ifd::IfdGroup};

use super::value::{ExifField, Ifd, read_value};
use crate::cursor::ByteCursor;

/// The size of one IFD entry.
pub(super) const ENTRY_LEN: usize = 12;

/// Parses the IFD at `offset`.
///
/// Returns `None` if the entry count, or the entries themselves, would run
/// past the end of the block.
pub(super) fn read_ifd(
    cursor: &ByteCursor<'_>,
    offset: usize,
    group: IfdGroup,
    names: &ExifTagNames,
) -> Option<Ifd> {
    let Some(entry_count) = cursor.u16_at(offset) else {
        log::warn!("`{}` IFD offset `{offset}` is out of bounds.", group.label());
        return None;
    };

    let table_end = offset + 2 + usize::from(entry_count) * ENTRY_LEN;
    if table_end > cursor.len() {
        log::warn!(
            "`{}` IFD's entries run past the end of the block. \
            entries: `{entry_count}`, table end: `{table_end}`, block len: `{}`",
            group.label(),
            cursor.len()
        );
        return None;
    }

    log::trace!("Reading `{entry_count}` fields from `{}` IFD...", group.label());
    let fields = (0..usize::from(entry_count))
        .filter_map(|i| {
            let entry = offset + 2 + i * ENTRY_LEN;
            let tag: u16 = cursor.u16_at(entry)?;

            Some(ExifField {
                tag,
                name: names
                    .name(group, tag)
                    .map_or_else(|| format!("{tag:04X}"), ToString::to_string),
                value: read_value(cursor, entry),
            })
        })
        .collect();

    Some(Ifd { group, fields })
}

/// Finds the pointer to the next IFD, stored right after an IFD's entries.
pub(super) fn next_ifd_offset(cursor: &ByteCursor<'_>, offset: usize) -> Option<u32> {
    let entry_count = cursor.u16_at(offset)?;
    cursor.u32_at(offset + 2 + usize::from(entry_count) * ENTRY_LEN)
}
