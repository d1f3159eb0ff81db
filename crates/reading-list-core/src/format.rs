//! Turns stored entries into view-ready entries.
//!
//! Formatting borrows the raw entry and builds a new [`FormattedEntry`]:
//! the primary date is emitted under the collection's field name, display
//! dates are computed, tag values are resolved to `{value, text}` pairs
//! in their stored order, and reading details are attached where the
//! collection has them.

use chrono::{DateTime, Utc};

use crate::models::{Collection, ContentEntry, FormattedEntry, PrimaryDate, TagDisplay};
use crate::reading::reading_details;
use crate::tags::TagDisplayMap;

/// `March 4, 2024`
pub const DATE_DISPLAY_FORMAT: &str = "%B %-d, %Y";
/// `2024-03-04`
pub const DATE_ISO_FORMAT: &str = "%Y-%m-%d";

/// Keys the formatter owns. Extra attributes under these names are replaced.
const COMPUTED_KEYS: [&str; 13] = [
    "id",
    "title",
    "author",
    "work",
    "publisher",
    "summary",
    "started",
    "date",
    "entryAdded",
    "dateDisplay",
    "dateIso",
    "tags",
    "reading",
];

pub fn format_entry(
    collection: Collection,
    entry: &ContentEntry,
    tag_text: &TagDisplayMap,
) -> FormattedEntry {
    let mut extra = entry.extra.clone();
    for key in COMPUTED_KEYS {
        extra.remove(key);
    }

    FormattedEntry {
        id: entry.id.clone(),
        title: entry.title.clone(),
        author: entry.author.clone(),
        work: entry.work.clone(),
        publisher: entry.publisher.clone(),
        summary: entry.summary.clone(),
        primary_date: PrimaryDate::for_collection(collection, entry.primary_date),
        entry_added: entry.entry_added,
        date_display: format_display_date(&entry.primary_date),
        date_iso: entry.primary_date.format(DATE_ISO_FORMAT).to_string(),
        tags: resolve_tags(&entry.tags, tag_text),
        reading: collection
            .has_reading_details()
            .then(|| reading_details(entry)),
        extra,
    }
}

/// Resolves tag values in order; a value missing from the map displays as itself.
pub fn resolve_tags(values: &[String], tag_text: &TagDisplayMap) -> Vec<TagDisplay> {
    values
        .iter()
        .map(|value| TagDisplay {
            value: value.clone(),
            text: tag_text.get(value).cloned().unwrap_or_else(|| value.clone()),
        })
        .collect()
}

pub fn format_display_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_DISPLAY_FORMAT).to_string()
}
