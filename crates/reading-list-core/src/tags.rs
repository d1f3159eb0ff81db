//! Tag vocabulary ordering and display lookup.

use std::collections::HashMap;

use icu_collator::{Collator, CollatorOptions, Strength};
use tracing::warn;

use crate::models::Tag;

/// Map from tag value to display text.
pub type TagDisplayMap = HashMap<String, String>;

/// Sorts a vocabulary ascending by text using Unicode collation (root
/// locale, secondary strength): accented letters sort next to their base
/// letter and case is ignored.
///
/// The sort is stable: tags whose text collates equal keep the order in
/// which the store returned them.
pub fn sort_vocabulary(mut tags: Vec<Tag>) -> Vec<Tag> {
    match vocabulary_collator() {
        Some(collator) => tags.sort_by(|a, b| collator.compare(&a.text, &b.text)),
        None => tags.sort_by_key(|tag| tag.text.to_lowercase()),
    }
    tags
}

fn vocabulary_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(err) => {
            warn!(error = %err, "root collator unavailable, sorting tags by lowercase text");
            None
        }
    }
}

/// Builds the value → text lookup. Duplicate values: the last one wins.
pub fn to_display_map(tags: &[Tag]) -> TagDisplayMap {
    tags.iter()
        .map(|tag| (tag.value.clone(), tag.text.clone()))
        .collect()
}

/// Display text for a tag created from a bare value: underscores become spaces.
pub fn label_for_value(value: &str) -> String {
    value.replace('_', " ")
}
