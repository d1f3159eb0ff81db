//! Listing service: paginated listings, syndication, landing highlights,
//! vocabularies and entry saves over an injected [`Store`].
//!
//! # Paginated listing
//!
//! 1. Resolve page, page size and offset ([`PageRequest`]); sort by the
//!    collection's primary date, newest first unless `order=reverse`.
//! 2. Build the filter ([`build_filter`]).
//! 3. Issue the four independent reads concurrently: vocabulary, page of
//!    entries, filtered count, unfiltered count.
//! 4. Sort the vocabulary, format the entries against its display map and
//!    assemble the [`ListingResult`].
//!
//! The service holds no cache; every call re-reads the vocabulary.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::error::ListingError;
use crate::format::format_entry;
use crate::models::{
    Collection, ContentEntry, FormattedEntry, LandingHighlights, ListingQuery, ListingResult, Tag,
    TagDisplay,
};
use crate::paginate::{compute_total_pages, PageDefaults, PageRequest};
use crate::query::{build_filter, Filter};
use crate::store::{FindOptions, Sort, SortDirection, SortKey, Store};
use crate::tags::{label_for_value, sort_vocabulary, to_display_map};

/// Entries returned by [`ListingService::list_recent`] when no count is given.
pub const DEFAULT_RECENT_COUNT: usize = 20;

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn Store>,
}

impl ListingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// One page of a collection, filtered by tags, search text and dates.
    ///
    /// A page past the end returns `Ok` with no results and the real totals.
    pub async fn list_paginated(
        &self,
        collection: Collection,
        query: &ListingQuery,
        defaults: &PageDefaults,
    ) -> Result<ListingResult, ListingError> {
        let page = PageRequest::resolve(query.page.as_deref(), query.limit.as_deref(), defaults);
        let sort = Sort {
            key: SortKey::PrimaryDate,
            direction: SortDirection::from_order(query.order.as_deref()),
        };
        let filter = build_filter(query);
        let options = FindOptions {
            sort,
            skip: page.skip(),
            limit: Some(page.page_size),
        };

        let (tags, entries, total_results, total_unfiltered_results) = futures::try_join!(
            self.store.load_tags(collection),
            self.store.find_entries(collection, &filter, &options),
            self.store.count_entries(collection, Some(&filter)),
            self.store.count_entries(collection, None),
        )?;

        let all_tags = sort_vocabulary(tags);
        let tag_text = to_display_map(&all_tags);
        let results: Vec<FormattedEntry> = entries
            .iter()
            .map(|entry| format_entry(collection, entry, &tag_text))
            .collect();

        debug!(
            %collection,
            page = page.page,
            page_size = page.page_size,
            returned = results.len(),
            total_results,
            "paginated listing"
        );

        Ok(ListingResult {
            current_page: page.page,
            page_size: page.page_size,
            results,
            total_pages: compute_total_pages(total_results, page.page_size),
            total_results,
            total_unfiltered_results,
            all_tags,
        })
    }

    /// The `count` most recently added entries, newest first, tag-enriched.
    pub async fn list_recent(
        &self,
        collection: Collection,
        count: usize,
    ) -> Result<Vec<FormattedEntry>, ListingError> {
        let options = FindOptions {
            sort: Sort::newest(SortKey::EntryAdded),
            skip: None,
            limit: Some(count as u64),
        };
        let filter = Filter::default();
        let (tags, entries) = futures::try_join!(
            self.store.load_tags(collection),
            self.store.find_entries(collection, &filter, &options),
        )?;

        let tag_text = to_display_map(&tags);
        Ok(entries
            .iter()
            .map(|entry| format_entry(collection, entry, &tag_text))
            .collect())
    }

    /// The most recently started entry of each landing collection.
    pub async fn landing_highlights(&self) -> Result<LandingHighlights, ListingError> {
        let (most_recent_shortform, most_recent_blockchain) = futures::try_join!(
            self.most_recent(Collection::Shortform),
            self.most_recent(Collection::Blockchain),
        )?;
        Ok(LandingHighlights {
            most_recent_shortform,
            most_recent_blockchain,
        })
    }

    async fn most_recent(&self, collection: Collection) -> Result<Option<FormattedEntry>, ListingError> {
        let Some(entry) = self
            .store
            .find_one(collection, Sort::newest(SortKey::PrimaryDate))
            .await?
        else {
            return Ok(None);
        };
        let tag_text = to_display_map(&self.store.load_tags(collection).await?);
        Ok(Some(format_entry(collection, &entry, &tag_text)))
    }

    /// Every collection's vocabulary, each sorted by text.
    pub async fn vocabularies(&self) -> Result<BTreeMap<Collection, Vec<Tag>>, ListingError> {
        let loaded = futures::future::try_join_all(
            Collection::ALL
                .into_iter()
                .map(|collection| async move {
                    let tags = self.store.load_tags(collection).await?;
                    Ok::<_, anyhow::Error>((collection, sort_vocabulary(tags)))
                }),
        )
        .await?;
        Ok(loaded.into_iter().collect())
    }

    /// Persist an entry and record a use of each of its tags, atomically.
    ///
    /// Tags are recorded once per occurrence in the entry's tag sequence.
    /// A missing `entry_added` is stamped with the current time. Reusing a
    /// stored id fails with [`ListingError::Conflict`].
    pub async fn save_entry(
        &self,
        collection: Collection,
        entry: &ContentEntry,
    ) -> Result<String, ListingError> {
        let mut entry = entry.clone();
        entry.entry_added.get_or_insert_with(Utc::now);
        let tags: Vec<TagDisplay> = entry
            .tags
            .iter()
            .map(|value| TagDisplay {
                value: value.clone(),
                text: label_for_value(value),
            })
            .collect();

        let inserted = self
            .store
            .insert_entry(collection, &entry, &tags)
            .await
            .map_err(ListingError::from_store)?;
        for tag in &inserted.tags {
            debug!(%collection, tag = %tag.value, frequency = tag.frequency, "recorded tag use");
        }
        Ok(inserted.id)
    }
}
