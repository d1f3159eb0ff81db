//! Storage abstraction for Reading List.
//!
//! The [`Store`] trait defines the document-store operations the listing
//! pipeline needs, so backends are injected into
//! [`ListingService`](crate::listing::ListingService) rather than reached
//! through globals. The application crate provides a SQLite backend;
//! [`memory::InMemoryStore`] serves tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Collection, ContentEntry, Tag, TagDisplay};
use crate::query::Filter;

/// Field an entry query is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// The collection's primary date (`started` or `date`).
    PrimaryDate,
    /// Ingestion timestamp.
    EntryAdded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `order=reverse` lists oldest first; anything else lists newest first.
    pub fn from_order(order: Option<&str>) -> Self {
        match order {
            Some("reverse") => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Sort {
    pub fn newest(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }
}

/// Ordering and windowing for [`Store::find_entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Sort,
    /// Entries to skip; `None` issues no skip.
    pub skip: Option<u64>,
    /// Maximum entries to return; `None` returns all.
    pub limit: Option<u64>,
}

/// Abstract document store.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_entries`](Store::find_entries) | Filtered find with sort, skip and limit |
/// | [`count_entries`](Store::count_entries) | Count with or without a filter |
/// | [`find_one`](Store::find_one) | First entry under a sort |
/// | [`load_tags`](Store::load_tags) | Full tag vocabulary in store order |
/// | [`insert_entry`](Store::insert_entry) | Persist a new entry and record its tag uses, atomically |
#[async_trait]
pub trait Store: Send + Sync {
    /// Find entries matching `filter`, ordered and windowed by `options`.
    ///
    /// Entries that compare equal under the sort keep insertion order.
    async fn find_entries(
        &self,
        collection: Collection,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<ContentEntry>>;

    /// Count entries matching `filter`, or all entries when `None`.
    async fn count_entries(&self, collection: Collection, filter: Option<&Filter>) -> Result<u64>;

    /// The first entry under `sort`, or `None` for an empty collection.
    async fn find_one(&self, collection: Collection, sort: Sort) -> Result<Option<ContentEntry>> {
        let options = FindOptions {
            sort,
            skip: None,
            limit: Some(1),
        };
        let entries = self
            .find_entries(collection, &Filter::default(), &options)
            .await?;
        Ok(entries.into_iter().next())
    }

    /// Load the whole tag vocabulary of a collection, unsorted.
    async fn load_tags(&self, collection: Collection) -> Result<Vec<Tag>>;

    /// Insert an entry and record one use of each tag in `tags`.
    ///
    /// The insert and every tag increment happen as one atomic unit: on any
    /// failure nothing is stored. A tag is created with frequency 1 and the
    /// given text, or its frequency is incremented (its text is kept).
    /// Concurrent inserts never lose an increment.
    ///
    /// An empty `entry.id` gets a generated ID. Reusing a stored ID fails
    /// with [`DuplicateEntry`](crate::error::DuplicateEntry).
    async fn insert_entry(
        &self,
        collection: Collection,
        entry: &ContentEntry,
        tags: &[TagDisplay],
    ) -> Result<InsertedEntry>;
}

/// Outcome of [`Store::insert_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedEntry {
    pub id: String,
    /// The recorded tags with their updated frequencies, in input order.
    pub tags: Vec<Tag>,
}
