//! In-memory [`Store`] implementation for testing.
//!
//! Entries and tags live in per-collection `Vec`s behind `std::sync::RwLock`,
//! so insertion order doubles as the store's default order. Filters are
//! evaluated with [`Filter::matches`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::error::DuplicateEntry;
use crate::models::{Collection, ContentEntry, Tag, TagDisplay};
use crate::query::Filter;

use super::{FindOptions, InsertedEntry, SortDirection, SortKey, Store};

/// In-memory store for tests and local experiments.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<Collection, Vec<ContentEntry>>>,
    tags: RwLock<HashMap<Collection, Vec<Tag>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tag directly, bypassing frequency bookkeeping.
    pub fn with_tag(self, collection: Collection, tag: Tag) -> Result<Self> {
        write(&self.tags)?.entry(collection).or_default().push(tag);
        Ok(self)
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_entries(
        &self,
        collection: Collection,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<ContentEntry>> {
        let entries = read(&self.entries)?;
        let mut matched: Vec<&ContentEntry> = entries
            .get(&collection)
            .map(|all| all.iter().filter(|e| filter.matches(e)).collect())
            .unwrap_or_default();

        // Stable sort keeps insertion order among equal keys.
        matched.sort_by(|a, b| {
            let ord = match options.sort.key {
                SortKey::PrimaryDate => a.primary_date.cmp(&b.primary_date),
                SortKey::EntryAdded => a.entry_added.cmp(&b.entry_added),
            };
            match options.sort.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn count_entries(&self, collection: Collection, filter: Option<&Filter>) -> Result<u64> {
        let entries = read(&self.entries)?;
        let count = entries
            .get(&collection)
            .map(|all| match filter {
                Some(f) => all.iter().filter(|e| f.matches(e)).count(),
                None => all.len(),
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn load_tags(&self, collection: Collection) -> Result<Vec<Tag>> {
        Ok(read(&self.tags)?
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_entry(
        &self,
        collection: Collection,
        entry: &ContentEntry,
        tags: &[TagDisplay],
    ) -> Result<InsertedEntry> {
        // Both locks are held for the whole insert, always entries first.
        let mut entries = write(&self.entries)?;
        let mut vocabularies = write(&self.tags)?;

        let id = if entry.id.is_empty() {
            let count = entries.get(&collection).map_or(0, Vec::len);
            format!("{}-{}", collection, count + 1)
        } else {
            entry.id.clone()
        };
        // Ids are unique across collections, as in the SQLite schema.
        if entries.values().flatten().any(|e| e.id == id) {
            return Err(DuplicateEntry { id }.into());
        }

        let vocabulary = vocabularies.entry(collection).or_default();
        let mut recorded = Vec::with_capacity(tags.len());
        for tag in tags {
            match vocabulary.iter_mut().find(|t| t.value == tag.value) {
                Some(existing) => {
                    existing.frequency += 1;
                    recorded.push(existing.clone());
                }
                None => {
                    let created = Tag {
                        value: tag.value.clone(),
                        text: tag.text.clone(),
                        frequency: 1,
                    };
                    vocabulary.push(created.clone());
                    recorded.push(created);
                }
            }
        }

        let mut entry = entry.clone();
        entry.id = id.clone();
        entries.entry(collection).or_default().push(entry);

        Ok(InsertedEntry { id, tags: recorded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_datetime;
    use crate::store::Sort;

    fn entry(id: &str, date: &str) -> ContentEntry {
        ContentEntry {
            id: id.to_string(),
            title: Some(id.to_string()),
            author: None,
            work: None,
            publisher: None,
            summary: None,
            primary_date: parse_datetime(date).unwrap(),
            entry_added: parse_datetime(date),
            tags: Vec::new(),
            extra: Default::default(),
        }
    }

    fn display(value: &str, text: &str) -> TagDisplay {
        TagDisplay {
            value: value.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_sorts_skips_and_limits() {
        let store = InMemoryStore::new();
        for (id, date) in [("b", "2024-02-01"), ("a", "2024-01-01"), ("c", "2024-03-01")] {
            store.insert_entry(Collection::Press, &entry(id, date), &[]).await.unwrap();
        }
        let options = FindOptions {
            sort: Sort::newest(SortKey::PrimaryDate),
            skip: Some(1),
            limit: Some(1),
        };
        let found = store
            .find_entries(Collection::Press, &Filter::default(), &options)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b");
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = InMemoryStore::new();
        store.insert_entry(Collection::Press, &entry("p", "2024-01-01"), &[]).await.unwrap();
        assert_eq!(store.count_entries(Collection::Press, None).await.unwrap(), 1);
        assert_eq!(store.count_entries(Collection::Shortform, None).await.unwrap(), 0);
        assert!(store
            .find_one(Collection::Shortform, Sort::newest(SortKey::PrimaryDate))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_generated_ids_and_duplicates() {
        let store = InMemoryStore::new();
        let inserted = store
            .insert_entry(Collection::Blockchain, &entry("", "2024-01-01"), &[])
            .await
            .unwrap();
        assert_eq!(inserted.id, "blockchain-1");
        let err = store
            .insert_entry(Collection::Blockchain, &entry(&inserted.id, "2024-01-01"), &[])
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<DuplicateEntry>().unwrap().id, "blockchain-1");

        let err = store
            .insert_entry(Collection::Press, &entry("blockchain-1", "2024-01-01"), &[])
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<DuplicateEntry>().is_some());
    }

    #[tokio::test]
    async fn test_tag_uses_create_then_increment() {
        let store = InMemoryStore::new();
        let first = store
            .insert_entry(Collection::Shortform, &entry("a", "2024-01-01"), &[display("AI", "AI")])
            .await
            .unwrap();
        assert_eq!(first.tags[0].frequency, 1);
        let second = store
            .insert_entry(Collection::Shortform, &entry("b", "2024-01-02"), &[display("AI", "ignored")])
            .await
            .unwrap();
        assert_eq!(second.tags[0].frequency, 2);
        assert_eq!(second.tags[0].text, "AI");
        assert_eq!(store.load_tags(Collection::Shortform).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_duplicate_records_no_tag_use() {
        let store = InMemoryStore::new()
            .with_tag(
                Collection::Press,
                Tag {
                    value: "AI".into(),
                    text: "ai".into(),
                    frequency: 3,
                },
            )
            .unwrap();
        store.insert_entry(Collection::Press, &entry("p", "2024-01-01"), &[]).await.unwrap();

        let result = store
            .insert_entry(Collection::Press, &entry("p", "2024-02-01"), &[display("AI", "AI")])
            .await;
        assert!(result.is_err());

        let tags = store.load_tags(Collection::Press).await.unwrap();
        assert_eq!(tags[0].frequency, 3);
        assert_eq!(store.count_entries(Collection::Press, None).await.unwrap(), 1);
    }
}
