//! SQLite-backed [`Store`] implementation.
//!
//! Filters are translated into SQL with [`sqlx::QueryBuilder`]; every user
//! value is bound, never interpolated.
//!
//! - Tag filter: `EXISTS` over `json_each(tags_json)` with an `IN` list.
//! - Search: `REGEXP ?` per searchable column, OR-combined, bound to
//!   [`SearchTerm::pattern`](reading_list_core::query::SearchTerm::pattern).
//!   The pattern is escaped and case-insensitive, so matching is literal and
//!   folds non-ASCII case the same way the in-memory store does. The pool
//!   must be opened with `with_regexp()` (see [`crate::db::connect`]).
//! - Date bounds: half-open millisecond range on `primary_date`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use reading_list_core::error::DuplicateEntry;
use reading_list_core::models::{Collection, ContentEntry, Tag, TagDisplay};
use reading_list_core::query::{Filter, SEARCH_FIELDS};
use reading_list_core::store::{FindOptions, InsertedEntry, SortDirection, SortKey, Store};

const ENTRY_COLUMNS: &str =
    "id, title, author, work, publisher, summary, primary_date, entry_added, tags_json, extra_json";

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, collection: Collection, filter: Option<&Filter>) {
    qb.push(" WHERE collection = ");
    qb.push_bind(collection.as_str());

    let Some(filter) = filter else {
        return;
    };

    if let Some(tags) = &filter.tags {
        if tags.is_empty() {
            qb.push(" AND 0");
        } else {
            qb.push(" AND EXISTS (SELECT 1 FROM json_each(entries.tags_json) AS t WHERE t.value IN (");
            {
                let mut values = qb.separated(", ");
                for tag in tags {
                    values.push_bind(tag.clone());
                }
            }
            qb.push("))");
        }
    }

    if let Some(search) = &filter.search {
        qb.push(" AND (");
        for (i, field) in SEARCH_FIELDS.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*field);
            qb.push(" REGEXP ");
            qb.push_bind(search.pattern().to_string());
        }
        qb.push(")");
    }

    if let Some(lower) = filter.lower_bound() {
        qb.push(" AND primary_date >= ");
        qb.push_bind(lower.timestamp_millis());
    }
    if let Some(upper) = filter.upper_bound() {
        qb.push(" AND primary_date < ");
        qb.push_bind(upper.timestamp_millis());
    }
}

fn to_sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("timestamp out of range: {}", ms))
}

fn entry_from_row(row: &SqliteRow) -> Result<ContentEntry> {
    let id: String = row.try_get("id")?;
    let tags_json: String = row.try_get("tags_json")?;
    let extra_json: String = row.try_get("extra_json")?;

    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .with_context(|| format!("invalid tags_json for entry {}", id))?;
    let extra: Map<String, Value> = serde_json::from_str(&extra_json)
        .with_context(|| format!("invalid extra_json for entry {}", id))?;

    Ok(ContentEntry {
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        work: row.try_get("work")?,
        publisher: row.try_get("publisher")?,
        summary: row.try_get("summary")?,
        primary_date: millis_to_datetime(row.try_get("primary_date")?)?,
        entry_added: row
            .try_get::<Option<i64>, _>("entry_added")?
            .map(millis_to_datetime)
            .transpose()?,
        tags,
        extra,
        id,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn find_entries(
        &self,
        collection: Collection,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<ContentEntry>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM entries", ENTRY_COLUMNS));
        push_filter(&mut qb, collection, Some(filter));

        let column = match options.sort.key {
            SortKey::PrimaryDate => "primary_date",
            SortKey::EntryAdded => "entry_added",
        };
        let direction = match options.sort.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        qb.push(format!(" ORDER BY {} {}, rowid ASC", column, direction));

        match options.limit {
            Some(limit) => {
                qb.push(" LIMIT ");
                qb.push_bind(to_sql_int(limit));
            }
            // SQLite only accepts OFFSET after a LIMIT.
            None if options.skip.is_some() => {
                qb.push(" LIMIT -1");
            }
            None => {}
        }
        if let Some(skip) = options.skip {
            qb.push(" OFFSET ");
            qb.push_bind(to_sql_int(skip));
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(entry_from_row).collect()
    }

    async fn count_entries(&self, collection: Collection, filter: Option<&Filter>) -> Result<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM entries");
        push_filter(&mut qb, collection, filter);
        let count: i64 = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn load_tags(&self, collection: Collection) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT value, text, frequency FROM tags WHERE collection = ? ORDER BY rowid",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Tag> {
                Ok(Tag {
                    value: row.try_get("value")?,
                    text: row.try_get("text")?,
                    frequency: row.try_get("frequency")?,
                })
            })
            .collect()
    }

    async fn insert_entry(
        &self,
        collection: Collection,
        entry: &ContentEntry,
        tags: &[TagDisplay],
    ) -> Result<InsertedEntry> {
        let id = if entry.id.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            entry.id.clone()
        };
        let tags_json = serde_json::to_string(&entry.tags)?;
        let extra_json = serde_json::to_string(&entry.extra)?;

        // Dropping the transaction without commit rolls everything back.
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO entries (id, collection, title, author, work, publisher, summary,
                                 primary_date, entry_added, tags_json, extra_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(collection.as_str())
        .bind(&entry.title)
        .bind(&entry.author)
        .bind(&entry.work)
        .bind(&entry.publisher)
        .bind(&entry.summary)
        .bind(entry.primary_date.timestamp_millis())
        .bind(entry.entry_added.map(|added| added.timestamp_millis()))
        .bind(&tags_json)
        .bind(&extra_json)
        .execute(&mut *tx)
        .await;
        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(DuplicateEntry { id }.into());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to insert {} entry {}", collection, id)));
            }
        }

        let mut recorded = Vec::with_capacity(tags.len());
        for tag in tags {
            let row = sqlx::query(
                r#"
                INSERT INTO tags (collection, value, text, frequency)
                VALUES (?, ?, ?, 1)
                ON CONFLICT(collection, value) DO UPDATE SET
                    frequency = frequency + 1
                RETURNING value, text, frequency
                "#,
            )
            .bind(collection.as_str())
            .bind(&tag.value)
            .bind(&tag.text)
            .fetch_one(&mut *tx)
            .await
            .with_context(|| format!("Failed to record {} tag {}", collection, tag.value))?;

            recorded.push(Tag {
                value: row.try_get("value")?,
                text: row.try_get("text")?,
                frequency: row.try_get("frequency")?,
            });
        }

        tx.commit().await?;
        Ok(InsertedEntry { id, tags: recorded })
    }
}
