//! Bulk import of entries from a JSON file (`rlist import`).
//!
//! The file holds a JSON array of entries in the same shape the
//! `POST /api/entry` endpoint accepts as `entry`. Each one is saved through
//! [`ListingService::save_entry`], so tag frequencies are recorded exactly
//! as they would be for an interactive save.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use reading_list_core::{Collection, ContentEntry, ListingService};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Read and validate every entry before anything is written.
pub fn read_entries(path: &Path) -> Result<Vec<ContentEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse entries from {}", path.display()))
}

pub async fn run_import(config: &Config, collection: Collection, path: &Path) -> Result<()> {
    let entries = read_entries(path)?;

    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let service = ListingService::new(Arc::new(SqliteStore::new(pool.clone())));

    for (i, entry) in entries.iter().enumerate() {
        let id = service
            .save_entry(collection, entry)
            .await
            .with_context(|| format!("Failed to import entry #{} from {}", i + 1, path.display()))?;
        info!(%collection, %id, "imported entry");
    }

    pool.close().await;
    println!("Imported {} {} entries.", entries.len(), collection);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_entries_accepts_started_and_date() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"title": "One", "started": "2024-01-02", "tags": ["AI"]}},
                {{"title": "Two", "date": "2024-02-03T10:00:00Z"}}
            ]"#
        )
        .unwrap();
        let entries = read_entries(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tags, vec!["AI".to_string()]);
        assert!(entries[1].tags.is_empty());
    }

    #[test]
    fn test_read_entries_rejects_missing_date() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"title": "No date"}}]"#).unwrap();
        assert!(read_entries(file.path()).is_err());
    }
}
