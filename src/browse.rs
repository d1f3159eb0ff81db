//! CLI read commands: `rlist list`, `rlist recent` and `rlist tags`.
//!
//! Each command runs the same [`ListingService`] call as the matching HTTP
//! endpoint against the configured SQLite database, then prints either a
//! human-readable summary or the endpoint's JSON.

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;

use reading_list_core::{Collection, FormattedEntry, ListingQuery, ListingService};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

async fn open_service(config: &Config) -> Result<(ListingService, SqlitePool)> {
    let pool = db::connect(config).await?;
    let service = ListingService::new(Arc::new(SqliteStore::new(pool.clone())));
    Ok((service, pool))
}

pub async fn run_list(
    config: &Config,
    collection: Collection,
    query: &ListingQuery,
    json: bool,
) -> Result<()> {
    let (service, pool) = open_service(config).await?;
    let defaults = config.pagination.for_collection(collection);
    let result = service.list_paginated(collection, query, defaults).await?;
    pool.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.results.is_empty() {
        println!("No results.");
    }
    let first = result.current_page.saturating_sub(1) * result.page_size;
    for (i, entry) in result.results.iter().enumerate() {
        print_entry(first as usize + i + 1, entry);
    }
    println!(
        "Page {} of {} ({} matching, {} total)",
        result.current_page,
        result.total_pages,
        result.total_results,
        result.total_unfiltered_results
    );
    Ok(())
}

pub async fn run_recent(config: &Config, collection: Collection, count: usize, json: bool) -> Result<()> {
    let (service, pool) = open_service(config).await?;
    let entries = service.list_recent(collection, count).await?;
    pool.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No results.");
    }
    for (i, entry) in entries.iter().enumerate() {
        print_entry(i + 1, entry);
    }
    Ok(())
}

pub async fn run_tags(config: &Config, json: bool) -> Result<()> {
    let (service, pool) = open_service(config).await?;
    let vocabularies = service.vocabularies().await?;
    pool.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&vocabularies)?);
        return Ok(());
    }

    for (collection, tags) in &vocabularies {
        println!("{} ({} tags)", collection, tags.len());
        for tag in tags {
            println!("  {:<32} {:>5}  [{}]", tag.text, tag.frequency, tag.value);
        }
        println!();
    }
    Ok(())
}

fn print_entry(n: usize, entry: &FormattedEntry) {
    let title = entry
        .title
        .as_deref()
        .or(entry.work.as_deref())
        .unwrap_or("(untitled)");
    println!("{}. {} ({})", n, title, entry.date_display);
    if let Some(author) = &entry.author {
        println!("    by: {}", author);
    }
    if let Some(reading) = &entry.reading {
        println!("    {}: {}", reading.verb, reading.icon);
    }
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(|t| t.text.as_str()).collect();
        println!("    tags: {}", tags.join(", "));
    }
    println!("    id: {}", entry.id);
    println!();
}
