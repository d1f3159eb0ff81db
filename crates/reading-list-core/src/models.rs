//! Core data models used throughout Reading List.
//!
//! These types describe the stored entries and tags, the raw listing
//! parameters a request carries, and the view-ready shapes returned to
//! the HTTP layer. JSON field names are camelCase to match the site's
//! frontend.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ListingError;
use crate::reading::ReadingDetails;

/// One of the named content types, each with its own entries and tag vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Short notes on things read, watched or listened to.
    Shortform,
    /// Long-form entries about blockchain topics.
    Blockchain,
    /// Press mentions.
    Press,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Shortform, Collection::Blockchain, Collection::Press];

    /// Collections shown on the landing page.
    pub const LANDING: [Collection; 2] = [Collection::Shortform, Collection::Blockchain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Shortform => "shortform",
            Collection::Blockchain => "blockchain",
            Collection::Press => "press",
        }
    }

    /// Name of the primary date field for entries of this collection.
    pub fn date_field(&self) -> &'static str {
        match self {
            Collection::Shortform | Collection::Blockchain => "started",
            Collection::Press => "date",
        }
    }

    /// Whether formatted entries carry reading details (icon and verb).
    pub fn has_reading_details(&self) -> bool {
        !matches!(self, Collection::Press)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shortform" => Ok(Collection::Shortform),
            "blockchain" => Ok(Collection::Blockchain),
            "press" => Ok(Collection::Press),
            other => Err(ListingError::InvalidCollection(other.to_string())),
        }
    }
}

/// A stored content record.
///
/// The primary date is serialized as `date` and also accepted as `started`
/// on input. Collection-dependent attributes (`parenthetical`, `link`, …)
/// travel in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(rename = "date", alias = "started", deserialize_with = "deserialize_datetime")]
    pub primary_date: DateTime<Utc>,
    /// When the entry was saved. Stamped by
    /// [`ListingService::save_entry`](crate::listing::ListingService::save_entry)
    /// when absent; never defaulted on deserialization.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_datetime"
    )]
    pub entry_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentEntry {
    /// Returns a string-valued extra attribute, if present.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// A tag in one collection's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Canonical machine key, unique within the collection.
    pub value: String,
    /// Human-readable label.
    pub text: String,
    /// Number of entry saves that referenced this tag.
    #[serde(default)]
    pub frequency: i64,
}

/// A tag resolved against the vocabulary for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDisplay {
    pub value: String,
    pub text: String,
}

/// Raw listing parameters as they arrive on the query string.
///
/// Every field is optional free text; resolution into typed values is
/// lenient and never fails (see [`paginate`](crate::paginate) and
/// [`query`](crate::query)).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    /// `-`-delimited tag values, OR-combined.
    pub tags: Option<String>,
    /// Free-text search, matched literally.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Requested page size.
    pub limit: Option<String>,
    /// `reverse` for oldest first.
    pub order: Option<String>,
    /// Inclusive lower bound on the primary date (`YYYY-MM-DD`).
    pub start_date: Option<String>,
    /// Inclusive upper bound on the primary date (`YYYY-MM-DD`).
    pub end_date: Option<String>,
}

/// The primary date of a formatted entry, keyed by the collection's field name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryDate {
    Started { started: DateTime<Utc> },
    Date { date: DateTime<Utc> },
}

impl PrimaryDate {
    pub fn for_collection(collection: Collection, value: DateTime<Utc>) -> Self {
        match collection {
            Collection::Shortform | Collection::Blockchain => PrimaryDate::Started { started: value },
            Collection::Press => PrimaryDate::Date { date: value },
        }
    }
}

/// A view-ready entry: raw fields plus computed date display and resolved tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub primary_date: PrimaryDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_added: Option<DateTime<Utc>>,
    /// Long-form display date, e.g. `March 4, 2024`.
    pub date_display: String,
    /// Calendar date, e.g. `2024-03-04`.
    pub date_iso: String,
    pub tags: Vec<TagDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<ReadingDetails>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormattedEntry {
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResult {
    pub current_page: u64,
    pub page_size: u64,
    pub results: Vec<FormattedEntry>,
    pub total_pages: u64,
    pub total_results: u64,
    pub total_unfiltered_results: u64,
    /// Full, unfiltered vocabulary sorted by text.
    pub all_tags: Vec<Tag>,
}

/// Most recent entry per landing collection; `None` when a collection is empty.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingHighlights {
    pub most_recent_shortform: Option<FormattedEntry>,
    pub most_recent_blockchain: Option<FormattedEntry>,
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_date(raw)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parses a `YYYY-MM-DD` date, or the date part of an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
}

fn deserialize_optional_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_datetime(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {raw}"))),
        None => Ok(None),
    }
}
