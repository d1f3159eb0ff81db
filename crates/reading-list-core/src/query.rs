//! Filter construction from listing parameters.
//!
//! [`build_filter`] turns the raw [`ListingQuery`] into a store-agnostic
//! [`Filter`]. Stores either evaluate [`Filter::matches`] directly (the
//! in-memory store) or translate the filter into their own query language
//! (the SQLite store binds [`SearchTerm::pattern`] to `REGEXP`).
//!
//! Free-text search is always literal: regex metacharacters in user input
//! are escaped before any pattern is compiled, and matching uses the
//! `regex` crate, which runs in linear time without backtracking.

use std::collections::HashSet;

use chrono::{DateTime, Days, NaiveDate, Utc};
use regex::Regex;

use crate::models::{parse_date, ContentEntry, ListingQuery};

/// Separator between tag values in the `tags` parameter.
pub const TAG_DELIMITER: char = '-';

/// Entry fields searched by free-text search, OR-combined.
pub const SEARCH_FIELDS: [&str; 5] = ["title", "author", "work", "publisher", "summary"];

/// A compiled, case-insensitive, literal search term.
#[derive(Debug, Clone)]
pub struct SearchTerm {
    pattern: String,
    matcher: Option<Regex>,
    lowered: String,
}

impl SearchTerm {
    pub fn new(raw: &str) -> Self {
        let pattern = format!("(?i){}", regex::escape(raw));
        // Escaped input always parses; only the compiled-size limit can fail,
        // in which case matching falls back to lowercase substring search.
        let matcher = Regex::new(&pattern).ok();
        Self {
            pattern,
            matcher,
            lowered: raw.to_lowercase(),
        }
    }

    /// Regular expression source for regex-capable stores: the escaped
    /// input under the Unicode case-insensitive flag.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        match &self.matcher {
            Some(re) => re.is_match(haystack),
            None => haystack.to_lowercase().contains(&self.lowered),
        }
    }
}

/// A filter predicate over entries. All present parts are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Match entries carrying at least one of these tag values.
    pub tags: Option<Vec<String>>,
    /// Match entries whose searchable fields contain this text.
    pub search: Option<SearchTerm>,
    /// Inclusive lower bound on the primary date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the primary date.
    pub end_date: Option<NaiveDate>,
}

impl Filter {
    /// True when the filter matches every entry.
    pub fn is_empty(&self) -> bool {
        self.tags.is_none()
            && self.search.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Earliest primary date admitted by the filter.
    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// First instant past the end date (exclusive upper bound).
    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.end_date
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn matches(&self, entry: &ContentEntry) -> bool {
        if let Some(tags) = &self.tags {
            let wanted: HashSet<&str> = tags.iter().map(String::as_str).collect();
            if !entry.tags.iter().any(|t| wanted.contains(t.as_str())) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let fields = [
                &entry.title,
                &entry.author,
                &entry.work,
                &entry.publisher,
                &entry.summary,
            ];
            let hit = fields
                .iter()
                .any(|field| field.as_deref().is_some_and(|value| search.is_match(value)));
            if !hit {
                return false;
            }
        }

        if let Some(lower) = self.lower_bound() {
            if entry.primary_date < lower {
                return false;
            }
        }
        if let Some(upper) = self.upper_bound() {
            if entry.primary_date >= upper {
                return false;
            }
        }

        true
    }
}

/// Builds a filter from raw listing parameters.
///
/// Never fails: empty tag lists and blank search strings are dropped, and
/// unparseable date bounds are ignored.
pub fn build_filter(params: &ListingQuery) -> Filter {
    let tags = params.tags.as_deref().and_then(parse_tags);
    let search = params
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(SearchTerm::new);

    Filter {
        tags,
        search,
        start_date: params.start_date.as_deref().and_then(parse_date),
        end_date: params.end_date.as_deref().and_then(parse_date),
    }
}

fn parse_tags(raw: &str) -> Option<Vec<String>> {
    let tags: Vec<String> = raw
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}
