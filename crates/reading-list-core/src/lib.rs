//! # Reading List Core
//!
//! Runtime-free logic for the Reading List site: data models, query
//! building, pagination math, tag vocabulary handling, result formatting,
//! the store abstraction and the listing service that composes them.
//!
//! This crate contains no tokio, sqlx, HTTP or filesystem dependencies.
//! Storage backends implement [`store::Store`]; the application crate
//! provides the SQLite backend and the HTTP surface.
//!
//! ## Pipeline
//!
//! ```text
//! request params ─▶ query::build_filter ─┐
//!                  paginate::PageRequest ─┼─▶ Store ─▶ raw entries
//!                                         │                │
//!            tags::sort_vocabulary ◀──────┘                ▼
//!                     │                          format::format_entry
//!                     └──── display map ────────────────▶  │
//!                                                          ▼
//!                                                   ListingResult
//! ```

pub mod error;
pub mod format;
pub mod listing;
pub mod models;
pub mod paginate;
pub mod query;
pub mod reading;
pub mod store;
pub mod tags;

pub use error::ListingError;
pub use listing::ListingService;
pub use models::{Collection, ContentEntry, FormattedEntry, ListingQuery, ListingResult, Tag};
