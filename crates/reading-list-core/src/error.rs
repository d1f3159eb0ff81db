//! Typed failures surfaced by the listing pipeline.

use thiserror::Error;

/// Errors returned by [`ListingService`](crate::listing::ListingService)
/// and collection parsing.
///
/// An empty listing is never an error: callers receive `Ok` with zero
/// results, so "no matches" and "query failed" stay distinguishable.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The requested collection name is not one of the known collections.
    #[error("unknown collection: {0}")]
    InvalidCollection(String),

    /// An entry with this id is already stored.
    #[error("entry already exists: {0}")]
    Conflict(String),

    /// A store operation failed.
    #[error("store query failed: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl ListingError {
    /// Classifies a store failure, lifting [`DuplicateEntry`] to [`ListingError::Conflict`].
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DuplicateEntry>() {
            Some(duplicate) => ListingError::Conflict(duplicate.id.clone()),
            None => ListingError::Store(err),
        }
    }
}

/// Raised by [`Store`](crate::store::Store) implementations when an insert
/// reuses an existing entry id.
#[derive(Debug, Error)]
#[error("entry already exists: {id}")]
pub struct DuplicateEntry {
    pub id: String,
}
