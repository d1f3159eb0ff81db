//! JSON HTTP API for the site frontend.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/{collection}` | Filtered, paginated listing |
//! | `GET`  | `/api/{collection}/recent` | Most recently added entries |
//! | `GET`  | `/api/{collection}/rss` | RSS 2.0 feed of recent entries |
//! | `GET`  | `/api/landing` | Newest shortform and blockchain entries |
//! | `GET`  | `/api/tags` | Every collection's tag vocabulary |
//! | `GET`  | `/api/reading-statuses` | Reading-status choices |
//! | `POST` | `/api/entry` | Save an entry (bearer token) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "unknown collection: books" } }
//! ```
//!
//! Error codes: `bad_request` (400), `unauthorized` (401), `forbidden` (403),
//! `not_found` (404), `conflict` (409), `internal` (500). Saving an entry
//! whose id is already stored is a `conflict`. Store failures are logged and
//! reported as `internal` without details.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use reading_list_core::models::LandingHighlights;
use reading_list_core::reading::{reading_status_lists, ReadingStatusLists};
use reading_list_core::store::Store;
use reading_list_core::{
    Collection, ContentEntry, FormattedEntry, ListingError, ListingQuery, ListingResult,
    ListingService, Tag,
};

use crate::config::Config;
use crate::db;
use crate::feed::{render_rss, RSS_CONTENT_TYPE};
use crate::migrate;
use crate::sqlite_store::SqliteStore;

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    listings: ListingService,
}

/// Build the application router over any [`Store`].
///
/// Integration tests pass an in-memory store; [`run_server`] passes the
/// SQLite store.
pub fn router(config: Config, store: Arc<dyn Store>) -> Router {
    let state = AppState {
        config: Arc::new(config),
        listings: ListingService::new(store),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/landing", get(handle_landing))
        .route("/api/tags", get(handle_tags))
        .route("/api/reading-statuses", get(handle_reading_statuses))
        .route("/api/entry", post(handle_save_entry))
        .route("/api/{collection}", get(handle_listing))
        .route("/api/{collection}/recent", get(handle_recent))
        .route("/api/{collection}/rss", get(handle_rss))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and runs until terminated.
///
/// The schema is applied on startup, so a fresh database file is usable
/// without a separate `init`.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;

    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));
    let app = router(config.clone(), store);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(addr = %listener.local_addr()?, "reading list server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ListingError> for AppError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::InvalidCollection(name) => not_found(format!("unknown collection: {name}")),
            ListingError::Conflict(id) => conflict(format!("entry already exists: {id}")),
            ListingError::Store(source) => {
                error!("store query failed: {source:#}");
                internal()
            }
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn unauthorized() -> AppError {
    AppError {
        status: StatusCode::UNAUTHORIZED,
        code: "unauthorized",
        message: "missing or invalid bearer token".to_string(),
    }
}

fn forbidden(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::FORBIDDEN,
        code: "forbidden",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn conflict(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::CONFLICT,
        code: "conflict",
        message: message.into(),
    }
}

fn internal() -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: "internal error".to_string(),
    }
}

fn parse_collection(name: &str) -> Result<Collection, AppError> {
    Ok(name.parse::<Collection>()?)
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Listings ============

async fn handle_listing(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResult>, AppError> {
    let collection = parse_collection(&collection)?;
    let defaults = state.config.pagination.for_collection(collection);
    let result = state
        .listings
        .list_paginated(collection, &query, defaults)
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Default, Deserialize)]
struct RecentParams {
    count: Option<String>,
}

/// Requested feed size, falling back to the configured count when absent,
/// unparseable or zero, and capped at the configured maximum.
fn resolve_recent_count(config: &Config, requested: Option<&str>) -> usize {
    requested
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(config.feed.count)
        .min(config.feed.max_count)
}

async fn handle_recent(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<FormattedEntry>>, AppError> {
    let collection = parse_collection(&collection)?;
    let count = resolve_recent_count(&state.config, params.count.as_deref());
    Ok(Json(state.listings.list_recent(collection, count).await?))
}

async fn handle_rss(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Response, AppError> {
    let collection = parse_collection(&collection)?;
    let entries = state
        .listings
        .list_recent(collection, state.config.feed.count)
        .await?;
    let xml = render_rss(&state.config.feed, collection, &entries).map_err(|e| {
        error!(%collection, "rss rendering failed: {e:#}");
        internal()
    })?;
    Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response())
}

async fn handle_landing(State(state): State<AppState>) -> Result<Json<LandingHighlights>, AppError> {
    Ok(Json(state.listings.landing_highlights().await?))
}

async fn handle_tags(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<Collection, Vec<Tag>>>, AppError> {
    Ok(Json(state.listings.vocabularies().await?))
}

async fn handle_reading_statuses() -> Json<ReadingStatusLists> {
    Json(reading_status_lists())
}

// ============ POST /api/entry ============

#[derive(Debug, Deserialize)]
struct SaveRequest {
    #[serde(rename = "type")]
    kind: String,
    entry: ContentEntry,
}

fn check_bearer(config: &Config, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = config.auth.token.as_deref() else {
        return Err(forbidden("entry saving is disabled"));
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;

    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        warn!("rejected entry save with invalid token");
        Err(unauthorized())
    }
}

async fn handle_save_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SaveRequest>,
) -> Result<StatusCode, AppError> {
    check_bearer(&state.config, &headers)?;
    let collection = request
        .kind
        .parse::<Collection>()
        .map_err(|e| bad_request(e.to_string()))?;

    let id = state.listings.save_entry(collection, &request.entry).await?;
    info!(%collection, %id, "saved entry");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> Config {
        let mut config: Config = toml::from_str(
            r#"
            [db]
            path = "unused.sqlite"
            [server]
            bind = "127.0.0.1:0"
            [feed]
            count = 20
            max_count = 50
            "#,
        )
        .unwrap();
        config.auth.token = token.map(str::to_string);
        config
    }

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_recent_count_defaults_and_caps() {
        let config = config(None);
        assert_eq!(resolve_recent_count(&config, None), 20);
        assert_eq!(resolve_recent_count(&config, Some("5")), 5);
        assert_eq!(resolve_recent_count(&config, Some("0")), 20);
        assert_eq!(resolve_recent_count(&config, Some("lots")), 20);
        assert_eq!(resolve_recent_count(&config, Some("500")), 50);
    }

    #[test]
    fn test_bearer_token_checks() {
        let config = config(Some("s3cret"));
        assert!(check_bearer(&config, &bearer("Bearer s3cret")).is_ok());
        let wrong = check_bearer(&config, &bearer("Bearer nope")).unwrap_err();
        assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
        let missing = check_bearer(&config, &HeaderMap::new()).unwrap_err();
        assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_saving_disabled_without_token() {
        let err = check_bearer(&config(None), &bearer("Bearer anything")).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_listing_errors_map_to_status() {
        let unknown: AppError = ListingError::InvalidCollection("books".into()).into();
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);
        let duplicate: AppError = ListingError::Conflict("e1".into()).into();
        assert_eq!(duplicate.status, StatusCode::CONFLICT);
        assert_eq!(duplicate.code, "conflict");
        let failed: AppError = ListingError::Store(anyhow::anyhow!("disk gone")).into();
        assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failed.message, "internal error");
    }
}
