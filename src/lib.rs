//! # Reading List
//!
//! Backend for a personal reading-list, blog and press-mentions site.
//!
//! Entries live in named collections (`shortform`, `blockchain`, `press`),
//! each with its own tag vocabulary. The listing pipeline itself lives in
//! the runtime-free `reading-list-core` crate; this crate adds the SQLite
//! store, the HTTP API, the RSS feed and the `rlist` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌──────────┐
//! │  HTTP / CLI  │──▶│ ListingService │──▶│  SQLite  │
//! │ (axum, clap) │   │     (core)     │   │  (sqlx)  │
//! └──────────────┘   └────────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rlist init                               # create database
//! rlist import shortform ./entries.json    # load entries
//! rlist list shortform --tags AI-CLI       # filtered listing
//! rlist serve                              # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite `Store` implementation |
//! | [`server`] | JSON HTTP API |
//! | [`feed`] | RSS rendering |
//! | [`browse`] | CLI listing commands |
//! | [`import`] | Bulk JSON import |

pub mod browse;
pub mod config;
pub mod db;
pub mod feed;
pub mod import;
pub mod migrate;
pub mod server;
pub mod sqlite_store;
