//! # Reading List CLI (`rlist`)
//!
//! The `rlist` binary initializes the database, imports entries, browses
//! listings from the terminal and runs the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! rlist --config ./config/rlist.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rlist init` | Create the SQLite database and run schema migrations |
//! | `rlist serve` | Start the HTTP API server |
//! | `rlist list <collection>` | Filtered, paginated listing |
//! | `rlist recent <collection>` | Most recently added entries |
//! | `rlist tags` | Tag vocabularies of every collection |
//! | `rlist import <collection> <file>` | Save entries from a JSON array |
//!
//! ## Examples
//!
//! ```bash
//! # Second page of shortform entries tagged AI or CLI, oldest first
//! rlist list shortform --tags AI-CLI --page 2 --reverse
//!
//! # Press mentions from 2023
//! rlist list press --start-date 2023-01-01 --end-date 2023-12-31
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reading_list::{browse, config, import, migrate, server};
use reading_list_core::{Collection, ListingQuery};

/// Reading List CLI: listings, tags and the HTTP API for a personal
/// reading-list site.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/rlist.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "rlist",
    about = "Reading List: filterable listings, tag vocabularies and RSS for a personal site",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/rlist.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Start the HTTP API server on `[server].bind`.
    Serve,

    /// Show one page of a collection's listing.
    List {
        /// Collection: `shortform`, `blockchain` or `press`.
        #[arg(value_parser = parse_collection)]
        collection: Collection,

        /// Tag values joined with `-`; entries with any of them match.
        #[arg(long)]
        tags: Option<String>,

        /// Literal text matched against title, author, work, publisher and summary.
        #[arg(long)]
        search: Option<String>,

        /// 1-based page number.
        #[arg(long)]
        page: Option<String>,

        /// Page size, clamped to the collection's configured maximum.
        #[arg(long)]
        limit: Option<String>,

        /// Oldest first.
        #[arg(long)]
        reverse: bool,

        /// Only entries dated on or after this day (YYYY-MM-DD).
        #[arg(long)]
        start_date: Option<String>,

        /// Only entries dated on or before this day (YYYY-MM-DD).
        #[arg(long)]
        end_date: Option<String>,

        /// Print the API's JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Show the most recently added entries of a collection.
    Recent {
        #[arg(value_parser = parse_collection)]
        collection: Collection,

        /// Number of entries; defaults to `[feed].count`.
        #[arg(long)]
        count: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Show every collection's tag vocabulary with frequencies.
    Tags {
        #[arg(long)]
        json: bool,
    },

    /// Save entries from a JSON array file into a collection.
    Import {
        #[arg(value_parser = parse_collection)]
        collection: Collection,

        /// Path to a JSON file holding an array of entries.
        file: PathBuf,
    },
}

fn parse_collection(s: &str) -> Result<Collection, String> {
    s.parse::<Collection>().map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));

    // Logs go to stderr so `--json` output stays clean on stdout.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List {
            collection,
            tags,
            search,
            page,
            limit,
            reverse,
            start_date,
            end_date,
            json,
        } => {
            let query = ListingQuery {
                tags,
                search,
                page,
                limit,
                order: reverse.then(|| "reverse".to_string()),
                start_date,
                end_date,
            };
            browse::run_list(&cfg, collection, &query, json).await?;
        }
        Commands::Recent {
            collection,
            count,
            json,
        } => {
            let count = count.unwrap_or(cfg.feed.count).min(cfg.feed.max_count);
            browse::run_recent(&cfg, collection, count, json).await?;
        }
        Commands::Tags { json } => {
            browse::run_tags(&cfg, json).await?;
        }
        Commands::Import { collection, file } => {
            import::run_import(&cfg, collection, &file).await?;
        }
    }

    Ok(())
}
