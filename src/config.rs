//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/rlist.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:7878"
//!
//! [pagination.shortform]
//! default = 10
//! max = 50
//!
//! [feed]
//! count = 20
//! title = "Reading List"
//! link = "https://example.com"
//!
//! [auth]
//! token = "change-me"
//! ```
//!
//! Only `[db]` and `[server]` are required; every other section has defaults.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use reading_list_core::listing::DEFAULT_RECENT_COUNT;
use reading_list_core::paginate::PageDefaults;
use reading_list_core::Collection;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Page size defaults for each collection's listing endpoint.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PaginationConfig {
    #[serde(default)]
    pub shortform: PageDefaults,
    #[serde(default)]
    pub blockchain: PageDefaults,
    #[serde(default)]
    pub press: PageDefaults,
}

impl PaginationConfig {
    pub fn for_collection(&self, collection: Collection) -> &PageDefaults {
        match collection {
            Collection::Shortform => &self.shortform,
            Collection::Blockchain => &self.blockchain,
            Collection::Press => &self.press,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    /// Entries per syndication feed.
    #[serde(default = "default_feed_count")]
    pub count: usize,
    /// Upper bound for an explicit `count` request parameter.
    #[serde(default = "default_feed_max_count")]
    pub max_count: usize,
    #[serde(default = "default_feed_title")]
    pub title: String,
    #[serde(default = "default_feed_link")]
    pub link: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            count: default_feed_count(),
            max_count: default_feed_max_count(),
            title: default_feed_title(),
            link: default_feed_link(),
            description: None,
        }
    }
}

fn default_feed_count() -> usize {
    DEFAULT_RECENT_COUNT
}
fn default_feed_max_count() -> usize {
    100
}
fn default_feed_title() -> String {
    "Reading List".to_string()
}
fn default_feed_link() -> String {
    "http://localhost:7878".to_string()
}

/// Credentials for the entry-save endpoint. Saving is disabled without a token.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub token: Option<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    for collection in Collection::ALL {
        let defaults = config.pagination.for_collection(collection);
        if defaults.max < 1 {
            bail!("pagination.{}.max must be >= 1", collection);
        }
        if defaults.default < 1 || defaults.default > defaults.max {
            bail!(
                "pagination.{}.default must be in [1, {}]",
                collection,
                defaults.max
            );
        }
    }

    if config.feed.count == 0 {
        bail!("feed.count must be > 0");
    }
    if config.feed.max_count < config.feed.count {
        bail!("feed.max_count must be >= feed.count");
    }

    if let Some(token) = &config.auth.token {
        if token.trim().is_empty() {
            bail!("auth.token must not be empty when set");
        }
    }

    Ok(())
}
