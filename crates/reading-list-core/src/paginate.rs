//! Page size, page number, offset and page count resolution.
//!
//! Request values arrive as free text; resolution is lenient and always
//! yields usable numbers. Page numbers past the last page are not clamped:
//! they resolve to an offset beyond the result set and produce an empty page.

use serde::Deserialize;

/// Per-endpoint page size configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageDefaults {
    /// Page size when the request does not give a usable limit.
    #[serde(default = "default_page_size")]
    pub default: u64,
    /// Largest page size a request may ask for.
    #[serde(default = "default_max_page_size")]
    pub max: u64,
}

fn default_page_size() -> u64 {
    10
}
fn default_max_page_size() -> u64 {
    100
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            default: default_page_size(),
            max: default_max_page_size(),
        }
    }
}

/// A fully resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
    pub offset: u64,
}

impl PageRequest {
    pub fn resolve(page: Option<&str>, limit: Option<&str>, defaults: &PageDefaults) -> Self {
        let page = resolve_page(page);
        let page_size = resolve_page_size(limit, defaults);
        Self {
            page,
            page_size,
            offset: compute_offset(page, page_size),
        }
    }

    /// Rows to skip, or `None` on the first page so stores issue no skip.
    pub fn skip(&self) -> Option<u64> {
        (self.offset > 0).then_some(self.offset)
    }
}

/// Resolves the page size: the configured default when the request value is
/// missing or not an integer, else the request value clamped to `[1, max]`.
pub fn resolve_page_size(requested: Option<&str>, defaults: &PageDefaults) -> u64 {
    let max = defaults.max.max(1);
    match requested.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        Some(n) => n.clamp(1, i64::try_from(max).unwrap_or(i64::MAX)) as u64,
        None => defaults.default.clamp(1, max),
    }
}

/// Resolves a 1-based page number; missing, invalid, or non-positive → 1.
pub fn resolve_page(requested: Option<&str>) -> u64 {
    requested
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as u64)
        .unwrap_or(1)
}

pub fn compute_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

/// `ceil(total / page_size)`; zero matches give zero pages.
pub fn compute_total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}
