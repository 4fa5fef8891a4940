//! Query-string parameter sets shared by listing endpoints.

use serde::Deserialize;

fn default_limit() -> i64 {
    20
}

/// `?q=<fragment>&limit=<n>` for URL search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// `?limit=<n>` for the popular listing.
#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// `?limit=<n>&offset=<n>` pagination for link listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
