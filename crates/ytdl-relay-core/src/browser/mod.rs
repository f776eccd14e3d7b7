//! Browser capabilities the background side relies on: tab lookup and
//! cookie queries.
//!
//! The core only depends on these traits. [`MemoryBrowser`] is the in-process
//! host used by the CLI and tests; cookies can be loaded into it from a
//! Netscape `cookies.txt` export via [`netscape`].

mod memory;
pub mod netscape;

pub use memory::MemoryBrowser;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type TabId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
    pub active: bool,
}

/// One cookie as reported by the browser's cookie store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<i64>,
}

impl RawCookie {
    pub fn new(name: &str, value: &str, domain: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: path.to_string(),
            secure: false,
            http_only: false,
            expiration_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("no tab with id {0}")]
    NoSuchTab(TabId),
    #[error("cookie query for {domain} failed: {message}")]
    CookieQuery { domain: String, message: String },
}

/// True if a cookie stored for `cookie_domain` is returned by a query for
/// `query_domain`: same domain or a subdomain of it, leading dots ignored.
pub fn domain_matches(cookie_domain: &str, query_domain: &str) -> bool {
    let cookie = cookie_domain.trim_start_matches('.').to_ascii_lowercase();
    let query = query_domain.trim_start_matches('.').to_ascii_lowercase();
    cookie == query || cookie.ends_with(&format!(".{query}"))
}

#[async_trait]
pub trait BrowserHost: Send + Sync {
    async fn tab(&self, id: TabId) -> Result<TabInfo, HostError>;

    /// The focused tab of the current window, if any.
    async fn active_tab(&self) -> Option<TabInfo>;

    /// All cookies whose domain matches `domain` (see [`domain_matches`]).
    async fn cookies_for_domain(&self, domain: &str) -> Result<Vec<RawCookie>, HostError>;
}
