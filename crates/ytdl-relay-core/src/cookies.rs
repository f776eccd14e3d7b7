//! Session cookie collection for the video site.
//!
//! Each known cookie-domain variant is queried concurrently; a failing query
//! degrades to an empty result for that domain. Results are merged,
//! deduplicated by `(name, domain, path)` with the first occurrence winning,
//! and serialized as a `Cookie`-header style string.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::browser::{BrowserHost, HostError, RawCookie, TabId};

/// Cookie-domain variants queried for every bundle, in merge order.
pub const COOKIE_DOMAINS: [&str; 2] = [".youtube.com", "www.youtube.com"];

/// A tab belongs to the site if its URL contains this.
const SITE_MARKER: &str = "youtube.com";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieBundle {
    /// `name=value` pairs joined with `"; "`.
    #[serde(rename = "cookieString")]
    pub cookie_string: String,
    #[serde(rename = "rawCookies")]
    pub cookies: Vec<RawCookie>,
}

impl CookieBundle {
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieError {
    #[error("tab lookup failed: {0}")]
    Tab(#[from] HostError),
    #[error("not a YouTube tab: {url}")]
    WrongContext { url: String },
}

/// Merges per-domain results in order and drops later duplicates.
pub fn merge_cookies<I>(results: I) -> CookieBundle
where
    I: IntoIterator<Item = Vec<RawCookie>>,
{
    let mut seen = HashSet::new();
    let mut cookies = Vec::new();
    for cookie in results.into_iter().flatten() {
        let key = (cookie.name.clone(), cookie.domain.clone(), cookie.path.clone());
        if seen.insert(key) {
            cookies.push(cookie);
        }
    }
    let cookie_string = cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ");
    CookieBundle {
        cookie_string,
        cookies,
    }
}

#[derive(Clone)]
pub struct CookieCollector {
    host: Arc<dyn BrowserHost>,
}

impl CookieCollector {
    pub fn new(host: Arc<dyn BrowserHost>) -> Self {
        Self { host }
    }

    /// Builds a fresh bundle for the site the tab is showing.
    pub async fn collect(&self, tab_id: TabId) -> Result<CookieBundle, CookieError> {
        let tab = self.host.tab(tab_id).await?;
        if !tab.url.contains(SITE_MARKER) {
            return Err(CookieError::WrongContext { url: tab.url });
        }

        let queries = COOKIE_DOMAINS.iter().map(|domain| async move {
            match self.host.cookies_for_domain(domain).await {
                Ok(cookies) => {
                    tracing::debug!(domain, count = cookies.len(), "cookies found");
                    cookies
                }
                Err(e) => {
                    tracing::warn!(domain, "cookie query failed: {}", e);
                    Vec::new()
                }
            }
        });
        let bundle = merge_cookies(join_all(queries).await);

        if bundle.is_empty() {
            tracing::warn!("no cookies found for YouTube domains");
        } else {
            tracing::debug!(
                count = bundle.len(),
                bytes = bundle.cookie_string.len(),
                "cookie bundle built"
            );
        }
        Ok(bundle)
    }
}
