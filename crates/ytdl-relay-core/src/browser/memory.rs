//! In-process browser host: a tab list and a cookie jar behind locks.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::RwLock;

use super::{domain_matches, BrowserHost, HostError, RawCookie, TabId, TabInfo};

#[derive(Default)]
pub struct MemoryBrowser {
    tabs: RwLock<Vec<TabInfo>>,
    cookies: RwLock<Vec<RawCookie>>,
    failing_domains: RwLock<HashSet<String>>,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tab; an active tab deactivates every other one.
    pub fn open_tab(&self, id: TabId, url: &str, active: bool) {
        let mut tabs = self.tabs.write().unwrap();
        if active {
            for t in tabs.iter_mut() {
                t.active = false;
            }
        }
        tabs.retain(|t| t.id != id);
        tabs.push(TabInfo {
            id,
            url: url.to_string(),
            active,
        });
    }

    pub fn close_tab(&self, id: TabId) {
        self.tabs.write().unwrap().retain(|t| t.id != id);
    }

    pub fn add_cookie(&self, cookie: RawCookie) {
        self.cookies.write().unwrap().push(cookie);
    }

    pub fn add_cookies(&self, cookies: impl IntoIterator<Item = RawCookie>) {
        self.cookies.write().unwrap().extend(cookies);
    }

    /// Makes every query for exactly `domain` fail.
    pub fn fail_domain(&self, domain: &str) {
        self.failing_domains
            .write()
            .unwrap()
            .insert(domain.to_string());
    }
}

#[async_trait]
impl BrowserHost for MemoryBrowser {
    async fn tab(&self, id: TabId) -> Result<TabInfo, HostError> {
        self.tabs
            .read()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(HostError::NoSuchTab(id))
    }

    async fn active_tab(&self) -> Option<TabInfo> {
        self.tabs.read().unwrap().iter().find(|t| t.active).cloned()
    }

    async fn cookies_for_domain(&self, domain: &str) -> Result<Vec<RawCookie>, HostError> {
        if self.failing_domains.read().unwrap().contains(domain) {
            return Err(HostError::CookieQuery {
                domain: domain.to_string(),
                message: "cookie store unavailable".to_string(),
            });
        }
        Ok(self
            .cookies
            .read()
            .unwrap()
            .iter()
            .filter(|c| domain_matches(&c.domain, domain))
            .cloned()
            .collect())
    }
}
