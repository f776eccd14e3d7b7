//! In-process browser and coordinator wiring shared by the commands.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use ytdl_relay_core::browser::{netscape, MemoryBrowser, TabId};
use ytdl_relay_core::config::SettingsStore;
use ytdl_relay_core::cookies::CookieCollector;
use ytdl_relay_core::coordinator::{DownloadCoordinator, Limits};

/// The single tab the CLI pretends to be.
pub const CLI_TAB: TabId = 1;

/// A browser with one active tab on `page_url`, holding the cookies from
/// `cookie_file` if given.
pub fn browser_for(page_url: &str, cookie_file: Option<&Path>) -> Result<Arc<MemoryBrowser>> {
    let browser = Arc::new(MemoryBrowser::new());
    browser.open_tab(CLI_TAB, page_url, true);
    if let Some(path) = cookie_file {
        let cookies = netscape::read_cookie_file(path)?;
        tracing::info!(count = cookies.len(), "loaded cookies from {}", path.display());
        browser.add_cookies(cookies);
    }
    Ok(browser)
}

pub fn coordinator(
    store: SettingsStore,
    browser: &Arc<MemoryBrowser>,
    limits: Limits,
) -> DownloadCoordinator {
    DownloadCoordinator::new(store, CookieCollector::new(browser.clone())).with_limits(limits)
}
