//! `ytdl-relay monitor` – print server health changes until interrupted.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use ytdl_relay_core::config::SettingsStore;
use ytdl_relay_core::coordinator::{HealthMonitor, Limits};
use ytdl_relay_core::video_ref::SITE_ORIGIN;

use super::session;

pub async fn run_monitor(store: SettingsStore, interval_secs: u64) -> Result<()> {
    if interval_secs == 0 {
        anyhow::bail!("interval must be at least 1 second");
    }
    let browser = session::browser_for(SITE_ORIGIN, None)?;
    let coordinator = Arc::new(session::coordinator(store, &browser, Limits::default()));
    let server = coordinator.server_url();
    println!("Probing {server} every {interval_secs}s (Ctrl-C to stop)");

    let mut monitor = HealthMonitor::spawn(coordinator, Duration::from_secs(interval_secs));
    let mut last = None;
    while let Some(healthy) = monitor.next().await {
        if last != Some(healthy) {
            println!("server is {}", if healthy { "up" } else { "down" });
            last = Some(healthy);
        }
    }
    Ok(())
}
