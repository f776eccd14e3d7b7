//! `ytdl-relay health` – probe the download server once.

use anyhow::Result;
use ytdl_relay_core::config::SettingsStore;
use ytdl_relay_core::coordinator::Limits;
use ytdl_relay_core::video_ref::SITE_ORIGIN;

use super::session;

pub async fn run_health(store: SettingsStore) -> Result<()> {
    let browser = session::browser_for(SITE_ORIGIN, None)?;
    let coordinator = session::coordinator(store, &browser, Limits::default());
    let server = coordinator.server_url();
    if coordinator.check_server_health().await {
        println!("Server at {server} is healthy");
        Ok(())
    } else {
        anyhow::bail!("server at {server} is not responding")
    }
}
