//! `ytdl-relay submit <url>` – send one video through the router, the same
//! path a click on the page takes.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use ytdl_relay_core::config::SettingsStore;
use ytdl_relay_core::coordinator::Limits;
use ytdl_relay_core::notify::Severity;
use ytdl_relay_core::outcome;
use ytdl_relay_core::router::{Background, Request};
use ytdl_relay_core::video_ref::VideoReference;

use super::session::{self, CLI_TAB};

pub async fn run_submit(
    store: SettingsStore,
    url: &str,
    cookie_file: Option<&Path>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let video = VideoReference::from_watch_href(url)
        .with_context(|| format!("not a video link: {url}"))?;

    let browser = session::browser_for(&video.url(), cookie_file)?;
    let mut limits = Limits::default();
    if let Some(secs) = timeout_secs {
        limits.request_timeout = Duration::from_secs(secs);
    }
    let coordinator = session::coordinator(store, &browser, limits);
    let server = coordinator.server_url();
    let (client, _background) = Background::new(Arc::new(coordinator), browser).spawn();

    println!("Sending {video} to {server}");
    let started = Instant::now();
    let outcome = client
        .with_sender(CLI_TAB)
        .send(Request::DownloadVideo {
            video_url: video.url(),
            tab_id: None,
        })
        .await;
    let (message, severity) = outcome::describe(&outcome, started.elapsed());

    if let Some(result) = outcome.as_ref().ok().and_then(|r| r.result.as_ref()) {
        println!("{}", serde_json::to_string_pretty(result)?);
    }
    match severity {
        Severity::Error => anyhow::bail!("{message}"),
        Severity::Info | Severity::Success => println!("{message}"),
    }
    Ok(())
}
