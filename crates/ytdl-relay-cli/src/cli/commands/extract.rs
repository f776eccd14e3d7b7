//! `ytdl-relay extract <href>` – normalize a link to its canonical watch URL.

use anyhow::{Context, Result};
use ytdl_relay_core::video_ref::VideoReference;

pub fn run_extract(href: &str) -> Result<()> {
    let video = VideoReference::from_watch_href(href)
        .or_else(|| VideoReference::from_id(href.trim()))
        .with_context(|| format!("no video id in {href:?}"))?;
    println!("{video}");
    Ok(())
}
