//! `ytdl-relay cookies --file <cookies.txt>` – show what would be sent.

use anyhow::Result;
use std::path::Path;
use ytdl_relay_core::cookies::CookieCollector;
use ytdl_relay_core::video_ref::SITE_ORIGIN;

use super::session::{self, CLI_TAB};

pub async fn run_cookies(file: &Path) -> Result<()> {
    let browser = session::browser_for(SITE_ORIGIN, Some(file))?;
    let bundle = CookieCollector::new(browser).collect(CLI_TAB).await?;
    if bundle.is_empty() {
        println!("No YouTube cookies in {}", file.display());
        return Ok(());
    }
    println!("{:<28} {:<18} {:<8} {}", "NAME", "DOMAIN", "PATH", "FLAGS");
    for c in &bundle.cookies {
        let mut flags = Vec::new();
        if c.secure {
            flags.push("secure");
        }
        if c.http_only {
            flags.push("httponly");
        }
        println!("{:<28} {:<18} {:<8} {}", c.name, c.domain, c.path, flags.join(","));
    }
    println!(
        "{} cookies, {} bytes in the cookie string",
        bundle.len(),
        bundle.cookie_string.len()
    );
    Ok(())
}
