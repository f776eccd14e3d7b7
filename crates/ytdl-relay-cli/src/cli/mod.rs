//! CLI for ytdl-relay: send videos to a local yt-dlp download server.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use ytdl_relay_core::config::SettingsStore;

use commands::{run_config, run_cookies, run_extract, run_health, run_monitor, run_submit};

#[derive(Debug, Parser)]
#[command(name = "ytdl-relay")]
#[command(about = "Relay YouTube videos and session cookies to a local yt-dlp server", long_about = None)]
pub struct Cli {
    /// Settings file to use instead of the XDG default.
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Check whether the download server answers its health endpoint.
    Health,

    /// Send a video to the download server.
    Submit {
        /// Watch URL or link (relative links are resolved against youtube.com).
        url: String,
        /// Netscape cookies.txt to take session cookies from.
        #[arg(long, value_name = "FILE")]
        cookies: Option<PathBuf>,
        /// Give up waiting after this many seconds (default 600).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Print the canonical watch URL for a link.
    Extract {
        /// Link as found on the page, e.g. `/watch?v=...&t=42s`.
        href: String,
    },

    /// Show the cookie bundle that would be sent with a download.
    Cookies {
        /// Netscape cookies.txt to read.
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Probe the server periodically and print when its health changes.
    Monitor {
        /// Seconds between probes.
        #[arg(long, default_value = "30", value_name = "SECS")]
        interval: u64,
    },

    /// Show or change settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the current settings.
    Show,
    /// Set the download server base URL.
    SetServer { url: String },
    /// Set the preferred format hint.
    SetFormat { format: String },
    /// Clear all stored settings.
    Reset,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let store = match &cli.settings {
            Some(path) => SettingsStore::open_at(path),
            None => SettingsStore::open_default()?,
        };
        tracing::debug!("settings file: {}", store.path().display());

        match cli.command {
            CliCommand::Health => run_health(store).await?,
            CliCommand::Submit {
                url,
                cookies,
                timeout,
            } => run_submit(store, &url, cookies.as_deref(), timeout).await?,
            CliCommand::Extract { href } => run_extract(&href)?,
            CliCommand::Cookies { file } => run_cookies(&file).await?,
            CliCommand::Monitor { interval } => run_monitor(store, interval).await?,
            CliCommand::Config { action } => run_config(&store, action)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
