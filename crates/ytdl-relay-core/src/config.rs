use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Server used when no `serverUrl` has been saved.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// User settings, persisted as `settings.toml` under the XDG config dir.
///
/// Keys keep the names the settings page stores (`serverUrl`,
/// `defaultFormat`); any missing key falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtensionSettings {
    /// Base URL of the download server, e.g. `http://localhost:8080`.
    pub server_url: String,
    /// Preferred format hint. Stored for the settings page; requests send "".
    pub default_format: String,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            default_format: String::new(),
        }
    }
}

impl ExtensionSettings {
    /// Server base URL without a trailing slash; the default if blank.
    pub fn base_url(&self) -> &str {
        let url = self.server_url.trim().trim_end_matches('/');
        if url.is_empty() {
            DEFAULT_SERVER_URL
        } else {
            url
        }
    }
}

/// Checks a server URL typed by the user and returns it trimmed.
pub fn validate_server_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("enter the server URL");
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("server URL must start with http:// or https://");
    }
    Ok(url.to_string())
}

pub fn settings_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ytdl-relay")?;
    Ok(xdg_dirs.place_config_file("settings.toml")?)
}

/// File-backed settings store. Reads go to disk every time so changes made
/// elsewhere (the CLI, another process) are picked up on the next request.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self::open_at(settings_path()?))
    }

    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings; a missing file means defaults.
    pub fn load(&self) -> Result<ExtensionSettings> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ExtensionSettings::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("read settings: {}", self.path.display()))
            }
        };
        let settings: ExtensionSettings = toml::from_str(&data)
            .with_context(|| format!("parse settings: {}", self.path.display()))?;
        Ok(settings)
    }

    /// Like [`load`](Self::load) but never fails: unreadable settings are
    /// logged and replaced by defaults.
    pub fn load_or_default(&self) -> ExtensionSettings {
        self.load().unwrap_or_else(|e| {
            tracing::warn!("using default settings: {:#}", e);
            ExtensionSettings::default()
        })
    }

    pub fn save(&self, settings: &ExtensionSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(settings)?)
            .with_context(|| format!("write settings: {}", self.path.display()))?;
        tracing::info!("saved settings to {}", self.path.display());
        Ok(())
    }

    pub fn set_server_url(&self, url: &str) -> Result<ExtensionSettings> {
        let mut settings = self.load()?;
        settings.server_url = validate_server_url(url)?;
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn set_default_format(&self, format: &str) -> Result<ExtensionSettings> {
        let mut settings = self.load()?;
        settings.default_format = format.trim().to_string();
        self.save(&settings)?;
        Ok(settings)
    }

    /// Clears every stored key; subsequent loads return defaults.
    pub fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("reset settings at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove settings: {}", self.path.display())),
        }
    }
}
