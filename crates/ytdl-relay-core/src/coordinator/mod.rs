//! Download coordinator: one click becomes exactly one POST to the
//! configured download server.
//!
//! Settings are read on every call. Session cookies are collected for the
//! originating tab; if that fails the request goes out with `cookies: null`.
//! The request is bounded (10 minutes by default) and its outcome is
//! classified into [`DownloadError`] variants the page side can present.

mod classify;
mod error;
mod health;
pub mod http;

pub use classify::{classify_curl_error, classify_http_status, classify_reply};
pub use error::{DownloadError, ErrorKind};
pub use health::{HealthMonitor, HEALTH_POLL_INTERVAL};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::browser::TabId;
use crate::config::SettingsStore;
use crate::cookies::CookieCollector;
use crate::video_ref::VideoReference;

/// Upper bound on one download request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Upper bound on one health probe.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
/// Slack for the outer tokio timeout over libcurl's own transfer timeout.
const TIMEOUT_GRACE: Duration = Duration::from_secs(2);

pub const DOWNLOAD_PATH: &str = "/api/download";
pub const HEALTH_PATH: &str = "/api/download/health";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub request_timeout: Duration,
    pub health_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            request_timeout: REQUEST_TIMEOUT,
            health_timeout: HEALTH_TIMEOUT,
        }
    }
}

/// JSON body of `POST /api/download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    pub url: String,
    /// Always empty: the server picks its own directory.
    pub download_directory: String,
    /// Always empty: the server picks its own format.
    pub format: String,
    /// Joined cookie string, or null when cookies could not be collected.
    pub cookies: Option<String>,
}

impl DownloadRequest {
    pub fn new(video: &VideoReference, cookies: Option<String>) -> Self {
        Self {
            url: video.url(),
            download_directory: String::new(),
            format: String::new(),
            cookies,
        }
    }
}

pub struct DownloadCoordinator {
    settings: SettingsStore,
    cookies: CookieCollector,
    limits: Limits,
}

impl DownloadCoordinator {
    pub fn new(settings: SettingsStore, cookies: CookieCollector) -> Self {
        Self {
            settings,
            cookies,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn cookies(&self) -> &CookieCollector {
        &self.cookies
    }

    /// Current server base URL (re-read from settings).
    pub fn server_url(&self) -> String {
        self.settings.load_or_default().base_url().to_string()
    }

    /// Sends `video` to the download server and returns its JSON reply
    /// unmodified.
    pub async fn submit_download(
        &self,
        video: &VideoReference,
        tab_id: TabId,
    ) -> Result<serde_json::Value, DownloadError> {
        let server_url = self.server_url();
        tracing::info!(server_url = %server_url, video = %video, tab_id, "submitting download");

        let cookies = match self.cookies.collect(tab_id).await {
            Ok(bundle) => {
                if bundle.is_empty() {
                    tracing::warn!(
                        "no YouTube cookies found; age-restricted or private videos may fail"
                    );
                } else {
                    tracing::debug!(count = bundle.len(), "retrieved cookies");
                }
                Some(bundle.cookie_string)
            }
            Err(e) => {
                tracing::warn!("could not get YouTube cookies: {}", e);
                None
            }
        };

        let request = DownloadRequest::new(video, cookies);
        tracing::debug!(cookies_provided = request.cookies.is_some(), "download request built");
        let body = serde_json::to_vec(&request).map_err(|e| DownloadError::Internal(e.to_string()))?;

        let endpoint = format!("{}{}", server_url, DOWNLOAD_PATH);
        let limit = self.limits.request_timeout;
        let task = tokio::task::spawn_blocking(move || http::post_json(&endpoint, &body, limit));

        let outcome = match tokio::time::timeout(limit + TIMEOUT_GRACE, task).await {
            Err(_) => Err(DownloadError::TimedOut { after: limit }),
            Ok(Err(join_err)) => Err(DownloadError::Internal(join_err.to_string())),
            Ok(Ok(Err(curl_err))) => Err(classify_curl_error(&curl_err, &server_url, limit)),
            Ok(Ok(Ok(reply))) => {
                tracing::debug!(status = reply.status, "download server replied");
                classify_reply(reply, &server_url)
            }
        };

        match &outcome {
            Ok(_) => tracing::info!(video = %video, "download accepted"),
            Err(e) if e.is_soft() => tracing::warn!(video = %video, "{}", e),
            Err(e) => tracing::error!(video = %video, kind = ?e.kind(), "download failed: {}", e),
        }
        outcome
    }

    /// GET `/api/download/health`; any failure is `false`.
    pub async fn check_server_health(&self) -> bool {
        let url = format!("{}{}", self.server_url(), HEALTH_PATH);
        let limit = self.limits.health_timeout;
        let task = tokio::task::spawn_blocking(move || http::get(&url, limit));
        match tokio::time::timeout(limit + TIMEOUT_GRACE, task).await {
            Ok(Ok(Ok(reply))) if reply.is_success() => true,
            Ok(Ok(Ok(reply))) => {
                tracing::debug!(status = reply.status, "health check: unhealthy status");
                false
            }
            Ok(Ok(Err(e))) => {
                tracing::debug!("health check failed: {}", e);
                false
            }
            Ok(Err(e)) => {
                tracing::debug!("health check task failed: {}", e);
                false
            }
            Err(_) => {
                tracing::debug!("health check timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let video = VideoReference::from_id("dQw4w9WgXcQ").unwrap();
        let json = serde_json::to_value(DownloadRequest::new(&video, None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                "downloadDirectory": "",
                "format": "",
                "cookies": null
            })
        );

        let json = serde_json::to_value(DownloadRequest::new(&video, Some("SID=a".into()))).unwrap();
        assert_eq!(json["cookies"], "SID=a");
    }

    #[test]
    fn default_limits() {
        let l = Limits::default();
        assert_eq!(l.request_timeout, Duration::from_secs(600));
        assert_eq!(l.health_timeout, Duration::from_secs(5));
    }
}
