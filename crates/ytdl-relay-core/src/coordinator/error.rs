use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coarse failure category carried across the router as `errorKind`, so the
/// page side can pick a message without parsing error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unreachable,
    Timeout,
    NotFound,
    Server,
    Http,
    MalformedResponse,
    InvalidRequest,
    Cookies,
    NoActiveTab,
    Internal,
}

/// Every way a download submission can fail. Exactly one of these (or the
/// server payload) reaches the caller per request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    #[error(
        "Cannot connect to the download server. Make sure it is running at {server_url} \
         and not blocked by a firewall ({detail})"
    )]
    Unreachable { server_url: String, detail: String },

    #[error(
        "The server did not respond within {}. This is normal for large videos; \
         check the download folder, the file may already be there",
        humanize(.after)
    )]
    TimedOut { after: Duration },

    #[error("Server not found at {server_url}. Check the server URL in the settings")]
    NotFound { server_url: String },

    #[error("server error: {body}")]
    Server { status: u32, body: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u32, body: String },

    #[error("server returned a non-JSON response: {0}")]
    MalformedResponse(String),

    #[error("invalid server URL {server_url}: {detail}")]
    InvalidServerUrl { server_url: String, detail: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::Unreachable { .. } | DownloadError::InvalidServerUrl { .. } => {
                ErrorKind::Unreachable
            }
            DownloadError::TimedOut { .. } => ErrorKind::Timeout,
            DownloadError::NotFound { .. } => ErrorKind::NotFound,
            DownloadError::Server { .. } => ErrorKind::Server,
            DownloadError::Http { .. } => ErrorKind::Http,
            DownloadError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            DownloadError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Soft outcome: the server may still finish the job.
    pub fn is_soft(&self) -> bool {
        matches!(self, DownloadError::TimedOut { .. })
    }
}

fn humanize(d: &Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let mins = secs / 60;
        format!("{} minute{}", mins, if mins == 1 { "" } else { "s" })
    } else if secs >= 1 {
        format!("{} second{}", secs, if secs == 1 { "" } else { "s" })
    } else {
        format!("{} ms", d.as_millis())
    }
}
