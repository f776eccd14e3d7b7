//! Map curl errors and HTTP replies onto [`DownloadError`].

use std::time::Duration;

use super::error::DownloadError;
use super::http::HttpReply;

/// Classify a transport-level curl failure.
pub fn classify_curl_error(e: &curl::Error, server_url: &str, limit: Duration) -> DownloadError {
    if e.is_operation_timedout() {
        return DownloadError::TimedOut { after: limit };
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return DownloadError::InvalidServerUrl {
            server_url: server_url.to_string(),
            detail: e.description().to_string(),
        };
    }
    // Connection-level failures and anything else libcurl reports before a
    // status line arrives are all "cannot reach server".
    DownloadError::Unreachable {
        server_url: server_url.to_string(),
        detail: e.description().to_string(),
    }
}

/// Classify an HTTP status for non-2xx replies.
pub fn classify_http_status(status: u32, body: String, server_url: &str) -> DownloadError {
    match status {
        404 => DownloadError::NotFound {
            server_url: server_url.to_string(),
        },
        500.. => DownloadError::Server { status, body },
        _ => DownloadError::Http { status, body },
    }
}

/// Turns a completed exchange into the server payload or an error.
pub fn classify_reply(reply: HttpReply, server_url: &str) -> Result<serde_json::Value, DownloadError> {
    if !reply.is_success() {
        let body = reply.body_text();
        tracing::debug!(status = reply.status, body = %body, "server error response");
        return Err(classify_http_status(reply.status, body, server_url));
    }
    serde_json::from_slice(&reply.body).map_err(|e| {
        DownloadError::MalformedResponse(format!("{} (body: {:?})", e, truncate(&reply.body_text(), 200)))
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
