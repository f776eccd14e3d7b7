//! User-facing messages for download outcomes.

use std::time::Duration;

use crate::coordinator::ErrorKind;
use crate::notify::Severity;
use crate::router::{Response, RouterError};

pub const EXTRACTION_FAILED: &str = "Could not extract the video URL";
pub const PROGRESS_MESSAGE: &str =
    "Sending video for download... The server is processing the request.";
pub const TIMEOUT_ACCEPTED: &str = "Download request accepted by the server!\n\n\
    The server is still processing the video (this can take several minutes). \
    Check the download folder; the file appears there when it is done.";
pub const AUTH_FAILED: &str =
    "Authorization error. Make sure you are signed in to YouTube and reload the page.";

const AUTH_WORDS: [&str; 4] = ["authorized", "auth", "login", "sign in"];

/// Maps the reply to a `DOWNLOAD_VIDEO` request onto a notification.
/// `elapsed` is the time since the request was sent.
pub fn describe(outcome: &Result<Response, RouterError>, elapsed: Duration) -> (String, Severity) {
    let response = match outcome {
        Ok(r) => r,
        Err(e) => return (format!("Extension error: {}", e), Severity::Error),
    };
    if response.success {
        let secs = elapsed.as_secs_f64().round() as u64;
        return (format!("Video sent for download! ({}s)", secs), Severity::Success);
    }

    let error = response.error.as_deref().unwrap_or("Unknown error");
    match response.error_kind {
        Some(ErrorKind::Timeout) => (TIMEOUT_ACCEPTED.to_string(), Severity::Success),
        Some(ErrorKind::Unreachable) => (
            format!(
                "Cannot connect to the yt-dlp server.\n\n{}\n\nCheck the server URL in the settings.",
                error
            ),
            Severity::Error,
        ),
        Some(ErrorKind::NotFound) => (error.to_string(), Severity::Error),
        Some(ErrorKind::Server) => (format!("Download failed: {}", error), Severity::Error),
        _ if is_auth_error(error) => (AUTH_FAILED.to_string(), Severity::Error),
        _ => (format!("Download failed: {}", error), Severity::Error),
    }
}

fn is_auth_error(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    AUTH_WORDS.iter().any(|w| message.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SERVER_URL;
    use crate::coordinator::DownloadError;

    fn failed(e: DownloadError) -> Result<Response, RouterError> {
        Ok(e.into())
    }

    #[test]
    fn success_reports_rounded_seconds() {
        let (msg, sev) = describe(
            &Ok(Response::with_result(serde_json::json!({"status": "ok"}))),
            Duration::from_millis(2600),
        );
        assert_eq!(msg, "Video sent for download! (3s)");
        assert_eq!(sev, Severity::Success);
    }

    #[test]
    fn timeout_is_a_soft_success() {
        let (msg, sev) = describe(
            &failed(DownloadError::TimedOut {
                after: Duration::from_secs(600),
            }),
            Duration::from_secs(600),
        );
        assert_eq!(sev, Severity::Success);
        assert_eq!(msg, TIMEOUT_ACCEPTED);
    }

    #[test]
    fn unreachable_names_the_server() {
        let (msg, sev) = describe(
            &failed(DownloadError::Unreachable {
                server_url: DEFAULT_SERVER_URL.to_string(),
                detail: "Couldn't connect to server".into(),
            }),
            Duration::ZERO,
        );
        assert_eq!(sev, Severity::Error);
        assert!(msg.contains("http://localhost:8080"), "{msg}");
    }

    #[test]
    fn server_body_is_shown_verbatim() {
        let (msg, sev) = describe(
            &failed(DownloadError::Server {
                status: 500,
                body: "disk full".into(),
            }),
            Duration::ZERO,
        );
        assert_eq!(sev, Severity::Error);
        assert_eq!(msg, "Download failed: server error: disk full");
    }

    #[test]
    fn auth_errors_ask_to_sign_in() {
        let (msg, _) = describe(
            &failed(DownloadError::Http {
                status: 403,
                body: "Sign in to confirm your age; login required".into(),
            }),
            Duration::ZERO,
        );
        assert_eq!(msg, AUTH_FAILED);
    }

    #[test]
    fn server_bodies_mentioning_auth_stay_verbatim() {
        let (msg, _) = describe(
            &failed(DownloadError::Server {
                status: 500,
                body: "OAuth token refresh failed for author channel".into(),
            }),
            Duration::ZERO,
        );
        assert_eq!(
            msg,
            "Download failed: server error: OAuth token refresh failed for author channel"
        );
    }

    #[test]
    fn router_failures_are_extension_errors() {
        let (msg, sev) = describe(&Err(RouterError::Disconnected), Duration::ZERO);
        assert_eq!(sev, Severity::Error);
        assert!(msg.starts_with("Extension error: "));
    }

    #[test]
    fn unknown_failures_fall_through() {
        let (msg, _) = describe(&Ok(Response::default()), Duration::ZERO);
        assert_eq!(msg, "Download failed: Unknown error");
    }
}
