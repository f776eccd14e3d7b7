//! Message shapes exchanged between the page and the background side.

use serde::{Deserialize, Serialize};

use crate::browser::TabId;
use crate::coordinator::{DownloadError, ErrorKind};
use crate::cookies::CookieBundle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    /// Relay a watch URL to the download server. Cookies come from `tab_id`,
    /// or from the sending tab when absent.
    #[serde(rename_all = "camelCase")]
    DownloadVideo {
        video_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tab_id: Option<TabId>,
    },
    CheckServer,
    #[serde(rename_all = "camelCase")]
    GetCookies {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tab_id: Option<TabId>,
    },
    GetCurrentTabId,
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::DownloadVideo { .. } => "DOWNLOAD_VIDEO",
            Request::CheckServer => "CHECK_SERVER",
            Request::GetCookies { .. } => "GET_COOKIES",
            Request::GetCurrentTabId => "GET_CURRENT_TAB_ID",
        }
    }
}

/// Reply to any [`Request`]. Only the fields relevant to the request kind
/// are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<CookieBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn with_result(result: serde_json::Value) -> Self {
        Self {
            result: Some(result),
            ..Self::ok()
        }
    }

    pub fn with_cookies(cookies: CookieBundle) -> Self {
        Self {
            cookies: Some(cookies),
            ..Self::ok()
        }
    }

    pub fn with_tab_id(tab_id: TabId) -> Self {
        Self {
            tab_id: Some(tab_id),
            ..Self::ok()
        }
    }

    pub fn failure(error: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            error_kind: Some(kind),
            ..Self::default()
        }
    }
}

impl From<DownloadError> for Response {
    fn from(e: DownloadError) -> Self {
        Response::failure(e.to_string(), e.kind())
    }
}
