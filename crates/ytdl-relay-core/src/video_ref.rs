//! Canonical video references.
//!
//! Every reference, whatever DOM shape it was extracted from, is normalized
//! to `https://www.youtube.com/watch?v=<id>` with an 11-character id.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const SITE_ORIGIN: &str = "https://www.youtube.com";

/// Length of a video id token.
const VIDEO_ID_LEN: usize = 11;

/// True iff `id` matches `^[a-zA-Z0-9_-]{11}$`.
pub fn is_valid_video_id(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Normalized absolute watch URL for a single video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoReference {
    id: String,
}

impl VideoReference {
    pub fn from_id(id: &str) -> Option<Self> {
        is_valid_video_id(id).then(|| Self { id: id.to_string() })
    }

    /// Parses a (possibly relative) href and keeps only its `v` parameter.
    ///
    /// `/watch?v=abcdefghijk&list=PL1&t=42s` becomes
    /// `https://www.youtube.com/watch?v=abcdefghijk`.
    pub fn from_watch_href(href: &str) -> Option<Self> {
        let base = Url::parse(SITE_ORIGIN).ok()?;
        let url = base.join(href.trim()).ok()?;
        let v = url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())?;
        Self::from_id(&v)
    }

    pub fn video_id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/watch?v={}", SITE_ORIGIN, self.id)
    }
}

impl TryFrom<String> for VideoReference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_watch_href(&value)
            .or_else(|| Self::from_id(&value))
            .ok_or_else(|| format!("not a watch URL or video id: {value}"))
    }
}

impl From<VideoReference> for String {
    fn from(value: VideoReference) -> Self {
        value.url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_pattern() {
        assert!(is_valid_video_id("dQw4w9WgXcQ"));
        assert!(is_valid_video_id("a-b_c-d_e-f"));
        assert!(!is_valid_video_id("dQw4w9WgXc"));
        assert!(!is_valid_video_id("dQw4w9WgXcQQ"));
        assert!(!is_valid_video_id("dQw4w9WgX.Q"));
        assert!(!is_valid_video_id(""));
        assert!(!is_valid_video_id("dQw4w9WgXcé"));
    }

    #[test]
    fn watch_hrefs_normalize_with_extra_params_stripped() {
        let cases = [
            "/watch?v=dQw4w9WgXcQ",
            "/watch?v=dQw4w9WgXcQ&list=PLx&index=3",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "watch?v=dQw4w9WgXcQ&pp=ygUE",
        ];
        for href in cases {
            let r = VideoReference::from_watch_href(href).expect(href);
            assert_eq!(r.url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "{href}");
        }
    }

    #[test]
    fn hrefs_without_a_valid_v_are_rejected() {
        assert!(VideoReference::from_watch_href("/shorts/dQw4w9WgXcQ").is_none());
        assert!(VideoReference::from_watch_href("/watch?v=short").is_none());
        assert!(VideoReference::from_watch_href("/watch?list=PLx").is_none());
    }

    #[test]
    fn serde_uses_the_canonical_url() {
        let r = VideoReference::from_id("dQw4w9WgXcQ").unwrap();
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "\"https://www.youtube.com/watch?v=dQw4w9WgXcQ\"");
        let back: VideoReference = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
        assert!(serde_json::from_str::<VideoReference>("\"nope\"").is_err());
    }
}
