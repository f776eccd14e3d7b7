//! Netscape `cookies.txt` import (the format browser exporters and yt-dlp use).
//!
//! Seven tab-separated fields per line: domain, include-subdomains flag,
//! path, secure flag, expiry (unix seconds, 0 = session), name, value.
//! `#HttpOnly_` before the domain marks an HttpOnly cookie; other `#` lines
//! are comments.

use anyhow::{Context, Result};
use std::path::Path;

use super::RawCookie;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

pub fn read_cookie_file(path: &Path) -> Result<Vec<RawCookie>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read cookie file: {}", path.display()))?;
    Ok(parse_cookie_file(&data))
}

/// Parses file contents, skipping blank, comment, and malformed lines.
pub fn parse_cookie_file(data: &str) -> Vec<RawCookie> {
    let mut cookies = Vec::new();
    for (lineno, line) in data.lines().enumerate() {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None if line.starts_with('#') => continue,
            None => (line, false),
        };
        match parse_line(line, http_only) {
            Some(c) => cookies.push(c),
            None => tracing::debug!(line = lineno + 1, "skipping malformed cookie line"),
        }
    }
    cookies
}

fn parse_line(line: &str, http_only: bool) -> Option<RawCookie> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 7 {
        return None;
    }
    let expiry: i64 = fields[4].trim().parse().ok()?;
    Some(RawCookie {
        name: fields[5].to_string(),
        value: fields[6].to_string(),
        domain: fields[0].trim().to_string(),
        path: fields[2].trim().to_string(),
        secure: fields[3].trim().eq_ignore_ascii_case("TRUE"),
        http_only,
        expiration_date: (expiry > 0).then_some(expiry),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "# Netscape HTTP Cookie File\n\
# This is a generated file! Do not edit.\n\
\n\
.youtube.com\tTRUE\t/\tTRUE\t1767225600\tPREF\tf6=40000000&hl=en\n\
#HttpOnly_.youtube.com\tTRUE\t/\tTRUE\t1767225600\tSID\tg.a000abc\n\
www.youtube.com\tFALSE\t/\tFALSE\t0\tYSC\txyz\n\
broken line without tabs\n";

    #[test]
    fn parses_regular_http_only_and_session_cookies() {
        let cookies = parse_cookie_file(SAMPLE);
        assert_eq!(cookies.len(), 3);

        assert_eq!(cookies[0].name, "PREF");
        assert_eq!(cookies[0].value, "f6=40000000&hl=en");
        assert!(cookies[0].secure);
        assert!(!cookies[0].http_only);
        assert_eq!(cookies[0].expiration_date, Some(1767225600));

        assert_eq!(cookies[1].name, "SID");
        assert_eq!(cookies[1].domain, ".youtube.com");
        assert!(cookies[1].http_only);

        assert_eq!(cookies[2].domain, "www.youtube.com");
        assert_eq!(cookies[2].expiration_date, None);
    }

    #[test]
    fn reads_from_disk() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();
        f.flush().unwrap();
        assert_eq!(read_cookie_file(f.path()).unwrap().len(), 3);
        assert!(read_cookie_file(Path::new("/nonexistent/cookies.txt")).is_err());
    }

    #[test]
    fn crlf_lines_are_accepted() {
        let cookies = parse_cookie_file("www.youtube.com\tFALSE\t/\tFALSE\t0\tYSC\txyz\r\n");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value, "xyz");
    }
}
