//! Blocking libcurl requests to the download server.
//!
//! Both calls run on the current thread; the coordinator wraps them in
//! `spawn_blocking`. The transfer timeout aborts the transfer in place, so a
//! timed-out request does not outlive its bound.

use std::time::Duration;

/// Status and raw body of a completed HTTP exchange (any status).
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// POSTs a JSON body and collects the reply.
pub fn post_json(url: &str, body: &[u8], limit: Duration) -> Result<HttpReply, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.post(true)?;
    easy.post_fields_copy(body)?;
    easy.connect_timeout(limit)?;
    easy.timeout(limit)?;

    let mut headers = curl::easy::List::new();
    headers.append("Content-Type: application/json")?;
    headers.append("Accept: application/json")?;
    // No 100-continue round trip for small JSON bodies.
    headers.append("Expect:")?;
    easy.http_headers(headers)?;

    perform(&mut easy)
}

/// GETs `url`, accepting JSON.
pub fn get(url: &str, limit: Duration) -> Result<HttpReply, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.connect_timeout(limit)?;
    easy.timeout(limit)?;

    let mut headers = curl::easy::List::new();
    headers.append("Accept: application/json")?;
    easy.http_headers(headers)?;

    perform(&mut easy)
}

fn perform(easy: &mut curl::easy::Easy) -> Result<HttpReply, curl::Error> {
    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    let status = easy.response_code()?;
    Ok(HttpReply { status, body })
}
