//! HTTP response writers.

use std::io::Write;

use anyhow::Result;
use tungstenite::http::StatusCode;

use crate::utils::mime::types::{HTML, PLAIN};

/// Respond with an HTML page.
pub fn respond_html<W: Write>(out: &mut W, body: String) -> Result<()> {
    send_body(out, StatusCode::OK, HTML, &[], body.as_bytes())
}

pub fn respond_not_found<W: Write>(out: &mut W) -> Result<()> {
    respond_status(out, StatusCode::NOT_FOUND)
}

pub fn respond_method_not_allowed<W: Write>(out: &mut W) -> Result<()> {
    respond_status(out, StatusCode::METHOD_NOT_ALLOWED)
}

pub fn respond_bad_request<W: Write>(out: &mut W) -> Result<()> {
    respond_status(out, StatusCode::BAD_REQUEST)
}

/// Reject a handshake for a protocol version other than 13.
pub fn respond_unsupported_version<W: Write>(out: &mut W) -> Result<()> {
    let status = StatusCode::BAD_REQUEST;
    let body = status_line(status);
    send_body(
        out,
        status,
        PLAIN,
        &[("Sec-WebSocket-Version", "13")],
        body.as_bytes(),
    )
}

/// Plain-text body with the canonical reason, e.g. `404 Not Found`.
pub fn respond_status<W: Write>(out: &mut W, status: StatusCode) -> Result<()> {
    let body = status_line(status);
    send_body(out, status, PLAIN, &[], body.as_bytes())
}

fn status_line(status: StatusCode) -> String {
    format!("{} {}", status.as_u16(), reason(status))
}

fn send_body<W: Write>(
    out: &mut W,
    status: StatusCode,
    content_type: &'static str,
    extra_headers: &[(&str, &str)],
    body: &[u8],
) -> Result<()> {
    let mut head = format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: {content_type}\r\n\
         Content-Length: {}\r\n\
         Cache-Control: no-store\r\n\
         Connection: close\r\n",
        status_line(status),
        body.len(),
    );
    for (name, value) in extra_headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str("\r\n");

    out.write_all(head.as_bytes())?;
    out.write_all(body)?;
    out.flush()?;
    Ok(())
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_html_response() {
        let text = render(|out| respond_html(out, "<p>hi</p>".into()));
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(text.contains("Content-Length: 9\r\n"));
        assert!(text.ends_with("\r\n\r\n<p>hi</p>"));
    }

    #[test]
    fn test_status_responses() {
        let text = render(respond_not_found);
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.ends_with("404 Not Found"));

        let text = render(respond_method_not_allowed);
        assert!(text.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));

        let text = render(respond_bad_request);
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn test_unsupported_version() {
        let text = render(respond_unsupported_version);
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("\r\nSec-WebSocket-Version: 13\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\n400 Bad Request"));
    }
}
