//! Request head inspection for routing.
//!
//! The head is peeked, not read, so a WebSocket handshake can still consume
//! it from the socket. Other routes discard it with [`consume_head`].

use std::io::{self, Read};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::freshness::ModTime;

/// Largest request head accepted.
const MAX_HEAD_SIZE: usize = 8 * 1024;

/// Most headers accepted in one request.
const MAX_HEADERS: usize = 64;

/// Pause between peeks while a head is still partial.
const PEEK_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("connection closed before request head")]
    Closed,

    #[error("request head larger than {MAX_HEAD_SIZE} bytes")]
    TooLarge,

    #[error("request head incomplete after {0:?}")]
    Timeout(Duration),

    #[error("malformed request: {0}")]
    Malformed(#[from] httparse::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Parsed request line and headers.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Size of the head on the wire, including the blank line.
    pub len: usize,
}

impl RequestHead {
    /// First header named `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First query parameter named `key`, percent-decoded.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// The `lastMod` the client already has. Absent or unparsable is zero.
    pub fn last_mod(&self) -> ModTime {
        self.query_param("lastMod")
            .and_then(|v| ModTime::from_hex(&v))
            .unwrap_or(ModTime::ZERO)
    }
}

/// Wait until a full request head is buffered and parse it without
/// consuming anything.
///
/// `peek` returns at once while any data is buffered, so a partial head is
/// re-peeked at [`PEEK_INTERVAL`] until it completes or `wait` runs out.
pub fn peek_head(stream: &TcpStream, wait: Duration) -> Result<RequestHead, RequestError> {
    let deadline = Instant::now() + wait;
    let mut buf = vec![0u8; MAX_HEAD_SIZE + 1];
    let mut seen = 0;

    loop {
        let n = stream.peek(&mut buf)?;
        if n == 0 {
            return Err(RequestError::Closed);
        }

        if n > seen {
            seen = n;
            if let Some(head) = parse_head(&buf[..n])? {
                return Ok(head);
            }
            if n > MAX_HEAD_SIZE {
                return Err(RequestError::TooLarge);
            }
        }

        if Instant::now() >= deadline {
            return Err(RequestError::Timeout(wait));
        }
        thread::sleep(PEEK_INTERVAL);
    }
}

/// Drop a peeked head from the socket before answering.
///
/// Closing with unread bytes makes the kernel reset the connection, which
/// can destroy the response before the client reads it.
pub fn consume_head(stream: &mut TcpStream, head: &RequestHead) -> io::Result<()> {
    io::copy(&mut stream.take(head.len as u64), &mut io::sink())?;
    Ok(())
}

/// Drop whatever part of a rejected head is buffered, for the same reason
/// as [`consume_head`]. Returns the number of bytes dropped.
pub fn discard_buffered(stream: &mut TcpStream) -> io::Result<usize> {
    let mut buf = vec![0u8; MAX_HEAD_SIZE + 1];
    stream.read(&mut buf)
}

fn parse_head(buf: &[u8]) -> Result<Option<RequestHead>, RequestError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);

    let len = match req.parse(buf)? {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial => return Ok(None),
    };

    let target = req.path.unwrap_or("/");
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (target.to_string(), None),
    };

    Ok(Some(RequestHead {
        method: req.method.unwrap_or_default().to_string(),
        path,
        query,
        headers: req
            .headers
            .iter()
            .map(|h| {
                (
                    h.name.to_string(),
                    String::from_utf8_lossy(h.value).trim().to_string(),
                )
            })
            .collect(),
        len,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;

    fn parse(raw: &str) -> RequestHead {
        parse_head(raw.as_bytes()).unwrap().unwrap()
    }

    /// Connected (server, client) socket pair on loopback.
    fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (server, client)
    }

    #[test]
    fn test_path_and_query() {
        let raw = "GET /ws?lastMod=1a&x=2 HTTP/1.1\r\nHost: localhost:8080\r\n\r\n";
        let head = parse(raw);
        assert_eq!(head.method, "GET");
        assert_eq!(head.path, "/ws");
        assert_eq!(head.query.as_deref(), Some("lastMod=1a&x=2"));
        assert_eq!(head.header("host"), Some("localhost:8080"));
        assert_eq!(head.last_mod(), ModTime::from_nanos(0x1a));
        assert_eq!(head.len, raw.len());
    }

    #[test]
    fn test_last_mod_defaults_to_zero() {
        let missing = parse("GET /ws HTTP/1.1\r\n\r\n");
        assert_eq!(missing.last_mod(), ModTime::ZERO);

        let garbage = parse("GET /ws?lastMod=zz HTTP/1.1\r\n\r\n");
        assert_eq!(garbage.last_mod(), ModTime::ZERO);
    }

    #[test]
    fn test_len_excludes_trailing_bytes() {
        let head = parse("GET / HTTP/1.1\r\n\r\nextra");
        assert_eq!(head.len, "GET / HTTP/1.1\r\n\r\n".len());
    }

    #[test]
    fn test_partial_head() {
        assert!(parse_head(b"GET / HTTP/1.1\r\n").unwrap().is_none());
    }

    #[test]
    fn test_malformed() {
        let err = parse_head(b"\x01\x02 nonsense\r\n\r\n").unwrap_err();
        assert!(matches!(err, RequestError::Malformed(_)));
    }

    #[test]
    fn test_peek_leaves_head_in_socket() {
        let (mut server, mut client) = socket_pair();
        let raw = b"GET /ws HTTP/1.1\r\nHost: x\r\n\r\n";
        client.write_all(raw).unwrap();

        let head = peek_head(&server, Duration::from_secs(2)).unwrap();
        assert_eq!(head.path, "/ws");

        let mut again = vec![0u8; raw.len()];
        server.read_exact(&mut again).unwrap();
        assert_eq!(again, raw);
    }

    #[test]
    fn test_peek_split_head() {
        let (server, mut client) = socket_pair();
        let writer = thread::spawn(move || {
            for part in [&b"GET /a HT"[..], b"TP/1.1\r\nHost: x\r\n", b"\r\n"] {
                client.write_all(part).unwrap();
                thread::sleep(Duration::from_millis(30));
            }
            client
        });

        let head = peek_head(&server, Duration::from_secs(2)).unwrap();
        assert_eq!(head.path, "/a");
        writer.join().unwrap();
    }

    #[test]
    fn test_peek_times_out_on_stalled_head() {
        let (server, mut client) = socket_pair();
        client.write_all(b"GET / HTTP/1.1\r\n").unwrap();

        let err = peek_head(&server, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, RequestError::Timeout(_)));
    }

    #[test]
    fn test_peek_closed_early() {
        let (server, client) = socket_pair();
        drop(client);
        let err = peek_head(&server, Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, RequestError::Closed));
    }

    #[test]
    fn test_peek_oversized_head() {
        let (server, mut client) = socket_pair();
        let raw = format!("GET / HTTP/1.1\r\nX-Big: {}\r\n", "a".repeat(MAX_HEAD_SIZE + 10));
        let writer = thread::spawn(move || {
            client.write_all(raw.as_bytes()).unwrap();
            client
        });

        let err = peek_head(&server, Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, RequestError::TooLarge));
        writer.join().unwrap();
    }

    #[test]
    fn test_consume_head_keeps_body() {
        let (mut server, mut client) = socket_pair();
        client.write_all(b"POST / HTTP/1.1\r\n\r\nbody").unwrap();

        let head = peek_head(&server, Duration::from_secs(2)).unwrap();
        consume_head(&mut server, &head).unwrap();

        let mut rest = [0u8; 4];
        server.read_exact(&mut rest).unwrap();
        assert_eq!(&rest, b"body");
    }
}
