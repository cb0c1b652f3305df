//! Development server with live reload support.
//!
//! One listener serves both routes:
//!
//! - `/` - bootstrap page with the current build inlined
//! - `/ws` - WebSocket upgrade into a live [`session`](crate::reload::session)
//!
//! Every accepted connection gets its own thread. An upgraded connection
//! keeps that thread as its session reader.

mod page;
mod request;
mod response;
mod upgrade;


use request::RequestError;

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::ServeConfig;
use crate::reload::poller::ChangePoller;
use crate::{debug, log};

/// Time allowed to receive a request head.
const REQUEST_HEAD_WAIT: Duration = Duration::from_secs(10);

/// Bound server ready to accept connections
pub struct BoundServer {
    listener: TcpListener,
    config: Arc<ServeConfig>,
    poller: Arc<ChangePoller>,
}

/// Bind the listener without starting the accept loop.
pub fn bind_server(config: Arc<ServeConfig>, poller: Arc<ChangePoller>) -> Result<BoundServer> {
    let listener = TcpListener::bind(config.addr)
        .with_context(|| format!("failed to bind {}", config.addr))?;
    let addr = listener.local_addr()?;

    log!("serve"; "http://{} watching {}", addr, poller.source().display());

    Ok(BoundServer {
        listener,
        config,
        poller,
    })
}

impl BoundServer {
    /// Get the bound address.
    #[cfg(test)]
    pub fn addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails (blocking).
    pub fn run(self) -> Result<()> {
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    debug!("serve"; "accept failed: {}", e);
                    continue;
                }
            };

            let config = Arc::clone(&self.config);
            let poller = Arc::clone(&self.poller);
            let spawned = thread::Builder::new()
                .name("http-conn".into())
                .spawn(move || {
                    if let Err(e) = handle_connection(stream, &config, poller) {
                        debug!("serve"; "request error: {:#}", e);
                    }
                });
            if let Err(e) = spawned {
                log!("serve"; "failed to spawn connection thread: {}", e);
            }
        }
        Ok(())
    }
}

/// Route a single connection by its request path.
///
/// The head is peeked so `/ws` can hand the untouched socket to the
/// WebSocket handshake. Every other route consumes the head first.
fn handle_connection(
    mut stream: TcpStream,
    config: &ServeConfig,
    poller: Arc<ChangePoller>,
) -> Result<()> {
    stream.set_read_timeout(Some(REQUEST_HEAD_WAIT))?;
    stream.set_write_timeout(Some(config.timings.write_wait))?;

    let head = match request::peek_head(&stream, REQUEST_HEAD_WAIT) {
        Ok(head) => head,
        Err(RequestError::Closed) => return Ok(()),
        Err(e @ (RequestError::Malformed(_) | RequestError::TooLarge)) => {
            debug!("serve"; "rejected request: {}", e);
            request::discard_buffered(&mut stream)?;
            return response::respond_bad_request(&mut stream);
        }
        Err(e) => return Err(e.into()),
    };

    debug!("serve"; "{} {}", head.method, head.path);

    if head.path == "/ws" {
        return upgrade::serve_ws(stream, &head, poller, config.timings);
    }

    request::consume_head(&mut stream, &head)?;
    match head.path.as_str() {
        "/" => {
            let title = config.source.display().to_string();
            page::serve_home(&mut stream, &head, &poller, &title)
        }
        _ => response::respond_not_found(&mut stream),
    }
}
