//! WebSocket handshake for `/ws`.

use std::net::TcpStream;
use std::sync::Arc;

use anyhow::Result;
use tungstenite::error::ProtocolError;
use tungstenite::handshake::HandshakeError;
use tungstenite::http::StatusCode;

use super::request::RequestHead;
use super::response;
use crate::debug;
use crate::reload::poller::ChangePoller;
use crate::reload::session::{self, SessionTimings};

/// How a failed handshake is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Status(StatusCode),
    /// 400 advertising the one protocol version served
    UnsupportedVersion,
}

fn rejection(err: &tungstenite::Error) -> Option<Rejection> {
    match err {
        tungstenite::Error::Protocol(ProtocolError::WrongHttpMethod) => {
            Some(Rejection::Status(StatusCode::METHOD_NOT_ALLOWED))
        }
        tungstenite::Error::Protocol(ProtocolError::MissingSecWebSocketVersionHeader) => {
            Some(Rejection::UnsupportedVersion)
        }
        // nobody left to answer
        tungstenite::Error::Io(_) | tungstenite::Error::ConnectionClosed => None,
        _ => Some(Rejection::Status(StatusCode::BAD_REQUEST)),
    }
}

/// Complete the handshake and run the session on this thread.
///
/// `head` is the peeked request; the handshake reads it off the socket
/// itself. Failures are answered on a second handle, since tungstenite
/// leaves writing error responses to the caller.
pub fn serve_ws(
    stream: TcpStream,
    head: &RequestHead,
    poller: Arc<ChangePoller>,
    timings: SessionTimings,
) -> Result<()> {
    let mut reply = stream.try_clone()?;

    let ws = match tungstenite::accept_with_config(stream, None) {
        Ok(ws) => ws,
        Err(HandshakeError::Failure(e)) => {
            debug!("ws"; "bad handshake: {}", e);
            return match rejection(&e) {
                Some(Rejection::Status(status)) => response::respond_status(&mut reply, status),
                Some(Rejection::UnsupportedVersion) => {
                    response::respond_unsupported_version(&mut reply)
                }
                None => Ok(()),
            };
        }
        Err(HandshakeError::Interrupted(_)) => {
            debug!("ws"; "handshake timed out");
            return Ok(());
        }
    };

    // the head read timeout no longer applies; the session sets its own
    ws.get_ref().set_read_timeout(None)?;

    session::run(ws, head.last_mod(), poller, timings)?;
    Ok(())
}
