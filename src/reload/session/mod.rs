//! Live session for one browser connection.
//!
//! ```text
//!                  +--> reader (this thread): liveness, Ping/Close seen
//! TcpStream --clone+                |
//!                  |             replies
//!                  |                v
//!                  +--> writer (own thread): poll tick -> build -> Text
//!                                            ping tick -> Ping
//!                                            reply     -> Pong/Close
//! ```
//!
//! Only the writer puts bytes on the socket. The reader's view swallows the
//! replies tungstenite generates for Ping and Close; the reader queues them
//! on a channel the writer selects on, so control frames never land inside
//! a data frame. Whichever half exits first shuts the socket down. The
//! reader dropping its end of the channel also stops the writer.

mod reader;
mod state;
mod writer;


use std::fmt;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel;
use tungstenite::WebSocket;
use tungstenite::protocol::{Message, Role, WebSocketConfig};

use crate::debug;
use crate::freshness::ModTime;
use crate::reload::poller::ChangePoller;

use reader::ReadOnly;

pub use state::SessionState;

/// Time allowed to write one message to the client.
pub const WRITE_WAIT: Duration = Duration::from_secs(10);

/// Time allowed between two pongs from the client.
pub const PONG_WAIT: Duration = Duration::from_secs(60);

/// Heartbeat period. Must be less than [`PONG_WAIT`].
pub const PING_PERIOD: Duration = Duration::from_secs(PONG_WAIT.as_secs() * 9 / 10);

/// How often the watched file is polled.
pub const POLL_PERIOD: Duration = Duration::from_millis(200);

/// Largest message accepted from the client.
pub const MAX_MESSAGE_SIZE: usize = 512;

/// Timers and limits of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    pub poll_period: Duration,
    pub ping_period: Duration,
    pub pong_wait: Duration,
    pub write_wait: Duration,
    pub max_message_size: usize,
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            poll_period: POLL_PERIOD,
            ping_period: PING_PERIOD,
            pong_wait: PONG_WAIT,
            write_wait: WRITE_WAIT,
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}

/// Lifecycle of a session, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Active,
    Closing,
    Closed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Closing => "closing",
            Self::Closed => "closed",
        })
    }
}

/// Shuts the socket down when dropped. Safe to hold on both halves.
struct ConnectionGuard(TcpStream);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let _ = self.0.shutdown(Shutdown::Both);
    }
}

/// Limits for frames read from the client.
fn read_config(timings: &SessionTimings) -> WebSocketConfig {
    WebSocketConfig::default()
        .max_message_size(Some(timings.max_message_size))
        .max_frame_size(Some(timings.max_message_size))
}

/// Run a session on an already upgraded connection until it ends.
///
/// Blocks the calling thread (it becomes the reader) and returns once both
/// halves have stopped.
pub fn run(
    ws: WebSocket<TcpStream>,
    last_mod: ModTime,
    poller: Arc<ChangePoller>,
    timings: SessionTimings,
) -> io::Result<()> {
    let stream = ws.get_ref();
    let peer = stream
        .peer_addr()
        .map_or_else(|_| "unknown".to_string(), |a: SocketAddr| a.to_string());
    debug!("ws"; "{} {} (lastMod {})", peer, SessionPhase::Connecting, last_mod);

    let reader_guard = ConnectionGuard(stream.try_clone()?);
    let writer_guard = ConnectionGuard(stream.try_clone()?);
    let reader_ws = WebSocket::from_raw_socket(
        ReadOnly(stream.try_clone()?),
        Role::Server,
        Some(read_config(&timings)),
    );

    let (replies, pending_replies) = channel::bounded::<Message>(16);
    let writer_peer = peer.clone();
    let writer = thread::Builder::new()
        .name("ws-writer".into())
        .spawn(move || {
            let _guard = writer_guard;
            let state = SessionState::new(last_mod);
            let reason = writer::run_writer(ws, state, &poller, &timings, pending_replies);
            debug!("ws"; "{} writer stopped: {}", writer_peer, reason);
        })?;

    debug!("ws"; "{} {}", peer, SessionPhase::Active);
    let reason = reader::run_reader(reader_ws, &timings, &replies);
    debug!("ws"; "{} {}: reader stopped: {}", peer, SessionPhase::Closing, reason);

    drop(replies);
    drop(reader_guard);

    let _ = writer.join();
    debug!("ws"; "{} {}", peer, SessionPhase::Closed);
    Ok(())
}
