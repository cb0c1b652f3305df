use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Instant;

use crossbeam::channel::Sender;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::SessionTimings;

/// Socket view for the reader.
///
/// tungstenite answers Ping and Close frames on its own by writing to the
/// stream it reads from. Those writes are swallowed here; the reader
/// forwards the replies to the writer, which owns every outbound byte.
pub(super) struct ReadOnly(pub(super) TcpStream);

impl Read for ReadOnly {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Write for ReadOnly {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read until the connection fails or goes quiet.
///
/// Content is ignored. Only Pongs extend the liveness deadline, so a client
/// that stops answering heartbeats is dropped after `pong_wait`. Pings and
/// Close get their reply queued on `replies`.
pub(super) fn run_reader(
    mut ws: WebSocket<ReadOnly>,
    timings: &SessionTimings,
    replies: &Sender<Message>,
) -> String {
    let mut deadline = Instant::now() + timings.pong_wait;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return "liveness window expired".into();
        }
        if let Err(e) = ws.get_ref().0.set_read_timeout(Some(remaining)) {
            return format!("set read deadline: {e}");
        }

        match ws.read() {
            Ok(Message::Pong(_)) => deadline = Instant::now() + timings.pong_wait,
            Ok(Message::Ping(payload)) => {
                // a full queue means the writer is stuck; that client will
                // hit the write deadline anyway
                let _ = replies.try_send(Message::Pong(payload));
            }
            Ok(Message::Close(_)) => {
                let _ = replies.try_send(Message::Close(None));
                return "closed by client".into();
            }
            Ok(_) => {}
            Err(e) => return format!("read: {e}"),
        }
    }
}
