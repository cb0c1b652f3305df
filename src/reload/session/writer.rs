use std::net::TcpStream;

use crossbeam::channel::{Receiver, select, tick};
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::SessionTimings;
use super::state::SessionState;
use crate::reload::poller::ChangePoller;

/// Push builds, heartbeats and control replies until a send fails or the
/// reader goes away.
///
/// This is the only code that writes to the socket, so frames never
/// interleave. Polls run inline, so a session never has two builds in
/// flight.
pub(super) fn run_writer(
    mut ws: WebSocket<TcpStream>,
    mut state: SessionState,
    poller: &ChangePoller,
    timings: &SessionTimings,
    replies: Receiver<Message>,
) -> String {
    if let Err(e) = ws.get_ref().set_write_timeout(Some(timings.write_wait)) {
        return format!("set write deadline: {e}");
    }

    let poll_tick = tick(timings.poll_period);
    let ping_tick = tick(timings.ping_period);

    loop {
        select! {
            recv(poll_tick) -> _ => {
                let poll = poller.check_and_build(state.last_mod());
                if let Some(text) = state.apply(poll)
                    && let Err(e) = ws.send(Message::Text(text.into()))
                {
                    return format!("send: {e}");
                }
            }
            recv(ping_tick) -> _ => {
                if let Err(e) = ws.send(Message::Ping(Default::default())) {
                    return format!("ping: {e}");
                }
            }
            recv(replies) -> reply => match reply {
                Ok(reply) => {
                    if let Err(e) = ws.send(reply) {
                        return format!("reply: {e}");
                    }
                }
                // the reader dropped its sender
                Err(_) => return "reader stopped".into(),
            },
        }
    }
}
