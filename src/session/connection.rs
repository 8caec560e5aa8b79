//! Per-connection task.
//!
//! The transport is any text `Stream` in and `Sink` of frames out, so a
//! WebSocket adapter, a TCP line codec or an in-memory channel all plug in
//! the same way. Two loops run joined:
//!
//! - read: handles frames as they arrive; closes after `idle_timeout`
//!   without one
//! - write: forwards queued frames, pinging every `keepalive_interval`
//!
//! Whichever loop finishes first ends the connection. Eviction by the
//! session ends it too, even while the write loop is stuck on a stalled
//! sink. Every path runs the same detach-and-announce cleanup.

use std::sync::Arc;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::{interval_at, timeout, Instant};
use tracing::{debug, warn};

use crate::core::error::RoomError;

use super::hub::{Attachment, Hub};
use super::message::{Frame, ServerMessage};
use super::registry::RoomId;

/// Why a connection ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disconnect {
    /// The client closed its stream.
    Closed,
    /// No inbound frame within the idle timeout.
    IdleTimeout,
    /// The outbound sink failed.
    WriteFailed,
    /// The session evicted the connection for falling behind.
    Evicted,
}

/// Serve one connection to `room` until it ends.
pub async fn serve_connection<I, O>(
    hub: Arc<Hub>,
    room: RoomId,
    mut inbound: I,
    mut outbound: O,
) -> Result<Disconnect, RoomError>
where
    I: Stream<Item = String> + Unpin,
    O: Sink<Frame> + Unpin,
{
    let Attachment { session, conn, outbound: mut queue, mut evicted } = hub.connect(room)?;
    let idle = hub.config().idle_timeout;
    let keepalive = hub.config().keepalive_interval;

    let read = async {
        loop {
            match timeout(idle, inbound.next()).await {
                Err(_) => {
                    warn!(%room, %conn, "idle timeout");
                    return Disconnect::IdleTimeout;
                }
                Ok(None) => return Disconnect::Closed,
                Ok(Some(text)) => {
                    if let Err(err) = hub.handle_frame(&session, conn, &text) {
                        warn!(%room, %conn, %err, "bad frame");
                        session.send_to(conn, &ServerMessage::error(err));
                    }
                }
            }
        }
    };

    let write = async {
        let ping = match ServerMessage::Ping.encode() {
            Ok(frame) => frame,
            Err(_) => return Disconnect::WriteFailed,
        };
        let mut ticker = interval_at(Instant::now() + keepalive, keepalive);
        loop {
            let frame = tokio::select! {
                queued = queue.recv() => match queued {
                    Some(frame) => frame,
                    None => return Disconnect::WriteFailed,
                },
                _ = ticker.tick() => ping.clone(),
            };
            if outbound.send(frame).await.is_err() {
                return Disconnect::WriteFailed;
            }
        }
    };

    let reason = tokio::select! {
        biased;
        _ = &mut evicted => Disconnect::Evicted,
        reason = read => reason,
        reason = write => reason,
    };

    hub.disconnect(&session, conn);
    debug!(%room, %conn, ?reason, "connection closed");
    Ok(reason)
}
