//! Per-connection session task.
//!
//! Drives one connection through `Connecting -> Active -> Closing -> Closed`:
//!
//! 1. read the display name and join (roster, then joined announcement)
//! 2. relay every following line until the peer closes, a read fails, the outbound stream
//!    dies or the server shuts down
//! 3. run the close sequence exactly once
//!
//! A second task per connection drains the session's outbound queue to the socket, so a
//! slow peer only ever delays its own queue.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{CloseAction, ConnectionError, OutboundChannel, Session, SessionId, SessionState},
    infrastructure::{LineConnection, LineReader, LineWriter},
    ui::state::AppState,
};

/// How long a writer may keep draining once the server is shutting down
const WRITER_GRACE: Duration = Duration::from_millis(500);

/// Why the relay loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    PeerClosed,
    ReadFailed,
    WriterStopped,
    Shutdown,
}

/// Spawns a task that drains the outbound queue into the socket.
///
/// The task ends when every sender is gone (the session left the registry) or a write
/// fails. Later pushes into the queue then fail and are logged by the broadcaster.
fn pusher_loop<S>(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut writer: LineWriter<S>,
    session_id: SessionId,
) -> JoinHandle<()>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if let Err(e) = writer.write_line(line).await {
                tracing::debug!(%session_id, "Stopped writing to peer: {}", e);
                return;
            }
        }
        if let Err(e) = writer.close().await {
            tracing::debug!(%session_id, "Failed to shut down write half: {}", e);
        }
    })
}

/// Run one connection to completion.
pub async fn handle_connection<S>(
    stream: S,
    peer: SocketAddr,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let mut session = Session::new(SessionId::generate());
    let session_id = session.id();
    tracing::info!(%session_id, %peer, "Connection accepted");

    let (writer, mut reader) =
        LineConnection::with_optional_limit(stream, state.max_line_length).split();
    let (channel, rx) = OutboundChannel::new();
    let mut send_task = pusher_loop(rx, writer, session_id);

    // Connecting -> Active
    let handshake = tokio::select! {
        result = reader.read_line() => result,
        _ = shutdown.cancelled() => Err(ConnectionError::Disconnected(
            "server shutting down".to_string(),
        )),
    };
    match state
        .join_session_usecase
        .execute(session_id, handshake, channel)
        .await
    {
        Ok(name) => {
            tracing::info!(%session_id, "Session '{}' joined", name);
            session.activate(name);
        }
        Err(e) => {
            tracing::info!(%session_id, "Handshake not completed: {}", e);
        }
    }

    let reason = if session.state() == SessionState::Active {
        relay_loop(&mut session, &mut reader, &mut send_task, &state, &shutdown).await
    } else {
        CloseReason::PeerClosed
    };

    close_session(&mut session, reader, send_task, reason, &state, &shutdown).await;
}

/// Active -> Active: forward every line until something ends the session.
async fn relay_loop<S>(
    session: &mut Session,
    reader: &mut LineReader<S>,
    send_task: &mut JoinHandle<()>,
    state: &AppState,
    shutdown: &CancellationToken,
) -> CloseReason
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let session_id = session.id();

    loop {
        tokio::select! {
            line = reader.read_line() => match line {
                Ok(Some(line)) => {
                    if let Some(name) = state.relay_line_usecase.execute(session_id, &line).await {
                        session.rename(name);
                    }
                }
                Ok(None) => {
                    tracing::info!(%session_id, "Peer closed the connection");
                    return CloseReason::PeerClosed;
                }
                Err(ConnectionError::LineTooLong) => {
                    tracing::warn!(%session_id, "Inbound line over the configured limit, closing");
                    return CloseReason::ReadFailed;
                }
                Err(e) => {
                    tracing::warn!(%session_id, "Read failed: {}", e);
                    return CloseReason::ReadFailed;
                }
            },
            _ = &mut *send_task => {
                tracing::info!(%session_id, "Outbound stream closed");
                return CloseReason::WriterStopped;
            }
            _ = shutdown.cancelled() => {
                tracing::info!(%session_id, "Closing session for server shutdown");
                return CloseReason::Shutdown;
            }
        }
    }
}

/// Active/Connecting -> Closed. Runs its cleanup at most once per session.
async fn close_session<S>(
    session: &mut Session,
    reader: LineReader<S>,
    mut send_task: JoinHandle<()>,
    reason: CloseReason,
    state: &AppState,
    shutdown: &CancellationToken,
) {
    let session_id = session.id();

    let action = session.begin_close();
    if action == CloseAction::AlreadyClosed {
        return;
    }

    // Stop reading before anyone learns about the departure.
    drop(reader);

    if action == CloseAction::Deregister {
        if let Some(name) = state.leave_session_usecase.execute(&session_id).await {
            tracing::info!(%session_id, ?reason, "Session '{}' left", name);
        }
    }

    // The registry no longer holds the outbound channel, so the writer drains what is
    // queued and shuts the socket down.
    if reason != CloseReason::WriterStopped {
        tokio::select! {
            biased;
            _ = &mut send_task => {}
            _ = shutdown.cancelled() => {
                if tokio::time::timeout(WRITER_GRACE, &mut send_task).await.is_err() {
                    tracing::debug!(%session_id, "Writer did not drain in time, aborting");
                    send_task.abort();
                }
            }
        }
    }

    session.finish_close();
    tracing::debug!(%session_id, "Session closed");
}
