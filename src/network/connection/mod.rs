//! Per-client connection task.
//!
//! The reader half decodes one [`Request`] per line and passes it to the
//! coordinator. A companion writer task drains the session's outbound queue
//! onto the socket, so a handler can queue lines to its own requester without
//! waiting on the socket.
//!
//! When the reader stops (EOF, transport error, bad input) or the writer
//! fails, every username this connection registered is released, as long as
//! it still belongs to this connection. Lines already queued are then written
//! out before the socket closes, bounded by [`DRAIN_TIMEOUT`].

mod error_handling;

use error_handling::{ReadErrorAction, classify_read_error};

use futures_util::{SinkExt, StreamExt};
use parlor_proto::{ChatCodec, LineCodec, ProtocolError, Request, Target};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use crate::config::ListenConfig;
use crate::handlers::Coordinator;
use crate::state::{SessionHandle, SessionId};

/// Longest wait for the writer to flush queued lines at teardown.
///
/// A fan-out in flight may still hold a clone of this session's handle, so
/// the queue is not guaranteed to close as soon as the reader stops.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// A client connection handler.
pub struct Connection {
    session: SessionId,
    stream: TcpStream,
    addr: SocketAddr,
    coordinator: Arc<Coordinator>,
    max_line_length: usize,
    outbound_queue: usize,
}

impl Connection {
    pub fn new(
        session: SessionId,
        stream: TcpStream,
        addr: SocketAddr,
        coordinator: Arc<Coordinator>,
        config: &ListenConfig,
    ) -> Self {
        Self {
            session,
            stream,
            addr,
            coordinator,
            max_line_length: config.max_line_length,
            outbound_queue: config.outbound_queue,
        }
    }

    /// Serve the client until it disconnects.
    pub async fn run(self) {
        let Self {
            session,
            stream,
            addr,
            coordinator,
            max_line_length,
            outbound_queue,
        } = self;

        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(read_half, ChatCodec::with_max_len(max_line_length));
        let sink = FramedWrite::new(write_half, LineCodec::new());

        let (tx, rx) = mpsc::channel(outbound_queue);
        let handle = SessionHandle::new(session, tx);
        let mut writer = tokio::spawn(write_loop(sink, rx));
        let mut writer_done = false;

        // Names this connection has said hello as.
        let mut usernames: HashSet<String> = HashSet::new();

        loop {
            tokio::select! {
                frame = reader.next() => {
                    let request: Request = match frame {
                        Some(Ok(request)) => request,
                        Some(Err(e)) => {
                            log_read_error(&e);
                            break;
                        }
                        None => {
                            info!("Client closed connection");
                            break;
                        }
                    };

                    let hello = (request.target == Target::Hello).then(|| request.username.clone());
                    if let Err(e) = coordinator.dispatch(&handle, addr, request).await {
                        warn!(error = %e, "Request failed; closing connection");
                        break;
                    }
                    if let Some(username) = hello {
                        usernames.insert(username);
                    }
                }
                result = &mut writer => {
                    writer_done = true;
                    match result {
                        Ok(Ok(())) => debug!("Outbound queue closed"),
                        Ok(Err(e)) => info!(error = %e, "Write failed"),
                        Err(e) => warn!(error = %e, "Writer task ended abnormally"),
                    }
                    break;
                }
            }
        }

        let registry = coordinator.registry();
        for username in &usernames {
            registry.unregister_session(username, session);
        }
        drop(handle);
        if !writer_done {
            drain_writer(&mut writer).await;
        }

        info!(released = usernames.len(), "Connection closed");
    }
}

/// Write queued lines to the socket, flushing after each.
async fn write_loop(
    mut sink: FramedWrite<OwnedWriteHalf, LineCodec>,
    mut rx: mpsc::Receiver<String>,
) -> Result<(), ProtocolError> {
    while let Some(line) = rx.recv().await {
        sink.send(line).await?;
    }
    Ok(())
}

/// Let the writer flush what is queued once every handle is gone.
async fn drain_writer(writer: &mut JoinHandle<Result<(), ProtocolError>>) {
    match tokio::time::timeout(DRAIN_TIMEOUT, &mut *writer).await {
        Ok(Ok(Ok(()))) => debug!("Outbound queue drained"),
        Ok(Ok(Err(e))) => info!(error = %e, "Write failed while draining"),
        Ok(Err(e)) => warn!(error = %e, "Writer task ended abnormally"),
        Err(_) => {
            warn!(
                timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "Outbound queue did not drain; dropping pending lines"
            );
            writer.abort();
        }
    }
}

fn log_read_error(e: &ProtocolError) {
    match classify_read_error(e) {
        ReadErrorAction::IoError => info!(error = %e, "Read failed"),
        ReadErrorAction::FramingError { reason } => {
            warn!(%reason, "Framing error; closing connection");
        }
        ReadErrorAction::MalformedRequest { reason } => {
            warn!(%reason, "Malformed request; closing connection");
        }
    }
}
