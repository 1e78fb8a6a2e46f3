//! Coordinator-side seats bound to one peer connection each.

use crate::protocol::ServerMessage;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strictly_tictactoe::Mark;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Lines buffered per peer before the reader stops pulling from the socket.
const LINE_BUFFER: usize = 16;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Connection lifecycle of a slot.
///
/// `Disconnected → Handshaking → Acknowledged → Playing → Disconnected`
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SlotState {
    /// No usable connection.
    Disconnected,
    /// Assignment sent, waiting for the acknowledgment.
    Handshaking,
    /// Acknowledgment received.
    Acknowledged,
    /// Taking part in the game.
    Playing,
}

/// Result of a non-blocking input check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PeerInput {
    /// A complete line is available.
    Line(String),
    /// Nothing buffered yet.
    Idle,
    /// The stream hit EOF or an I/O error, or there is no connection.
    Closed,
}

/// Live connection: a writer plus the receiving end of a reader task.
#[derive(Debug)]
struct PeerLink {
    addr: SocketAddr,
    writer: OwnedWriteHalf,
    lines: mpsc::Receiver<String>,
    reader: JoinHandle<()>,
}

impl PeerLink {
    fn spawn(stream: TcpStream, addr: SocketAddr) -> Self {
        let (read_half, writer) = stream.into_split();
        let (tx, lines) = mpsc::channel(LINE_BUFFER);
        let reader = tokio::spawn(read_lines(read_half, tx, addr));
        Self {
            addr,
            writer,
            lines,
            reader,
        }
    }
}

impl Drop for PeerLink {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Forwards every line from the peer until EOF or error. A full buffer
/// stops reading, so the peer sees TCP backpressure.
async fn read_lines(read_half: OwnedReadHalf, tx: mpsc::Sender<String>, addr: SocketAddr) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => {
                debug!(%addr, "Peer closed the stream");
                break;
            }
            Err(e) => {
                debug!(%addr, error = %e, "Read failed");
                break;
            }
        }
    }
}

/// A seat for one mark.
#[derive(Debug)]
pub(crate) struct Slot {
    mark: Mark,
    state: SlotState,
    link: Option<PeerLink>,
    connected: Arc<AtomicBool>,
}

impl Slot {
    pub(crate) fn new(mark: Mark) -> Self {
        Self {
            mark,
            state: SlotState::Disconnected,
            link: None,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn mark(&self) -> Mark {
        self.mark
    }

    pub(crate) fn state(&self) -> SlotState {
        self.state
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.state == SlotState::Playing
    }

    /// Shared flag mirrored into [`SessionHandle`](super::SessionHandle).
    pub(crate) fn connected_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connected)
    }

    /// Binds a fresh connection, replacing any previous one.
    #[instrument(skip(self, stream), fields(mark = %self.mark))]
    pub(crate) fn begin_handshake(&mut self, stream: TcpStream, addr: SocketAddr) {
        self.link = Some(PeerLink::spawn(stream, addr));
        self.state = SlotState::Handshaking;
    }

    pub(crate) fn acknowledge(&mut self) {
        self.state = SlotState::Acknowledged;
    }

    pub(crate) fn start_playing(&mut self) {
        self.state = SlotState::Playing;
        self.connected.store(true, Ordering::Release);
    }

    /// Drops the connection. Safe to call repeatedly.
    pub(crate) fn disconnect(&mut self) {
        if let Some(link) = self.link.take() {
            debug!(mark = %self.mark, addr = %link.addr, "Closing connection");
        }
        self.state = SlotState::Disconnected;
        self.connected.store(false, Ordering::Release);
    }

    /// Writes one message line. A write failure disconnects the slot.
    pub(crate) async fn send(&mut self, message: &ServerMessage) -> bool {
        let Some(link) = self.link.as_mut() else {
            return false;
        };
        let line = format!("{message}\n");
        let result = async {
            link.writer.write_all(line.as_bytes()).await?;
            link.writer.flush().await
        }
        .await;
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(mark = %self.mark, error = %e, "Write failed");
                self.disconnect();
                false
            }
        }
    }

    /// Non-blocking check for a buffered line.
    pub(crate) fn poll(&mut self) -> PeerInput {
        let Some(link) = self.link.as_mut() else {
            return PeerInput::Closed;
        };
        match link.lines.try_recv() {
            Ok(line) => PeerInput::Line(line),
            Err(TryRecvError::Empty) => PeerInput::Idle,
            Err(TryRecvError::Disconnected) => PeerInput::Closed,
        }
    }

    /// Waits for the next line; `None` once the stream is gone.
    pub(crate) async fn next_line(&mut self) -> Option<String> {
        match self.link.as_mut() {
            Some(link) => link.lines.recv().await,
            None => None,
        }
    }
}
