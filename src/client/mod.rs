//! Peer side of the session protocol.

mod strategy;

pub use strategy::{FirstFreeStrategy, RandomStrategy, Strategy};

use crate::protocol::{PeerMessage, ProtocolError, ServerMessage};
use anyhow::{Context, Result, bail};
use std::net::SocketAddr;
use strictly_tictactoe::{Mark, Snapshot, Status};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info, instrument, warn};

/// A connected player.
///
/// Acknowledges its assignment, answers every ongoing snapshot where it is
/// to move with one move from its [`Strategy`], and votes on rematches.
pub struct PeerClient {
    addr: SocketAddr,
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    mark: Option<Mark>,
    view: Option<Snapshot>,
    acted_on: Option<Snapshot>,
}

impl PeerClient {
    /// Connects to a session.
    ///
    /// # Errors
    ///
    /// Fails if the connection cannot be established.
    #[instrument]
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to {addr}"))?;
        let (reader, writer) = stream.into_split();
        info!(%addr, "Connected to session");
        Ok(Self {
            addr,
            lines: BufReader::new(reader).lines(),
            writer,
            mark: None,
            view: None,
            acted_on: None,
        })
    }

    /// The assigned mark, once the server has sent it.
    pub fn mark(&self) -> Option<Mark> {
        self.mark
    }

    /// The last snapshot received.
    pub fn view(&self) -> Option<&Snapshot> {
        self.view.as_ref()
    }

    /// Plays until the server closes the connection. Returns the last
    /// snapshot seen.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, or after reporting an undecodable snapshot to
    /// the server with an error marker.
    #[instrument(skip(self, strategy), fields(addr = %self.addr))]
    pub async fn run(&mut self, strategy: &mut impl Strategy) -> Result<Option<Snapshot>> {
        while let Some(line) = self.lines.next_line().await.context("Read from server failed")? {
            match line.parse::<ServerMessage>() {
                Ok(ServerMessage::Assign(mark)) => {
                    info!(%mark, "Assigned");
                    self.mark = Some(mark);
                    self.send(&PeerMessage::Acknowledged).await?;
                }
                Ok(ServerMessage::State(snapshot)) => self.on_state(snapshot, strategy).await?,
                Ok(ServerMessage::RematchPrompt) => {
                    self.acted_on = None;
                    let accept = strategy.accept_rematch(self.view.as_ref()).await;
                    info!(accept, "Rematch vote");
                    self.send(&PeerMessage::Vote(accept)).await?;
                }
                Err(ProtocolError::Snapshot(e)) => {
                    self.send(&PeerMessage::Error(e.to_string())).await?;
                    bail!("Server sent an undecodable snapshot: {e}");
                }
                Err(e) => warn!(error = %e, "Ignoring server line"),
            }
        }
        info!("Server closed the connection");
        Ok(self.view.clone())
    }

    /// Records a snapshot and moves if it is this peer's turn.
    async fn on_state(&mut self, snapshot: Snapshot, strategy: &mut impl Strategy) -> Result<()> {
        debug!(state = %snapshot, "State received");
        self.view = Some(snapshot.clone());

        if snapshot.status() != Status::Ongoing {
            self.acted_on = None;
            return Ok(());
        }
        let Some(mark) = self.mark else {
            return Ok(());
        };
        if snapshot.turn() != mark || self.acted_on.as_ref() == Some(&snapshot) {
            return Ok(());
        }

        if let Some(mv) = strategy.choose_move(&snapshot, mark).await {
            info!(%mv, "Playing");
            self.send(&PeerMessage::Move(mv)).await?;
        }
        self.acted_on = Some(snapshot);
        Ok(())
    }

    async fn send(&mut self, message: &PeerMessage) -> Result<()> {
        let line = format!("{message}\n");
        self.writer
            .write_all(line.as_bytes())
            .await
            .context("Write to server failed")?;
        Ok(())
    }
}
