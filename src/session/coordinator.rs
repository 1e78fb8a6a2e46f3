//! The single writer of session state.

use super::slot::{PeerInput, Slot};
use super::{BoundedPoll, SessionConfig, SessionHandle, slot_index};
use crate::error::{SessionError, SessionErrorKind};
use crate::protocol::{PeerMessage, ServerMessage};
use crate::store::{SnapshotStore, StoreError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use strictly_tictactoe::{Game, Mark, Move, Snapshot};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// How a round of play ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    /// A line was completed or the board filled up.
    Finished,
    /// The slot at this index timed out or lost its connection.
    Disconnected(usize),
    /// Shutdown was requested.
    Stopped,
}

/// Outcome of waiting for an acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handshake {
    Acknowledged,
    Failed,
    Cancelled,
}

/// Resolves once shutdown is requested or the handle is gone.
async fn stopped(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Sleeps one interval. Returns `false` if shutdown interrupted it.
async fn pause(shutdown: watch::Receiver<bool>, interval: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(interval) => true,
        _ = stopped(shutdown) => false,
    }
}

/// Saves `snapshot` on the blocking pool. Failures are logged, never fatal.
async fn persist<S: SnapshotStore>(store: &Arc<S>, snapshot: Snapshot) {
    let store = Arc::clone(store);
    let saved = tokio::task::spawn_blocking(move || store.save(&snapshot))
        .await
        .unwrap_or_else(|e| Err(StoreError::new(format!("save task failed: {e}"))));
    if let Err(e) = saved {
        error!(error = %e, "Failed to persist game");
    }
}

/// Accepts inbound connections and hands them to the coordinator.
async fn accept_loop(
    listener: TcpListener,
    incoming: mpsc::Sender<(TcpStream, SocketAddr)>,
    shutdown: watch::Receiver<bool>,
) {
    let stop = stopped(shutdown);
    tokio::pin!(stop);
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!(%addr, "Inbound connection");
                    if incoming.send((stream, addr)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            },
            _ = &mut stop => break,
        }
    }
    debug!("Acceptor stopped");
}

/// Owns one live game between exactly two peers.
///
/// Runs the handshake for both slots, polls them round-robin for moves,
/// broadcasts and persists every snapshot, suspends on disconnection and
/// negotiates rematches. Only this type mutates the game.
pub struct Coordinator<S> {
    idle: BoundedPoll,
    voting: BoundedPoll,
    store: Arc<S>,
    game: Game,
    suspended: bool,
    snapshot: Snapshot,
    slots: [Slot; 2],
    incoming: mpsc::Receiver<(TcpStream, SocketAddr)>,
    acceptor: Option<JoinHandle<()>>,
    handle: SessionHandle,
    shutdown: watch::Receiver<bool>,
}

impl<S: SnapshotStore> Coordinator<S> {
    /// Binds the listener, starts accepting and restores persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionErrorKind::Bind`] if the address cannot be acquired.
    #[instrument(skip(store), fields(addr = %config.bind_addr))]
    pub async fn bind(config: SessionConfig, store: S) -> Result<Self, SessionError> {
        let bind_error =
            |e: std::io::Error| SessionError::new(SessionErrorKind::Bind(format!("{}: {e}", config.bind_addr)));
        let listener = TcpListener::bind(config.bind_addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        info!(%local_addr, "Listening for players");

        let slots = [Slot::new(Mark::X), Slot::new(Mark::O)];
        let (shutdown_tx, _) = watch::channel(false);
        let handle = SessionHandle::new(
            local_addr,
            shutdown_tx,
            [slots[0].connected_flag(), slots[1].connected_flag()],
        );

        let (tx, incoming) = mpsc::channel(4);
        let acceptor = tokio::spawn(accept_loop(listener, tx, handle.subscribe()));

        let store = Arc::new(store);
        let game = Self::restore(&store).await;
        let snapshot = Snapshot::capture(&game, true);

        Ok(Self {
            idle: config.idle,
            voting: config.voting,
            store,
            game,
            suspended: true,
            snapshot,
            slots,
            incoming,
            acceptor: Some(acceptor),
            shutdown: handle.subscribe(),
            handle,
        })
    }

    /// Loads the persisted game, or starts and saves a fresh one.
    async fn restore(store: &Arc<S>) -> Game {
        let loader = Arc::clone(store);
        let loaded = tokio::task::spawn_blocking(move || loader.load())
            .await
            .unwrap_or_else(|e| Err(StoreError::new(format!("load task failed: {e}"))));
        match loaded {
            Ok(Some(snapshot)) => {
                info!(state = %snapshot, "Restored persisted game");
                Game::from_snapshot(&snapshot)
            }
            Ok(None) => {
                info!("No persisted game, starting fresh");
                persist(store, Snapshot::waiting()).await;
                Game::new()
            }
            Err(e) => {
                warn!(error = %e, "Persisted game unreadable, starting fresh");
                persist(store, Snapshot::waiting()).await;
                Game::new()
            }
        }
    }

    /// Handle for observing and stopping the session.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Runs the session until a rematch is declined, shutdown is requested
    /// or a peer reports an error. Always shuts down before returning.
    ///
    /// # Errors
    ///
    /// Returns [`SessionErrorKind::Protocol`] when a peer sends an
    /// `Error:` marker.
    #[instrument(skip(self), fields(addr = %self.handle.local_addr()))]
    pub async fn run(mut self) -> Result<(), SessionError> {
        let result = self.drive().await;
        if let Err(e) = &result {
            error!(error = %e, "Session aborted");
        }
        self.shutdown();
        result
    }

    async fn drive(&mut self) -> Result<(), SessionError> {
        for index in 0..self.slots.len() {
            if !self.handshake(index).await? {
                return Ok(());
            }
        }
        self.resume().await;

        loop {
            match self.play_round().await? {
                RoundEnd::Finished => {
                    if !self.negotiate_rematch().await {
                        return Ok(());
                    }
                }
                RoundEnd::Disconnected(index) => {
                    if !self.recover(index).await? {
                        return Ok(());
                    }
                }
                RoundEnd::Stopped => return Ok(()),
            }
        }
    }

    /// Stops the session: signals every loop, closes both connections and
    /// releases the listener. Idempotent.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) {
        self.handle.shutdown();
        for slot in &mut self.slots {
            slot.disconnect();
        }
        self.incoming.close();
        if let Some(acceptor) = self.acceptor.take() {
            acceptor.abort();
            info!("Server shutdown complete");
        }
    }

    /// Binds the next inbound connection to slot `index`.
    ///
    /// Retries with further connections until one acknowledges. Returns
    /// `Ok(false)` if shutdown was requested meanwhile.
    #[instrument(skip(self), fields(mark = %self.slots[index].mark()))]
    async fn handshake(&mut self, index: usize) -> Result<bool, SessionError> {
        let mark = self.slots[index].mark();
        loop {
            info!("Waiting for player to connect");
            let (stream, addr) = tokio::select! {
                next = self.incoming.recv() => match next {
                    Some(connection) => connection,
                    None => return Ok(false),
                },
                _ = stopped(self.shutdown.clone()) => return Ok(false),
            };

            let slot = &mut self.slots[index];
            slot.begin_handshake(stream, addr);
            if !slot.send(&ServerMessage::Assign(mark)).await {
                continue;
            }

            match self.await_acknowledgment(index).await? {
                Handshake::Acknowledged => {
                    self.slots[index].start_playing();
                    info!(%addr, "Player connected");
                    return Ok(true);
                }
                Handshake::Failed => {
                    warn!(%addr, "Connection lost during handshake");
                    self.slots[index].disconnect();
                }
                Handshake::Cancelled => return Ok(false),
            }
        }
    }

    /// Reads lines until the exact acknowledgment token arrives, pausing one
    /// interval after each unexpected line.
    async fn await_acknowledgment(&mut self, index: usize) -> Result<Handshake, SessionError> {
        loop {
            let line = tokio::select! {
                line = self.slots[index].next_line() => line,
                _ = stopped(self.shutdown.clone()) => return Ok(Handshake::Cancelled),
            };
            let Some(line) = line else {
                return Ok(Handshake::Failed);
            };
            if PeerMessage::is_acknowledgment(&line) {
                self.slots[index].acknowledge();
                return Ok(Handshake::Acknowledged);
            }
            if let Some(message) = PeerMessage::error_marker(&line) {
                return Err(SessionError::protocol(message));
            }
            debug!(line, "Waiting for acknowledgment");
            if !pause(self.shutdown.clone(), self.idle.interval()).await {
                return Ok(Handshake::Cancelled);
            }
        }
    }

    /// Recomputes the snapshot and persists it.
    async fn refresh(&mut self) {
        self.snapshot = Snapshot::capture(&self.game, self.suspended);
        persist(&self.store, self.snapshot.clone()).await;
    }

    /// Sends the current snapshot to every connected slot.
    async fn broadcast(&mut self) {
        let message = ServerMessage::State(self.snapshot.clone());
        debug!(%message, "Broadcasting");
        for slot in &mut self.slots {
            slot.send(&message).await;
        }
    }

    /// Lifts the suspension and tells both peers.
    async fn resume(&mut self) {
        self.suspended = false;
        self.refresh().await;
        self.broadcast().await;
        info!(state = %self.snapshot, "Game resumed");
    }

    /// Polls both slots until the game ends, a slot drops, or the player to
    /// move stays silent for the whole idle window.
    async fn play_round(&mut self) -> Result<RoundEnd, SessionError> {
        if self.game.is_over() {
            self.finish_game().await;
            return Ok(RoundEnd::Finished);
        }

        let mut idle_cycles = 0;
        while idle_cycles < self.idle.max_cycles() {
            if *self.shutdown.borrow() {
                return Ok(RoundEnd::Stopped);
            }
            if let Some(index) = self.slots.iter().position(|s| !s.is_playing()) {
                return Ok(RoundEnd::Disconnected(index));
            }

            let mut had_input = false;
            for index in 0..self.slots.len() {
                match self.slots[index].poll() {
                    PeerInput::Idle => {}
                    PeerInput::Closed => {
                        warn!(mark = %self.slots[index].mark(), "Connection lost");
                        return Ok(RoundEnd::Disconnected(index));
                    }
                    PeerInput::Line(line) => {
                        had_input = true;
                        if let Some(message) = PeerMessage::error_marker(&line) {
                            return Err(SessionError::protocol(message));
                        }
                        if self.apply_move(index, &line).await {
                            idle_cycles = 0;
                            if self.game.is_over() {
                                self.finish_game().await;
                                return Ok(RoundEnd::Finished);
                            }
                        }
                    }
                }
            }

            if !had_input {
                idle_cycles += 1;
                if !pause(self.shutdown.clone(), self.idle.interval()).await {
                    return Ok(RoundEnd::Stopped);
                }
            }
        }

        let turn = self.game.turn();
        info!(mark = %turn, cycles = idle_cycles, "Player timed out");
        Ok(RoundEnd::Disconnected(slot_index(turn)))
    }

    /// Applies one move line from slot `index`. Returns `true` if the board
    /// changed; rejected lines leave everything untouched and broadcast
    /// nothing.
    #[instrument(skip(self), fields(mark = %self.slots[index].mark()))]
    async fn apply_move(&mut self, index: usize, line: &str) -> bool {
        let mark = self.slots[index].mark();
        let mv = match line.parse::<Move>() {
            Ok(mv) => mv,
            Err(e) => {
                warn!(error = %e, "Malformed move");
                return false;
            }
        };
        if mark != self.game.turn() {
            warn!(turn = %self.game.turn(), "Move out of turn rejected");
            return false;
        }
        if let Err(e) = self.game.place_mark(mv.row(), mv.col()) {
            warn!(error = %e, "Invalid move");
            return false;
        }

        self.game.advance_turn();
        self.refresh().await;
        self.broadcast().await;
        info!(%mv, status = %self.snapshot.status(), "Move applied");
        true
    }

    /// Persists and broadcasts the final snapshot once more.
    async fn finish_game(&mut self) {
        self.refresh().await;
        self.broadcast().await;
        info!(state = %self.snapshot, "Game over");
        debug!("Final board:\n{}", self.game.board().display());
    }

    /// Suspends the game, waits for every missing slot to reconnect and
    /// resumes. Returns `Ok(false)` if shutdown interrupted the wait.
    ///
    /// Any inbound connection may fill a free slot.
    #[instrument(skip(self), fields(mark = %self.slots[index].mark()))]
    async fn recover(&mut self, index: usize) -> Result<bool, SessionError> {
        self.slots[index].disconnect();
        self.suspended = true;
        self.refresh().await;
        self.broadcast().await;
        info!("Game suspended");

        for slot in 0..self.slots.len() {
            if !self.slots[slot].is_playing() {
                info!(
                    mark = %self.slots[slot].mark(),
                    state = %self.slots[slot].state(),
                    "Attempting to reconnect player"
                );
                if !self.handshake(slot).await? {
                    return Ok(false);
                }
            }
        }

        self.resume().await;
        Ok(true)
    }

    /// Offers a rematch and collects votes for one voting window. Returns
    /// `true` and restarts the game only if both peers accepted.
    #[instrument(skip(self))]
    async fn negotiate_rematch(&mut self) -> bool {
        for slot in &mut self.slots {
            slot.send(&ServerMessage::RematchPrompt).await;
        }

        let mut votes: [Option<bool>; 2] = [None, None];
        for _ in 0..self.voting.max_cycles() {
            if *self.shutdown.borrow() {
                return false;
            }
            for (index, vote) in votes.iter_mut().enumerate() {
                if vote.is_some() {
                    continue;
                }
                match self.slots[index].poll() {
                    PeerInput::Line(line) => {
                        let accepted = PeerMessage::is_accept_vote(&line);
                        info!(mark = %self.slots[index].mark(), accepted, "Vote received");
                        *vote = Some(accepted);
                    }
                    PeerInput::Closed => *vote = Some(false),
                    PeerInput::Idle => {}
                }
            }
            if votes.iter().all(Option::is_some) {
                break;
            }
            if !pause(self.shutdown.clone(), self.voting.interval()).await {
                return false;
            }
        }

        if votes.iter().all(|vote| *vote == Some(true)) {
            info!("Rematch accepted");
            self.game.reset();
            self.suspended = false;
            self.refresh().await;
            self.broadcast().await;
            true
        } else {
            info!(?votes, "Rematch declined");
            false
        }
    }
}
