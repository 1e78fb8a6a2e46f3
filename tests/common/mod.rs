//! Shared helpers for driving a live session over localhost.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;
use strictly_duel::{
    BoundedPoll, Coordinator, Mark, MemoryStore, SessionConfig, SessionError, SessionHandle,
    Snapshot, SnapshotStore, StoreError,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::task::JoinHandle;

/// Poll interval used by every test session.
pub const INTERVAL: Duration = Duration::from_millis(20);

/// A raw protocol peer.
pub struct TestPeer {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestPeer {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Connects, expects the assignment for `mark` and acknowledges it.
    pub async fn join(addr: SocketAddr, mark: Mark) -> Self {
        let mut peer = Self::connect(addr).await;
        assert_eq!(peer.recv().await.unwrap(), format!("You are player:{mark}"));
        peer.send("Acknowledged").await;
        peer
    }

    /// Next line from the server, `None` once the connection is closed.
    pub async fn recv(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("timed out waiting for the server")
            .ok()
            .flatten()
    }

    /// Like [`send`](Self::send), but reports a closed connection instead of
    /// panicking.
    pub async fn try_send(&mut self, line: &str) -> bool {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .is_ok()
    }

    pub async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }
}

/// Starts a session on an ephemeral port with short poll intervals.
pub async fn start_session<S: SnapshotStore>(
    store: S,
    idle_cycles: u32,
) -> (SessionHandle, JoinHandle<Result<(), SessionError>>) {
    let config = SessionConfig::new(
        "127.0.0.1:0".parse().unwrap(),
        BoundedPoll::new(INTERVAL, idle_cycles),
        BoundedPoll::new(INTERVAL, 50),
    );
    let coordinator = Coordinator::bind(config, store).await.unwrap();
    let handle = coordinator.handle();
    (handle, tokio::spawn(coordinator.run()))
}

/// Waits for the session task to finish.
pub async fn finish(task: JoinHandle<Result<(), SessionError>>) -> Result<(), SessionError> {
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("session did not stop")
        .unwrap()
}

/// Memory store whose saves block the calling thread for a while.
#[derive(Debug, Clone)]
pub struct SlowStore {
    pub inner: MemoryStore,
    pub delay: Duration,
}

impl SnapshotStore for SlowStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        self.inner.load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        std::thread::sleep(self.delay);
        self.inner.save(snapshot)
    }
}
