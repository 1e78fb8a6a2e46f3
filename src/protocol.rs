//! Line-oriented wire protocol shared by the coordinator and peers.
//!
//! | Direction     | Message        | Format                 |
//! |---------------|----------------|------------------------|
//! | server → peer | assignment     | `You are player:<X/O>` |
//! | peer → server | acknowledgment | `Acknowledged`         |
//! | server → peer | broadcast      | `STATE:<snapshot>`     |
//! | peer → server | move           | `<row>,<col>`          |
//! | server → peer | rematch prompt | `Rematch?`             |
//! | peer → server | rematch vote   | `Yes` to accept        |
//! | peer → server | error marker   | `Error:<message>`      |

use derive_more::{Display, Error, From};
use std::str::FromStr;
use strictly_tictactoe::{CodecError, Mark, Move, Snapshot};

/// Prefix of the slot assignment message.
pub const ASSIGN_PREFIX: &str = "You are player:";
/// Exact acknowledgment token.
pub const ACKNOWLEDGED: &str = "Acknowledged";
/// Prefix of a snapshot broadcast.
pub const STATE_PREFIX: &str = "STATE:";
/// Exact rematch prompt.
pub const REMATCH_PROMPT: &str = "Rematch?";
/// Accepting vote, compared case-insensitively.
pub const ACCEPT_VOTE: &str = "Yes";
/// Declining vote sent by well-behaved peers.
pub const DECLINE_VOTE: &str = "No";
/// Prefix of an out-of-band error marker.
pub const ERROR_PREFIX: &str = "Error:";

/// Messages sent by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Binds the receiving connection to a slot.
    Assign(Mark),
    /// Broadcast of the current snapshot.
    State(Snapshot),
    /// Asks both peers whether to play again.
    RematchPrompt,
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerMessage::Assign(mark) => write!(f, "{ASSIGN_PREFIX}{mark}"),
            ServerMessage::State(snapshot) => write!(f, "{STATE_PREFIX}{snapshot}"),
            ServerMessage::RematchPrompt => f.write_str(REMATCH_PROMPT),
        }
    }
}

/// A server line a peer could not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum ProtocolError {
    /// Assignment carried something other than `X` or `O`.
    #[display("invalid mark in assignment: {_0:?}")]
    #[from(ignore)]
    Mark(#[error(not(source))] String),
    /// Broadcast payload failed to decode.
    #[display("invalid snapshot: {_0}")]
    Snapshot(CodecError),
    /// No known message matches.
    #[display("unknown message: {_0:?}")]
    #[from(ignore)]
    Unknown(#[error(not(source))] String),
}

impl FromStr for ServerMessage {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if let Some(mark) = line.strip_prefix(ASSIGN_PREFIX) {
            let mark = Mark::from_str(mark.trim()).map_err(|_| ProtocolError::Mark(mark.to_string()))?;
            Ok(ServerMessage::Assign(mark))
        } else if let Some(payload) = line.strip_prefix(STATE_PREFIX) {
            Ok(ServerMessage::State(payload.parse()?))
        } else if line == REMATCH_PROMPT {
            Ok(ServerMessage::RematchPrompt)
        } else {
            Err(ProtocolError::Unknown(line.to_string()))
        }
    }
}

/// Messages sent by peers.
///
/// Peer lines are interpreted by context (handshake, play, voting), so the
/// coordinator uses the classification helpers instead of one parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerMessage {
    /// Reply to an assignment.
    Acknowledged,
    /// A move request.
    Move(Move),
    /// Rematch vote.
    Vote(bool),
    /// Out-of-band error marker.
    Error(String),
}

impl std::fmt::Display for PeerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerMessage::Acknowledged => f.write_str(ACKNOWLEDGED),
            PeerMessage::Move(mv) => write!(f, "{mv}"),
            PeerMessage::Vote(true) => f.write_str(ACCEPT_VOTE),
            PeerMessage::Vote(false) => f.write_str(DECLINE_VOTE),
            PeerMessage::Error(message) => write!(f, "{ERROR_PREFIX}{message}"),
        }
    }
}

impl PeerMessage {
    /// True iff `line` is exactly the acknowledgment token.
    pub fn is_acknowledgment(line: &str) -> bool {
        line == ACKNOWLEDGED
    }

    /// True iff `line` is a case-insensitive accept vote.
    pub fn is_accept_vote(line: &str) -> bool {
        line.trim().eq_ignore_ascii_case(ACCEPT_VOTE)
    }

    /// Returns the message carried by an `Error:` marker.
    pub fn error_marker(line: &str) -> Option<&str> {
        line.strip_prefix(ERROR_PREFIX)
    }
}
