//! Pure tic-tac-toe rules and the snapshot wire codec.
//!
//! Nothing in this crate performs I/O. The session coordinator in
//! `strictly_duel` drives [`Game`], captures [`Snapshot`]s and ships them
//! through [`encode`] / [`decode`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod codec;
mod rules;
mod snapshot;
mod types;

pub use action::{Move, MoveParseError};
pub use codec::{CodecError, decode, encode};
pub use rules::{Game, PlaceError};
pub use snapshot::{Snapshot, Status};
pub use types::{Board, Cell, Mark};
