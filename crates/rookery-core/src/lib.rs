//! # rookery-core
//!
//! Everything shared between the rookery server and its clients: the board
//! model, pseudo-legal move generation, the rules engine, the game state
//! machine, the persisted game record, and the JSON wire protocol.
//!
//! Nothing here performs I/O; the server crate supplies sessions, storage,
//! and transport.

pub mod board;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod record;
pub mod rules;

pub use board::{Board, Color, Move, Piece, PieceKind, Position};
pub use game::{Game, GameOutcome, MoveError, ResignError};
pub use protocol::{AuthToken, ClientCommand, ServerMessage};
pub use record::{GameId, GameRecord};
