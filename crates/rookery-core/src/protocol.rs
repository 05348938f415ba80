//! JSON wire protocol: client command and server message envelopes.
//!
//! Commands are tagged by `commandType`, server messages by
//! `serverMessageType`. Field names below are the wire names; the transport
//! is anything that can carry one JSON message at a time in both directions.

use serde::{Deserialize, Serialize};

use crate::board::{Color, Move};
use crate::game::Game;
use crate::record::GameId;

/// An authentication token presented with every command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthToken(pub String);

impl AuthToken {
    /// Wrap a token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Display for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandType")]
pub enum ClientCommand {
    /// Take a previously assigned seat in a game.
    #[serde(rename = "JOIN_PLAYER")]
    JoinPlayer {
        /// The requester's auth token.
        #[serde(rename = "authToken")]
        auth_token: AuthToken,
        /// The game to join.
        #[serde(rename = "gameID")]
        game_id: GameId,
        /// The seat being claimed.
        #[serde(rename = "playerColor")]
        player_color: Color,
    },
    /// Watch a game without a seat.
    #[serde(rename = "JOIN_OBSERVER")]
    JoinObserver {
        /// The requester's auth token.
        #[serde(rename = "authToken")]
        auth_token: AuthToken,
        /// The game to observe.
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
    /// Make a move.
    #[serde(rename = "MAKE_MOVE")]
    MakeMove {
        /// The requester's auth token.
        #[serde(rename = "authToken")]
        auth_token: AuthToken,
        /// The game being played.
        #[serde(rename = "gameID")]
        game_id: GameId,
        /// The proposed move.
        #[serde(rename = "move")]
        mv: Move,
    },
    /// Resign the game.
    #[serde(rename = "RESIGN")]
    Resign {
        /// The requester's auth token.
        #[serde(rename = "authToken")]
        auth_token: AuthToken,
        /// The game being resigned.
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
    /// Leave the game's broadcast group (and vacate a held seat).
    #[serde(rename = "LEAVE")]
    Leave {
        /// The requester's auth token.
        #[serde(rename = "authToken")]
        auth_token: AuthToken,
        /// The game being left.
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
}

impl ClientCommand {
    /// The auth token carried by any command.
    #[must_use]
    pub fn auth_token(&self) -> &AuthToken {
        match self {
            Self::JoinPlayer { auth_token, .. }
            | Self::JoinObserver { auth_token, .. }
            | Self::MakeMove { auth_token, .. }
            | Self::Resign { auth_token, .. }
            | Self::Leave { auth_token, .. } => auth_token,
        }
    }

    /// The game id carried by any command.
    #[must_use]
    pub fn game_id(&self) -> GameId {
        match self {
            Self::JoinPlayer { game_id, .. }
            | Self::JoinObserver { game_id, .. }
            | Self::MakeMove { game_id, .. }
            | Self::Resign { game_id, .. }
            | Self::Leave { game_id, .. } => *game_id,
        }
    }
}

/// A message from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "serverMessageType")]
pub enum ServerMessage {
    /// Authoritative snapshot of a game: board, side to move, outcome.
    #[serde(rename = "LOAD_GAME")]
    LoadGame {
        /// The snapshot.
        game: Game,
    },
    /// Human-readable event text.
    #[serde(rename = "NOTIFICATION")]
    Notification {
        /// The notification text.
        message: String,
    },
    /// A command failed. The text always contains the word "Error".
    #[serde(rename = "ERROR")]
    Error {
        /// What went wrong.
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl ServerMessage {
    /// A LOAD_GAME snapshot.
    #[must_use]
    pub fn load_game(game: Game) -> Self {
        Self::LoadGame { game }
    }

    /// A NOTIFICATION with the given text.
    #[must_use]
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// An ERROR with the given text.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error_message: message.into(),
        }
    }
}
