//! The persisted game record: seats, display name, and the game itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::Color;
use crate::game::Game;

/// Unique identifier for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GameId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// What the game store persists per game: the two seat assignments, a display
/// name, and the game state. Seats are usernames; an empty seat is open for
/// the lobby to fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// The game's identifier.
    pub id: GameId,
    /// Human-readable game name chosen at creation.
    pub name: String,
    /// Username seated as white, if any.
    pub white: Option<String>,
    /// Username seated as black, if any.
    pub black: Option<String>,
    /// The game itself.
    pub game: Game,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl GameRecord {
    /// A new record with both seats open and a fresh game.
    #[must_use]
    pub fn new(id: GameId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            white: None,
            black: None,
            game: Game::new(),
            created_at: Utc::now(),
        }
    }

    /// The username seated as `color`, if any.
    #[must_use]
    pub fn seat(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white.as_deref(),
            Color::Black => self.black.as_deref(),
        }
    }

    /// The color `username` is seated as, or `None` for observers.
    #[must_use]
    pub fn seat_of(&self, username: &str) -> Option<Color> {
        if self.white.as_deref() == Some(username) {
            Some(Color::White)
        } else if self.black.as_deref() == Some(username) {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Open the seat for `color`. The game itself continues.
    pub fn clear_seat(&mut self, color: Color) {
        match color {
            Color::White => self.white = None,
            Color::Black => self.black = None,
        }
    }
}
