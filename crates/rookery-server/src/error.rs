//! Coordinator-level errors.
//!
//! Every variant is recovered at the coordinator boundary and rendered into a
//! private ERROR message to the connection that sent the failing command, so
//! each `Display` rendering carries the word "Error" the protocol requires.

use rookery_core::MoveError;

/// Why a client command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// The auth token resolved to no known identity.
    #[error("Error: unauthorized")]
    Unauthorized,

    /// The game id resolved to no game record.
    #[error("Error: game does not exist")]
    GameNotFound,

    /// The requested seat is held by (or reserved for) someone else.
    #[error("Error: player position already occupied.")]
    SeatTaken,

    /// A move command from the side not on move.
    #[error("Error: not your turn")]
    OutOfTurn,

    /// A move command naming an empty start square.
    #[error("Error: no piece in given position")]
    NoPieceAtSquare,

    /// The state machine rejected the move.
    #[error("Error: {0}")]
    InvalidMove(#[from] MoveError),

    /// A player-only command from an identity without a seat.
    #[error("Error: only seated players may do that")]
    NotAParticipant,

    /// The game already has an outcome.
    #[error("Error: game is already over")]
    AlreadyOver,

    /// The game store failed; the in-memory transition was not committed.
    #[error("Error: unable to update game in the database")]
    PersistenceFailure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rendering_contains_the_word_error() {
        let errors = [
            CoordinatorError::Unauthorized,
            CoordinatorError::GameNotFound,
            CoordinatorError::SeatTaken,
            CoordinatorError::OutOfTurn,
            CoordinatorError::NoPieceAtSquare,
            CoordinatorError::InvalidMove(MoveError::IllegalMove),
            CoordinatorError::NotAParticipant,
            CoordinatorError::AlreadyOver,
            CoordinatorError::PersistenceFailure,
        ];
        for err in errors {
            assert!(err.to_string().contains("Error"), "got: {err}");
        }
    }

    #[test]
    fn move_errors_keep_their_reason() {
        let err = CoordinatorError::from(MoveError::NoLegalMoves);
        assert_eq!(err.to_string(), "Error: position yields no legal moves");
    }
}
