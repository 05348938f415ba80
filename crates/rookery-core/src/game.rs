//! The game state machine: one board, the side to move, and a terminal marker.
//!
//! `make_move` is the only operation that advances play. Terminal detection
//! is the caller's job: after a successful move, query checkmate/stalemate
//! for the new side to move and call [`Game::mark_over`] if the game ended.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::board::{Board, Color, Move, Position};
use crate::rules;

/// Why a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    /// The side to move was checkmated.
    Checkmate,
    /// The side to move had no legal moves while not in check.
    Stalemate,
    /// A player resigned.
    Resignation,
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checkmate => write!(f, "checkmate"),
            Self::Stalemate => write!(f, "stalemate"),
            Self::Resignation => write!(f, "resignation"),
        }
    }
}

/// Ways `make_move` can reject a move. The game is unchanged on any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The game already has an outcome.
    #[error("game is already over")]
    AlreadyOver,
    /// Nothing stands on the start square.
    #[error("no piece at {square}")]
    NoPieceAtSquare {
        /// The empty start square.
        square: Position,
    },
    /// The piece at the start square belongs to the side not on move.
    #[error("move out of turn")]
    OutOfTurn,
    /// The start square's piece has no legal moves at all.
    #[error("position yields no legal moves")]
    NoLegalMoves,
    /// The move is not among the start square's legal moves.
    #[error("move is not legal")]
    IllegalMove,
}

/// Ways `resign` can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResignError {
    /// The game already has an outcome.
    #[error("game is already over")]
    AlreadyOver,
}

/// A chess game in progress or finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    turn: Color,
    outcome: Option<GameOutcome>,
}

impl Game {
    /// A fresh game: standard starting board, white to move.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::starting(),
            turn: Color::White,
            outcome: None,
        }
    }

    /// The current board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    #[must_use]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The outcome, if the game has finished.
    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Whether the game has finished.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Legal moves for the piece at `from`, or `None` if the square is empty.
    pub fn legal_moves(&mut self, from: Position) -> Option<HashSet<Move>> {
        rules::legal_moves(&mut self.board, from)
    }

    /// Whether `color` is currently in check.
    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        rules::is_in_check(&self.board, color)
    }

    /// Whether `color` is checkmated.
    pub fn is_in_checkmate(&mut self, color: Color) -> bool {
        rules::is_in_checkmate(&mut self.board, color)
    }

    /// Whether `color` has no legal moves. See [`rules::is_in_stalemate`] for
    /// how this composes with check.
    pub fn is_in_stalemate(&mut self, color: Color) -> bool {
        rules::is_in_stalemate(&mut self.board, color)
    }

    /// Validate `mv` against the legal moves of its start square, apply it,
    /// and hand the turn to the other side.
    pub fn make_move(&mut self, mv: Move) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::AlreadyOver);
        }
        let piece = self
            .board
            .piece_at(mv.start)
            .ok_or(MoveError::NoPieceAtSquare { square: mv.start })?;
        if piece.color != self.turn {
            return Err(MoveError::OutOfTurn);
        }

        let legal = rules::legal_moves(&mut self.board, mv.start)
            .ok_or(MoveError::NoPieceAtSquare { square: mv.start })?;
        if legal.is_empty() {
            return Err(MoveError::NoLegalMoves);
        }
        if !legal.contains(&mv) {
            return Err(MoveError::IllegalMove);
        }

        self.board.apply(mv);
        self.turn = self.turn.opposite();
        Ok(())
    }

    /// End the game by resignation. Move legality is bypassed; the seat check
    /// that keeps observers from resigning happens upstream.
    pub fn resign(&mut self) -> Result<(), ResignError> {
        if self.is_over() {
            return Err(ResignError::AlreadyOver);
        }
        self.outcome = Some(GameOutcome::Resignation);
        Ok(())
    }

    /// Record a terminal outcome directly, bypassing move legality.
    pub fn mark_over(&mut self, outcome: GameOutcome) {
        self.outcome = Some(outcome);
    }

    /// Replace the board. For setting up positions; play state is untouched.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    /// Set the side to move.
    pub fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
