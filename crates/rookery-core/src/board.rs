//! Board model: colors, pieces, positions, moves, and the 8×8 grid.
//!
//! The board is mechanical. It stores pieces, looks them up by position, and
//! relocates them when told to; legality lives in [`crate::rules`].

use serde::{Deserialize, Serialize};

/// One of the two sides in a game. White moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// The side that moves first.
    White,
    /// The side that moves second.
    Black,
}

impl Color {
    /// Get the opposite color.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Row delta for this side's forward direction.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// The rank this side's pawns start on.
    #[must_use]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Self::White => 2,
            Self::Black => 7,
        }
    }

    /// The farthest rank for this side, where pawns promote.
    #[must_use]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Self::White => 8,
            Self::Black => 1,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// Chess piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// King.
    King,
    /// Queen.
    Queen,
    /// Rook.
    Rook,
    /// Bishop.
    Bishop,
    /// Knight.
    Knight,
    /// Pawn.
    Pawn,
}

impl PieceKind {
    /// The four kinds a pawn may promote to.
    pub const PROMOTIONS: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::King => write!(f, "king"),
            Self::Queen => write!(f, "queen"),
            Self::Rook => write!(f, "rook"),
            Self::Bishop => write!(f, "bishop"),
            Self::Knight => write!(f, "knight"),
            Self::Pawn => write!(f, "pawn"),
        }
    }
}

/// A piece: a color and a kind. Two pieces of the same color and kind are
/// interchangeable; there is no per-piece identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// Which side the piece belongs to.
    pub color: Color,
    /// What kind of piece it is.
    pub kind: PieceKind,
}

impl Piece {
    /// Create a piece.
    #[must_use]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }
}

/// A square on the board. Rows and columns both run 1..=8; row 1 is white's
/// back rank and column 1 is the a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Rank, 1..=8.
    pub row: u8,
    /// File, 1..=8.
    pub col: u8,
}

impl Position {
    /// Create a position, or `None` if either coordinate is off the board.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row >= 1 && row <= 8 && col >= 1 && col <= 8 {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// Offset this position by signed row/column deltas, staying on the board.
    #[must_use]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Algebraic square code, e.g. `e4`.
    #[must_use]
    pub fn code(self) -> String {
        let file = (b'a' + self.col - 1) as char;
        format!("{file}{}", self.row)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A move from one square to another, with an optional promotion kind.
///
/// Equality includes the promotion kind, so the four promotion moves from the
/// same square to the same square are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Square the piece moves from.
    pub start: Position,
    /// Square the piece moves to.
    pub end: Position,
    /// Kind the pawn becomes on reaching the last rank, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// A plain move with no promotion.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            promotion: None,
        }
    }

    /// A promotion move.
    #[must_use]
    pub const fn promoting(start: Position, end: Position, kind: PieceKind) -> Self {
        Self {
            start,
            end,
            promotion: Some(kind),
        }
    }
}

/// The 8×8 grid. Each square holds at most one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// An empty board.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// The standard starting arrangement, white on ranks 1–2.
    #[must_use]
    pub fn starting() -> Self {
        use PieceKind::*;
        let mut board = Self::empty();
        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for (i, kind) in back_rank.into_iter().enumerate() {
            board.squares[0][i] = Some(Piece::new(Color::White, kind));
            board.squares[7][i] = Some(Piece::new(Color::Black, kind));
        }
        for i in 0..8 {
            board.squares[1][i] = Some(Piece::new(Color::White, Pawn));
            board.squares[6][i] = Some(Piece::new(Color::Black, Pawn));
        }
        board
    }

    /// The piece at a position, if any.
    #[must_use]
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.squares[(pos.row - 1) as usize][(pos.col - 1) as usize]
    }

    /// Place a piece (or clear the square with `None`).
    pub fn set_piece(&mut self, pos: Position, piece: Option<Piece>) {
        self.squares[(pos.row - 1) as usize][(pos.col - 1) as usize] = piece;
    }

    /// Relocate the piece at `mv.start` to `mv.end`, replacing any occupant.
    ///
    /// If the move carries a promotion kind the moved piece becomes that kind
    /// before landing. No legality checking happens here; an empty start
    /// square just clears the destination.
    pub fn apply(&mut self, mv: Move) {
        let mut moved = self.piece_at(mv.start);
        if let (Some(piece), Some(kind)) = (moved.as_mut(), mv.promotion) {
            piece.kind = kind;
        }
        self.set_piece(mv.start, None);
        self.set_piece(mv.end, moved);
    }

    /// Iterate over every occupied square.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(r, rank)| {
            rank.iter().enumerate().filter_map(move |(c, square)| {
                square.map(|piece| {
                    (
                        Position {
                            row: r as u8 + 1,
                            col: c as u8 + 1,
                        },
                        piece,
                    )
                })
            })
        })
    }

    /// Position of `color`'s king, if it is on the board.
    #[must_use]
    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.pieces()
            .find(|(_, piece)| piece.color == color && piece.kind == PieceKind::King)
            .map(|(pos, _)| pos)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

/// Shorthand for positions in tests and fixtures. Panics off the board.
#[must_use]
pub fn pos(row: u8, col: u8) -> Position {
    Position::new(row, col).expect("position on the board")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_board_layout() {
        let board = Board::starting();
        assert_eq!(
            board.piece_at(pos(1, 5)),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            board.piece_at(pos(8, 4)),
            Some(Piece::new(Color::Black, PieceKind::Queen))
        );
        for col in 1..=8 {
            assert_eq!(
                board.piece_at(pos(2, col)),
                Some(Piece::new(Color::White, PieceKind::Pawn))
            );
            assert_eq!(
                board.piece_at(pos(7, col)),
                Some(Piece::new(Color::Black, PieceKind::Pawn))
            );
        }
        assert!(board.piece_at(pos(4, 4)).is_none());
    }

    #[test]
    fn position_bounds() {
        assert!(Position::new(1, 1).is_some());
        assert!(Position::new(8, 8).is_some());
        assert!(Position::new(0, 4).is_none());
        assert!(Position::new(4, 9).is_none());
        assert_eq!(pos(4, 4).offset(-4, 0), None);
        assert_eq!(pos(4, 4).offset(1, 1), Some(pos(5, 5)));
    }

    #[test]
    fn position_code() {
        assert_eq!(pos(1, 1).code(), "a1");
        assert_eq!(pos(4, 5).code(), "e4");
        assert_eq!(pos(8, 8).code(), "h8");
    }

    #[test]
    fn apply_relocates_and_captures() {
        let mut board = Board::empty();
        board.set_piece(pos(1, 1), Some(Piece::new(Color::White, PieceKind::Rook)));
        board.set_piece(pos(1, 4), Some(Piece::new(Color::Black, PieceKind::Pawn)));

        board.apply(Move::new(pos(1, 1), pos(1, 4)));

        assert!(board.piece_at(pos(1, 1)).is_none());
        assert_eq!(
            board.piece_at(pos(1, 4)),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
    }

    #[test]
    fn apply_substitutes_promotion_kind() {
        let mut board = Board::empty();
        board.set_piece(pos(7, 1), Some(Piece::new(Color::White, PieceKind::Pawn)));

        board.apply(Move::promoting(pos(7, 1), pos(8, 1), PieceKind::Queen));

        assert_eq!(
            board.piece_at(pos(8, 1)),
            Some(Piece::new(Color::White, PieceKind::Queen))
        );
    }

    #[test]
    fn king_position_found_or_absent() {
        let board = Board::starting();
        assert_eq!(board.king_position(Color::White), Some(pos(1, 5)));
        assert_eq!(board.king_position(Color::Black), Some(pos(8, 5)));
        assert_eq!(Board::empty().king_position(Color::White), None);
    }

    #[test]
    fn move_equality_includes_promotion() {
        let plain = Move::new(pos(7, 1), pos(8, 1));
        let promoting = Move::promoting(pos(7, 1), pos(8, 1), PieceKind::Queen);
        assert_ne!(plain, promoting);
        assert_ne!(
            promoting,
            Move::promoting(pos(7, 1), pos(8, 1), PieceKind::Rook)
        );
    }
}
