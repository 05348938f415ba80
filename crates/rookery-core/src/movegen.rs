//! Pseudo-legal move generation, one generator per piece kind.
//!
//! Generators respect board boundaries and occupancy but ignore check; the
//! filtering that rejects self-check moves lives in [`crate::rules`].

use std::collections::HashSet;

use crate::board::{Board, Color, Move, PieceKind, Position};

/// Produces the pseudo-legal moves for one piece kind.
pub trait MoveGenerator: Sync {
    /// Moves for the piece standing at `pos`. Callers guarantee `pos` holds a
    /// piece of the kind this generator serves.
    fn moves(&self, board: &Board, pos: Position) -> HashSet<Move>;
}

/// Look up the generator for a piece kind.
#[must_use]
pub fn generator_for(kind: PieceKind) -> &'static dyn MoveGenerator {
    match kind {
        PieceKind::King => &KingMoves,
        PieceKind::Queen => &QueenMoves,
        PieceKind::Rook => &RookMoves,
        PieceKind::Bishop => &BishopMoves,
        PieceKind::Knight => &KnightMoves,
        PieceKind::Pawn => &PawnMoves,
    }
}

/// Pseudo-legal moves for whatever piece occupies `pos`, or `None` if the
/// square is empty.
#[must_use]
pub fn pseudo_legal_moves(board: &Board, pos: Position) -> Option<HashSet<Move>> {
    let piece = board.piece_at(pos)?;
    Some(generator_for(piece.kind).moves(board, pos))
}

const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];
const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Walk each ray one step at a time. A ray stops short of a friendly piece,
/// includes the square of an enemy piece, and otherwise runs to the edge.
fn slide(board: &Board, pos: Position, rays: &[(i8, i8)]) -> HashSet<Move> {
    let Some(mover) = board.piece_at(pos) else {
        return HashSet::new();
    };
    let mut moves = HashSet::new();
    for &(dr, dc) in rays {
        let mut current = pos;
        while let Some(next) = current.offset(dr, dc) {
            match board.piece_at(next) {
                None => {
                    moves.insert(Move::new(pos, next));
                    current = next;
                }
                Some(occupant) => {
                    if occupant.color != mover.color {
                        moves.insert(Move::new(pos, next));
                    }
                    break;
                }
            }
        }
    }
    moves
}

/// Enumerate a fixed offset table; a target is valid if empty or enemy-held.
fn step(board: &Board, pos: Position, offsets: &[(i8, i8)]) -> HashSet<Move> {
    let Some(mover) = board.piece_at(pos) else {
        return HashSet::new();
    };
    offsets
        .iter()
        .filter_map(|&(dr, dc)| pos.offset(dr, dc))
        .filter(|&target| {
            board
                .piece_at(target)
                .map_or(true, |occupant| occupant.color != mover.color)
        })
        .map(|target| Move::new(pos, target))
        .collect()
}

struct RookMoves;

impl MoveGenerator for RookMoves {
    fn moves(&self, board: &Board, pos: Position) -> HashSet<Move> {
        slide(board, pos, &ORTHOGONALS)
    }
}

struct BishopMoves;

impl MoveGenerator for BishopMoves {
    fn moves(&self, board: &Board, pos: Position) -> HashSet<Move> {
        slide(board, pos, &DIAGONALS)
    }
}

struct QueenMoves;

impl MoveGenerator for QueenMoves {
    fn moves(&self, board: &Board, pos: Position) -> HashSet<Move> {
        let mut moves = slide(board, pos, &ORTHOGONALS);
        moves.extend(slide(board, pos, &DIAGONALS));
        moves
    }
}

struct KnightMoves;

impl MoveGenerator for KnightMoves {
    fn moves(&self, board: &Board, pos: Position) -> HashSet<Move> {
        step(board, pos, &KNIGHT_JUMPS)
    }
}

struct KingMoves;

impl MoveGenerator for KingMoves {
    fn moves(&self, board: &Board, pos: Position) -> HashSet<Move> {
        step(board, pos, &KING_STEPS)
    }
}

struct PawnMoves;

impl MoveGenerator for PawnMoves {
    fn moves(&self, board: &Board, pos: Position) -> HashSet<Move> {
        let Some(mover) = board.piece_at(pos) else {
            return HashSet::new();
        };
        let forward = mover.color.forward();
        let mut moves = HashSet::new();

        let single = pos.offset(forward, 0).filter(|&t| board.piece_at(t).is_none());
        let single_clear = single.is_some();
        if let Some(target) = single {
            push_pawn_move(&mut moves, mover.color, pos, target);
        }

        // Two squares, only from the starting rank and only through empty squares.
        if pos.row == mover.color.pawn_rank() && single_clear {
            if let Some(target) = pos.offset(2 * forward, 0) {
                if board.piece_at(target).is_none() {
                    push_pawn_move(&mut moves, mover.color, pos, target);
                }
            }
        }

        for dc in [-1, 1] {
            if let Some(target) = pos.offset(forward, dc) {
                if matches!(board.piece_at(target), Some(occupant) if occupant.color != mover.color)
                {
                    push_pawn_move(&mut moves, mover.color, pos, target);
                }
            }
        }

        moves
    }
}

/// Add a pawn move, expanding it into the four promotion moves when it lands
/// on the last rank.
fn push_pawn_move(moves: &mut HashSet<Move>, color: Color, start: Position, end: Position) {
    if end.row == color.promotion_rank() {
        for kind in PieceKind::PROMOTIONS {
            moves.insert(Move::promoting(start, end, kind));
        }
    } else {
        moves.insert(Move::new(start, end));
    }
}
