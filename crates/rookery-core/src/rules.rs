//! The rules engine: legal-move filtering and check/checkmate/stalemate.
//!
//! Legality is pseudo-legality minus self-check: each candidate move is
//! applied to the board, the mover's king is tested for attack, and the move
//! is undone. The undo restores a snapshot of both affected squares rather
//! than replaying the move in reverse, so a captured occupant comes back and
//! a promoted pawn un-promotes.

use std::collections::HashSet;

use crate::board::{Board, Color, Move, Position};
use crate::movegen::{generator_for, pseudo_legal_moves};

/// Legal moves for the piece at `pos`, or `None` if the square is empty.
#[must_use]
pub fn legal_moves(board: &mut Board, pos: Position) -> Option<HashSet<Move>> {
    let piece = board.piece_at(pos)?;
    let candidates = pseudo_legal_moves(board, pos)?;

    let mut legal = HashSet::new();
    for candidate in candidates {
        let start_snapshot = board.piece_at(candidate.start);
        let end_snapshot = board.piece_at(candidate.end);

        board.apply(candidate);
        if !is_in_check(board, piece.color) {
            legal.insert(candidate);
        }
        board.set_piece(candidate.start, start_snapshot);
        board.set_piece(candidate.end, end_snapshot);
    }

    Some(legal)
}

/// Whether `color`'s king is a destination of some enemy pseudo-legal move.
///
/// A board with no king for `color` is not in check; the engine tolerates
/// partial positions.
#[must_use]
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let Some(king) = board.king_position(color) else {
        return false;
    };

    board
        .pieces()
        .filter(|(_, piece)| piece.color != color)
        .any(|(pos, piece)| {
            generator_for(piece.kind)
                .moves(board, pos)
                .iter()
                .any(|mv| mv.end == king)
        })
}

/// In check with no legal move available.
#[must_use]
pub fn is_in_checkmate(board: &mut Board, color: Color) -> bool {
    is_in_check(board, color) && is_in_stalemate(board, color)
}

/// No piece of `color` has any legal move.
///
/// This deliberately says nothing about check: callers that want "true"
/// stalemate pair it with `!is_in_check`, and [`is_in_checkmate`] pairs it
/// with `is_in_check`.
#[must_use]
pub fn is_in_stalemate(board: &mut Board, color: Color) -> bool {
    let positions: Vec<Position> = board
        .pieces()
        .filter(|(_, piece)| piece.color == color)
        .map(|(pos, _)| pos)
        .collect();

    positions.into_iter().all(|pos| {
        legal_moves(board, pos)
            .map(|moves| moves.is_empty())
            .unwrap_or(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{pos, Piece, PieceKind};

    fn board_with(pieces: &[(Position, Color, PieceKind)]) -> Board {
        let mut board = Board::empty();
        for &(position, color, kind) in pieces {
            board.set_piece(position, Some(Piece::new(color, kind)));
        }
        board
    }

    #[test]
    fn legal_moves_are_a_subset_of_pseudo_legal() {
        let mut board = Board::starting();
        for (position, _) in Board::starting().pieces() {
            let pseudo = pseudo_legal_moves(&board, position).unwrap();
            let legal = legal_moves(&mut board, position).unwrap();
            assert!(
                legal.is_subset(&pseudo),
                "legal moves from {position} exceed pseudo-legal"
            );
        }
    }

    #[test]
    fn simulate_and_undo_leaves_board_unchanged() {
        // A position with captures, blocked rays, and a promotion available.
        let mut board = board_with(&[
            (pos(1, 5), Color::White, PieceKind::King),
            (pos(7, 2), Color::White, PieceKind::Pawn),
            (pos(8, 1), Color::Black, PieceKind::Rook),
            (pos(5, 5), Color::White, PieceKind::Queen),
            (pos(5, 8), Color::Black, PieceKind::Bishop),
            (pos(8, 5), Color::Black, PieceKind::King),
        ]);
        let before = board.clone();

        for (position, _) in before.pieces() {
            let _ = legal_moves(&mut board, position);
            assert_eq!(board, before, "legal_moves from {position} mutated board");
        }
    }

    #[test]
    fn blocked_rook_stops_before_friendly_pawn() {
        let mut board = board_with(&[
            (pos(1, 1), Color::White, PieceKind::Rook),
            (pos(1, 4), Color::White, PieceKind::Pawn),
        ]);
        let moves = legal_moves(&mut board, pos(1, 1)).unwrap();
        let along_rank: HashSet<Position> = moves
            .iter()
            .filter(|mv| mv.end.row == 1)
            .map(|mv| mv.end)
            .collect();
        assert_eq!(along_rank, HashSet::from([pos(1, 2), pos(1, 3)]));
    }

    #[test]
    fn pawn_a_step_from_the_last_rank_has_exactly_four_legal_moves() {
        let mut board = board_with(&[(pos(7, 3), Color::White, PieceKind::Pawn)]);
        let moves = legal_moves(&mut board, pos(7, 3)).unwrap();
        assert_eq!(moves.len(), 4);
        for kind in PieceKind::PROMOTIONS {
            assert!(moves.contains(&Move::promoting(pos(7, 3), pos(8, 3), kind)));
        }
    }

    #[test]
    fn moving_a_pinned_piece_is_illegal() {
        // The knight on e2 shields the white king from the black rook on e8.
        let mut board = board_with(&[
            (pos(1, 5), Color::White, PieceKind::King),
            (pos(2, 5), Color::White, PieceKind::Knight),
            (pos(8, 5), Color::Black, PieceKind::Rook),
        ]);
        let knight_moves = legal_moves(&mut board, pos(2, 5)).unwrap();
        assert!(knight_moves.is_empty(), "pinned knight must not move");
        assert!(!pseudo_legal_moves(&board, pos(2, 5)).unwrap().is_empty());
    }

    #[test]
    fn king_may_not_step_into_attack() {
        let mut board = board_with(&[
            (pos(1, 5), Color::White, PieceKind::King),
            (pos(8, 4), Color::Black, PieceKind::Rook),
        ]);
        let king_moves = legal_moves(&mut board, pos(1, 5)).unwrap();
        assert!(!king_moves.contains(&Move::new(pos(1, 5), pos(1, 4))));
        assert!(!king_moves.contains(&Move::new(pos(1, 5), pos(2, 4))));
        assert!(king_moves.contains(&Move::new(pos(1, 5), pos(1, 6))));
    }

    #[test]
    fn check_detection() {
        let board = board_with(&[
            (pos(1, 5), Color::White, PieceKind::King),
            (pos(8, 5), Color::Black, PieceKind::Rook),
        ]);
        assert!(is_in_check(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
    }

    #[test]
    fn blocked_attacker_gives_no_check() {
        let board = board_with(&[
            (pos(1, 5), Color::White, PieceKind::King),
            (pos(4, 5), Color::White, PieceKind::Pawn),
            (pos(8, 5), Color::Black, PieceKind::Rook),
        ]);
        assert!(!is_in_check(&board, Color::White));
    }

    #[test]
    fn missing_king_is_not_in_check() {
        let board = board_with(&[(pos(8, 5), Color::Black, PieceKind::Rook)]);
        assert!(!is_in_check(&board, Color::White));
    }

    #[test]
    fn back_rank_checkmate() {
        let mut board = board_with(&[
            (pos(1, 8), Color::White, PieceKind::King),
            (pos(2, 7), Color::White, PieceKind::Pawn),
            (pos(2, 8), Color::White, PieceKind::Pawn),
            (pos(1, 1), Color::Black, PieceKind::Rook),
            (pos(8, 1), Color::Black, PieceKind::King),
        ]);
        assert!(is_in_checkmate(&mut board, Color::White));
        assert!(!is_in_checkmate(&mut board, Color::Black));
    }

    #[test]
    fn checkmate_requires_check() {
        // Classic corner stalemate: no moves, but no check either.
        let mut board = board_with(&[
            (pos(8, 8), Color::Black, PieceKind::King),
            (pos(7, 6), Color::White, PieceKind::Queen),
            (pos(1, 1), Color::White, PieceKind::King),
        ]);
        assert!(!is_in_check(&board, Color::Black));
        assert!(is_in_stalemate(&mut board, Color::Black));
        assert!(!is_in_checkmate(&mut board, Color::Black));
    }

    #[test]
    fn escapable_check_is_not_checkmate() {
        let mut board = board_with(&[
            (pos(1, 5), Color::White, PieceKind::King),
            (pos(8, 5), Color::Black, PieceKind::Rook),
            (pos(8, 1), Color::Black, PieceKind::King),
        ]);
        assert!(is_in_check(&board, Color::White));
        assert!(!is_in_checkmate(&mut board, Color::White));
    }

    #[test]
    fn stalemate_is_false_while_any_move_exists() {
        let mut board = Board::starting();
        assert!(!is_in_stalemate(&mut board, Color::White));
        assert!(!is_in_stalemate(&mut board, Color::Black));
    }

    #[test]
    fn side_with_no_pieces_is_stalemated() {
        let mut board = board_with(&[(pos(1, 1), Color::White, PieceKind::King)]);
        assert!(is_in_stalemate(&mut board, Color::Black));
    }

    #[test]
    fn checkmate_iff_check_and_no_legal_moves() {
        let positions = [
            // mated
            board_with(&[
                (pos(1, 8), Color::White, PieceKind::King),
                (pos(2, 7), Color::White, PieceKind::Pawn),
                (pos(2, 8), Color::White, PieceKind::Pawn),
                (pos(1, 1), Color::Black, PieceKind::Rook),
            ]),
            // stalemated
            board_with(&[
                (pos(8, 8), Color::White, PieceKind::King),
                (pos(6, 7), Color::Black, PieceKind::Queen),
            ]),
            // in check with an escape
            board_with(&[
                (pos(4, 4), Color::White, PieceKind::King),
                (pos(4, 8), Color::Black, PieceKind::Rook),
            ]),
            // free
            Board::starting(),
        ];
        for mut board in positions {
            let mate = is_in_checkmate(&mut board, Color::White);
            let expected = is_in_check(&board, Color::White)
                && is_in_stalemate(&mut board, Color::White);
            assert_eq!(mate, expected);
        }
    }
}
