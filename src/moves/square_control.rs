use crate::board::{Board, Color, Piece};
use crate::moves::tables::Tables;
use crate::moves::types::Move;
use crate::square::Square;

/// Attack set of `piece` standing on `square` with the given blockers.
pub fn attacks_from(
    piece: Piece,
    color: Color,
    square: Square,
    blockers: u64,
    tables: &Tables,
) -> u64 {
    let sq = square.index() as usize;
    match piece {
        Piece::Pawn => tables.pawn_attacks(color, sq),
        Piece::Knight => tables.knight_attacks(sq),
        Piece::King => tables.king_attacks(sq),
        Piece::Bishop => tables.bishop_attacks(sq, blockers),
        Piece::Rook => tables.rook_attacks(sq, blockers),
        Piece::Queen => tables.queen_attacks(sq, blockers),
    }
}

/// True iff any piece of `attacker` attacks `square`. Each piece kind is
/// tested by symmetry: the attack set *from* the square, intersected with
/// the attacker's bitboard. For pawns that means using the opposite color's
/// attack table.
pub fn is_square_attacked(board: &Board, square: Square, attacker: Color, tables: &Tables) -> bool {
    let sq = square.index() as usize;

    if tables.pawn_attacks(attacker.opposite(), sq) & board.pieces(Piece::Pawn, attacker) != 0 {
        return true;
    }
    if tables.knight_attacks(sq) & board.pieces(Piece::Knight, attacker) != 0 {
        return true;
    }
    if tables.king_attacks(sq) & board.pieces(Piece::King, attacker) != 0 {
        return true;
    }

    let occupied = board.occupied();

    let rook_rays = tables.rook_attacks(sq, occupied);
    if rook_rays & board.pieces(Piece::Rook, attacker) != 0 {
        return true;
    }

    let bishop_rays = tables.bishop_attacks(sq, occupied);
    if bishop_rays & board.pieces(Piece::Bishop, attacker) != 0 {
        return true;
    }

    (rook_rays | bishop_rays) & board.pieces(Piece::Queen, attacker) != 0
}

#[inline(always)]
pub fn in_check(board: &Board, side: Color, tables: &Tables) -> bool {
    is_square_attacked(board, board.king_square(side), side.opposite(), tables)
}

/// Castling legality beyond empty-squares and rights: the king's start
/// square, the square it crosses, and its destination must all be safe.
/// (The queenside b-file square may be attacked; the king never touches it.)
pub fn is_legal_castling(board: &Board, mv: Move, tables: &Tables) -> bool {
    let color = board.side_to_move;

    let path: [u8; 3] = match (color, mv.target().index()) {
        (Color::White, 62) => [60, 61, 62], // e1 f1 g1
        (Color::White, 58) => [60, 59, 58], // e1 d1 c1
        (Color::Black, 6) => [4, 5, 6],     // e8 f8 g8
        (Color::Black, 2) => [4, 3, 2],     // e8 d8 c8
        _ => return false,
    };

    let opponent = color.opposite();
    path.iter()
        .all(|&idx| !is_square_attacked(board, Square::from_index(idx), opponent, tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn startpos_attack_map() {
        let tables = Tables::new();
        let board = Board::new();
        // e3 is covered by white pawns (d2/f2) but not by black
        let e3 = "e3".parse::<Square>().unwrap();
        assert!(is_square_attacked(&board, e3, Color::White, &tables));
        assert!(!is_square_attacked(&board, e3, Color::Black, &tables));
        // neither king starts in check
        assert!(!in_check(&board, Color::White, &tables));
        assert!(!in_check(&board, Color::Black, &tables));
    }

    #[test]
    fn sliders_attack_through_empty_lines_only() {
        let tables = Tables::new();
        let board = Board::from_str("4k3/8/8/8/r3P3/8/8/4K3 w - - 0 1").unwrap();
        // the a4 rook sees b4..d4 and stops at the e4 pawn
        let d4 = "d4".parse::<Square>().unwrap();
        let e4 = "e4".parse::<Square>().unwrap();
        let f4 = "f4".parse::<Square>().unwrap();
        assert!(is_square_attacked(&board, d4, Color::Black, &tables));
        assert!(is_square_attacked(&board, e4, Color::Black, &tables));
        assert!(!is_square_attacked(&board, f4, Color::Black, &tables));
    }

    #[test]
    fn check_detection_from_knight() {
        let tables = Tables::new();
        let board = Board::from_str("4k3/8/3N4/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(in_check(&board, Color::Black, &tables));
        assert!(!in_check(&board, Color::White, &tables));
    }
}
