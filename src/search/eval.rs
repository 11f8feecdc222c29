//! Static evaluation: material, mobility, and piece-square terms, summed
//! from White's point of view and sign-flipped for Black to move.

use crate::bitboard::{BitboardExt, RANK_2, RANK_7};
use crate::board::{Board, Color, PIECES, Piece};
use crate::moves::square_control::attacks_from;
use crate::moves::tables::Tables;
use crate::square::Square;
use crate::search::pst;
use crate::utils::pop_lsb;

/// Total non-king material (both sides) below this many centipawns counts
/// as the endgame: PSTs switch tables and null-move pruning switches off.
pub const ENDGAME_THRESHOLD: i32 = 2400;

fn table_for(piece: Piece) -> &'static ([i32; 64], [i32; 64]) {
    match piece {
        Piece::Pawn => &pst::PAWN_TABLE,
        Piece::Knight => &pst::KNIGHT_TABLE,
        Piece::Bishop => &pst::BISHOP_TABLE,
        Piece::Rook => &pst::ROOK_TABLE,
        Piece::Queen => &pst::QUEEN_TABLE,
        Piece::King => &pst::KING_TABLE,
    }
}

/// Material balance, positive for White.
pub fn material_score(board: &Board) -> i32 {
    let mut score = 0;
    for piece in PIECES {
        score += board.bb(Color::White, piece).count_ones() as i32 * piece.value();
        score -= board.bb(Color::Black, piece).count_ones() as i32 * piece.value();
    }
    score
}

/// Endgame phase test on the combined non-king material of both sides.
pub fn is_endgame(board: &Board) -> bool {
    let mut material = 0;
    for piece in PIECES {
        if piece == Piece::King {
            continue;
        }
        material += board.bb(Color::White, piece).count_ones() as i32 * piece.value();
        material += board.bb(Color::Black, piece).count_ones() as i32 * piece.value();
    }
    material < ENDGAME_THRESHOLD
}

/// Pawn mobility for one side: single and double pushes plus captures.
fn pawn_mobility(board: &Board, color: Color, tables: &Tables) -> i32 {
    let occupied = board.occupied();
    let opponents = board.opponent_occupancy(color);
    let double_rank = match color {
        Color::White => RANK_2,
        Color::Black => RANK_7,
    };

    let mut count = 0;
    let mut pawns = board.pieces(Piece::Pawn, color);
    while pawns != 0 {
        let sq = pop_lsb(&mut pawns);
        let one = match color {
            Color::White => sq as i32 - 8,
            Color::Black => sq as i32 + 8,
        };
        if (0..64).contains(&one) && !occupied.is_set(one as u8) {
            count += 1;
            let two = match color {
                Color::White => one - 8,
                Color::Black => one + 8,
            };
            if 1u64 << sq & double_rank != 0 && (0..64).contains(&two) && !occupied.is_set(two as u8)
            {
                count += 1;
            }
        }
        count += (tables.pawn_attacks(color, sq as usize) & opponents).count_ones() as i32;
    }
    count
}

/// Mobility balance: popcount of legal destination squares per piece,
/// positive for White. En passant rides along implicitly as a pawn capture
/// the next generator pass would emit.
pub fn mobility_score(board: &Board, tables: &Tables) -> i32 {
    let mut score = 0;

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let own = board.occupancy(color);
        let occupied = board.occupied();

        score += sign * pawn_mobility(board, color, tables);

        for piece in [
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            let mut bb = board.pieces(piece, color);
            while bb != 0 {
                let sq = pop_lsb(&mut bb);
                let destinations =
                    attacks_from(piece, color, Square::from_index(sq), occupied, tables) & !own;
                score += sign * destinations.count_ones() as i32;
            }
        }
    }

    score
}

/// Piece-square balance, positive for White. Black mirrors the square with
/// `^ 56`; the phase decides which half of each table applies.
pub fn positional_score(board: &Board) -> i32 {
    let endgame = is_endgame(board);
    let mut score = 0;

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        for piece in PIECES {
            let (mg, eg) = table_for(piece);
            let table = if endgame { eg } else { mg };
            let mut bb = board.bb(color, piece);
            while bb != 0 {
                let sq = pop_lsb(&mut bb) as usize;
                let lookup = if color == Color::White { sq } else { sq ^ 56 };
                score += sign * table[lookup];
            }
        }
    }

    score
}

/// Full static evaluation from the side to move's perspective.
pub fn evaluate(board: &Board, tables: &Tables) -> i32 {
    let eval = material_score(board) + mobility_score(board, tables) + positional_score(board);
    match board.side_to_move {
        Color::White => eval,
        Color::Black => -eval,
    }
}
