//! Pseudo-legal move generation. Moves emitted here obey piece movement
//! rules and never land on a friendly piece, but may leave the mover's own
//! king in check; `make_move` is the legality filter. Capturing the enemy
//! king is likewise left to `make_move` to reject, so constructed positions
//! without a king do not panic the generator.

use crate::bitboard::{RANK_1, RANK_2, RANK_7, RANK_8};
use crate::board::{Board, Color, Piece};
use crate::moves::square_control::is_legal_castling;
use crate::moves::tables::Tables;
use crate::moves::types::{Move, MoveBuffer, MoveFlag};
use crate::square::Square;
use crate::utils::pop_lsb;

// Squares that must be empty between king and rook (a8 = 0 orientation).
const WHITE_KINGSIDE_BETWEEN: u64 = 0x6000_0000_0000_0000; // f1 g1
const WHITE_QUEENSIDE_BETWEEN: u64 = 0x0E00_0000_0000_0000; // b1 c1 d1
const BLACK_KINGSIDE_BETWEEN: u64 = 0x0000_0000_0000_0060; // f8 g8
const BLACK_QUEENSIDE_BETWEEN: u64 = 0x0000_0000_0000_000E; // b8 c8 d8

const PROMOS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

/// Push every target of one piece, tagging captures by enemy occupancy.
#[inline(always)]
fn push_piece_moves(from: u8, mut targets: u64, enemy: u64, move_list: &mut impl MoveBuffer) {
    while targets != 0 {
        let to = pop_lsb(&mut targets);
        let flag = if enemy >> to & 1 != 0 {
            MoveFlag::Capture
        } else {
            MoveFlag::Quiet
        };
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            flag,
        ));
    }
}

#[inline(always)]
fn push_promotions(from: u8, to: u8, capture: bool, move_list: &mut impl MoveBuffer) {
    for &promo in PROMOS.iter() {
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            MoveFlag::promotion_for(promo, capture),
        ));
    }
}

pub fn generate_pawn_moves(board: &Board, tables: &Tables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let pawns = board.pieces(Piece::Pawn, color);
    let enemy = board.opponent_occupancy(color);
    let empty = !board.occupied();

    // With a8 = 0 White pushes toward lower indices, Black toward higher.
    // (double_rank, promo_from_rank, promo_to_rank)
    let (double_rank, promo_from, promo_to) = match color {
        Color::White => (RANK_2, RANK_7, RANK_8),
        Color::Black => (RANK_7, RANK_2, RANK_1),
    };

    let forward = |bb: u64| match color {
        Color::White => bb >> 8,
        Color::Black => bb << 8,
    };
    let back_one = |to: u8| match color {
        Color::White => to + 8,
        Color::Black => to - 8,
    };

    // Quiet single pushes, promotions split off below.
    let mut single = forward(pawns) & empty & !promo_to;
    while single != 0 {
        let to = pop_lsb(&mut single);
        move_list.push(Move::new(
            Square::from_index(back_one(to)),
            Square::from_index(to),
            MoveFlag::Quiet,
        ));
    }

    // Double pushes: both intermediate and destination squares empty.
    let mut double = forward(forward(pawns & double_rank) & empty) & empty;
    while double != 0 {
        let to = pop_lsb(&mut double);
        move_list.push(Move::new(
            Square::from_index(back_one(back_one(to))),
            Square::from_index(to),
            MoveFlag::DoublePush,
        ));
    }

    // Promotion pushes: all four pieces for each destination.
    let mut promo_push = forward(pawns & promo_from) & empty;
    while promo_push != 0 {
        let to = pop_lsb(&mut promo_push);
        push_promotions(back_one(to), to, false, move_list);
    }

    // Captures, promotion captures, and en passant per source pawn.
    let mut attackers = pawns;
    while attackers != 0 {
        let from = pop_lsb(&mut attackers);
        let mut targets = tables.pawn_attacks(color, from as usize) & enemy;
        while targets != 0 {
            let to = pop_lsb(&mut targets);
            if 1u64 << to & promo_to != 0 {
                push_promotions(from, to, true, move_list);
            } else {
                move_list.push(Move::new(
                    Square::from_index(from),
                    Square::from_index(to),
                    MoveFlag::Capture,
                ));
            }
        }
    }

    if let Some(ep_sq) = board.en_passant {
        let ep = ep_sq.index();
        let victim_sq = match color {
            Color::White => ep + 8,
            Color::Black => ep - 8,
        };
        let victim_present =
            board.pieces(Piece::Pawn, color.opposite()) & (1u64 << victim_sq) != 0;
        if victim_present && empty & (1u64 << ep) != 0 {
            let mut candidates = pawns;
            while candidates != 0 {
                let from = pop_lsb(&mut candidates);
                if tables.pawn_attacks(color, from as usize) & (1u64 << ep) != 0 {
                    move_list.push(Move::new(
                        Square::from_index(from),
                        ep_sq,
                        MoveFlag::EnPassant,
                    ));
                }
            }
        }
    }
}

pub fn generate_knight_moves(board: &Board, tables: &Tables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy = board.opponent_occupancy(color);

    let mut bb = board.pieces(Piece::Knight, color);
    while bb != 0 {
        let from = pop_lsb(&mut bb);
        let targets = tables.knight_attacks(from as usize) & !friendly;
        push_piece_moves(from, targets, enemy, move_list);
    }
}

pub fn generate_bishop_moves(board: &Board, tables: &Tables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy = board.opponent_occupancy(color);
    let blockers = board.occupied();

    let mut bb = board.pieces(Piece::Bishop, color);
    while bb != 0 {
        let from = pop_lsb(&mut bb);
        let targets = tables.bishop_attacks(from as usize, blockers) & !friendly;
        push_piece_moves(from, targets, enemy, move_list);
    }
}

pub fn generate_rook_moves(board: &Board, tables: &Tables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy = board.opponent_occupancy(color);
    let blockers = board.occupied();

    let mut bb = board.pieces(Piece::Rook, color);
    while bb != 0 {
        let from = pop_lsb(&mut bb);
        let targets = tables.rook_attacks(from as usize, blockers) & !friendly;
        push_piece_moves(from, targets, enemy, move_list);
    }
}

pub fn generate_queen_moves(board: &Board, tables: &Tables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy = board.opponent_occupancy(color);
    let blockers = board.occupied();

    let mut bb = board.pieces(Piece::Queen, color);
    while bb != 0 {
        let from = pop_lsb(&mut bb);
        let targets = tables.queen_attacks(from as usize, blockers) & !friendly;
        push_piece_moves(from, targets, enemy, move_list);
    }
}

pub fn generate_king_moves(board: &Board, tables: &Tables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let king_bb = board.pieces(Piece::King, color);
    if king_bb == 0 {
        return; // constructed positions without a king
    }

    let from = king_bb.trailing_zeros() as u8;
    let friendly = board.occupancy(color);
    let enemy = board.opponent_occupancy(color);

    let targets = tables.king_attacks(from as usize) & !friendly;
    push_piece_moves(from, targets, enemy, move_list);

    let occ = board.occupied();
    let (home, kingside_between, queenside_between) = match color {
        Color::White => (60u8, WHITE_KINGSIDE_BETWEEN, WHITE_QUEENSIDE_BETWEEN), // e1
        Color::Black => (4u8, BLACK_KINGSIDE_BETWEEN, BLACK_QUEENSIDE_BETWEEN),  // e8
    };
    if from != home {
        return; // rights without a king on its home square: corrupt setup
    }

    if board.has_kingside_castle(color) && occ & kingside_between == 0 {
        let mv = Move::new(
            Square::from_index(from),
            Square::from_index(from + 2),
            MoveFlag::KingsideCastle,
        );
        if is_legal_castling(board, mv, tables) {
            move_list.push(mv);
        }
    }

    if board.has_queenside_castle(color) && occ & queenside_between == 0 {
        let mv = Move::new(
            Square::from_index(from),
            Square::from_index(from - 2),
            MoveFlag::QueensideCastle,
        );
        if is_legal_castling(board, mv, tables) {
            move_list.push(mv);
        }
    }
}

/// All pseudo-legal moves for the side to move.
pub fn generate_pseudo_legal(board: &Board, tables: &Tables, moves: &mut impl MoveBuffer) {
    moves.clear();
    generate_pawn_moves(board, tables, moves);
    generate_knight_moves(board, tables, moves);
    generate_bishop_moves(board, tables, moves);
    generate_rook_moves(board, tables, moves);
    generate_queen_moves(board, tables, moves);
    generate_king_moves(board, tables, moves);
}
