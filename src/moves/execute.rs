//! Making and unmaking moves. `make_move` applies a pseudo-legal move,
//! maintaining every redundant view (occupancies, square table, Zobrist key)
//! incrementally, and rejects the move after the fact when it leaves the
//! mover's own king attacked. The undo record is a verbatim snapshot taken
//! before any mutation, so `unmake_move` is a plain restore and the pair is
//! lossless by construction.

use crate::board::castle_bits::*;
use crate::board::{Board, Color, Piece};
use crate::hash::zobrist::{xor_castling_rights_delta, zobrist_keys};
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::square_control::in_check;
use crate::moves::tables::Tables;
use crate::moves::types::{Move, MoveBuffer, MoveList, NullUndo, Undo};
use crate::square::Square;

fn snapshot(board: &Board) -> Undo {
    Undo {
        piece_bb: board.piece_bb,
        occ_white: board.occ_white,
        occ_black: board.occ_black,
        occ_all: board.occ_all,
        piece_on_sq: board.piece_on_sq,
        side_to_move: board.side_to_move,
        castling_rights: board.castling_rights,
        en_passant: board.en_passant,
        halfmove_clock: board.halfmove_clock,
        fullmove_number: board.fullmove_number,
        zobrist: board.zobrist,
    }
}

fn restore(board: &mut Board, undo: &Undo) {
    board.piece_bb = undo.piece_bb;
    board.occ_white = undo.occ_white;
    board.occ_black = undo.occ_black;
    board.occ_all = undo.occ_all;
    board.piece_on_sq = undo.piece_on_sq;
    board.side_to_move = undo.side_to_move;
    board.castling_rights = undo.castling_rights;
    board.en_passant = undo.en_passant;
    board.halfmove_clock = undo.halfmove_clock;
    board.fullmove_number = undo.fullmove_number;
    board.zobrist = undo.zobrist;
}

/// Fixed rook transfer for a castle, keyed by color and wing.
#[inline(always)]
fn castle_rook_squares(color: Color, kingside: bool) -> (Square, Square) {
    let (from, to) = match (color, kingside) {
        (Color::White, true) => (63, 61),  // h1 -> f1
        (Color::White, false) => (56, 59), // a1 -> d1
        (Color::Black, true) => (7, 5),    // h8 -> f8
        (Color::Black, false) => (0, 3),   // a8 -> d8
    };
    (Square::from_index(from), Square::from_index(to))
}

/// Castling right lost when a rook leaves (or is captured on) `sq`.
#[inline(always)]
fn rights_for_rook_square(color: Color, sq: Square) -> u8 {
    match (color, sq.index()) {
        (Color::White, 63) => CASTLE_WK,
        (Color::White, 56) => CASTLE_WQ,
        (Color::Black, 7) => CASTLE_BK,
        (Color::Black, 0) => CASTLE_BQ,
        _ => 0,
    }
}

/// Apply `mv`. Returns the undo snapshot on success; returns `None` (with
/// no visible state change) when the source square is empty, the piece
/// belongs to the wrong side, or the move leaves the mover's king attacked.
/// A position missing either king is treated as illegal here, never in the
/// generator.
pub fn make_move(board: &mut Board, tables: &Tables, mv: Move) -> Option<Undo> {
    let from = mv.source();
    let to = mv.target();

    let (color, piece) = board.piece_at(from)?;
    if color != board.side_to_move {
        return None;
    }

    let undo = snapshot(board);
    let keys = zobrist_keys();

    // Capture on the target square (en passant removes its pawn below).
    let captured = board.piece_at(to);
    if let Some((vic_color, vic_piece)) = captured {
        board.take_piece(vic_color, vic_piece, to);
    }

    // Move the piece; a promotion lands the promoted kind directly.
    board.take_piece(color, piece, from);
    match mv.promotion_piece() {
        Some(promo) => board.put_piece(color, promo, to),
        None => board.put_piece(color, piece, to),
    }

    if mv.is_en_passant() {
        let victim_sq = match color {
            Color::White => Square::from_index(to.index() + 8),
            Color::Black => Square::from_index(to.index() - 8),
        };
        board.take_piece(color.opposite(), Piece::Pawn, victim_sq);
    }

    // The rook transfer is implicit in the king's castle flag.
    if mv.is_castling() {
        let (rook_from, rook_to) = castle_rook_squares(color, mv.is_kingside_castle());
        board.take_piece(color, Piece::Rook, rook_from);
        board.put_piece(color, Piece::Rook, rook_to);
    }

    // Castling rights: a king move clears both of the mover's rights, a
    // rook move from its corner clears one wing, and capturing a rook on
    // its corner clears the opponent's wing. The hash delta is two XORs,
    // old mask out and new mask in, cancelling when nothing changed.
    let old_rights = board.castling_rights;
    let mut lost = 0u8;
    if piece == Piece::King {
        lost |= match color {
            Color::White => CASTLE_WK | CASTLE_WQ,
            Color::Black => CASTLE_BK | CASTLE_BQ,
        };
    }
    if piece == Piece::Rook {
        lost |= rights_for_rook_square(color, from);
    }
    if let Some((vic_color, Piece::Rook)) = captured {
        lost |= rights_for_rook_square(vic_color, to);
    }
    let new_rights = old_rights & !lost;
    board.castling_rights = new_rights;
    xor_castling_rights_delta(&mut board.zobrist, keys, old_rights, new_rights);

    // En-passant target: old file out of the hash, new file in.
    if let Some(ep) = board.en_passant {
        board.zobrist ^= keys.ep_file[ep.file() as usize];
    }
    board.en_passant = if mv.is_double_push() {
        Some(match color {
            Color::White => Square::from_index(from.index() - 8),
            Color::Black => Square::from_index(from.index() + 8),
        })
    } else {
        None
    };
    if let Some(ep) = board.en_passant {
        board.zobrist ^= keys.ep_file[ep.file() as usize];
    }

    if color == Color::Black {
        board.fullmove_number += 1;
    }
    if piece == Piece::Pawn || mv.is_capture() {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock += 1;
    }

    board.side_to_move = color.opposite();
    board.zobrist ^= keys.side_to_move;

    // Legality: the mover's king may not be left attacked, and both kings
    // must still be on the board (a king capture got this far only from an
    // already-illegal constructed position).
    let illegal = !board.has_king(Color::White)
        || !board.has_king(Color::Black)
        || in_check(board, color, tables);
    if illegal {
        restore(board, &undo);
        return None;
    }

    #[cfg(debug_assertions)]
    board.assert_hash();

    Some(undo)
}

/// Restore the snapshot taken by the matching `make_move`, Zobrist key and
/// clocks included.
pub fn unmake_move(board: &mut Board, undo: Undo) {
    restore(board, &undo);
}

/// Pass the turn: toggle side to move and clear the en-passant target. A
/// stale target must not stay in the hash across a null move, because the
/// opponent cannot capture into it without a pawn having just pushed.
pub fn make_null_move(board: &mut Board) -> NullUndo {
    let keys = zobrist_keys();
    let undo = NullUndo {
        prev_en_passant: board.en_passant,
        prev_zobrist: board.zobrist,
    };

    if let Some(ep) = board.en_passant.take() {
        board.zobrist ^= keys.ep_file[ep.file() as usize];
    }
    board.side_to_move = board.side_to_move.opposite();
    board.zobrist ^= keys.side_to_move;

    undo
}

pub fn undo_null_move(board: &mut Board, undo: NullUndo) {
    board.side_to_move = board.side_to_move.opposite();
    board.en_passant = undo.prev_en_passant;
    board.zobrist = undo.prev_zobrist;
}

/// True iff the pseudo-legal `mv` survives the king-safety filter.
#[inline]
pub fn is_legal_move(board: &mut Board, tables: &Tables, mv: Move) -> bool {
    match make_move(board, tables, mv) {
        Some(undo) => {
            unmake_move(board, undo);
            true
        }
        None => false,
    }
}

/// Fully legal moves for the side to move, filtered through make/unmake.
pub fn generate_legal(board: &mut Board, tables: &Tables, moves: &mut impl MoveBuffer) {
    let mut pseudo = MoveList::new();
    generate_pseudo_legal(board, tables, &mut pseudo);

    moves.clear();
    for mv in pseudo.iter().copied() {
        if is_legal_move(board, tables, mv) {
            moves.push(mv);
        }
    }
}
