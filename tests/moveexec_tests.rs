//! Make/unmake behavior: capture bookkeeping, the implicit rook transfer,
//! promotions, castling-rights erosion, clock updates, and rejection of
//! king-unsafe moves with no visible state change.

use riptide::board::castle_bits::*;
use riptide::board::{Board, Color, Piece};
use riptide::moves::execute::{generate_legal, make_move, unmake_move};
use riptide::moves::movegen::generate_pseudo_legal;
use riptide::moves::tables::Tables;
use riptide::moves::types::{Move, MoveFlag, MoveList};
use riptide::square::Square;
use std::str::FromStr;

fn find_move(board: &Board, tables: &Tables, uci: &str) -> Move {
    let mut moves = MoveList::new();
    generate_pseudo_legal(board, tables, &mut moves);
    moves
        .iter()
        .copied()
        .find(|m| m.to_uci() == uci)
        .unwrap_or_else(|| panic!("move {} not generated for {}", uci, board.to_fen()))
}

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

#[test]
fn quiet_move_keeps_occupancy_invariants() {
    let tables = Tables::new();
    let mut board = Board::new();
    let mv = find_move(&board, &tables, "g1f3");
    make_move(&mut board, &tables, mv).unwrap();

    assert!(board.validate().is_ok());
    assert_eq!(board.piece_at(sq("f3")), Some((Color::White, Piece::Knight)));
    assert_eq!(board.piece_at(sq("g1")), None);
    assert_eq!(board.side_to_move, Color::Black);
    assert_eq!(board.halfmove_clock, 1);
    assert_eq!(board.fullmove_number, 1);
}

#[test]
fn capture_removes_victim_and_resets_clock() {
    let tables = Tables::new();
    let mut board =
        Board::from_str("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 5 2").unwrap();
    let before = board.clone();
    let mv = find_move(&board, &tables, "e4d5");
    assert_eq!(mv.flag(), MoveFlag::Capture);

    let undo = make_move(&mut board, &tables, mv).unwrap();
    assert_eq!(board.piece_at(sq("d5")), Some((Color::White, Piece::Pawn)));
    assert_eq!(board.bb(Color::Black, Piece::Pawn).count_ones(), 7);
    assert_eq!(board.halfmove_clock, 0);
    assert!(board.validate().is_ok());

    unmake_move(&mut board, undo);
    assert_eq!(board, before);
}

#[test]
fn kingside_castle_transfers_the_rook() {
    let tables = Tables::new();
    let mut board = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let mv = find_move(&board, &tables, "e1g1");
    assert_eq!(mv.flag(), MoveFlag::KingsideCastle);

    make_move(&mut board, &tables, mv).unwrap();
    assert_eq!(board.piece_at(sq("g1")), Some((Color::White, Piece::King)));
    assert_eq!(board.piece_at(sq("f1")), Some((Color::White, Piece::Rook)));
    assert_eq!(board.piece_at(sq("h1")), None);
    assert_eq!(board.piece_at(sq("e1")), None);
    // both white rights fall; black's are untouched
    assert_eq!(board.castling_rights, CASTLE_BK | CASTLE_BQ);
}

#[test]
fn queenside_castle_transfers_the_rook() {
    let tables = Tables::new();
    let mut board = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
    let mv = find_move(&board, &tables, "e8c8");
    assert_eq!(mv.flag(), MoveFlag::QueensideCastle);

    make_move(&mut board, &tables, mv).unwrap();
    assert_eq!(board.piece_at(sq("c8")), Some((Color::Black, Piece::King)));
    assert_eq!(board.piece_at(sq("d8")), Some((Color::Black, Piece::Rook)));
    assert_eq!(board.piece_at(sq("a8")), None);
    assert_eq!(board.castling_rights, CASTLE_WK | CASTLE_WQ);
}

#[test]
fn rook_move_drops_one_wing_only() {
    let tables = Tables::new();
    let mut board = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let mv = find_move(&board, &tables, "h1g1");
    make_move(&mut board, &tables, mv).unwrap();
    assert_eq!(board.castling_rights, CASTLE_WQ | CASTLE_BK | CASTLE_BQ);
}

#[test]
fn capturing_a_corner_rook_clears_the_opponents_right() {
    let tables = Tables::new();
    // white rook a1 can take the a8 rook along the open file
    let mut board = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let mv = find_move(&board, &tables, "a1a8");
    make_move(&mut board, &tables, mv).unwrap();
    // white loses queenside (rook left a1), black loses queenside (rook died on a8)
    assert_eq!(board.castling_rights, CASTLE_WK | CASTLE_BK);
}

#[test]
fn promotion_replaces_the_pawn() {
    let tables = Tables::new();
    let mut board = Board::from_str("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let before = board.clone();

    let mut moves = MoveList::new();
    generate_pseudo_legal(&board, &tables, &mut moves);
    let promos: Vec<Move> = moves.iter().copied().filter(|m| m.is_promotion()).collect();
    assert_eq!(promos.len(), 4, "all four promotion pieces must be offered");

    for mv in promos {
        let undo = make_move(&mut board, &tables, mv).unwrap();
        let promoted = mv.promotion_piece().unwrap();
        assert_eq!(board.piece_at(sq("a8")), Some((Color::White, promoted)));
        assert_eq!(board.bb(Color::White, Piece::Pawn), 0);
        assert_eq!(board.halfmove_clock, 0);
        unmake_move(&mut board, undo);
        assert_eq!(board, before);
    }
}

#[test]
fn promotion_capture_handles_both_pieces() {
    let tables = Tables::new();
    let mut board = Board::from_str("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let mv = find_move(&board, &tables, "a7b8q");
    make_move(&mut board, &tables, mv).unwrap();
    assert_eq!(board.piece_at(sq("b8")), Some((Color::White, Piece::Queen)));
    assert_eq!(board.bb(Color::Black, Piece::Knight), 0);
    assert!(board.validate().is_ok());
}

#[test]
fn fullmove_counter_ticks_after_black() {
    let tables = Tables::new();
    let mut board = Board::new();
    let mv = find_move(&board, &tables, "e2e4");
    make_move(&mut board, &tables, mv).unwrap();
    assert_eq!(board.fullmove_number, 1);
    let mv = find_move(&board, &tables, "e7e5");
    make_move(&mut board, &tables, mv).unwrap();
    assert_eq!(board.fullmove_number, 2);
}

#[test]
fn moving_a_pinned_piece_is_rejected_without_side_effects() {
    let tables = Tables::new();
    // the d2 knight is pinned to the d1 king by the d8 rook
    let mut board = Board::from_str("3rk3/8/8/8/8/8/3N4/3K4 w - - 0 1").unwrap();

    // find_move proves the generator emits the pinned-piece move anyway
    let before = board.clone();
    let mv = find_move(&board, &tables, "d2c4");
    assert!(make_move(&mut board, &tables, mv).is_none());
    assert_eq!(board, before, "rejected make must leave no trace");
}

#[test]
fn make_fails_on_empty_source_square() {
    let tables = Tables::new();
    let mut board = Board::new();
    let before = board.clone();
    let bogus = Move::new(sq("e4"), sq("e5"), MoveFlag::Quiet);
    assert!(make_move(&mut board, &tables, bogus).is_none());
    assert_eq!(board, before);
}

#[test]
fn legal_filter_only_drops_king_safety_violations() {
    let tables = Tables::new();
    // white king in check from the e5 rook: legal replies must all resolve it
    let mut board = Board::from_str("4k3/8/8/4r3/8/8/8/4K1R1 w - - 0 1").unwrap();
    assert!(riptide::moves::square_control::in_check(
        &board,
        Color::White,
        &tables
    ));

    let mut legal = MoveList::new();
    generate_legal(&mut board, &tables, &mut legal);
    assert!(!legal.is_empty());
    for mv in legal.iter().copied() {
        let undo = make_move(&mut board, &tables, mv).expect("filtered move must make");
        unmake_move(&mut board, undo);
    }
}

#[test]
fn wrong_side_piece_is_rejected() {
    let tables = Tables::new();
    let mut board = Board::new(); // white to move
    let bogus = Move::new(sq("e7"), sq("e5"), MoveFlag::Quiet);
    let before = board.clone();
    assert!(make_move(&mut board, &tables, bogus).is_none());
    assert_eq!(board, before);
}
