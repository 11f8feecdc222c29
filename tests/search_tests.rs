//! Search behavior: mate detection and scoring, stalemate, determinism,
//! and the time-budget contract of iterative deepening.

use riptide::engine::Engine;
use riptide::search::search::{MATE, MATE_THRESHOLD};
use std::time::Instant;

fn engine_at(fen: &str) -> Engine {
    let mut engine = Engine::with_tt_size(8);
    engine.set_position(fen).expect("valid FEN");
    engine
}

#[test]
fn finds_back_rank_mate_in_one() {
    // 1.Ra8# - the f7/g7/h7 pawns box their own king in
    let mut engine = engine_at("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1");
    let (score, mv) = engine.go_depth(3);
    assert_eq!(mv.expect("a mate must be found").to_uci(), "a1a8");
    assert_eq!(score, MATE - 1, "mate in one scores MATE - 1");
}

#[test]
fn finds_mate_for_black_too() {
    // any rook slide along the first rank keeps the g1 king boxed in
    let mut engine = engine_at("4k3/8/8/8/8/8/5PPP/r5K1 b - - 0 1");
    let (score, mv) = engine.go_depth(3);
    let mv = mv.expect("a mate must be found").to_uci();
    assert!(
        ["a1b1", "a1c1", "a1d1", "a1e1"].contains(&mv.as_str()),
        "expected a back-rank mate, got {}",
        mv
    );
    assert!(score >= MATE_THRESHOLD);
}

#[test]
fn mate_score_does_not_deepen_away() {
    // the shallowest mate keeps its score when searched deeper
    let mut engine = engine_at("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1");
    let (score, _) = engine.go_depth(6);
    assert_eq!(score, MATE - 1);
}

#[test]
fn stalemate_scores_zero_with_no_move() {
    // black to move, not in check, no legal move
    let mut engine = engine_at("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    let (score, mv) = engine.go_depth(4);
    assert_eq!(score, 0);
    assert_eq!(mv, None);
}

#[test]
fn checkmated_root_reports_mate_and_no_move() {
    // black is already mated in the corner by the two rooks
    let mut engine = engine_at("R6k/1R6/8/8/8/8/8/K7 b - - 0 1");
    let (score, mv) = engine.go_depth(3);
    assert_eq!(score, -MATE);
    assert_eq!(mv, None);
}

// Concrete scenario: a lost-but-live ending must still resolve to a move.
#[test]
fn go_resolves_a_move_in_a_lost_position() {
    let mut engine = engine_at("5Q2/8/4K3/6r1/8/4k3/8/8 b - - 0 67");
    let mv = engine.go(250);
    assert!(mv.is_some(), "go must produce a move while legal moves exist");
}

#[test]
fn fixed_depth_search_is_reproducible() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let (score_a, mv_a) = engine_at(fen).go_depth(4);
    let (score_b, mv_b) = engine_at(fen).go_depth(4);
    assert_eq!(score_a, score_b);
    assert_eq!(mv_a, mv_b);
}

#[test]
fn search_respects_its_time_budget() {
    let mut engine =
        engine_at("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    let start = Instant::now();
    let mv = engine.go(150);
    let elapsed = start.elapsed();
    assert!(mv.is_some());
    // hard stop plus one polling interval of slack
    assert!(
        elapsed.as_millis() < 2_000,
        "search overran its budget: {:?}",
        elapsed
    );
}

#[test]
fn search_takes_a_hanging_queen() {
    let mut engine = engine_at("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
    let (score, mv) = engine.go_depth(4);
    assert_eq!(mv.unwrap().to_uci(), "e4d5");
    // from a queen down to a pawn up
    assert!(score > 0, "winning the queen should show in the score: {}", score);
}
