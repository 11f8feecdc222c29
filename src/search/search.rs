//! Negamax alpha-beta search with quiescence extension, MVV/LVA ordering,
//! null-move pruning, and iterative deepening driven by a wall-clock
//! budget. Time-out is signalled by a reserved sentinel score that
//! propagates upward unchanged; every `make_move` on the path is paired
//! with an `unmake_move` on every return, so cancellation needs no cleanup.

use crate::board::Board;
use crate::moves::execute::{make_move, make_null_move, undo_null_move, unmake_move};
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::square_control::in_check;
use crate::moves::tables::Tables;
use crate::moves::types::{Move, MoveList};
use crate::search::eval::{evaluate, is_endgame};
use crate::search::ordering::order_moves;
use crate::search::tt::{NodeType, TranspositionTable};
use std::time::{Duration, Instant};

pub const MATE: i32 = 32000;
pub const MAX_PLY: i32 = 128;
/// Scores at or beyond this magnitude are forced mates.
pub const MATE_THRESHOLD: i32 = MATE - MAX_PLY;
/// Reserved sentinel, far outside the mate range, returned on time-out.
pub const TIMEOUT: i32 = 1_000_000;

pub const MAX_DEPTH: i32 = 64;

const NULL_MOVE_REDUCTION: i32 = 2;
/// Poll the clock every 64 nodes.
const TIME_POLL_MASK: u64 = 63;

/// Wall-clock budget for one `go`. A pure predicate: once the budget
/// elapses, `timed_out` stays true.
pub struct TimeManager {
    start: Instant,
    limit: Option<Duration>,
}

impl TimeManager {
    pub fn new(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    #[inline(always)]
    pub fn timed_out(&self) -> bool {
        self.limit.is_some_and(|limit| self.start.elapsed() >= limit)
    }

    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Mate scores are stored in the table relative to the probing node, not
/// the root, so a "mate in N from here" entry stays valid wherever it is
/// found again.
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Whether the side to move has any legal reply at all.
fn has_any_legal_move(board: &mut Board, tables: &Tables) -> bool {
    let mut moves = MoveList::new();
    generate_pseudo_legal(board, tables, &mut moves);
    for mv in moves.iter().copied() {
        if let Some(undo) = make_move(board, tables, mv) {
            unmake_move(board, undo);
            return true;
        }
    }
    false
}

/// Quiescence: stand pat on the static evaluation, then extend only along
/// captures and promotions to settle the horizon.
pub fn quiescence(
    board: &mut Board,
    tables: &Tables,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    nodes: &mut u64,
    time: &TimeManager,
) -> i32 {
    *nodes += 1;
    if *nodes & TIME_POLL_MASK == 0 && time.timed_out() {
        return TIMEOUT;
    }

    let stand_pat = evaluate(board, tables);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut moves = MoveList::new();
    generate_pseudo_legal(board, tables, &mut moves);
    order_moves(&mut moves, board, None);

    for mv in moves.iter().copied() {
        if !mv.is_capture() && !mv.is_promotion() {
            continue;
        }
        let Some(undo) = make_move(board, tables, mv) else {
            continue;
        };
        let child = quiescence(board, tables, ply + 1, -beta, -alpha, nodes, time);
        unmake_move(board, undo);
        if child == TIMEOUT {
            return TIMEOUT;
        }
        let score = -child;

        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

#[allow(clippy::too_many_arguments)]
pub fn negamax(
    board: &mut Board,
    tables: &Tables,
    tt: &mut TranspositionTable,
    depth: i32,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    nodes: &mut u64,
    time: &TimeManager,
) -> (i32, Option<Move>) {
    *nodes += 1;
    if *nodes & TIME_POLL_MASK == 0 && time.timed_out() {
        return (TIMEOUT, None);
    }

    let key = board.zobrist;

    // Probe the table. A deep-enough entry answers directly per its node
    // type; a shallower one still seeds move ordering. The root never
    // returns from the table so a best move is always re-established.
    let mut hash_move = None;
    if let Some(&entry) = tt.probe(key) {
        hash_move = entry.best_move;
        if ply > 0 && entry.depth as i32 >= depth {
            let score = score_from_tt(entry.score as i32, ply);
            let usable = match entry.node_type {
                NodeType::Pv => true,
                NodeType::Cut => score >= beta,
                NodeType::All => score <= alpha,
            };
            if usable {
                return (score, entry.best_move);
            }
        }
    }

    let side = board.side_to_move;
    let in_check_now = !board.has_king(side) || in_check(board, side, tables);

    if depth <= 0 {
        // A horizon node with no legal reply is mate or stalemate, not a
        // quiescence stand-pat.
        if !has_any_legal_move(board, tables) {
            let score = if in_check_now { -MATE + ply } else { 0 };
            return (score, None);
        }
        return (
            quiescence(board, tables, ply, alpha, beta, nodes, time),
            None,
        );
    }

    // Null move: hand the opponent a free tempo and search reduced with a
    // null window; a fail-high proves beta would fall anyway. Unsound in
    // check and in the endgame phase (zugzwang).
    if depth >= 3 && !in_check_now && !is_endgame(board) {
        let undo = make_null_move(board);
        let (child, _) = negamax(
            board,
            tables,
            tt,
            depth - 1 - NULL_MOVE_REDUCTION,
            ply + 1,
            -beta,
            -beta + 1,
            nodes,
            time,
        );
        undo_null_move(board, undo);
        if child == TIMEOUT {
            return (TIMEOUT, None);
        }
        if -child >= beta {
            return (beta, None);
        }
    }

    let mut moves = MoveList::new();
    generate_pseudo_legal(board, tables, &mut moves);
    order_moves(&mut moves, board, hash_move);

    let original_alpha = alpha;
    let mut best_move = None;
    let mut legal_moves = 0;

    for mv in moves.iter().copied() {
        let Some(undo) = make_move(board, tables, mv) else {
            continue;
        };
        legal_moves += 1;

        let (child, _) = negamax(
            board,
            tables,
            tt,
            depth - 1,
            ply + 1,
            -beta,
            -alpha,
            nodes,
            time,
        );
        unmake_move(board, undo);
        if child == TIMEOUT {
            return (TIMEOUT, None);
        }
        let score = -child;

        if score >= beta {
            tt.save(key, Some(mv), score_to_tt(beta, ply), depth as u8, NodeType::Cut);
            return (beta, Some(mv));
        }
        if score > alpha {
            alpha = score;
            best_move = Some(mv);
        }
    }

    if legal_moves == 0 {
        let score = if in_check_now { -MATE + ply } else { 0 };
        tt.save(key, None, score_to_tt(score, ply), depth as u8, NodeType::Pv);
        return (score, None);
    }

    let node_type = if alpha > original_alpha {
        NodeType::Pv
    } else {
        NodeType::All
    };
    tt.save(key, best_move, score_to_tt(alpha, ply), depth as u8, node_type);

    (alpha, best_move)
}

fn format_score(score: i32) -> String {
    if score.abs() >= MATE_THRESHOLD {
        let moves = (MATE - score.abs() + 1) / 2;
        if score > 0 {
            format!("mate {}", moves)
        } else {
            format!("mate -{}", moves)
        }
    } else {
        format!("cp {}", score)
    }
}

/// Iterative deepening: search depth 1, 2, 3, .. until the budget elapses,
/// keeping the best move of the deepest *completed* iteration.
pub fn search(
    board: &mut Board,
    tables: &Tables,
    tt: &mut TranspositionTable,
    max_depth: i32,
    time_limit: Option<Duration>,
) -> (i32, Option<Move>) {
    let time = TimeManager::new(time_limit);
    let mut nodes: u64 = 0;
    let mut best_score = 0;
    let mut best_move = None;

    for depth in 1..=max_depth.min(MAX_DEPTH) {
        let (score, mv) = negamax(board, tables, tt, depth, 0, -MATE, MATE, &mut nodes, &time);
        if score == TIMEOUT {
            break;
        }
        best_score = score;
        best_move = mv;

        if let Some(mv) = best_move {
            println!(
                "info depth {} score {} nodes {} time {} pv {}",
                depth,
                format_score(best_score),
                nodes,
                time.elapsed().as_millis(),
                mv.to_uci()
            );
        }

        // A forced mate does not improve with depth.
        if best_score.abs() >= MATE_THRESHOLD {
            break;
        }
        if time.timed_out() {
            break;
        }
    }

    (best_score, best_move)
}
