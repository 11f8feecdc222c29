//! Perft, the ground-truth oracle for the generator and the make/unmake
//! pair: `perft(0) = 1`, otherwise the sum of `perft(depth - 1)` over every
//! pseudo-legal move that `make_move` accepts.

use crate::board::Board;
use crate::moves::execute::{make_move, unmake_move};
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::tables::Tables;
use crate::moves::types::MoveList;
use tracing::{debug, instrument};

fn perft_inner(board: &mut Board, tables: &Tables, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut moves = MoveList::new();
    generate_pseudo_legal(board, tables, &mut moves);

    let mut nodes = 0;
    for mv in moves.iter().copied() {
        if let Some(undo) = make_move(board, tables, mv) {
            nodes += perft_inner(board, tables, depth - 1);
            unmake_move(board, undo);
        }
    }
    nodes
}

#[instrument(skip(board, tables))]
pub fn perft(board: &mut Board, tables: &Tables, depth: u32) -> u64 {
    let nodes = perft_inner(board, tables, depth);
    debug!(nodes, "perft complete");
    nodes
}

/// Per-root-move node counts, the standard tool for diffing a generator
/// against a known-good engine.
#[instrument(skip(board, tables))]
pub fn perft_divide(board: &mut Board, tables: &Tables, depth: u32) -> Vec<(String, u64)> {
    let mut moves = MoveList::new();
    generate_pseudo_legal(board, tables, &mut moves);

    let mut results = Vec::new();
    for mv in moves.iter().copied() {
        if let Some(undo) = make_move(board, tables, mv) {
            let nodes = if depth == 0 {
                1
            } else {
                perft_inner(board, tables, depth - 1)
            };
            unmake_move(board, undo);
            debug!(mv = %mv, nodes, "divide");
            results.push((mv.to_uci(), nodes));
        }
    }
    results
}
