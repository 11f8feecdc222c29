//! The engine facade handed to the UCI driver: one value owning the
//! position, the attack tables, and the transposition table, exposing the
//! handful of operations the protocol loop needs.

use crate::board::{Board, Piece};
use crate::moves::execute::make_move;
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::perft::perft;
use crate::moves::tables::Tables;
use crate::moves::types::{Move, MoveList};
use crate::search::search::{MAX_DEPTH, search};
use crate::search::tt::TranspositionTable;
use std::time::Duration;

const DEFAULT_TT_MB: usize = 64;

pub struct Engine {
    board: Board,
    tables: Tables,
    tt: TranspositionTable,
}

impl Engine {
    /// Build an engine with freshly initialized attack tables and an empty
    /// transposition table, sitting on the starting position.
    pub fn new() -> Self {
        Engine::with_tt_size(DEFAULT_TT_MB)
    }

    pub fn with_tt_size(tt_mb: usize) -> Self {
        Engine {
            board: Board::new(),
            tables: Tables::new(),
            tt: TranspositionTable::new(tt_mb),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Reset to the starting position and drop cached search results.
    pub fn new_game(&mut self) {
        self.board = Board::new();
        self.tt.clear();
    }

    /// Reset the position from a FEN string; on error the previous
    /// position is kept.
    pub fn set_position(&mut self, fen: &str) -> Result<(), String> {
        let mut board = Board::new_empty();
        board.set_fen(fen)?;
        self.board = board;
        Ok(())
    }

    /// Resolve UCI move text ("e2e4", "e7e8q") against the generator and
    /// apply it. Text that does not name a legal move for the current side
    /// is rejected without state change.
    pub fn play(&mut self, move_text: &str) -> Result<(), String> {
        let mv = self.parse_move(move_text)?;
        match make_move(&mut self.board, &self.tables, mv) {
            Some(_) => Ok(()),
            None => Err(format!("illegal move: {}", move_text)),
        }
    }

    fn parse_move(&self, move_text: &str) -> Result<Move, String> {
        if !move_text.is_ascii() || move_text.len() < 4 || move_text.len() > 5 {
            return Err(format!("bad move text: {}", move_text));
        }
        let source = move_text[0..2].parse()?;
        let target = move_text[2..4].parse()?;
        let promo = match move_text.as_bytes().get(4) {
            None => None,
            Some(b'n') => Some(Piece::Knight),
            Some(b'b') => Some(Piece::Bishop),
            Some(b'r') => Some(Piece::Rook),
            Some(b'q') => Some(Piece::Queen),
            Some(&c) => return Err(format!("bad promotion letter: {}", c as char)),
        };

        let mut moves = MoveList::new();
        generate_pseudo_legal(&self.board, &self.tables, &mut moves);
        moves
            .iter()
            .copied()
            .find(|mv| {
                mv.source() == source && mv.target() == target && mv.promotion_piece() == promo
            })
            .ok_or_else(|| format!("no such move: {}", move_text))
    }

    /// Iterative-deepening search under a millisecond budget. Returns the
    /// best move of the deepest completed iteration, or None when the side
    /// to move has no legal move.
    pub fn go(&mut self, budget_ms: u64) -> Option<Move> {
        let (_, mv) = search(
            &mut self.board,
            &self.tables,
            &mut self.tt,
            MAX_DEPTH,
            Some(Duration::from_millis(budget_ms)),
        );
        mv
    }

    /// Fixed-depth search with no clock, for analysis and tests.
    pub fn go_depth(&mut self, depth: i32) -> (i32, Option<Move>) {
        search(&mut self.board, &self.tables, &mut self.tt, depth, None)
    }

    pub fn perft(&mut self, depth: u32) -> u64 {
        perft(&mut self.board, &self.tables, depth)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}
