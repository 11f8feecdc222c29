//! FEN parsing and printing. This is a boundary helper for the UCI driver
//! and tests; the core never round-trips through text internally.

use crate::board::castle_bits::*;
use crate::board::{Board, Color, EMPTY_SQ, Piece};
use crate::square::Square;

fn piece_from_char(c: char) -> Option<(Color, Piece)> {
    let piece = match c.to_ascii_lowercase() {
        'p' => Piece::Pawn,
        'n' => Piece::Knight,
        'b' => Piece::Bishop,
        'r' => Piece::Rook,
        'q' => Piece::Queen,
        'k' => Piece::King,
        _ => return None,
    };
    let color = if c.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    Some((color, piece))
}

fn piece_to_char(color: Color, piece: Piece) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match color {
        Color::White => c.to_ascii_uppercase(),
        Color::Black => c,
    }
}

impl Board {
    /// Reset the position from a FEN string. On success every invariant
    /// (occupancies, square table, Zobrist key) holds; on error the board
    /// contents are unspecified and the caller should not use them.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or("empty FEN")?;
        let side = fields.next().ok_or("FEN missing side to move")?;
        let castling = fields.next().ok_or("FEN missing castling rights")?;
        let en_passant = fields.next().ok_or("FEN missing en-passant square")?;
        // Clock fields are optional; position-only FENs are common in tests.
        let halfmove = fields.next().unwrap_or("0");
        let fullmove = fields.next().unwrap_or("1");

        self.piece_bb = [[0u64; 6]; 2];
        self.occ_white = 0;
        self.occ_black = 0;
        self.occ_all = 0;
        self.piece_on_sq = [EMPTY_SQ; 64];

        let mut row: u8 = 0;
        for rank_str in placement.split('/') {
            if row >= 8 {
                return Err("FEN has more than 8 ranks".into());
            }
            let mut file: u8 = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                } else {
                    let (color, piece) =
                        piece_from_char(c).ok_or_else(|| format!("bad FEN piece: {}", c))?;
                    if file >= 8 {
                        return Err(format!("FEN rank overflows: {}", rank_str));
                    }
                    self.put_piece(color, piece, Square::from_index(row * 8 + file));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(format!("FEN rank has {} files: {}", file, rank_str));
            }
            row += 1;
        }
        if row != 8 {
            return Err("FEN has fewer than 8 ranks".into());
        }

        self.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(format!("bad FEN side: {}", side)),
        };

        self.castling_rights = 0;
        if castling != "-" {
            for c in castling.chars() {
                self.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    _ => return Err(format!("bad FEN castling flag: {}", c)),
                };
            }
        }

        self.en_passant = if en_passant == "-" {
            None
        } else {
            Some(en_passant.parse::<Square>()?)
        };

        self.halfmove_clock = halfmove
            .parse()
            .map_err(|_| format!("bad halfmove clock: {}", halfmove))?;
        self.fullmove_number = fullmove
            .parse()
            .map_err(|_| format!("bad fullmove number: {}", fullmove))?;

        self.refresh_zobrist();
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for row in 0..8u8 {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(Square::from_index(row * 8 + file)) {
                    None => empty += 1,
                    Some((color, piece)) => {
                        if empty > 0 {
                            fen.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        fen.push(piece_to_char(color, piece));
                    }
                }
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
            if row != 7 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            for (flag, c) in [
                (CASTLE_WK, 'K'),
                (CASTLE_WQ, 'Q'),
                (CASTLE_BK, 'k'),
                (CASTLE_BQ, 'q'),
            ] {
                if self.has_castling(flag) {
                    fen.push(c);
                }
            }
        }

        fen.push(' ');
        match self.en_passant {
            None => fen.push('-'),
            Some(sq) => fen.push_str(&sq.to_string()),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, Color, Piece, START_FEN};
    use crate::square::Square;
    use std::str::FromStr;

    #[test]
    fn startpos_round_trip() {
        let board = Board::new();
        assert_eq!(board.to_fen(), START_FEN);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn startpos_pieces_land_where_expected() {
        let board = Board::new();
        let e1 = "e1".parse::<Square>().unwrap();
        let d8 = "d8".parse::<Square>().unwrap();
        assert_eq!(board.piece_at(e1), Some((Color::White, Piece::King)));
        assert_eq!(board.piece_at(d8), Some((Color::Black, Piece::Queen)));
        assert_eq!(board.occupied().count_ones(), 32);
    }

    #[test]
    fn kiwipete_round_trip() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board = Board::from_str(fen).unwrap();
        assert_eq!(board.to_fen(), fen);
        assert_eq!(board.zobrist, board.compute_zobrist_full());
    }

    #[test]
    fn en_passant_square_parses() {
        let board =
            Board::from_str("rnbqkbnr/pppp1ppp/8/4p3/8/8/PPPPPPPP/RNBQKBNR w KQkq e6 0 2").unwrap();
        assert_eq!(board.en_passant, Some("e6".parse().unwrap()));
    }

    #[test]
    fn rejects_malformed_fen() {
        let mut board = Board::new_empty();
        assert!(board.set_fen("only/seven/ranks/here/x/y/z w - - 0 1").is_err());
        assert!(board.set_fen("8/8/8/8/8/8/8/8 x - - 0 1").is_err());
        assert!(board.set_fen("").is_err());
    }
}
