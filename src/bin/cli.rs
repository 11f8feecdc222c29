use riptide::board::{Color, START_FEN};
use riptide::engine::Engine;
use riptide::logger::init_logging;
use std::io::{self, BufRead, Write};

fn main() {
    if std::env::var_os("RIPTIDE_LOG").is_some() {
        init_logging("logs/riptide.log", "riptide=debug,info");
    }

    let mut engine = Engine::new();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "uci" => {
                println!("id name Riptide 1.0");
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => engine.new_game(),
            "position" => handle_position(&mut engine, &parts),
            "go" => handle_go(&mut engine, &parts),
            "perft" => {
                let depth = parts.get(1).and_then(|d| d.parse().ok()).unwrap_or(1);
                println!("{}", engine.perft(depth));
            }
            "d" | "display" => println!("{}", engine.board()),
            "fen" => println!("{}", engine.board().to_fen()),
            "quit" => break,
            _ => {}
        }
        io::stdout().flush().ok();
    }
}

fn handle_position(engine: &mut Engine, parts: &[&str]) {
    let moves_idx = parts.iter().position(|&p| p == "moves");

    let result = match parts.get(1) {
        Some(&"startpos") | None => engine.set_position(START_FEN),
        Some(&"fen") => {
            let fen_end = moves_idx.unwrap_or(parts.len());
            let fen = parts[2..fen_end].join(" ");
            engine.set_position(&fen)
        }
        Some(other) => Err(format!("unknown position kind: {}", other)),
    };
    if let Err(e) = result {
        eprintln!("info string {}", e);
        return;
    }

    if let Some(idx) = moves_idx {
        for move_text in &parts[idx + 1..] {
            if let Err(e) = engine.play(move_text) {
                eprintln!("info string {}", e);
                return;
            }
        }
    }
}

/// Parse the clock fields of a `go` command and run the search. The budget
/// heuristic is remaining-time / 20 plus half the increment, shaved to 95%
/// so the reply is on the wire before the flag falls.
fn handle_go(engine: &mut Engine, parts: &[&str]) {
    let field = |name: &str| -> Option<u64> {
        parts
            .iter()
            .position(|&p| p == name)
            .and_then(|i| parts.get(i + 1))
            .and_then(|v| v.parse().ok())
    };

    if let Some(depth) = field("depth") {
        let (_, mv) = engine.go_depth(depth as i32);
        print_bestmove(mv);
        return;
    }

    let budget_ms = if let Some(movetime) = field("movetime") {
        movetime
    } else {
        let (time, inc) = match engine.board().side_to_move {
            Color::White => (field("wtime"), field("winc")),
            Color::Black => (field("btime"), field("binc")),
        };
        match time {
            Some(t) => t / 20 + inc.unwrap_or(0) / 2,
            None => 1000,
        }
    };
    let budget_ms = budget_ms * 95 / 100;

    let mv = engine.go(budget_ms.max(1));
    print_bestmove(mv);
}

fn print_bestmove(mv: Option<riptide::moves::types::Move>) {
    match mv {
        Some(mv) => println!("bestmove {}", mv.to_uci()),
        None => println!("bestmove 0000"),
    }
}
