//! Command results, printed as text or as JSON with `--json`.
//!
//! Every result type implements both [`Serialize`] and [`fmt::Display`];
//! [`emit`] picks one.

use serde::Serialize;
use std::fmt;
use tern_engine::{Bitboard, Score, SearchReport};

/// Prints `value` to stdout in the requested format.
pub fn emit<T: Serialize + fmt::Display>(value: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", value);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub fen: String,
    pub best_move: Option<String>,
    /// Centipawns for the side to move; absent for mate scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_cp: Option<i32>,
    /// Moves to mate, negative when the side to move is mated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_mate: Option<i32>,
    pub depth: u8,
    pub nodes: u64,
    pub time_ms: u64,
    pub completed: bool,
}

impl SearchOutput {
    pub fn new(fen: String, report: &SearchReport) -> Self {
        let (score_cp, score_mate) = match report.score {
            Score::Centipawns(cp) => (Some(cp), None),
            Score::Mate(moves) => (None, Some(moves)),
        };
        SearchOutput {
            fen,
            best_move: report.best_move.map(|m| m.to_uci()),
            score_cp,
            score_mate,
            depth: report.depth,
            nodes: report.nodes,
            time_ms: report.elapsed.as_millis() as u64,
            completed: report.completed,
        }
    }
}

impl fmt::Display for SearchOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let score = match (self.score_cp, self.score_mate) {
            (_, Some(moves)) => Score::Mate(moves),
            (cp, None) => Score::Centipawns(cp.unwrap_or(0)),
        };
        writeln!(
            f,
            "info depth {} score {} nodes {} time {}",
            self.depth, score, self.nodes, self.time_ms
        )?;
        match &self.best_move {
            Some(mv) => writeln!(f, "bestmove {}", mv),
            None => writeln!(f, "bestmove (none)"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DivideEntry {
    #[serde(rename = "move")]
    pub mv: String,
    pub nodes: u64,
}

#[derive(Debug, Serialize)]
pub struct PerftOutput {
    pub fen: String,
    pub depth: u32,
    pub nodes: u64,
    pub time_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub divide: Vec<DivideEntry>,
}

impl fmt::Display for PerftOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.divide {
            writeln!(f, "{}: {}", entry.mv, entry.nodes)?;
        }
        if !self.divide.is_empty() {
            writeln!(f)?;
        }
        let nps = if self.time_ms > 0 {
            self.nodes * 1000 / self.time_ms
        } else {
            0
        };
        writeln!(
            f,
            "perft {}: {} nodes in {} ms ({} nps)",
            self.depth, self.nodes, self.time_ms, nps
        )
    }
}

#[derive(Debug, Serialize)]
pub struct EvalOutput {
    pub fen: String,
    pub side_to_move: String,
    /// Static evaluation for the side to move.
    pub static_eval: i32,
    /// 24 at the opening, 0 with only kings and pawns.
    pub phase: i32,
    pub in_check: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_eval: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_depth: Option<u8>,
}

impl fmt::Display for EvalOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "side to move: {}", self.side_to_move)?;
        writeln!(f, "static eval:  {}", self.static_eval)?;
        writeln!(f, "phase:        {}/24", self.phase)?;
        if self.in_check {
            writeln!(f, "in check")?;
        }
        if let (Some(score), Some(depth)) = (self.deep_eval, self.deep_depth) {
            writeln!(f, "deep eval:    {} (depth {})", score, depth)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MovesOutput {
    pub fen: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub moves: Vec<String>,
}

impl fmt::Display for MovesOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.moves.join(" "))?;
        writeln!(f, "{} moves", self.moves.len())
    }
}

#[derive(Debug, Serialize)]
pub struct LayerOutput {
    pub name: String,
    /// Raw bits, bit 0 = a1.
    pub bits: u64,
    pub squares: Vec<String>,
    #[serde(skip)]
    board: Bitboard,
}

impl LayerOutput {
    pub fn new(name: &str, board: Bitboard) -> Self {
        LayerOutput {
            name: name.to_string(),
            bits: board.0,
            squares: board.into_iter().map(|sq| sq.to_algebraic()).collect(),
            board,
        }
    }
}

impl fmt::Display for LayerOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({:#018x})", self.name, self.bits)?;
        write!(f, "{}", self.board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tern_core::{Move, MoveKind, Square};

    fn report(score: Score) -> SearchReport {
        SearchReport {
            best_move: Some(Move::new(
                Square::from_algebraic("e2").unwrap(),
                Square::from_algebraic("e4").unwrap(),
                MoveKind::DoublePush,
            )),
            score,
            depth: 5,
            nodes: 12345,
            elapsed: Duration::from_millis(250),
            completed: true,
        }
    }

    #[test]
    fn test_search_json_has_centipawns() {
        let output = SearchOutput::new("fen".to_string(), &report(Score::Centipawns(31)));
        let value: serde_json::Value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["best_move"], "e2e4");
        assert_eq!(value["score_cp"], 31);
        assert!(value.get("score_mate").is_none());
        assert_eq!(value["time_ms"], 250);
    }

    #[test]
    fn test_search_text_reports_mate() {
        let output = SearchOutput::new("fen".to_string(), &report(Score::Mate(-2)));
        let text = output.to_string();
        assert!(text.contains("score mate -2"));
        assert!(text.ends_with("bestmove e2e4\n"));
    }

    #[test]
    fn test_perft_json_omits_empty_divide() {
        let output = PerftOutput {
            fen: "fen".to_string(),
            depth: 2,
            nodes: 400,
            time_ms: 0,
            divide: Vec::new(),
        };
        let value: serde_json::Value = serde_json::to_value(&output).unwrap();
        assert!(value.get("divide").is_none());
        assert_eq!(output.to_string(), "perft 2: 400 nodes in 0 ms (0 nps)\n");
    }

    #[test]
    fn test_divide_entries_use_move_key() {
        let output = PerftOutput {
            fen: "fen".to_string(),
            depth: 1,
            nodes: 1,
            time_ms: 1,
            divide: vec![DivideEntry {
                mv: "a2a3".to_string(),
                nodes: 1,
            }],
        };
        let value: serde_json::Value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["divide"][0]["move"], "a2a3");
    }

    #[test]
    fn test_layer_lists_squares() {
        let board: Bitboard = [Square::A1, Square::H8].into_iter().collect();
        let output = LayerOutput::new("wk", board);
        assert_eq!(output.squares, vec!["a1", "h8"]);
        let value: serde_json::Value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["bits"], 0x8000_0000_0000_0001u64);
        assert!(value.get("board").is_none());
    }
}
