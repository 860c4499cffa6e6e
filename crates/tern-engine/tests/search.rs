//! Search integration tests: results are always root-legal, time budgets are
//! honored and tactical positions are solved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tern_engine::{
    legal_moves, Engine, EngineConfig, Position, Score, SearchLimit, Searcher,
};

const POSITIONS: [&str; 5] = [
    tern_core::STARTPOS,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

fn small_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.search.tt_bits = 16;
    config
}

#[test]
fn best_move_is_root_legal_at_every_depth() {
    let engine = Engine::new();
    for fen in POSITIONS {
        let mut position = Position::from_fen(&engine, fen).unwrap();
        let legal = legal_moves(&mut position);
        for depth in 1..=3 {
            let mut searcher = Searcher::new(&small_config());
            let report = searcher.search(&mut position, SearchLimit::Depth(depth));
            let mv = report.best_move.expect("position has legal moves");
            assert!(legal.contains(mv), "{} not legal in {}", mv, fen);
            assert!(report.depth >= 1 && report.depth <= depth);
            assert_eq!(position.to_fen(), fen);
        }
    }
}

#[test]
fn tiny_time_budgets_still_return_legal_moves() {
    let engine = Engine::new();
    for fen in POSITIONS {
        let mut position = Position::from_fen(&engine, fen).unwrap();
        let legal = legal_moves(&mut position);
        for budget in [0, 1, 5] {
            let mut searcher = Searcher::new(&small_config());
            let limit = SearchLimit::Time(Duration::from_millis(budget));
            let mv = searcher.best_move(&mut position, limit).unwrap();
            assert!(legal.contains(mv), "{} not legal in {}", mv, fen);
            assert_eq!(position.ply(), 0);
        }
    }
}

#[test]
fn time_budget_bounds_the_search() {
    let engine = Engine::new();
    let mut position = Position::from_fen(&engine, POSITIONS[1]).unwrap();
    let mut searcher = Searcher::new(&small_config());
    let report = searcher.search(&mut position, SearchLimit::Time(Duration::from_millis(200)));
    assert!(report.elapsed < Duration::from_secs(5));
    assert!(report.best_move.is_some());
}

#[test]
fn shared_abort_flag_stops_search() {
    let engine = Engine::new();
    let mut position = Position::startpos(&engine);
    let abort = Arc::new(AtomicBool::new(true));
    let mut searcher = Searcher::new(&small_config()).with_abort(Arc::clone(&abort));
    let report = searcher.search(&mut position, SearchLimit::Time(Duration::from_secs(60)));
    assert!(report.elapsed < Duration::from_secs(5));
    assert!(legal_moves(&mut position).contains(report.best_move.unwrap()));
    assert!(!report.completed);
    assert_eq!(report.depth, 0);

    abort.store(false, Ordering::Relaxed);
    let report = searcher.search(&mut position, SearchLimit::Depth(2));
    assert_eq!(report.depth, 2);
}

#[test]
fn finds_back_rank_mate_in_two_plies() {
    let engine = Engine::new();
    let mut position = Position::from_fen(&engine, "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    let mut searcher = Searcher::new(&small_config());
    let report = searcher.search(&mut position, SearchLimit::Depth(4));
    assert_eq!(report.best_move.map(|m| m.to_uci()), Some("a1a8".to_string()));
    assert_eq!(report.score, Score::Mate(1));
}

#[test]
fn reused_searcher_agrees_with_fresh_one() {
    let engine = Engine::new();
    let mut position = Position::from_fen(&engine, "4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
    let mut reused = Searcher::new(&small_config());
    let first = reused.best_move(&mut position, SearchLimit::Depth(3));
    let second = reused.best_move(&mut position, SearchLimit::Depth(3));
    assert_eq!(first, second);
    assert!(reused.table().occupancy() > 0);

    reused.clear();
    assert_eq!(reused.table().occupancy(), 0);
}

#[test]
fn deep_eval_is_side_relative() {
    let engine = Engine::new();
    let mut white = Position::from_fen(&engine, "4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
    let mut black = Position::from_fen(&engine, "4k3/8/8/8/8/8/8/3QK3 b - - 0 1").unwrap();
    let mut searcher = Searcher::new(&small_config());
    assert!(searcher.deep_eval(&mut white, 2) > 500);
    assert!(searcher.deep_eval(&mut black, 2) < -500);
}
