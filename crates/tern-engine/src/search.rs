//! Iterative-deepening negamax search.
//!
//! Fail-hard alpha-beta over [`MoveGuard`](crate::MoveGuard) make/undo with a
//! transposition table and a capture-only quiescence tail. Shallow nodes
//! search pseudo-legal moves and screen each one as it is played; deeper
//! nodes filter the whole list up front. A move that captures a king ends
//! the line with a sentinel score, so an illegal move a screen missed is
//! never preferred.

use crate::movegen::{is_capture, is_legal, legal_moves, pseudo_legal_moves, MoveList};
use crate::tt::{Probe, TranspositionTable};
use crate::{evaluate, EngineConfig, EvalConfig, Position, SearchConfig};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tern_core::{Move, MoveKind, PieceKind};

/// Score for mating on the spot. Mate `n` plies from the root scores
/// `MATE - n`.
pub const MATE: i32 = 100_000;
/// Score returned by a node whose king was just captured.
pub const KING_CAPTURED: i32 = 1_000_000;
pub const INFINITY: i32 = 2_000_000;
pub const MAX_DEPTH: u8 = 64;

/// Scores at least this far from zero are mates.
const MATE_BOUND: i32 = MATE - 1_000;

/// Nodes between deadline and abort checks.
const CHECK_INTERVAL: u64 = 1024;

/// How long a search may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    /// Iterate up to this draft (clamped to 1..=64).
    Depth(u8),
    /// Iterate until the wall-clock budget runs out.
    Time(Duration),
}

/// A search score as centipawns or moves to mate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Full moves to mate; negative when the side to move is being mated.
    Mate(i32),
}

impl Score {
    /// Converts an internal score relative to the root.
    pub fn from_raw(raw: i32) -> Self {
        if raw >= MATE_BOUND {
            let plies = MATE - raw;
            Score::Mate((plies + 1) / 2)
        } else if raw <= -MATE_BOUND {
            let plies = MATE + raw;
            Score::Mate(-((plies + 1) / 2))
        } else {
            Score::Centipawns(raw)
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "cp {}", cp),
            Score::Mate(moves) => write!(f, "mate {}", moves),
        }
    }
}

/// Outcome of [`Searcher::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// `None` only when the root has no legal move.
    pub best_move: Option<Move>,
    pub score: Score,
    /// Draft of the last completed iteration.
    pub depth: u8,
    pub nodes: u64,
    pub elapsed: Duration,
    /// False when no iteration finished and `best_move` is the first legal
    /// move in generation order.
    pub completed: bool,
}

pub struct Searcher {
    config: SearchConfig,
    eval: EvalConfig,
    table: TranspositionTable,
    abort: Arc<AtomicBool>,
    deadline: Option<Instant>,
    started: Instant,
    nodes: u64,
    stopped: bool,
}

impl Searcher {
    pub fn new(config: &EngineConfig) -> Self {
        Searcher {
            config: config.search.clone(),
            eval: config.eval.clone(),
            table: TranspositionTable::new(config.search.tt_bits),
            abort: Arc::new(AtomicBool::new(false)),
            deadline: None,
            started: Instant::now(),
            nodes: 0,
            stopped: false,
        }
    }

    /// Replaces the abort flag with one shared with another thread.
    pub fn with_abort(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = abort;
        self
    }

    /// Flag that stops a running search when set. It stays set until the
    /// caller clears it.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Forgets everything learned in previous searches.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Best move under `limit`, or `None` when the root has no legal move.
    pub fn best_move(&mut self, position: &mut Position, limit: SearchLimit) -> Option<Move> {
        self.search(position, limit).best_move
    }

    /// Iterative deepening from draft 1. The result comes from the last
    /// fully searched draft; an interrupted draft is thrown away.
    pub fn search(&mut self, position: &mut Position, limit: SearchLimit) -> SearchReport {
        self.started = Instant::now();
        self.nodes = 0;
        self.stopped = false;
        let max_depth = match limit {
            SearchLimit::Depth(depth) => {
                self.deadline = None;
                depth.clamp(1, MAX_DEPTH)
            }
            SearchLimit::Time(budget) => {
                self.deadline = Some(self.started + budget);
                MAX_DEPTH
            }
        };

        let root_moves = legal_moves(position);
        if root_moves.is_empty() {
            let raw = if position.is_check() { -MATE } else { 0 };
            tracing::info!(fen = %position.to_fen(), "no legal moves at the root");
            return SearchReport {
                best_move: None,
                score: Score::from_raw(raw),
                depth: 0,
                nodes: 0,
                elapsed: self.started.elapsed(),
                completed: true,
            };
        }

        let mut best: Option<(Move, i32, u8)> = None;
        for depth in 1..=max_depth {
            let mut moves = root_moves.clone();
            if let Some((principal, _, _)) = best {
                moves.move_to_front(principal);
            }

            let Some((mv, score)) = self.search_root(position, &moves, depth) else {
                tracing::trace!(depth, nodes = self.nodes, "iteration interrupted");
                break;
            };
            best = Some((mv, score, depth));
            tracing::debug!(
                depth,
                score = %Score::from_raw(score),
                nodes = self.nodes,
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                best = %mv,
                "iteration complete"
            );

            if score.abs() >= MATE_BOUND || self.out_of_time() {
                break;
            }
        }

        let report = match best {
            Some((mv, score, depth)) => SearchReport {
                best_move: Some(mv),
                score: Score::from_raw(score),
                depth,
                nodes: self.nodes,
                elapsed: self.started.elapsed(),
                completed: true,
            },
            None => {
                let fallback = root_moves[0];
                tracing::warn!(fallback = %fallback, "no iteration completed, playing first legal move");
                SearchReport {
                    best_move: Some(fallback),
                    score: Score::Centipawns(0),
                    depth: 0,
                    nodes: self.nodes,
                    elapsed: self.started.elapsed(),
                    completed: false,
                }
            }
        };

        tracing::info!(
            best = ?report.best_move.map(|m| m.to_uci()),
            score = %report.score,
            depth = report.depth,
            nodes = report.nodes,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "search finished"
        );
        report
    }

    /// Fixed-depth score of the position for the side to move, with no
    /// time limit.
    pub fn deep_eval(&mut self, position: &mut Position, depth: u8) -> i32 {
        self.started = Instant::now();
        self.deadline = None;
        self.nodes = 0;
        self.stopped = false;
        let depth = depth.min(MAX_DEPTH);
        self.negamax(position, depth, 0, -INFINITY, INFINITY)
    }

    fn search_root(
        &mut self,
        position: &mut Position,
        moves: &MoveList,
        depth: u8,
    ) -> Option<(Move, i32)> {
        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best = None;

        for &mv in moves {
            let score = {
                let mut child = position.make(mv);
                -self.negamax(&mut child, depth - 1, 1, -beta, -alpha)
            };
            if self.stopped {
                return None;
            }
            if score > alpha {
                alpha = score;
                best = Some((mv, score));
            }
        }

        if let Some((mv, score)) = best {
            self.store(position.hash(), score, depth, Some(mv), 0);
        }
        best
    }

    fn negamax(
        &mut self,
        position: &mut Position,
        depth: u8,
        ply: u8,
        mut alpha: i32,
        beta: i32,
    ) -> i32 {
        self.nodes += 1;
        if self.poll() {
            return alpha;
        }
        if position.last_capture().map(|p| p.kind()) == Some(PieceKind::King) {
            return -KING_CAPTURED;
        }
        if depth == 0 {
            return self.quiesce(position, self.config.quiescence_depth, alpha, beta);
        }

        let hash = position.hash();
        let mut hash_move = None;
        match self.table.read(hash, depth) {
            Probe::Hit { score, .. } => return score_from_table(score, ply).clamp(alpha, beta),
            Probe::HashMove(mv) => hash_move = Some(mv),
            Probe::Miss => {}
        }

        let cull = depth >= self.config.cull_depth;
        let mut moves = if cull {
            legal_moves(position)
        } else {
            pseudo_legal_moves(position)
        };
        if self.config.prune_underpromotions {
            moves.retain(|m| !m.kind().is_underpromotion());
        }
        // A hash move absent from the list is not pseudo-legal here.
        if let Some(mv) = hash_move {
            moves.move_to_front(mv);
        }

        let mut best_move = None;
        let mut any_legal = false;
        for &mv in &moves {
            if !cull && mv.kind() == MoveKind::Castle && !is_legal(position, mv) {
                continue;
            }
            let score = {
                let mut child = position.make(mv);
                if !cull && child.king_capturable() {
                    continue;
                }
                any_legal = true;
                -self.negamax(&mut child, depth - 1, ply + 1, -beta, -alpha)
            };
            if self.stopped {
                return alpha;
            }
            if score >= beta {
                self.store(hash, beta, depth, Some(mv), ply);
                return beta;
            }
            if score > alpha {
                alpha = score;
                best_move = Some(mv);
            }
        }

        if !any_legal {
            return if position.is_check() {
                -(MATE - ply as i32)
            } else {
                0
            };
        }

        self.store(hash, alpha, depth, best_move, ply);
        alpha
    }

    /// Stand-pat evaluation followed by captures only, `budget` plies deep.
    fn quiesce(&mut self, position: &mut Position, budget: u8, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        if self.poll() {
            return alpha;
        }
        if position.last_capture().map(|p| p.kind()) == Some(PieceKind::King) {
            return -KING_CAPTURED;
        }

        let stand_pat = evaluate(position, position.side_to_move(), &self.eval);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if budget == 0 {
            return alpha;
        }

        let moves = pseudo_legal_moves(position);
        for &mv in &moves {
            if !is_capture(position, mv)
                || (self.config.prune_underpromotions && mv.kind().is_underpromotion())
            {
                continue;
            }
            let score = {
                let mut child = position.make(mv);
                -self.quiesce(&mut child, budget - 1, -beta, -alpha)
            };
            if self.stopped {
                return alpha;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        alpha
    }

    fn store(&mut self, hash: u64, score: i32, depth: u8, best_move: Option<Move>, ply: u8) {
        if self.stopped {
            return;
        }
        if !self
            .table
            .write(hash, score_to_table(score, ply), depth, best_move)
        {
            tracing::trace!(hash, depth, "transposition table window full, write dropped");
        }
    }

    /// Checks the abort flag at every node and the deadline every
    /// [`CHECK_INTERVAL`] nodes.
    fn poll(&mut self) -> bool {
        if !self.stopped
            && (self.abort.load(Ordering::Relaxed)
                || (self.nodes % CHECK_INTERVAL == 0 && self.past_deadline()))
        {
            tracing::trace!(nodes = self.nodes, "search stopped");
            self.stopped = true;
        }
        self.stopped
    }

    fn out_of_time(&self) -> bool {
        self.abort.load(Ordering::Relaxed) || self.past_deadline()
    }

    fn past_deadline(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

impl fmt::Debug for Searcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("config", &self.config)
            .field("eval", &self.eval)
            .field("table", &self.table)
            .field("nodes", &self.nodes)
            .finish()
    }
}

/// Mate scores are stored relative to the node, not the root.
fn score_to_table(score: i32, ply: u8) -> i32 {
    if score >= MATE_BOUND {
        score + ply as i32
    } else if score <= -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

fn score_from_table(score: i32, ply: u8) -> i32 {
    if score >= MATE_BOUND {
        score - ply as i32
    } else if score <= -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}
