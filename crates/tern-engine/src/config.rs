//! Search and evaluation settings.
//!
//! All types deserialize from partial TOML; missing fields take their
//! defaults, so an empty document yields [`EngineConfig::default`].

use serde::{Deserialize, Serialize};

/// Tuning knobs for [`crate::Searcher`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Transposition table size as a power of two. Clamped to 1..=28.
    #[serde(default = "default_tt_bits")]
    pub tt_bits: u8,
    /// Remaining depth at or above which move lists are fully legality
    /// filtered. Shallower nodes screen each move lazily as it is searched.
    #[serde(default = "default_cull_depth")]
    pub cull_depth: u8,
    /// Extra capture-only plies searched below the nominal depth.
    #[serde(default = "default_quiescence_depth")]
    pub quiescence_depth: u8,
    /// Search only queen and knight promotions inside the tree. The root
    /// always considers all four.
    #[serde(default = "default_prune_underpromotions")]
    pub prune_underpromotions: bool,
}

fn default_tt_bits() -> u8 {
    20
}

fn default_cull_depth() -> u8 {
    4
}

fn default_quiescence_depth() -> u8 {
    6
}

fn default_prune_underpromotions() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            tt_bits: default_tt_bits(),
            cull_depth: default_cull_depth(),
            quiescence_depth: default_quiescence_depth(),
            prune_underpromotions: default_prune_underpromotions(),
        }
    }
}

/// Evaluation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EvalConfig {
    /// Add mobility terms for sliders and knights.
    #[serde(default)]
    pub mobility: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub eval: EvalConfig,
}
