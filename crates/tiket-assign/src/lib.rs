//! Technician assignment for tickets.
//!
//! Jobs flow through an [`AssignmentEngine`]: they are buffered, flushed in
//! batches, filtered by hard rules, ranked, and decided. A failing or slow
//! ranker never blocks a decision; the deterministic fallback takes over
//! whenever at least one technician is eligible.

mod config;
mod directory;
mod engine;
mod fallback;
mod filter;
mod metrics;
mod rank;

pub use config::{
    DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL, DEFAULT_RANK_TIMEOUT, EngineConfig,
    EngineSettings,
};
pub use directory::{DirectoryError, TechnicianDirectory};
pub use engine::{AssignmentEngine, DecisionStream, EngineError, ShutdownReport};
pub use fallback::{FallbackSelector, LeastLoadedSelector};
pub use filter::{CandidatePool, Exclusion, candidate_pool, check_eligibility};
pub use rank::{HeuristicRanker, RankError, Ranker, heuristic_score};
