pub mod engine;
pub mod entry;

pub use engine::{
    clamp_score, clamp_to, compute_session_total, score_breakdown, CategoryScore, ScoreBreakdown,
    ScoringError,
};
pub use entry::{RawScore, ScoreEntry};
