use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::game::Outcome;

/// Failures raised while simulating or aggregating seasons.
#[derive(Debug, Error)]
pub enum SimError {
    /// The conditioned score sampler gave up. Never expected under a
    /// validated league; surfaced instead of returning a score that
    /// contradicts the decided outcome.
    #[error(
        "no {outcome:?} score found after {draws} draws (expected goals {home_expected:.3} - {away_expected:.3})"
    )]
    ScoreSamplingExhausted {
        outcome: Outcome,
        home_expected: f64,
        away_expected: f64,
        draws: u32,
    },

    #[error("cannot finalize standings before any season has been included")]
    EmptyAggregate,

    #[error("season table has {found} rows, aggregate tracks {expected} competitors")]
    TableSizeMismatch { expected: usize, found: usize },

    #[error("aggregate rosters differ: {left:?} vs {right:?}")]
    RosterMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },

    #[error("worker thread pool could not be built: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}
