//! League Sim - Monte Carlo simulation of round-robin league standings.
//!
//! Every fixture of a season is played out with an Elo-style rating model
//! (win/draw/loss probabilities plus zero-sum rating updates) and a Poisson
//! goal model conditioned on the decided outcome. Many independent seasons
//! are simulated in parallel and folded into average tables and finish
//! probabilities, with resumable checkpoints along the way.
//!
//! Python bindings via PyO3 are available behind the `python` feature.

pub mod batch;
pub mod checkpoint;
pub mod competitor;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod goals;
pub mod league;
pub mod rating;
pub mod report;
pub mod season;
pub mod standings;

#[cfg(feature = "python")]
mod python;

pub use batch::{BatchRunner, Progress};
pub use checkpoint::{CheckpointError, CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
pub use competitor::{Competitor, GoalHistory, SeasonRecord};
pub use config::{load_config, BatchConfig, Config, ConfigError, LeagueConfig, ModelConfig};
pub use error::SimError;
pub use game::{MatchResult, MatchSimulator, Outcome};
pub use goals::{GoalModel, ScoringBaselines};
pub use league::{Fixture, League, LeagueError};
pub use rating::{MatchProbabilities, RatingModel};
pub use season::{rank_records, standing_order, SeasonSimulator, SeasonTable};
pub use standings::{AggregateRecord, Aggregator, FinalStandings, StandingRow};
