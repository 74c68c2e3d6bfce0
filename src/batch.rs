use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::checkpoint::CheckpointStore;
use crate::config::{BatchConfig, ModelConfig};
use crate::error::SimError;
use crate::league::League;
use crate::season::SeasonSimulator;
use crate::standings::Aggregator;

/// Progress snapshot handed to observers after every checkpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub completed: u64,
    pub target: u64,
    /// Estimated time left, from the pace of the current run
    pub remaining: Duration,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        self.completed as f64 / self.target as f64
    }
}

/// Drives a batch of season simulations towards a target count,
/// checkpointing after every chunk.
pub struct BatchRunner<'a> {
    simulator: SeasonSimulator<'a>,
    target: u64,
    checkpoint_interval: u64,
    seed: Option<u64>,
    pool: Option<rayon::ThreadPool>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(league: &'a League, model: &ModelConfig, batch: &BatchConfig) -> Result<Self, SimError> {
        let pool = batch
            .threads
            .map(|n| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::ThreadPool(e.to_string()))
            })
            .transpose()?;

        Ok(BatchRunner {
            simulator: SeasonSimulator::new(league, model),
            target: batch.seasons,
            checkpoint_interval: batch.checkpoint_interval.max(1),
            seed: batch.seed,
            pool,
        })
    }

    /// Resume from `store` (or start from zero) and simulate until the target
    /// number of seasons has been folded in.
    pub fn run<S: CheckpointStore>(&self, store: &mut S) -> Result<Aggregator, SimError> {
        self.run_with_progress(store, |_| {})
    }

    /// Like [`run`](Self::run), reporting progress after every checkpoint.
    pub fn run_with_progress<S, F>(&self, store: &mut S, mut on_progress: F) -> Result<Aggregator, SimError>
    where
        S: CheckpointStore,
        F: FnMut(&Progress),
    {
        let mut aggregate = self.resume(store);
        if aggregate.seasons() >= self.target {
            info!(
                "Checkpoint already holds {} seasons (target {}), nothing to simulate",
                aggregate.seasons(),
                self.target
            );
            return Ok(aggregate);
        }

        let mut master = match self.seed {
            Some(s) => {
                let mut rng = ChaCha8Rng::seed_from_u64(s);
                rng.set_stream(aggregate.seasons());
                rng
            }
            None => ChaCha8Rng::from_entropy(),
        };

        let started = Instant::now();
        let resumed_at = aggregate.seasons();

        while aggregate.seasons() < self.target {
            let chunk = (self.target - aggregate.seasons()).min(self.checkpoint_interval);
            let seeds: Vec<u64> = (0..chunk).map(|_| master.gen::<u64>()).collect();

            let partial = match &self.pool {
                Some(pool) => pool.install(|| self.simulate_chunk(&seeds)),
                None => self.simulate_chunk(&seeds),
            }?;
            aggregate = aggregate.merge(partial)?;
            store.save(&aggregate)?;

            let progress = Progress {
                completed: aggregate.seasons(),
                target: self.target,
                remaining: estimate_remaining(
                    started.elapsed(),
                    aggregate.seasons() - resumed_at,
                    self.target - aggregate.seasons(),
                ),
            };
            info!(
                "Calculated {} outcomes ({:.4}% of total). Estimated remaining time: {}",
                progress.completed,
                progress.fraction() * 100.0,
                format_duration(progress.remaining)
            );
            on_progress(&progress);
        }

        Ok(aggregate)
    }

    /// Simulate one chunk of independent seasons in parallel.
    ///
    /// Each season gets its own generator; workers fold into local aggregates
    /// that are merged pairwise at the end.
    fn simulate_chunk(&self, seeds: &[u64]) -> Result<Aggregator, SimError> {
        let league = self.simulator.league();
        seeds
            .par_iter()
            .try_fold(
                || Aggregator::new(league),
                |mut acc, &seed| -> Result<Aggregator, SimError> {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    let table = self.simulator.run(&mut rng)?;
                    acc.include(&table)?;
                    Ok(acc)
                },
            )
            .try_reduce(|| Aggregator::new(league), |a, b| a.merge(b))
    }

    /// Load the stored aggregate if it is usable, otherwise start fresh.
    /// A bad checkpoint never aborts the batch.
    fn resume<S: CheckpointStore>(&self, store: &S) -> Aggregator {
        let league = self.simulator.league();
        match store.load() {
            Ok(Some(state)) if state.is_resumable_for(league) => {
                info!("Resuming from checkpoint with {} seasons", state.seasons());
                state
            }
            Ok(Some(state)) if !state.matches_league(league) => {
                warn!("Checkpoint roster does not match {}; restarting from zero", league.name());
                Aggregator::new(league)
            }
            Ok(Some(state)) => {
                warn!(
                    "Checkpoint claims {} seasons but its finish tallies disagree; restarting from zero",
                    state.seasons()
                );
                Aggregator::new(league)
            }
            Ok(None) => {
                info!("No checkpoint found; starting {} from zero", league.name());
                Aggregator::new(league)
            }
            Err(e) => {
                warn!("Checkpoint unreadable ({}); restarting from zero", e);
                Aggregator::new(league)
            }
        }
    }
}

fn estimate_remaining(elapsed: Duration, done: u64, left: u64) -> Duration {
    if done == 0 {
        return Duration::ZERO;
    }
    elapsed.mul_f64(left as f64 / done as f64)
}

/// `hh:mm:ss`, hours unbounded.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::MemoryCheckpointStore;

    fn batch(seasons: u64, interval: u64) -> BatchConfig {
        BatchConfig {
            seasons,
            checkpoint_interval: interval,
            seed: Some(2019),
            threads: Some(2),
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_run_reaches_target_with_checkpoints() {
        let league = League::premier_league_2019().unwrap();
        let runner = BatchRunner::new(&league, &ModelConfig::default(), &batch(25, 10)).unwrap();
        let mut store = MemoryCheckpointStore::new();

        let mut reports = Vec::new();
        let agg = runner
            .run_with_progress(&mut store, |p| reports.push(p.completed))
            .unwrap();

        assert_eq!(agg.seasons(), 25);
        assert_eq!(reports, vec![10, 20, 25]);
        assert_eq!(store.saves(), 3);
        assert_eq!(store.load().unwrap().map(|a| a.seasons()), Some(25));
    }

    #[test]
    fn test_completed_checkpoint_is_not_extended() {
        let league = League::premier_league_2019().unwrap();
        let mut store = MemoryCheckpointStore::new();
        BatchRunner::new(&league, &ModelConfig::default(), &batch(12, 12))
            .unwrap()
            .run(&mut store)
            .unwrap();

        let again = BatchRunner::new(&league, &ModelConfig::default(), &batch(5, 5))
            .unwrap()
            .run(&mut store)
            .unwrap();
        assert_eq!(again.seasons(), 12);
        assert_eq!(store.saves(), 1);
    }

    #[test]
    fn test_malformed_checkpoint_restarts_from_zero() {
        let league = League::premier_league_2019().unwrap();
        let mut stale = Aggregator::new(&league);
        stale.set_seasons(5);
        for record in stale.records_mut() {
            record.placings.truncate(3);
        }
        let mut store = MemoryCheckpointStore::new();
        store.save(&stale).unwrap();

        let runner = BatchRunner::new(&league, &ModelConfig::default(), &batch(15, 5)).unwrap();
        let agg = runner.run(&mut store).unwrap();

        assert_eq!(agg.seasons(), 15);
        for record in agg.records() {
            assert_eq!(record.placings.len(), 20);
            assert_eq!(record.placings.iter().sum::<u64>(), 15, "{}", record.name);
        }
    }

    #[test]
    fn test_overstated_season_count_restarts_from_zero() {
        let league = League::premier_league_2019().unwrap();
        let mut store = MemoryCheckpointStore::new();
        let mut partial = BatchRunner::new(&league, &ModelConfig::default(), &batch(4, 4))
            .unwrap()
            .run(&mut store)
            .unwrap();
        partial.set_seasons(9);
        store.save(&partial).unwrap();

        let agg = BatchRunner::new(&league, &ModelConfig::default(), &batch(6, 6))
            .unwrap()
            .run(&mut store)
            .unwrap();
        assert_eq!(agg.seasons(), 6);
        assert!(agg.is_consistent());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(3 * 3600 + 7 * 60 + 9)), "03:07:09");
        assert_eq!(format_duration(Duration::from_secs(125 * 3600)), "125:00:00");
    }

    #[test]
    fn test_estimate_remaining() {
        let est = estimate_remaining(Duration::from_secs(10), 100, 300);
        assert_eq!(est, Duration::from_secs(30));
        assert_eq!(estimate_remaining(Duration::from_secs(10), 0, 300), Duration::ZERO);
    }
}
