use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::path::PathBuf;

use crate::checkpoint::MemoryCheckpointStore;
use crate::config::{BatchConfig, LeagueConfig, ModelConfig};
use crate::constants::{DRAW_MAX, HOME_FIELD_ADVANTAGE, POINTS_DRAW, POINTS_WIN};
use crate::rating::RatingModel;
use crate::standings::{FinalStandings, StandingRow};
use crate::{BatchRunner, League};

#[pymethods]
impl StandingRow {
    #[pyo3(name = "goal_difference")]
    fn py_goal_difference(&self) -> f64 {
        self.goal_difference()
    }

    #[pyo3(name = "likeliest_position")]
    fn py_likeliest_position(&self) -> usize {
        self.likeliest_position()
    }

    fn __repr__(&self) -> String {
        format!(
            "StandingRow(name={:?}, points={:.2}, goals={:.2}:{:.2}, rating={:.1})",
            self.name, self.points, self.goals_for, self.goals_against, self.rating
        )
    }
}

/// Home win, draw and away win probabilities for one match.
#[pyfunction]
#[pyo3(signature = (home_rating, away_rating, home_field_advantage = HOME_FIELD_ADVANTAGE))]
fn match_probabilities(home_rating: f64, away_rating: f64, home_field_advantage: f64) -> (f64, f64, f64) {
    let probs = RatingModel::default()
        .with_home_field_advantage(home_field_advantage)
        .probabilities(home_rating, away_rating);
    (probs.home_win, probs.draw, probs.away_win)
}

/// Simulate `seasons` seasons and return the averaged standings, best first.
///
/// Uses the bundled league unless both `roster` and `fixtures` CSV paths are
/// given. Nothing is written to disk.
#[pyfunction]
#[pyo3(signature = (seasons, seed = None, roster = None, fixtures = None, threads = None))]
fn simulate_league(
    py: Python<'_>,
    seasons: u64,
    seed: Option<u64>,
    roster: Option<PathBuf>,
    fixtures: Option<PathBuf>,
    threads: Option<usize>,
) -> PyResult<Vec<StandingRow>> {
    if seasons == 0 {
        return Err(PyValueError::new_err("seasons must be positive"));
    }

    let league_config = LeagueConfig {
        roster,
        fixtures,
        ..LeagueConfig::default()
    };
    let league = League::from_config(&league_config).map_err(|e| PyValueError::new_err(e.to_string()))?;

    let batch = BatchConfig {
        seasons,
        checkpoint_interval: seasons,
        seed,
        threads,
        ..BatchConfig::default()
    };

    let standings: Result<FinalStandings, String> = py.allow_threads(|| {
        let runner = BatchRunner::new(&league, &ModelConfig::default(), &batch).map_err(|e| e.to_string())?;
        let mut store = MemoryCheckpointStore::new();
        let aggregate = runner.run(&mut store).map_err(|e| e.to_string())?;
        aggregate.finalize().map_err(|e| e.to_string())
    });

    standings
        .map(|s| s.rows)
        .map_err(PyValueError::new_err)
}

/// Python module definition
#[pymodule]
fn league_sim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Classes
    m.add_class::<StandingRow>()?;

    // Functions
    m.add_function(wrap_pyfunction!(match_probabilities, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_league, m)?)?;

    // Constants
    m.add("HOME_FIELD_ADVANTAGE", HOME_FIELD_ADVANTAGE)?;
    m.add("DRAW_MAX", DRAW_MAX)?;
    m.add("POINTS_WIN", POINTS_WIN)?;
    m.add("POINTS_DRAW", POINTS_DRAW)?;

    Ok(())
}
