use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use crate::competitor::GoalHistory;
use crate::constants::{AWAY_SCORING_BASELINE, HOME_SCORING_BASELINE, MAX_SCORE_DRAWS};
use crate::error::SimError;
use crate::game::Outcome;

/// League-wide goals per game for the home and the away side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringBaselines {
    pub home: f64,
    pub away: f64,
}

impl Default for ScoringBaselines {
    fn default() -> Self {
        ScoringBaselines {
            home: HOME_SCORING_BASELINE,
            away: AWAY_SCORING_BASELINE,
        }
    }
}

/// Poisson goal model driven by each side's prior-season scoring record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalModel {
    baselines: ScoringBaselines,
    /// Home (or away) games per competitor in one season
    half_season: f64,
}

impl GoalModel {
    pub fn new(baselines: ScoringBaselines, games_per_season: u32) -> Self {
        GoalModel {
            baselines,
            half_season: f64::from(games_per_season) / 2.0,
        }
    }

    /// Expected goals for a fixture.
    ///
    /// Attack and defense strengths are per-game rates relative to the league
    /// baseline for the venue; home attack meets away defense and vice versa.
    ///
    /// Returns (home_expected, away_expected)
    pub fn expected_goals(&self, home: &GoalHistory, away: &GoalHistory) -> (f64, f64) {
        let rate = |goals: u32, baseline: f64| (f64::from(goals) / self.half_season) / baseline;

        let home_attack = rate(home.home_scored, self.baselines.home);
        let away_defense = rate(away.away_conceded, self.baselines.home);
        let away_attack = rate(away.away_scored, self.baselines.away);
        let home_defense = rate(home.home_conceded, self.baselines.away);

        (
            home_attack * away_defense * self.baselines.home,
            away_attack * home_defense * self.baselines.away,
        )
    }

    /// Sample a score consistent with an already decided outcome.
    ///
    /// Both sides' goals are drawn independently from Poisson distributions
    /// with the given means, and the pair is redrawn until it agrees with
    /// `outcome`. The means stay the same across redraws: only the goals are
    /// resampled, never the outcome.
    ///
    /// Returns (home_goals, away_goals)
    pub fn sample_score<R: Rng + ?Sized>(
        &self,
        home_expected: f64,
        away_expected: f64,
        outcome: Outcome,
        rng: &mut R,
    ) -> Result<(u32, u32), SimError> {
        let home = GoalCount::new(home_expected);
        let away = GoalCount::new(away_expected);

        std::iter::repeat_with(|| (home.sample(rng), away.sample(rng)))
            .take(MAX_SCORE_DRAWS as usize)
            .find(|&(h, a)| outcome.accepts(h, a))
            .ok_or(SimError::ScoreSamplingExhausted {
                outcome,
                home_expected,
                away_expected,
                draws: MAX_SCORE_DRAWS,
            })
    }
}

/// Goal count distribution for one side. A non-positive mean scores nothing.
enum GoalCount {
    Poisson(Poisson<f64>),
    Zero,
}

impl GoalCount {
    fn new(mean: f64) -> Self {
        match Poisson::new(mean) {
            Ok(dist) => GoalCount::Poisson(dist),
            Err(_) => GoalCount::Zero,
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match self {
            GoalCount::Poisson(dist) => dist.sample(rng) as u32,
            GoalCount::Zero => 0,
        }
    }
}
