use rand::Rng;

use crate::competitor::SeasonRecord;
use crate::error::SimError;
use crate::goals::GoalModel;
use crate::rating::{MatchProbabilities, RatingModel};

/// Result of a fixture from the home side's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    /// Pick an outcome with a single uniform draw.
    pub fn sample<R: Rng + ?Sized>(probs: &MatchProbabilities, rng: &mut R) -> Self {
        let roll = rng.gen::<f64>();
        if roll < probs.home_win {
            Outcome::HomeWin
        } else if roll < probs.home_win + probs.draw {
            Outcome::Draw
        } else {
            Outcome::AwayWin
        }
    }

    /// Whether a final score is consistent with this outcome.
    pub fn accepts(self, home_goals: u32, away_goals: u32) -> bool {
        match self {
            Outcome::HomeWin => home_goals > away_goals,
            Outcome::Draw => home_goals == away_goals,
            Outcome::AwayWin => home_goals < away_goals,
        }
    }
}

/// Final score of one simulated fixture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub outcome: Outcome,
    pub home_goals: u32,
    pub away_goals: u32,
}

impl MatchResult {
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.home_goals) - i64::from(self.away_goals)
    }
}

/// Resolves single fixtures: outcome, then score, then rating exchange.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchSimulator {
    pub rating: RatingModel,
    pub goals: GoalModel,
}

impl MatchSimulator {
    pub fn new(rating: RatingModel, goals: GoalModel) -> Self {
        MatchSimulator { rating, goals }
    }

    /// Monte Carlo simulation of one fixture.
    ///
    /// The outcome is drawn from the rating model first; the score is then
    /// sampled conditionally on it. Both records get the result and their new
    /// ratings.
    ///
    /// # Arguments
    /// * `home` - Season state of the host
    /// * `away` - Season state of the visitor
    /// * `rng` - Random source owned by the calling season
    pub fn play<R: Rng + ?Sized>(
        &self,
        home: &mut SeasonRecord,
        away: &mut SeasonRecord,
        rng: &mut R,
    ) -> Result<MatchResult, SimError> {
        let probs = self.rating.probabilities(home.rating, away.rating);
        let outcome = Outcome::sample(&probs, rng);

        let (home_expected, away_expected) = self.goals.expected_goals(&home.history, &away.history);
        let (home_goals, away_goals) =
            self.goals.sample_score(home_expected, away_expected, outcome, rng)?;

        let result = MatchResult {
            outcome,
            home_goals,
            away_goals,
        };
        let (home_rating, away_rating) =
            self.rating.rating_update(home.rating, away.rating, result.goal_difference());

        home.record_result(home_goals, away_goals, home_rating);
        away.record_result(away_goals, home_goals, away_rating);

        Ok(result)
    }
}
