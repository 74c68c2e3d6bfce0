use serde::{Deserialize, Serialize};

use crate::constants::{
    DRAW_MAX, DRAW_VARIANCE, HOME_FIELD_ADVANTAGE, K_BASE, LOGISTIC_BASE, LOGISTIC_DIVISOR,
    MARGIN_EXPONENT,
};

/// Outcome probabilities for a single fixture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchProbabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}

impl MatchProbabilities {
    pub fn total(&self) -> f64 {
        self.home_win + self.draw + self.away_win
    }
}

/// Elo-style rating model with a Gaussian draw kernel.
///
/// The home side is credited `home_field_advantage` rating points for both
/// the outcome probabilities and the post-match rating exchange.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingModel {
    pub home_field_advantage: f64,
    pub logistic_base: f64,
    pub logistic_divisor: f64,
    pub k_base: f64,
    pub margin_exponent: f64,
    pub draw_max: f64,
    pub draw_variance: f64,
}

impl Default for RatingModel {
    fn default() -> Self {
        RatingModel {
            home_field_advantage: HOME_FIELD_ADVANTAGE,
            logistic_base: LOGISTIC_BASE,
            logistic_divisor: LOGISTIC_DIVISOR,
            k_base: K_BASE,
            margin_exponent: MARGIN_EXPONENT,
            draw_max: DRAW_MAX,
            draw_variance: DRAW_VARIANCE,
        }
    }
}

impl RatingModel {
    /// Copy of this model with a different home-field bonus
    pub fn with_home_field_advantage(self, home_field_advantage: f64) -> Self {
        RatingModel {
            home_field_advantage,
            ..self
        }
    }

    /// Home rating plus bonus, minus away rating
    fn difference(&self, home_rating: f64, away_rating: f64) -> f64 {
        home_rating + self.home_field_advantage - away_rating
    }

    /// Logistic expectancy of the side that is `diff` points stronger
    fn logistic(&self, diff: f64) -> f64 {
        1.0 / (1.0 + self.logistic_base.powf(-diff / self.logistic_divisor))
    }

    /// Draw probability for a home-adjusted rating difference.
    pub fn draw_probability(&self, diff: f64) -> f64 {
        self.draw_max * (-(diff * diff) / (2.0 * self.draw_variance * self.draw_variance)).exp()
    }

    /// Calculate home win / draw / away win probabilities.
    ///
    /// # Arguments
    /// * `home_rating` - Rating of the side playing at home (without bonus)
    /// * `away_rating` - Rating of the visiting side
    ///
    /// # Returns
    /// Three probabilities in [0, 1] summing to 1
    pub fn probabilities(&self, home_rating: f64, away_rating: f64) -> MatchProbabilities {
        let diff = self.difference(home_rating, away_rating);
        let draw = self.draw_probability(diff);
        let decisive = 1.0 - draw;

        MatchProbabilities {
            home_win: self.logistic(diff) * decisive,
            draw,
            away_win: self.logistic(-diff) * decisive,
        }
    }

    /// Pre-match expected score of the home side (1 = certain win).
    pub fn expected_home_score(&self, home_rating: f64, away_rating: f64) -> f64 {
        self.logistic(self.difference(home_rating, away_rating))
    }

    /// Rating points transferred from the away side to the home side.
    ///
    /// Negative when the home side under-performs its expectation.
    pub fn rating_delta(&self, home_rating: f64, away_rating: f64, goal_difference: i64) -> f64 {
        let expected = self.expected_home_score(home_rating, away_rating);
        let actual = match goal_difference.signum() {
            1 => 1.0,
            0 => 0.5,
            _ => 0.0,
        };
        let margin = goal_difference.unsigned_abs() as f64;
        let k = self.k_base * (1.0 + margin).powf(self.margin_exponent);

        k * (actual - expected)
    }

    /// Ratings of both sides after a match ending with `goal_difference`
    /// (home goals minus away goals).
    ///
    /// Returns (new_home_rating, new_away_rating)
    pub fn rating_update(&self, home_rating: f64, away_rating: f64, goal_difference: i64) -> (f64, f64) {
        let delta = self.rating_delta(home_rating, away_rating, goal_difference);
        (home_rating + delta, away_rating - delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> RatingModel {
        RatingModel::default().with_home_field_advantage(0.0)
    }

    #[test]
    fn test_equal_teams_neutral_venue() {
        let probs = neutral().probabilities(1800.0, 1800.0);
        assert!((probs.home_win - probs.away_win).abs() < 1e-12);
        assert!((probs.draw - DRAW_MAX).abs() < 1e-12, "Draw chance should peak at draw_max");
    }

    #[test]
    fn test_home_advantage_favours_home() {
        let probs = RatingModel::default().probabilities(1800.0, 1800.0);
        assert!(probs.home_win > probs.away_win);
        assert!(probs.draw < DRAW_MAX);
    }

    #[test]
    fn test_better_team_favored() {
        let probs = neutral().probabilities(2043.0, 1612.0);
        assert!(probs.home_win > 0.8, "Strong side should be heavily favoured, got {}", probs.home_win);
        assert!(probs.away_win < 0.1);
    }

    #[test]
    fn test_probability_bounds() {
        let model = RatingModel::default();
        for (home, away) in [(1500.0, 2100.0), (2100.0, 1500.0), (1700.0, 1700.0), (0.0, 3000.0)] {
            let probs = model.probabilities(home, away);
            for p in [probs.home_win, probs.draw, probs.away_win] {
                assert!((0.0..=1.0).contains(&p), "Probability must be in [0, 1], got {}", p);
            }
            assert!((probs.total() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_symmetric_on_neutral_venue() {
        let model = neutral();
        let ab = model.probabilities(1891.0, 1838.0);
        let ba = model.probabilities(1838.0, 1891.0);

        assert!((ab.home_win - ba.away_win).abs() < 1e-12);
        assert!((ab.draw - ba.draw).abs() < 1e-12);
    }

    #[test]
    fn test_rating_update_zero_sum() {
        let model = RatingModel::default();
        for gd in [-4, -1, 0, 1, 3] {
            let (home, away) = model.rating_update(1742.0, 1866.0, gd);
            let home_gain = home - 1742.0;
            let away_gain = away - 1866.0;
            assert!((home_gain + away_gain).abs() < 1e-9, "Exchange must be zero-sum");
        }
    }

    #[test]
    fn test_rating_delta_direction() {
        let model = RatingModel::default();
        assert!(model.rating_delta(1700.0, 1700.0, 1) > 0.0);
        assert!(model.rating_delta(1700.0, 1700.0, -1) < 0.0);
        // Home bonus makes a draw an under-performance for the host
        assert!(model.rating_delta(1700.0, 1700.0, 0) < 0.0);
    }

    #[test]
    fn test_larger_margin_moves_ratings_more() {
        let model = RatingModel::default();
        let narrow = model.rating_delta(1800.0, 1800.0, 1);
        let wide = model.rating_delta(1800.0, 1800.0, 4);
        assert!(wide > narrow);
        assert!((wide / narrow - 2.5).abs() < 1e-12, "k scales with (1 + margin)");
    }
}
