use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::constants::{POINTS_DRAW, POINTS_LOSS, POINTS_WIN};

/// Goals scored and conceded at each venue over a prior reference season.
///
/// These feed the attack/defense rates of the goal model and are never
/// touched by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalHistory {
    pub home_scored: u32,
    pub home_conceded: u32,
    pub away_scored: u32,
    pub away_conceded: u32,
}

impl GoalHistory {
    pub fn new(home_scored: u32, home_conceded: u32, away_scored: u32, away_conceded: u32) -> Self {
        GoalHistory {
            home_scored,
            home_conceded,
            away_scored,
            away_conceded,
        }
    }

    /// True if any of the four counts is zero. A zero count drives one side's
    /// expected goals to zero, which leaves some outcomes unreachable.
    pub fn has_zero_count(&self) -> bool {
        self.home_scored == 0
            || self.home_conceded == 0
            || self.away_scored == 0
            || self.away_conceded == 0
    }
}

/// Baseline competitor as listed in the roster.
#[derive(Clone, Debug, PartialEq)]
pub struct Competitor {
    pub name: String,

    /// Rating at the start of every simulated season
    pub rating: f64,

    pub history: GoalHistory,
}

impl Competitor {
    pub fn new(name: impl Into<String>, rating: f64, history: GoalHistory) -> Self {
        Competitor {
            name: name.into(),
            rating,
            history,
        }
    }
}

/// One competitor's state inside a single simulated season.
///
/// Created from the baseline by `League::fresh_season` and written only by
/// the match simulator.
#[derive(Clone, Debug, PartialEq)]
pub struct SeasonRecord {
    /// Position of the competitor in the league roster
    pub index: usize,
    pub rating: f64,
    pub history: GoalHistory,
    pub games: u32,
    pub points: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl SeasonRecord {
    pub fn new(index: usize, competitor: &Competitor) -> Self {
        SeasonRecord {
            index,
            rating: competitor.rating,
            history: competitor.history,
            games: 0,
            points: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
        }
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    /// Apply one finished match from this competitor's point of view.
    pub(crate) fn record_result(&mut self, scored: u32, conceded: u32, new_rating: f64) {
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.wins += 1;
                self.points += POINTS_WIN;
            }
            Ordering::Equal => {
                self.draws += 1;
                self.points += POINTS_DRAW;
            }
            Ordering::Less => {
                self.losses += 1;
                self.points += POINTS_LOSS;
            }
        }
        self.games += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.rating = new_rating;
    }
}
