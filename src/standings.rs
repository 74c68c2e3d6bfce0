use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::league::League;
use crate::season::{compare_table_keys, SeasonTable, TableKey};

/// Running totals for one competitor across every folded season.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub name: String,
    pub games: u64,
    pub points: u64,
    pub wins: u64,
    pub draws: u64,
    pub losses: u64,
    pub goals_for: u64,
    pub goals_against: u64,
    /// Sum of end-of-season ratings
    pub rating: f64,
    /// `placings[p]` counts seasons finished in position `p + 1`
    pub placings: Vec<u64>,
}

impl AggregateRecord {
    fn new(name: String, positions: usize) -> Self {
        AggregateRecord {
            name,
            games: 0,
            points: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            rating: 0.0,
            placings: vec![0; positions],
        }
    }

    /// Ranking keys over season totals; ordering them orders the averages.
    fn table_key(&self) -> TableKey {
        (
            self.points,
            i128::from(self.goals_for) - i128::from(self.goals_against),
            self.goals_for,
        )
    }

    fn absorb(&mut self, other: &AggregateRecord) {
        self.games += other.games;
        self.points += other.points;
        self.wins += other.wins;
        self.draws += other.draws;
        self.losses += other.losses;
        self.goals_for += other.goals_for;
        self.goals_against += other.goals_against;
        self.rating += other.rating;
        for (mine, theirs) in self.placings.iter_mut().zip(&other.placings) {
            *mine += theirs;
        }
    }
}

/// Long-lived fold of simulated season tables.
///
/// Records stay in roster order. Two aggregates over the same roster can be
/// merged, so workers may fold seasons locally and combine afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aggregator {
    records: Vec<AggregateRecord>,
    seasons: u64,
}

impl Aggregator {
    pub fn new(league: &League) -> Self {
        Self::for_roster(league.names())
    }

    /// Empty aggregate for the given competitor names, in roster order.
    pub fn for_roster<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let positions = names.len();
        Aggregator {
            records: names
                .into_iter()
                .map(|name| AggregateRecord::new(name, positions))
                .collect(),
            seasons: 0,
        }
    }

    /// Number of seasons folded so far
    pub fn seasons(&self) -> u64 {
        self.seasons
    }

    pub fn records(&self) -> &[AggregateRecord] {
        &self.records
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Whether this aggregate was built over the league's roster.
    pub fn matches_league(&self, league: &League) -> bool {
        self.records.len() == league.len() && self.names().eq(league.names())
    }

    /// Every record tracks one counter per position and its counters add up
    /// to the season count. Anything else was not produced by this fold.
    pub fn is_consistent(&self) -> bool {
        self.check_shape().is_ok()
            && self
                .records
                .iter()
                .all(|r| r.placings.iter().sum::<u64>() == self.seasons)
    }

    /// Whether this aggregate is a consistent fold over the league's roster,
    /// fit to resume from.
    pub fn is_resumable_for(&self, league: &League) -> bool {
        self.matches_league(league) && self.is_consistent()
    }

    fn check_shape(&self) -> Result<(), SimError> {
        match self
            .records
            .iter()
            .find(|r| r.placings.len() != self.records.len())
        {
            Some(r) => Err(SimError::TableSizeMismatch {
                expected: self.records.len(),
                found: r.placings.len(),
            }),
            None => Ok(()),
        }
    }

    /// Fold one season's final table into the running totals.
    pub fn include(&mut self, table: &SeasonTable) -> Result<(), SimError> {
        if table.len() != self.records.len() {
            return Err(SimError::TableSizeMismatch {
                expected: self.records.len(),
                found: table.len(),
            });
        }
        self.check_shape()?;

        for (position, row) in table.rows().iter().enumerate() {
            let record = self
                .records
                .get_mut(row.index)
                .ok_or(SimError::TableSizeMismatch {
                    expected: table.len(),
                    found: row.index + 1,
                })?;
            record.placings[position] += 1;
            record.games += u64::from(row.games);
            record.points += u64::from(row.points);
            record.wins += u64::from(row.wins);
            record.draws += u64::from(row.draws);
            record.losses += u64::from(row.losses);
            record.goals_for += u64::from(row.goals_for);
            record.goals_against += u64::from(row.goals_against);
            record.rating += row.rating;
        }
        self.seasons += 1;

        Ok(())
    }

    /// Combine two aggregates over the same roster.
    pub fn merge(mut self, other: Aggregator) -> Result<Aggregator, SimError> {
        if !self.names().eq(other.names()) {
            return Err(SimError::RosterMismatch {
                left: self.names().map(String::from).collect(),
                right: other.names().map(String::from).collect(),
            });
        }
        self.check_shape()?;
        other.check_shape()?;

        for (mine, theirs) in self.records.iter_mut().zip(&other.records) {
            mine.absorb(theirs);
        }
        self.seasons += other.seasons;

        Ok(self)
    }

    /// Turn the totals into per-season averages and finish probabilities.
    ///
    /// Consumes the aggregate: nothing can be folded in once averaged.
    pub fn finalize(self) -> Result<FinalStandings, SimError> {
        if self.seasons == 0 {
            return Err(SimError::EmptyAggregate);
        }

        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.sort_by(|&a, &b| {
            compare_table_keys(self.records[a].table_key(), self.records[b].table_key())
                .then(a.cmp(&b))
        });

        let n = self.seasons as f64;
        let rows = order
            .into_iter()
            .map(|i| {
                let r = &self.records[i];
                StandingRow {
                    name: r.name.clone(),
                    games: r.games as f64 / n,
                    points: r.points as f64 / n,
                    wins: r.wins as f64 / n,
                    draws: r.draws as f64 / n,
                    losses: r.losses as f64 / n,
                    goals_for: r.goals_for as f64 / n,
                    goals_against: r.goals_against as f64 / n,
                    rating: r.rating / n,
                    finish: r.placings.iter().map(|&c| c as f64 / n).collect(),
                    placings: r.placings.clone(),
                }
            })
            .collect();

        Ok(FinalStandings {
            seasons: self.seasons,
            rows,
        })
    }
}

#[cfg(test)]
impl Aggregator {
    pub(crate) fn records_mut(&mut self) -> &mut [AggregateRecord] {
        &mut self.records
    }

    pub(crate) fn set_seasons(&mut self, seasons: u64) {
        self.seasons = seasons;
    }
}

/// One competitor's averaged season and finish distribution.
#[cfg_attr(feature = "python", pyo3::pyclass(get_all))]
#[derive(Clone, Debug, PartialEq)]
pub struct StandingRow {
    pub name: String,
    pub games: f64,
    pub points: f64,
    pub wins: f64,
    pub draws: f64,
    pub losses: f64,
    pub goals_for: f64,
    pub goals_against: f64,
    pub rating: f64,
    /// `finish[p]` is the share of seasons finished in position `p + 1`
    pub finish: Vec<f64>,
    pub placings: Vec<u64>,
}

impl StandingRow {
    pub fn goal_difference(&self) -> f64 {
        self.goals_for - self.goals_against
    }

    /// Most frequent finishing position (1-based)
    pub fn likeliest_position(&self) -> usize {
        self.placings
            .iter()
            .enumerate()
            .max_by(|(i, a), (j, b)| a.cmp(b).then(j.cmp(i)))
            .map_or(1, |(i, _)| i + 1)
    }
}

/// Averaged standings over a finished batch, best average first.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalStandings {
    pub seasons: u64,
    pub rows: Vec<StandingRow>,
}

impl FinalStandings {
    pub fn row(&self, name: &str) -> Option<&StandingRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}
