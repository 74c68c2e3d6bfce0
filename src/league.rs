// Roster and fixture data: loading, validation, and per-season instantiation.
//
// A `League` is the immutable baseline every simulated season starts from.
// All validation happens in `League::new`, before any simulation runs.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::competitor::{Competitor, GoalHistory, SeasonRecord};
use crate::config::LeagueConfig;

const PREMIER_LEAGUE_2019_NAME: &str = "Premier League 2019/20";
const PREMIER_LEAGUE_2019_ROSTER: &str = include_str!("../data/premier_league_2019/roster.csv");
const PREMIER_LEAGUE_2019_FIXTURES: &str = include_str!("../data/premier_league_2019/fixtures.csv");

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {source_name}: {source}")]
    Csv {
        source_name: String,
        source: csv::Error,
    },

    #[error("a league needs at least two competitors, found {0}")]
    TooFewCompetitors(usize),

    #[error("expected {expected} competitors, roster lists {found}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("competitor `{0}` appears more than once in the roster")]
    DuplicateCompetitor(String),

    #[error("competitor `{0}` has a non-finite rating")]
    NonFiniteRating(String),

    #[error("competitor `{0}` has a zero count in its goal history")]
    ZeroScoringHistory(String),

    #[error("fixture in round {round} references unknown competitor `{name}`")]
    UnknownCompetitor { round: u32, name: String },

    #[error("fixture in round {round} pits `{name}` against itself")]
    SelfFixture { round: u32, name: String },

    #[error("`{home}` hosts `{away}` more than once")]
    DuplicateFixture { home: String, away: String },

    #[error("a double round robin of {competitors} competitors has {expected} fixtures, found {found}")]
    FixtureCount {
        competitors: usize,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One scheduled match, by competitor name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fixture {
    /// Matchweek the fixture belongs to (informational only)
    pub round: u32,
    pub home: String,
    pub away: String,
}

impl Fixture {
    pub fn new(round: u32, home: impl Into<String>, away: impl Into<String>) -> Self {
        Fixture {
            round,
            home: home.into(),
            away: away.into(),
        }
    }
}

/// Validated roster and schedule of a double round-robin league.
#[derive(Clone, Debug)]
pub struct League {
    name: String,
    roster: Vec<Competitor>,
    /// Fixtures resolved to roster indices, in playing order
    schedule: Vec<(usize, usize)>,
}

impl League {
    /// Build a league, rejecting any roster or schedule that is not a
    /// complete double round robin.
    ///
    /// `expected_size`, when given, must match the roster length.
    pub fn new(
        name: impl Into<String>,
        roster: Vec<Competitor>,
        fixtures: Vec<Fixture>,
        expected_size: Option<usize>,
    ) -> Result<Self, LeagueError> {
        let count = roster.len();
        if let Some(expected) = expected_size {
            if expected != count {
                return Err(LeagueError::SizeMismatch {
                    expected,
                    found: count,
                });
            }
        }
        if count < 2 {
            return Err(LeagueError::TooFewCompetitors(count));
        }

        let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(count);
        for (i, competitor) in roster.iter().enumerate() {
            if index_of.insert(competitor.name.as_str(), i).is_some() {
                return Err(LeagueError::DuplicateCompetitor(competitor.name.clone()));
            }
            if !competitor.rating.is_finite() {
                return Err(LeagueError::NonFiniteRating(competitor.name.clone()));
            }
            if competitor.history.has_zero_count() {
                return Err(LeagueError::ZeroScoringHistory(competitor.name.clone()));
            }
        }

        let resolve = |round: u32, name: &str| {
            index_of
                .get(name)
                .copied()
                .ok_or_else(|| LeagueError::UnknownCompetitor {
                    round,
                    name: name.to_string(),
                })
        };

        let mut schedule = Vec::with_capacity(fixtures.len());
        let mut seen = HashSet::with_capacity(fixtures.len());
        for fixture in &fixtures {
            let home = resolve(fixture.round, &fixture.home)?;
            let away = resolve(fixture.round, &fixture.away)?;
            if home == away {
                return Err(LeagueError::SelfFixture {
                    round: fixture.round,
                    name: fixture.home.clone(),
                });
            }
            if !seen.insert((home, away)) {
                return Err(LeagueError::DuplicateFixture {
                    home: fixture.home.clone(),
                    away: fixture.away.clone(),
                });
            }
            schedule.push((home, away));
        }

        // Distinct ordered pairs of distinct competitors: reaching N·(N−1)
        // of them means every pair meets once at each venue.
        let expected = count * (count - 1);
        if schedule.len() != expected {
            return Err(LeagueError::FixtureCount {
                competitors: count,
                expected,
                found: schedule.len(),
            });
        }

        let name = name.into();
        debug!(league = %name, competitors = count, fixtures = schedule.len(), "league validated");

        Ok(League {
            name,
            roster,
            schedule,
        })
    }

    /// Load roster and fixtures from CSV files.
    pub fn from_csv_files(
        name: impl Into<String>,
        roster_path: impl AsRef<Path>,
        fixtures_path: impl AsRef<Path>,
        expected_size: Option<usize>,
    ) -> Result<Self, LeagueError> {
        let roster_path = roster_path.as_ref();
        let fixtures_path = fixtures_path.as_ref();

        let roster = load_roster_from_reader(open(roster_path)?)
            .map_err(|e| csv_error(roster_path.display().to_string(), e))?;
        let fixtures = load_fixtures_from_reader(open(fixtures_path)?)
            .map_err(|e| csv_error(fixtures_path.display().to_string(), e))?;

        info!(
            "Loaded {} competitors from {} and {} fixtures from {}",
            roster.len(),
            roster_path.display(),
            fixtures.len(),
            fixtures_path.display()
        );

        League::new(name, roster, fixtures, expected_size)
    }

    /// The bundled 2019/20 Premier League: opening ratings, 2018/19 goal
    /// records, and the real fixture order.
    pub fn premier_league_2019() -> Result<Self, LeagueError> {
        let roster = load_roster_from_reader(PREMIER_LEAGUE_2019_ROSTER.as_bytes())
            .map_err(|e| csv_error("embedded roster", e))?;
        let fixtures = load_fixtures_from_reader(PREMIER_LEAGUE_2019_FIXTURES.as_bytes())
            .map_err(|e| csv_error("embedded fixtures", e))?;
        League::new(PREMIER_LEAGUE_2019_NAME, roster, fixtures, Some(20))
    }

    /// Build the league described by the `[league]` config table. Falls back
    /// to the bundled league when no data files are configured.
    pub fn from_config(config: &LeagueConfig) -> Result<Self, LeagueError> {
        match (&config.roster, &config.fixtures) {
            (Some(roster), Some(fixtures)) => {
                let name = config.name.as_deref().unwrap_or("Custom league");
                League::from_csv_files(name, roster, fixtures, config.teams)
            }
            _ => {
                let league = League::premier_league_2019()?;
                match config.teams {
                    Some(expected) if expected != league.len() => Err(LeagueError::SizeMismatch {
                        expected,
                        found: league.len(),
                    }),
                    _ => Ok(league),
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roster(&self) -> &[Competitor] {
        &self.roster
    }

    /// Fixtures as (home, away) roster indices, in playing order
    pub fn schedule(&self) -> &[(usize, usize)] {
        &self.schedule
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roster.iter().map(|c| c.name.as_str())
    }

    /// Matches each competitor plays in one season
    pub fn games_per_competitor(&self) -> u32 {
        2 * (self.roster.len() as u32 - 1)
    }

    /// Per-season state for every competitor, in roster order, with baseline
    /// ratings and zeroed stats.
    pub fn fresh_season(&self) -> Vec<SeasonRecord> {
        self.roster
            .iter()
            .enumerate()
            .map(|(i, c)| SeasonRecord::new(i, c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawCompetitor {
    name: String,
    rating: f64,
    home_scored: u32,
    home_conceded: u32,
    away_scored: u32,
    away_conceded: u32,
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    #[serde(default)]
    round: u32,
    home: String,
    away: String,
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

/// Parse a roster CSV: `name,rating,home_scored,home_conceded,away_scored,away_conceded`.
pub fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Vec<Competitor>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    reader
        .deserialize::<RawCompetitor>()
        .map(|row| {
            row.map(|raw| {
                Competitor::new(
                    raw.name,
                    raw.rating,
                    GoalHistory::new(
                        raw.home_scored,
                        raw.home_conceded,
                        raw.away_scored,
                        raw.away_conceded,
                    ),
                )
            })
        })
        .collect()
}

/// Parse a fixture CSV: `round,home,away` (the round column is optional).
pub fn load_fixtures_from_reader<R: Read>(rdr: R) -> Result<Vec<Fixture>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    reader
        .deserialize::<RawFixture>()
        .map(|row| row.map(|raw| Fixture::new(raw.round, raw.home, raw.away)))
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, LeagueError> {
    std::fs::File::open(path).map_err(|source| LeagueError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_error(source_name: impl Into<String>, source: csv::Error) -> LeagueError {
    LeagueError::Csv {
        source_name: source_name.into(),
        source,
    }
}
