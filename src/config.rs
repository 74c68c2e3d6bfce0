// Configuration loading and validation (league.toml).
//
// Every key is optional: an empty file, or no file at all, simulates the
// bundled league with the reference model constants.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_SEASONS};
use crate::goals::ScoringBaselines;
use crate::rating::RatingModel;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub league: LeagueConfig,
    pub model: ModelConfig,
    pub batch: BatchConfig,
}

/// `[league]`: where roster and fixtures come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    pub name: Option<String>,
    /// Roster CSV; the bundled league is used unless both files are given
    pub roster: Option<PathBuf>,
    pub fixtures: Option<PathBuf>,
    /// Expected number of competitors, checked against the roster
    pub teams: Option<usize>,
}

/// `[model.rating]` and `[model.scoring]`: match model constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub rating: RatingModel,
    pub scoring: ScoringBaselines,
}

/// `[batch]`: how many seasons to run and how often to checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Stop once this many seasons have been folded in
    pub seasons: u64,
    /// Seasons between checkpoint saves
    pub checkpoint_interval: u64,
    pub checkpoint_path: PathBuf,
    /// Master seed; fresh entropy when absent
    pub seed: Option<u64>,
    /// Worker threads; rayon's global pool when absent
    pub threads: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            seasons: DEFAULT_SEASONS,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            checkpoint_path: PathBuf::from("standings.ckpt"),
            seed: None,
            threads: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

impl Config {
    /// Parse and validate a config document.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_model(&self.model)?;
        validate_batch(&self.batch)
    }
}

/// Load and validate configuration from `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    Config::from_toml_str(&text, path)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message,
    }
}

fn validate_model(model: &ModelConfig) -> Result<(), ConfigError> {
    let r = &model.rating;
    let finite_fields: &[(&str, f64)] = &[
        ("model.rating.home_field_advantage", r.home_field_advantage),
        ("model.rating.k_base", r.k_base),
        ("model.rating.margin_exponent", r.margin_exponent),
    ];
    for (name, val) in finite_fields {
        if !val.is_finite() {
            return Err(invalid(name, format!("must be finite, got {val}")));
        }
    }

    if !(r.logistic_base > 1.0 && r.logistic_base.is_finite()) {
        return Err(invalid(
            "model.rating.logistic_base",
            format!("must be greater than 1, got {}", r.logistic_base),
        ));
    }

    let positive_fields: &[(&str, f64)] = &[
        ("model.rating.logistic_divisor", r.logistic_divisor),
        ("model.rating.draw_variance", r.draw_variance),
        ("model.scoring.home", model.scoring.home),
        ("model.scoring.away", model.scoring.away),
    ];
    for (name, val) in positive_fields {
        if !(*val > 0.0 && val.is_finite()) {
            return Err(invalid(name, format!("must be > 0, got {val}")));
        }
    }

    if r.k_base < 0.0 {
        return Err(invalid("model.rating.k_base", format!("must be >= 0, got {}", r.k_base)));
    }

    if !(0.0..1.0).contains(&r.draw_max) {
        return Err(invalid(
            "model.rating.draw_max",
            format!("must be in [0.0, 1.0), got {}", r.draw_max),
        ));
    }

    Ok(())
}

fn validate_batch(batch: &BatchConfig) -> Result<(), ConfigError> {
    if batch.seasons == 0 {
        return Err(invalid("batch.seasons", "must be greater than 0".into()));
    }
    if batch.checkpoint_interval == 0 {
        return Err(invalid("batch.checkpoint_interval", "must be greater than 0".into()));
    }
    if batch.threads == Some(0) {
        return Err(invalid("batch.threads", "must be greater than 0 when set".into()));
    }
    Ok(())
}
