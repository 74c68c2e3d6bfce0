/// Rating points added to the home side before any comparison
pub const HOME_FIELD_ADVANTAGE: f64 = 66.7;

/// Base of the logistic win-expectancy curve
pub const LOGISTIC_BASE: f64 = 10.0;

/// Rating difference that shifts the win odds by one factor of `LOGISTIC_BASE`
pub const LOGISTIC_DIVISOR: f64 = 400.0;

/// Rating step for a one-goal result, before margin scaling
pub const K_BASE: f64 = 10.0;

/// Exponent applied to `(1 + |goal margin|)` when scaling the rating step
pub const MARGIN_EXPONENT: f64 = 1.0;

/// Draw probability between two sides of equal (home-adjusted) rating
pub const DRAW_MAX: f64 = 0.27;

/// Width of the Gaussian draw kernel, in rating points
pub const DRAW_VARIANCE: f64 = 250.0;

/// League-wide home goals per game in the reference season (596 over 380 games)
pub const HOME_SCORING_BASELINE: f64 = 596.0 / 380.0;

/// League-wide away goals per game in the reference season (476 over 380 games)
pub const AWAY_SCORING_BASELINE: f64 = 476.0 / 380.0;

/// Points awarded for a win, draw and loss
pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;
pub const POINTS_LOSS: u32 = 0;

/// Upper bound on redraws when conditioning a score on an outcome.
///
/// Only reachable if an outcome has (numerically) zero probability under the
/// two Poisson means, which league validation rules out.
pub const MAX_SCORE_DRAWS: u32 = 100_000;

/// Seasons simulated in a full batch when nothing else is configured
pub const DEFAULT_SEASONS: u64 = 1_000_000;

/// Seasons between two checkpoint saves
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1_000;
