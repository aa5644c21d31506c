//! Chase-state feature derivation.
//!
//! The classifier scores engineered features, not the raw scoreboard, so
//! every prediction starts by re-deriving the exact quantities the model
//! was trained on. Overs arrive in cricket notation (12.4 = twelve overs
//! and four balls) but the training pipeline multiplied that notation
//! straight through as a decimal, so 12.4 overs leaves 45.6 "balls".
//! The derivation reproduces that arithmetic bit-for-bit; normalizing the
//! notation here would shift every input away from the distribution the
//! model learned.

use serde::Deserialize;

/// Raw match situation as submitted by the user. Built fresh per request,
/// never mutated, never stored.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchSnapshot {
    pub batting_team: String,
    pub bowling_team: String,
    /// Host city of the venue.
    pub city: String,
    /// Runs the batting side must exceed to win.
    pub target: u32,
    /// Runs scored so far. A score past the target is accepted and flows
    /// through as a negative `runs_left`.
    pub score: u32,
    /// Overs completed in cricket notation, 0.0–20.0.
    pub overs: f64,
    /// Wickets fallen, 0–10.
    pub wickets: u32,
}

/// Engineered features in the classifier's training units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    /// Signed; negative once the target has already been passed.
    pub runs_left: f64,
    /// May be fractional (overs notation) or non-positive (innings done).
    pub balls_left: f64,
    pub remaining_wickets: f64,
    pub current_run_rate: f64,
    /// Defined as 0 when no balls remain, rather than dividing by zero.
    pub required_run_rate: f64,
}

/// Derive the model's feature set from a raw snapshot.
///
/// Pure computation. Precondition: `overs > 0` — the current run rate is a
/// direct division, and callers short-circuit a zero-over snapshot with a
/// user-visible warning instead of calling this. Nothing else is
/// validated: out-of-range wickets, an over-run innings, or a passed
/// target all pass through as ordinary feature values.
pub fn derive_features(snapshot: &MatchSnapshot) -> DerivedFeatures {
    let runs_left = f64::from(snapshot.target) - f64::from(snapshot.score);
    let balls_left = 120.0 - snapshot.overs * 6.0;
    let remaining_wickets = 10.0 - f64::from(snapshot.wickets);
    let current_run_rate = f64::from(snapshot.score) / snapshot.overs;
    let required_run_rate = if balls_left > 0.0 {
        runs_left * 6.0 / balls_left
    } else {
        0.0
    };

    DerivedFeatures {
        runs_left,
        balls_left,
        remaining_wickets,
        current_run_rate,
        required_run_rate,
    }
}
