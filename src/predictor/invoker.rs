//! One-shot prediction: snapshot in, probability pair out.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::classifier::{ChaseClassifier, ClassifierError, FeatureRow};

use super::features::{derive_features, MatchSnapshot};

/// Why a request produced no probability pair.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Recoverable input problem: with no overs bowled the current run
    /// rate is undefined, so the classifier is never consulted. Surfaced
    /// to the user as a warning, not a failure.
    #[error("overs completed cannot be zero")]
    NoOversBowled,

    /// The classifier could not score the request. Deterministic for the
    /// loaded artifact, so there is nothing to retry.
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// A scored chase, as handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ChancePrediction {
    pub batting_team: String,
    pub bowling_team: String,
    /// P(batting side completes the chase), in [0, 1].
    pub win_probability: f64,
    /// P(bowling side defends), in [0, 1]. Sums with the above to 1.
    pub loss_probability: f64,
}

/// Stateless request/response transform around the loaded classifier.
/// The classifier handle is created once at startup and shared; the
/// predictor itself holds no mutable state.
pub struct Predictor {
    classifier: Arc<dyn ChaseClassifier>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn ChaseClassifier>) -> Self {
        Predictor { classifier }
    }

    pub fn classifier(&self) -> &dyn ChaseClassifier {
        self.classifier.as_ref()
    }

    /// Score one match snapshot.
    ///
    /// Degenerate-but-plausible states (target already passed, innings
    /// over-run, out-of-range wickets) are scored rather than rejected;
    /// only a zero-over snapshot short-circuits.
    pub fn predict(&self, snapshot: &MatchSnapshot) -> Result<ChancePrediction, PredictionError> {
        if snapshot.overs <= 0.0 {
            return Err(PredictionError::NoOversBowled);
        }

        let f = derive_features(snapshot);
        let row = FeatureRow {
            batting_team: snapshot.batting_team.clone(),
            bowling_team: snapshot.bowling_team.clone(),
            city: snapshot.city.clone(),
            runs_left: f.runs_left,
            balls_left: f.balls_left,
            wickets: f.remaining_wickets,
            total_runs_x: f64::from(snapshot.target),
            crr: f.current_run_rate,
            rrr: f.required_run_rate,
        };

        let proba = self.classifier.predict_proba(&row)?;
        debug!(
            "{} vs {} at {}: {} needed off {} balls -> win {:.3} via {}",
            snapshot.batting_team,
            snapshot.bowling_team,
            snapshot.city,
            f.runs_left,
            f.balls_left,
            proba.win,
            self.classifier.name()
        );

        Ok(ChancePrediction {
            batting_team: snapshot.batting_team.clone(),
            bowling_team: snapshot.bowling_team.clone(),
            win_probability: proba.win,
            loss_probability: proba.loss,
        })
    }
}
