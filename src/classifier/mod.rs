pub mod pipeline;

pub use pipeline::PipelineArtifact;

use serde::Serialize;
use thiserror::Error;

/// The single-row record the external classifier scores.
///
/// Column names and order are fixed by the training data: the model is
/// schema-sensitive, and a renamed or reordered column produces a rejection
/// (or, worse, a silent mispredict) rather than a usable probability. The
/// `wickets` column carries wickets *remaining*, and `total_runs_x` carries
/// the chase target, as in the training frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub batting_team: String,
    pub bowling_team: String,
    pub city: String,
    pub runs_left: f64,
    pub balls_left: f64,
    pub wickets: f64,
    pub total_runs_x: f64,
    pub crr: f64,
    pub rrr: f64,
}

impl FeatureRow {
    /// All column names, in training order.
    pub const COLUMNS: [&'static str; 9] = [
        "batting_team",
        "bowling_team",
        "city",
        "runs_left",
        "balls_left",
        "wickets",
        "total_runs_x",
        "crr",
        "rrr",
    ];

    /// The one-hot-encoded columns, in encoder order.
    pub const CATEGORICAL: [&'static str; 3] = ["batting_team", "bowling_team", "city"];

    /// The pass-through numeric columns, in training order.
    pub const NUMERIC: [&'static str; 6] =
        ["runs_left", "balls_left", "wickets", "total_runs_x", "crr", "rrr"];

    pub fn category(&self, column: &str) -> Option<&str> {
        match column {
            "batting_team" => Some(&self.batting_team),
            "bowling_team" => Some(&self.bowling_team),
            "city" => Some(&self.city),
            _ => None,
        }
    }

    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "runs_left" => Some(self.runs_left),
            "balls_left" => Some(self.balls_left),
            "wickets" => Some(self.wickets),
            "total_runs_x" => Some(self.total_runs_x),
            "crr" => Some(self.crr),
            "rrr" => Some(self.rrr),
            _ => None,
        }
    }
}

/// Two-class outcome distribution for the batting side.
///
/// Index 0 of the classifier's output is the bowling side defending the
/// target (a loss for the chase), index 1 is the chase succeeding. The two
/// sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeProbabilities {
    pub loss: f64,
    pub win: f64,
}

/// Categorical values the classifier was trained on. Anything outside
/// these sets is unscorable.
#[derive(Debug, Clone, Serialize)]
pub struct Vocabulary {
    pub batting_teams: Vec<String>,
    pub bowling_teams: Vec<String>,
    pub cities: Vec<String>,
}

/// Trait that every prediction backend must implement.
///
/// Inference is pure CPU work on an immutable loaded artifact, so the
/// trait is synchronous and safe to call concurrently from request
/// handlers.
pub trait ChaseClassifier: Send + Sync {
    /// Score one feature row into a win/loss probability pair.
    fn predict_proba(&self, row: &FeatureRow) -> Result<OutcomeProbabilities, ClassifierError>;

    /// Team and city values the model can score.
    fn vocabulary(&self) -> &Vocabulary;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Why the classifier could not produce a prediction. Every variant is
/// deterministic for a given artifact and input, so none of them is worth
/// retrying.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read model artifact {path}: {source}")]
    ArtifactRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    ArtifactParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact rejected: {0}")]
    ArtifactInvalid(String),

    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("unknown {column} value {value:?}: not in the trained vocabulary")]
    UnknownCategory { column: String, value: String },
}
