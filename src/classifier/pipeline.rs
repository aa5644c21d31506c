//! Serialized classifier pipeline: one-hot encoding over the categorical
//! columns followed by logistic regression.
//!
//! The artifact is a single JSON file produced by the model-training side.
//! Its layout (vocabularies, coefficient order, positive class at index 1
//! of the output distribution) is owned by the trainer; this module only
//! deserializes it, checks it is structurally sound, and evaluates it.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::{
    ChaseClassifier, ClassifierError, FeatureRow, OutcomeProbabilities, Vocabulary,
};

/// On-disk artifact layout.
#[derive(Debug, Deserialize)]
struct RawArtifact {
    /// Display name, e.g. "ipl-chase-lr-v1".
    #[serde(default)]
    name: Option<String>,
    /// Full column list in training order.
    schema: Vec<String>,
    /// Per-categorical-column trained category lists, in encoder order.
    encoder: Vec<RawColumnEncoder>,
    /// One-hot slot weights (encoder order) followed by numeric-column
    /// weights (schema order).
    coefficients: Vec<f64>,
    intercept: f64,
}

#[derive(Debug, Deserialize)]
struct RawColumnEncoder {
    column: String,
    categories: Vec<String>,
}

struct ColumnEncoder {
    column: String,
    categories: Vec<String>,
}

impl ColumnEncoder {
    fn index_of(&self, value: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == value)
    }
}

/// A loaded, immutable pipeline. Constructed once at startup and shared
/// read-only across requests.
pub struct PipelineArtifact {
    name: String,
    encoders: Vec<ColumnEncoder>,
    /// Coefficient index where each encoder's one-hot block starts.
    encoder_offsets: Vec<usize>,
    /// Coefficient index where the numeric block starts.
    numeric_offset: usize,
    coefficients: Vec<f64>,
    intercept: f64,
    vocabulary: Vocabulary,
}

impl PipelineArtifact {
    /// Read and validate an artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ClassifierError::ArtifactRead {
            path: path.display().to_string(),
            source,
        })?;
        let raw: RawArtifact =
            serde_json::from_slice(&bytes).map_err(|source| ClassifierError::ArtifactParse {
                path: path.display().to_string(),
                source,
            })?;
        let artifact = Self::from_raw(raw)?;
        debug!(
            "Parsed classifier artifact '{}' from {}",
            artifact.name,
            path.display()
        );
        Ok(artifact)
    }

    fn from_raw(raw: RawArtifact) -> Result<Self, ClassifierError> {
        if raw.schema != FeatureRow::COLUMNS {
            return Err(ClassifierError::SchemaMismatch(format!(
                "artifact schema {:?} does not match the expected columns {:?}",
                raw.schema,
                FeatureRow::COLUMNS
            )));
        }

        let encoded: Vec<&str> = raw.encoder.iter().map(|e| e.column.as_str()).collect();
        if encoded != FeatureRow::CATEGORICAL {
            return Err(ClassifierError::SchemaMismatch(format!(
                "artifact encodes columns {:?}, expected {:?}",
                encoded,
                FeatureRow::CATEGORICAL
            )));
        }

        let mut encoders = Vec::with_capacity(raw.encoder.len());
        let mut encoder_offsets = Vec::with_capacity(raw.encoder.len());
        let mut offset = 0usize;
        for enc in raw.encoder {
            if enc.categories.is_empty() {
                return Err(ClassifierError::ArtifactInvalid(format!(
                    "column {} has an empty category list",
                    enc.column
                )));
            }
            for (i, c) in enc.categories.iter().enumerate() {
                if enc.categories[..i].contains(c) {
                    return Err(ClassifierError::ArtifactInvalid(format!(
                        "column {} lists category {:?} twice",
                        enc.column, c
                    )));
                }
            }
            encoder_offsets.push(offset);
            offset += enc.categories.len();
            encoders.push(ColumnEncoder {
                column: enc.column,
                categories: enc.categories,
            });
        }

        let expected_len = offset + FeatureRow::NUMERIC.len();
        if raw.coefficients.len() != expected_len {
            return Err(ClassifierError::ArtifactInvalid(format!(
                "expected {} coefficients ({} one-hot slots + {} numeric columns), found {}",
                expected_len,
                offset,
                FeatureRow::NUMERIC.len(),
                raw.coefficients.len()
            )));
        }
        if raw.coefficients.iter().any(|c| !c.is_finite()) || !raw.intercept.is_finite() {
            return Err(ClassifierError::ArtifactInvalid(
                "coefficients and intercept must all be finite".into(),
            ));
        }

        let vocabulary = Vocabulary {
            batting_teams: encoders[0].categories.clone(),
            bowling_teams: encoders[1].categories.clone(),
            cities: encoders[2].categories.clone(),
        };

        Ok(PipelineArtifact {
            name: raw.name.unwrap_or_else(|| "chase-pipeline".into()),
            encoders,
            encoder_offsets,
            numeric_offset: offset,
            coefficients: raw.coefficients,
            intercept: raw.intercept,
            vocabulary,
        })
    }
}

impl ChaseClassifier for PipelineArtifact {
    fn predict_proba(&self, row: &FeatureRow) -> Result<OutcomeProbabilities, ClassifierError> {
        let mut acc = self.intercept;

        // One-hot blocks: each categorical contributes exactly one weight.
        for (enc, base) in self.encoders.iter().zip(&self.encoder_offsets) {
            let value = row.category(&enc.column).ok_or_else(|| {
                ClassifierError::SchemaMismatch(format!(
                    "feature row has no categorical column {}",
                    enc.column
                ))
            })?;
            let slot = enc
                .index_of(value)
                .ok_or_else(|| ClassifierError::UnknownCategory {
                    column: enc.column.clone(),
                    value: value.to_string(),
                })?;
            acc += self.coefficients[base + slot];
        }

        // Numeric block, in schema order.
        for (i, column) in FeatureRow::NUMERIC.iter().enumerate() {
            let value = row.numeric(column).ok_or_else(|| {
                ClassifierError::SchemaMismatch(format!(
                    "feature row has no numeric column {}",
                    column
                ))
            })?;
            acc += self.coefficients[self.numeric_offset + i] * value;
        }

        let win = sigmoid(acc);
        Ok(OutcomeProbabilities {
            loss: 1.0 - win,
            win,
        })
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Numerically stable logistic sigmoid.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn raw_fixture() -> RawArtifact {
        RawArtifact {
            name: Some("test-pipeline".into()),
            schema: FeatureRow::COLUMNS.iter().map(|c| c.to_string()).collect(),
            encoder: vec![
                RawColumnEncoder {
                    column: "batting_team".into(),
                    categories: vec!["Chasers".into(), "Defenders".into()],
                },
                RawColumnEncoder {
                    column: "bowling_team".into(),
                    categories: vec!["Chasers".into(), "Defenders".into()],
                },
                RawColumnEncoder {
                    column: "city".into(),
                    categories: vec!["Mumbai".into()],
                },
            ],
            // 2 + 2 + 1 one-hot slots, then the 6 numeric columns.
            coefficients: vec![
                0.10, -0.10, // batting_team
                -0.05, 0.05, // bowling_team
                0.00, // city
                -0.03, 0.02, 0.20, 0.00, 0.05, -0.10,
            ],
            intercept: 0.0,
        }
    }

    fn row() -> FeatureRow {
        FeatureRow {
            batting_team: "Chasers".into(),
            bowling_team: "Defenders".into(),
            city: "Mumbai".into(),
            runs_left: 90.0,
            balls_left: 60.0,
            wickets: 7.0,
            total_runs_x: 180.0,
            crr: 9.0,
            rrr: 9.0,
        }
    }

    #[test]
    fn probabilities_sum_to_one_and_match_the_linear_score() {
        let pipe = PipelineArtifact::from_raw(raw_fixture()).unwrap();
        let p = pipe.predict_proba(&row()).unwrap();

        // Hand-computed: 0.10 + 0.05 + 0.00 + (-0.03*90) + (0.02*60)
        //   + (0.20*7) + (0.00*180) + (0.05*9) + (-0.10*9)
        let z: f64 = 0.10 + 0.05 - 2.7 + 1.2 + 1.4 + 0.0 + 0.45 - 0.9;
        assert_relative_eq!(p.win, 1.0 / (1.0 + (-z).exp()), epsilon = 1e-12);
        assert_relative_eq!(p.win + p.loss, 1.0, epsilon = 1e-9);
        assert!((0.0..=1.0).contains(&p.win));
        assert!((0.0..=1.0).contains(&p.loss));
    }

    #[test]
    fn identical_rows_score_identically() {
        let pipe = PipelineArtifact::from_raw(raw_fixture()).unwrap();
        let a = pipe.predict_proba(&row()).unwrap();
        let b = pipe.predict_proba(&row()).unwrap();
        assert_eq!(a.win.to_bits(), b.win.to_bits());
        assert_eq!(a.loss.to_bits(), b.loss.to_bits());
    }

    #[test]
    fn unknown_team_is_rejected() {
        let pipe = PipelineArtifact::from_raw(raw_fixture()).unwrap();
        let mut r = row();
        r.batting_team = "Invaders".into();
        match pipe.predict_proba(&r) {
            Err(ClassifierError::UnknownCategory { column, value }) => {
                assert_eq!(column, "batting_team");
                assert_eq!(value, "Invaders");
            }
            other => panic!("expected UnknownCategory, got {:?}", other.map(|p| p.win)),
        }
    }

    #[test]
    fn unknown_city_is_rejected() {
        let pipe = PipelineArtifact::from_raw(raw_fixture()).unwrap();
        let mut r = row();
        r.city = "Atlantis".into();
        assert!(matches!(
            pipe.predict_proba(&r),
            Err(ClassifierError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn wrong_schema_order_is_rejected_at_load() {
        let mut raw = raw_fixture();
        raw.schema.swap(0, 1);
        assert!(matches!(
            PipelineArtifact::from_raw(raw),
            Err(ClassifierError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn coefficient_count_mismatch_is_rejected_at_load() {
        let mut raw = raw_fixture();
        raw.coefficients.pop();
        assert!(matches!(
            PipelineArtifact::from_raw(raw),
            Err(ClassifierError::ArtifactInvalid(_))
        ));
    }

    #[test]
    fn duplicate_category_is_rejected_at_load() {
        let mut raw = raw_fixture();
        raw.encoder[2].categories = vec!["Mumbai".into(), "Mumbai".into()];
        raw.coefficients.insert(5, 0.0);
        assert!(matches!(
            PipelineArtifact::from_raw(raw),
            Err(ClassifierError::ArtifactInvalid(_))
        ));
    }

    #[test]
    fn non_finite_coefficient_is_rejected_at_load() {
        let mut raw = raw_fixture();
        raw.coefficients[0] = f64::NAN;
        assert!(matches!(
            PipelineArtifact::from_raw(raw),
            Err(ClassifierError::ArtifactInvalid(_))
        ));
    }

    #[test]
    fn missing_artifact_file_is_a_read_error() {
        assert!(matches!(
            PipelineArtifact::load("does/not/exist.json"),
            Err(ClassifierError::ArtifactRead { .. })
        ));
    }

    #[test]
    fn vocabulary_mirrors_the_encoder() {
        let pipe = PipelineArtifact::from_raw(raw_fixture()).unwrap();
        let v = pipe.vocabulary();
        assert_eq!(v.batting_teams, vec!["Chasers", "Defenders"]);
        assert_eq!(v.cities, vec!["Mumbai"]);
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_relative_eq!(sigmoid(0.0), 0.5, epsilon = 1e-12);
        assert!(sigmoid(1000.0) <= 1.0 && sigmoid(1000.0) > 0.999);
        assert!(sigmoid(-1000.0) >= 0.0 && sigmoid(-1000.0) < 0.001);
    }
}
