pub mod features;
pub mod invoker;

pub use features::{derive_features, DerivedFeatures, MatchSnapshot};
pub use invoker::{ChancePrediction, PredictionError, Predictor};
