//! Task-level predictors.

pub mod lesion_classification;

pub use lesion_classification::{
    LesionClassificationPredictor, LesionClassificationPredictorBuilder,
};
