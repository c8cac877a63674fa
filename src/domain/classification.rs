//! Classification results and the probability distribution behind them.

use super::advisory::{AdvisoryRecord, advisory_for};
use super::diagnosis::{DiagnosticClass, NUM_CLASSES};
use crate::core::{DermaError, DermaResult};
use serde::Serialize;

/// How far a raw output row may drift from summing to 1 before it is treated
/// as unnormalized scores.
const NORMALIZED_TOLERANCE: f32 = 1e-3;

/// Probability mass assigned to each diagnostic class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityDistribution {
    probabilities: [f32; NUM_CLASSES],
}

impl ProbabilityDistribution {
    /// Builds a distribution from one row of classifier output.
    ///
    /// Rows that already form a distribution are kept as they are. Rows with
    /// negative entries or a sum away from 1 are read as logits and passed
    /// through softmax.
    ///
    /// # Errors
    ///
    /// Returns [`DermaError::Inference`] when the row does not have one entry
    /// per class or contains non-finite values.
    pub fn from_scores(model_name: &str, scores: &[f32]) -> DermaResult<Self> {
        let row: [f32; NUM_CLASSES] = scores.try_into().map_err(|_| {
            DermaError::inference(
                model_name,
                format!(
                    "expected {NUM_CLASSES} class scores, got {}",
                    scores.len()
                ),
            )
        })?;

        if let Some(bad) = row.iter().find(|v| !v.is_finite()) {
            return Err(DermaError::inference(
                model_name,
                format!("output contains non-finite score {bad}"),
            ));
        }

        let sum: f32 = row.iter().sum();
        let is_distribution =
            row.iter().all(|&p| p >= 0.0) && (sum - 1.0).abs() <= NORMALIZED_TOLERANCE;

        Ok(Self {
            probabilities: if is_distribution { row } else { softmax(row) },
        })
    }

    /// Probabilities in class identifier order.
    pub fn probabilities(&self) -> &[f32; NUM_CLASSES] {
        &self.probabilities
    }

    /// Probability assigned to `class`.
    pub fn probability(&self, class: DiagnosticClass) -> f32 {
        self.probabilities[class.id()]
    }

    /// The most probable class; exact ties go to the lowest identifier.
    pub fn argmax(&self) -> DiagnosticClass {
        let mut best = 0;
        for (idx, &p) in self.probabilities.iter().enumerate().skip(1) {
            if p > self.probabilities[best] {
                best = idx;
            }
        }
        DiagnosticClass::ALL[best]
    }
}

fn softmax(row: [f32; NUM_CLASSES]) -> [f32; NUM_CLASSES] {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps = row.map(|v| (v - max).exp());
    let total: f32 = exps.iter().sum();
    exps.map(|e| e / total)
}

/// One enriched classification: predicted class, its confidence and advisory.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    /// The predicted diagnostic class
    pub class: DiagnosticClass,
    /// Probability mass of the predicted class, in `[0, 1]`
    pub confidence: f32,
    /// Advisory for the predicted class
    pub advisory: &'static AdvisoryRecord,
    /// The full distribution the prediction was taken from
    pub distribution: ProbabilityDistribution,
}

impl ClassificationResult {
    /// Selects the top class of `distribution` and attaches its advisory.
    pub fn from_distribution(distribution: ProbabilityDistribution) -> Self {
        let class = distribution.argmax();
        Self {
            class,
            confidence: distribution.probability(class),
            advisory: advisory_for(class),
            distribution,
        }
    }

    /// Human-readable label of the predicted class.
    pub fn label(&self) -> &'static str {
        self.class.label()
    }

    /// Confidence as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f64 {
        crate::utils::round_to(f64::from(self.confidence) * 100.0, 2)
    }
}
