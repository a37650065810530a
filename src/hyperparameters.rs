use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunable thresholds for matching and scoring.
///
/// Loaded from the optional `hyperparameters` section of a lexicon file;
/// any field left out keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hyperparameters {
    /// Negative-tag matches count when polarity is below this...
    pub negative_polarity_ceiling: f64,
    /// ...or when the parent rating is at most this.
    pub negative_rating_ceiling: f64,
    /// Positive-tag matches count when polarity is above this...
    pub positive_polarity_floor: f64,
    /// ...or when the parent rating is at least this.
    pub positive_rating_floor: f64,
    /// Mean rating at or below which negative matches are weighted as severe.
    pub severe_mean_rating: f64,
    pub severe_weight: f64,
    pub standard_weight: f64,
    pub confidence_floor: f64,
    pub confidence_cap: f64,
    /// Scope sentences per unit of expected mention volume.
    pub sentences_per_confidence_unit: f64,
    /// Must exceed 5.0 so a perfect average still yields a positive multiplier.
    pub rating_ceiling: f64,
    pub top_opportunities: usize,
    pub evidence_rating_ceiling: f64,
    pub evidence_limit: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            negative_polarity_ceiling: 0.1,
            negative_rating_ceiling: 3.0,
            positive_polarity_floor: -0.1,
            positive_rating_floor: 4.0,
            severe_mean_rating: 2.1,
            severe_weight: 1.5,
            standard_weight: 1.0,
            confidence_floor: 0.5,
            confidence_cap: 1.2,
            sentences_per_confidence_unit: 5.0,
            rating_ceiling: 5.1,
            top_opportunities: 3,
            evidence_rating_ceiling: 3.0,
            evidence_limit: 10,
        }
    }
}

impl Hyperparameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::InvalidHyperparameter(msg));

        let all_finite = [
            self.negative_polarity_ceiling,
            self.negative_rating_ceiling,
            self.positive_polarity_floor,
            self.positive_rating_floor,
            self.severe_mean_rating,
            self.severe_weight,
            self.standard_weight,
            self.confidence_floor,
            self.confidence_cap,
            self.sentences_per_confidence_unit,
            self.rating_ceiling,
            self.evidence_rating_ceiling,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return fail("all numeric values must be finite".to_string());
        }
        if self.confidence_floor <= 0.0 || self.confidence_floor > self.confidence_cap {
            return fail(format!(
                "confidence bounds must satisfy 0 < floor <= cap, got [{}, {}]",
                self.confidence_floor, self.confidence_cap
            ));
        }
        if self.sentences_per_confidence_unit <= 0.0 {
            return fail(format!(
                "sentences_per_confidence_unit must be positive, got {}",
                self.sentences_per_confidence_unit
            ));
        }
        if self.rating_ceiling <= 5.0 {
            return fail(format!(
                "rating_ceiling must exceed the 5-star maximum, got {}",
                self.rating_ceiling
            ));
        }
        if self.severe_weight < 0.0 || self.standard_weight < 0.0 {
            return fail("match weights must be non-negative".to_string());
        }
        if self.top_opportunities == 0 {
            return fail("top_opportunities must be at least 1".to_string());
        }
        Ok(())
    }
}
