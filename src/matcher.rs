use std::collections::HashSet;

use serde::Serialize;

use crate::hyperparameters::Hyperparameters;
use crate::lexicon::{Dimension, Tag, Valence};
use crate::segment::Sentence;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Match result for one tag over one scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagMatch {
    pub tag: String,
    #[serde(skip)]
    pub suffix: String,
    pub valence: Valence,
    /// Sentences containing any trigger phrase.
    pub raw_matches: usize,
    /// Matches surviving the valence filter. Equal to `raw_matches` for neutral tags.
    pub valid_matches: usize,
    /// Per-match weight applied to `valid_matches`.
    pub weight: f64,
    /// Mean parent rating of the valid matches.
    pub mean_rating: Option<f64>,
    #[serde(skip)]
    pub valid_ratings: Vec<f64>,
}

impl TagMatch {
    pub fn weighted_count(&self) -> f64 {
        self.valid_matches as f64 * self.weight
    }
}

/// Match results for every non-empty tag of a dimension, in configured order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionMatch {
    pub dimension: String,
    pub tags: Vec<TagMatch>,
}

impl DimensionMatch {
    pub fn with_valence(&self, valence: Valence) -> impl Iterator<Item = &TagMatch> {
        self.tags.iter().filter(move |t| t.valence == valence)
    }
}

/// A sentence quoted as evidence for a pain point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    pub rating: f64,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Valence filter
// ---------------------------------------------------------------------------

/// Whether a raw phrase hit counts for a tag of the given valence.
///
/// Negative tags need low polarity or a low rating, positive tags the mirror
/// image. Neutral tags accept every hit.
pub fn accepts(valence: Valence, sentence: &Sentence, hp: &Hyperparameters) -> bool {
    match valence {
        Valence::Negative => {
            sentence.polarity < hp.negative_polarity_ceiling
                || sentence.rating <= hp.negative_rating_ceiling
        }
        Valence::Positive => {
            sentence.polarity > hp.positive_polarity_floor
                || sentence.rating >= hp.positive_rating_floor
        }
        Valence::Neutral => true,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

pub fn match_tag(tag: &Tag, sentences: &[Sentence], hp: &Hyperparameters) -> TagMatch {
    let mut raw_matches = 0;
    let mut valid_ratings = Vec::new();
    for s in sentences.iter().filter(|s| tag.matches(&s.text)) {
        raw_matches += 1;
        if accepts(tag.valence(), s, hp) {
            valid_ratings.push(s.rating);
        }
    }

    let mean_rating = mean(&valid_ratings);
    let weight = match (tag.valence(), mean_rating) {
        (Valence::Negative, Some(m)) if m <= hp.severe_mean_rating => hp.severe_weight,
        _ => hp.standard_weight,
    };

    TagMatch {
        tag: tag.name().to_string(),
        suffix: tag.suffix().to_string(),
        valence: tag.valence(),
        raw_matches,
        valid_matches: valid_ratings.len(),
        weight,
        mean_rating,
        valid_ratings,
    }
}

/// Match every tag of `dimension` against the scope's sentences.
/// Tags without phrases are skipped.
pub fn match_dimension(
    dimension: &Dimension,
    sentences: &[Sentence],
    hp: &Hyperparameters,
) -> DimensionMatch {
    DimensionMatch {
        dimension: dimension.name().to_string(),
        tags: dimension
            .tags()
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| match_tag(t, sentences, hp))
            .collect(),
    }
}

/// Low-rated sentences that hit any negative tag of the dimension.
///
/// De-duplicated on (rating, text), input order, at most
/// `hp.evidence_limit` entries.
pub fn pain_evidence(
    dimension: &Dimension,
    sentences: &[Sentence],
    hp: &Hyperparameters,
) -> Vec<Evidence> {
    let negative: Vec<&Tag> = dimension
        .tags_with(Valence::Negative)
        .filter(|t| !t.is_empty())
        .collect();
    if negative.is_empty() {
        return vec![];
    }

    let mut seen = HashSet::new();
    sentences
        .iter()
        .filter(|s| s.rating <= hp.evidence_rating_ceiling)
        .filter(|s| negative.iter().any(|t| t.matches(&s.text)))
        .filter(|s| seen.insert((s.rating.to_bits(), s.text.clone())))
        .take(hp.evidence_limit)
        .map(|s| Evidence {
            rating: s.rating,
            text: s.text.clone(),
        })
        .collect()
}
