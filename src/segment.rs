use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DataQualityWarning;
use crate::polarity::PolarityScorer;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// One customer submission as handed over by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Free-text body; `None` when the source cell was empty or undecodable.
    pub body: Option<String>,
    /// Star rating, 1 to 5.
    pub rating: f64,
    /// Product variant the review belongs to. Used for scope grouping.
    pub variant: String,
}

impl Review {
    pub fn new(body: impl Into<String>, rating: f64, variant: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            rating,
            variant: variant.into(),
        }
    }
}

/// A lowercased sentence of a review with its polarity and parent rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentence {
    /// Position of the parent review in the input batch.
    pub review_index: usize,
    pub text: String,
    pub polarity: f64,
    pub rating: f64,
}

impl Sentence {
    /// A sentence attributed to review 0. Chain [`Sentence::in_review`] when
    /// sentences from several reviews are scored together.
    pub fn new(text: impl Into<String>, polarity: f64, rating: f64) -> Self {
        Self {
            review_index: 0,
            text: text.into().to_lowercase(),
            polarity,
            rating,
        }
    }

    pub fn in_review(mut self, review_index: usize) -> Self {
        self.review_index = review_index;
        self
    }
}

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

static SENTENCE_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["'\u{201D}\u{2019})\]]*(?:\s+|$)|\n+"#).unwrap());

/// Split text into trimmed, lowercased, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    SENTENCE_SPLIT_RE
        .split(&lowered)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn valid_rating(rating: f64) -> bool {
    rating.is_finite() && (1.0..=5.0).contains(&rating)
}

/// Segment one review.
///
/// A review with no usable body or an out-of-range rating yields the
/// matching warning instead of sentences.
pub fn segment_review(
    review_index: usize,
    review: &Review,
    scorer: &dyn PolarityScorer,
) -> Result<Vec<Sentence>, DataQualityWarning> {
    if !valid_rating(review.rating) {
        return Err(DataQualityWarning::InvalidRating {
            review_index,
            rating: review.rating,
        });
    }
    let body = match review.body.as_deref() {
        Some(b) if !b.trim().is_empty() => b,
        _ => return Err(DataQualityWarning::MissingBody { review_index }),
    };

    Ok(split_sentences(body)
        .into_iter()
        .map(|text| Sentence {
            review_index,
            polarity: scorer.polarity(&text),
            rating: review.rating,
            text,
        })
        .collect())
}

/// Segment a batch of reviews, collecting warnings for the ones skipped.
pub fn segment_reviews<'a, I>(
    reviews: I,
    scorer: &dyn PolarityScorer,
) -> (Vec<Sentence>, Vec<DataQualityWarning>)
where
    I: IntoIterator<Item = (usize, &'a Review)>,
{
    let mut sentences = Vec::new();
    let mut warnings = Vec::new();
    for (idx, review) in reviews {
        match segment_review(idx, review, scorer) {
            Ok(mut s) => sentences.append(&mut s),
            Err(w) => {
                warn!("{w}");
                warnings.push(w);
            }
        }
    }
    (sentences, warnings)
}
