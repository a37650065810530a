use std::path::PathBuf;

use serde::Serialize;

use crate::lexicon::Axis;

// ---------------------------------------------------------------------------
// Configuration errors (fatal, raised while building the lexicon store)
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating lexicon configuration.
///
/// Every variant is produced before any review is processed; an analysis
/// never starts with a store that failed one of these checks.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read lexicon file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML lexicon: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON lexicon: {0}")]
    Json(#[from] serde_json::Error),

    /// The tag name does not start with `positive`, `negative` or `neutral`.
    #[error(
        "tag '{tag}' in dimension '{dimension}' carries no valence marker \
         (expected a 'positive-', 'negative-' or 'neutral-' prefix)"
    )]
    UnknownValence { dimension: String, tag: String },

    #[error("dimension names must not be empty")]
    EmptyDimensionName,

    #[error("dimension '{0}' is defined more than once")]
    DuplicateDimension(String),

    #[error("classification axis '{0}' has no labels")]
    EmptyAxis(Axis),

    #[error("classification axis '{0}' is defined more than once")]
    DuplicateAxis(Axis),

    #[error("classification axis '{0}' has a label with an empty name")]
    EmptyLabelName(Axis),

    #[error("label '{label}' appears more than once on axis '{axis}'")]
    DuplicateLabel { axis: Axis, label: String },

    #[error("trigger phrases for '{owner}' failed to compile: {source}")]
    Pattern {
        owner: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),
}

// ---------------------------------------------------------------------------
// Data quality warnings (recovered locally, recorded in the report)
// ---------------------------------------------------------------------------

/// A per-review or per-scope anomaly. Recorded and logged, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// The review body was null, blank or undecodable; it contributes no sentences.
    MissingBody { review_index: usize },
    /// The star rating lies outside 1..=5; the review is skipped.
    InvalidRating { review_index: usize, rating: f64 },
    /// The scope ended up with zero sentences; its scores are all zero.
    EmptyScope { scope: String },
}

impl std::fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBody { review_index } => {
                write!(f, "review #{review_index} has no usable body, skipped")
            }
            Self::InvalidRating {
                review_index,
                rating,
            } => write!(
                f,
                "review #{review_index} has rating {rating} outside 1..=5, skipped"
            ),
            Self::EmptyScope { scope } => write!(f, "scope '{scope}' has no sentences"),
        }
    }
}
