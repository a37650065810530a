//! Aspect-level opinion mining for product reviews.
//!
//! Reviews are split into sentences, matched against a lexicon of product
//! dimensions whose tags carry a valence, and scored into per-dimension
//! satisfaction and opportunity figures. A second, independent pass labels
//! each sentence with buyer persona, usage scenario and purchase motivation.
//!
//! ```no_run
//! use aspect_miner::{analyze, LexiconStore, Review};
//!
//! let store = LexiconStore::builtin()?;
//! let reviews = vec![Review::new("Leaks everywhere, terrible.", 1.0, "kids set")];
//! let report = analyze(&store, &reviews);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod facade;
pub mod hyperparameters;
pub mod lexicon;
pub mod matcher;
pub mod persona;
pub mod polarity;
pub mod scorer;
pub mod segment;

pub use error::{ConfigError, DataQualityWarning};
pub use facade::{analyze, AnalysisReport, AnnotatedSentence, Analyzer, ScopeReport};
pub use hyperparameters::Hyperparameters;
pub use lexicon::{Axis, Dimension, LexiconConfig, LexiconStore, Tag, Valence};
pub use matcher::{match_dimension, pain_evidence, DimensionMatch, Evidence, TagMatch};
pub use persona::{AxisLabel, PersonaTags, UNLABELED};
pub use polarity::{LexiconPolarity, PolarityScorer};
pub use scorer::{
    rank_opportunities, score_dimension, score_dimensions, DimensionScore, OpportunityOutlook,
};
pub use segment::{segment_review, split_sentences, Review, Sentence};
