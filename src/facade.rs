use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::DataQualityWarning;
use crate::lexicon::{Axis, LexiconStore};
use crate::matcher::{pain_evidence, Evidence};
use crate::persona::{cross_tab, distribution, AxisDistribution, CrossTab, PersonaTags};
use crate::polarity::{LexiconPolarity, PolarityScorer};
use crate::scorer::{rank_opportunities, score_dimensions, DimensionScore, OpportunityOutlook};
use crate::segment::{segment_reviews, Review, Sentence};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// One output row per sentence: the sentence plus its persona labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedSentence {
    pub scope: String,
    #[serde(flatten)]
    pub sentence: Sentence,
    #[serde(flatten)]
    pub personas: PersonaTags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeReport {
    pub scope: String,
    pub review_count: usize,
    pub sentence_count: usize,
    /// Mean star rating over the scope's sentence rows.
    pub average_rating: f64,
    pub total_highlights: u64,
    pub total_pain_points: u64,
    /// Highlights as a percent of highlights plus pain points.
    pub health_pct: f64,
    pub dimensions: Vec<DimensionScore>,
    pub opportunities: OpportunityOutlook,
    pub personas: Vec<AxisDistribution>,
    pub persona_by_usage: CrossTab,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub scopes: Vec<ScopeReport>,
    pub sentences: Vec<AnnotatedSentence>,
    pub warnings: Vec<DataQualityWarning>,
}

impl AnalysisReport {
    pub fn scope(&self, name: &str) -> Option<&ScopeReport> {
        self.scopes.iter().find(|s| s.scope == name)
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Runs segmentation, dimension scoring and persona tagging over a batch.
///
/// Holds only shared references and is cheap to construct per call.
pub struct Analyzer<'a> {
    store: &'a LexiconStore,
    scorer: &'a dyn PolarityScorer,
}

static DEFAULT_SCORER: LexiconPolarity = LexiconPolarity::DEFAULT;

impl<'a> Analyzer<'a> {
    pub fn new(store: &'a LexiconStore) -> Self {
        Self {
            store,
            scorer: &DEFAULT_SCORER,
        }
    }

    pub fn with_scorer(store: &'a LexiconStore, scorer: &'a dyn PolarityScorer) -> Self {
        Self { store, scorer }
    }

    /// Analyze a batch of reviews, one scope per variant in first-seen order.
    pub fn analyze(&self, reviews: &[Review]) -> AnalysisReport {
        info!(reviews = reviews.len(), "starting analysis");

        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, review) in reviews.iter().enumerate() {
            let key = review.variant.as_str();
            groups
                .entry(key)
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(idx);
        }

        let mut scopes = Vec::with_capacity(order.len());
        let mut rows = Vec::new();
        let mut warnings = Vec::new();
        for scope in order {
            let members = &groups[scope];
            let (sentences, mut skipped) =
                segment_reviews(members.iter().map(|&i| (i, &reviews[i])), self.scorer);
            warnings.append(&mut skipped);

            let tags = self.tag_sentences(&sentences);
            let mut report = self.build_report(scope, &sentences, &tags, &mut warnings);
            report.review_count = members.len();
            scopes.push(report);

            rows.extend(sentences.into_iter().zip(tags).map(|(sentence, personas)| {
                AnnotatedSentence {
                    scope: scope.to_string(),
                    sentence,
                    personas,
                }
            }));
        }

        info!(
            scopes = scopes.len(),
            sentences = rows.len(),
            warnings = warnings.len(),
            "analysis finished"
        );
        AnalysisReport {
            scopes,
            sentences: rows,
            warnings,
        }
    }

    /// Analyze an already-segmented scope.
    ///
    /// `review_count` is the number of distinct `review_index` values among
    /// the sentences, so hand-built sentences need [`Sentence::in_review`].
    pub fn analyze_scope(&self, scope: &str, sentences: &[Sentence]) -> ScopeReport {
        let tags = self.tag_sentences(sentences);
        let mut warnings = Vec::new();
        self.build_report(scope, sentences, &tags, &mut warnings)
    }

    /// Quoted low-rated sentences behind a dimension's pain points.
    /// `None` when the dimension is not configured.
    pub fn pain_evidence(&self, dimension: &str, sentences: &[Sentence]) -> Option<Vec<Evidence>> {
        let dim = self.store.dimension(dimension)?;
        Some(pain_evidence(dim, sentences, self.store.hyperparameters()))
    }

    fn tag_sentences(&self, sentences: &[Sentence]) -> Vec<PersonaTags> {
        sentences
            .iter()
            .map(|s| PersonaTags::classify(self.store, &s.text))
            .collect()
    }

    fn build_report(
        &self,
        scope: &str,
        sentences: &[Sentence],
        tags: &[PersonaTags],
        warnings: &mut Vec<DataQualityWarning>,
    ) -> ScopeReport {
        if sentences.is_empty() {
            let w = DataQualityWarning::EmptyScope {
                scope: scope.to_string(),
            };
            warn!("{w}");
            warnings.push(w);
        }
        debug!(scope, sentences = sentences.len(), "scoring scope");

        let dimensions = score_dimensions(self.store, sentences);
        let opportunities =
            rank_opportunities(&dimensions, self.store.hyperparameters().top_opportunities);

        let total_highlights: u64 = dimensions.iter().map(|d| d.highlights).sum();
        let total_pain_points: u64 = dimensions.iter().map(|d| d.pain_points).sum();
        let signal = total_highlights + total_pain_points;
        let health_pct = if signal > 0 {
            (total_highlights as f64 / signal as f64 * 100.0).round()
        } else {
            0.0
        };
        let average_rating = if sentences.is_empty() {
            0.0
        } else {
            let mean = sentences.iter().map(|s| s.rating).sum::<f64>() / sentences.len() as f64;
            (mean * 100.0).round() / 100.0
        };

        let rows = || tags.iter().zip(sentences.iter().map(|s| s.rating));
        let personas = self
            .store
            .axes()
            .iter()
            .map(|lex| distribution(lex, rows()))
            .collect();
        let persona_by_usage = cross_tab(
            self.store.axis(Axis::BuyerRole),
            self.store.axis(Axis::UsageScenario),
            rows(),
        );

        let review_count = sentences
            .iter()
            .map(|s| s.review_index)
            .collect::<HashSet<_>>()
            .len();

        ScopeReport {
            scope: scope.to_string(),
            review_count,
            sentence_count: sentences.len(),
            average_rating,
            total_highlights,
            total_pain_points,
            health_pct,
            dimensions,
            opportunities,
            personas,
            persona_by_usage,
        }
    }
}

/// Analyze `reviews` with the default polarity scorer.
pub fn analyze(store: &LexiconStore, reviews: &[Review]) -> AnalysisReport {
    Analyzer::new(store).analyze(reviews)
}
