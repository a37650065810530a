use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::hyperparameters::Hyperparameters;
use crate::lexicon::{LexiconStore, Valence};
use crate::matcher::{match_dimension, DimensionMatch};
use crate::segment::Sentence;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PainPoint {
    pub tag: String,
    pub mentions: usize,
    pub mean_rating: f64,
}

/// Aggregate statistics for one dimension over one scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: String,
    /// Integer part of `pos_score`.
    pub highlights: u64,
    /// Integer part of `neg_score`.
    pub pain_points: u64,
    pub pos_score: f64,
    pub neg_score: f64,
    pub satisfaction_pct: f64,
    pub dimension_rating: f64,
    pub vocal_count: usize,
    pub neutral_mentions: usize,
    pub confidence: f64,
    pub opportunity_index: f64,
    pub pain_breakdown: Vec<PainPoint>,
    pub pain_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedOpportunity {
    pub rank: usize,
    pub dimension: String,
    pub opportunity_index: f64,
    pub dimension_rating: f64,
    pub satisfaction_pct: f64,
    pub pain_summary: String,
}

/// Top-K weaknesses of a scope, or an explicit "nothing to fix" state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OpportunityOutlook {
    /// No dimension had a single valid negative match.
    Healthy,
    Opportunities { ranked: Vec<RankedOpportunity> },
}

impl OpportunityOutlook {
    pub fn is_healthy(&self) -> bool {
        matches!(self, OpportunityOutlook::Healthy)
    }

    pub fn ranked(&self) -> &[RankedOpportunity] {
        match self {
            OpportunityOutlook::Healthy => &[],
            OpportunityOutlook::Opportunities { ranked } => ranked,
        }
    }
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Share of positive signal in percent; 0 when there is no signal at all.
pub fn satisfaction_pct(pos_score: f64, neg_score: f64) -> f64 {
    let total = pos_score + neg_score;
    if total > 0.0 {
        (pos_score / total * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Log-scaled sample-size confidence, clamped to the configured band.
pub fn confidence(vocal_count: usize, total_sentences: usize, hp: &Hyperparameters) -> f64 {
    let expected = (total_sentences as f64 / hp.sentences_per_confidence_unit).max(1.0);
    let raw = (vocal_count as f64).ln_1p() / expected.ln_1p();
    raw.clamp(hp.confidence_floor, hp.confidence_cap)
}

pub fn opportunity_index(
    neg_score: f64,
    satisfaction_pct: f64,
    dimension_rating: f64,
    confidence: f64,
    hp: &Hyperparameters,
) -> f64 {
    let headroom = (hp.rating_ceiling - dimension_rating).max(0.0);
    let raw = neg_score * (100.0 - satisfaction_pct) * headroom / 100.0;
    round_to(raw * confidence, 2)
}

fn render_pain_summary(breakdown: &[PainPoint]) -> String {
    if breakdown.is_empty() {
        return "none".to_string();
    }
    breakdown
        .iter()
        .map(|p| {
            format!(
                "{}({} mentions / {:.1}\u{2605})",
                p.tag, p.mentions, p.mean_rating
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Turn one dimension's match results into its score.
///
/// `total_sentences` is the size of the whole scope, used for confidence.
pub fn score_dimension(
    matched: &DimensionMatch,
    total_sentences: usize,
    hp: &Hyperparameters,
) -> DimensionScore {
    let mut pos_score = 0.0;
    let mut neg_score = 0.0;
    let mut vocal_count = 0;
    let mut neutral_mentions = 0;
    let mut ratings: Vec<f64> = Vec::new();

    for tm in &matched.tags {
        match tm.valence {
            Valence::Positive => pos_score += tm.weighted_count(),
            Valence::Negative => neg_score += tm.weighted_count(),
            Valence::Neutral => neutral_mentions += tm.valid_matches,
        }
        vocal_count += tm.valid_matches;
        if tm.valence != Valence::Neutral {
            ratings.extend_from_slice(&tm.valid_ratings);
        }
    }

    let pain_breakdown: Vec<PainPoint> = matched
        .with_valence(Valence::Negative)
        .filter_map(|tm| {
            tm.mean_rating.map(|avg| PainPoint {
                tag: tm.suffix.clone(),
                mentions: tm.valid_matches,
                mean_rating: round_to(avg, 1),
            })
        })
        .collect();

    let satisfaction = satisfaction_pct(pos_score, neg_score);
    let dimension_rating = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().sum::<f64>() / ratings.len() as f64
    };
    let conf = confidence(vocal_count, total_sentences, hp);
    let opp = opportunity_index(neg_score, satisfaction, dimension_rating, conf, hp);

    DimensionScore {
        dimension: matched.dimension.clone(),
        highlights: pos_score as u64,
        pain_points: neg_score as u64,
        pos_score,
        neg_score,
        satisfaction_pct: round_to(satisfaction, 1),
        dimension_rating: round_to(dimension_rating, 2),
        vocal_count,
        neutral_mentions,
        confidence: conf,
        opportunity_index: opp,
        pain_summary: render_pain_summary(&pain_breakdown),
        pain_breakdown,
    }
}

/// Score every configured dimension over one scope's sentences.
///
/// Dimensions are independent and scored in parallel; the output keeps
/// configuration order.
pub fn score_dimensions(store: &LexiconStore, sentences: &[Sentence]) -> Vec<DimensionScore> {
    let hp = store.hyperparameters();
    store
        .dimensions()
        .par_iter()
        .map(|dim| {
            let matched = match_dimension(dim, sentences, hp);
            let score = score_dimension(&matched, sentences.len(), hp);
            debug!(
                dimension = %score.dimension,
                opportunity = score.opportunity_index,
                "dimension scored"
            );
            score
        })
        .collect()
}

/// Rank dimensions with at least one valid negative match by opportunity
/// index, highest first, keeping the top `k`. Ties keep input order.
pub fn rank_opportunities(scores: &[DimensionScore], k: usize) -> OpportunityOutlook {
    let mut candidates: Vec<&DimensionScore> =
        scores.iter().filter(|s| !s.pain_breakdown.is_empty()).collect();
    if candidates.is_empty() {
        return OpportunityOutlook::Healthy;
    }
    candidates.sort_by(|a, b| b.opportunity_index.total_cmp(&a.opportunity_index));

    let ranked = candidates
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, s)| RankedOpportunity {
            rank: i + 1,
            dimension: s.dimension.clone(),
            opportunity_index: s.opportunity_index,
            dimension_rating: s.dimension_rating,
            satisfaction_pct: s.satisfaction_pct,
            pain_summary: s.pain_summary.clone(),
        })
        .collect();
    OpportunityOutlook::Opportunities { ranked }
}
