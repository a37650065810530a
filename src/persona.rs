//! Persona, usage and motivation tagging.
//!
//! Each axis is a decision list: labels are tried in configured order and
//! the first one with a phrase hit wins. Axes never influence each other.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::lexicon::{Axis, AxisLexicon, LexiconStore};

pub const UNLABELED: &str = "unlabeled";

/// The outcome of classifying one sentence on one axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AxisLabel {
    Labeled(String),
    #[default]
    Unlabeled,
}

impl AxisLabel {
    pub fn label(&self) -> Option<&str> {
        match self {
            AxisLabel::Labeled(l) => Some(l),
            AxisLabel::Unlabeled => None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.label().unwrap_or(UNLABELED)
    }
}

impl Serialize for AxisLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// First-match-wins lookup on one axis.
pub fn classify(lexicon: &AxisLexicon, text: &str) -> AxisLabel {
    lexicon
        .rules()
        .iter()
        .find(|rule| rule.matches(text))
        .map(|rule| AxisLabel::Labeled(rule.label().to_string()))
        .unwrap_or_default()
}

/// One label (or none) per axis for a sentence.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PersonaTags {
    pub buyer_role: AxisLabel,
    pub gender: AxisLabel,
    pub age_group: AxisLabel,
    pub usage_scenario: AxisLabel,
    pub purchase_motivation: AxisLabel,
}

impl PersonaTags {
    pub fn classify(store: &LexiconStore, text: &str) -> Self {
        let on = |axis| classify(store.axis(axis), text);
        Self {
            buyer_role: on(Axis::BuyerRole),
            gender: on(Axis::Gender),
            age_group: on(Axis::AgeGroup),
            usage_scenario: on(Axis::UsageScenario),
            purchase_motivation: on(Axis::PurchaseMotivation),
        }
    }

    pub fn get(&self, axis: Axis) -> &AxisLabel {
        match axis {
            Axis::BuyerRole => &self.buyer_role,
            Axis::Gender => &self.gender,
            Axis::AgeGroup => &self.age_group,
            Axis::UsageScenario => &self.usage_scenario,
            Axis::PurchaseMotivation => &self.purchase_motivation,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    /// Percent of labeled rows on this axis. Unlabeled rows are not in the base.
    pub share_pct: f64,
    pub mean_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisDistribution {
    pub axis: Axis,
    pub total_rows: usize,
    pub labeled_rows: usize,
    /// Labeled rows as a percent of all rows.
    pub coverage_pct: f64,
    pub labels: Vec<LabelShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabCell {
    pub row: String,
    pub column: String,
    pub count: usize,
    pub mean_rating: f64,
}

/// Counts of rows labeled on both axes, e.g. buyer role by usage scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub row_axis: Axis,
    pub column_axis: Axis,
    pub cells: Vec<CrossTabCell>,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 / whole as f64 * 100.0)
    }
}

#[derive(Default)]
struct Tally {
    count: usize,
    rating_sum: f64,
}

impl Tally {
    fn add(&mut self, rating: f64) {
        self.count += 1;
        self.rating_sum += rating;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| (self.rating_sum / self.count as f64 * 100.0).round() / 100.0)
    }
}

/// Label distribution on one axis over `(tags, rating)` rows.
///
/// Every configured label is listed in configured order, including ones
/// with zero rows.
pub fn distribution<'a, I>(lexicon: &AxisLexicon, rows: I) -> AxisDistribution
where
    I: IntoIterator<Item = (&'a PersonaTags, f64)>,
{
    let axis = lexicon.axis();
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    let mut total_rows = 0;
    let mut labeled_rows = 0;
    for (tags, rating) in rows {
        total_rows += 1;
        if let Some(label) = tags.get(axis).label() {
            labeled_rows += 1;
            tallies.entry(label).or_default().add(rating);
        }
    }

    let labels = lexicon
        .rules()
        .iter()
        .map(|rule| {
            let tally = tallies.get(rule.label());
            let count = tally.map_or(0, |t| t.count);
            LabelShare {
                label: rule.label().to_string(),
                count,
                share_pct: pct(count, labeled_rows),
                mean_rating: tally.and_then(Tally::mean),
            }
        })
        .collect();

    AxisDistribution {
        axis,
        total_rows,
        labeled_rows,
        coverage_pct: pct(labeled_rows, total_rows),
        labels,
    }
}

/// Cross-tabulate two axes. Only rows labeled on both axes count; cells
/// with zero rows are omitted.
pub fn cross_tab<'a, I>(rows_lex: &AxisLexicon, cols_lex: &AxisLexicon, rows: I) -> CrossTab
where
    I: IntoIterator<Item = (&'a PersonaTags, f64)>,
{
    let (row_axis, column_axis) = (rows_lex.axis(), cols_lex.axis());
    let mut tallies: HashMap<(&str, &str), Tally> = HashMap::new();
    for (tags, rating) in rows {
        if let (Some(r), Some(c)) = (tags.get(row_axis).label(), tags.get(column_axis).label()) {
            tallies.entry((r, c)).or_default().add(rating);
        }
    }

    let mut cells = Vec::new();
    for r in rows_lex.rules() {
        for c in cols_lex.rules() {
            if let Some(t) = tallies.get(&(r.label(), c.label())) {
                cells.push(CrossTabCell {
                    row: r.label().to_string(),
                    column: c.label().to_string(),
                    count: t.count,
                    mean_rating: t.mean().unwrap_or(0.0),
                });
            }
        }
    }

    CrossTab {
        row_axis,
        column_axis,
        cells,
    }
}
