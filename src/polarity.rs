//! Sentence polarity estimation.
//!
//! The segmenter only needs a deterministic score in roughly [-1, 1] per
//! sentence. [`PolarityScorer`] is the seam; [`LexiconPolarity`] is the
//! default word-valence implementation.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// A deterministic sentence polarity estimator.
pub trait PolarityScorer: Send + Sync {
    /// Score a lowercase sentence. Must return the same value for the same input.
    fn polarity(&self, sentence: &str) -> f64;
}

impl<F> PolarityScorer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn polarity(&self, sentence: &str) -> f64 {
        self(sentence)
    }
}

// ---------------------------------------------------------------------------
// Word lists
// ---------------------------------------------------------------------------

static VALENCES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        // Positive
        ("amazing", 0.6),
        ("awesome", 1.0),
        ("beautiful", 0.85),
        ("best", 1.0),
        ("bright", 0.7),
        ("brilliant", 0.9),
        ("comfortable", 0.4),
        ("convenient", 0.3),
        ("durable", 0.4),
        ("easy", 0.43),
        ("excellent", 1.0),
        ("fantastic", 0.4),
        ("favorite", 0.5),
        ("fine", 0.42),
        ("fun", 0.3),
        ("glad", 0.5),
        ("good", 0.7),
        ("gorgeous", 0.7),
        ("great", 0.8),
        ("happy", 0.8),
        ("impressive", 1.0),
        ("lovely", 0.5),
        ("love", 0.5),
        ("loved", 0.7),
        ("loves", 0.5),
        ("nice", 0.6),
        ("perfect", 1.0),
        ("perfectly", 1.0),
        ("pleased", 0.5),
        ("recommend", 0.4),
        ("rich", 0.375),
        ("smooth", 0.4),
        ("smoothly", 0.4),
        ("sturdy", 0.4),
        ("vibrant", 0.5),
        ("well", 0.2),
        ("wonderful", 1.0),
        ("worth", 0.3),
        // Negative
        ("annoying", -0.8),
        ("awful", -1.0),
        ("bad", -0.7),
        ("broke", -0.4),
        ("broken", -0.4),
        ("cheap", -0.2),
        ("disappointed", -0.75),
        ("disappointing", -0.6),
        ("dry", -0.2),
        ("dull", -0.35),
        ("faded", -0.3),
        ("flimsy", -0.5),
        ("horrible", -1.0),
        ("junk", -0.6),
        ("messy", -0.5),
        ("poor", -0.4),
        ("poorly", -0.4),
        ("sad", -0.5),
        ("scratchy", -0.4),
        ("terrible", -1.0),
        ("ugly", -0.7),
        ("unhappy", -0.6),
        ("useless", -0.5),
        ("waste", -0.6),
        ("worse", -0.4),
        ("worst", -1.0),
        ("wrong", -0.5),
    ]
    .into_iter()
    .collect()
});

static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("absolutely", 1.5),
        ("extremely", 1.5),
        ("incredibly", 1.5),
        ("really", 1.3),
        ("so", 1.3),
        ("super", 1.3),
        ("very", 1.3),
        ("somewhat", 0.7),
        ("slightly", 0.5),
        ("bit", 0.6),
    ]
    .into_iter()
    .collect()
});

static NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "without", "cannot", "dont", "doesnt", "didnt", "isnt",
    "wasnt", "arent", "werent", "wont", "cant", "couldnt", "shouldnt", "hardly",
];

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?").unwrap());

// ---------------------------------------------------------------------------
// Lexicon scorer
// ---------------------------------------------------------------------------

/// Averages word valences, scaled by a preceding intensifier and flipped
/// (times `negation_factor`) by a negation within `negation_window` tokens.
#[derive(Debug, Clone)]
pub struct LexiconPolarity {
    negation_factor: f64,
    negation_window: usize,
}

impl Default for LexiconPolarity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl LexiconPolarity {
    pub const DEFAULT: Self = Self {
        negation_factor: -0.5,
        negation_window: 3,
    };

    pub fn new() -> Self {
        Self::default()
    }
}

fn normalize_token(raw: &str) -> String {
    // "doesn't" and "doesnt" must compare equal against NEGATIONS
    if raw.ends_with("n't") {
        raw.replace('\'', "")
    } else {
        raw.split('\'').next().unwrap_or(raw).to_string()
    }
}

impl PolarityScorer for LexiconPolarity {
    fn polarity(&self, sentence: &str) -> f64 {
        // scraped text often uses typographic apostrophes in contractions
        let lowered = sentence
            .to_lowercase()
            .replace(&['\u{2019}', '\u{2018}'][..], "'");
        let tokens: Vec<String> = WORD_RE
            .find_iter(&lowered)
            .map(|m| normalize_token(m.as_str()))
            .collect();

        let mut scores: Vec<f64> = Vec::new();
        let mut last_negation: Option<usize> = None;
        let mut intensity = 1.0;

        for (i, tok) in tokens.iter().enumerate() {
            if NEGATIONS.contains(&tok.as_str()) {
                last_negation = Some(i);
                continue;
            }
            if let Some(&mult) = INTENSIFIERS.get(tok.as_str()) {
                intensity *= mult;
                continue;
            }
            if let Some(&base) = VALENCES.get(tok.as_str()) {
                let mut value = base * intensity;
                let negated = last_negation
                    .map(|n| i - n <= self.negation_window)
                    .unwrap_or(false);
                if negated {
                    value *= self.negation_factor;
                    last_negation = None;
                }
                scores.push(value.clamp(-1.0, 1.0));
            }
            // intensifiers only reach the word right after them
            intensity = 1.0;
        }

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}
