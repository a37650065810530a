//! The lexicon store: dimensions, valence-labelled tags, trigger phrases
//! and the persona/usage/motivation decision lists.
//!
//! Configuration is parsed into plain serde structs, then validated and
//! compiled once into a [`LexiconStore`]. The store is never mutated
//! afterwards and can be shared freely between threads.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::hyperparameters::Hyperparameters;

static BUILTIN_LEXICON: &str = include_str!("../config/lexicon.yaml");

// ---------------------------------------------------------------------------
// Raw configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LexiconConfig {
    #[serde(default)]
    pub dimensions: Vec<DimensionConfig>,
    #[serde(default)]
    pub axes: Vec<AxisConfig>,
    #[serde(default)]
    pub hyperparameters: Hyperparameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionConfig {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<PhraseSetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhraseSetConfig {
    #[serde(alias = "label")]
    pub name: String,
    #[serde(default)]
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisConfig {
    pub axis: Axis,
    #[serde(default)]
    pub labels: Vec<PhraseSetConfig>,
}

// ---------------------------------------------------------------------------
// Valence and axes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Valence {
    Positive,
    Negative,
    Neutral,
}

impl Valence {
    const MARKERS: [(&'static str, Valence); 3] = [
        ("positive", Valence::Positive),
        ("negative", Valence::Negative),
        ("neutral", Valence::Neutral),
    ];

    /// Resolve a tag name's leading marker into a valence and the remaining suffix.
    ///
    /// `"negative-limited-range"` gives `(Negative, "limited-range")`; a bare
    /// marker gives an empty suffix. Anything else is `None`.
    pub fn from_tag_name(name: &str) -> Option<(Valence, &str)> {
        let trimmed = name.trim();
        for (marker, valence) in Self::MARKERS {
            let Some(head) = trimmed.get(..marker.len()) else {
                continue;
            };
            if !head.eq_ignore_ascii_case(marker) {
                continue;
            }
            let rest = &trimmed[marker.len()..];
            if rest.is_empty() {
                return Some((valence, ""));
            }
            if let Some(suffix) = rest.strip_prefix('-') {
                return Some((valence, suffix.trim()));
            }
        }
        None
    }
}

impl fmt::Display for Valence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Valence::Positive => "positive",
            Valence::Negative => "negative",
            Valence::Neutral => "neutral",
        })
    }
}

/// A secondary classification axis. Each sentence gets at most one label per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    BuyerRole,
    Gender,
    AgeGroup,
    UsageScenario,
    PurchaseMotivation,
}

impl Axis {
    pub const ALL: [Axis; 5] = [
        Axis::BuyerRole,
        Axis::Gender,
        Axis::AgeGroup,
        Axis::UsageScenario,
        Axis::PurchaseMotivation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::BuyerRole => "buyer_role",
            Axis::Gender => "gender",
            Axis::AgeGroup => "age_group",
            Axis::UsageScenario => "usage_scenario",
            Axis::PurchaseMotivation => "purchase_motivation",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Compiled lexicon
// ---------------------------------------------------------------------------

/// Lowercase, trim and de-duplicate phrases, dropping blanks. Order is kept.
fn normalize_phrases(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Compile a phrase list into one case-insensitive alternation.
/// An empty list compiles to `None` and never matches.
fn compile_phrases(owner: &str, phrases: &[String]) -> Result<Option<Regex>, ConfigError> {
    if phrases.is_empty() {
        return Ok(None);
    }
    let alt = phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alt})"))
        .map(Some)
        .map_err(|source| ConfigError::Pattern {
            owner: owner.to_string(),
            source,
        })
}

#[derive(Debug, Clone)]
pub struct Tag {
    name: String,
    suffix: String,
    valence: Valence,
    phrases: Vec<String>,
    pattern: Option<Regex>,
}

impl Tag {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name without its valence marker, falling back to the full name.
    pub fn suffix(&self) -> &str {
        if self.suffix.is_empty() {
            &self.name
        } else {
            &self.suffix
        }
    }

    pub fn valence(&self) -> Valence {
        self.valence
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// True when the tag has no phrases and is skipped by the matcher.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(text))
    }
}

#[derive(Debug, Clone)]
pub struct Dimension {
    name: String,
    tags: Vec<Tag>,
}

impl Dimension {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn tags_with(&self, valence: Valence) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(move |t| t.valence == valence)
    }
}

/// One entry of an axis decision list.
#[derive(Debug, Clone)]
pub struct LabelRule {
    label: String,
    pattern: Option<Regex>,
}

impl LabelRule {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Ordered `(label, predicate)` pairs for one axis. Evaluated first to last.
#[derive(Debug, Clone)]
pub struct AxisLexicon {
    axis: Axis,
    rules: Vec<LabelRule>,
}

impl AxisLexicon {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn rules(&self) -> &[LabelRule] {
        &self.rules
    }
}

/// Validated, compiled, immutable lexicon configuration.
#[derive(Debug, Clone)]
pub struct LexiconStore {
    dimensions: Vec<Dimension>,
    axes: Vec<AxisLexicon>,
    hyperparameters: Hyperparameters,
}

impl LexiconConfig {
    /// The lexicon shipped with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_str(BUILTIN_LEXICON)
    }

    pub fn from_yaml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(src)?)
    }

    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(src)?)
    }

    /// Read a lexicon file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&src)
        } else {
            Self::from_yaml_str(&src)
        }
    }
}

impl LexiconStore {
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_config(LexiconConfig::builtin()?)
    }

    pub fn from_yaml_str(src: &str) -> Result<Self, ConfigError> {
        Self::from_config(LexiconConfig::from_yaml_str(src)?)
    }

    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        Self::from_config(LexiconConfig::from_json_str(src)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_config(LexiconConfig::from_path(path)?)
    }

    /// Validate and compile a configuration. Fails on the first problem found.
    pub fn from_config(cfg: LexiconConfig) -> Result<Self, ConfigError> {
        cfg.hyperparameters.validate()?;

        let mut names = HashSet::new();
        let mut dimensions = Vec::with_capacity(cfg.dimensions.len());
        for dim in &cfg.dimensions {
            let name = dim.name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyDimensionName);
            }
            if !names.insert(name.to_string()) {
                return Err(ConfigError::DuplicateDimension(name.to_string()));
            }

            let mut tags = Vec::with_capacity(dim.tags.len());
            for tag in &dim.tags {
                let (valence, suffix) =
                    Valence::from_tag_name(&tag.name).ok_or_else(|| {
                        ConfigError::UnknownValence {
                            dimension: name.to_string(),
                            tag: tag.name.clone(),
                        }
                    })?;
                let phrases = normalize_phrases(&tag.phrases);
                let pattern = compile_phrases(&format!("{name}/{}", tag.name), &phrases)?;
                tags.push(Tag {
                    name: tag.name.trim().to_string(),
                    suffix: suffix.to_string(),
                    valence,
                    phrases,
                    pattern,
                });
            }
            dimensions.push(Dimension {
                name: name.to_string(),
                tags,
            });
        }

        let mut axes = Vec::with_capacity(Axis::ALL.len());
        for axis in Axis::ALL {
            let mut configs = cfg.axes.iter().filter(|a| a.axis == axis);
            let Some(axis_cfg) = configs.next() else {
                return Err(ConfigError::EmptyAxis(axis));
            };
            if configs.next().is_some() {
                return Err(ConfigError::DuplicateAxis(axis));
            }
            if axis_cfg.labels.is_empty() {
                return Err(ConfigError::EmptyAxis(axis));
            }
            let mut labels = HashSet::new();
            let mut rules = Vec::with_capacity(axis_cfg.labels.len());
            for label in &axis_cfg.labels {
                let name = label.name.trim();
                if name.is_empty() {
                    return Err(ConfigError::EmptyLabelName(axis));
                }
                if !labels.insert(name) {
                    return Err(ConfigError::DuplicateLabel {
                        axis,
                        label: name.to_string(),
                    });
                }
                let phrases = normalize_phrases(&label.phrases);
                let pattern = compile_phrases(&format!("{axis}/{name}"), &phrases)?;
                rules.push(LabelRule {
                    label: name.to_string(),
                    pattern,
                });
            }
            axes.push(AxisLexicon { axis, rules });
        }

        info!(
            dimensions = dimensions.len(),
            tags = dimensions.iter().map(|d| d.tags.len()).sum::<usize>(),
            "lexicon store loaded"
        );

        Ok(Self {
            dimensions,
            axes,
            hyperparameters: cfg.hyperparameters,
        })
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn axes(&self) -> &[AxisLexicon] {
        &self.axes
    }

    pub fn axis(&self, axis: Axis) -> &AxisLexicon {
        // every axis is present after validation, in Axis::ALL order
        &self.axes[axis as usize]
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }
}
