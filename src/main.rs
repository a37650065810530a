use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aspect_miner::{Analyzer, LexiconConfig, LexiconStore, Review};

#[derive(Parser)]
#[command(
    name = "aspect-miner",
    about = "Score product reviews per aspect and rank improvement opportunities",
    version
)]
struct Cli {
    /// CSV files with a body column, a rating column and an optional variant column
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Lexicon file (YAML, or JSON by extension). Defaults to the built-in lexicon
    #[arg(short, long)]
    lexicon: Option<PathBuf>,

    /// Number of top opportunities to report per scope
    #[arg(short, long)]
    top: Option<usize>,

    /// Print compact instead of pretty JSON
    #[arg(long)]
    compact: bool,
}

const BODY_COLUMNS: &[&str] = &["body", "content", "review body", "review", "text"];
const RATING_COLUMNS: &[&str] = &["rating", "stars", "star rating", "score"];
const VARIANT_COLUMNS: &[&str] = &["variant", "sub_type", "segment"];

fn find_column(headers: &csv::ByteRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = String::from_utf8_lossy(h).trim().to_lowercase();
        names.contains(&h.as_str())
    })
}

fn read_reviews(path: &Path, first_index: usize) -> Result<Vec<Review>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = rdr
        .byte_headers()
        .with_context(|| format!("failed to read header row of {}", path.display()))?
        .clone();

    let Some(body_col) = find_column(&headers, BODY_COLUMNS) else {
        bail!("{}: no review body column (tried {BODY_COLUMNS:?})", path.display());
    };
    let Some(rating_col) = find_column(&headers, RATING_COLUMNS) else {
        bail!("{}: no rating column (tried {RATING_COLUMNS:?})", path.display());
    };
    let variant_col = find_column(&headers, VARIANT_COLUMNS);
    let default_variant = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "default".to_string());

    let mut reviews = Vec::new();
    for (row, record) in rdr.byte_records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("{}: skipping malformed row {}: {e}", path.display(), row + 1);
                continue;
            }
        };
        let index = first_index + reviews.len();

        let body = record
            .get(body_col)
            .and_then(|raw| match std::str::from_utf8(raw) {
                Ok(s) => Some(s.to_string()),
                Err(e) => {
                    warn!("review #{index}: body is not valid UTF-8 ({e})");
                    None
                }
            });
        let rating = record
            .get(rating_col)
            .and_then(|raw| std::str::from_utf8(raw).ok())
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN);
        let variant = variant_col
            .and_then(|c| record.get(c))
            .map(|raw| String::from_utf8_lossy(raw).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default_variant.clone());

        reviews.push(Review {
            body,
            rating,
            variant,
        });
    }
    info!("{}: {} reviews", path.display(), reviews.len());
    Ok(reviews)
}

fn load_store(cli: &Cli) -> Result<LexiconStore> {
    let mut config = match &cli.lexicon {
        Some(path) => LexiconConfig::from_path(path)
            .with_context(|| format!("failed to load lexicon {}", path.display()))?,
        None => LexiconConfig::builtin().context("built-in lexicon is invalid")?,
    };
    if let Some(top) = cli.top {
        config.hyperparameters.top_opportunities = top;
    }
    Ok(LexiconStore::from_config(config)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = load_store(&cli)?;

    let mut reviews = Vec::new();
    for path in &cli.files {
        let mut batch = read_reviews(path, reviews.len())?;
        reviews.append(&mut batch);
    }

    let report = Analyzer::new(&store).analyze(&reviews);
    let json = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{json}");
    Ok(())
}
