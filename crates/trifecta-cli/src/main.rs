//! `trifecta` — run the candidate analysis pipeline from the command line.
//!
//! # Usage
//!
//! ```
//! trifecta --performance perf.jsonl --candidates candidates.jsonl \
//!   --ai-ratings ai.jsonl --human-ratings human.jsonl --out snapshot.json
//! trifecta --config run.toml --performance perf.jsonl --out snapshot.json \
//!   --export export.json
//! ```

mod report;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use trifecta_core::{config::RunConfig, quality::SkippedRow};
use trifecta_ingest::{
  parse_performance_rows, parse_profile_rows, parse_rating_rows,
  performance_idents,
};
use trifecta_pipeline::RunInput;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "trifecta", about = "Candidate analysis pipeline")]
struct Args {
  /// Path to the TOML run configuration.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Daily performance rows (JSON lines).
  #[arg(long, value_name = "FILE")]
  performance: Option<PathBuf>,

  /// Candidate-profile rows (JSON lines).
  #[arg(long, value_name = "FILE")]
  candidates: Option<PathBuf>,

  /// AI candidate-rating rows (JSON lines).
  #[arg(long, value_name = "FILE")]
  ai_ratings: Option<PathBuf>,

  /// Human candidate-rating rows (JSON lines).
  #[arg(long, value_name = "FILE")]
  human_ratings: Option<PathBuf>,

  /// Where to write the run snapshot (JSON).
  #[arg(short, long, value_name = "FILE")]
  out: Option<PathBuf>,

  /// Where to write the PII-stripped export document (JSON).
  #[arg(long, value_name = "FILE")]
  export: Option<PathBuf>,

  /// Print the validated effective configuration and exit.
  #[arg(long)]
  print_config: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load configuration: defaults ← file ← TRIFECTA_* environment.
  let mut builder = config::Config::builder();
  if let Some(path) = &args.config {
    builder = builder.add_source(config::File::from(path.clone()));
  }
  let settings = builder
    .add_source(config::Environment::with_prefix("TRIFECTA"))
    .build()
    .context("failed to read configuration")?;
  let cfg: RunConfig = settings
    .try_deserialize()
    .context("failed to deserialise run configuration")?;
  cfg.validate().context("invalid run configuration")?;

  if args.print_config {
    print!("{}", toml::to_string_pretty(&cfg)?);
    return Ok(());
  }

  let performance_path = args
    .performance
    .as_deref()
    .context("--performance is required")?;

  // Ingest, tolerating bad rows and carrying them into the quality log.
  let mut skipped: Vec<SkippedRow> = Vec::new();

  let perf_rows = sift(
    parse_performance_rows(&read_input(performance_path)?),
    "performance",
    &mut skipped,
  );
  let candidate_pool = match args.candidates.as_deref() {
    Some(path) => sift(
      parse_profile_rows(&read_input(path)?),
      "candidates",
      &mut skipped,
    ),
    None => Vec::new(),
  };
  let mut ratings = Vec::new();
  for (path, source, label) in [
    (&args.ai_ratings, trifecta_core::rating::RatingSource::Ai, "ai_ratings"),
    (
      &args.human_ratings,
      trifecta_core::rating::RatingSource::Human,
      "human_ratings",
    ),
  ] {
    if let Some(path) = path.as_deref() {
      ratings.extend(sift(
        parse_rating_rows(&read_input(path)?, source),
        label,
        &mut skipped,
      ));
    }
  }

  let input = RunInput {
    performance_idents: performance_idents(&perf_rows),
    candidate_pool,
    records: perf_rows.into_iter().map(|r| r.record).collect(),
    ratings,
    skipped_rows: skipped,
  };

  let snapshot =
    trifecta_pipeline::execute(input, &cfg).context("analysis run failed")?;

  if let Some(path) = args.out.as_deref() {
    let json = serde_json::to_vec_pretty(&snapshot)?;
    std::fs::write(path, json)
      .with_context(|| format!("writing snapshot to {}", path.display()))?;
    tracing::info!(path = %path.display(), "snapshot written");
  }

  if let Some(path) = args.export.as_deref() {
    let doc = trifecta_export::assemble(&snapshot, &cfg.export_salt);
    trifecta_export::write_atomic(&doc, path)
      .with_context(|| format!("writing export to {}", path.display()))?;
  }

  print!("{}", report::render(&snapshot));
  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn read_input(path: &Path) -> anyhow::Result<String> {
  std::fs::read_to_string(path)
    .with_context(|| format!("reading {}", path.display()))
}

/// Keep the good rows; log and collect the bad ones.
fn sift<T>(
  parsed: Vec<trifecta_ingest::Result<T>>,
  source: &str,
  skipped: &mut Vec<SkippedRow>,
) -> Vec<T> {
  let mut out = Vec::with_capacity(parsed.len());
  for result in parsed {
    match result {
      Ok(row) => out.push(row),
      Err(e) => {
        tracing::warn!(source, line = e.line(), error = %e, "skipping row");
        skipped.push(SkippedRow {
          line:   e.line(),
          source: source.to_string(),
          reason: e.to_string(),
        });
      }
    }
  }
  out
}
