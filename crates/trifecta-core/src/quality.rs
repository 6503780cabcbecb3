//! The per-run data-quality report.
//!
//! Every run must account for its losses: skipped rows, unmatched and
//! ambiguous identities, insufficient-data exclusions, superseded
//! duplicate days. Silent data loss is a defect, so each counter here is
//! populated at the stage that drops the data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An input row that could not be ingested. The run continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
  /// 1-based line number within the originating input, or 0 when the
  /// row was rejected after ingestion (e.g. an unknown ordinal label).
  pub line:   usize,
  pub source: String,
  pub reason: String,
}

/// A fuzzy-cascade tie: two or more candidates within epsilon of the best
/// score. The identity is left unmatched for manual review; the tie is
/// never broken arbitrarily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousMatch {
  /// The performance-system key that could not be resolved.
  pub performance_key: String,
  /// The tied candidate-profile keys.
  pub tied_candidates: Vec<String>,
  pub best_score:      f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
  pub skipped_rows:        Vec<SkippedRow>,
  /// Performance-system keys with no resolved candidate profile.
  pub unmatched:           Vec<String>,
  pub ambiguous:           Vec<AmbiguousMatch>,
  /// Rating-system keys that resolved to no identity.
  pub unmatched_ratings:   Vec<String>,
  pub insufficient_data:   Vec<Uuid>,
  /// Same-system duplicate key errors (data-quality, never merged).
  pub duplicate_keys:      Vec<String>,
  /// (key, day) rows superseded by a later re-ingested row.
  pub superseded_days:     u32,
  /// Unparseable metric values excluded from aggregation.
  pub excluded_values:     u32,
}

impl QualityReport {
  /// True when the run lost no data anywhere.
  pub fn is_clean(&self) -> bool {
    self.skipped_rows.is_empty()
      && self.unmatched.is_empty()
      && self.ambiguous.is_empty()
      && self.unmatched_ratings.is_empty()
      && self.insufficient_data.is_empty()
      && self.duplicate_keys.is_empty()
      && self.superseded_days == 0
      && self.excluded_values == 0
  }

  /// Fraction of qualified over total candidates, in [0,1]; stamped into
  /// export metadata as the data-quality score.
  pub fn data_quality_score(qualified: u32, total: u32) -> f64 {
    if total == 0 {
      return 0.0;
    }
    f64::from(qualified) / f64::from(total)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
