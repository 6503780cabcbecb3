//! Comparison rows and run snapshots — the linker's output.
//!
//! A snapshot is built fresh per analysis run and never persisted mutably;
//! each run produces a new immutable document keyed by run date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  config::RunConfig,
  quality::QualityReport,
  rating::RatingSource,
  summary::PerformanceSummary,
};

/// A rating after normalization to [0,1], carried on the comparison row so
/// downstream consumers never see source-specific scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRating {
  pub source:      RatingSource,
  pub normalized:  f64,
  pub rating_date: NaiveDate,
}

/// One row per identity per run: the performance summary, both normalized
/// ratings when present, and per-row prediction accuracy for each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
  pub identity_id:               Uuid,
  pub display_name:              String,
  pub summary:                   PerformanceSummary,
  pub ai_rating:                 Option<NormalizedRating>,
  pub human_rating:              Option<NormalizedRating>,
  /// `1 − |normalized − goal_achievement_rate|`, bounded to [0,1].
  pub ai_prediction_accuracy:    Option<f64>,
  pub human_prediction_accuracy: Option<f64>,
  /// Weighted composite, populated for qualified identities only.
  pub composite_score:           Option<f64>,
  /// 1-based rank among qualified identities; None when unscored.
  pub rank:                      Option<u32>,
}

impl ComparisonRow {
  /// Rows with no rating at all are excluded from rating-accuracy
  /// aggregates but still count in performance-only reporting.
  pub fn has_any_rating(&self) -> bool {
    self.ai_rating.is_some() || self.human_rating.is_some()
  }
}

/// Run-level statistics, computed over the qualified population. Kept
/// separate from the per-row accuracy scalars: these are population
/// correlations, not row data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStatistics {
  /// Pearson r between AI normalized scores and realized goal
  /// achievement; None with fewer than two rated identities.
  pub ai_pearson_r:       Option<f64>,
  pub human_pearson_r:    Option<f64>,
  pub qualified_count:    u32,
  pub total_count:        u32,
  pub ai_rated_count:     u32,
  pub human_rated_count:  u32,
  pub mean_ai_accuracy:   Option<f64>,
  pub mean_human_accuracy: Option<f64>,
}

/// The immutable output of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
  pub run_id:     Uuid,
  pub run_date:   DateTime<Utc>,
  /// The exact configuration this run used, echoed for reproducibility.
  pub config:     RunConfig,
  /// Ranked rows: qualified identities first in rank order, then
  /// insufficient-data identities.
  pub rows:       Vec<ComparisonRow>,
  pub statistics: RunStatistics,
  pub quality:    QualityReport,
}
