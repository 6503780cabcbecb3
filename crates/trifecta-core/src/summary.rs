//! Performance summaries — the aggregator's derived output.
//!
//! A summary is computed per (identity, evaluation window) and recomputed
//! whenever the underlying window's raw records change; it is never edited
//! directly. Tier assignment is run-relative and filled in only after the
//! whole qualified population is known.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quartile-based classification within the current run's qualified
/// population. Recomputed every run; never comparable across runs.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTier {
  Top,
  High,
  Medium,
  Low,
}

/// Direction of the primary metric over the window, reported in the
/// metric's own direction (a rising rate metric reads Improving).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
  Improving,
  Stable,
  Declining,
}

/// Per-metric aggregate over the window's parseable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
  pub mean:     f64,
  pub stddev:   f64,
  /// Days that contributed a parseable value.
  pub samples:  usize,
  /// Days excluded because the value was unparseable (partial-record
  /// tolerance; the record's other metrics still count).
  pub excluded: usize,
}

/// Derived, one per (identity, evaluation window).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
  pub identity_id:           Uuid,
  pub window_start:          NaiveDate,
  pub window_end:            NaiveDate,
  pub days_worked:           u32,
  pub metric_stats:          BTreeMap<String, MetricStats>,
  /// Fraction of days meeting all configured goal thresholds, in [0,1].
  pub goal_achievement_rate: f64,
  /// None until run-relative tiering, and permanently None for
  /// insufficient-data summaries.
  pub performance_tier:      Option<PerformanceTier>,
  pub trend_direction:       TrendDirection,
  /// Observed span covers the full evaluation window.
  pub retention_flag:        bool,
  /// Below the minimum-days-worked threshold; excluded from tiering and
  /// scoring but still reported.
  pub insufficient_data:     bool,
  /// Total unparseable-value exclusions across all metrics.
  pub excluded_values:       u32,
}

impl PerformanceSummary {
  /// Part of the qualified population used as the normalization
  /// reference group for this run.
  pub fn is_qualified(&self) -> bool { !self.insufficient_data }

  pub fn stats(&self, metric: &str) -> Option<&MetricStats> {
    self.metric_stats.get(metric)
  }
}
