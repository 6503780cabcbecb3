//! Run configuration.
//!
//! The whole configuration is an explicit immutable object threaded
//! through every component call — never ambient state — so the same
//! pipeline can run multiple configurations side by side. It is validated
//! once, before any processing; a validation failure aborts the run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, rating::OrdinalScale};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Composite-score weights. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
  pub goal_achievement: f64,
  pub performance:      f64,
  pub efficiency:       f64,
  pub consistency:      f64,
}

impl Default for Weights {
  fn default() -> Self {
    Self {
      goal_achievement: 0.40,
      performance:      0.30,
      efficiency:       0.20,
      consistency:      0.10,
    }
  }
}

impl Weights {
  pub fn validate(&self) -> Result<()> {
    let parts = [
      self.goal_achievement,
      self.performance,
      self.efficiency,
      self.consistency,
    ];
    if parts.iter().any(|w| !(0.0..=1.0).contains(w)) {
      return Err(Error::Configuration(
        "each composite weight must lie in [0,1]".into(),
      ));
    }
    let sum: f64 = parts.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(Error::Configuration(format!(
        "composite weights must sum to 1.0, got {sum}"
      )));
    }
    Ok(())
  }
}

/// Fuzzy-matching parameters for the identity resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
  /// Minimum token-sorted name similarity to accept a fuzzy match.
  pub similarity_threshold: f64,
  /// Hire-date proximity bonus decays linearly to zero at this distance.
  pub date_tolerance_days:  i64,
  /// Two candidates within this margin of the best score tie, and the
  /// match is rejected as ambiguous.
  pub ambiguity_epsilon:    f64,
}

impl Default for MatchConfig {
  fn default() -> Self {
    Self {
      similarity_threshold: 0.85,
      date_tolerance_days:  30,
      ambiguity_epsilon:    0.01,
    }
  }
}

/// The full, immutable configuration of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
  /// Evaluation-window length in days.
  pub window_days:           u32,
  /// Identities below this are flagged insufficient-data and excluded
  /// from tiering and scoring.
  pub min_days_worked:       u32,
  /// Metric name → maximum value that still meets the daily goal.
  pub goals:                 BTreeMap<String, f64>,
  /// Metric used for trend and consistency computations.
  pub primary_metric:        String,
  /// Metric whose population-relative min-max drives the performance
  /// term of the composite score.
  pub productivity_metric:   String,
  /// Metric whose inverted min-max drives the efficiency term (lower is
  /// better, e.g. average handle time).
  pub efficiency_metric:     String,
  /// Relative change below this reads as a stable trend.
  pub trend_noise_threshold: f64,
  pub matching:              MatchConfig,
  pub weights:               Weights,
  /// Human ordinal labels, lowest to highest.
  pub ordinal_scale:         Vec<String>,
  /// Salt mixed into export identifier digests.
  pub export_salt:           String,
}

impl Default for RunConfig {
  fn default() -> Self {
    Self {
      window_days:           90,
      min_days_worked:       10,
      goals:                 BTreeMap::from(
        [
          ("talk_time_seconds", 279.0),
          ("hold_time_seconds", 10.0),
          ("after_call_work_seconds", 41.0),
          ("average_handle_time_seconds", 330.0),
        ]
        .map(|(k, v)| (k.to_string(), v)),
      ),
      primary_metric:        "hourly_interaction_rate".into(),
      productivity_metric:   "total_interactions".into(),
      efficiency_metric:     "average_handle_time_seconds".into(),
      trend_noise_threshold: 0.05,
      matching:              MatchConfig::default(),
      weights:               Weights::default(),
      ordinal_scale:         [
        "Needs Improvement",
        "Meets Expectations",
        "Exceeds Expectations",
        "Outstanding",
      ]
      .map(String::from)
      .to_vec(),
      export_salt:           "trifecta".into(),
    }
  }
}

impl RunConfig {
  /// Validate every parameter. Called once before processing; any error
  /// here is fatal to the run.
  pub fn validate(&self) -> Result<()> {
    if self.window_days == 0 {
      return Err(Error::Configuration("window_days must be positive".into()));
    }
    if self.min_days_worked == 0 {
      return Err(Error::Configuration(
        "min_days_worked must be positive".into(),
      ));
    }
    if self.goals.is_empty() {
      return Err(Error::Configuration(
        "at least one goal threshold is required".into(),
      ));
    }
    if let Some((name, value)) =
      self.goals.iter().find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
      return Err(Error::Configuration(format!(
        "goal threshold {name:?} must be finite and non-negative, got {value}"
      )));
    }
    if !(0.0..=1.0).contains(&self.matching.similarity_threshold) {
      return Err(Error::Configuration(
        "similarity_threshold must lie in [0,1]".into(),
      ));
    }
    if self.matching.date_tolerance_days < 0 {
      return Err(Error::Configuration(
        "date_tolerance_days must be non-negative".into(),
      ));
    }
    if !(0.0..1.0).contains(&self.matching.ambiguity_epsilon) {
      return Err(Error::Configuration(
        "ambiguity_epsilon must lie in [0,1)".into(),
      ));
    }
    if !(0.0..1.0).contains(&self.trend_noise_threshold) {
      return Err(Error::Configuration(
        "trend_noise_threshold must lie in [0,1)".into(),
      ));
    }
    for metric in [
      &self.primary_metric,
      &self.productivity_metric,
      &self.efficiency_metric,
    ] {
      if metric.trim().is_empty() {
        return Err(Error::Configuration("metric names must be non-empty".into()));
      }
    }
    self.weights.validate()?;
    // Surfaces empty/duplicate labels at validation time.
    self.scale()?;
    Ok(())
  }

  /// The configured ordinal scale as a checked value object.
  pub fn scale(&self) -> Result<OrdinalScale> {
    OrdinalScale::new(self.ordinal_scale.clone())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
