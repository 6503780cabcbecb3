//! Run-relative population statistics.
//!
//! Scoring and tiering are relative to the current run's qualified
//! population, so the pipeline makes two passes: pass one collects the
//! ranges and quartile thresholds here, pass two scores each summary
//! against them.

use trifecta_core::{
  config::RunConfig,
  summary::{PerformanceSummary, PerformanceTier},
};

/// Inclusive min/max of one population-level quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
  pub min: f64,
  pub max: f64,
}

impl Range {
  fn observe(range: &mut Option<Range>, v: f64) {
    match range {
      Some(r) => {
        r.min = r.min.min(v);
        r.max = r.max.max(v);
      }
      None => *range = Some(Range { min: v, max: v }),
    }
  }

  /// Min-max normalize `v` into [0,1]. A degenerate range (everyone
  /// equal) cannot distinguish anyone and maps to the neutral 0.5.
  pub fn normalize(self, v: f64) -> f64 {
    let span = self.max - self.min;
    if span.abs() < f64::EPSILON {
      return 0.5;
    }
    ((v - self.min) / span).clamp(0.0, 1.0)
  }
}

/// Goal-achievement quartile thresholds, nearest-rank over the qualified
/// population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
  pub q75: f64,
  pub q50: f64,
  pub q25: f64,
}

/// Pass-one output: everything pass two needs to score and tier a
/// summary.
#[derive(Debug, Clone, Default)]
pub struct PopulationStats {
  /// Range of per-identity productivity-metric means.
  pub productivity: Option<Range>,
  /// Range of per-identity efficiency-metric means (lower is better).
  pub efficiency:   Option<Range>,
  /// Range of per-identity primary-metric standard deviations.
  pub consistency:  Option<Range>,
  pub tiers:        Option<TierThresholds>,
}

impl PopulationStats {
  /// Collect ranges and quartiles over the qualified summaries.
  pub fn compute(qualified: &[&PerformanceSummary], cfg: &RunConfig) -> Self {
    let mut stats = Self::default();
    let mut goal_rates = Vec::with_capacity(qualified.len());

    for summary in qualified {
      goal_rates.push(summary.goal_achievement_rate);
      if let Some(s) = summary.stats(&cfg.productivity_metric) {
        Range::observe(&mut stats.productivity, s.mean);
      }
      if let Some(s) = summary.stats(&cfg.efficiency_metric) {
        Range::observe(&mut stats.efficiency, s.mean);
      }
      if let Some(s) = summary.stats(&cfg.primary_metric) {
        Range::observe(&mut stats.consistency, s.stddev);
      }
    }

    if !goal_rates.is_empty() {
      goal_rates.sort_by(f64::total_cmp);
      stats.tiers = Some(TierThresholds {
        q75: nearest_rank(&goal_rates, 0.75),
        q50: nearest_rank(&goal_rates, 0.50),
        q25: nearest_rank(&goal_rates, 0.25),
      });
    }
    stats
  }

  /// Tier for a qualified identity's goal rate. A rate on a threshold
  /// takes the higher tier.
  pub fn tier_for(&self, goal_rate: f64) -> Option<PerformanceTier> {
    let t = self.tiers?;
    Some(if goal_rate >= t.q75 {
      PerformanceTier::Top
    } else if goal_rate >= t.q50 {
      PerformanceTier::High
    } else if goal_rate >= t.q25 {
      PerformanceTier::Medium
    } else {
      PerformanceTier::Low
    })
  }
}

/// Nearest-rank percentile of an ascending-sorted slice.
fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
  let n = sorted.len();
  let rank = (p * n as f64).ceil() as usize;
  sorted[rank.clamp(1, n) - 1]
}

// ─── Tests ───────────────────────────────────────────────────────────────────
