//! Composite scoring and ranking.
//!
//! The composite score blends four population-relative terms under
//! configured weights. Each term lies in [0,1]; with weights summing to
//! 1.0 the composite does too. A term whose metric never appeared for an
//! identity contributes the neutral 0.5 rather than silently zeroing.

use trifecta_core::{
  comparison::ComparisonRow,
  config::RunConfig,
  summary::PerformanceSummary,
};

use crate::population::PopulationStats;

const NEUTRAL_TERM: f64 = 0.5;

/// Composite score for one qualified summary.
pub fn composite_score(
  summary: &PerformanceSummary,
  population: &PopulationStats,
  cfg: &RunConfig,
) -> f64 {
  let goal_term = summary.goal_achievement_rate;

  let performance_term = term(
    population.productivity,
    summary.stats(&cfg.productivity_metric).map(|s| s.mean),
  );

  // Lower handle time is better, so the min-max inverts.
  let efficiency_term = 1.0
    - term(
      population.efficiency,
      summary.stats(&cfg.efficiency_metric).map(|s| s.mean),
    );

  // Lower day-to-day variation is better.
  let consistency_term = 1.0
    - term(
      population.consistency,
      summary.stats(&cfg.primary_metric).map(|s| s.stddev),
    );

  let w = &cfg.weights;
  w.goal_achievement * goal_term
    + w.performance * performance_term
    + w.efficiency * efficiency_term
    + w.consistency * consistency_term
}

fn term(
  range: Option<crate::population::Range>,
  value: Option<f64>,
) -> f64 {
  match (range, value) {
    (Some(r), Some(v)) => r.normalize(v),
    _ => NEUTRAL_TERM,
  }
}

/// Order rows and assign ranks: scored rows first by score descending
/// (ties broken by days worked, then identity id for determinism), then
/// unscored insufficient-data rows by identity id.
pub fn rank_rows(rows: &mut [ComparisonRow]) {
  rows.sort_by(|a, b| match (a.composite_score, b.composite_score) {
    (Some(x), Some(y)) => y
      .total_cmp(&x)
      .then_with(|| b.summary.days_worked.cmp(&a.summary.days_worked))
      .then_with(|| a.identity_id.cmp(&b.identity_id)),
    (Some(_), None) => std::cmp::Ordering::Less,
    (None, Some(_)) => std::cmp::Ordering::Greater,
    (None, None) => a.identity_id.cmp(&b.identity_id),
  });
  let mut rank = 0u32;
  for row in rows.iter_mut() {
    row.rank = row.composite_score.map(|_| {
      rank += 1;
      rank
    });
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
