//! Windowed aggregation of daily performance records.
//!
//! One summary per identity, computed from that identity's deduplicated
//! daily records. Everything here is identity-local; run-relative pieces
//! (tier, composite score) are filled in later from population statistics.

use std::collections::{BTreeMap, BTreeSet};

use trifecta_core::{
  config::RunConfig,
  record::{MetricValue, RawPerformanceRecord},
  summary::{MetricStats, PerformanceSummary, TrendDirection},
};
use uuid::Uuid;

/// Summarize one identity's records over its observed window.
///
/// `records` must be non-empty and already deduplicated to one row per
/// calendar day; order does not matter.
pub fn summarize(
  identity_id: Uuid,
  records: &[RawPerformanceRecord],
  cfg: &RunConfig,
) -> PerformanceSummary {
  let mut ordered: Vec<&RawPerformanceRecord> = records.iter().collect();
  ordered.sort_by_key(|r| r.date);

  let window_start = ordered[0].date;
  let window_end = ordered[ordered.len() - 1].date;
  let days_worked = ordered.len() as u32;

  let metric_stats = metric_stats(&ordered);
  let excluded_values =
    metric_stats.values().map(|s| s.excluded as u32).sum();

  let span = (window_end - window_start).num_days() + 1;

  PerformanceSummary {
    identity_id,
    window_start,
    window_end,
    days_worked,
    goal_achievement_rate: goal_achievement_rate(&ordered, &cfg.goals),
    performance_tier: None,
    trend_direction: trend(
      &ordered,
      &cfg.primary_metric,
      cfg.trend_noise_threshold,
    ),
    retention_flag: span >= i64::from(cfg.window_days),
    insufficient_data: days_worked < cfg.min_days_worked,
    excluded_values,
    metric_stats,
  }
}

// ─── Per-metric statistics ───────────────────────────────────────────────────

fn metric_stats(
  ordered: &[&RawPerformanceRecord],
) -> BTreeMap<String, MetricStats> {
  let names: BTreeSet<&str> = ordered
    .iter()
    .flat_map(|r| r.metrics.keys().map(String::as_str))
    .collect();

  let mut out = BTreeMap::new();
  for name in names {
    let mut values = Vec::new();
    let mut excluded = 0usize;
    for record in ordered {
      match record.metrics.get(name) {
        Some(MetricValue::Number(f)) => values.push(*f),
        Some(MetricValue::Invalid(_)) => excluded += 1,
        None => {} // metric absent that day; neither sample nor exclusion
      }
    }
    if values.is_empty() && excluded == 0 {
      continue;
    }
    let (mean, stddev) = mean_stddev(&values);
    out.insert(
      name.to_string(),
      MetricStats {
        mean,
        stddev,
        samples: values.len(),
        excluded,
      },
    );
  }
  out
}

/// Mean and population standard deviation. Empty input yields zeros.
fn mean_stddev(values: &[f64]) -> (f64, f64) {
  if values.is_empty() {
    return (0.0, 0.0);
  }
  let n = values.len() as f64;
  let mean = values.iter().sum::<f64>() / n;
  let var =
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
  (mean, var.sqrt())
}

// ─── Goal achievement ────────────────────────────────────────────────────────

/// Fraction of days meeting every configured goal threshold. A day with
/// any goal metric missing or unparseable fails that day.
fn goal_achievement_rate(
  ordered: &[&RawPerformanceRecord],
  goals: &BTreeMap<String, f64>,
) -> f64 {
  let met = ordered
    .iter()
    .filter(|record| {
      goals.iter().all(|(metric, threshold)| {
        record.metric(metric).is_some_and(|v| v <= *threshold)
      })
    })
    .count();
  met as f64 / ordered.len() as f64
}

// ─── Trend ───────────────────────────────────────────────────────────────────

/// Compare the first and last thirds of the primary metric's date-ordered
/// parseable values. Fewer than three values reads Stable.
fn trend(
  ordered: &[&RawPerformanceRecord],
  primary_metric: &str,
  noise_threshold: f64,
) -> TrendDirection {
  let values: Vec<f64> = ordered
    .iter()
    .filter_map(|r| r.metric(primary_metric))
    .collect();
  if values.len() < 3 {
    return TrendDirection::Stable;
  }

  let third = values.len() / 3;
  let first = values[..third].iter().sum::<f64>() / third as f64;
  let last =
    values[values.len() - third..].iter().sum::<f64>() / third as f64;

  let relative = if first.abs() > f64::EPSILON {
    (last - first) / first.abs()
  } else if last.abs() > f64::EPSILON {
    last.signum()
  } else {
    0.0
  };

  if relative > noise_threshold {
    TrendDirection::Improving
  } else if relative < -noise_threshold {
    TrendDirection::Declining
  } else {
    TrendDirection::Stable
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
