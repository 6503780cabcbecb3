//! Three-way linking of ratings to realized performance.
//!
//! Per-row prediction accuracy is a bounded scalar; correlation between
//! predicted and realized outcomes is a run-level statistic, computed over
//! the whole qualified population and reported separately.

use trifecta_core::comparison::{ComparisonRow, RunStatistics};

/// `1 − |normalized − goal_achievement_rate|`, bounded to [0,1].
pub fn prediction_accuracy(normalized: f64, goal_rate: f64) -> f64 {
  (1.0 - (normalized - goal_rate).abs()).clamp(0.0, 1.0)
}

/// Pearson correlation coefficient. None with fewer than two pairs or
/// when either side has zero variance.
pub fn pearson_r(xs: &[f64], ys: &[f64]) -> Option<f64> {
  if xs.len() != ys.len() || xs.len() < 2 {
    return None;
  }
  let n = xs.len() as f64;
  let mx = xs.iter().sum::<f64>() / n;
  let my = ys.iter().sum::<f64>() / n;

  let mut cov = 0.0;
  let mut vx = 0.0;
  let mut vy = 0.0;
  for (x, y) in xs.iter().zip(ys) {
    cov += (x - mx) * (y - my);
    vx += (x - mx).powi(2);
    vy += (y - my).powi(2);
  }
  if vx < f64::EPSILON || vy < f64::EPSILON {
    return None;
  }
  Some(cov / (vx * vy).sqrt())
}

/// Run-level statistics over the finished rows. Correlations and mean
/// accuracies consider qualified rows only.
pub fn run_statistics(rows: &[ComparisonRow]) -> RunStatistics {
  let mut stats = RunStatistics {
    total_count: rows.len() as u32,
    ..Default::default()
  };

  let mut ai_pairs: (Vec<f64>, Vec<f64>) = Default::default();
  let mut human_pairs: (Vec<f64>, Vec<f64>) = Default::default();
  let mut ai_accuracies = Vec::new();
  let mut human_accuracies = Vec::new();

  for row in rows {
    if row.summary.is_qualified() {
      stats.qualified_count += 1;
    }
    if row.ai_rating.is_some() {
      stats.ai_rated_count += 1;
    }
    if row.human_rating.is_some() {
      stats.human_rated_count += 1;
    }
    if !row.summary.is_qualified() {
      continue;
    }
    if let Some(rating) = &row.ai_rating {
      ai_pairs.0.push(rating.normalized);
      ai_pairs.1.push(row.summary.goal_achievement_rate);
    }
    if let Some(rating) = &row.human_rating {
      human_pairs.0.push(rating.normalized);
      human_pairs.1.push(row.summary.goal_achievement_rate);
    }
    if let Some(a) = row.ai_prediction_accuracy {
      ai_accuracies.push(a);
    }
    if let Some(a) = row.human_prediction_accuracy {
      human_accuracies.push(a);
    }
  }

  stats.ai_pearson_r = pearson_r(&ai_pairs.0, &ai_pairs.1);
  stats.human_pearson_r = pearson_r(&human_pairs.0, &human_pairs.1);
  stats.mean_ai_accuracy = mean(&ai_accuracies);
  stats.mean_human_accuracy = mean(&human_accuracies);
  stats
}

fn mean(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    return None;
  }
  Some(values.iter().sum::<f64>() / values.len() as f64)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accuracy_is_one_minus_absolute_gap() {
    assert!((prediction_accuracy(0.85, 0.80) - 0.95).abs() < 1e-12);
    assert!((prediction_accuracy(0.80, 0.85) - 0.95).abs() < 1e-12);
    assert_eq!(prediction_accuracy(1.0, 0.0), 0.0);
    assert_eq!(prediction_accuracy(0.7, 0.7), 1.0);
  }

  #[test]
  fn pearson_perfect_positive() {
    let r = pearson_r(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
    assert!((r - 1.0).abs() < 1e-12);
  }

  #[test]
  fn pearson_perfect_negative() {
    let r = pearson_r(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]).unwrap();
    assert!((r + 1.0).abs() < 1e-12);
  }

  #[test]
  fn pearson_needs_variance_and_two_pairs() {
    assert_eq!(pearson_r(&[1.0], &[2.0]), None);
    assert_eq!(pearson_r(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), None);
  }
}
