//! Human-readable run summary.

use trifecta_core::comparison::RunSnapshot;

/// Render the ranked summary table plus quality counts.
pub fn render(snapshot: &RunSnapshot) -> String {
  let mut out = String::new();
  out.push_str(
    "rank   score   tier     days   goal%   ai-acc   hum-acc   name\n",
  );
  for row in &snapshot.rows {
    out.push_str(&format!(
      "{:<6} {:<7} {:<8} {:<6} {:<7} {:<8} {:<9} {}\n",
      opt_u32(row.rank),
      opt_score(row.composite_score),
      row
        .summary
        .performance_tier
        .map_or("—".to_string(), |t| format!("{t:?}").to_lowercase()),
      row.summary.days_worked,
      format!("{:.1}", row.summary.goal_achievement_rate * 100.0),
      opt_score(row.ai_prediction_accuracy),
      opt_score(row.human_prediction_accuracy),
      row.display_name,
    ));
  }

  let s = &snapshot.statistics;
  out.push_str(&format!(
    "\n{} identities ({} qualified), {} AI-rated, {} human-rated\n",
    s.total_count, s.qualified_count, s.ai_rated_count, s.human_rated_count
  ));
  if let Some(r) = s.ai_pearson_r {
    out.push_str(&format!("AI rating vs goal achievement:    r = {r:+.3}\n"));
  }
  if let Some(r) = s.human_pearson_r {
    out.push_str(&format!("human rating vs goal achievement: r = {r:+.3}\n"));
  }

  let q = &snapshot.quality;
  if q.is_clean() {
    out.push_str("quality: clean run, no data lost\n");
  } else {
    out.push_str(&format!(
      "quality: {} skipped rows, {} unmatched, {} ambiguous, {} unmatched \
       ratings, {} insufficient-data, {} superseded days, {} excluded \
       values\n",
      q.skipped_rows.len(),
      q.unmatched.len(),
      q.ambiguous.len(),
      q.unmatched_ratings.len(),
      q.insufficient_data.len(),
      q.superseded_days,
      q.excluded_values,
    ));
  }
  out
}

fn opt_u32(v: Option<u32>) -> String {
  v.map_or("—".to_string(), |v| v.to_string())
}

fn opt_score(v: Option<f64>) -> String {
  v.map_or("—".to_string(), |v| format!("{v:.3}"))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
