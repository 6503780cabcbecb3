//! Metric value cleaning.
//!
//! Raw exports mix representations freely: percentage strings, clock-style
//! durations, thousands separators, plain numbers. Cleaning never fails a
//! row — an unparseable value becomes [`MetricValue::Invalid`] so the
//! aggregator can exclude it per metric and the quality report can count
//! it.

use trifecta_core::record::MetricValue;

/// Clean one raw cell into a metric value.
pub fn clean_value(raw: &serde_json::Value) -> MetricValue {
  match raw {
    serde_json::Value::Number(n) => match n.as_f64() {
      Some(f) if f.is_finite() => MetricValue::Number(f),
      _ => MetricValue::Invalid(n.to_string()),
    },
    serde_json::Value::String(s) => clean_text(s),
    other => MetricValue::Invalid(other.to_string()),
  }
}

fn clean_text(s: &str) -> MetricValue {
  let trimmed = s.trim();
  if trimmed.is_empty() {
    return MetricValue::Invalid(s.to_string());
  }

  // "87%" / "87.5 %" → fractional decimal.
  if let Some(stripped) = trimmed.strip_suffix('%') {
    return match parse_plain(stripped) {
      Some(f) => MetricValue::Number(f / 100.0),
      None => MetricValue::Invalid(s.to_string()),
    };
  }

  // "4:37" / "1:02:15" → seconds.
  if trimmed.contains(':') {
    return match parse_duration_seconds(trimmed) {
      Some(f) => MetricValue::Number(f),
      None => MetricValue::Invalid(s.to_string()),
    };
  }

  match parse_plain(trimmed) {
    Some(f) => MetricValue::Number(f),
    None => MetricValue::Invalid(s.to_string()),
  }
}

/// Parse a number after stripping thousands separators.
fn parse_plain(s: &str) -> Option<f64> {
  let cleaned: String =
    s.trim().chars().filter(|c| *c != ',').collect();
  let f: f64 = cleaned.parse().ok()?;
  f.is_finite().then_some(f)
}

/// `m:ss` or `h:mm:ss`, each segment non-negative.
fn parse_duration_seconds(s: &str) -> Option<f64> {
  let parts: Vec<&str> = s.split(':').collect();
  if !(2..=3).contains(&parts.len()) {
    return None;
  }
  let mut total = 0.0;
  for part in &parts {
    let seg: f64 = part.trim().parse().ok()?;
    if seg < 0.0 {
      return None;
    }
    total = total * 60.0 + seg;
  }
  Some(total)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
