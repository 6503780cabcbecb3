//! Name normalization and similarity primitives.

use chrono::NaiveDate;

/// Case-fold, strip punctuation, collapse whitespace, and sort tokens so
/// "Smith, John" and "john smith" compare equal.
pub fn normalized_name(name: &str) -> String {
  let folded: String = name
    .to_lowercase()
    .chars()
    .map(|c| if c.is_alphanumeric() { c } else { ' ' })
    .collect();
  let mut tokens: Vec<&str> = folded.split_whitespace().collect();
  tokens.sort_unstable();
  tokens.join(" ")
}

/// Token-sorted jaro-winkler similarity on a 0–1 scale.
pub fn token_sort_similarity(a: &str, b: &str) -> f64 {
  let (a, b) = (normalized_name(a), normalized_name(b));
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }
  strsim::jaro_winkler(&a, &b)
}

/// Hire-date proximity credit: full at 0 days apart, decaying linearly to
/// zero beyond `tolerance_days`. Missing dates earn no credit.
pub fn date_proximity_credit(
  a: Option<NaiveDate>,
  b: Option<NaiveDate>,
  tolerance_days: i64,
) -> f64 {
  let (Some(a), Some(b)) = (a, b) else {
    return 0.0;
  };
  let distance = (a - b).num_days().abs();
  if tolerance_days == 0 {
    return if distance == 0 { 1.0 } else { 0.0 };
  }
  (1.0 - distance as f64 / tolerance_days as f64).max(0.0)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
