//! Export-schema validation.
//!
//! Runs over the serialized JSON rather than the typed document, so it
//! catches contract drift in the serde layer too (a renamed field fails
//! here even though the Rust side still compiles). Any violation fails
//! the export; nothing is written.

use serde_json::Value;

use crate::{
  document::{CANDIDATE_ID_LEN, ExportDocument},
  error::{Error, Result},
};

/// Keys that must never appear anywhere in the export.
const PII_KEYS: &[&str] = &[
  "display_name",
  "first_name",
  "last_name",
  "full_name",
  "source_key",
  "identity_id",
];

const CANDIDATE_KEYS: &[&str] = &[
  "candidate_id",
  "resume_features",
  "performance_outcome",
  "original_ai_rating",
  "validation_metrics",
];

/// Validate the document against the export contract.
pub fn validate(doc: &ExportDocument) -> Result<()> {
  let value = serde_json::to_value(doc)?;
  let mut violations = Vec::new();

  check_metadata(&value, &mut violations);
  check_candidates(&value, &mut violations);
  check_pii(&value, "$", &mut violations);

  if violations.is_empty() {
    Ok(())
  } else {
    Err(Error::SchemaValidation { violations })
  }
}

fn check_metadata(value: &Value, violations: &mut Vec<String>) {
  let Some(metadata) = value.get("metadata") else {
    violations.push("missing top-level \"metadata\"".into());
    return;
  };
  for key in [
    "export_date",
    "total_candidates",
    "performance_period",
    "data_quality_score",
  ] {
    if metadata.get(key).is_none() {
      violations.push(format!("metadata is missing {key:?}"));
    }
  }

  let declared = metadata
    .get("total_candidates")
    .and_then(Value::as_u64)
    .unwrap_or(0);
  let actual = value
    .get("candidates")
    .and_then(Value::as_array)
    .map_or(0, Vec::len) as u64;
  if declared != actual {
    violations.push(format!(
      "metadata declares {declared} candidates but the document holds \
       {actual}"
    ));
  }

  if let Some(score) =
    metadata.get("data_quality_score").and_then(Value::as_f64)
    && !(0.0..=1.0).contains(&score)
  {
    violations.push(format!("data_quality_score {score} outside [0,1]"));
  }
}

fn check_candidates(value: &Value, violations: &mut Vec<String>) {
  let Some(candidates) = value.get("candidates").and_then(Value::as_array)
  else {
    violations.push("missing top-level \"candidates\" array".into());
    return;
  };

  for (i, candidate) in candidates.iter().enumerate() {
    for key in CANDIDATE_KEYS {
      if candidate.get(key).is_none() {
        violations.push(format!("candidate {i} is missing {key:?}"));
      }
    }

    match candidate.get("candidate_id").and_then(Value::as_str) {
      Some(id)
        if id.len() == CANDIDATE_ID_LEN
          && id.chars().all(|c| c.is_ascii_hexdigit()) => {}
      Some(id) => violations.push(format!(
        "candidate {i} id {id:?} is not {CANDIDATE_ID_LEN} hex chars"
      )),
      None => {}
    }

    check_unit_interval(
      candidate,
      i,
      "performance_outcome",
      &["goal_achievement_rate", "composite_score"],
      violations,
    );
    check_unit_interval(
      candidate,
      i,
      "validation_metrics",
      &["ai_prediction_accuracy", "human_prediction_accuracy"],
      violations,
    );
    check_unit_interval(
      candidate,
      i,
      "resume_features",
      &["ai_score_normalized", "human_score_normalized"],
      violations,
    );
  }
}

fn check_unit_interval(
  candidate: &Value,
  index: usize,
  section: &str,
  fields: &[&str],
  violations: &mut Vec<String>,
) {
  for field in fields {
    if let Some(v) = candidate
      .get(section)
      .and_then(|s| s.get(field))
      .and_then(Value::as_f64)
      && !(0.0..=1.0).contains(&v)
    {
      violations
        .push(format!("candidate {index}: {section}.{field} {v} outside [0,1]"));
    }
  }
}

fn check_pii(value: &Value, path: &str, violations: &mut Vec<String>) {
  match value {
    Value::Object(map) => {
      for (key, nested) in map {
        if PII_KEYS.contains(&key.as_str()) {
          violations.push(format!("PII key {key:?} at {path}"));
        }
        check_pii(nested, &format!("{path}.{key}"), violations);
      }
    }
    Value::Array(items) => {
      for (i, item) in items.iter().enumerate() {
        check_pii(item, &format!("{path}[{i}]"), violations);
      }
    }
    _ => {}
  }
}
