//! Ingestion boundary for the Trifecta pipeline.
//!
//! Parses JSON-lines row dumps into core domain types. Each line is
//! parsed independently; a malformed line yields `Err(…)` in the
//! corresponding position without aborting the rest, and the caller
//! records it in the quality log.

mod clean;
pub mod error;
mod row;

use std::collections::BTreeMap;

pub use clean::clean_value;
pub use error::{Error, Result};
use trifecta_core::{
  identity::{SourceIdent, SourceKey, SourceSystem},
  rating::{RatingRecord, RatingSource},
  record::{ManagerHierarchy, MetricValue, RawPerformanceRecord},
};

use crate::row::{RawPerformanceRow, RawProfileRow, RawRatingRow};

// ─── Public types ────────────────────────────────────────────────────────────

/// One parsed performance row: the immutable record plus the identity
/// fragments the resolver needs but the record does not carry.
#[derive(Debug, Clone)]
pub struct PerformanceRow {
  pub record:      RawPerformanceRecord,
  pub first_name:  Option<String>,
  pub last_name:   Option<String>,
  pub employee_id: Option<String>,
}

// ─── Line-by-line parsers ────────────────────────────────────────────────────

/// Parse performance rows. Blank lines are skipped; line numbers in
/// errors are 1-based over the whole input.
pub fn parse_performance_rows(input: &str) -> Vec<Result<PerformanceRow>> {
  each_line(input, |line_no, line| {
    let raw: RawPerformanceRow = parse_json(line_no, line)?;
    if raw.source_key.trim().is_empty() {
      return Err(Error::MissingField {
        line:  line_no,
        field: "source_key",
      });
    }

    let mut metrics: BTreeMap<String, MetricValue> = BTreeMap::new();
    for (name, value) in &raw.metrics {
      if value.is_null() {
        continue; // absent metric that day, not an exclusion
      }
      metrics.insert(name.clone(), clean_value(value));
    }

    Ok(PerformanceRow {
      record:      RawPerformanceRecord {
        source_key: raw.source_key,
        date:       raw.date,
        metrics,
        hierarchy: ManagerHierarchy {
          agent:      raw.agent_name,
          manager:    raw.manager,
          supervisor: raw.supervisor,
          location:   raw.location,
        },
      },
      first_name:  raw.first_name,
      last_name:   raw.last_name,
      employee_id: raw.employee_id,
    })
  })
}

/// Parse candidate-profile rows into resolver pool idents.
pub fn parse_profile_rows(input: &str) -> Vec<Result<SourceIdent>> {
  each_line(input, |line_no, line| {
    let raw: RawProfileRow = parse_json(line_no, line)?;
    if raw.source_key.trim().is_empty() {
      return Err(Error::MissingField {
        line:  line_no,
        field: "source_key",
      });
    }
    let full_name = raw.full_name.unwrap_or_else(|| {
      join_name(raw.first_name.as_deref(), raw.last_name.as_deref())
    });
    Ok(SourceIdent {
      source_key: SourceKey::new(SourceSystem::Profile, raw.source_key),
      shared_id:  raw.employee_id,
      first_name: raw.first_name,
      last_name:  raw.last_name,
      full_name,
      hire_date:  raw.hire_date,
    })
  })
}

/// Parse rating rows for one rating source. An AI row needs a numeric
/// 0–100 rating; a human row needs an ordinal label.
pub fn parse_rating_rows(
  input: &str,
  source: RatingSource,
) -> Vec<Result<RatingRecord>> {
  each_line(input, |line_no, line| {
    let raw: RawRatingRow = parse_json(line_no, line)?;
    if raw.source_key.trim().is_empty() {
      return Err(Error::MissingField {
        line:  line_no,
        field: "source_key",
      });
    }
    let categories = clean_categories(&raw.categories);

    match source {
      RatingSource::Ai => {
        let score = match clean_value(&raw.overall_rating) {
          MetricValue::Number(f) if (0.0..=100.0).contains(&f) => f,
          other => {
            return Err(Error::InvalidRating {
              line:     line_no,
              value:    describe(&other, &raw.overall_rating),
              expected: "a numeric 0–100 score",
            });
          }
        };
        Ok(RatingRecord::Ai {
          source_key: raw.source_key,
          score,
          rating_date: raw.rating_date,
          categories,
        })
      }
      RatingSource::Human => {
        let serde_json::Value::String(label) = &raw.overall_rating else {
          return Err(Error::InvalidRating {
            line:     line_no,
            value:    raw.overall_rating.to_string(),
            expected: "an ordinal label",
          });
        };
        Ok(RatingRecord::Human {
          source_key:  raw.source_key,
          label:       label.clone(),
          rating_date: raw.rating_date,
          categories,
        })
      }
    }
  })
}

// ─── Identity fragments ──────────────────────────────────────────────────────

/// Collapse daily performance rows into one resolver ident per source
/// key. The earliest observed performance date stands in for the hire
/// date on this side of the match.
pub fn performance_idents(rows: &[PerformanceRow]) -> Vec<SourceIdent> {
  let mut by_key: BTreeMap<&str, SourceIdent> = BTreeMap::new();
  for row in rows {
    let entry = by_key
      .entry(row.record.source_key.as_str())
      .or_insert_with(|| SourceIdent {
        source_key: SourceKey::new(
          SourceSystem::Performance,
          row.record.source_key.clone(),
        ),
        shared_id:  None,
        first_name: None,
        last_name:  None,
        full_name:  String::new(),
        hire_date:  None,
      });
    entry.hire_date = Some(match entry.hire_date {
      Some(d) => d.min(row.record.date),
      None => row.record.date,
    });
    if entry.shared_id.is_none() {
      entry.shared_id = row.employee_id.clone();
    }
    if entry.first_name.is_none() {
      entry.first_name = row.first_name.clone();
    }
    if entry.last_name.is_none() {
      entry.last_name = row.last_name.clone();
    }
    if entry.full_name.is_empty() {
      entry.full_name = row
        .record
        .hierarchy
        .agent
        .clone()
        .unwrap_or_else(|| {
          join_name(row.first_name.as_deref(), row.last_name.as_deref())
        });
    }
  }
  by_key.into_values().collect()
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn each_line<T>(
  input: &str,
  mut parse: impl FnMut(usize, &str) -> Result<T>,
) -> Vec<Result<T>> {
  input
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(i, line)| parse(i + 1, line))
    .collect()
}

fn parse_json<'a, T: serde::Deserialize<'a>>(
  line_no: usize,
  line: &'a str,
) -> Result<T> {
  serde_json::from_str(line).map_err(|e| Error::MalformedRow {
    line:   line_no,
    reason: e.to_string(),
  })
}

fn join_name(first: Option<&str>, last: Option<&str>) -> String {
  match (first, last) {
    (Some(f), Some(l)) => format!("{f} {l}"),
    (Some(f), None) => f.to_string(),
    (None, Some(l)) => l.to_string(),
    (None, None) => String::new(),
  }
}

fn clean_categories(
  raw: &BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, f64> {
  let mut out = BTreeMap::new();
  for (name, value) in raw {
    if value.is_null() {
      continue;
    }
    match clean_value(value) {
      MetricValue::Number(f) => {
        out.insert(name.clone(), f);
      }
      MetricValue::Invalid(s) => {
        tracing::debug!(category = %name, value = %s, "non-numeric category ignored");
      }
    }
  }
  out
}

fn describe(cleaned: &MetricValue, raw: &serde_json::Value) -> String {
  match cleaned {
    MetricValue::Number(f) => f.to_string(),
    MetricValue::Invalid(_) => raw.to_string(),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
