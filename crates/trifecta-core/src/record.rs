//! Raw performance records — the immutable daily input rows.
//!
//! A record is one performance-system identity × one calendar day. Records
//! are never mutated after ingestion; a re-ingested (key, day) pair
//! supersedes the earlier row, and the supersession is counted in the
//! quality report.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A metric cell after cleaning: either a usable number or the original
/// unparseable text, kept so exclusions can be reported rather than
/// silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
  Number(f64),
  Invalid(String),
}

impl MetricValue {
  pub fn as_number(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n),
      Self::Invalid(_) => None,
    }
  }
}

/// The reporting chain attached to each daily row. `agent` is the
/// agent's own full name as the performance system records it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerHierarchy {
  pub agent:      Option<String>,
  pub manager:    Option<String>,
  pub supervisor: Option<String>,
  pub location:   Option<String>,
}

/// One performance-system identity × one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPerformanceRecord {
  /// Key in the performance system's key space.
  pub source_key: String,
  pub date:       NaiveDate,
  /// Metric name → cleaned value. Names are the ingestion boundary's
  /// column names (e.g. `average_handle_time_seconds`).
  pub metrics:    BTreeMap<String, MetricValue>,
  pub hierarchy:  ManagerHierarchy,
}

impl RawPerformanceRecord {
  /// The parseable value of `metric` on this day, if any.
  pub fn metric(&self, metric: &str) -> Option<f64> {
    self.metrics.get(metric).and_then(MetricValue::as_number)
  }
}
