//! Raw row shapes at the ingestion boundary.
//!
//! Rows arrive as JSON-lines objects, one per tabular row; the upstream
//! collaborator owns the CSV/Excel → rows conversion. Named fields are
//! the contract's minimum; everything else on a performance row is a
//! metric column, captured by the flattened map.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct RawPerformanceRow {
  pub source_key:  String,
  pub date:        NaiveDate,
  /// Standardized system-wide identifier, when the export carries one.
  pub employee_id: Option<String>,
  pub first_name:  Option<String>,
  pub last_name:   Option<String>,
  pub agent_name:  Option<String>,
  pub manager:     Option<String>,
  pub supervisor:  Option<String>,
  pub location:    Option<String>,
  /// Everything else is a metric column.
  #[serde(flatten)]
  pub metrics:     BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRatingRow {
  pub source_key:     String,
  /// Numeric for the AI system, an ordinal label for the human one.
  pub overall_rating: serde_json::Value,
  pub rating_date:    NaiveDate,
  /// Source-specific category breakdown columns.
  #[serde(flatten)]
  pub categories:     BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawProfileRow {
  pub source_key:  String,
  pub employee_id: Option<String>,
  pub first_name:  Option<String>,
  pub last_name:   Option<String>,
  pub full_name:   Option<String>,
  pub hire_date:   Option<NaiveDate>,
}
