//! Rating records — AI and human candidate ratings.
//!
//! The two variants share a common normalized-score contract so the
//! three-way linker can treat them polymorphically: both map into [0,1]
//! before any comparison against realized outcomes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which rating system produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingSource {
  Ai,
  Human,
}

/// The human ordinal rating scale, declared in configuration and never
/// inferred from data. Labels are ordered lowest to highest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrdinalScale {
  labels: Vec<String>,
}

impl OrdinalScale {
  /// Build a scale from ordered labels. Labels must be non-empty and
  /// unique (case-insensitively).
  pub fn new(labels: Vec<String>) -> Result<Self> {
    if labels.is_empty() {
      return Err(Error::Configuration(
        "ordinal scale must declare at least one label".into(),
      ));
    }
    let mut seen: Vec<String> = Vec::new();
    for l in &labels {
      let folded = l.trim().to_lowercase();
      if folded.is_empty() {
        return Err(Error::Configuration("empty ordinal label".into()));
      }
      if seen.contains(&folded) {
        return Err(Error::Configuration(format!(
          "duplicate ordinal label {l:?}"
        )));
      }
      seen.push(folded);
    }
    Ok(Self { labels })
  }

  pub fn labels(&self) -> &[String] { &self.labels }

  /// Map a label to its evenly spaced point in [0,1] by rank order.
  /// A single-label scale maps to 1.0.
  pub fn normalize(&self, label: &str) -> Result<f64> {
    let folded = label.trim().to_lowercase();
    let rank = self
      .labels
      .iter()
      .position(|l| l.trim().to_lowercase() == folded)
      .ok_or_else(|| Error::UnknownRatingLabel(label.to_string()))?;
    if self.labels.len() == 1 {
      return Ok(1.0);
    }
    Ok(rank as f64 / (self.labels.len() - 1) as f64)
  }
}

/// A candidate rating from either source. `source_key` is the candidate's
/// key in the rating system's key space.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RatingRecord {
  Ai {
    source_key:  String,
    /// Raw score on the AI system's 0–100 scale.
    score:       f64,
    rating_date: NaiveDate,
    categories:  BTreeMap<String, f64>,
  },
  Human {
    source_key:  String,
    /// One of the configured ordinal labels.
    label:       String,
    rating_date: NaiveDate,
    categories:  BTreeMap<String, f64>,
  },
}

impl RatingRecord {
  pub fn source(&self) -> RatingSource {
    match self {
      Self::Ai { .. } => RatingSource::Ai,
      Self::Human { .. } => RatingSource::Human,
    }
  }

  pub fn source_key(&self) -> &str {
    match self {
      Self::Ai { source_key, .. } | Self::Human { source_key, .. } => {
        source_key
      }
    }
  }

  pub fn rating_date(&self) -> NaiveDate {
    match self {
      Self::Ai { rating_date, .. } | Self::Human { rating_date, .. } => {
        *rating_date
      }
    }
  }

  pub fn categories(&self) -> &BTreeMap<String, f64> {
    match self {
      Self::Ai { categories, .. } | Self::Human { categories, .. } => {
        categories
      }
    }
  }

  /// The normalized [0,1] score shared by both variants: AI's 0–100 score
  /// divides by 100; the human ordinal label maps through `scale`.
  pub fn normalized_score(&self, scale: &OrdinalScale) -> Result<f64> {
    match self {
      Self::Ai { score, .. } => {
        if !(0.0..=100.0).contains(score) {
          return Err(Error::RatingOutOfRange(*score));
        }
        Ok(score / 100.0)
      }
      Self::Human { label, .. } => scale.normalize(label),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
