//! The export document and its assembly.
//!
//! The document is the hand-off to the downstream training pipeline. No
//! PII crosses this boundary: display names and raw source keys are
//! replaced by salted digests, and nothing else in a row identifies a
//! person.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use trifecta_core::{
  comparison::{ComparisonRow, RunSnapshot},
  quality::QualityReport,
  summary::{PerformanceTier, TrendDirection},
};
use uuid::Uuid;

/// Hex length of a candidate identifier.
pub const CANDIDATE_ID_LEN: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
  pub candidates: Vec<CandidateEntry>,
  pub metadata:   ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
  pub export_date:        NaiveDate,
  pub total_candidates:   u32,
  /// `start..end` of the earliest and latest observed windows.
  pub performance_period: String,
  /// Qualified over total candidates, in [0,1].
  pub data_quality_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEntry {
  /// Salted digest standing in for every person-identifying field.
  pub candidate_id:       String,
  pub resume_features:    ResumeFeatures,
  pub performance_outcome: PerformanceOutcome,
  pub original_ai_rating: Option<OriginalAiRating>,
  pub validation_metrics: ValidationMetrics,
}

/// Candidate-side signals available at rating time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeFeatures {
  pub ai_score_normalized:    Option<f64>,
  pub human_score_normalized: Option<f64>,
  /// Days between the latest rating and the start of the observed
  /// window; negative when the rating postdates it.
  pub rating_recency_days:    Option<i64>,
}

/// Realized outcomes over the evaluation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceOutcome {
  pub goal_achievement_rate: f64,
  pub performance_tier:      Option<PerformanceTier>,
  pub trend_direction:       TrendDirection,
  pub days_worked:           u32,
  pub retention_flag:        bool,
  pub composite_score:       Option<f64>,
  pub rank:                  Option<u32>,
}

/// The AI system's original verdict, kept for bias auditing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginalAiRating {
  /// Raw score on the source 0–100 scale.
  pub score:       f64,
  pub normalized:  f64,
  pub rating_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMetrics {
  pub ai_prediction_accuracy:    Option<f64>,
  pub human_prediction_accuracy: Option<f64>,
  pub insufficient_data:         bool,
}

// ─── Assembly ────────────────────────────────────────────────────────────────

/// Assemble the export document from a finished run.
pub fn assemble(snapshot: &RunSnapshot, salt: &str) -> ExportDocument {
  let candidates: Vec<CandidateEntry> = snapshot
    .rows
    .iter()
    .map(|row| candidate_entry(row, salt))
    .collect();

  let period = snapshot
    .rows
    .iter()
    .map(|r| (r.summary.window_start, r.summary.window_end))
    .reduce(|(s1, e1), (s2, e2)| (s1.min(s2), e1.max(e2)));

  ExportDocument {
    metadata: ExportMetadata {
      export_date:        Utc::now().date_naive(),
      total_candidates:   candidates.len() as u32,
      performance_period: match period {
        Some((start, end)) => format!("{start}..{end}"),
        None => String::new(),
      },
      data_quality_score: QualityReport::data_quality_score(
        snapshot.statistics.qualified_count,
        snapshot.statistics.total_count,
      ),
    },
    candidates,
  }
}

fn candidate_entry(row: &ComparisonRow, salt: &str) -> CandidateEntry {
  let latest_rating_date = row
    .ai_rating
    .iter()
    .chain(&row.human_rating)
    .map(|r| r.rating_date)
    .max();

  CandidateEntry {
    candidate_id:       candidate_id(salt, row.identity_id),
    resume_features:    ResumeFeatures {
      ai_score_normalized:    row.ai_rating.as_ref().map(|r| r.normalized),
      human_score_normalized: row
        .human_rating
        .as_ref()
        .map(|r| r.normalized),
      rating_recency_days:    latest_rating_date
        .map(|d| (row.summary.window_start - d).num_days()),
    },
    performance_outcome: PerformanceOutcome {
      goal_achievement_rate: row.summary.goal_achievement_rate,
      performance_tier:      row.summary.performance_tier,
      trend_direction:       row.summary.trend_direction,
      days_worked:           row.summary.days_worked,
      retention_flag:        row.summary.retention_flag,
      composite_score:       row.composite_score,
      rank:                  row.rank,
    },
    original_ai_rating: row.ai_rating.as_ref().map(|r| OriginalAiRating {
      score:       r.normalized * 100.0,
      normalized:  r.normalized,
      rating_date: r.rating_date,
    }),
    validation_metrics: ValidationMetrics {
      ai_prediction_accuracy:    row.ai_prediction_accuracy,
      human_prediction_accuracy: row.human_prediction_accuracy,
      insufficient_data:         row.summary.insufficient_data,
    },
  }
}

/// The salted, truncated digest standing in for an identity.
pub fn candidate_id(salt: &str, identity_id: Uuid) -> String {
  let mut hasher = Sha256::new();
  hasher.update(salt.as_bytes());
  hasher.update(b":");
  hasher.update(identity_id.as_bytes());
  let hash = hasher.finalize();
  hex::encode(hash)[..CANDIDATE_ID_LEN].to_string()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
