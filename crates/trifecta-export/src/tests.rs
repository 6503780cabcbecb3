//! Export assembly and validation tests over a synthetic snapshot.

use chrono::{NaiveDate, Utc};
use trifecta_core::{
  comparison::{ComparisonRow, NormalizedRating, RunSnapshot, RunStatistics},
  quality::QualityReport,
  rating::RatingSource,
  summary::{PerformanceSummary, PerformanceTier, TrendDirection},
};
use uuid::Uuid;

use crate::{Error, assemble, validate, write_atomic};

fn d(day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn summary(qualified: bool) -> PerformanceSummary {
  PerformanceSummary {
    identity_id:           Uuid::new_v4(),
    window_start:          d(1),
    window_end:            d(31),
    days_worked:           if qualified { 20 } else { 6 },
    metric_stats:          Default::default(),
    goal_achievement_rate: 0.8,
    performance_tier:      qualified.then_some(PerformanceTier::High),
    trend_direction:       TrendDirection::Stable,
    retention_flag:        false,
    insufficient_data:     !qualified,
    excluded_values:       0,
  }
}

fn row(qualified: bool, rated: bool) -> ComparisonRow {
  let summary = summary(qualified);
  let ai_rating = rated.then_some(NormalizedRating {
    source:      RatingSource::Ai,
    normalized:  0.85,
    rating_date: d(2),
  });
  ComparisonRow {
    identity_id: summary.identity_id,
    display_name: "Amanda Harris".into(),
    ai_prediction_accuracy: ai_rating.as_ref().map(|_| 0.95),
    human_prediction_accuracy: None,
    composite_score: qualified.then_some(0.7),
    rank: qualified.then_some(1),
    summary,
    ai_rating,
    human_rating: None,
  }
}

fn snapshot(rows: Vec<ComparisonRow>) -> RunSnapshot {
  let statistics = RunStatistics {
    qualified_count: rows.iter().filter(|r| r.summary.is_qualified()).count()
      as u32,
    total_count: rows.len() as u32,
    ..Default::default()
  };
  RunSnapshot {
    run_id: Uuid::new_v4(),
    run_date: Utc::now(),
    config: trifecta_core::config::RunConfig::default(),
    rows,
    statistics,
    quality: QualityReport::default(),
  }
}

#[test]
fn assembled_document_passes_validation() {
  let doc = assemble(&snapshot(vec![row(true, true), row(false, false)]), "s");
  validate(&doc).unwrap();
  assert_eq!(doc.metadata.total_candidates, 2);
  assert_eq!(doc.metadata.performance_period, "2024-03-01..2024-03-31");
  assert_eq!(doc.metadata.data_quality_score, 0.5);
}

#[test]
fn no_pii_survives_assembly() {
  let doc = assemble(&snapshot(vec![row(true, true)]), "s");
  let json = serde_json::to_string(&doc).unwrap();
  assert!(!json.contains("Amanda"));
  assert!(!json.contains("display_name"));
  assert!(!json.contains("identity_id"));
}

#[test]
fn rated_candidate_carries_the_original_ai_verdict() {
  let doc = assemble(&snapshot(vec![row(true, true)]), "s");
  let entry = &doc.candidates[0];
  let original = entry.original_ai_rating.as_ref().unwrap();
  assert_eq!(original.score, 85.0);
  assert_eq!(original.normalized, 0.85);
  assert_eq!(entry.resume_features.ai_score_normalized, Some(0.85));
  assert_eq!(entry.validation_metrics.ai_prediction_accuracy, Some(0.95));
}

#[test]
fn unrated_insufficient_candidate_still_exports() {
  let doc = assemble(&snapshot(vec![row(false, false)]), "s");
  let entry = &doc.candidates[0];
  assert!(entry.original_ai_rating.is_none());
  assert!(entry.validation_metrics.insufficient_data);
  assert_eq!(entry.performance_outcome.rank, None);
}

#[test]
fn tampered_candidate_id_fails_validation() {
  let mut doc = assemble(&snapshot(vec![row(true, true)]), "s");
  doc.candidates[0].candidate_id = "not-hex".into();
  let err = validate(&doc).unwrap_err();
  let Error::SchemaValidation { violations } = err else {
    panic!("expected schema violations");
  };
  assert!(violations.iter().any(|v| v.contains("not-hex")));
}

#[test]
fn count_mismatch_fails_validation() {
  let mut doc = assemble(&snapshot(vec![row(true, true)]), "s");
  doc.metadata.total_candidates = 7;
  assert!(validate(&doc).is_err());
}

#[test]
fn out_of_bounds_accuracy_fails_validation() {
  let mut doc = assemble(&snapshot(vec![row(true, true)]), "s");
  doc.candidates[0].validation_metrics.ai_prediction_accuracy = Some(1.4);
  assert!(validate(&doc).is_err());
}

#[test]
fn write_atomic_leaves_a_readable_document() {
  let doc = assemble(&snapshot(vec![row(true, true)]), "s");
  let path =
    std::env::temp_dir().join(format!("trifecta-{}.json", Uuid::new_v4()));
  write_atomic(&doc, &path).unwrap();

  let bytes = std::fs::read(&path).unwrap();
  let round: crate::ExportDocument = serde_json::from_slice(&bytes).unwrap();
  validate(&round).unwrap();
  assert!(!path.with_extension("json.tmp").exists());
  std::fs::remove_file(&path).unwrap();
}

#[test]
fn invalid_document_is_never_written() {
  let mut doc = assemble(&snapshot(vec![row(true, true)]), "s");
  doc.metadata.total_candidates = 9;
  let path =
    std::env::temp_dir().join(format!("trifecta-{}.json", Uuid::new_v4()));
  assert!(write_atomic(&doc, &path).is_err());
  assert!(!path.exists());
}
