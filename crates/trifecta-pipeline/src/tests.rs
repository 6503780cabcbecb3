//! End-to-end pipeline tests: whole runs through [`execute`] against
//! hand-built inputs.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use trifecta_core::{
  config::RunConfig,
  identity::{SourceIdent, SourceKey, SourceSystem},
  rating::RatingRecord,
  record::{ManagerHierarchy, MetricValue, RawPerformanceRecord},
  summary::PerformanceTier,
};

use crate::{RunInput, execute};

fn d(day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn cfg() -> RunConfig {
  let mut cfg = RunConfig::default();
  cfg.goals = BTreeMap::from([("talk_time_seconds".to_string(), 279.0)]);
  cfg
}

fn perf_source(key: &str, shared: &str, name: &str) -> SourceIdent {
  SourceIdent {
    source_key: SourceKey::new(SourceSystem::Performance, key),
    shared_id:  Some(shared.into()),
    first_name: None,
    last_name:  None,
    full_name:  name.into(),
    hire_date:  Some(d(1)),
  }
}

fn pool_source(key: &str, shared: &str, name: &str) -> SourceIdent {
  SourceIdent {
    source_key: SourceKey::new(SourceSystem::Profile, key),
    shared_id:  Some(shared.into()),
    first_name: None,
    last_name:  None,
    full_name:  name.into(),
    hire_date:  Some(d(1)),
  }
}

fn record(key: &str, date: NaiveDate, talk: f64) -> RawPerformanceRecord {
  RawPerformanceRecord {
    source_key: key.into(),
    date,
    metrics: BTreeMap::from([
      ("talk_time_seconds".to_string(), MetricValue::Number(talk)),
      (
        "hourly_interaction_rate".to_string(),
        MetricValue::Number(5.0),
      ),
    ]),
    hierarchy: ManagerHierarchy::default(),
  }
}

/// `met` of `days` days under the talk-time goal, the rest over it.
fn days_for(key: &str, days: u32, met: u32) -> Vec<RawPerformanceRecord> {
  (0..days)
    .map(|i| record(key, d(1 + i), if i < met { 250.0 } else { 300.0 }))
    .collect()
}

fn linked_input(people: &[(&str, &str, &str, u32, u32)]) -> RunInput {
  let mut input = RunInput::default();
  for (perf_key, pool_key, name, days, met) in people {
    let shared = format!("emp-{perf_key}");
    input
      .performance_idents
      .push(perf_source(perf_key, &shared, name));
    input.candidate_pool.push(pool_source(pool_key, &shared, name));
    input.records.extend(days_for(perf_key, *days, *met));
  }
  input
}

fn ai_rating(key: &str, score: f64, date: NaiveDate) -> RatingRecord {
  RatingRecord::Ai {
    source_key: key.into(),
    score,
    rating_date: date,
    categories: Default::default(),
  }
}

// ─── Tiering and ranking ─────────────────────────────────────────────────────

#[test]
fn quartile_tiers_over_the_qualified_population() {
  let input = linked_input(&[
    ("p-1", "c-1", "Ann Ode", 12, 12),   // goal rate 1.00
    ("p-2", "c-2", "Bo Reyes", 12, 9),   // 0.75
    ("p-3", "c-3", "Cy Marsh", 12, 6),   // 0.50
    ("p-4", "c-4", "Di Voss", 12, 3),    // 0.25
  ]);
  let snapshot = execute(input, &cfg()).unwrap();

  assert_eq!(snapshot.rows.len(), 4);
  assert_eq!(snapshot.statistics.qualified_count, 4);
  // Rows come back rank-ordered; on-threshold rates take the higher tier.
  let tiers: Vec<_> = snapshot
    .rows
    .iter()
    .map(|r| r.summary.performance_tier.unwrap())
    .collect();
  assert_eq!(tiers, vec![
    PerformanceTier::Top,
    PerformanceTier::Top,
    PerformanceTier::High,
    PerformanceTier::Medium,
  ]);
  assert_eq!(snapshot.rows[0].rank, Some(1));
  assert_eq!(snapshot.rows[0].display_name, "Ann Ode");
  assert_eq!(snapshot.rows[3].rank, Some(4));
  assert!(snapshot.quality.is_clean());
}

#[test]
fn insufficient_days_excluded_from_tiering_but_still_reported() {
  let input = linked_input(&[
    ("p-1", "c-1", "Ann Ode", 12, 9),
    ("p-2", "c-2", "Bo Reyes", 8, 8), // below the 10-day minimum
  ]);
  let snapshot = execute(input, &cfg()).unwrap();

  assert_eq!(snapshot.rows.len(), 2);
  assert_eq!(snapshot.statistics.qualified_count, 1);
  assert_eq!(snapshot.statistics.total_count, 2);

  let short = &snapshot.rows[1];
  assert_eq!(short.display_name, "Bo Reyes");
  assert!(short.summary.insufficient_data);
  assert_eq!(short.summary.performance_tier, None);
  assert_eq!(short.composite_score, None);
  assert_eq!(short.rank, None);
  assert_eq!(snapshot.quality.insufficient_data, vec![short.identity_id]);
}

#[test]
fn rank_ties_break_on_days_worked() {
  // Same goal rate and same metrics, different day counts.
  let input = linked_input(&[
    ("p-1", "c-1", "Ann Ode", 12, 6),
    ("p-2", "c-2", "Bo Reyes", 20, 10),
  ]);
  let snapshot = execute(input, &cfg()).unwrap();
  assert_eq!(snapshot.rows[0].display_name, "Bo Reyes");
  assert_eq!(snapshot.rows[0].rank, Some(1));
}

// ─── Rating linkage ──────────────────────────────────────────────────────────

#[test]
fn prediction_accuracy_against_realized_goal_rate() {
  let mut input = linked_input(&[("p-1", "c-1", "Ann Ode", 10, 8)]);
  input.ratings.push(ai_rating("c-1", 85.0, d(1)));
  let snapshot = execute(input, &cfg()).unwrap();

  let row = &snapshot.rows[0];
  assert_eq!(row.summary.goal_achievement_rate, 0.8);
  let rating = row.ai_rating.as_ref().unwrap();
  assert_eq!(rating.normalized, 0.85);
  assert!((row.ai_prediction_accuracy.unwrap() - 0.95).abs() < 1e-12);
  assert!(
    (snapshot.statistics.mean_ai_accuracy.unwrap() - 0.95).abs() < 1e-12
  );
  assert_eq!(snapshot.statistics.ai_rated_count, 1);
}

#[test]
fn latest_rating_per_source_wins() {
  let mut input = linked_input(&[("p-1", "c-1", "Ann Ode", 10, 8)]);
  input.ratings.push(ai_rating("c-1", 50.0, d(2)));
  input.ratings.push(ai_rating("c-1", 90.0, d(20)));
  let snapshot = execute(input, &cfg()).unwrap();
  assert_eq!(
    snapshot.rows[0].ai_rating.as_ref().unwrap().normalized,
    0.9
  );
}

#[test]
fn human_label_normalizes_through_the_configured_scale() {
  let mut input = linked_input(&[("p-1", "c-1", "Ann Ode", 10, 8)]);
  input.ratings.push(RatingRecord::Human {
    source_key:  "c-1".into(),
    label:       "Exceeds Expectations".into(),
    rating_date: d(1),
    categories:  Default::default(),
  });
  let snapshot = execute(input, &cfg()).unwrap();
  let rating = snapshot.rows[0].human_rating.as_ref().unwrap();
  assert!((rating.normalized - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn unknown_ordinal_label_is_skipped_and_counted() {
  let mut input = linked_input(&[("p-1", "c-1", "Ann Ode", 10, 8)]);
  input.ratings.push(RatingRecord::Human {
    source_key:  "c-1".into(),
    label:       "Stellar".into(),
    rating_date: d(1),
    categories:  Default::default(),
  });
  let snapshot = execute(input, &cfg()).unwrap();
  assert!(snapshot.rows[0].human_rating.is_none());
  assert_eq!(snapshot.quality.skipped_rows.len(), 1);
  assert_eq!(snapshot.quality.skipped_rows[0].line, 0);
  assert_eq!(snapshot.statistics.human_rated_count, 0);
}

#[test]
fn rating_with_no_resolvable_identity_is_reported() {
  let mut input = linked_input(&[("p-1", "c-1", "Ann Ode", 10, 8)]);
  input.ratings.push(ai_rating("ghost", 70.0, d(1)));
  let snapshot = execute(input, &cfg()).unwrap();
  assert_eq!(snapshot.quality.unmatched_ratings, vec!["ghost".to_string()]);
  assert_eq!(snapshot.statistics.ai_rated_count, 0);
}

// ─── Data quality ────────────────────────────────────────────────────────────

#[test]
fn reingested_day_supersedes_and_is_counted() {
  let mut input = linked_input(&[("p-1", "c-1", "Ann Ode", 10, 5)]);
  // Day 6 was over goal; the re-ingested row meets it.
  input.records.push(record("p-1", d(6), 250.0));
  let snapshot = execute(input, &cfg()).unwrap();
  assert_eq!(snapshot.quality.superseded_days, 1);
  assert_eq!(snapshot.rows[0].summary.days_worked, 10);
  assert_eq!(snapshot.rows[0].summary.goal_achievement_rate, 0.6);
}

#[test]
fn unmatched_performance_identity_is_still_summarized() {
  let mut input = linked_input(&[("p-1", "c-1", "Ann Ode", 12, 9)]);
  // No pool counterpart at all for p-2.
  input
    .performance_idents
    .push(perf_source("p-2", "emp-x", "Zed Qu"));
  input.records.extend(days_for("p-2", 12, 6));
  let snapshot = execute(input, &cfg()).unwrap();

  assert_eq!(snapshot.rows.len(), 2);
  assert_eq!(snapshot.quality.unmatched, vec!["p-2".to_string()]);
  let zed = snapshot
    .rows
    .iter()
    .find(|r| r.display_name == "Zed Qu")
    .unwrap();
  assert!(zed.composite_score.is_some());
}

#[test]
fn invalid_configuration_aborts_the_run() {
  let mut bad = cfg();
  bad.weights.goal_achievement = 0.9; // sum no longer 1.0
  assert!(execute(RunInput::default(), &bad).is_err());
}
