//! Run orchestration.
//!
//! One call, one immutable snapshot: resolve identities, aggregate the
//! evaluation window, tier and score against the run's own population,
//! link ratings, and account for every dropped row along the way.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use trifecta_core::{
  Result,
  comparison::{ComparisonRow, NormalizedRating, RunSnapshot},
  config::RunConfig,
  identity::{Identity, SourceIdent, SourceKey, SourceSystem},
  quality::{QualityReport, SkippedRow},
  rating::{RatingRecord, RatingSource},
  record::RawPerformanceRecord,
  summary::PerformanceSummary,
};
use trifecta_match::resolve_all;
use uuid::Uuid;

use crate::{
  aggregate::summarize,
  link::{prediction_accuracy, run_statistics},
  population::PopulationStats,
  score::{composite_score, rank_rows},
};

/// Everything one analysis run consumes. Ingestion failures arrive
/// pre-collected in `skipped_rows` so the snapshot accounts for them.
#[derive(Debug, Default)]
pub struct RunInput {
  /// One ident per performance-system key, derived from the daily rows.
  pub performance_idents: Vec<SourceIdent>,
  /// The candidate-profile pool to resolve against.
  pub candidate_pool:     Vec<SourceIdent>,
  /// Daily records; (key, day) duplicates are superseded by the later row.
  pub records:            Vec<RawPerformanceRecord>,
  pub ratings:            Vec<RatingRecord>,
  pub skipped_rows:       Vec<SkippedRow>,
}

/// Execute one analysis run end to end.
pub fn execute(input: RunInput, cfg: &RunConfig) -> Result<RunSnapshot> {
  cfg.validate()?;
  let scale = cfg.scale()?;

  let mut quality = QualityReport {
    skipped_rows: input.skipped_rows,
    ..Default::default()
  };

  // ── Identity resolution ───────────────────────────────────────────────
  let resolution = resolve_all(
    &input.performance_idents,
    &input.candidate_pool,
    &cfg.matching,
  );
  tracing::info!(
    matched = resolution.matches.len(),
    unmatched = resolution.unmatched.len(),
    ambiguous = resolution.ambiguous.len(),
    "identity resolution finished"
  );

  let mut identities: Vec<Identity> =
    resolution.matches.into_iter().map(|m| m.identity).collect();
  quality.ambiguous = resolution.ambiguous;

  // Unmatched performance identities still get summarized; they just
  // carry no candidate-side data.
  for ident in resolution.unmatched {
    quality.unmatched.push(ident.source_key.key.clone());
    mint_performance_only(&mut identities, &mut quality, ident);
  }

  // ── Record grouping ───────────────────────────────────────────────────
  let mut grouped: BTreeMap<String, BTreeMap<NaiveDate, RawPerformanceRecord>> =
    BTreeMap::new();
  for record in input.records {
    let days = grouped.entry(record.source_key.clone()).or_default();
    if days.insert(record.date, record).is_some() {
      quality.superseded_days += 1;
    }
  }

  let mut perf_index = key_index(&identities, SourceSystem::Performance);
  for key in grouped.keys() {
    if !perf_index.contains_key(key.as_str()) {
      // A record key the caller never listed as a performance ident.
      let ident = SourceIdent {
        source_key: SourceKey::new(SourceSystem::Performance, key.clone()),
        shared_id:  None,
        first_name: None,
        last_name:  None,
        full_name:  String::new(),
        hire_date:  None,
      };
      quality.unmatched.push(key.clone());
      mint_performance_only(&mut identities, &mut quality, ident);
    }
  }
  perf_index = key_index(&identities, SourceSystem::Performance);
  let profile_index = key_index(&identities, SourceSystem::Profile);

  // ── Aggregation ───────────────────────────────────────────────────────
  let mut summaries: Vec<Option<PerformanceSummary>> =
    vec![None; identities.len()];
  for (key, days) in grouped {
    let Some(&idx) = perf_index.get(key.as_str()) else {
      continue;
    };
    let records: Vec<RawPerformanceRecord> = days.into_values().collect();
    summaries[idx] =
      Some(summarize(identities[idx].identity_id, &records, cfg));
  }

  // ── Rating linkage ────────────────────────────────────────────────────
  let mut ai_latest: Vec<Option<NormalizedRating>> =
    vec![None; identities.len()];
  let mut human_latest: Vec<Option<NormalizedRating>> =
    vec![None; identities.len()];

  for rating in input.ratings {
    let key = rating.source_key().to_string();
    let idx = profile_index
      .get(key.as_str())
      .or_else(|| perf_index.get(key.as_str()))
      .copied();
    let Some(idx) = idx else {
      quality.unmatched_ratings.push(key);
      continue;
    };
    if summaries[idx].is_none() {
      // Resolved to an identity the run never observed working.
      quality.unmatched_ratings.push(key);
      continue;
    }
    let normalized = match rating.normalized_score(&scale) {
      Ok(v) => v,
      Err(e) => {
        quality.skipped_rows.push(SkippedRow {
          line:   0,
          source: rating_source_name(rating.source()).into(),
          reason: e.to_string(),
        });
        continue;
      }
    };
    if let Err(e) = identities[idx]
      .attach_key(SourceKey::new(SourceSystem::Rating, key))
    {
      quality.duplicate_keys.push(e.to_string());
      continue;
    }
    let slot = match rating.source() {
      RatingSource::Ai => &mut ai_latest[idx],
      RatingSource::Human => &mut human_latest[idx],
    };
    let fresher = NormalizedRating {
      source:      rating.source(),
      normalized,
      rating_date: rating.rating_date(),
    };
    // Latest rating per (identity, source) wins.
    if slot
      .as_ref()
      .is_none_or(|existing| fresher.rating_date > existing.rating_date)
    {
      *slot = Some(fresher);
    }
  }

  // ── Population-relative tiering and scoring ───────────────────────────
  let population = {
    let qualified: Vec<&PerformanceSummary> = summaries
      .iter()
      .flatten()
      .filter(|s| s.is_qualified())
      .collect();
    tracing::info!(
      qualified = qualified.len(),
      total = summaries.iter().flatten().count(),
      "computing population statistics"
    );
    PopulationStats::compute(&qualified, cfg)
  };

  let mut rows = Vec::new();
  for (idx, summary) in summaries.into_iter().enumerate() {
    let Some(mut summary) = summary else { continue };
    quality.excluded_values += summary.excluded_values;

    let score = if summary.is_qualified() {
      summary.performance_tier =
        population.tier_for(summary.goal_achievement_rate);
      Some(composite_score(&summary, &population, cfg))
    } else {
      quality.insufficient_data.push(summary.identity_id);
      None
    };

    let ai_rating = ai_latest[idx].take();
    let human_rating = human_latest[idx].take();
    rows.push(ComparisonRow {
      identity_id: summary.identity_id,
      display_name: identities[idx].display_name.clone(),
      ai_prediction_accuracy: ai_rating.as_ref().map(|r| {
        prediction_accuracy(r.normalized, summary.goal_achievement_rate)
      }),
      human_prediction_accuracy: human_rating.as_ref().map(|r| {
        prediction_accuracy(r.normalized, summary.goal_achievement_rate)
      }),
      summary,
      ai_rating,
      human_rating,
      composite_score: score,
      rank: None,
    });
  }

  rank_rows(&mut rows);
  let statistics = run_statistics(&rows);
  tracing::info!(
    rows = rows.len(),
    qualified = statistics.qualified_count,
    ai_rated = statistics.ai_rated_count,
    human_rated = statistics.human_rated_count,
    "run finished"
  );

  Ok(RunSnapshot {
    run_id: Uuid::new_v4(),
    run_date: Utc::now(),
    config: cfg.clone(),
    rows,
    statistics,
    quality,
  })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn mint_performance_only(
  identities: &mut Vec<Identity>,
  quality: &mut QualityReport,
  ident: SourceIdent,
) {
  let name = if ident.full_name.is_empty() {
    ident.source_key.key.clone()
  } else {
    ident.full_name.clone()
  };
  let mut identity = Identity::new(name, ident.hire_date);
  if let Err(e) = identity.attach_key(ident.source_key) {
    quality.duplicate_keys.push(e.to_string());
  }
  identities.push(identity);
}

fn key_index(
  identities: &[Identity],
  system: SourceSystem,
) -> HashMap<String, usize> {
  identities
    .iter()
    .enumerate()
    .filter_map(|(i, identity)| {
      identity.key_for(system).map(|k| (k.to_string(), i))
    })
    .collect()
}

fn rating_source_name(source: RatingSource) -> &'static str {
  match source {
    RatingSource::Ai => "ai_ratings",
    RatingSource::Human => "human_ratings",
  }
}
