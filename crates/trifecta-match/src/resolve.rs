//! The resolution cascade.
//!
//! Three passes in descending confidence order, so high-confidence pairs
//! lock in before the fuzzy stage can cascade a mis-assignment:
//!
//!   1. exact shared-identifier equality           (confidence 1.0)
//!   2. normalized name + hire-date equality       (confidence 0.9)
//!   3. token-sorted fuzzy similarity + date bonus (confidence 0.85)
//!
//! One-to-one matching is enforced with an explicit available-pool index
//! mutated as each match locks in; iteration order within a pass is fixed
//! by sorting on source key, never left to incidental map order.

use std::collections::HashMap;

use trifecta_core::{
  config::MatchConfig,
  identity::{Identity, SourceIdent},
  quality::AmbiguousMatch,
};

use crate::{
  IdentityMatch, MatchMethod, Resolution,
  normalize::{date_proximity_credit, normalized_name, token_sort_similarity},
};

/// Blend weights for the fuzzy combined score. Acceptance is gated on the
/// name similarity alone; the date bonus only orders candidates.
const NAME_WEIGHT: f64 = 0.9;
const DATE_WEIGHT: f64 = 0.1;

/// Resolve every performance-system ident against the candidate pool.
pub fn resolve_all(
  performance: &[SourceIdent],
  pool: &[SourceIdent],
  cfg: &MatchConfig,
) -> Resolution {
  let mut state = State::new(performance, pool);
  let mut out = Resolution::default();

  pass_exact_key(&mut state, &mut out);
  pass_composite(&mut state, &mut out);
  pass_fuzzy(&mut state, cfg, &mut out);

  for i in state.perf_order() {
    out.unmatched.push(state.perf[i].clone());
  }
  tracing::info!(
    matched = out.matches.len(),
    unmatched = out.unmatched.len(),
    ambiguous = out.ambiguous.len(),
    "identity resolution complete"
  );
  out
}

// ─── Matching state ──────────────────────────────────────────────────────────

struct State<'a> {
  perf:           &'a [SourceIdent],
  pool:           &'a [SourceIdent],
  perf_active:    Vec<bool>,
  pool_available: Vec<bool>,
}

impl<'a> State<'a> {
  fn new(perf: &'a [SourceIdent], pool: &'a [SourceIdent]) -> Self {
    Self {
      perf,
      pool,
      perf_active: vec![true; perf.len()],
      pool_available: vec![true; pool.len()],
    }
  }

  /// Active performance indices in deterministic (source-key) order.
  fn perf_order(&self) -> Vec<usize> {
    let mut order: Vec<usize> =
      (0..self.perf.len()).filter(|&i| self.perf_active[i]).collect();
    order.sort_by(|&a, &b| {
      self.perf[a].source_key.key.cmp(&self.perf[b].source_key.key)
    });
    order
  }

  fn lock(
    &mut self,
    perf_i: usize,
    pool_i: usize,
    method: MatchMethod,
    out: &mut Resolution,
  ) {
    self.perf_active[perf_i] = false;
    self.pool_available[pool_i] = false;
    out.matches.push(mint(&self.perf[perf_i], &self.pool[pool_i], method));
  }
}

/// Build the canonical identity for a locked pair. The candidate profile
/// is authoritative for display name and hire date.
fn mint(
  perf: &SourceIdent,
  candidate: &SourceIdent,
  method: MatchMethod,
) -> IdentityMatch {
  let display_name = if candidate.full_name.trim().is_empty() {
    perf.full_name.clone()
  } else {
    candidate.full_name.clone()
  };
  let mut identity =
    Identity::new(display_name, candidate.hire_date.or(perf.hire_date));
  // Keys come from disjoint systems, so attaching cannot collide here.
  let _ = identity.attach_key(perf.source_key.clone());
  let _ = identity.attach_key(candidate.source_key.clone());
  IdentityMatch {
    identity,
    confidence: method.confidence(),
    method,
  }
}

// ─── Pass 1: exact shared identifier ─────────────────────────────────────────

fn pass_exact_key(state: &mut State<'_>, out: &mut Resolution) {
  let mut by_shared: HashMap<&str, Vec<usize>> = HashMap::new();
  for (j, cand) in state.pool.iter().enumerate() {
    if state.pool_available[j]
      && let Some(id) = cand.shared_id.as_deref()
    {
      by_shared.entry(id).or_default().push(j);
    }
  }

  for i in state.perf_order() {
    let Some(shared) = state.perf[i].shared_id.as_deref() else {
      continue;
    };
    let Some(candidates) = by_shared.get(shared) else {
      continue;
    };
    let available: Vec<usize> = candidates
      .iter()
      .copied()
      .filter(|&j| state.pool_available[j])
      .collect();
    match available.as_slice() {
      [] => {}
      [j] => state.lock(i, *j, MatchMethod::ExactKey, out),
      many => {
        // A shared identifier held by several profiles is a tie; report
        // it rather than picking one.
        out.ambiguous.push(AmbiguousMatch {
          performance_key: state.perf[i].source_key.key.clone(),
          tied_candidates: many
            .iter()
            .map(|&j| state.pool[j].source_key.key.clone())
            .collect(),
          best_score:      1.0,
        });
        state.perf_active[i] = false;
      }
    }
  }
}

// ─── Pass 2: composite exact ─────────────────────────────────────────────────

/// Normalized first + last name, falling back to splitting the full name.
fn name_parts(ident: &SourceIdent) -> Option<(String, String)> {
  if let (Some(first), Some(last)) = (&ident.first_name, &ident.last_name) {
    return Some((normalized_name(first), normalized_name(last)));
  }
  let tokens: Vec<&str> = ident.full_name.split_whitespace().collect();
  if tokens.len() < 2 {
    return None;
  }
  Some((
    normalized_name(tokens[0]),
    normalized_name(tokens[tokens.len() - 1]),
  ))
}

fn pass_composite(state: &mut State<'_>, out: &mut Resolution) {
  let mut by_composite: HashMap<(String, String, chrono::NaiveDate), Vec<usize>> =
    HashMap::new();
  for (j, cand) in state.pool.iter().enumerate() {
    if !state.pool_available[j] {
      continue;
    }
    if let (Some((first, last)), Some(date)) =
      (name_parts(cand), cand.hire_date)
    {
      by_composite.entry((first, last, date)).or_default().push(j);
    }
  }

  for i in state.perf_order() {
    let perf = &state.perf[i];
    let (Some((first, last)), Some(date)) = (name_parts(perf), perf.hire_date)
    else {
      continue;
    };
    let Some(candidates) = by_composite.get(&(first, last, date)) else {
      continue;
    };
    let available: Vec<usize> = candidates
      .iter()
      .copied()
      .filter(|&j| state.pool_available[j])
      .collect();
    match available.as_slice() {
      [] => {}
      [j] => state.lock(i, *j, MatchMethod::CompositeExact, out),
      many => {
        out.ambiguous.push(AmbiguousMatch {
          performance_key: perf.source_key.key.clone(),
          tied_candidates: many
            .iter()
            .map(|&j| state.pool[j].source_key.key.clone())
            .collect(),
          best_score:      MatchMethod::CompositeExact.confidence(),
        });
        state.perf_active[i] = false;
      }
    }
  }
}

// ─── Pass 3: fuzzy ───────────────────────────────────────────────────────────

struct FuzzyPair {
  pool_i:   usize,
  combined: f64,
}

/// All acceptable candidates for one performance ident, best first.
fn fuzzy_candidates(
  state: &State<'_>,
  perf_i: usize,
  cfg: &MatchConfig,
) -> Vec<FuzzyPair> {
  let perf = &state.perf[perf_i];
  let mut pairs: Vec<FuzzyPair> = state
    .pool
    .iter()
    .enumerate()
    .filter(|(j, _)| state.pool_available[*j])
    .filter_map(|(j, cand)| {
      let name_sim =
        token_sort_similarity(&perf.full_name, &cand.full_name);
      if name_sim < cfg.similarity_threshold {
        return None;
      }
      let date_credit = date_proximity_credit(
        perf.hire_date,
        cand.hire_date,
        cfg.date_tolerance_days,
      );
      Some(FuzzyPair {
        pool_i:   j,
        combined: NAME_WEIGHT * name_sim + DATE_WEIGHT * date_credit,
      })
    })
    .collect();
  // Deterministic: score descending, then candidate key ascending.
  pairs.sort_by(|a, b| {
    b.combined
      .partial_cmp(&a.combined)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then_with(|| {
        state.pool[a.pool_i]
          .source_key
          .key
          .cmp(&state.pool[b.pool_i].source_key.key)
      })
  });
  pairs
}

fn pass_fuzzy(state: &mut State<'_>, cfg: &MatchConfig, out: &mut Resolution) {
  // Greedy bipartite pass: repeatedly lock the globally best remaining
  // pair so strong matches cannot be stolen by weaker earlier rows.
  loop {
    let mut best: Option<(usize, Vec<FuzzyPair>)> = None;
    for i in state.perf_order() {
      let pairs = fuzzy_candidates(state, i, cfg);
      let Some(top) = pairs.first() else {
        continue;
      };
      let better = match &best {
        None => true,
        Some((bi, bp)) => {
          let current = bp[0].combined;
          top.combined > current
            || (top.combined == current
              && state.perf[i].source_key.key
                < state.perf[*bi].source_key.key)
        }
      };
      if better {
        best = Some((i, pairs));
      }
    }

    let Some((perf_i, pairs)) = best else {
      break;
    };

    let tied: Vec<&FuzzyPair> = pairs
      .iter()
      .filter(|p| pairs[0].combined - p.combined <= cfg.ambiguity_epsilon)
      .collect();
    if tied.len() > 1 {
      // Two candidates within epsilon: reject as ambiguous, keep the
      // candidates in the pool for other rows.
      out.ambiguous.push(AmbiguousMatch {
        performance_key: state.perf[perf_i].source_key.key.clone(),
        tied_candidates: tied
          .iter()
          .map(|p| state.pool[p.pool_i].source_key.key.clone())
          .collect(),
        best_score:      pairs[0].combined,
      });
      state.perf_active[perf_i] = false;
      continue;
    }

    state.lock(perf_i, pairs[0].pool_i, MatchMethod::Fuzzy, out);
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use trifecta_core::identity::{SourceKey, SourceSystem};

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn perf_ident(key: &str, name: &str, hired: Option<NaiveDate>) -> SourceIdent {
    SourceIdent {
      source_key: SourceKey::new(SourceSystem::Performance, key),
      shared_id:  None,
      first_name: None,
      last_name:  None,
      full_name:  name.to_string(),
      hire_date:  hired,
    }
  }

  fn candidate(key: &str, name: &str, hired: Option<NaiveDate>) -> SourceIdent {
    SourceIdent {
      source_key: SourceKey::new(SourceSystem::Profile, key),
      shared_id:  None,
      first_name: None,
      last_name:  None,
      full_name:  name.to_string(),
      hire_date:  hired,
    }
  }

  // ── Exact key ─────────────────────────────────────────────────────────

  #[test]
  fn exact_key_matches_with_confidence_one() {
    let mut p = perf_ident("p-1", "A Name", None);
    p.shared_id = Some("emp-77".into());
    let mut c = candidate("c-1", "Completely Different", None);
    c.shared_id = Some("emp-77".into());

    let r = resolve_all(&[p], &[c], &MatchConfig::default());
    assert_eq!(r.matches.len(), 1);
    assert_eq!(r.matches[0].confidence, 1.0);
    assert_eq!(r.matches[0].method, MatchMethod::ExactKey);
  }

  #[test]
  fn exact_key_mapping_is_injective() {
    let mk_perf = |k: &str, id: &str| {
      let mut p = perf_ident(k, "Someone", None);
      p.shared_id = Some(id.into());
      p
    };
    let mk_cand = |k: &str, id: &str| {
      let mut c = candidate(k, "Someone", None);
      c.shared_id = Some(id.into());
      c
    };
    let perf = vec![mk_perf("p-1", "e1"), mk_perf("p-2", "e2")];
    let pool = vec![mk_cand("c-1", "e1"), mk_cand("c-2", "e2")];

    let r = resolve_all(&perf, &pool, &MatchConfig::default());
    assert_eq!(r.matches.len(), 2);
    let mut targets: Vec<&str> = r
      .matches
      .iter()
      .map(|m| m.identity.key_for(SourceSystem::Profile).unwrap())
      .collect();
    targets.sort_unstable();
    targets.dedup();
    assert_eq!(targets.len(), 2, "no two perf ids map to one candidate");
  }

  // ── Composite exact (scenario A) ──────────────────────────────────────

  #[test]
  fn same_name_and_hire_date_is_composite_match() {
    let hired = Some(date(2023, 4, 10));
    let p = perf_ident("p-1", "Amanda Harris", hired);
    let c = candidate("c-1", "Amanda Harris", hired);

    let r = resolve_all(&[p], &[c], &MatchConfig::default());
    assert_eq!(r.matches.len(), 1);
    assert_eq!(r.matches[0].confidence, 0.9);
    assert_eq!(r.matches[0].method, MatchMethod::CompositeExact);
  }

  #[test]
  fn composite_requires_same_calendar_day() {
    let p = perf_ident("p-1", "Amanda Harris", Some(date(2023, 4, 10)));
    let c = candidate("c-1", "Amanda Harris", Some(date(2023, 4, 11)));

    let r = resolve_all(&[p], &[c], &MatchConfig::default());
    // Falls through to fuzzy, which still accepts on name similarity.
    assert_eq!(r.matches.len(), 1);
    assert_eq!(r.matches[0].method, MatchMethod::Fuzzy);
  }

  // ── Fuzzy (scenario B) ────────────────────────────────────────────────

  #[test]
  fn jon_smith_fuzzy_matches_john_smith() {
    let hired = Some(date(2022, 11, 11));
    let p = perf_ident("p-1", "Jon Smith", hired);
    let c = candidate("c-1", "John Smith", hired);

    let r = resolve_all(&[p], &[c], &MatchConfig::default());
    assert_eq!(r.matches.len(), 1);
    assert_eq!(r.matches[0].method, MatchMethod::Fuzzy);
    assert_eq!(r.matches[0].confidence, 0.85);
    assert_eq!(r.matches[0].identity.display_name, "John Smith");
  }

  // ── Ambiguity (scenario C) ────────────────────────────────────────────

  #[test]
  fn tied_candidates_are_rejected_not_broken() {
    let hired = Some(date(2024, 2, 1));
    let p = perf_ident("p-1", "Chris Le", hired);
    let pool = vec![
      candidate("c-1", "Chris Lee", hired),
      candidate("c-2", "Chris Le", hired),
    ];
    let cfg = MatchConfig {
      ambiguity_epsilon: 0.05,
      ..MatchConfig::default()
    };

    let r = resolve_all(&[p], &pool, &cfg);
    assert!(r.matches.is_empty(), "a tie must record zero matches");
    assert_eq!(r.ambiguous.len(), 1);
    assert_eq!(r.ambiguous[0].performance_key, "p-1");
    assert_eq!(r.ambiguous[0].tied_candidates.len(), 2);
  }

  // ── Unmatched retention ───────────────────────────────────────────────

  #[test]
  fn unmatched_records_are_retained() {
    let p = perf_ident("p-1", "Zelda Nobody", Some(date(2024, 1, 1)));
    let pool = vec![candidate("c-1", "Aaron Holycross", Some(date(2016, 2, 22)))];

    let r = resolve_all(&[p], &pool, &MatchConfig::default());
    assert!(r.matches.is_empty());
    assert_eq!(r.unmatched.len(), 1);
    assert_eq!(r.unmatched[0].source_key.key, "p-1");
  }

  // ── Confidence ordering across passes ─────────────────────────────────

  #[test]
  fn exact_stage_locks_before_fuzzy_can_misassign() {
    // "Michael Marks" appears twice in the pool; the exact-id row must
    // claim its own profile, leaving the other for the fuzzy row.
    let hired = Some(date(2016, 1, 26));
    let mut p1 = perf_ident("p-1", "Michael Marks", hired);
    p1.shared_id = Some("emp-1".into());
    let p2 = perf_ident("p-2", "Micheal Marks", hired);

    let mut c1 = candidate("c-1", "Michael Marks", hired);
    c1.shared_id = Some("emp-1".into());
    let c2 = candidate("c-2", "Michael Marks", Some(date(2016, 1, 30)));

    let r = resolve_all(&[p2.clone(), p1.clone()], &[c1, c2], &MatchConfig::default());
    assert_eq!(r.matches.len(), 2);
    let exact = r
      .matches
      .iter()
      .find(|m| m.method == MatchMethod::ExactKey)
      .unwrap();
    assert_eq!(
      exact.identity.key_for(SourceSystem::Profile),
      Some("c-1")
    );
    let fuzzy = r
      .matches
      .iter()
      .find(|m| m.method == MatchMethod::Fuzzy)
      .unwrap();
    assert_eq!(fuzzy.identity.key_for(SourceSystem::Profile), Some("c-2"));
  }
}
