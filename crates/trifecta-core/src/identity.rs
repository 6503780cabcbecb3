//! Identity — the canonical person record unifying keys from multiple
//! origin systems.
//!
//! An identity holds only naming metadata and its source keys. Everything
//! derived (summaries, scores, comparison rows) is recomputed per run and
//! never stored on the identity itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// The origin system a source key belongs to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceSystem {
  /// The daily operational-performance system.
  Performance,
  /// The candidate-rating system (AI and human ratings share its keys).
  Rating,
  /// The candidate-profile system.
  Profile,
}

/// A key in one origin system's key space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceKey {
  pub system: SourceSystem,
  pub key:    String,
}

impl SourceKey {
  pub fn new(system: SourceSystem, key: impl Into<String>) -> Self {
    Self {
      system,
      key: key.into(),
    }
  }
}

/// Canonical person record. `identity_id` is system-generated and stable
/// within a run; source keys from different origin systems may aggregate
/// under one identity, but at most one key per origin system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub identity_id:  Uuid,
  pub display_name: String,
  pub hire_date:    Option<NaiveDate>,
  pub source_keys:  Vec<SourceKey>,
}

impl Identity {
  pub fn new(
    display_name: impl Into<String>,
    hire_date: Option<NaiveDate>,
  ) -> Self {
    Self {
      identity_id: Uuid::new_v4(),
      display_name: display_name.into(),
      hire_date,
      source_keys: Vec::new(),
    }
  }

  /// The key this identity carries in `system`, if any.
  pub fn key_for(&self, system: SourceSystem) -> Option<&str> {
    self
      .source_keys
      .iter()
      .find(|k| k.system == system)
      .map(|k| k.key.as_str())
  }

  /// Attach a source key. A second key from the same origin system is a
  /// data-quality error, not a merge.
  pub fn attach_key(&mut self, key: SourceKey) -> Result<()> {
    if let Some(existing) = self.key_for(key.system)
      && existing != key.key
    {
      return Err(Error::DuplicateSourceKey {
        system: key.system,
        key:    key.key,
      });
    }
    if self.key_for(key.system).is_none() {
      self.source_keys.push(key);
    }
    Ok(())
  }
}

/// A person as described by a single origin system, before resolution.
///
/// This is the resolver's input on both sides: performance-system
/// identities and the candidate-profile pool share the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceIdent {
  pub source_key: SourceKey,
  /// A standardized system-wide identifier (e.g. an employee id) shared
  /// across origin systems, when the system carries one.
  pub shared_id:  Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub full_name:  String,
  pub hire_date:  Option<NaiveDate>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn identity() -> Identity {
    Identity::new("Alice Smith", NaiveDate::from_ymd_opt(2022, 3, 1))
  }

  #[test]
  fn attach_keys_from_different_systems() {
    let mut id = identity();
    id.attach_key(SourceKey::new(SourceSystem::Performance, "p-1"))
      .unwrap();
    id.attach_key(SourceKey::new(SourceSystem::Profile, "c-9"))
      .unwrap();
    assert_eq!(id.key_for(SourceSystem::Performance), Some("p-1"));
    assert_eq!(id.key_for(SourceSystem::Profile), Some("c-9"));
  }

  #[test]
  fn duplicate_same_system_key_is_an_error() {
    let mut id = identity();
    id.attach_key(SourceKey::new(SourceSystem::Performance, "p-1"))
      .unwrap();
    let err = id
      .attach_key(SourceKey::new(SourceSystem::Performance, "p-2"))
      .unwrap_err();
    assert!(matches!(err, Error::DuplicateSourceKey { .. }));
  }

  #[test]
  fn reattaching_the_same_key_is_idempotent() {
    let mut id = identity();
    id.attach_key(SourceKey::new(SourceSystem::Profile, "c-9"))
      .unwrap();
    id.attach_key(SourceKey::new(SourceSystem::Profile, "c-9"))
      .unwrap();
    assert_eq!(id.source_keys.len(), 1);
  }
}
