//! Identity resolution across disjoint key spaces.
//!
//! Matches performance-system identities against a candidate-profile pool
//! through an ordered cascade (exact key, composite exact, fuzzy name),
//! enforcing a one-to-one injective mapping via an explicit available-pool
//! index. Unmatched and ambiguous records are returned as data, never
//! dropped silently and never surfaced as a bare null.

mod normalize;
mod resolve;

use serde::{Deserialize, Serialize};
use trifecta_core::{identity::Identity, quality::AmbiguousMatch};

pub use crate::normalize::{normalized_name, token_sort_similarity};

// ─── Public types ────────────────────────────────────────────────────────────

/// The cascade stage that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
  /// Both sides carried the same standardized system-wide identifier.
  ExactKey,
  /// Normalized first + last name and hire date equal on the calendar day.
  CompositeExact,
  /// Token-sorted name similarity with a hire-date proximity bonus.
  Fuzzy,
}

impl MatchMethod {
  pub fn confidence(self) -> f64 {
    match self {
      Self::ExactKey => 1.0,
      Self::CompositeExact => 0.9,
      Self::Fuzzy => 0.85,
    }
  }
}

/// A resolved pairing: the minted canonical identity carrying both source
/// keys, plus how and how confidently it was matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityMatch {
  pub identity:   Identity,
  pub confidence: f64,
  pub method:     MatchMethod,
}

/// The complete outcome of one resolution pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resolution {
  pub matches:   Vec<IdentityMatch>,
  /// Performance-system idents with no acceptable candidate.
  pub unmatched: Vec<trifecta_core::identity::SourceIdent>,
  /// Fuzzy or composite ties, rejected and reported for manual review.
  pub ambiguous: Vec<AmbiguousMatch>,
}

pub use crate::resolve::resolve_all;
