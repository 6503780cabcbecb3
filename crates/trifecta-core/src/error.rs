//! Error types for `trifecta-core`.

use thiserror::Error;

use crate::identity::SourceSystem;

#[derive(Debug, Error)]
pub enum Error {
  /// Fatal: the run must abort before any processing starts.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// A human rating label not present in the configured ordinal scale.
  #[error("unknown rating label: {0:?}")]
  UnknownRatingLabel(String),

  /// An AI rating outside the declared 0–100 scale.
  #[error("rating score {0} outside the 0–100 scale")]
  RatingOutOfRange(f64),

  /// Two records from the same origin system claim the same identity.
  /// This is a data-quality error, never a merge.
  #[error("duplicate {system:?} key {key:?} for one identity")]
  DuplicateSourceKey { system: SourceSystem, key: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
