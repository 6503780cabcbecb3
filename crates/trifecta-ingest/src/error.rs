//! Error types for `trifecta-ingest`.
//!
//! Every variant is a per-row error: the owning row is skipped and
//! recorded in the quality log, and the run continues.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("line {line}: malformed row: {reason}")]
  MalformedRow { line: usize, reason: String },

  #[error("line {line}: missing required field {field:?}")]
  MissingField { line: usize, field: &'static str },

  #[error("line {line}: rating value {value:?} is not usable for {expected}")]
  InvalidRating {
    line:     usize,
    value:    String,
    expected: &'static str,
  },
}

impl Error {
  /// 1-based line number of the offending row.
  pub fn line(&self) -> usize {
    match self {
      Self::MalformedRow { line, .. }
      | Self::MissingField { line, .. }
      | Self::InvalidRating { line, .. } => *line,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
