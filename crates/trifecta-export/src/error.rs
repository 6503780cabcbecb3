//! Error types for `trifecta-export`.
//!
//! Export errors are fatal to the export step only; the analysis run that
//! produced the snapshot has already succeeded by the time these can
//! occur.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The assembled document violates the export contract. Nothing is
  /// written.
  #[error("export schema validation failed: {}", violations.join("; "))]
  SchemaValidation { violations: Vec<String> },

  #[error("export serialization failed: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("export I/O failed: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
