//! The export assembler: PII-stripped hand-off documents for the
//! downstream training pipeline.

mod document;
pub mod error;
mod validate;
mod write;

pub use document::{
  CandidateEntry, ExportDocument, ExportMetadata, OriginalAiRating,
  PerformanceOutcome, ResumeFeatures, ValidationMetrics, assemble,
  candidate_id,
};
pub use error::{Error, Result};
pub use validate::validate;
pub use write::write_atomic;

#[cfg(test)]
mod tests;
