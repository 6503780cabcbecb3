//! The analysis pipeline: aggregation, population-relative scoring,
//! rating linkage, and run orchestration.
//!
//! [`execute`] runs the whole thing: resolve → aggregate → tier/score →
//! link → snapshot. The intermediate stages are public so callers can run
//! pieces in isolation (and so the stages stay independently testable).

pub mod aggregate;
pub mod link;
pub mod population;
pub mod run;
pub mod score;

pub use run::{RunInput, execute};

#[cfg(test)]
mod tests;
