//! Core types and configuration for the Trifecta analysis pipeline.
//!
//! This crate is deliberately free of I/O dependencies. All other crates
//! depend on it; it depends on nothing proprietary.

pub mod comparison;
pub mod config;
pub mod error;
pub mod identity;
pub mod quality;
pub mod rating;
pub mod record;
pub mod summary;

pub use error::{Error, Result};
