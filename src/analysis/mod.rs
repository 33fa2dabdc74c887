//! Result aggregation modules
//!
//! Turns per-metric scores into reportable results:
//! - Per-file result types
//! - Corpus-level tables and means
//! - Bootstrap confidence intervals
//! - Run metadata

pub mod bootstrap;
pub mod corpus;
pub mod metadata;
pub mod result;
