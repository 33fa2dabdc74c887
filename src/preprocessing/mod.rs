//! Sequence preprocessing modules
//!
//! This module contains utilities for preparing beat sequences for scoring:
//! - Lead-in trimming and validity checks
//! - Metrical-level rewrites of annotation sequences

pub mod gate;
pub mod metrical_variants;
