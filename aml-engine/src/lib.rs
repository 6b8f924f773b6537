//! AML transaction analysis engine
//!
//! Pure, synchronous detection logic: ten independent rules, a fault-isolating
//! analysis engine, a weighted risk scorer, a pattern analyzer, and a
//! standalone fuzzy watchlist matcher. No I/O lives in this crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod pattern;
pub mod rules;
pub mod scoring;
pub mod types;

pub use engine::AnalysisEngine;
pub use error::{Error, Result};
pub use fuzzy::{token_sort_ratio, WatchlistMatcher};
pub use pattern::PatternAnalyzer;
pub use scoring::RiskScorer;
pub use types::*;
