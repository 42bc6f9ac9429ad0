//! # warden-analysis
//!
//! The risk-analysis and moderation pipeline: extractors feed an aggregator,
//! a disposition policy picks allow / sanitize / block, and the sanitizer
//! rewrites what can be saved. Pure and in-memory — any external calls
//! (scorer, flagged store) are I/O at the boundary.

pub mod aggregate;
pub mod analyzer;
pub mod extractors;
pub mod policy;
pub mod sanitize;
pub mod scorer;

pub use analyzer::Analyzer;
pub use extractors::Extractor;
pub use sanitize::SanitizeOutcome;
pub use scorer::{PatternOnly, Scorer, ScorerVerdict};
