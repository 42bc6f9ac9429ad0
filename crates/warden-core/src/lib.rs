//! # warden-core
//!
//! Core types, configuration, error handling, and language detection for
//! the Warden prompt-moderation pipeline.

pub mod config;
pub mod error;
pub mod language;
pub mod result;
pub mod risk;

pub use config::shellexpand;
pub use error::WardenError;
pub use language::detect_language;
pub use result::{AnalysisRecord, AnalysisResult};
pub use risk::{Disposition, Risk, RiskCategory, Severity};
