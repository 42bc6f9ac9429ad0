//! Pluggable external scorer boundary.
//!
//! The pattern pipeline is self-sufficient; a deployment may additionally
//! plug in a remote scoring model behind this trait. Scorer calls are I/O at
//! the boundary — the analyzer wraps them with a timeout and fails closed.

use async_trait::async_trait;
use warden_core::{Risk, WardenError};

/// External scorer — a remote model or service that assesses a prompt.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Human-readable scorer name.
    fn name(&self) -> &str;

    /// Assess the prompt and return additional risk signals.
    async fn score(&self, prompt: &str) -> Result<ScorerVerdict, WardenError>;
}

/// What an external scorer reports back.
#[derive(Debug, Default)]
pub struct ScorerVerdict {
    /// Risks the scorer identified. Categories already found by the pattern
    /// extractors are ignored on merge.
    pub risks: Vec<Risk>,
    /// Optional free-form explanation, appended to the reasoning summary.
    pub reasoning: Option<String>,
}

/// Default no-op scorer — pattern-only analysis.
pub struct PatternOnly;

#[async_trait]
impl Scorer for PatternOnly {
    fn name(&self) -> &str {
        "pattern-only"
    }

    async fn score(&self, _prompt: &str) -> Result<ScorerVerdict, WardenError> {
        Ok(ScorerVerdict::default())
    }
}
