//! The analysis result — one immutable record per analyzed prompt.

use crate::risk::{Disposition, Risk};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output of one analysis call. Immutable after assembly; ownership passes
/// to the caller, and the flagged store may retain a copy.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// The prompt as submitted.
    pub original_prompt: String,
    /// Composite risk score, 0–100. A pure function of `risks`.
    pub risk_score: u8,
    /// Detected risks, in detection order. May be empty.
    pub risks: Vec<Risk>,
    pub disposition: Disposition,
    /// Equals `original_prompt` when no sanitization occurred.
    pub sanitized_prompt: String,
    /// Deterministic summary of why the disposition was chosen.
    pub reasoning: String,
    /// Instant of analysis.
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Whether the prompt was rejected outright.
    pub fn blocked(&self) -> bool {
        self.disposition == Disposition::Block
    }

    /// Whether this result must be handed to the flagged store.
    pub fn should_record(&self) -> bool {
        self.blocked() || self.sanitized_prompt != self.original_prompt
    }

    /// The wire shape consumed by the analyzer UI and dashboard.
    pub fn to_record(&self) -> AnalysisRecord {
        AnalysisRecord {
            risk_score: self.risk_score,
            risks: self.risks.clone(),
            blocked: self.blocked(),
            sanitized_prompt: self.sanitized_prompt.clone(),
            reasoning: self.reasoning.clone(),
        }
    }
}

/// Serialized analysis — exactly the fields the presentation layer expects:
/// `riskScore`, `risks`, `blocked`, `sanitizedPrompt`, `reasoning`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub risk_score: u8,
    pub risks: Vec<Risk>,
    pub blocked: bool,
    pub sanitized_prompt: String,
    pub reasoning: String,
}
