//! Risk signals and dispositions — the vocabulary of an analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How dangerous a detected signal is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Closed set of risk categories an extractor can report.
///
/// Serialized as the `type` tag the dashboard renders (snake_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    /// Attempts to override system instructions or hijack the model's role.
    PromptInjection,
    /// Requests to produce malware, exploits, or attack tooling.
    MalwareGeneration,
    /// Requests for passwords, tokens, or other secrets.
    CredentialRequest,
    /// Requests for personal data (SSN, card numbers, addresses).
    PiiRequest,
    /// Destructive shell/SQL commands embedded in the prompt.
    DestructiveCommand,
    /// Requests for illegal activity (intrusion, fraud, weapons).
    IllegalActivity,
    /// Insults and abusive language.
    Profanity,
    /// The external scorer failed or timed out; analysis is degraded.
    AnalysisIncomplete,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PromptInjection => "prompt_injection",
            Self::MalwareGeneration => "malware_generation",
            Self::CredentialRequest => "credential_request",
            Self::PiiRequest => "pii_request",
            Self::DestructiveCommand => "destructive_command",
            Self::IllegalActivity => "illegal_activity",
            Self::Profanity => "profanity",
            Self::AnalysisIncomplete => "analysis_incomplete",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected concern. Immutable once created by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(rename = "type")]
    pub category: RiskCategory,
    pub severity: Severity,
    pub description: String,
    /// The matched substring, kept for diagnostics. Not part of the wire shape.
    #[serde(skip)]
    pub span: Option<String>,
}

impl Risk {
    pub fn new(category: RiskCategory, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }
}

/// The pipeline's final decision for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Forward unchanged.
    Allow,
    /// Forward a neutralized rewrite.
    Sanitize,
    /// Reject outright; never forwarded, sanitized or not.
    Block,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Sanitize => "sanitize",
            Self::Block => "block",
        }
    }
}
