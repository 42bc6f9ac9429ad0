//! Prompt sanitization.
//!
//! Rewrites a risky prompt so it can still be forwarded: instruction-override
//! framing is stripped, dangerous spans are redacted, and insults are swapped
//! for neutral wording. The rewrite is deterministic and idempotent — running
//! it on its own output changes nothing.

use crate::extractors::{
    Extractor, CREDENTIAL_PATTERNS, DESTRUCTIVE_PATTERNS, ILLEGAL_PATTERNS, INJECTION_PATTERNS,
    MALWARE_PATTERNS, PII_PATTERNS,
};
use once_cell::sync::Lazy;
use regex::Regex;
use warden_core::{Severity, WardenError};

/// Neutral placeholder for redacted spans. Must not itself match any
/// extractor pattern, or sanitization would never converge.
pub const REDACTED: &str = "[redacted]";

/// Stands in for a prompt whose content was entirely removed, so downstream
/// consumers always receive non-empty text.
pub const EMPTY_INTENT: &str = "[prompt withheld: no safe content remained]";

/// Word-for-word replacements that keep the sentence readable.
static PROFANITY_REPLACEMENTS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("idiots", "people"),
        ("idiot", "person"),
        ("morons", "people"),
        ("moron", "person"),
        ("stupid", "unwise"),
        ("dumbass", "person"),
        ("jerk", "person"),
        ("losers", "people"),
        ("loser", "person"),
        ("idiota", "persona"),
        ("imbécil", "persona"),
        ("crétin", "personne"),
        ("dummkopf", "person"),
        ("идиот", "человек"),
        ("дурак", "человек"),
        ("burro", "pessoa"),
    ]
    .iter()
    .filter_map(|(word, neutral)| {
        Regex::new(&format!(r"(?i)\b{word}\b"))
            .ok()
            .map(|re| (re, *neutral))
    })
    .collect()
});

/// Result of sanitizing a prompt.
#[derive(Debug)]
pub struct SanitizeOutcome {
    /// The rewritten text. Never empty.
    pub text: String,
    /// Whether the rewrite differs from the input.
    pub was_modified: bool,
    /// Descriptions of what was rewritten.
    pub applied: Vec<String>,
}

/// Rewrite a prompt to neutralize detected risk content while preserving
/// benign intent where possible.
pub fn sanitize(prompt: &str) -> SanitizeOutcome {
    let mut text = prompt.to_string();
    let mut applied = Vec::new();

    // 1. Strip instruction-override framing outright — there is no benign
    //    residue worth keeping in an "ignore previous instructions" clause.
    for pattern in INJECTION_PATTERNS.iter() {
        if pattern.is_match(&text) {
            text = pattern.replace_all(&text, "").into_owned();
            applied.push("stripped instruction-override phrasing".to_string());
        }
    }

    // 2. Redact dangerous spans in place.
    let redact_tables: &[(&Lazy<Vec<Regex>>, &str)] = &[
        (&MALWARE_PATTERNS, "malicious-code request"),
        (&CREDENTIAL_PATTERNS, "credential request"),
        (&PII_PATTERNS, "personal-data request"),
        (&DESTRUCTIVE_PATTERNS, "destructive command"),
        (&ILLEGAL_PATTERNS, "illegal-activity request"),
    ];
    for (table, label) in redact_tables {
        for pattern in table.iter() {
            if pattern.is_match(&text) {
                text = pattern.replace_all(&text, REDACTED).into_owned();
                applied.push(format!("redacted {label} span"));
            }
        }
    }

    // 3. Swap insults for neutral wording.
    for (pattern, neutral) in PROFANITY_REPLACEMENTS.iter() {
        if pattern.is_match(&text) {
            text = pattern.replace_all(&text, *neutral).into_owned();
            applied.push("replaced abusive language".to_string());
        }
    }

    // 4. Normalize whitespace left behind by stripping.
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    // 5. If nothing meaningful survived, collapse to the fixed placeholder
    //    rather than forwarding empty text.
    let residue = text.replace(REDACTED, "");
    let text = if residue.chars().any(|c| c.is_alphanumeric()) {
        text
    } else {
        applied.push("no residual content; collapsed to placeholder".to_string());
        EMPTY_INTENT.to_string()
    };

    SanitizeOutcome {
        was_modified: text != prompt,
        text,
        applied,
    }
}

/// Sanitize, then verify the rewrite against the extractor registry.
///
/// A rewrite that still carries a high-severity detection is a failed
/// sanitization; the caller must fail closed to Block rather than forward it.
pub fn sanitize_checked(
    prompt: &str,
    extractors: &[Box<dyn Extractor>],
) -> Result<SanitizeOutcome, WardenError> {
    let outcome = sanitize(prompt);

    for extractor in extractors {
        let residual = extractor
            .detect(&outcome.text, "unknown")
            .unwrap_or_default();
        if let Some(risk) = residual.iter().find(|r| r.severity == Severity::High) {
            return Err(WardenError::Sanitize(format!(
                "rewrite still carries a high-severity {} signal",
                risk.category
            )));
        }
    }

    Ok(outcome)
}
