//! Disposition policy — maps risks and score to allow / sanitize / block.

use warden_core::{Disposition, Risk, Severity};

/// Decide the disposition for one analysis call.
///
/// Evaluated in order:
/// 1. no risks → Allow;
/// 2. any high-severity risk AND score at or above the threshold → Block
///    (a single severe signal past the operator's threshold is treated as
///    intentional misuse);
/// 3. otherwise → Sanitize (lesser or borderline signals get a rewritten
///    chance rather than an outright refusal).
///
/// The threshold is snapshotted by the caller before the call — it must not
/// change mid-computation.
pub fn decide(risks: &[Risk], risk_score: u8, threshold: u8) -> Disposition {
    if risks.is_empty() {
        return Disposition::Allow;
    }

    let has_high = risks.iter().any(|r| r.severity == Severity::High);
    if has_high && risk_score >= threshold {
        return Disposition::Block;
    }

    Disposition::Sanitize
}
