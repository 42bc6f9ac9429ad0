//! Risk aggregation — merge extractor outputs into one deduplicated list
//! and a composite score.

use warden_core::{Risk, Severity};

pub const WEIGHT_LOW: u32 = 10;
pub const WEIGHT_MEDIUM: u32 = 25;
pub const WEIGHT_HIGH: u32 = 40;

fn weight(severity: Severity) -> u32 {
    match severity {
        Severity::Low => WEIGHT_LOW,
        Severity::Medium => WEIGHT_MEDIUM,
        Severity::High => WEIGHT_HIGH,
    }
}

/// Merge detections (already in category-priority order) into the final risk
/// list and composite score.
///
/// Duplicate detections of the same category count once, highest severity
/// wins — overlapping phrase matches must not inflate the score. Weights sum
/// and cap at 100, so adding a risk can only raise or hold the score.
pub fn aggregate(detections: Vec<Risk>) -> (Vec<Risk>, u8) {
    let mut risks: Vec<Risk> = Vec::with_capacity(detections.len());

    for risk in detections {
        match risks.iter_mut().find(|r| r.category == risk.category) {
            Some(existing) => {
                if risk.severity > existing.severity {
                    *existing = risk;
                }
            }
            None => risks.push(risk),
        }
    }

    let score: u32 = risks.iter().map(|r| weight(r.severity)).sum();
    (risks, score.min(100) as u8)
}
