//! Renal triggers.

use react_model::{ConditionLabel, DetectedIssue, Grade, IssueType, LabParameter, SupportingDatum};
use tracing::debug;

use crate::creatinine::grade_creatinine;
use crate::units::CanonicalLabs;

pub const LUTATHERA_CLCR_FLOOR: f64 = 40.0;
pub const PLUVICTO_CLCR_FLOOR: f64 = 30.0;
/// Current/baseline creatinine ratio for a 40% increase.
pub const CREATININE_INCREASE_RATIO: f64 = 1.4;
/// Fractional CLcr decrease from baseline.
pub const CLCR_DECREASE_FRACTION: f64 = 0.40;

pub const LUTATHERA_CLCR_LOW: &str = "CLcr < 40 mL/min";
pub const LUTATHERA_CREATININE_INCREASE: &str = "≥40% increase from baseline creatinine";
pub const LUTATHERA_CLCR_DECREASE: &str = "≥40% decrease from baseline CLcr";
pub const PLUVICTO_HOLD: &str = "Confirmed creatinine Grade ≥ 2 OR CLcr < 30";
pub const PLUVICTO_REDUCE: &str = "≥40% creatinine increase AND >40% CLcr decrease";
pub const PLUVICTO_DISCONTINUE: &str = "Grade ≥ 3 renal toxicity";

struct RenalValues {
    baseline_cr: Option<f64>,
    current_cr: Option<f64>,
    baseline_clcr: Option<f64>,
    current_clcr: Option<f64>,
}

impl RenalValues {
    fn from_labs(labs: &CanonicalLabs) -> Self {
        Self {
            baseline_cr: labs.get(LabParameter::BaselineCreatinine),
            current_cr: labs.get(LabParameter::Creatinine),
            baseline_clcr: labs.get(LabParameter::BaselineCreatinineClearance),
            current_clcr: labs.get(LabParameter::CreatinineClearance),
        }
    }

    /// Current over baseline creatinine, when baseline is positive.
    fn creatinine_ratio(&self) -> Option<f64> {
        match (self.baseline_cr, self.current_cr) {
            (Some(base), Some(current)) if base > 0.0 => Some(current / base),
            _ => None,
        }
    }

    /// Fraction of baseline CLcr lost, when baseline is positive.
    fn clcr_decrease(&self) -> Option<f64> {
        match (self.baseline_clcr, self.current_clcr) {
            (Some(base), Some(current)) if base > 0.0 => Some((base - current) / base),
            _ => None,
        }
    }
}

pub fn lutathera_renal(labs: &CanonicalLabs) -> Vec<DetectedIssue> {
    let renal = RenalValues::from_labs(labs);
    let mut issues = Vec::new();

    if renal.current_clcr.is_some_and(|c| c < LUTATHERA_CLCR_FLOOR) {
        issues.push(renal_issue(LUTATHERA_CLCR_LOW));
    }
    if renal
        .creatinine_ratio()
        .is_some_and(|r| r >= CREATININE_INCREASE_RATIO)
    {
        issues.push(renal_issue(LUTATHERA_CREATININE_INCREASE));
    }
    if renal
        .clcr_decrease()
        .is_some_and(|d| d >= CLCR_DECREASE_FRACTION)
    {
        issues.push(renal_issue(LUTATHERA_CLCR_DECREASE));
    }

    debug!(count = issues.len(), "lutathera renal triggers");
    issues
}

/// PLUVICTO renal triggers; every issue carries the creatinine grade.
pub fn pluvicto_renal(labs: &CanonicalLabs) -> Vec<DetectedIssue> {
    let renal = RenalValues::from_labs(labs);
    let cr_grade = grade_creatinine(
        renal.baseline_cr,
        renal.current_cr,
        labs.uln(LabParameter::Creatinine),
    );
    let mut issues = Vec::new();

    if renal.current_clcr.is_some_and(|c| c < PLUVICTO_CLCR_FLOOR)
        || cr_grade.is_some_and(|g| g >= Grade::TWO)
    {
        issues.push(renal_issue(PLUVICTO_HOLD));
    }
    if renal
        .creatinine_ratio()
        .is_some_and(|r| r >= CREATININE_INCREASE_RATIO)
        && renal
            .clcr_decrease()
            .is_some_and(|d| d > CLCR_DECREASE_FRACTION)
    {
        issues.push(renal_issue(PLUVICTO_REDUCE));
    }
    if cr_grade.is_some_and(|g| g >= Grade::THREE) {
        issues.push(renal_issue(PLUVICTO_DISCONTINUE));
    }

    debug!(
        count = issues.len(),
        cr_grade = ?cr_grade.map(Grade::number),
        "pluvicto renal triggers"
    );
    if let Some(grade) = cr_grade {
        let datum = SupportingDatum::new("Creatinine increase", Some(grade), renal.current_cr)
            .with_parameter(LabParameter::Creatinine);
        for issue in &mut issues {
            issue.supporting.push(datum.clone());
        }
    }
    issues
}

fn renal_issue(condition: &str) -> DetectedIssue {
    DetectedIssue::new(IssueType::RenalToxicity, ConditionLabel::new(condition))
}
