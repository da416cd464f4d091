//! Hepatic triggers, shared by both drugs.

use react_model::{ConditionLabel, DetectedIssue, IssueType, LabParameter};

use crate::units::CanonicalLabs;

pub const BILIRUBIN_ULN_MULTIPLE: f64 = 3.0;
/// g/L.
pub const ALBUMIN_FLOOR: f64 = 30.0;
pub const INR_CEILING: f64 = 1.5;

pub const BILIRUBIN_HIGH: &str = "Bilirubin > 3x ULN";
pub const ALBUMIN_LOW_INR_HIGH: &str = "Albumin < 30 g/L with INR > 1.5";

pub fn hepatic_issues(labs: &CanonicalLabs) -> Vec<DetectedIssue> {
    let mut issues = Vec::new();

    if let (Some(bilirubin), Some(uln)) = (
        labs.get(LabParameter::Bilirubin),
        labs.uln(LabParameter::Bilirubin),
    ) && uln > 0.0
        && bilirubin > BILIRUBIN_ULN_MULTIPLE * uln
    {
        issues.push(DetectedIssue::new(
            IssueType::Hepatotoxicity,
            ConditionLabel::new(BILIRUBIN_HIGH),
        ));
    }

    if let (Some(albumin), Some(inr)) = (
        labs.get(LabParameter::Albumin),
        labs.get(LabParameter::Inr),
    ) && albumin < ALBUMIN_FLOOR
        && inr > INR_CEILING
    {
        issues.push(DetectedIssue::new(
            IssueType::Hepatotoxicity,
            ConditionLabel::new(ALBUMIN_LOW_INR_HIGH),
        ));
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use react_model::{LabPanel, ReferenceRanges, UnitMode};

    fn labs(values: &[(LabParameter, f64)], ranges: &ReferenceRanges) -> CanonicalLabs {
        let panel = values
            .iter()
            .fold(LabPanel::builder(UnitMode::PerMicroliter), |b, (p, v)| {
                b.value(*p, Some(*v))
            })
            .build();
        CanonicalLabs::from_inputs(&panel, ranges)
    }

    #[test]
    fn bilirubin_strictly_above_three_uln() {
        let ranges = ReferenceRanges::defaults(UnitMode::PerMicroliter);
        assert!(hepatic_issues(&labs(&[(LabParameter::Bilirubin, 3.0)], &ranges)).is_empty());
        let issues = hepatic_issues(&labs(&[(LabParameter::Bilirubin, 3.1)], &ranges));
        assert_eq!(issues[0].condition.as_str(), BILIRUBIN_HIGH);
    }

    #[test]
    fn bilirubin_needs_uln() {
        let issues = hepatic_issues(&labs(
            &[(LabParameter::Bilirubin, 9.0)],
            &ReferenceRanges::empty(),
        ));
        assert!(issues.is_empty());
    }

    #[test]
    fn albumin_and_inr_must_both_be_abnormal() {
        let ranges = ReferenceRanges::empty();
        let both = labs(&[(LabParameter::Albumin, 28.0), (LabParameter::Inr, 1.6)], &ranges);
        assert_eq!(hepatic_issues(&both).len(), 1);
        let albumin_only = labs(
            &[(LabParameter::Albumin, 28.0), (LabParameter::Inr, 1.5)],
            &ranges,
        );
        assert!(hepatic_issues(&albumin_only).is_empty());
    }
}
