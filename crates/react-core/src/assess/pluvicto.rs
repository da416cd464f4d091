//! PLUVICTO (Lu-177 PSMA-617) rules.

use react_model::{
    ConditionLabel, DetectedIssue, Drug, DrugExtras, Grade, IssueType, SupportingDatum,
};

use super::hematology::{GradedCytopenia, myelosuppression};
use super::{DrugAssessor, renal};
use crate::units::CanonicalLabs;

/// Delay beyond which treatment is discontinued.
pub const MAX_DELAY_WEEKS: f64 = 4.0;

pub const GI_NOT_AMENABLE: &str = "Grade ≥ 3 (not amenable to medical intervention)";

pub struct PluvictoAssessor;

fn reported(grade: Grade) -> Vec<SupportingDatum> {
    vec![SupportingDatum::new("Reported grade", Some(grade), None)]
}

impl DrugAssessor for PluvictoAssessor {
    fn drug(&self) -> Drug {
        Drug::Pluvicto
    }

    fn description(&self) -> &'static str {
        "Composite myelosuppression, creatinine grade, non-hematologic grades, 4-week delay"
    }

    fn has_extra_input(&self, extras: &DrugExtras) -> bool {
        extras.has_any_grade() || extras.nonzero_delay().is_some()
    }

    fn renal(&self, labs: &CanonicalLabs) -> Vec<DetectedIssue> {
        renal::pluvicto_renal(labs)
    }

    fn extras(&self, extras: &DrugExtras) -> Vec<DetectedIssue> {
        let mut issues = Vec::new();

        if let Some(grade) = extras.dry_mouth_grade.filter(|g| *g >= Grade::TWO) {
            issues.push(DetectedIssue::new(IssueType::DryMouth, grade));
        }
        if let Some(grade) = extras.fatigue_grade.filter(|g| *g >= Grade::THREE) {
            issues.push(
                DetectedIssue::new(IssueType::Fatigue, ConditionLabel::at_least(Grade::THREE))
                    .with_supporting(reported(grade)),
            );
        }
        if let Some(grade) = extras.gi_grade.filter(|g| *g >= Grade::THREE)
            && !extras.gi_amenable
        {
            issues.push(
                DetectedIssue::new(
                    IssueType::Gastrointestinal,
                    ConditionLabel::new(GI_NOT_AMENABLE),
                )
                .with_supporting(reported(grade)),
            );
        }
        if let Some(grade) = extras.electrolyte_grade.filter(|g| *g >= Grade::TWO) {
            issues.push(
                DetectedIssue::new(IssueType::Electrolyte, ConditionLabel::at_least(Grade::TWO))
                    .with_supporting(reported(grade)),
            );
        }

        issues
    }

    fn timing(&self, extras: &DrugExtras) -> Vec<DetectedIssue> {
        extras
            .delay_weeks
            .filter(|weeks| *weeks > MAX_DELAY_WEEKS)
            .map(|weeks| {
                DetectedIssue::new(IssueType::TreatmentDelay, ConditionLabel::any())
                    .with_supporting(vec![SupportingDatum::new(
                        "Treatment delay (weeks)",
                        None,
                        Some(weeks),
                    )])
            })
            .into_iter()
            .collect()
    }

    fn composite(&self, graded: &[GradedCytopenia]) -> Option<DetectedIssue> {
        myelosuppression(graded)
    }
}
