//! LUTATHERA (Lu-177 dotatate) rules.

use react_model::{
    ConditionLabel, DetectedIssue, Drug, DrugExtras, Grade, IssueType, SupportingDatum, Toxicity,
};

use super::hematology::{GradedCytopenia, individual_issues};
use super::{DrugAssessor, renal};
use crate::units::CanonicalLabs;

/// Delay beyond which treatment is discontinued.
pub const MAX_DELAY_WEEKS: f64 = 16.0;

pub struct LutatheraAssessor;

/// Lowest grade at which a cytopenia is reported.
pub fn cytopenia_floor(toxicity: Toxicity) -> Option<Grade> {
    match toxicity {
        Toxicity::Thrombocytopenia | Toxicity::Leukopenia => Some(Grade::TWO),
        Toxicity::Anemia | Toxicity::Neutropenia => Some(Grade::THREE),
    }
}

impl DrugAssessor for LutatheraAssessor {
    fn drug(&self) -> Drug {
        Drug::Lutathera
    }

    fn description(&self) -> &'static str {
        "Individual cytopenias, CLcr and creatinine change, 16-week delay"
    }

    fn has_extra_input(&self, extras: &DrugExtras) -> bool {
        extras.nonzero_delay().is_some()
    }

    fn individual_cytopenias(&self, graded: &[GradedCytopenia]) -> Vec<DetectedIssue> {
        individual_issues(graded, cytopenia_floor)
    }

    fn renal(&self, labs: &CanonicalLabs) -> Vec<DetectedIssue> {
        renal::lutathera_renal(labs)
    }

    fn timing(&self, extras: &DrugExtras) -> Vec<DetectedIssue> {
        extras
            .delay_weeks
            .filter(|weeks| *weeks > MAX_DELAY_WEEKS)
            .map(|weeks| {
                DetectedIssue::new(IssueType::DoseDelayed, ConditionLabel::any()).with_supporting(
                    vec![SupportingDatum::new("Dose delay (weeks)", None, Some(weeks))],
                )
            })
            .into_iter()
            .collect()
    }
}
