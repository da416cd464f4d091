//! Cytopenia grading and per-drug hematology reporting.

use react_model::{ConditionLabel, DetectedIssue, Grade, IssueType, SupportingDatum, Toxicity};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::GradeClassifier;
use crate::units::CanonicalLabs;

/// A cytopenia that reached a CTCAE grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradedCytopenia {
    pub toxicity: Toxicity,
    pub grade: Grade,
    /// Canonical value (/uL for counts).
    pub value: f64,
}

impl GradedCytopenia {
    /// Supporting entry named after the toxicity (`Thrombocytopenia`).
    pub fn toxicity_datum(&self) -> SupportingDatum {
        SupportingDatum::new(self.toxicity.as_str(), Some(self.grade), Some(self.value))
            .with_parameter(self.toxicity.parameter())
    }

    /// Supporting entry named after the measurement (`Platelets`).
    pub fn measurement_datum(&self) -> SupportingDatum {
        SupportingDatum::new(
            self.toxicity.measurement_label(),
            Some(self.grade),
            Some(self.value),
        )
        .with_parameter(self.toxicity.parameter())
    }
}

/// Grades every cytopenia whose parameter is on the panel.
///
/// Order is anemia, thrombocytopenia, leukopenia, neutropenia.
pub fn grade_cytopenias(
    classifier: &GradeClassifier<'_>,
    labs: &CanonicalLabs,
) -> Vec<GradedCytopenia> {
    Toxicity::ALL
        .into_iter()
        .filter_map(|toxicity| {
            let value = labs.get(toxicity.parameter())?;
            let grade = classifier.classify(toxicity, value, labs.lln_map());
            debug!(%toxicity, grade = ?grade.map(Grade::number), "cytopenia graded");
            grade.map(|grade| GradedCytopenia {
                toxicity,
                grade,
                value,
            })
        })
        .collect()
}

/// One issue per cytopenia at or above its floor grade.
pub fn individual_issues(
    graded: &[GradedCytopenia],
    floor: impl Fn(Toxicity) -> Option<Grade>,
) -> Vec<DetectedIssue> {
    graded
        .iter()
        .filter(|c| floor(c.toxicity).is_some_and(|min| c.grade >= min))
        .map(|c| {
            DetectedIssue::new(c.toxicity.issue_type(), c.grade)
                .with_supporting(vec![c.measurement_datum()])
        })
        .collect()
}

/// Composite issue over all graded cytopenias when the worst is Grade 2+.
///
/// Labeled `Grade 2` when the worst is exactly 2, `Grade ≥ 3` above that.
pub fn myelosuppression(graded: &[GradedCytopenia]) -> Option<DetectedIssue> {
    let worst = graded.iter().map(|c| c.grade).max()?;
    if worst < Grade::TWO {
        return None;
    }
    let condition = if worst == Grade::TWO {
        worst.label()
    } else {
        ConditionLabel::at_least(Grade::THREE)
    };
    let supporting = graded.iter().map(GradedCytopenia::toxicity_datum).collect();
    Some(
        DetectedIssue::new(IssueType::Myelosuppression, condition)
            .with_supporting(supporting),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cytopenia(toxicity: Toxicity, grade: Grade, value: f64) -> GradedCytopenia {
        GradedCytopenia {
            toxicity,
            grade,
            value,
        }
    }

    #[test]
    fn composite_uses_worst_grade() {
        let graded = [
            cytopenia(Toxicity::Anemia, Grade::ONE, 9.9),
            cytopenia(Toxicity::Thrombocytopenia, Grade::FOUR, 20_000.0),
        ];
        let issue = myelosuppression(&graded).unwrap();
        assert_eq!(issue.issue_type, IssueType::Myelosuppression);
        assert_eq!(issue.condition.as_str(), "Grade ≥ 3");
        assert_eq!(issue.supporting.len(), 2);
        assert_eq!(issue.supporting[0].label, "Anemia");
    }

    #[test]
    fn composite_grade_two_label() {
        let graded = [cytopenia(Toxicity::Anemia, Grade::TWO, 8.5)];
        assert_eq!(
            myelosuppression(&graded).unwrap().condition.as_str(),
            "Grade 2"
        );
    }

    #[test]
    fn no_composite_below_grade_two() {
        assert!(myelosuppression(&[]).is_none());
        let mild = cytopenia(Toxicity::Leukopenia, Grade::ONE, 2_900.0);
        assert!(myelosuppression(&[mild]).is_none());
    }

    #[test]
    fn individual_issues_respect_floor() {
        let graded = [
            cytopenia(Toxicity::Anemia, Grade::TWO, 8.5),
            cytopenia(Toxicity::Thrombocytopenia, Grade::TWO, 60_000.0),
        ];
        let issues = individual_issues(&graded, |t| match t {
            Toxicity::Anemia => Some(Grade::THREE),
            _ => Some(Grade::TWO),
        });
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::Thrombocytopenia);
        assert_eq!(issues[0].condition.as_str(), "Grade 2");
        assert_eq!(issues[0].supporting[0].label, "Platelets");
    }
}
