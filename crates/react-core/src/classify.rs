//! Tiered CTCAE grading of a single lab value.

use std::collections::BTreeMap;

use react_model::{CriteriaSet, Grade, GradingCriterion, LabBound, LabParameter, Toxicity};
use tracing::trace;

/// Grades values against a [`CriteriaSet`].
#[derive(Debug, Clone, Copy)]
pub struct GradeClassifier<'a> {
    criteria: &'a CriteriaSet,
}

impl<'a> GradeClassifier<'a> {
    pub fn new(criteria: &'a CriteriaSet) -> Self {
        Self { criteria }
    }

    /// Highest grade whose criterion `value` satisfies, or `None`.
    ///
    /// `value` and `lln` must be on the same scale as the criteria (/uL for
    /// cell counts). Bands are half-open, so a value between two published
    /// cut-offs takes the grade of the lower band. Ranges of different grades
    /// may overlap.
    pub fn classify(
        &self,
        toxicity: Toxicity,
        value: f64,
        lln: &BTreeMap<LabParameter, f64>,
    ) -> Option<Grade> {
        self.criteria
            .for_toxicity(toxicity)
            .filter(|criterion| criterion_matches(criterion, value, lln))
            .inspect(|criterion| trace!(%toxicity, grade = %criterion.grade, "criterion hit"))
            .map(|criterion| criterion.grade)
            .fold(None, highest_grade)
    }
}

/// Keeps the more severe of the grade so far and a new hit.
pub fn highest_grade(current: Option<Grade>, hit: Grade) -> Option<Grade> {
    match current {
        Some(existing) if existing >= hit => Some(existing),
        _ => Some(hit),
    }
}

fn criterion_matches(
    criterion: &GradingCriterion,
    value: f64,
    lln: &BTreeMap<LabParameter, f64>,
) -> bool {
    !criterion.bounds.is_empty()
        && criterion
            .bounds
            .iter()
            .all(|bound| bound_matches(bound, value, lln))
}

/// An LLN-gated bound with no LLN on file is not satisfied.
fn bound_matches(bound: &LabBound, value: f64, lln: &BTreeMap<LabParameter, f64>) -> bool {
    if bound.below_lln {
        match lln.get(&bound.parameter) {
            Some(limit) if value < *limit => {}
            _ => return false,
        }
    }
    bound.contains(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anemia_criteria() -> CriteriaSet {
        let mut set = CriteriaSet::new();
        set.insert(
            Toxicity::Anemia,
            Grade::ONE,
            LabBound::new(LabParameter::Hemoglobin, Some(10.0), None).below_lln(),
        )
        .unwrap();
        set.insert(
            Toxicity::Anemia,
            Grade::TWO,
            LabBound::new(LabParameter::Hemoglobin, Some(8.0), Some(10.0)),
        )
        .unwrap();
        set.insert(
            Toxicity::Anemia,
            Grade::THREE,
            LabBound::new(LabParameter::Hemoglobin, Some(0.0), Some(8.0)),
        )
        .unwrap();
        set
    }

    fn lln(value: f64) -> BTreeMap<LabParameter, f64> {
        BTreeMap::from([(LabParameter::Hemoglobin, value)])
    }

    #[test]
    fn highest_grade_keeps_most_severe() {
        assert_eq!(highest_grade(None, Grade::TWO), Some(Grade::TWO));
        assert_eq!(highest_grade(Some(Grade::THREE), Grade::TWO), Some(Grade::THREE));
        assert_eq!(highest_grade(Some(Grade::ONE), Grade::FOUR), Some(Grade::FOUR));
    }

    #[test]
    fn grade_one_requires_lln() {
        let criteria = anemia_criteria();
        let classifier = GradeClassifier::new(&criteria);
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 10.5, &lln(12.0)),
            Some(Grade::ONE)
        );
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 10.5, &BTreeMap::new()),
            None
        );
        assert_eq!(classifier.classify(Toxicity::Anemia, 12.5, &lln(12.0)), None);
        assert_eq!(classifier.classify(Toxicity::Anemia, 12.0, &lln(12.0)), None);
    }

    #[test]
    fn banded_grades_ignore_lln() {
        let criteria = anemia_criteria();
        let classifier = GradeClassifier::new(&criteria);
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 8.5, &BTreeMap::new()),
            Some(Grade::TWO)
        );
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 7.0, &lln(10.0)),
            Some(Grade::THREE)
        );
    }

    #[test]
    fn values_between_published_cutoffs_are_graded() {
        let criteria = anemia_criteria();
        let classifier = GradeClassifier::new(&criteria);
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 7.9995, &lln(10.0)),
            Some(Grade::THREE)
        );
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 8.0, &lln(10.0)),
            Some(Grade::TWO)
        );
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 9.9995, &lln(10.0)),
            Some(Grade::TWO)
        );
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 9.9995, &BTreeMap::new()),
            Some(Grade::TWO)
        );
    }

    #[test]
    fn overlapping_ranges_pick_highest() {
        let mut criteria = anemia_criteria();
        criteria
            .insert(
                Toxicity::Anemia,
                Grade::FOUR,
                LabBound::new(LabParameter::Hemoglobin, None, Some(7.5)),
            )
            .unwrap();
        let classifier = GradeClassifier::new(&criteria);
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 7.2, &BTreeMap::new()),
            Some(Grade::FOUR)
        );
        assert_eq!(
            classifier.classify(Toxicity::Anemia, 7.8, &BTreeMap::new()),
            Some(Grade::THREE)
        );
    }

    #[test]
    fn toxicity_without_criteria_is_ungraded() {
        let criteria = anemia_criteria();
        let classifier = GradeClassifier::new(&criteria);
        assert_eq!(
            classifier.classify(Toxicity::Neutropenia, 100.0, &BTreeMap::new()),
            None
        );
    }
}
