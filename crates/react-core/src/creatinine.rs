//! Ratio-based grading of creatinine increase.

use react_model::Grade;

/// Ratio cut-offs, most severe first. Each is a strict lower bound.
const RATIO_GRADES: [(f64, Grade); 4] = [
    (6.0, Grade::FOUR),
    (3.0, Grade::THREE),
    (1.5, Grade::TWO),
    (1.0, Grade::ONE),
];

/// Grades a creatinine increase.
///
/// The reference is the ULN when the baseline is unknown or within normal
/// limits, and the baseline when it is already above the ULN.
pub fn grade_creatinine(
    baseline: Option<f64>,
    current: Option<f64>,
    uln: Option<f64>,
) -> Option<Grade> {
    let current = current?;
    let uln = uln.filter(|u| *u > 0.0)?;
    let reference = match baseline {
        Some(base) if base > uln => base,
        _ => uln,
    };
    let ratio = current / reference;
    RATIO_GRADES
        .iter()
        .find(|(cutoff, _)| ratio > *cutoff)
        .map(|(_, grade)| *grade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_of_exactly_three_is_grade_two() {
        assert_eq!(grade_creatinine(None, Some(3.6), Some(1.2)), Some(Grade::TWO));
        assert_eq!(grade_creatinine(None, Some(3.7), Some(1.2)), Some(Grade::THREE));
    }

    #[test]
    fn elevated_baseline_becomes_reference() {
        // 4.0 / 2.0 = 2.0 against baseline, 3.33 against ULN.
        assert_eq!(
            grade_creatinine(Some(2.0), Some(4.0), Some(1.2)),
            Some(Grade::TWO)
        );
        assert_eq!(
            grade_creatinine(Some(1.0), Some(4.0), Some(1.2)),
            Some(Grade::THREE)
        );
    }

    #[test]
    fn missing_inputs_are_ungraded() {
        assert_eq!(grade_creatinine(Some(1.0), None, Some(1.2)), None);
        assert_eq!(grade_creatinine(None, Some(2.0), None), None);
        assert_eq!(grade_creatinine(None, Some(2.0), Some(0.0)), None);
    }

    #[test]
    fn normal_values_are_ungraded() {
        assert_eq!(grade_creatinine(None, Some(1.2), Some(1.2)), None);
        assert_eq!(grade_creatinine(None, Some(7.3), Some(1.2)), Some(Grade::FOUR));
    }
}
