//! Numeric properties of the grading engine.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use proptest::prelude::*;
use react_core::units::{display, normalize};
use react_core::{GradeClassifier, resolve_in};
use react_model::{
    ConditionLabel, CriteriaSet, Grade, IssueGuidance, LabParameter, Toxicity, UnitMode,
};
use react_standards::StandardsRegistry;

static CRITERIA: LazyLock<CriteriaSet> = LazyLock::new(|| {
    let (registry, _) = StandardsRegistry::load_default().expect("load bundled standards");
    registry.criteria
});

fn grade_number(grade: Option<Grade>) -> u8 {
    grade.map_or(0, Grade::number)
}

fn hematology_grade(
    toxicity: Toxicity,
    value: f64,
    lln: &BTreeMap<LabParameter, f64>,
) -> Option<Grade> {
    GradeClassifier::new(&CRITERIA).classify(toxicity, value, lln)
}

#[test]
fn values_just_below_a_cutoff_take_the_lower_band() {
    let hgb = |lln: f64| BTreeMap::from([(LabParameter::Hemoglobin, lln)]);
    assert_eq!(
        hematology_grade(Toxicity::Anemia, 8.0, &hgb(10.0)),
        Some(Grade::TWO)
    );
    assert_eq!(
        hematology_grade(Toxicity::Anemia, 7.9995, &hgb(10.0)),
        Some(Grade::THREE)
    );
    assert_eq!(
        hematology_grade(Toxicity::Anemia, 9.9995, &hgb(12.0)),
        Some(Grade::TWO)
    );

    let plt = BTreeMap::from([(LabParameter::Platelet, 150_000.0)]);
    assert_eq!(
        hematology_grade(Toxicity::Thrombocytopenia, 74_999.5, &plt),
        Some(Grade::TWO)
    );
    assert_eq!(
        hematology_grade(Toxicity::Thrombocytopenia, 24_999.5, &plt),
        Some(Grade::FOUR)
    );
    assert_eq!(
        hematology_grade(Toxicity::Neutropenia, 999.9, &BTreeMap::new()),
        Some(Grade::THREE)
    );
    assert_eq!(
        hematology_grade(Toxicity::Leukopenia, 1_999.99, &BTreeMap::new()),
        Some(Grade::THREE)
    );
}

/// Every value below the Grade 1 cut-off gets some grade.
fn assert_banded_below(
    toxicity: Toxicity,
    value: f64,
    cutoff: f64,
) -> Result<(), TestCaseError> {
    if value < cutoff {
        prop_assert!(
            hematology_grade(toxicity, value, &BTreeMap::new()).is_some(),
            "{toxicity} {value} is ungraded"
        );
    }
    Ok(())
}

proptest! {
    /// Lower counts never grade milder than higher counts.
    #[test]
    fn platelet_grades_are_monotonic(
        a in 0.0f64..300_000.0,
        b in 0.0f64..300_000.0,
        lln in 75_000.0f64..300_000.0,
    ) {
        let lln = BTreeMap::from([(LabParameter::Platelet, lln)]);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_grade = hematology_grade(Toxicity::Thrombocytopenia, low, &lln);
        let high_grade = hematology_grade(Toxicity::Thrombocytopenia, high, &lln);
        prop_assert!(
            grade_number(low_grade) >= grade_number(high_grade),
            "{} graded {:?} but {} graded {:?}",
            low, low_grade, high, high_grade
        );
    }

    #[test]
    fn hemoglobin_grades_are_monotonic(
        a in 0.0f64..16.0,
        b in 0.0f64..16.0,
        lln in 10.0f64..16.0,
    ) {
        let lln = BTreeMap::from([(LabParameter::Hemoglobin, lln)]);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_grade = hematology_grade(Toxicity::Anemia, low, &lln);
        let high_grade = hematology_grade(Toxicity::Anemia, high, &lln);
        prop_assert!(
            grade_number(low_grade) >= grade_number(high_grade),
            "{} graded {:?} but {} graded {:?}",
            low, low_grade, high, high_grade
        );
    }

    #[test]
    fn counts_below_grade_two_cutoff_are_always_graded(value in 0.0f64..75_000.0) {
        assert_banded_below(Toxicity::Thrombocytopenia, value, 75_000.0)?;
        assert_banded_below(Toxicity::Leukopenia, value, 3_000.0)?;
        assert_banded_below(Toxicity::Neutropenia, value, 1_500.0)?;
        assert_banded_below(Toxicity::Anemia, value / 7_500.0, 10.0)?;
    }

    /// The Grade 1 band is only reachable below the LLN.
    #[test]
    fn grade_one_requires_value_below_lln(
        value in 75_000u32..300_000,
        lln in 75_000u32..300_000,
    ) {
        let classifier = GradeClassifier::new(&CRITERIA);
        let limits = BTreeMap::from([(LabParameter::Platelet, f64::from(lln))]);
        let grade = classifier.classify(Toxicity::Thrombocytopenia, f64::from(value), &limits);
        if value < lln {
            prop_assert_eq!(grade, Some(Grade::ONE));
        } else {
            prop_assert_eq!(grade, None);
        }
        prop_assert_eq!(
            classifier.classify(Toxicity::Thrombocytopenia, f64::from(value), &BTreeMap::new()),
            None
        );
    }

    #[test]
    fn unit_conversion_round_trips(value in 0.0f64..1_000_000.0) {
        for mode in [UnitMode::KiloPerMicroliter, UnitMode::PerMicroliter] {
            let canonical = normalize(Some(value), mode).expect("value present");
            let back = display(canonical, mode);
            prop_assert!((back - value).abs() <= value.abs() * 1e-6 + f64::EPSILON);
        }
    }

    /// With only `≥` keys, the largest threshold not above the query wins.
    #[test]
    fn fallback_picks_tightest_admitting_threshold(
        thresholds in proptest::collection::btree_set(1u8..=4, 1..=4),
        query in 1u8..=4,
    ) {
        let entries: IssueGuidance = thresholds
            .iter()
            .map(|t| (ConditionLabel::new(format!("Grade ≥ {t}")), t.to_string()))
            .collect();
        let expected = thresholds.iter().copied().filter(|t| *t <= query).max();
        let resolved = resolve_in(&entries, &ConditionLabel::new(format!("Grade {query}")));
        prop_assert_eq!(resolved.cloned(), expected.map(|t| t.to_string()));
    }
}
