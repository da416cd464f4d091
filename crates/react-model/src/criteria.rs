//! CTCAE grading criteria as typed records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{LabParameter, Toxicity};
use crate::error::{ModelError, Result};
use crate::grade::Grade;

/// Numeric band for one lab parameter within a grade.
///
/// `min` is inclusive and `max` exclusive, so adjacent grades share an edge
/// and every value falls in at most one band. Either bound may be absent.
/// When `below_lln` is set the band only applies to values strictly below the
/// parameter's LLN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabBound {
    pub parameter: LabParameter,
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(default)]
    pub below_lln: bool,
}

impl LabBound {
    pub fn new(parameter: LabParameter, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            parameter,
            min,
            max,
            below_lln: false,
        }
    }

    #[must_use]
    pub fn below_lln(mut self) -> Self {
        self.below_lln = true;
        self
    }

    /// Checks only the numeric band `[min, max)`, ignoring LLN gating.
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value < max)
    }
}

/// All lab bounds that must hold for one (toxicity, grade) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingCriterion {
    pub toxicity: Toxicity,
    pub grade: Grade,
    pub bounds: Vec<LabBound>,
}

/// Criteria for every toxicity, indexed by toxicity then grade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriteriaSet {
    criteria: BTreeMap<Toxicity, BTreeMap<Grade, GradingCriterion>>,
}

impl CriteriaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one lab bound to the criterion for `(toxicity, grade)`.
    ///
    /// Rejects bounds on a parameter the toxicity is not graded on, empty or
    /// inverted ranges, and a second bound for the same parameter in the same
    /// grade.
    pub fn insert(&mut self, toxicity: Toxicity, grade: Grade, bound: LabBound) -> Result<()> {
        if bound.parameter != toxicity.parameter() {
            return Err(ModelError::ParameterMismatch {
                toxicity,
                expected: toxicity.parameter(),
                parameter: bound.parameter,
            });
        }
        if let (Some(min), Some(max)) = (bound.min, bound.max)
            && min >= max
        {
            return Err(ModelError::InvalidRange {
                toxicity,
                grade,
                parameter: bound.parameter,
                min,
                max,
            });
        }

        let criterion = self
            .criteria
            .entry(toxicity)
            .or_default()
            .entry(grade)
            .or_insert_with(|| GradingCriterion {
                toxicity,
                grade,
                bounds: Vec::new(),
            });
        if criterion
            .bounds
            .iter()
            .any(|existing| existing.parameter == bound.parameter)
        {
            return Err(ModelError::DuplicateCriterion {
                toxicity,
                grade,
                parameter: bound.parameter,
            });
        }
        criterion.bounds.push(bound);
        Ok(())
    }

    /// Criteria registered for a toxicity, in ascending grade order.
    pub fn for_toxicity(&self, toxicity: Toxicity) -> impl Iterator<Item = &GradingCriterion> {
        self.criteria
            .get(&toxicity)
            .into_iter()
            .flat_map(|grades| grades.values())
    }

    pub fn toxicities(&self) -> impl Iterator<Item = Toxicity> + '_ {
        self.criteria.keys().copied()
    }

    /// Number of (toxicity, grade) criteria.
    pub fn len(&self) -> usize {
        self.criteria.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_half_open_and_optional() {
        let bound = LabBound::new(LabParameter::Platelet, Some(50_000.0), Some(75_000.0));
        assert!(bound.contains(50_000.0));
        assert!(bound.contains(74_999.0));
        assert!(bound.contains(74_999.5));
        assert!(!bound.contains(75_000.0));
        assert!(!bound.contains(49_999.9));
        assert!(LabBound::new(LabParameter::Platelet, None, None).contains(-1.0));
    }

    #[test]
    fn adjacent_bands_share_an_edge() {
        let grade_two = LabBound::new(LabParameter::Hemoglobin, Some(8.0), Some(10.0));
        let grade_three = LabBound::new(LabParameter::Hemoglobin, Some(0.0), Some(8.0));
        for value in [7.9995, 8.0, 9.9995] {
            assert!(
                grade_two.contains(value) ^ grade_three.contains(value),
                "{value} must fall in exactly one band"
            );
        }
    }

    #[test]
    fn rejects_parameter_of_another_toxicity() {
        let mut set = CriteriaSet::new();
        let err = set
            .insert(
                Toxicity::Anemia,
                Grade::TWO,
                LabBound::new(LabParameter::Platelet, Some(1.0), None),
            )
            .unwrap_err();
        assert!(matches!(err, ModelError::ParameterMismatch { .. }));
    }

    #[test]
    fn rejects_inverted_and_duplicate_ranges() {
        let mut set = CriteriaSet::new();
        let inverted = LabBound::new(LabParameter::Hemoglobin, Some(9.0), Some(8.0));
        assert!(matches!(
            set.insert(Toxicity::Anemia, Grade::TWO, inverted),
            Err(ModelError::InvalidRange { .. })
        ));
        let empty = LabBound::new(LabParameter::Hemoglobin, Some(8.0), Some(8.0));
        assert!(matches!(
            set.insert(Toxicity::Anemia, Grade::TWO, empty),
            Err(ModelError::InvalidRange { .. })
        ));

        let bound = LabBound::new(LabParameter::Hemoglobin, Some(8.0), Some(10.0));
        set.insert(Toxicity::Anemia, Grade::TWO, bound.clone())
            .unwrap();
        assert!(matches!(
            set.insert(Toxicity::Anemia, Grade::TWO, bound),
            Err(ModelError::DuplicateCriterion { .. })
        ));
        assert_eq!(set.len(), 1);
    }
}
