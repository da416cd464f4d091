//! CTCAE severity grade.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::label::ConditionLabel;

/// CTCAE grade 1 through 4.
///
/// Grades are ordered: comparing two grades compares severity, never the
/// order in which they appear in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const ONE: Grade = Grade(1);
    pub const TWO: Grade = Grade(2);
    pub const THREE: Grade = Grade(3);
    pub const FOUR: Grade = Grade(4);

    pub const ALL: [Grade; 4] = [Grade::ONE, Grade::TWO, Grade::THREE, Grade::FOUR];

    /// Returns the grade for `n`, or `None` outside 1..=4.
    pub fn new(n: u8) -> Option<Self> {
        (1..=4).contains(&n).then_some(Grade(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Exact condition label for this grade (`"Grade N"`).
    pub fn label(self) -> ConditionLabel {
        ConditionLabel::new(self.to_string())
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grade {}", self.0)
    }
}

impl TryFrom<u8> for Grade {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Grade::new(value).ok_or_else(|| ModelError::InvalidGrade(value.to_string()))
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl FromStr for Grade {
    type Err = ModelError;

    /// Parses `"Grade 3"` or a bare `"3"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("Grade")
            .or_else(|| trimmed.strip_prefix("grade"))
            .unwrap_or(trimmed)
            .trim();
        digits
            .parse::<u8>()
            .ok()
            .and_then(Grade::new)
            .ok_or_else(|| ModelError::InvalidGrade(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_outside_range_are_rejected() {
        assert!(Grade::new(0).is_none());
        assert!(Grade::new(5).is_none());
        assert_eq!(Grade::new(3), Some(Grade::THREE));
    }

    #[test]
    fn grades_order_by_severity() {
        assert!(Grade::FOUR > Grade::TWO);
        assert_eq!(Grade::ALL.iter().max(), Some(&Grade::FOUR));
    }

    #[test]
    fn parses_label_and_bare_number() {
        assert_eq!("Grade 2".parse::<Grade>().unwrap(), Grade::TWO);
        assert_eq!("4".parse::<Grade>().unwrap(), Grade::FOUR);
        assert!("Grade 5".parse::<Grade>().is_err());
        assert!("Grade ≥ 3".parse::<Grade>().is_err());
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_string(&Grade::THREE).unwrap();
        assert_eq!(json, "3");
        assert!(serde_json::from_str::<Grade>("7").is_err());
    }
}
