use thiserror::Error;

use crate::enums::{Drug, IssueType, LabParameter, Toxicity};
use crate::grade::Grade;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("invalid grade: {0}")]
    InvalidGrade(String),

    #[error("unknown drug: {0}")]
    UnknownDrug(String),

    #[error("unknown lab parameter: {0}")]
    UnknownParameter(String),

    #[error("unknown toxicity: {0}")]
    UnknownToxicity(String),

    #[error("unknown issue type: {0}")]
    UnknownIssueType(String),

    #[error("unknown unit mode: {0}")]
    UnknownUnitMode(String),

    #[error("{toxicity} is graded on {expected}, not {parameter}")]
    ParameterMismatch {
        toxicity: Toxicity,
        expected: LabParameter,
        parameter: LabParameter,
    },

    #[error("invalid range for {toxicity} {grade} ({parameter}): min {min} is not below max {max}")]
    InvalidRange {
        toxicity: Toxicity,
        grade: Grade,
        parameter: LabParameter,
        min: f64,
        max: f64,
    },

    #[error("duplicate criterion for {toxicity} {grade} ({parameter})")]
    DuplicateCriterion {
        toxicity: Toxicity,
        grade: Grade,
        parameter: LabParameter,
    },

    #[error("duplicate guidance for {drug} / {issue_type} / {condition}")]
    DuplicateGuidance {
        drug: Drug,
        issue_type: IssueType,
        condition: String,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
