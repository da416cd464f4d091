pub mod criteria;
pub mod enums;
pub mod error;
pub mod extras;
pub mod grade;
pub mod issue;
pub mod lab;
pub mod label;
pub mod modification;

pub use criteria::{CriteriaSet, GradingCriterion, LabBound};
pub use enums::{Drug, IssueType, LabParameter, Toxicity, UnitMode};
pub use error::{ModelError, Result};
pub use extras::DrugExtras;
pub use grade::Grade;
pub use issue::{DetectedIssue, Guidance, ResolvedIssue, SupportingDatum};
pub use lab::{LabPanel, LabPanelBuilder, ReferenceRanges, parse_numeric};
pub use label::{ConditionLabel, GradeThreshold, ThresholdOperator};
pub use modification::{DoseModificationTable, IssueGuidance};
