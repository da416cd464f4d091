//! CTCAE grading and dose-modification decision engine.
//!
//! Reference tables come in as borrowed [`react_model`] structures; nothing
//! here reads files or keeps state between runs.

pub mod assess;
pub mod classify;
pub mod creatinine;
pub mod guidance;
pub mod pipeline;
pub mod units;

pub use assess::{AssessorRegistry, DrugAssessor, GradedCytopenia, default_registry};
pub use classify::{GradeClassifier, highest_grade};
pub use creatinine::grade_creatinine;
pub use guidance::{GuidanceResolver, resolve_in, tighter_threshold};
pub use pipeline::{DecisionPipeline, DecisionReport, DecisionRequest, ReportStatus};
pub use units::{CanonicalLabs, NormalizationAudit, NormalizedEntry};
