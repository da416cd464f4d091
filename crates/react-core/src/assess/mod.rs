//! Drug-specific issue detection.
//!
//! Each supported drug implements [`DrugAssessor`]; [`aggregate`] runs an
//! assessor's stages in a fixed order so every drug reports issues the same
//! way:
//!
//! 1. individual cytopenias
//! 2. renal triggers
//! 3. hepatic triggers
//! 4. drug-specific assessments (dry mouth, fatigue, ...)
//! 5. timing triggers
//! 6. the composite hematology issue
//!
//! Assessors are looked up through an [`AssessorRegistry`]; the default one is
//! built once and shared.

pub mod hematology;
pub mod hepatic;
pub mod lutathera;
pub mod pluvicto;
pub mod renal;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use react_model::{DetectedIssue, Drug, DrugExtras};
use tracing::debug;

use crate::units::CanonicalLabs;

pub use hematology::GradedCytopenia;
pub use lutathera::LutatheraAssessor;
pub use pluvicto::PluvictoAssessor;

/// Label-specific rules for one drug.
pub trait DrugAssessor: Send + Sync {
    fn drug(&self) -> Drug;

    fn description(&self) -> &'static str {
        "Drug assessor"
    }

    /// Whether the drug-specific assessments count as input on their own.
    fn has_extra_input(&self, extras: &DrugExtras) -> bool;

    /// Cytopenias reported as their own issues.
    fn individual_cytopenias(&self, _graded: &[GradedCytopenia]) -> Vec<DetectedIssue> {
        Vec::new()
    }

    fn renal(&self, labs: &CanonicalLabs) -> Vec<DetectedIssue>;

    fn hepatic(&self, labs: &CanonicalLabs) -> Vec<DetectedIssue> {
        hepatic::hepatic_issues(labs)
    }

    /// Non-laboratory assessments entered alongside the panel.
    fn extras(&self, _extras: &DrugExtras) -> Vec<DetectedIssue> {
        Vec::new()
    }

    fn timing(&self, extras: &DrugExtras) -> Vec<DetectedIssue>;

    /// A single issue grouping all graded cytopenias.
    fn composite(&self, _graded: &[GradedCytopenia]) -> Option<DetectedIssue> {
        None
    }
}

/// Runs every stage of `assessor` and concatenates the issues in order.
pub fn aggregate(
    assessor: &dyn DrugAssessor,
    labs: &CanonicalLabs,
    extras: &DrugExtras,
    graded: &[GradedCytopenia],
) -> Vec<DetectedIssue> {
    let mut issues = assessor.individual_cytopenias(graded);
    issues.extend(assessor.renal(labs));
    issues.extend(assessor.hepatic(labs));
    issues.extend(assessor.extras(extras));
    issues.extend(assessor.timing(extras));
    issues.extend(assessor.composite(graded));
    debug!(drug = %assessor.drug(), count = issues.len(), "issues aggregated");
    issues
}

/// Assessors indexed by drug.
pub struct AssessorRegistry {
    assessors: BTreeMap<Drug, Box<dyn DrugAssessor>>,
}

impl AssessorRegistry {
    pub fn new() -> Self {
        Self {
            assessors: BTreeMap::new(),
        }
    }

    /// Registers an assessor, replacing any existing one for the same drug.
    pub fn register(&mut self, assessor: Box<dyn DrugAssessor>) {
        self.assessors.insert(assessor.drug(), assessor);
    }

    pub fn get(&self, drug: Drug) -> Option<&dyn DrugAssessor> {
        self.assessors.get(&drug).map(|a| a.as_ref())
    }

    pub fn drugs(&self) -> impl Iterator<Item = Drug> + '_ {
        self.assessors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.assessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessors.is_empty()
    }
}

impl Default for AssessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_REGISTRY: OnceLock<AssessorRegistry> = OnceLock::new();

/// Registry with an assessor for every [`Drug`].
pub fn default_registry() -> &'static AssessorRegistry {
    DEFAULT_REGISTRY.get_or_init(build_default_registry)
}

fn build_default_registry() -> AssessorRegistry {
    let mut registry = AssessorRegistry::new();
    registry.register(Box::new(LutatheraAssessor));
    registry.register(Box::new(PluvictoAssessor));
    registry
}
