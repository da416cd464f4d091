//! One grading-and-guidance run over a lab panel for a selected drug.

use std::time::Instant;

use react_model::{
    CriteriaSet, DoseModificationTable, Drug, DrugExtras, Guidance, LabPanel, LabParameter,
    ReferenceRanges, ResolvedIssue,
};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::assess::{AssessorRegistry, aggregate, default_registry, hematology};
use crate::classify::GradeClassifier;
use crate::guidance::GuidanceResolver;
use crate::units::{CanonicalLabs, NormalizationAudit};

/// Panel parameters that count as input. Baselines and reference limits only
/// qualify other values.
const INPUT_PARAMETERS: [LabParameter; 9] = [
    LabParameter::Hemoglobin,
    LabParameter::Platelet,
    LabParameter::Wbc,
    LabParameter::Anc,
    LabParameter::Creatinine,
    LabParameter::CreatinineClearance,
    LabParameter::Bilirubin,
    LabParameter::Albumin,
    LabParameter::Inr,
];

/// Everything entered for one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRequest {
    pub panel: LabPanel,
    pub ranges: ReferenceRanges,
    pub extras: DrugExtras,
}

impl DecisionRequest {
    /// A request with default reference ranges for the panel's unit mode.
    pub fn new(panel: LabPanel) -> Self {
        let ranges = ReferenceRanges::defaults(panel.unit_mode());
        Self {
            panel,
            ranges,
            extras: DrugExtras::default(),
        }
    }

    #[must_use]
    pub fn with_ranges(mut self, ranges: ReferenceRanges) -> Self {
        self.ranges = ranges;
        self
    }

    #[must_use]
    pub fn with_extras(mut self, extras: DrugExtras) -> Self {
        self.extras = extras;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Analyzed,
    NoInput,
    UnknownDrug,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionReport {
    pub drug: Option<Drug>,
    pub status: ReportStatus,
    /// Detected issues in reporting order, each with its guidance.
    pub issues: Vec<ResolvedIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<NormalizationAudit>,
    /// Number of guidance lookups performed.
    pub guidance_lookups: usize,
}

impl DecisionReport {
    fn empty(drug: Option<Drug>, status: ReportStatus) -> Self {
        Self {
            drug,
            status,
            issues: Vec::new(),
            diagnostics: Vec::new(),
            normalization: None,
            guidance_lookups: 0,
        }
    }

    pub fn unresolved_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| !issue.guidance.is_resolved())
            .count()
    }
}

/// Grades a panel and resolves guidance against shared reference tables.
///
/// Holds only borrows; one pipeline can serve any number of requests.
#[derive(Clone, Copy)]
pub struct DecisionPipeline<'a> {
    criteria: &'a CriteriaSet,
    modifications: &'a DoseModificationTable,
    assessors: &'a AssessorRegistry,
}

impl<'a> DecisionPipeline<'a> {
    pub fn new(criteria: &'a CriteriaSet, modifications: &'a DoseModificationTable) -> Self {
        Self {
            criteria,
            modifications,
            assessors: default_registry(),
        }
    }

    #[must_use]
    pub fn with_assessors(mut self, assessors: &'a AssessorRegistry) -> Self {
        self.assessors = assessors;
        self
    }

    /// Runs for a drug given by name; unknown names produce an empty report.
    pub fn run_for(&self, drug_id: &str, request: &DecisionRequest) -> DecisionReport {
        match drug_id.parse::<Drug>() {
            Ok(drug) => self.run(drug, request),
            Err(err) => {
                warn!(drug_id, "unrecognized drug");
                let mut report = DecisionReport::empty(None, ReportStatus::UnknownDrug);
                report.diagnostics.push(err.to_string());
                report
            }
        }
    }

    pub fn run(&self, drug: Drug, request: &DecisionRequest) -> DecisionReport {
        let span = info_span!("decision", drug = %drug);
        let _guard = span.enter();
        let start = Instant::now();

        let Some(assessor) = self.assessors.get(drug) else {
            warn!("no assessor registered");
            let mut report = DecisionReport::empty(Some(drug), ReportStatus::UnknownDrug);
            report
                .diagnostics
                .push(format!("no assessment rules registered for {drug}"));
            return report;
        };

        let labs = CanonicalLabs::from_inputs(&request.panel, &request.ranges);
        if !labs.has_any(&INPUT_PARAMETERS) && !assessor.has_extra_input(&request.extras) {
            info!("no input to analyze");
            return DecisionReport::empty(Some(drug), ReportStatus::NoInput);
        }

        let classifier = GradeClassifier::new(self.criteria);
        let graded = hematology::grade_cytopenias(&classifier, &labs);
        let detected = aggregate(assessor, &labs, &request.extras, &graded);

        let resolver = GuidanceResolver::new(self.modifications);
        let mut report = DecisionReport::empty(Some(drug), ReportStatus::Analyzed);
        if !resolver.has_drug(drug) {
            warn!("drug missing from dose-modification table");
            report
                .diagnostics
                .push(format!("no dose-modification guidance on file for {drug}"));
        }

        report.issues = detected
            .into_iter()
            .map(|issue| {
                let guidance =
                    Guidance::from(resolver.resolve(drug, issue.issue_type, &issue.condition));
                ResolvedIssue { issue, guidance }
            })
            .collect();
        report.guidance_lookups = report.issues.len();
        report.normalization = Some(NormalizationAudit::from_labs(&labs));

        info!(
            issues = report.issues.len(),
            unresolved = report.unresolved_count(),
            duration_ms = start.elapsed().as_millis(),
            "analysis complete"
        );
        report
    }
}
