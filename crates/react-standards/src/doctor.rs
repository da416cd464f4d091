#![deny(unsafe_code)]

use crate::manifest::{ManifestFile, Pins};
use crate::registry::VerifySummary;

/// Machine-readable description of a verified reference snapshot.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorReport {
    pub schema: String,
    pub schema_version: u32,
    pub pins: Pins,
    pub files: Vec<ManifestFile>,
    pub counts: DoctorCounts,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DoctorCounts {
    pub files: usize,
    pub criteria: usize,
    pub toxicities: usize,
    pub guidance_rows: usize,
    pub drugs: usize,
}

impl DoctorReport {
    pub fn from_verify_summary(summary: &VerifySummary, files: Vec<ManifestFile>) -> Self {
        Self {
            schema: "react.standards-doctor".to_string(),
            schema_version: 1,
            pins: summary.manifest_pins.clone(),
            files,
            counts: DoctorCounts {
                files: summary.file_count,
                criteria: summary.criteria_count,
                toxicities: summary.toxicity_count,
                guidance_rows: summary.guidance_count,
                drugs: summary.drug_count,
            },
        }
    }
}
