use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use react_cli::input::PanelEntries;
use react_cli::render::{
    render_guidance_csv, render_guidance_json, render_guidance_table, render_standards_json,
};
use react_core::{DecisionPipeline, DecisionReport, default_registry};
use react_model::{Drug, DrugExtras, IssueGuidance, IssueType, LabParameter, parse_numeric};
use react_standards::{DoctorReport, StandardsRegistry, standards_root};
use tracing::{debug, info, info_span};

use crate::cli::{AssessArgs, ExtraArgs, GuidanceArgs, ListFormatArg, StandardsArgs};

pub enum AssessOutcome {
    /// The run was refused because the disclaimer was not acknowledged.
    NotAcknowledged,
    Report(DecisionReport),
}

pub fn run_assess(args: &AssessArgs) -> Result<AssessOutcome> {
    if !args.acknowledge {
        return Ok(AssessOutcome::NotAcknowledged);
    }
    let registry = load_registry(&args.standards)?;

    let entries = panel_entries(args)?;
    let request = entries
        .into_request(!args.limits.no_default_limits)
        .with_extras(drug_extras(&args.extras));

    let pipeline = DecisionPipeline::new(&registry.criteria, &registry.modifications);
    let report = pipeline.run_for(&args.drug, &request);
    debug!(
        status = ?report.status,
        lookups = report.guidance_lookups,
        "assessment finished"
    );
    Ok(AssessOutcome::Report(report))
}

/// Verifies the reference data and lists the drugs with assessment rules.
pub fn run_standards(args: &StandardsArgs) -> Result<String> {
    let dir = standards_dir(args);
    let (registry, summary) = StandardsRegistry::verify_and_load(&dir)
        .with_context(|| format!("verify reference data in {}", dir.display()))?;
    let doctor = DoctorReport::from_verify_summary(&summary, registry.files);
    render_standards_json(&doctor, default_registry())
}

pub fn run_guidance(args: &GuidanceArgs) -> Result<String> {
    let drug = args
        .drug
        .parse::<Drug>()
        .map_err(|err| anyhow!("{err}"))?;
    let registry = load_registry(&args.standards)?;
    let mut table: BTreeMap<IssueType, IssueGuidance> = registry
        .modifications
        .drug(drug)
        .cloned()
        .ok_or_else(|| anyhow!("no dose-modification guidance on file for {drug}"))?;
    if let Some(issue) = &args.issue {
        let issue_type = issue
            .parse::<IssueType>()
            .map_err(|err| anyhow!("{err}"))?;
        table.retain(|key, _| *key == issue_type);
    }
    match args.format {
        ListFormatArg::Table => Ok(render_guidance_table(&table)),
        ListFormatArg::Json => render_guidance_json(&table),
        ListFormatArg::Csv => render_guidance_csv(&table),
    }
}

fn standards_dir(args: &StandardsArgs) -> PathBuf {
    args.standards_dir.clone().unwrap_or_else(standards_root)
}

fn load_registry(args: &StandardsArgs) -> Result<StandardsRegistry> {
    let dir = standards_dir(args);
    let span = info_span!("load_standards", dir = %dir.display());
    let _guard = span.enter();
    let start = Instant::now();
    let (registry, summary) = StandardsRegistry::verify_and_load(&dir)
        .with_context(|| format!("load reference data from {}", dir.display()))?;
    info!(
        criteria = summary.criteria_count,
        guidance = summary.guidance_count,
        duration_ms = start.elapsed().as_millis(),
        "reference data loaded"
    );
    Ok(registry)
}

fn panel_entries(args: &AssessArgs) -> Result<PanelEntries> {
    let mut entries = match &args.input {
        Some(path) => PanelEntries::from_csv_path(path)?,
        None => PanelEntries::default(),
    };
    if let Some(units) = args.units {
        entries.unit_mode = Some(units);
    }

    let labs = &args.labs;
    for (parameter, text) in [
        (LabParameter::Hemoglobin, &labs.hemoglobin),
        (LabParameter::Platelet, &labs.platelet),
        (LabParameter::Wbc, &labs.wbc),
        (LabParameter::Anc, &labs.anc),
        (LabParameter::BaselineCreatinine, &labs.baseline_creatinine),
        (LabParameter::Creatinine, &labs.creatinine),
        (LabParameter::BaselineCreatinineClearance, &labs.baseline_clcr),
        (LabParameter::CreatinineClearance, &labs.clcr),
        (LabParameter::Bilirubin, &labs.bilirubin),
        (LabParameter::Albumin, &labs.albumin),
        (LabParameter::Inr, &labs.inr),
    ] {
        entries.set_value(parameter, text.as_deref());
    }

    let limits = &args.limits;
    for (parameter, text) in [
        (LabParameter::Hemoglobin, &limits.lln_hemoglobin),
        (LabParameter::Platelet, &limits.lln_platelet),
        (LabParameter::Wbc, &limits.lln_wbc),
        (LabParameter::Anc, &limits.lln_anc),
    ] {
        entries.set_lln(parameter, text.as_deref());
    }
    entries.set_uln(LabParameter::Creatinine, limits.uln_creatinine.as_deref());
    entries.set_uln(LabParameter::Bilirubin, limits.uln_bilirubin.as_deref());
    Ok(entries)
}

fn drug_extras(args: &ExtraArgs) -> DrugExtras {
    DrugExtras {
        dry_mouth_grade: args.dry_mouth,
        fatigue_grade: args.fatigue,
        gi_grade: args.gi,
        gi_amenable: !args.gi_not_amenable,
        electrolyte_grade: args.electrolyte,
        delay_weeks: args.delay_weeks.as_deref().and_then(parse_numeric),
    }
}
