use std::fs;
use std::path::{Path, PathBuf};

use react_model::{Drug, IssueType, ModelError, Toxicity};
use react_standards::hash::sha256_hex;
use react_standards::{StandardsError, StandardsRegistry, standards_root};

fn unique_temp_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "react-standards-{}-{}-{}",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    dir
}

fn write(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

const CRITERIA: &str = r#""Toxicity","Grade","Parameter","Min","Max","Below LLN"
"Anemia","Grade 1","Hemoglobin","10.0","","Yes"
"Anemia","Grade 2","Hemoglobin","8.0","10.0","No"
"#;

const MODIFICATIONS: &str = r#""Drug","Issue Type","Condition","Guidance"
"PLUVICTO","Fatigue","Grade ≥ 3","Withhold."
"#;

/// Writes a two-file snapshot and a manifest pinning the given hashes.
fn write_snapshot(dir: &Path, criteria: &str, modifications: &str, pinned: Option<&str>) {
    write(&dir.join("ctcae/v5_0/Criteria.csv"), criteria.as_bytes());
    write(
        &dir.join("labels/v1/DoseModifications.csv"),
        modifications.as_bytes(),
    );
    let criteria_sha = pinned.map_or_else(|| sha256_hex(criteria.as_bytes()), str::to_string);
    let manifest = format!(
        r#"[manifest]
schema = "react.standards-manifest"
schema_version = 1

[pins]
ctcae = "v5_0"
labels = "v1"

[[files]]
path = "ctcae/v5_0/Criteria.csv"
sha256 = "{criteria_sha}"
kind = "csv"
role = "ctcae_criteria"

[[files]]
path = "labels/v1/DoseModifications.csv"
sha256 = "{}"
kind = "csv"
role = "dose_modifications"
"#,
        sha256_hex(modifications.as_bytes()),
    );
    write(&dir.join("manifest.toml"), manifest.as_bytes());
}

#[test]
fn bundled_reference_data_verifies() {
    let (registry, summary) =
        StandardsRegistry::verify_and_load(&standards_root()).expect("bundled standards load");

    assert_eq!(summary.file_count, 2);
    assert_eq!(summary.toxicity_count, 4);
    assert_eq!(summary.drug_count, 2);
    assert_eq!(
        registry
            .criteria
            .for_toxicity(Toxicity::Thrombocytopenia)
            .count(),
        4
    );

    let thrombo = registry
        .modifications
        .guidance_for(Drug::Lutathera, IssueType::Thrombocytopenia)
        .expect("LUTATHERA thrombocytopenia guidance");
    assert!(thrombo.contains_key("Grade 3"));
    assert!(thrombo.contains_key("Recurrent Grade ≥ 2"));

    let myelo = registry
        .modifications
        .guidance_for(Drug::Pluvicto, IssueType::Myelosuppression)
        .expect("PLUVICTO myelosuppression guidance");
    assert!(myelo.contains_key("Grade ≥ 3"));
}

#[test]
fn minimal_snapshot_loads() {
    let dir = unique_temp_dir("minimal");
    write_snapshot(&dir, CRITERIA, MODIFICATIONS, None);

    let (registry, summary) = StandardsRegistry::verify_and_load(&dir).expect("load");
    assert_eq!(summary.criteria_count, 2);
    assert_eq!(summary.guidance_count, 1);
    let anemia: Vec<_> = registry.criteria.for_toxicity(Toxicity::Anemia).collect();
    assert!(anemia[0].bounds[0].below_lln);
    assert_eq!(anemia[1].bounds[0].max, Some(10.0));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn tampered_file_fails_hash_check() {
    let dir = unique_temp_dir("tampered");
    write_snapshot(&dir, CRITERIA, MODIFICATIONS, Some(&"0".repeat(64)));

    let err = StandardsRegistry::verify_and_load(&dir).unwrap_err();
    assert!(
        matches!(
            err,
            StandardsError::Sha256Mismatch { ref expected, .. } if expected == &"0".repeat(64)
        ),
        "unexpected error: {err}"
    );

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn unlisted_file_is_rejected() {
    let dir = unique_temp_dir("unlisted");
    write_snapshot(&dir, CRITERIA, MODIFICATIONS, None);
    write(&dir.join("labels/v1/notes.txt"), b"scratch");

    let err = StandardsRegistry::verify_and_load(&dir).unwrap_err();
    assert!(matches!(err, StandardsError::UnexpectedFile { .. }));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_issue_type_is_rejected_at_load() {
    let dir = unique_temp_dir("issue-type");
    let modifications = r#""Drug","Issue Type","Condition","Guidance"
"PLUVICTO","Fatigue","Grade ≥ 3","Withhold."
"PLUVICTO","Alopecia","Grade 2","Withhold."
"#;
    write_snapshot(&dir, CRITERIA, modifications, None);

    let err = StandardsRegistry::verify_and_load(&dir).unwrap_err();
    match err {
        StandardsError::Model { row, source, .. } => {
            assert_eq!(row, 2);
            assert!(matches!(source, ModelError::UnknownIssueType(ref s) if s == "Alopecia"));
        }
        other => panic!("unexpected error: {other}"),
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn inverted_range_is_rejected_at_load() {
    let dir = unique_temp_dir("inverted");
    let criteria = r#""Toxicity","Grade","Parameter","Min","Max","Below LLN"
"Anemia","Grade 2","Hemoglobin","10.0","8.0","No"
"#;
    write_snapshot(&dir, criteria, MODIFICATIONS, None);

    let err = StandardsRegistry::verify_and_load(&dir).unwrap_err();
    assert!(matches!(
        err,
        StandardsError::Model {
            source: ModelError::InvalidRange { .. },
            ..
        }
    ));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_role_is_rejected() {
    let dir = unique_temp_dir("missing-role");
    write(&dir.join("ctcae/v5_0/Criteria.csv"), CRITERIA.as_bytes());
    let manifest = format!(
        r#"[manifest]
schema = "react.standards-manifest"
schema_version = 1

[pins]
ctcae = "v5_0"
labels = "v1"

[[files]]
path = "ctcae/v5_0/Criteria.csv"
sha256 = "{}"
kind = "csv"
role = "ctcae_criteria"
"#,
        sha256_hex(CRITERIA.as_bytes())
    );
    write(&dir.join("manifest.toml"), manifest.as_bytes());

    let err = StandardsRegistry::verify_and_load(&dir).unwrap_err();
    assert!(matches!(
        err,
        StandardsError::MissingRole { ref role } if role == "dose_modifications"
    ));

    fs::remove_dir_all(&dir).ok();
}
