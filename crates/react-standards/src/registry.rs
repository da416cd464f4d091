#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use react_model::{CriteriaSet, DoseModificationTable};
use tracing::{debug, info};

use crate::error::StandardsError;
use crate::hash::sha256_hex;
use crate::manifest::{Manifest, ManifestFile, Pins};
use crate::paths::standards_root;
use crate::tables::{parse_criteria_csv, parse_dose_modifications_csv};

const MANIFEST_SCHEMA: &str = "react.standards-manifest";

const ROLE_CRITERIA: &str = "ctcae_criteria";
const ROLE_DOSE_MODIFICATIONS: &str = "dose_modifications";

const REQUIRED_ROLES: &[&str] = &[ROLE_CRITERIA, ROLE_DOSE_MODIFICATIONS];

const ALLOWED_KINDS: &[&str] = &["csv", "toml", "other"];

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifySummary {
    pub standards_dir: PathBuf,
    pub manifest_pins: Pins,
    pub file_count: usize,
    pub criteria_count: usize,
    pub toxicity_count: usize,
    pub guidance_count: usize,
    pub drug_count: usize,
}

/// Verified, fully parsed reference data.
///
/// Built once before any grading happens and only read afterwards.
#[derive(Debug, Clone)]
pub struct StandardsRegistry {
    pub manifest: Manifest,
    pub files: Vec<ManifestFile>,
    pub criteria: CriteriaSet,
    pub modifications: DoseModificationTable,
}

impl StandardsRegistry {
    /// Checks the manifest and every pinned hash, then parses the tables.
    pub fn verify_and_load(standards_dir: &Path) -> Result<(Self, VerifySummary), StandardsError> {
        let manifest = load_manifest(&standards_dir.join("manifest.toml"))?;

        validate_manifest(&manifest, standards_dir)?;

        let mut files = manifest.files.clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        for file in &files {
            verify_file(standards_dir, file)?;
        }

        let criteria =
            parse_criteria_csv(&resolve_role_path(standards_dir, &files, ROLE_CRITERIA)?)?;
        let modifications = parse_dose_modifications_csv(&resolve_role_path(
            standards_dir,
            &files,
            ROLE_DOSE_MODIFICATIONS,
        )?)?;

        let summary = VerifySummary {
            standards_dir: standards_dir.to_path_buf(),
            manifest_pins: manifest.pins.clone(),
            file_count: files.len(),
            criteria_count: criteria.len(),
            toxicity_count: criteria.toxicities().count(),
            guidance_count: modifications.len(),
            drug_count: modifications.drugs().count(),
        };

        info!(
            standards_dir = %standards_dir.display(),
            ctcae = %summary.manifest_pins.ctcae,
            labels = %summary.manifest_pins.labels,
            criteria = summary.criteria_count,
            guidance = summary.guidance_count,
            "reference data verified"
        );

        Ok((
            Self {
                manifest,
                files,
                criteria,
                modifications,
            },
            summary,
        ))
    }

    /// Loads from [`standards_root`].
    pub fn load_default() -> Result<(Self, VerifySummary), StandardsError> {
        Self::verify_and_load(&standards_root())
    }
}

fn load_manifest(path: &Path) -> Result<Manifest, StandardsError> {
    let contents = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| StandardsError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest, standards_dir: &Path) -> Result<(), StandardsError> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(StandardsError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != 1 {
        return Err(StandardsError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }

    let mut roles: BTreeSet<&str> = BTreeSet::new();
    let mut manifest_paths: BTreeSet<PathBuf> = BTreeSet::new();

    for file in &manifest.files {
        if !roles.insert(file.role.as_str()) {
            return Err(StandardsError::DuplicateRole {
                role: file.role.clone(),
            });
        }

        if !ALLOWED_KINDS.contains(&file.kind.as_str()) {
            return Err(StandardsError::InvalidManifest {
                message: format!("unsupported kind '{}' for {}", file.kind, file.path),
            });
        }

        validate_sha(&file.sha256, &file.path)?;

        let path = validate_path(&file.path)?;
        manifest_paths.insert(normalize_path(&path));
    }

    for role in REQUIRED_ROLES {
        if !roles.contains(role) {
            return Err(StandardsError::MissingRole {
                role: (*role).to_string(),
            });
        }
    }

    for path in list_files_under(standards_dir)? {
        if path == Path::new("manifest.toml") {
            continue;
        }
        if !manifest_paths.contains(&normalize_path(&path)) {
            return Err(StandardsError::UnexpectedFile {
                path: standards_dir.join(path),
            });
        }
    }

    Ok(())
}

fn verify_file(standards_dir: &Path, file: &ManifestFile) -> Result<(), StandardsError> {
    let full_path = standards_dir.join(&file.path);
    let bytes = std::fs::read(&full_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StandardsError::MissingFile {
                path: full_path.clone(),
            }
        } else {
            StandardsError::io(full_path.clone(), e)
        }
    })?;

    let actual = sha256_hex(&bytes);
    let expected = file.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(StandardsError::Sha256Mismatch {
            path: full_path,
            expected,
            actual,
        });
    }
    debug!(path = %file.path, role = %file.role, "sha256 verified");
    Ok(())
}

fn resolve_role_path(
    standards_dir: &Path,
    files: &[ManifestFile],
    role: &str,
) -> Result<PathBuf, StandardsError> {
    let f = files
        .iter()
        .find(|f| f.role == role)
        .ok_or_else(|| StandardsError::MissingRole {
            role: role.to_string(),
        })?;
    Ok(standards_dir.join(&f.path))
}

fn validate_sha(sha: &str, path: &str) -> Result<(), StandardsError> {
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StandardsError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "sha256 must be 64 hex characters".to_string(),
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<PathBuf, StandardsError> {
    if path.contains('\\') {
        return Err(StandardsError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(StandardsError::InvalidPath {
            path: p,
            message: "manifest path must be relative".to_string(),
        });
    }

    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(StandardsError::InvalidPath {
            path: p,
            message: "manifest path must not traverse out of standards/".to_string(),
        });
    }

    Ok(p)
}

fn list_files_under(root: &Path) -> Result<BTreeSet<PathBuf>, StandardsError> {
    let mut stack = vec![root.to_path_buf()];
    let mut files = BTreeSet::new();

    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).map_err(|e| StandardsError::io(&dir, e))? {
            let entry = entry.map_err(|e| StandardsError::io(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                let rel = path
                    .strip_prefix(root)
                    .map_err(|e| StandardsError::InvalidPath {
                        path: path.clone(),
                        message: format!("failed to relativize path: {e}"),
                    })?
                    .to_path_buf();
                files.insert(rel);
            }
        }
    }

    Ok(files)
}

fn normalize_path(p: &Path) -> PathBuf {
    p.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_paths_must_stay_inside_standards() {
        assert!(validate_path("ctcae/v5_0/Criteria.csv").is_ok());
        assert!(matches!(
            validate_path("../secrets.csv"),
            Err(StandardsError::InvalidPath { .. })
        ));
        assert!(matches!(
            validate_path("ctcae\\v5_0\\Criteria.csv"),
            Err(StandardsError::InvalidPath { .. })
        ));
    }

    #[test]
    fn sha_must_be_hex() {
        assert!(validate_sha(&"a".repeat(64), "x.csv").is_ok());
        assert!(validate_sha("abc", "x.csv").is_err());
        assert!(validate_sha(&"z".repeat(64), "x.csv").is_err());
    }

    #[test]
    fn normalize_drops_current_dir() {
        assert_eq!(
            normalize_path(Path::new("./labels/./v1/DoseModifications.csv")),
            PathBuf::from("labels/v1/DoseModifications.csv")
        );
    }
}
