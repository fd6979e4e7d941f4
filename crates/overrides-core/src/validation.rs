//! Validation engine
//!
//! Compares the manifest with the override tree and the upstream release.
//! Every entry is checked independently on the rayon pool. Findings come
//! back as a flat, sorted list of [`ValidationError`]s; only failures to
//! read the world abort validation.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use overrides_fs::{LOCK_SUFFIX, NormalizedPath, TOOL_IDENTITY};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::classifier::Classifier;
use crate::content::{TargetKind, walk_error};
use crate::manifest::{Manifest, OverrideEntry, OverrideType};
use crate::{Error, Result};

/// What is wrong with an override
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// File on disk that the manifest does not list
    MissingFromManifest,
    /// Listed override does not exist
    OverrideNotFound,
    /// Base does not exist at the active release
    BaseNotFound,
    /// Base changed upstream since the override was synchronized
    OutOfDate,
    /// A copy no longer matches its base
    OverrideDifferentFromBase,
    /// A derived or patch override has no changes left
    OverrideSameAsBase,
    /// Directory where a file is expected
    ExpectedFile,
    /// File where a directory is expected
    ExpectedDirectory,
}

impl ValidationErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingFromManifest => "missing_from_manifest",
            Self::OverrideNotFound => "override_not_found",
            Self::BaseNotFound => "base_not_found",
            Self::OutOfDate => "out_of_date",
            Self::OverrideDifferentFromBase => "override_different_from_base",
            Self::OverrideSameAsBase => "override_same_as_base",
            Self::ExpectedFile => "expected_file",
            Self::ExpectedDirectory => "expected_directory",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::MissingFromManifest => "file is not listed in the manifest",
            Self::OverrideNotFound => "override does not exist",
            Self::BaseNotFound => "base does not exist in the upstream release",
            Self::OutOfDate => "base changed upstream; run upgrade",
            Self::OverrideDifferentFromBase => "copy differs from its base",
            Self::OverrideSameAsBase => "override is identical to its base",
            Self::ExpectedFile => "expected a file, found a directory",
            Self::ExpectedDirectory => "expected a directory, found a file",
        }
    }
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding about one override name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidationError {
    pub name: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(name: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Validate every entry of `manifest` against upstream release `version`
///
/// # Errors
///
/// Returns an error if a file or the upstream cannot be read, or if an
/// include/exclude pattern is malformed.
pub fn validate_manifest(
    manifest: &Manifest,
    classifier: &Classifier,
    version: &str,
) -> Result<Vec<ValidationError>> {
    tracing::info!(
        overrides = manifest.entries().len(),
        version = %version,
        "Validating overrides"
    );

    let mut errors = find_unlisted(manifest, classifier.root())?;

    let per_entry = manifest
        .entries()
        .par_iter()
        .map(|entry| check_entry(classifier, entry, version))
        .collect::<Result<Vec<_>>>()?;
    errors.extend(per_entry.into_iter().flatten());

    errors.sort();
    errors.dedup();
    tracing::info!(errors = errors.len(), "Validation finished");
    Ok(errors)
}

/// All findings for one entry
fn check_entry(
    classifier: &Classifier,
    entry: &OverrideEntry,
    version: &str,
) -> Result<Vec<ValidationError>> {
    use ValidationErrorKind::*;

    let state = classifier.classify(entry, version)?;
    let mut found = Vec::new();
    let finding = |kind| ValidationError::new(&entry.name, kind);

    match state.actual {
        None => found.push(finding(OverrideNotFound)),
        Some(actual) if actual != state.expected => found.push(finding(match state.expected {
            TargetKind::File => ExpectedFile,
            TargetKind::Directory => ExpectedDirectory,
        })),
        Some(_) => {}
    }

    let Some(base) = entry.kind.base() else {
        tracing::debug!(name = %entry.name, findings = found.len(), "Checked platform override");
        return Ok(found);
    };
    if !state.base_ok() {
        found.push(finding(BaseNotFound));
        return Ok(found);
    }

    let current = classifier
        .read_base(&base.base_file, state.expected, version)?
        .checksum();
    let recorded = match &base.base_hash {
        Some(hash) => Some(hash.clone()),
        None if base.base_version == version => Some(current.clone()),
        None => classifier
            .try_read_base(&base.base_file, state.expected, &base.base_version)?
            .map(|content| content.checksum()),
    };

    if base.base_version != version && recorded.as_deref() != Some(current.as_str()) {
        found.push(finding(OutOfDate));
    }

    if state.override_ok() {
        let ours = classifier
            .read_override(&entry.name, state.expected)?
            .checksum();
        let reference = recorded.as_deref().unwrap_or(&current);
        match entry.kind.override_type() {
            OverrideType::Copy | OverrideType::DirectoryCopy if ours != reference => {
                found.push(finding(OverrideDifferentFromBase))
            }
            OverrideType::Derived | OverrideType::Patch if ours == reference => {
                found.push(finding(OverrideSameAsBase))
            }
            _ => {}
        }
    }

    tracing::debug!(name = %entry.name, findings = found.len(), "Checked override");
    Ok(found)
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| Error::InvalidPattern {
                pattern: p.clone(),
                message: e.msg.to_string(),
            })
        })
        .collect()
}

/// Files under `root` selected by the manifest patterns but not covered by
/// any entry
fn find_unlisted(manifest: &Manifest, root: &Path) -> Result<Vec<ValidationError>> {
    let include = compile(&manifest.include)?;
    let exclude = compile(&manifest.exclude)?;
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    };

    let manifest_name = manifest
        .path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let lock_name = format!("{TOOL_IDENTITY}.{LOCK_SUFFIX}");
    let upstream_dir = manifest
        .upstream
        .as_ref()
        .filter(|u| !Path::new(&u.source).is_absolute())
        .map(|u| NormalizedPath::new(&u.source))
        .filter(|p| !p.as_str().is_empty());

    // Anything at or beneath a listed name belongs to that entry
    let listed: Vec<NormalizedPath> = manifest
        .entries()
        .iter()
        .map(|entry| NormalizedPath::new(&entry.name))
        .collect();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    let mut unlisted = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = NormalizedPath::new(relative);

        if relative.parent().is_none()
            && relative
                .file_name()
                .is_some_and(|n| Some(n) == manifest_name.as_deref() || n == lock_name)
        {
            continue;
        }
        if upstream_dir
            .as_ref()
            .is_some_and(|dir| relative.starts_with(dir))
        {
            continue;
        }
        if !include
            .iter()
            .any(|p| p.matches_with(relative.as_str(), options))
            || exclude
                .iter()
                .any(|p| p.matches_with(relative.as_str(), options))
        {
            continue;
        }
        if listed.iter().any(|name| relative.starts_with(name)) {
            continue;
        }

        tracing::debug!(path = %relative.as_str(), "Unlisted override candidate");
        unlisted.push(ValidationError::new(
            relative.as_str(),
            ValidationErrorKind::MissingFromManifest,
        ));
    }
    Ok(unlisted)
}
