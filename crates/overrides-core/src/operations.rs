//! Adding, removing and diffing overrides

use std::collections::BTreeSet;

use overrides_fs::validate_relative;
use similar::TextDiff;

use crate::classifier::Classifier;
use crate::content::{Content, TargetKind};
use crate::manifest::{BaseRef, Manifest, OverrideEntry, OverrideType};
use crate::{Error, Result};

/// Everything needed to start tracking an override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    pub name: String,
    pub override_type: OverrideType,
    pub base_file: Option<String>,
    pub issue: Option<String>,
    pub comment: Option<String>,
}

impl AddRequest {
    pub fn new(name: impl Into<String>, override_type: OverrideType) -> Self {
        Self {
            name: name.into(),
            override_type,
            base_file: None,
            issue: None,
            comment: None,
        }
    }

    pub fn with_base(mut self, base_file: impl Into<String>) -> Self {
        self.base_file = Some(base_file.into());
        self
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issue = Some(issue.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Record a new override, or replace the entry with the same name
///
/// The base is pinned to `version` together with its checksum. The manifest
/// is modified in memory only; callers save it.
///
/// # Errors
///
/// Returns `InvalidOverrideName`, `OverrideNotFound`, `WrongTargetKind`,
/// `UnexpectedBase`, `MissingBase`, `BaseNotFound` or `MissingIssue` when the
/// request does not describe a valid override.
pub fn add_override(
    manifest: &mut Manifest,
    classifier: &Classifier,
    request: AddRequest,
    version: &str,
) -> Result<OverrideEntry> {
    let name = validate_relative(&request.name)
        .map_err(|e| Error::InvalidOverrideName {
            name: request.name.clone(),
            reason: match e {
                overrides_fs::Error::InvalidPath { reason, .. } => reason,
                other => other.to_string(),
            },
        })?
        .as_str()
        .to_string();

    let expected = request.override_type.target();
    match TargetKind::of(&classifier.override_path(&name)) {
        None => return Err(Error::OverrideNotFound { name }),
        Some(actual) if actual != expected => {
            return Err(Error::WrongTargetKind { name, expected });
        }
        Some(_) => {}
    }

    let base = match (request.override_type.requires_base(), request.base_file) {
        (false, Some(_)) => return Err(Error::UnexpectedBase { name }),
        (false, None) => None,
        (true, None) => {
            return Err(Error::MissingBase {
                name,
                kind: request.override_type.to_string(),
            });
        }
        (true, Some(base_file)) => {
            let base_file = validate_relative(&base_file)?.as_str().to_string();
            if classifier.upstream().kind_of(&base_file, version)? != Some(expected) {
                return Err(Error::BaseNotFound {
                    reference: base_file,
                    version: version.to_string(),
                });
            }
            let hash = classifier.read_base(&base_file, expected, version)?.checksum();
            Some(BaseRef::new(base_file, version).with_hash(hash))
        }
    };

    let issue = request.issue.filter(|issue| !issue.trim().is_empty());
    if request.override_type == OverrideType::Patch && issue.is_none() {
        return Err(Error::MissingIssue { name });
    }

    let Some(kind) = request.override_type.with_base(base) else {
        return Err(Error::MissingBase {
            name,
            kind: request.override_type.to_string(),
        });
    };
    let entry = OverrideEntry {
        name,
        kind,
        issue,
        comment: request.comment.filter(|c| !c.trim().is_empty()),
    };

    if manifest.add(entry.clone()).is_some() {
        tracing::info!(name = %entry.name, "Replaced override");
    } else {
        tracing::info!(name = %entry.name, kind = %request.override_type, "Added override");
    }
    Ok(entry)
}

/// Stop tracking an override
///
/// # Errors
///
/// Returns `OverrideNotInManifest` if nothing is tracked under `name`; the
/// manifest is left untouched.
pub fn remove_override(manifest: &mut Manifest, name: &str) -> Result<()> {
    let key = overrides_fs::NormalizedPath::new(name);
    if !manifest.remove(key.as_str()) {
        return Err(Error::OverrideNotInManifest {
            name: name.to_string(),
        });
    }
    tracing::info!(name = %key.as_str(), "Removed override");
    Ok(())
}

/// Unified diff from the base at `version` to the override
///
/// Directory copies produce one section per differing file. An empty string
/// means no differences.
///
/// # Errors
///
/// Returns `MissingBase` for platform overrides, and an error if either side
/// cannot be read.
pub fn diff_override(
    classifier: &Classifier,
    entry: &OverrideEntry,
    version: &str,
) -> Result<String> {
    let Some(base) = entry.kind.base() else {
        return Err(Error::MissingBase {
            name: entry.name.clone(),
            kind: entry.kind.override_type().to_string(),
        });
    };
    let kind = entry.kind.target();
    let theirs = classifier.read_base(&base.base_file, kind, version)?;
    let ours = classifier.read_override(&entry.name, kind)?;

    let base_label = classifier.upstream().locate(&base.base_file, version);
    Ok(match (theirs, ours) {
        (Content::File(theirs), Content::File(ours)) => {
            unified(&theirs, &ours, &base_label, &entry.name)
        }
        (Content::Tree(theirs), Content::Tree(ours)) => {
            let files: BTreeSet<&String> = theirs.keys().chain(ours.keys()).collect();
            let empty = Vec::new();
            files
                .into_iter()
                .map(|file| {
                    unified(
                        theirs.get(file).unwrap_or(&empty),
                        ours.get(file).unwrap_or(&empty),
                        &format!("{base_label}/{file}"),
                        &format!("{}/{file}", entry.name),
                    )
                })
                .collect()
        }
        _ => String::new(),
    })
}

fn unified(old: &[u8], new: &[u8], old_label: &str, new_label: &str) -> String {
    if old == new {
        return String::new();
    }
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    TextDiff::from_lines(old.as_ref(), new.as_ref())
        .unified_diff()
        .context_radius(3)
        .header(old_label, new_label)
        .to_string()
}
