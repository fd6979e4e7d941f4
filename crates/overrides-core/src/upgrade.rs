//! Upgrade engine
//!
//! Brings stale overrides forward to a new upstream release. Copies take
//! the new base verbatim; derived and patch overrides are three-way merged.
//! Content is written per entry, and the manifest is updated in a single
//! reduction pass and saved once at the end. An entry that cannot be planned
//! is reported as skipped and does not stop the others.

use std::io;

use serde::Serialize;

use crate::{Error, Result};
use crate::classifier::Classifier;
use crate::content::{Content, TargetKind};
use crate::manifest::{Manifest, OverrideKind};
use crate::merge::ThreeWayMerge;
use crate::validation::{ValidationErrorKind, validate_manifest};

/// Upgrade options
#[derive(Debug, Clone, Copy, Default)]
pub struct UpgradeOptions {
    /// Write merged content even when it contains conflict markers
    pub allow_conflicts: bool,
}

/// Outcome for one stale override
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeResult {
    pub name: String,
    pub has_conflicts: bool,
    /// Whether new content was written and the entry re-based
    pub applied: bool,
    /// Why the entry could not be upgraded at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

/// Receives `(current, total)` before each entry is processed
///
/// `current` is 1-based.
pub trait ProgressSink {
    fn report(&self, current: usize, total: usize) -> io::Result<()>;
}

impl<F: Fn(usize, usize)> ProgressSink for F {
    fn report(&self, current: usize, total: usize) -> io::Result<()> {
        self(current, total);
        Ok(())
    }
}

/// Discards progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _current: usize, _total: usize) -> io::Result<()> {
        Ok(())
    }
}

/// Per-entry outcome of the planning phase
enum Step {
    Apply(Plan),
    Skip(UpgradeResult),
}

/// New content for one entry, computed before anything is written
struct Plan {
    name: String,
    content: Content,
    new_base_hash: String,
    has_conflicts: bool,
}

pub struct UpgradeEngine<'a> {
    classifier: &'a Classifier,
    merger: &'a dyn ThreeWayMerge,
}

impl<'a> UpgradeEngine<'a> {
    pub fn new(classifier: &'a Classifier, merger: &'a dyn ThreeWayMerge) -> Self {
        Self { classifier, merger }
    }

    /// Upgrade every stale override in `manifest` to release `version`
    ///
    /// Returns one result per stale override, in manifest order. Running it
    /// again against the same release finds nothing stale and returns an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, upstream or override content
    /// cannot be read, or content or the manifest cannot be written. A base
    /// missing from the pinned release only skips that entry.
    pub fn upgrade(
        &self,
        manifest: &mut Manifest,
        version: &str,
        options: UpgradeOptions,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<UpgradeResult>> {
        let findings = validate_manifest(manifest, self.classifier, version)?;
        let stale: Vec<String> = manifest
            .entries()
            .iter()
            .filter(|entry| {
                findings
                    .iter()
                    .any(|f| f.name == entry.name && f.kind == ValidationErrorKind::OutOfDate)
            })
            .map(|entry| entry.name.clone())
            .collect();

        tracing::info!(stale = stale.len(), version = %version, "Upgrading overrides");

        let total = stale.len();
        let mut steps = Vec::with_capacity(total);
        for (index, name) in stale.iter().enumerate() {
            if let Err(e) = progress.report(index + 1, total) {
                tracing::warn!(error = %e, "Progress sink failed");
            }
            match self.plan(manifest, name, version) {
                Ok(Some(plan)) => steps.push(Step::Apply(plan)),
                Ok(None) => {}
                Err(e @ Error::BaseNotFound { .. }) => {
                    tracing::warn!(name = %name, error = %e, "Skipping stale override");
                    steps.push(Step::Skip(UpgradeResult {
                        name: name.clone(),
                        has_conflicts: false,
                        applied: false,
                        skipped: Some(e.to_string()),
                    }));
                }
                Err(e) => return Err(e),
            }
        }

        let mut results = Vec::with_capacity(steps.len());
        let mut applied_any = false;
        for step in steps {
            let plan = match step {
                Step::Apply(plan) => plan,
                Step::Skip(result) => {
                    results.push(result);
                    continue;
                }
            };
            let applied = !plan.has_conflicts || options.allow_conflicts;
            if applied {
                plan.content
                    .write(&self.classifier.override_path(&plan.name))?;
                if let Some(base) = manifest
                    .get_mut(&plan.name)
                    .and_then(|entry| entry.kind.base_mut())
                {
                    base.base_version = version.to_string();
                    base.base_hash = Some(plan.new_base_hash.clone());
                }
                applied_any = true;
            }
            tracing::debug!(
                name = %plan.name,
                conflicts = plan.has_conflicts,
                applied,
                "Upgraded override"
            );
            results.push(UpgradeResult {
                name: plan.name,
                has_conflicts: plan.has_conflicts,
                applied,
                skipped: None,
            });
        }

        if applied_any {
            manifest.save()?;
        }
        Ok(results)
    }

    fn plan(&self, manifest: &Manifest, name: &str, version: &str) -> Result<Option<Plan>> {
        let Some(entry) = manifest.get(name) else {
            return Ok(None);
        };
        let Some(base) = entry.kind.base() else {
            return Ok(None);
        };
        let kind = entry.kind.target();
        if TargetKind::of(&self.classifier.override_path(name)) != Some(kind) {
            tracing::warn!(name = %name, "Skipping stale override that is missing or of the wrong kind");
            return Ok(None);
        }
        let new_base = self.classifier.read_base(&base.base_file, kind, version)?;
        let new_base_hash = new_base.checksum();

        let (content, has_conflicts) = match &entry.kind {
            OverrideKind::Copy(_) | OverrideKind::DirectoryCopy(_) => (new_base, false),
            OverrideKind::Derived(_) | OverrideKind::Patch(_) => {
                let old_base = self
                    .classifier
                    .read_base(&base.base_file, kind, &base.base_version)?;
                let ours = self.classifier.read_override(name, kind)?;
                match (old_base, &new_base, ours) {
                    (Content::File(old), Content::File(new), Content::File(ours)) => {
                        let outcome = self.merger.merge(&old, new, &ours);
                        (Content::File(outcome.content), outcome.has_conflicts)
                    }
                    _ => return Ok(None),
                }
            }
            OverrideKind::Platform => return Ok(None),
        };

        Ok(Some(Plan {
            name: name.to_string(),
            content,
            new_base_hash,
            has_conflicts,
        }))
    }
}
