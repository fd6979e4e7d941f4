//! Core engines for tracking vendored-file overrides
//!
//! This crate sits above `overrides-fs` and below the CLI, and implements:
//!
//! - **Manifest store**: the persisted list of overrides and their bases
//! - **Classifier**: what each override and base actually is on disk and upstream
//! - **Validation**: drift, redundancy and bookkeeping checks
//! - **Upgrade**: three-way merge of stale overrides onto a new upstream release
//!
//! # Architecture
//!
//! ```text
//!              overrides-cli
//!                    |
//!             overrides-core
//!       +--------+---+----+---------+
//!       |        |        |         |
//!   manifest  upstream  merge   validation / upgrade
//!                    |
//!              overrides-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use overrides_core::{Classifier, Manifest, Upstream, validate_manifest};
//!
//! fn check(start: &std::path::Path) -> overrides_core::Result<()> {
//!     let manifest = Manifest::load(&Manifest::discover(start)?)?;
//!     let classifier = Classifier::new(manifest.root(), Upstream::from_manifest(&manifest)?);
//!     let version = manifest.active_version(None)?;
//!     for error in validate_manifest(&manifest, &classifier, &version)? {
//!         println!("{}: {}", error.name, error.kind);
//!     }
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod content;
pub mod error;
pub mod locked;
pub mod manifest;
pub mod merge;
pub mod operations;
pub mod upgrade;
pub mod upstream;
pub mod validation;

pub use classifier::{BaseStatus, Classification, Classifier};
pub use content::{Content, TargetKind};
pub use error::{Error, Result};
pub use locked::{WaitPolicy, describe_holder, with_lock};
pub use manifest::{
    BaseRef, Manifest, OverrideEntry, OverrideKind, OverrideType, UpstreamConfig, UpstreamLayout,
};
pub use merge::{LineMerge, MergeOutcome, ThreeWayMerge};
pub use operations::{AddRequest, add_override, diff_override, remove_override};
pub use upgrade::{NoProgress, ProgressSink, UpgradeEngine, UpgradeOptions, UpgradeResult};
pub use upstream::{GitTags, Upstream, UpstreamSource, VersionedDirs};
pub use validation::{ValidationError, ValidationErrorKind, validate_manifest};
