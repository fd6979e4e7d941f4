//! Error types for overrides-core

use std::path::PathBuf;

use crate::content::TargetKind;

/// Result type for overrides-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in overrides-core operations
///
/// Validation findings and merge conflicts are not errors; they are returned
/// as data. Everything here aborts the current operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No manifest in the start directory or any ancestor
    #[error("No override manifest found in {start} or any parent directory")]
    ManifestNotFound { start: PathBuf },

    /// Manifest exists but could not be parsed
    #[error("Failed to parse manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// Two entries share a name
    #[error("Override '{name}' is listed more than once in {path}")]
    DuplicateOverride { name: String, path: PathBuf },

    /// Override name is not a relative path inside the manifest directory
    #[error("Invalid override name '{name}': {reason}")]
    InvalidOverrideName { name: String, reason: String },

    /// Override file or directory is missing
    #[error("Override '{name}' does not exist on disk")]
    OverrideNotFound { name: String },

    /// Override exists but is a file where a directory is expected or vice versa
    #[error("Override '{name}' must be a {expected}")]
    WrongTargetKind { name: String, expected: TargetKind },

    /// Removal of a name the manifest does not list
    #[error("Override '{name}' is not in the manifest")]
    OverrideNotInManifest { name: String },

    /// Base reference missing at the requested upstream version
    #[error("Base '{reference}' not found at upstream version {version}")]
    BaseNotFound { reference: String, version: String },

    /// Override type needs a base reference and none was given
    #[error("Override '{name}' of type '{kind}' requires a base file")]
    MissingBase { name: String, kind: String },

    /// Platform overrides have no base
    #[error("Platform override '{name}' cannot declare a base file")]
    UnexpectedBase { name: String },

    /// Patch overrides must say why they exist
    #[error("Patch override '{name}' requires an issue reference")]
    MissingIssue { name: String },

    /// Unknown `type` value supplied by a caller
    #[error("Unknown override type '{0}'")]
    UnknownOverrideType(String),

    /// Bad include/exclude pattern in the manifest
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// No active upstream version from the caller or the manifest
    #[error("No upstream version given and none configured in the manifest")]
    NoUpstreamVersion,

    /// Manifest lacks the `upstream` table
    #[error("The manifest has no upstream configuration")]
    NoUpstreamConfigured,

    /// Another instance holds the tool lock
    #[error("Another instance is running ({holder}); lock file: {path}")]
    Busy { path: PathBuf, holder: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from overrides-fs
    #[error(transparent)]
    Fs(#[from] overrides_fs::Error),

    /// Git error from an upstream repository
    #[error(transparent)]
    Git(#[from] git2::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
