//! Well-known file names used by the override tracker.

/// Identity string that keys the cross-process tool lock.
pub const TOOL_IDENTITY: &str = "vendor-overrides";

/// Manifest file written by `init` when no name is given.
pub const DEFAULT_MANIFEST: &str = "overrides.toml";

/// Manifest file names recognized during discovery, in priority order.
pub const MANIFEST_CANDIDATES: &[&str] = &[
    DEFAULT_MANIFEST,
    "overrides.json",
    "overrides.yaml",
    "overrides.yml",
];

/// Extension appended to a lock identity to form the lock file name.
pub const LOCK_SUFFIX: &str = "lock";
