//! Filesystem primitives for the vendored-override tracker
//!
//! Provides normalized relative paths, atomic writes, content checksums,
//! a format-agnostic document store and the cross-process tool lock.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use config::ConfigStore;
pub use constants::{DEFAULT_MANIFEST, LOCK_SUFFIX, MANIFEST_CANDIDATES, TOOL_IDENTITY};
pub use error::{Error, Result};
pub use lock::{LockGuard, LockHolder, NamedLock};
pub use path::{NormalizedPath, validate_relative};
