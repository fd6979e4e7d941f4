//! Shared test fixtures for the vendor-overrides workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`] builder for an override tree with a versioned upstream
//! - [`git`]: upstream repositories with one tag per release

pub mod git;
pub mod tree;

pub use tree::TestTree;
