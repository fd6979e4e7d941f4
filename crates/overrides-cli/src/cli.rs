//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Track local overrides of vendored upstream files
#[derive(Parser, Debug)]
#[command(name = "overrides")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Manifest to use instead of searching upward from the current directory
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Upstream release to validate and upgrade against
    #[arg(
        long,
        global = true,
        env = "OVERRIDES_UPSTREAM_VERSION",
        value_name = "VERSION"
    )]
    pub upstream_version: Option<String>,

    /// Fail instead of waiting when another instance is running
    #[arg(long, global = true)]
    pub no_wait: bool,

    /// Directory holding the tool lock file
    #[arg(long, global = true, env = "OVERRIDES_LOCK_DIR", hide = true)]
    pub lock_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Upstream layout accepted by `init`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutArg {
    /// One directory per release: <source>/<version>/<file>
    VersionedDirs,
    /// A git repository with one tag per release
    Git,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create an empty manifest
    ///
    /// Examples:
    ///   overrides init --upstream ../vendor/upstream --upstream-version 0.72.0
    ///   overrides init --upstream ../engine --layout git --tag-prefix release-
    Init {
        /// Path to the upstream source, relative to the manifest directory
        #[arg(long, value_name = "PATH")]
        upstream: Option<String>,

        /// How the upstream source is laid out
        #[arg(long, value_enum, default_value = "versioned-dirs")]
        layout: LayoutArg,

        /// Tag prefix for git upstreams
        #[arg(long)]
        tag_prefix: Option<String>,

        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },

    /// List tracked overrides
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Start tracking an override
    ///
    /// Prompts for the override type when --type is not given.
    ///
    /// Examples:
    ///   overrides add src/a.cpp --type derived --base lib/a.cpp
    ///   overrides add src/fix.cpp -t patch -b lib/fix.cpp -i UP-123
    ///   overrides add src/platform.cpp -t platform
    Add {
        /// Path of the override, relative to the manifest directory
        name: String,

        /// Override type: platform, copy, derived, patch or directory_copy
        #[arg(short = 't', long = "type")]
        override_type: Option<String>,

        /// Upstream file the override is based on
        #[arg(short, long)]
        base: Option<String>,

        /// Issue tracking why the override exists
        #[arg(short, long)]
        issue: Option<String>,

        /// Free-form note
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Stop tracking an override
    Remove {
        /// Name of the override to remove
        name: String,
    },

    /// Check overrides against the manifest and upstream
    Validate {
        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },

    /// Merge stale overrides onto the upstream release
    Upgrade {
        /// Write merged content even when it contains conflict markers
        #[arg(long)]
        allow_conflicts: bool,

        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },

    /// Show how an override differs from its base
    Diff {
        /// Name of the override
        name: String,
    },
}

impl Commands {
    /// Command name recorded in the lock file
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::List { .. } => "list",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Validate { .. } => "validate",
            Self::Upgrade { .. } => "upgrade",
            Self::Diff { .. } => "diff",
        }
    }
}
