//! Error types for overrides-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from overrides-core
    #[error(transparent)]
    Core(#[from] overrides_core::Error),

    /// Error from overrides-fs
    #[error(transparent)]
    Fs(#[from] overrides_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Interactive prompt error
    #[error("Interactive prompt error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// JSON output error
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation found problems
    #[error("{count} validation error(s) found")]
    ValidationFailed { count: usize },

    /// Upgrade left overrides unmerged because of conflicts
    #[error("{count} override(s) have merge conflicts; rerun with --allow-conflicts to write markers")]
    UnresolvedConflicts { count: usize },

    /// Upgrade could not process some overrides
    #[error("{count} override(s) could not be upgraded; see the messages above")]
    UpgradeSkipped { count: usize },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
