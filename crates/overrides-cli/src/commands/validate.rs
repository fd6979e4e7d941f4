//! Validate command implementation

use colored::Colorize;
use overrides_core::validate_manifest;

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the validate command
///
/// Fails with `ValidationFailed` when any problem is found, so CI jobs can
/// gate on the exit status.
pub fn run_validate(ctx: &Context, json: bool) -> Result<()> {
    let session = ctx.session()?;
    let version = ctx.version(&session.manifest)?;
    let errors = validate_manifest(&session.manifest, &session.classifier, &version)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&errors)?);
    } else if errors.is_empty() {
        println!(
            "{} All {} overrides are valid against {}",
            "OK".green().bold(),
            session.manifest.entries().len(),
            version.cyan()
        );
    } else {
        println!(
            "{} Validation against {} found problems:",
            "INVALID".red().bold(),
            version.cyan()
        );
        for error in &errors {
            println!(
                "   {} {} ({}): {}",
                "!".red(),
                error.name.cyan(),
                error.kind.as_str().dimmed(),
                error.kind.description()
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::ValidationFailed {
            count: errors.len(),
        })
    }
}
