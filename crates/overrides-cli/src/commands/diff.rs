//! Diff command implementation

use colored::Colorize;
use overrides_core::{Error, diff_override};

use crate::context::Context;
use crate::error::Result;

/// Run the diff command
///
/// Prints a unified diff from the base at the active release to the
/// override, colored by line.
pub fn run_diff(ctx: &Context, name: &str) -> Result<()> {
    let session = ctx.session()?;
    let version = ctx.version(&session.manifest)?;
    let key = overrides_fs::NormalizedPath::new(name);
    let entry = session
        .manifest
        .get(key.as_str())
        .ok_or_else(|| Error::OverrideNotInManifest {
            name: name.to_string(),
        })?;

    let diff = diff_override(&session.classifier, entry, &version)?;
    if diff.is_empty() {
        println!("{} {} matches its base", "OK".green().bold(), name.cyan());
        return Ok(());
    }

    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
    Ok(())
}
