//! List command implementation

use colored::Colorize;

use crate::context::Context;
use crate::error::Result;

/// Run the list command
pub fn run_list(ctx: &Context, json: bool) -> Result<()> {
    let manifest = ctx.load_manifest()?;

    if json {
        println!("{}", serde_json::to_string_pretty(manifest.entries())?);
        return Ok(());
    }

    if manifest.entries().is_empty() {
        println!("No overrides tracked in {}", manifest.path().display());
        return Ok(());
    }

    println!("{}", "Tracked Overrides".bold());
    println!();
    for entry in manifest.entries() {
        let kind = entry.kind.override_type();
        match entry.kind.base() {
            Some(base) => println!(
                "  {:<40} {:<15} {} @ {}",
                entry.name.green(),
                kind.as_str().cyan(),
                base.base_file,
                base.base_version.dimmed()
            ),
            None => println!("  {:<40} {}", entry.name.green(), kind.as_str().cyan()),
        }
        if let Some(issue) = &entry.issue {
            println!("  {:<40} issue: {}", "", issue.yellow());
        }
        if let Some(comment) = &entry.comment {
            println!("  {:<40} {}", "", comment.dimmed());
        }
    }
    Ok(())
}
