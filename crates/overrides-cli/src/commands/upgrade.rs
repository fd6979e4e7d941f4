//! Upgrade command implementation

use colored::Colorize;
use overrides_core::{LineMerge, UpgradeEngine, UpgradeOptions};

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the upgrade command
pub fn run_upgrade(ctx: &Context, allow_conflicts: bool, json: bool) -> Result<()> {
    let mut session = ctx.session()?;
    let version = ctx.version(&session.manifest)?;

    if !json {
        println!(
            "{} Upgrading overrides to {}...",
            "=>".blue().bold(),
            version.cyan()
        );
    }

    let merger = LineMerge::new();
    let engine = UpgradeEngine::new(&session.classifier, &merger);
    let progress = |current: usize, total: usize| {
        if !json {
            eprintln!("   [{current}/{total}]");
        }
    };
    let results = engine.upgrade(
        &mut session.manifest,
        &version,
        UpgradeOptions { allow_conflicts },
        &progress,
    )?;

    let unresolved = results.iter().filter(|r| r.has_conflicts && !r.applied).count();
    let skipped = results.iter().filter(|r| r.skipped.is_some()).count();
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("{} Nothing to upgrade.", "OK".green().bold());
    } else {
        for result in &results {
            if let Some(reason) = &result.skipped {
                println!("   {} {} ({})", result.name.cyan(), "skipped".red(), reason);
                continue;
            }
            let status = match (result.has_conflicts, result.applied) {
                (false, _) => "merged".green(),
                (true, true) => "conflicts written".yellow(),
                (true, false) => "skipped (conflicts)".red(),
            };
            println!("   {} {}", result.name.cyan(), status);
        }
    }

    if unresolved > 0 {
        Err(CliError::UnresolvedConflicts { count: unresolved })
    } else if skipped > 0 {
        Err(CliError::UpgradeSkipped { count: skipped })
    } else {
        Ok(())
    }
}
