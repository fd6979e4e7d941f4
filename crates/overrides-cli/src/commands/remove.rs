//! Remove command implementation

use colored::Colorize;
use overrides_core::remove_override;

use crate::context::Context;
use crate::error::Result;

/// Run the remove command
pub fn run_remove(ctx: &Context, name: &str) -> Result<()> {
    let mut manifest = ctx.load_manifest()?;
    remove_override(&mut manifest, name)?;
    manifest.save()?;

    println!("{} Override {} removed", "OK".green().bold(), name.cyan());
    Ok(())
}
