//! Init command implementation

use colored::Colorize;
use overrides_core::{Manifest, UpstreamConfig, UpstreamLayout};

use crate::cli::LayoutArg;
use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the init command
///
/// Writes an empty manifest, optionally with an upstream table.
pub fn run_init(
    ctx: &Context,
    upstream: Option<String>,
    layout: LayoutArg,
    tag_prefix: Option<String>,
    force: bool,
) -> Result<()> {
    let path = ctx.init_path();
    if path.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists; use --force to overwrite",
            path.display()
        )));
    }

    let mut manifest = Manifest::new(&path);
    manifest.upstream = upstream.map(|source| UpstreamConfig {
        source,
        layout: match layout {
            LayoutArg::VersionedDirs => UpstreamLayout::VersionedDirs,
            LayoutArg::Git => UpstreamLayout::Git,
        },
        tag_prefix,
        version: ctx.requested_version().map(str::to_string),
    });
    manifest.save()?;

    println!(
        "{} Created {}",
        "OK".green().bold(),
        path.display().to_string().cyan()
    );
    if manifest.upstream.is_none() {
        println!(
            "   No upstream configured; add an {} table before tracking copies.",
            "[upstream]".cyan()
        );
    }
    Ok(())
}
