//! Vendored-override tracker CLI
//!
//! Tracks local overrides of files from a vendored upstream, checks them for
//! drift and merges them onto new upstream releases.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use overrides_core::{WaitPolicy, describe_holder, with_lock};
use overrides_fs::{NamedLock, TOOL_IDENTITY};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::add::AddArgs;
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::new(
        std::env::current_dir()?,
        cli.manifest.clone(),
        cli.upstream_version.clone(),
    );
    let lock = match &cli.lock_dir {
        Some(dir) => NamedLock::in_dir(dir, TOOL_IDENTITY),
        None => NamedLock::for_tool(TOOL_IDENTITY),
    }
    .with_command(cli.command.name());
    let policy = if cli.no_wait {
        WaitPolicy::FailFast
    } else {
        WaitPolicy::Block
    };

    with_lock(
        &lock,
        policy,
        |holder| {
            eprintln!(
                "{} Another instance is running ({}); waiting...",
                "=>".yellow().bold(),
                describe_holder(holder)
            );
        },
        || execute_command(&ctx, cli.command),
    )
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init {
            upstream,
            layout,
            tag_prefix,
            force,
        } => commands::run_init(ctx, upstream, layout, tag_prefix, force),
        Commands::List { json } => commands::run_list(ctx, json),
        Commands::Add {
            name,
            override_type,
            base,
            issue,
            comment,
        } => commands::run_add(
            ctx,
            AddArgs {
                name,
                override_type,
                base,
                issue,
                comment,
            },
        ),
        Commands::Remove { name } => commands::run_remove(ctx, &name),
        Commands::Validate { json } => commands::run_validate(ctx, json),
        Commands::Upgrade {
            allow_conflicts,
            json,
        } => commands::run_upgrade(ctx, allow_conflicts, json),
        Commands::Diff { name } => commands::run_diff(ctx, &name),
    }
}
