//! Add command implementation

use colored::Colorize;
use overrides_core::{AddRequest, OverrideType, add_override};

use crate::context::Context;
use crate::error::Result;
use crate::interactive;

/// Arguments of the add command
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    pub name: String,
    pub override_type: Option<String>,
    pub base: Option<String>,
    pub issue: Option<String>,
    pub comment: Option<String>,
}

/// Run the add command
///
/// Missing details are prompted for when attached to a terminal.
pub fn run_add(ctx: &Context, args: AddArgs) -> Result<()> {
    let override_type = match &args.override_type {
        Some(t) => t.parse::<OverrideType>()?,
        None => interactive::prompt_override_type(&args.name)?,
    };

    let base = match args.base {
        None if override_type.requires_base() && interactive::can_prompt() => {
            Some(interactive::prompt_base(&args.name)?)
        }
        base => base,
    };
    let issue = match args.issue {
        None if override_type == OverrideType::Patch && interactive::can_prompt() => {
            Some(interactive::prompt_issue()?)
        }
        issue => issue,
    };

    let mut session = if override_type.requires_base() {
        ctx.session()?
    } else {
        ctx.local_session()?
    };
    let version = if override_type.requires_base() {
        ctx.version(&session.manifest)?
    } else {
        ctx.version(&session.manifest).unwrap_or_default()
    };

    let request = AddRequest {
        name: args.name,
        override_type,
        base_file: base,
        issue,
        comment: args.comment,
    };
    let entry = add_override(&mut session.manifest, &session.classifier, request, &version)?;
    session.manifest.save()?;

    match entry.kind.base() {
        Some(base) => println!(
            "{} Tracking {} as {} of {} @ {}",
            "OK".green().bold(),
            entry.name.cyan(),
            override_type,
            base.base_file,
            base.base_version
        ),
        None => println!(
            "{} Tracking {} as {}",
            "OK".green().bold(),
            entry.name.cyan(),
            override_type
        ),
    }
    Ok(())
}
