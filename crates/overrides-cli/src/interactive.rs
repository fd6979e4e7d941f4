//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based interactive selection.

use std::io::IsTerminal;

use dialoguer::{Input, Select};
use overrides_core::OverrideType;

use crate::error::{CliError, Result};

/// True when prompts can be shown
pub fn can_prompt() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Ask which kind of override `name` is
pub fn prompt_override_type(name: &str) -> Result<OverrideType> {
    if !can_prompt() {
        return Err(CliError::user(
            "--type is required when not running interactively",
        ));
    }

    let items: Vec<String> = OverrideType::ALL
        .iter()
        .map(|t| format!("{:<15} {}", t.as_str(), t.description()))
        .collect();
    let index = Select::new()
        .with_prompt(format!("What kind of override is {name}?"))
        .items(&items)
        .default(2)
        .interact()?;

    Ok(OverrideType::ALL[index])
}

/// Ask for the upstream file an override is based on
pub fn prompt_base(name: &str) -> Result<String> {
    let base: String = Input::new()
        .with_prompt(format!("Upstream file {name} is based on"))
        .with_initial_text(name)
        .interact_text()?;
    Ok(base)
}

/// Ask for the issue a patch override is tracked under
pub fn prompt_issue() -> Result<String> {
    let issue: String = Input::new()
        .with_prompt("Issue tracking the upstream fix")
        .interact_text()?;
    Ok(issue)
}
