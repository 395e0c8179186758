//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CliError;

/// How a command refers to one kind of resource in error messages.
#[derive(Debug, Clone, Copy)]
pub struct Lookup {
    pub resource_type: &'static str,
    pub list_command: &'static str,
}

/// Pick the single item `identifier` refers to.
///
/// An exact ID match wins outright; otherwise `matches` decides, and more
/// than one hit is reported as ambiguous.
pub fn find_one<T>(
    items: Vec<T>,
    identifier: &str,
    lookup: Lookup,
    id_of: impl Fn(&T) -> &str,
    matches: impl Fn(&T, &str) -> bool,
) -> Result<T, CliError> {
    let mut hits = Vec::new();
    for item in items {
        if id_of(&item) == identifier {
            return Ok(item);
        }
        if matches(&item, identifier) {
            hits.push(item);
        }
    }

    match hits.len() {
        0 => Err(CliError::NotFound {
            resource_type: lookup.resource_type.into(),
            identifier: identifier.into(),
            list_command: lookup.list_command.into(),
        }),
        1 => Ok(hits.remove(0)),
        n => Err(CliError::Ambiguous {
            resource_type: lookup.resource_type.into(),
            identifier: identifier.into(),
            matches: n,
        }),
    }
}

/// Case-insensitive comparison against an optional field.
pub fn eq_opt(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|f| f.eq_ignore_ascii_case(needle))
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read one line of input from the terminal.
pub fn prompt(label: &str) -> Result<String, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: label.into(),
            reason: "stdin is not a terminal; pass the value as an argument".into(),
        });
    }
    dialoguer::Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Spinner on stderr for slow calls. Hidden under `--quiet`.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
