pub mod contact;
pub mod navigation;
pub mod selection;
pub mod settings;
pub mod system;

use crate::cli::core::CommandError;
use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(navigation::definitions());
    commands.extend(contact::definitions());
    commands.extend(selection::definitions());
    commands.extend(settings::definitions());
    commands.extend(system::definitions());
    commands
}

/// Joins the remaining arguments so unquoted multi-word values still work.
pub(crate) fn joined_value(args: &[&str], usage: &str) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(format!("usage: {}", usage)));
    }
    Ok(args.join(" "))
}
