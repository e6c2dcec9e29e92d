use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::wizard::ContactField;

use super::joined_value;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("name", "Set your name", "name <value>", cmd_name),
        CommandEntry::new(
            "email",
            "Set your email address",
            "email <value>",
            cmd_email,
        ),
        CommandEntry::new(
            "phone",
            "Set your phone number",
            "phone <value>",
            cmd_phone,
        ),
        CommandEntry::new(
            "contact",
            "Fill in every contact field interactively",
            "contact",
            cmd_contact,
        ),
    ]
}

fn cmd_name(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_field(context, ContactField::Name, args, "name <value>")
}

fn cmd_email(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_field(context, ContactField::Email, args, "email <value>")
}

fn cmd_phone(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_field(context, ContactField::Phone, args, "phone <value>")
}

fn set_field(
    context: &mut ShellContext,
    field: ContactField,
    args: &[&str],
    usage: &str,
) -> CommandResult {
    let value = joined_value(args, usage)?;
    context.session.set_contact_field(field, value)?;
    context.print_info(&format!("{} updated.", field.label()));
    Ok(())
}

fn cmd_contact(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.mode == CliMode::Script {
        return Err(CommandError::InvalidArguments(
            "`contact` needs an interactive terminal; use `name`, `email` and `phone` instead"
                .into(),
        ));
    }
    for field in ContactField::ALL {
        let current = context.session.wizard().inputs().get(field).to_string();
        let value = io::prompt_text(&context.theme, field.label(), &current)?;
        context.session.set_contact_field(field, value)?;
    }
    context.show_screen();
    Ok(())
}
