use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::registry::CommandEntry;
use crate::currency::CurrencyCode;
use crate::pricing::{AddonName, BillingCadence, PlanName};

use super::joined_value;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "plan",
            "Select a plan (arcade, advanced, pro)",
            "plan <name>",
            cmd_plan,
        ),
        CommandEntry::new(
            "addon",
            "Toggle an add-on",
            "addon <name>",
            cmd_addon,
        ),
        CommandEntry::new(
            "billing",
            "Switch between monthly and yearly billing",
            "billing <monthly|yearly|toggle>",
            cmd_billing,
        ),
        CommandEntry::new(
            "currency",
            "Change the display currency",
            "currency <GBP|EUR|USD>",
            cmd_currency,
        ),
    ]
}

fn invalid(err: impl std::fmt::Display) -> CommandError {
    CommandError::InvalidArguments(err.to_string())
}

fn cmd_plan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let plan = joined_value(args, "plan <name>")?
        .parse::<PlanName>()
        .map_err(invalid)?;
    context.session.select_plan(plan)?;
    context.show_screen();
    Ok(())
}

fn cmd_addon(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let addon = joined_value(args, "addon <name>")?
        .parse::<AddonName>()
        .map_err(invalid)?;
    context.session.toggle_addon(addon)?;
    context.show_screen();
    Ok(())
}

fn cmd_billing(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = joined_value(args, "billing <monthly|yearly|toggle>")?;
    let billing = if raw.eq_ignore_ascii_case("toggle") {
        context.session.data().billing.toggled()
    } else {
        raw.parse::<BillingCadence>().map_err(invalid)?
    };
    context.session.set_billing(billing)?;
    context.show_screen();
    Ok(())
}

fn cmd_currency(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let code = joined_value(args, "currency <GBP|EUR|USD>")?
        .parse::<CurrencyCode>()
        .map_err(invalid)?;
    let ticket = context.session.set_currency(code)?;
    context.show_screen();
    if let Some(ticket) = ticket {
        context.print_hint(&format!(
            "Fetching {} rates ({}); use `wait` to apply them now.",
            code, ticket
        ));
    }
    Ok(())
}
