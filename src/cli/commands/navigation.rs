use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::registry::CommandEntry;
use crate::wizard::{AdvanceTrigger, WizardStep};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("next", "Go to the next step", "next", cmd_next),
        CommandEntry::new(
            "confirm",
            "Confirm the subscription from the summary",
            "confirm",
            cmd_confirm,
        ),
        CommandEntry::new("back", "Go back one step", "back", cmd_back),
        CommandEntry::new(
            "change-plan",
            "Return to plan selection from the summary",
            "change-plan",
            cmd_change_plan,
        ),
        CommandEntry::new("show", "Show the current step", "show", cmd_show),
    ]
}

fn cmd_next(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    advance(context, AdvanceTrigger::Next)
}

fn cmd_confirm(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.session.step() != WizardStep::Summary {
        context.print_warning("Confirmation is only available from the summary.");
        return Ok(());
    }
    advance(context, AdvanceTrigger::Confirm)?;
    context.print_success("Subscription confirmed.");
    Ok(())
}

fn advance(context: &mut ShellContext, trigger: AdvanceTrigger) -> CommandResult {
    let result = context.session.advance(trigger);
    context.show_screen();
    result.map_err(Into::into)
}

fn cmd_back(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session.retreat();
    context.show_screen();
    Ok(())
}

fn cmd_change_plan(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session.change_plan()?;
    context.show_screen();
    Ok(())
}

fn cmd_show(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session.sync();
    context.show_screen();
    Ok(())
}
