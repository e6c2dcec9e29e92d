use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("reset", "Start the signup over", "reset", cmd_reset),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session.reset();
    context.print_success("Signup reset.");
    context.show_screen();
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        output::section("Available commands");
        let width = context.registry.names().map(str::len).max().unwrap_or(0);
        for entry in context.registry.entries() {
            io::print_info(format!(
                "  {:<width$}  {}",
                entry.name,
                entry.description,
                width = width
            ));
        }
        io::print_info("Use `help <command>` for usage.");
        return Ok(());
    };

    match context.command(&name.to_lowercase()) {
        Some(entry) => {
            output::section(format!("Help: {}", entry.name));
            output::two_column(&[
                ("Description", entry.description.to_string()),
                ("Usage", entry.usage.to_string()),
            ]);
        }
        None => context.suggest_command(name),
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
