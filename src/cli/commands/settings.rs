use std::time::Duration;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::config::parse_flag;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "settings",
            "Show settings, toggle test mode or force a rate failure",
            "settings [test-mode on|off | force-error]",
            cmd_settings,
        ),
        CommandEntry::new(
            "wait",
            "Apply outstanding rate lookups, then let [ms] more pass",
            "wait [ms]",
            cmd_wait,
        ),
    ]
}

fn cmd_settings(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            show_settings(context);
            Ok(())
        }
        ["test-mode", flag] => {
            let enabled = parse_flag(flag).ok_or_else(|| {
                CommandError::InvalidArguments(format!("expected on or off, got `{}`", flag))
            })?;
            context.session.set_test_mode(enabled);
            let state = if enabled { "on" } else { "off" };
            context.print_success(&format!("Test mode {}.", state));
            Ok(())
        }
        ["force-error"] => {
            let ticket = context.session.force_rate_error()?;
            context.print_warning(&format!("Issued failing rate request {}.", ticket));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: settings [test-mode on|off | force-error]".into(),
        )),
    }
}

fn show_settings(context: &ShellContext) {
    output::section("Settings");
    output::two_column(&[
        ("Base currency", context.session.base_currency().to_string()),
        ("Rates URL", context.config.rates_url.clone()),
        (
            "Notice duration",
            format!("{}s", context.config.notice_duration().as_secs()),
        ),
        (
            "Test mode",
            if context.session.test_mode() { "on" } else { "off" }.to_string(),
        ),
        (
            "Pending lookups",
            context.session.pending_fetches().to_string(),
        ),
    ]);
}

fn cmd_wait(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let extra = match args.first() {
        Some(raw) => {
            let millis: u64 = raw.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("`{}` is not a number of milliseconds", raw))
            })?;
            Some(Duration::from_millis(millis))
        }
        None => None,
    };
    let applied = context.wait_for_rates(extra);
    context.print_info(&format!("Applied {} rate update(s).", applied));
    context.show_screen();
    Ok(())
}
