//! Terminal rendering of the retained view.

use std::io::{self, Write};

use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand,
};

use crate::cli::output::{self, MessageKind};
use crate::view::ViewState;
use crate::wizard::WizardStep;

const CONFIRMATION_MESSAGE: &str =
    "Thanks for confirming your subscription! We hope you have fun using our platform.";

/// Lines describing the current screen. The first line is the step heading.
pub fn screen_lines(view: &ViewState, test_mode: bool) -> Vec<String> {
    let step = view.steps.current;
    let mut lines = vec![step.title().to_string()];

    let sidebar: Vec<String> = view
        .steps
        .sidebar
        .iter()
        .map(|entry| {
            if entry.active {
                format!("[{}] {} <", entry.number, entry.label)
            } else {
                format!("[{}] {}", entry.number, entry.label)
            }
        })
        .collect();
    lines.push(sidebar.join("  "));
    if let Some(indicator) = &view.steps.mobile_indicator {
        lines.push(indicator.clone());
    }
    lines.push(String::new());

    match step {
        WizardStep::ContactInfo => {
            for field in &view.contact {
                let value = if field.value.is_empty() {
                    "(empty)"
                } else {
                    field.value.as_str()
                };
                lines.push(format!("{:<14} {}", field.field.label(), value));
                if let Some(error) = &field.error {
                    lines.push(format!("{:<14} ! {}", "", error));
                }
            }
        }
        WizardStep::Plan => {
            for plan in &view.plans {
                let marker = if plan.selected { "(*)" } else { "( )" };
                let mut line = format!("{} {:<10} {}", marker, plan.plan, plan.price_label);
                if let Some(badge) = plan.free_badge {
                    line.push_str(&format!("  {}", badge));
                }
                lines.push(line);
            }
            let billing = &view.billing;
            let monthly = if billing.monthly_emphasized { "[Monthly]" } else { "Monthly" };
            let yearly = if billing.yearly_emphasized { "[Yearly]" } else { "Yearly" };
            lines.push(format!("Billing: {} / {}", monthly, yearly));
        }
        WizardStep::Addons => {
            for addon in &view.addons {
                let marker = if addon.checked { "[x]" } else { "[ ]" };
                lines.push(format!("{} {:<22} {}", marker, addon.addon, addon.price_label));
            }
        }
        WizardStep::Summary => match &view.summary {
            Some(summary) => {
                lines.push(format!(
                    "{:<24} {}",
                    summary.plan_line.label, summary.plan_line.price_label
                ));
                lines.push(format!("  {} (change-plan)", summary.change_action));
                for line in &summary.addon_lines {
                    lines.push(format!("{:<24} {}", line.label, line.price_label));
                }
                lines.push(format!("{:<24} {}", summary.total_label, summary.total_text));
            }
            None => lines.push("Summary not available yet.".to_string()),
        },
        WizardStep::Confirmation => lines.push(CONFIRMATION_MESSAGE.to_string()),
    }

    lines.push(String::new());
    let options: Vec<String> = view
        .currency
        .options
        .iter()
        .map(|option| {
            let mut label = option.code.to_string();
            if option.code == view.currency.selected {
                label = format!("[{}]", label);
            }
            if !option.enabled {
                label.push_str(" (disabled)");
            }
            label
        })
        .collect();
    lines.push(format!("Currency: {}", options.join(" ")));
    if let Some(notice) = &view.currency.notice {
        lines.push(format!("Notice: {}", notice));
    }
    if test_mode {
        lines.push("Test mode: on".to_string());
    }
    lines
}

/// Wipes the terminal so the next screen starts at the top.
pub fn clear_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(terminal::Clear(ClearType::All))?;
    stdout.execute(cursor::MoveTo(0, 0))?;
    stdout.flush()
}

pub fn print_screen(view: &ViewState, test_mode: bool) {
    let lines = screen_lines(view, test_mode);
    let mut iter = lines.into_iter();
    if let Some(heading) = iter.next() {
        output::section(heading);
    }
    for line in iter {
        if line.starts_with("Notice:") {
            println!("{}", output::styled(MessageKind::Warning, line));
        } else {
            output::info(line);
        }
    }
}
