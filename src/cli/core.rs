//! Shell context, dispatch and the CLI error types.

use std::{io, sync::Arc, time::Duration};

use dialoguer::theme::ColorfulTheme;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::config::{ConfigManager, SignupConfig};
use crate::errors::{SessionError, SignupError, WizardError};
use crate::rates::{HttpRateSource, RateSource};
use crate::session::SignupSession;

use super::commands;
use super::io as cli_io;
use super::registry::{CommandEntry, CommandRegistry};
use super::screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config: SignupConfig,
    pub session: SignupSession,
    pub runtime: Runtime,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut config = ConfigManager::new().load()?;
        config.apply_env_overrides();
        let source = HttpRateSource::new(config.rates_url.clone(), config.request_timeout())?;
        Self::with_source(mode, config, Arc::new(source))
    }

    pub fn with_source(
        mode: CliMode,
        config: SignupConfig,
        source: Arc<dyn RateSource>,
    ) -> Result<Self, CliError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("plan-signup-rates")
            .enable_all()
            .build()?;
        let session = SignupSession::new(&config, source, runtime.handle().clone());

        let registry = CommandRegistry::from_entries(commands::all_definitions());

        Ok(Self {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            config,
            session,
            runtime,
            running: true,
        })
    }

    pub fn prompt(&self) -> String {
        format!("signup [{}]> ", self.session.step())
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn show_screen(&self) {
        if self.mode == CliMode::Interactive {
            if let Err(err) = screen::clear_terminal() {
                debug!(%err, "could not clear the terminal");
            }
        }
        screen::print_screen(self.session.view(), self.session.test_mode());
    }

    /// Applies rate outcomes that arrived in the background and reprints the
    /// screen when they changed what is displayed.
    pub(crate) fn poll_background(&mut self) {
        let before = self.session.view().clone();
        let applied = self.session.sync();
        if *self.session.view() != before {
            debug!(applied, "background update changed the view");
            self.show_screen();
        }
    }

    /// Waits for outstanding rate lookups, bounded by the request timeout, then
    /// lets `extra` more time pass before applying timers.
    pub(crate) fn wait_for_rates(&mut self, extra: Option<Duration>) -> usize {
        let limit = self
            .config
            .request_timeout()
            .saturating_add(Duration::from_secs(1));
        let ShellContext {
            runtime, session, ..
        } = self;
        let applied = runtime.block_on(async {
            let applied = tokio::time::timeout(limit, session.settle())
                .await
                .unwrap_or(0);
            if let Some(extra) = extra {
                tokio::time::sleep(extra).await;
            }
            applied
        });
        self.session.sync();
        applied
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.get(command).map(|entry| entry.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, raw, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = self.registry.closest(input) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit signup?", false).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Session(SessionError::Wizard(WizardError::Validation(errors))) => {
                self.print_error("Please correct the highlighted fields.");
                for (field, message) in errors.iter() {
                    self.print_hint(&format!("{}: {}", field.label(), message));
                }
                Ok(())
            }
            CommandError::Session(SessionError::Wizard(WizardError::Locked)) => {
                self.print_error("The signup is confirmed; nothing can be changed.");
                self.print_hint("Use `reset` to start over.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_success(&self, message: &str) {
        cli_io::print_success(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }

    pub(crate) fn print_info(&self, message: &str) {
        cli_io::print_info(message);
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<WizardError> for CommandError {
    fn from(err: WizardError) -> Self {
        CommandError::Session(SessionError::Wizard(err))
    }
}

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Signup(#[from] SignupError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::InvalidArguments(message) => CliError::Input(message),
            CommandError::Io(err) => CliError::Io(err),
            other => CliError::Command(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    source: Arc<dyn RateSource>,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_source(CliMode::Script, SignupConfig::default(), source)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RateFetchError;
    use crate::pricing::{AddonName, PlanName};
    use crate::rates::RateTable;
    use crate::wizard::WizardStep;
    use crate::currency::CurrencyCode;
    use async_trait::async_trait;

    struct FixedRates;

    #[async_trait]
    impl RateSource for FixedRates {
        async fn fetch(
            &self,
            _base: &str,
            _targets: &[CurrencyCode],
        ) -> Result<RateTable, RateFetchError> {
            let mut table = RateTable::new();
            table.insert(CurrencyCode::Usd, 1.27);
            table.insert(CurrencyCode::Eur, 1.17);
            Ok(table)
        }
    }

    fn script(lines: &[&str]) -> ShellContext {
        process_script(Arc::new(FixedRates), lines).expect("script runs")
    }

    #[test]
    fn walks_through_the_whole_signup() {
        let app = script(&[
            "name \"Ada Lovelace\"",
            "email ada@example.com",
            "phone \"+44 20 7946 0000\"",
            "next",
            "plan pro",
            "billing yearly",
            "next",
            "addon customizable-profile",
            "next",
            "confirm",
        ]);
        let data = app.session.data();
        assert_eq!(app.session.step(), WizardStep::Confirmation);
        assert_eq!(data.name, "Ada Lovelace");
        assert_eq!(data.plan, PlanName::Pro);
        assert!(data.has_addon(AddonName::CustomizableProfile));
    }

    #[test]
    fn invalid_contact_details_keep_the_first_step() {
        let app = script(&["email not-an-email", "next"]);
        assert_eq!(app.session.step(), WizardStep::ContactInfo);
        assert_eq!(app.session.wizard().errors().len(), 3);
    }

    #[test]
    fn currency_switch_applies_rates_after_wait() {
        let app = script(&["currency usd", "wait"]);
        let arcade = app.session.view().plan_box(PlanName::Arcade).expect("arcade box");
        assert_eq!(arcade.price_label, "$11/mo");
    }

    #[test]
    fn unknown_commands_do_not_stop_the_script() {
        let app = script(&["nxet", "exit", "next"]);
        assert!(app.running);
        assert_eq!(app.session.step(), WizardStep::ContactInfo);
    }

    #[test]
    fn wait_survives_an_oversized_request_timeout() {
        let config = SignupConfig {
            request_timeout_secs: u64::MAX,
            ..SignupConfig::default()
        };
        let mut app = ShellContext::with_source(CliMode::Script, config, Arc::new(FixedRates))
            .expect("context");
        app.session.set_currency(CurrencyCode::Usd).expect("switch currency");
        assert_eq!(app.wait_for_rates(None), 1);
    }

    #[test]
    fn help_handles_known_and_unknown_commands() {
        let mut app = script(&[]);
        for line in ["help", "help wait", "help nxet"] {
            assert_eq!(app.process_line(line).expect(line), LoopControl::Continue);
        }
    }

    #[test]
    fn exit_stops_processing() {
        let mut app = script(&[]);
        let control = app.process_line("exit").expect("exit");
        assert_eq!(control, LoopControl::Exit);
    }
}
