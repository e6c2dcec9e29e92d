//! One signup session: owns the wizard, the rate provider and the view, and
//! applies every change on the calling thread.
//!
//! Rate fetches run in the background; their outcomes are picked up by
//! [`SignupSession::sync`] (non-blocking) or [`SignupSession::settle`]
//! (waits for everything outstanding).

use std::{sync::Arc, time::Duration};

use tokio::{runtime::Handle, time::Instant};
use tracing::{debug, info};

use crate::config::SignupConfig;
use crate::currency::CurrencyCode;
use crate::errors::{SessionError, WizardError};
use crate::pricing::{
    AddonName, BillingCadence, ItemName, PlanName, Price, PriceCalculator, PricingTable,
};
use crate::rates::{ExchangeRateProvider, ExchangeRates, FetchTicket, RateEvent, RateSource};
use crate::view::{RenderContext, ViewRenderer, ViewState};
use crate::wizard::{AdvanceTrigger, ContactField, FormData, RenderScope, SignupWizard, WizardStep};

pub const CURRENCY_UNAVAILABLE_NOTICE: &str = "Sorry, currency unavailable.";
/// Base code the rate service rejects; used by the test-mode failure trigger.
pub const INVALID_BASE_CODE: &str = "INVALID";

pub struct SignupSession {
    base: CurrencyCode,
    notice_duration: Duration,
    default_test_mode: bool,
    pricing: PricingTable,
    wizard: SignupWizard,
    provider: ExchangeRateProvider,
    view: ViewState,
    notice_raised_at: Option<Instant>,
    currency_locked: bool,
    test_mode: bool,
}

impl SignupSession {
    pub fn new(config: &SignupConfig, source: Arc<dyn RateSource>, runtime: Handle) -> Self {
        Self::with_pricing(config, PricingTable::standard(), source, runtime)
    }

    pub fn with_pricing(
        config: &SignupConfig,
        pricing: PricingTable,
        source: Arc<dyn RateSource>,
        runtime: Handle,
    ) -> Self {
        let base = config.base_currency;
        let wizard = SignupWizard::new(base);
        let provider = ExchangeRateProvider::new(source, runtime, base);
        let view = ViewRenderer::initial(&RenderContext {
            wizard: &wizard,
            pricing: &pricing,
            rates: provider.rates(),
            notice: None,
            currency_locked: false,
        });
        Self {
            base,
            notice_duration: config.notice_duration(),
            default_test_mode: config.test_mode,
            pricing,
            wizard,
            provider,
            view,
            notice_raised_at: None,
            currency_locked: false,
            test_mode: config.test_mode,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn wizard(&self) -> &SignupWizard {
        &self.wizard
    }

    pub fn data(&self) -> &FormData {
        self.wizard.data()
    }

    pub fn step(&self) -> WizardStep {
        self.wizard.step()
    }

    pub fn rates(&self) -> &ExchangeRates {
        self.provider.rates()
    }

    pub fn base_currency(&self) -> CurrencyCode {
        self.base
    }

    pub fn pending_fetches(&self) -> usize {
        self.provider.pending()
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// The transient notice text, while it is showing.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice_raised_at.map(|_| CURRENCY_UNAVAILABLE_NOTICE)
    }

    /// True once a failed lookup has taken every non-base currency out of service.
    pub fn currency_locked(&self) -> bool {
        self.currency_locked
    }

    /// Price of `item` under the current billing cadence and display currency.
    pub fn price_of(&self, item: impl Into<ItemName>) -> Price {
        let data = self.wizard.data();
        PriceCalculator::new(&self.pricing, self.provider.rates()).get_price(
            item,
            data.billing,
            data.currency,
        )
    }

    pub fn advance(&mut self, trigger: AdvanceTrigger) -> Result<(), SessionError> {
        match self.wizard.advance(trigger) {
            Ok(scope) => {
                self.render(scope);
                Ok(())
            }
            Err(err @ WizardError::Validation(_)) => {
                self.render(RenderScope::CONTACT);
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn retreat(&mut self) {
        let scope = self.wizard.retreat();
        self.render(scope);
    }

    pub fn change_plan(&mut self) -> Result<(), SessionError> {
        let scope = self.wizard.change_plan()?;
        self.render(scope);
        Ok(())
    }

    pub fn select_plan(&mut self, plan: PlanName) -> Result<(), SessionError> {
        let scope = self.wizard.set_plan(plan)?;
        self.render(scope);
        Ok(())
    }

    pub fn toggle_addon(&mut self, addon: AddonName) -> Result<(), SessionError> {
        let scope = self.wizard.toggle_addon(addon)?;
        self.render(scope);
        Ok(())
    }

    pub fn set_billing(&mut self, billing: BillingCadence) -> Result<(), SessionError> {
        let scope = self.wizard.set_billing(billing)?;
        self.render(scope);
        Ok(())
    }

    pub fn set_contact_field(
        &mut self,
        field: ContactField,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        let scope = self.wizard.set_contact_field(field, value)?;
        self.render(scope);
        Ok(())
    }

    /// Switches the display currency. Prices re-render immediately from cached
    /// rates (or show the placeholder) and, for a non-base currency, a fresh
    /// lookup starts in the background.
    pub fn set_currency(
        &mut self,
        currency: CurrencyCode,
    ) -> Result<Option<FetchTicket>, SessionError> {
        if self.currency_locked && currency != self.base {
            return Err(SessionError::CurrencyDisabled(currency));
        }
        let scope = self.wizard.set_currency(currency)?;
        self.render(scope);
        if currency == self.base {
            return Ok(None);
        }
        Ok(Some(self.provider.fetch_rates()))
    }

    pub fn set_test_mode(&mut self, enabled: bool) {
        info!(enabled, "test mode toggled");
        self.test_mode = enabled;
    }

    /// Issues a lookup the rate service will reject, to exercise the failure path.
    pub fn force_rate_error(&mut self) -> Result<FetchTicket, SessionError> {
        if !self.test_mode {
            return Err(SessionError::TestModeDisabled);
        }
        Ok(self.provider.fetch_with_base(INVALID_BASE_CODE))
    }

    /// Starts over: fresh selections, rates, currency availability and view.
    pub fn reset(&mut self) {
        info!("session reset");
        self.wizard = SignupWizard::new(self.base);
        self.provider.reset();
        self.notice_raised_at = None;
        self.currency_locked = false;
        self.test_mode = self.default_test_mode;
        self.view = ViewRenderer::initial(&RenderContext {
            wizard: &self.wizard,
            pricing: &self.pricing,
            rates: self.provider.rates(),
            notice: None,
            currency_locked: false,
        });
    }

    /// Applies every rate outcome that has already arrived and expires the
    /// notice if its time is up. Never blocks. Returns the number of outcomes applied.
    pub fn sync(&mut self) -> usize {
        let events = self.provider.poll_events();
        let applied = events.len();
        for event in events {
            self.handle_rate_event(event);
        }
        self.tick();
        applied
    }

    /// Waits for every outstanding fetch and applies the outcomes.
    pub async fn settle(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.provider.next_event().await {
            self.handle_rate_event(event);
            applied += 1;
        }
        self.tick();
        applied
    }

    /// Removes the notice once it has been up for the configured duration, and
    /// from then on disables every non-base currency.
    pub fn tick(&mut self) {
        let Some(raised_at) = self.notice_raised_at else {
            return;
        };
        if raised_at.elapsed() < self.notice_duration {
            return;
        }
        debug!("currency notice dismissed; disabling non-base currencies");
        self.notice_raised_at = None;
        self.currency_locked = true;
        self.render(RenderScope::CURRENCY);
    }

    fn handle_rate_event(&mut self, event: RateEvent) {
        match event {
            RateEvent::Updated { .. } => {
                let mut scope = RenderScope::PLANS | RenderScope::ADDONS;
                if self.wizard.step() == WizardStep::Summary {
                    scope = scope | RenderScope::SUMMARY;
                }
                self.render(scope);
            }
            RateEvent::Failed { ticket, error } => {
                info!(%ticket, %error, base = %self.base, "falling back to base currency");
                let scope = self.wizard.fall_back_currency(self.base);
                self.notice_raised_at = Some(Instant::now());
                self.render(scope | RenderScope::CURRENCY);
            }
        }
    }

    fn render(&mut self, scope: RenderScope) {
        let ctx = RenderContext {
            wizard: &self.wizard,
            pricing: &self.pricing,
            rates: self.provider.rates(),
            notice: self.notice_raised_at.map(|_| CURRENCY_UNAVAILABLE_NOTICE),
            currency_locked: self.currency_locked,
        };
        ViewRenderer::render(&mut self.view, scope, &ctx);
    }
}
