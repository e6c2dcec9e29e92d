//! Retained view model and the renderer that keeps it in step with the wizard.
//!
//! The view is only ever refreshed in the parts named by a [`RenderScope`];
//! everything else keeps what it showed before.

use tracing::debug;

use crate::currency::CurrencyCode;
use crate::pricing::{
    format_price, AddonName, BillingCadence, ItemName, PlanName, Price, PriceCalculator,
    PricingTable,
};
use crate::rates::ExchangeRates;
use crate::wizard::{ContactField, RenderScope, SignupWizard, WizardStep};

pub const FREE_MONTHS_BADGE: &str = "2 months free";
pub const CHANGE_PLAN_LABEL: &str = "Change";
/// Steps listed in the sidebar; the confirmation step has no entry of its own.
pub const SIDEBAR_STEPS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub number: usize,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepsView {
    pub current: WizardStep,
    pub sidebar: Vec<SidebarEntry>,
    /// Compact "STEP n" counter; hidden once the signup is confirmed.
    pub mobile_indicator: Option<String>,
}

impl StepsView {
    pub fn is_visible(&self, step: WizardStep) -> bool {
        self.current == step
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFieldView {
    pub field: ContactField,
    pub value: String,
    pub error: Option<String>,
}

impl ContactFieldView {
    pub fn is_invalid(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingToggleView {
    pub billing: BillingCadence,
    pub monthly_emphasized: bool,
    pub yearly_emphasized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanBoxView {
    pub plan: PlanName,
    pub price_label: String,
    pub selected: bool,
    pub free_badge: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonRowView {
    pub addon: AddonName,
    pub price_label: String,
    pub checked: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub label: String,
    pub price_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    pub plan_line: SummaryLine,
    pub change_action: &'static str,
    pub addon_lines: Vec<SummaryLine>,
    pub total_label: &'static str,
    pub total: Price,
    pub total_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyOptionView {
    pub code: CurrencyCode,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencySelectorView {
    pub selected: CurrencyCode,
    pub options: Vec<CurrencyOptionView>,
    pub notice: Option<String>,
}

impl CurrencySelectorView {
    pub fn is_enabled(&self, code: CurrencyCode) -> bool {
        self.options
            .iter()
            .any(|option| option.code == code && option.enabled)
    }
}

/// Everything the front end displays.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub steps: StepsView,
    pub contact: Vec<ContactFieldView>,
    pub billing: BillingToggleView,
    pub plans: Vec<PlanBoxView>,
    pub addons: Vec<AddonRowView>,
    /// Built when the summary step is first entered.
    pub summary: Option<SummaryView>,
    pub currency: CurrencySelectorView,
}

impl ViewState {
    pub fn plan_box(&self, plan: PlanName) -> Option<&PlanBoxView> {
        self.plans.iter().find(|view| view.plan == plan)
    }

    pub fn addon_row(&self, addon: AddonName) -> Option<&AddonRowView> {
        self.addons.iter().find(|view| view.addon == addon)
    }

    pub fn contact_field(&self, field: ContactField) -> Option<&ContactFieldView> {
        self.contact.iter().find(|view| view.field == field)
    }
}

/// Inputs the renderer reads; it never mutates any of them.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub wizard: &'a SignupWizard,
    pub pricing: &'a PricingTable,
    pub rates: &'a ExchangeRates,
    pub notice: Option<&'a str>,
    pub currency_locked: bool,
}

impl<'a> RenderContext<'a> {
    fn price(&self, item: impl Into<ItemName>) -> Price {
        let data = self.wizard.data();
        PriceCalculator::new(self.pricing, self.rates).get_price(item, data.billing, data.currency)
    }

    fn price_label(&self, price: Price) -> String {
        let data = self.wizard.data();
        format_price(price, data.billing, data.currency, true)
    }
}

pub struct ViewRenderer;

impl ViewRenderer {
    /// First paint: everything except the summary.
    pub fn initial(ctx: &RenderContext<'_>) -> ViewState {
        ViewState {
            steps: Self::steps(ctx),
            contact: Self::contact(ctx),
            billing: Self::billing(ctx),
            plans: Self::plans(ctx),
            addons: Self::addons(ctx),
            summary: None,
            currency: Self::currency(ctx),
        }
    }

    pub fn render(view: &mut ViewState, scope: RenderScope, ctx: &RenderContext<'_>) {
        if scope.is_empty() {
            return;
        }
        debug!(?scope, "rendering view");
        if scope.steps {
            view.steps = Self::steps(ctx);
        }
        if scope.contact {
            view.contact = Self::contact(ctx);
        }
        if scope.plans {
            view.billing = Self::billing(ctx);
            view.plans = Self::plans(ctx);
        }
        if scope.addons {
            view.addons = Self::addons(ctx);
        }
        if scope.summary {
            view.summary = Some(Self::summary(ctx));
        }
        if scope.currency {
            view.currency = Self::currency(ctx);
        }
    }

    fn steps(ctx: &RenderContext<'_>) -> StepsView {
        let current = ctx.wizard.step();
        let sidebar = WizardStep::ALL
            .iter()
            .take(SIDEBAR_STEPS)
            .map(|step| SidebarEntry {
                number: step.index() + 1,
                label: step.sidebar_label(),
                active: *step == current,
            })
            .collect();
        let mobile_indicator = if current.is_terminal() {
            None
        } else {
            let number = (current.index() + 1).min(SIDEBAR_STEPS);
            Some(format!("STEP {}", number))
        };
        StepsView {
            current,
            sidebar,
            mobile_indicator,
        }
    }

    fn contact(ctx: &RenderContext<'_>) -> Vec<ContactFieldView> {
        let inputs = ctx.wizard.inputs();
        let errors = ctx.wizard.errors();
        ContactField::ALL
            .iter()
            .map(|field| ContactFieldView {
                field: *field,
                value: inputs.get(*field).to_string(),
                error: errors.get(*field).map(str::to_string),
            })
            .collect()
    }

    fn billing(ctx: &RenderContext<'_>) -> BillingToggleView {
        let billing = ctx.wizard.data().billing;
        BillingToggleView {
            billing,
            monthly_emphasized: billing == BillingCadence::Monthly,
            yearly_emphasized: billing == BillingCadence::Yearly,
        }
    }

    fn plans(ctx: &RenderContext<'_>) -> Vec<PlanBoxView> {
        let data = ctx.wizard.data();
        PlanName::ALL
            .iter()
            .map(|plan| PlanBoxView {
                plan: *plan,
                price_label: ctx.price_label(ctx.price(*plan)),
                selected: *plan == data.plan,
                free_badge: (data.billing == BillingCadence::Yearly).then_some(FREE_MONTHS_BADGE),
            })
            .collect()
    }

    fn addons(ctx: &RenderContext<'_>) -> Vec<AddonRowView> {
        let data = ctx.wizard.data();
        AddonName::ALL
            .iter()
            .map(|addon| {
                let selected = data.has_addon(*addon);
                AddonRowView {
                    addon: *addon,
                    price_label: format!("+{}", ctx.price_label(ctx.price(*addon))),
                    checked: selected,
                    highlighted: selected,
                }
            })
            .collect()
    }

    fn summary(ctx: &RenderContext<'_>) -> SummaryView {
        let data = ctx.wizard.data();
        let plan_price = ctx.price(data.plan);
        let mut total = plan_price;
        let mut addon_lines = Vec::with_capacity(data.addons.len());
        for addon in &data.addons {
            let price = ctx.price(*addon);
            total = total + price;
            addon_lines.push(SummaryLine {
                label: addon.to_string(),
                price_label: format!("+{}", ctx.price_label(price)),
            });
        }
        SummaryView {
            plan_line: SummaryLine {
                label: format!("{} ({})", data.plan, data.billing.label()),
                price_label: ctx.price_label(plan_price),
            },
            change_action: CHANGE_PLAN_LABEL,
            addon_lines,
            total_label: data.billing.total_label(),
            total,
            total_text: format!("+{}", ctx.price_label(total)),
        }
    }

    fn currency(ctx: &RenderContext<'_>) -> CurrencySelectorView {
        let base = ctx.rates.base();
        let options = CurrencyCode::ALL
            .iter()
            .map(|code| CurrencyOptionView {
                code: *code,
                enabled: *code == base || !ctx.currency_locked,
            })
            .collect();
        CurrencySelectorView {
            selected: ctx.wizard.data().currency,
            options,
            notice: ctx.notice.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateTable;
    use crate::wizard::AdvanceTrigger;

    fn context<'a>(
        wizard: &'a SignupWizard,
        pricing: &'a PricingTable,
        rates: &'a ExchangeRates,
    ) -> RenderContext<'a> {
        RenderContext {
            wizard,
            pricing,
            rates,
            notice: None,
            currency_locked: false,
        }
    }

    #[test]
    fn initial_view_prices_in_base_currency() {
        let wizard = SignupWizard::new(CurrencyCode::Gbp);
        let pricing = PricingTable::standard();
        let rates = ExchangeRates::new(CurrencyCode::Gbp);
        let view = ViewRenderer::initial(&context(&wizard, &pricing, &rates));

        let arcade = view.plan_box(PlanName::Arcade).unwrap();
        assert_eq!(arcade.price_label, "£9/mo");
        assert!(arcade.selected);
        assert!(arcade.free_badge.is_none());
        assert_eq!(view.addon_row(AddonName::OnlineService).unwrap().price_label, "+£1/mo");
        assert!(view.summary.is_none());
        assert_eq!(view.steps.mobile_indicator.as_deref(), Some("STEP 1"));
    }

    #[test]
    fn yearly_billing_adds_free_badge_and_removes_it_again() {
        let mut wizard = SignupWizard::new(CurrencyCode::Gbp);
        let pricing = PricingTable::standard();
        let rates = ExchangeRates::new(CurrencyCode::Gbp);
        let mut view = ViewRenderer::initial(&context(&wizard, &pricing, &rates));

        let scope = wizard.set_billing(BillingCadence::Yearly).unwrap();
        ViewRenderer::render(&mut view, scope, &context(&wizard, &pricing, &rates));
        let arcade = view.plan_box(PlanName::Arcade).unwrap();
        assert_eq!(arcade.price_label, "£90/yr");
        assert_eq!(arcade.free_badge, Some(FREE_MONTHS_BADGE));
        assert!(view.billing.yearly_emphasized);

        let scope = wizard.set_billing(BillingCadence::Monthly).unwrap();
        ViewRenderer::render(&mut view, scope, &context(&wizard, &pricing, &rates));
        assert!(view.plans.iter().all(|plan| plan.free_badge.is_none()));
    }

    #[test]
    fn summary_total_is_unavailable_when_rate_missing() {
        let mut wizard = SignupWizard::new(CurrencyCode::Gbp);
        let pricing = PricingTable::standard();
        let rates = ExchangeRates::new(CurrencyCode::Gbp);
        wizard.set_currency(CurrencyCode::Eur).unwrap();
        let ctx = context(&wizard, &pricing, &rates);
        let mut view = ViewRenderer::initial(&ctx);
        ViewRenderer::render(&mut view, RenderScope::SUMMARY, &ctx);
        let summary = view.summary.unwrap();
        assert_eq!(summary.total, Price::Unavailable);
        assert_eq!(summary.total_text, "+Loading...");
    }

    #[test]
    fn summary_lists_plan_and_addons() {
        let mut wizard = SignupWizard::new(CurrencyCode::Gbp);
        wizard.set_contact_field(ContactField::Name, "Ada").unwrap();
        wizard.set_contact_field(ContactField::Email, "a@b.co").unwrap();
        wizard.set_contact_field(ContactField::Phone, "1").unwrap();
        let pricing = PricingTable::standard();
        let mut rates = ExchangeRates::new(CurrencyCode::Gbp);
        let mut incoming = RateTable::new();
        incoming.insert(CurrencyCode::Usd, 1.27);
        rates.merge(&incoming);

        let mut view = ViewRenderer::initial(&context(&wizard, &pricing, &rates));
        for _ in 0..3 {
            let scope = wizard.advance(AdvanceTrigger::Next).unwrap();
            ViewRenderer::render(&mut view, scope, &context(&wizard, &pricing, &rates));
        }
        let summary = view.summary.clone().unwrap();
        assert_eq!(summary.plan_line.label, "Arcade (Monthly)");
        assert_eq!(summary.addon_lines.len(), 2);
        assert_eq!(summary.total, Price::Amount(12.0));
        assert_eq!(summary.total_label, "Total (per month)");

        let scope = wizard.set_currency(CurrencyCode::Usd).unwrap();
        ViewRenderer::render(&mut view, scope, &context(&wizard, &pricing, &rates));
        let summary = view.summary.unwrap();
        let total = summary.total.amount().expect("usd total available");
        assert!((total - 12.0 * 1.27).abs() < 1e-9);
        assert_eq!(summary.total_text, "+$15/mo");
    }

    #[test]
    fn locked_selector_only_offers_base() {
        let wizard = SignupWizard::new(CurrencyCode::Gbp);
        let pricing = PricingTable::standard();
        let rates = ExchangeRates::new(CurrencyCode::Gbp);
        let ctx = RenderContext {
            currency_locked: true,
            ..context(&wizard, &pricing, &rates)
        };
        let view = ViewRenderer::initial(&ctx);
        assert!(view.currency.is_enabled(CurrencyCode::Gbp));
        assert!(!view.currency.is_enabled(CurrencyCode::Eur));
        assert!(!view.currency.is_enabled(CurrencyCode::Usd));
    }

    #[test]
    fn mobile_indicator_hidden_after_confirmation() {
        let mut wizard = SignupWizard::new(CurrencyCode::Gbp);
        wizard.set_contact_field(ContactField::Name, "Ada").unwrap();
        wizard.set_contact_field(ContactField::Email, "a@b.co").unwrap();
        wizard.set_contact_field(ContactField::Phone, "1").unwrap();
        wizard.advance(AdvanceTrigger::Confirm).unwrap();
        let pricing = PricingTable::standard();
        let rates = ExchangeRates::new(CurrencyCode::Gbp);
        let view = ViewRenderer::initial(&context(&wizard, &pricing, &rates));
        assert!(view.steps.mobile_indicator.is_none());
        assert!(view.steps.sidebar.iter().all(|entry| !entry.active));
        assert!(view.steps.is_visible(WizardStep::Confirmation));
    }
}
