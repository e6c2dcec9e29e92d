//! The signup wizard: current step, in-progress selections, and the
//! transitions between steps.
//!
//! Every operation reports the [`RenderScope`] it invalidated so the caller can
//! refresh exactly those parts of the view.

pub mod validator;

use std::{collections::BTreeSet, fmt, ops::BitOr};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::currency::CurrencyCode;
use crate::errors::WizardError;
use crate::pricing::{AddonName, BillingCadence, PlanName};

use validator::{validate_contact, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    ContactInfo,
    Plan,
    Addons,
    Summary,
    Confirmation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::ContactInfo,
        WizardStep::Plan,
        WizardStep::Addons,
        WizardStep::Summary,
        WizardStep::Confirmation,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(self)
    }

    pub fn previous(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(self)
    }

    pub fn is_terminal(self) -> bool {
        self == WizardStep::Confirmation
    }

    /// Heading shown above the step.
    pub fn title(self) -> &'static str {
        match self {
            WizardStep::ContactInfo => "Personal info",
            WizardStep::Plan => "Select your plan",
            WizardStep::Addons => "Pick add-ons",
            WizardStep::Summary => "Finishing up",
            WizardStep::Confirmation => "Thank you!",
        }
    }

    /// Short label used in the step sidebar.
    pub fn sidebar_label(self) -> &'static str {
        match self {
            WizardStep::ContactInfo => "YOUR INFO",
            WizardStep::Plan => "SELECT PLAN",
            WizardStep::Addons => "ADD-ONS",
            WizardStep::Summary | WizardStep::Confirmation => "SUMMARY",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::ContactInfo => "contact info",
            WizardStep::Plan => "plan",
            WizardStep::Addons => "add-ons",
            WizardStep::Summary => "summary",
            WizardStep::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactField {
    Name,
    Email,
    Phone,
}

impl ContactField {
    pub const ALL: [ContactField; 3] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContactField::Name => "Name",
            ContactField::Email => "Email Address",
            ContactField::Phone => "Phone Number",
        }
    }
}

/// Raw contact values as typed, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInputs {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ContactInputs {
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
        }
    }

    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
        };
        *slot = value.into();
    }
}

/// Everything the user has chosen so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan: PlanName,
    pub billing: BillingCadence,
    pub currency: CurrencyCode,
    pub addons: BTreeSet<AddonName>,
}

impl FormData {
    pub fn new(base_currency: CurrencyCode) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            plan: PlanName::Arcade,
            billing: BillingCadence::Monthly,
            currency: base_currency,
            addons: [AddonName::OnlineService, AddonName::LargerStorage]
                .into_iter()
                .collect(),
        }
    }

    pub fn has_addon(&self, addon: AddonName) -> bool {
        self.addons.contains(&addon)
    }
}

/// How the user asked to move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceTrigger {
    Next,
    /// The control labelled "Confirm": goes straight to the confirmation step.
    Confirm,
}

/// Parts of the view invalidated by an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderScope {
    pub steps: bool,
    pub contact: bool,
    pub plans: bool,
    pub addons: bool,
    pub summary: bool,
    pub currency: bool,
}

impl RenderScope {
    pub const NONE: RenderScope = RenderScope {
        steps: false,
        contact: false,
        plans: false,
        addons: false,
        summary: false,
        currency: false,
    };
    pub const STEPS: RenderScope = RenderScope { steps: true, ..Self::NONE };
    pub const CONTACT: RenderScope = RenderScope { contact: true, ..Self::NONE };
    pub const PLANS: RenderScope = RenderScope { plans: true, ..Self::NONE };
    pub const ADDONS: RenderScope = RenderScope { addons: true, ..Self::NONE };
    pub const SUMMARY: RenderScope = RenderScope { summary: true, ..Self::NONE };
    pub const CURRENCY: RenderScope = RenderScope { currency: true, ..Self::NONE };
    pub const ALL: RenderScope = RenderScope {
        steps: true,
        contact: true,
        plans: true,
        addons: true,
        summary: true,
        currency: true,
    };

    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

impl BitOr for RenderScope {
    type Output = RenderScope;

    fn bitor(self, rhs: RenderScope) -> RenderScope {
        RenderScope {
            steps: self.steps || rhs.steps,
            contact: self.contact || rhs.contact,
            plans: self.plans || rhs.plans,
            addons: self.addons || rhs.addons,
            summary: self.summary || rhs.summary,
            currency: self.currency || rhs.currency,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignupWizard {
    step: WizardStep,
    data: FormData,
    inputs: ContactInputs,
    errors: FieldErrors,
}

impl SignupWizard {
    pub fn new(base_currency: CurrencyCode) -> Self {
        Self {
            step: WizardStep::ContactInfo,
            data: FormData::new(base_currency),
            inputs: ContactInputs::default(),
            errors: FieldErrors::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn inputs(&self) -> &ContactInputs {
        &self.inputs
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Selections may change until the signup is confirmed.
    pub fn is_editable(&self) -> bool {
        !self.step.is_terminal()
    }

    /// Moves forward one step, or to the confirmation step for
    /// [`AdvanceTrigger::Confirm`]. Leaving the contact step requires every
    /// contact field to validate; on success the raw inputs are committed.
    pub fn advance(&mut self, trigger: AdvanceTrigger) -> Result<RenderScope, WizardError> {
        if self.step.is_terminal() {
            return Ok(RenderScope::NONE);
        }
        if self.step == WizardStep::ContactInfo {
            self.errors = validate_contact(&self.inputs);
            if !self.errors.is_empty() {
                debug!(invalid = self.errors.len(), "contact validation failed");
                return Err(WizardError::Validation(self.errors.clone()));
            }
            self.commit_contact();
        }
        let target = match trigger {
            AdvanceTrigger::Next => self.step.next(),
            AdvanceTrigger::Confirm => WizardStep::Confirmation,
        };
        Ok(self.enter(target))
    }

    pub fn retreat(&mut self) -> RenderScope {
        if self.step == WizardStep::ContactInfo || self.step.is_terminal() {
            return RenderScope::NONE;
        }
        self.enter(self.step.previous())
    }

    /// Returns to an earlier (or the current) step.
    pub fn jump_to(&mut self, step: WizardStep) -> Result<RenderScope, WizardError> {
        self.ensure_editable()?;
        if step > self.step {
            return Err(WizardError::ForwardJump(step));
        }
        if step == self.step {
            return Ok(RenderScope::NONE);
        }
        Ok(self.enter(step))
    }

    /// The summary's "Change" affordance.
    pub fn change_plan(&mut self) -> Result<RenderScope, WizardError> {
        self.jump_to(WizardStep::Plan)
    }

    pub fn set_plan(&mut self, plan: PlanName) -> Result<RenderScope, WizardError> {
        self.ensure_editable()?;
        self.data.plan = plan;
        Ok(self.with_summary(RenderScope::PLANS))
    }

    /// Adds the add-on when absent, removes it when present.
    pub fn toggle_addon(&mut self, addon: AddonName) -> Result<RenderScope, WizardError> {
        self.ensure_editable()?;
        if !self.data.addons.remove(&addon) {
            self.data.addons.insert(addon);
        }
        Ok(self.with_summary(RenderScope::ADDONS))
    }

    pub fn set_billing(&mut self, billing: BillingCadence) -> Result<RenderScope, WizardError> {
        self.ensure_editable()?;
        self.data.billing = billing;
        Ok(self.with_summary(RenderScope::PLANS | RenderScope::ADDONS))
    }

    pub fn set_currency(&mut self, currency: CurrencyCode) -> Result<RenderScope, WizardError> {
        self.ensure_editable()?;
        Ok(self.apply_currency(currency))
    }

    pub fn set_contact_field(
        &mut self,
        field: ContactField,
        value: impl Into<String>,
    ) -> Result<RenderScope, WizardError> {
        self.ensure_editable()?;
        self.inputs.set(field, value);
        Ok(RenderScope::CONTACT)
    }

    /// Switches back to `base` after a failed rate lookup. Applies even after
    /// confirmation so displayed prices never reference an unusable currency.
    pub(crate) fn fall_back_currency(&mut self, base: CurrencyCode) -> RenderScope {
        self.apply_currency(base)
    }

    fn apply_currency(&mut self, currency: CurrencyCode) -> RenderScope {
        self.data.currency = currency;
        self.with_summary(RenderScope::PLANS | RenderScope::ADDONS | RenderScope::CURRENCY)
    }

    fn commit_contact(&mut self) {
        self.data.name = self.inputs.name.clone();
        self.data.email = self.inputs.email.clone();
        self.data.phone = self.inputs.phone.clone();
    }

    fn enter(&mut self, target: WizardStep) -> RenderScope {
        info!(from = %self.step, to = %target, "wizard step changed");
        self.step = target;
        let mut scope = RenderScope::STEPS;
        match target {
            WizardStep::Addons => scope = scope | RenderScope::ADDONS,
            WizardStep::Summary => scope = scope | RenderScope::SUMMARY,
            _ => {}
        }
        scope
    }

    fn with_summary(&self, scope: RenderScope) -> RenderScope {
        if self.step == WizardStep::Summary {
            scope | RenderScope::SUMMARY
        } else {
            scope
        }
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(WizardError::Locked)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> SignupWizard {
        let mut wizard = SignupWizard::new(CurrencyCode::Gbp);
        wizard.set_contact_field(ContactField::Name, "Ada").unwrap();
        wizard.set_contact_field(ContactField::Email, "a@b.co").unwrap();
        wizard.set_contact_field(ContactField::Phone, "+44 20 7946 0000").unwrap();
        wizard
    }

    #[test]
    fn defaults_match_initial_form() {
        let wizard = SignupWizard::new(CurrencyCode::Gbp);
        let data = wizard.data();
        assert_eq!(wizard.step(), WizardStep::ContactInfo);
        assert_eq!(data.plan, PlanName::Arcade);
        assert_eq!(data.billing, BillingCadence::Monthly);
        assert_eq!(data.currency, CurrencyCode::Gbp);
        assert!(data.has_addon(AddonName::OnlineService));
        assert!(data.has_addon(AddonName::LargerStorage));
        assert!(!data.has_addon(AddonName::CustomizableProfile));
    }

    #[test]
    fn each_empty_contact_field_blocks_advance() {
        for field in ContactField::ALL {
            let mut wizard = filled();
            wizard.set_contact_field(field, "").unwrap();
            let err = wizard.advance(AdvanceTrigger::Next).unwrap_err();
            match err {
                WizardError::Validation(errors) => assert!(errors.get(field).is_some()),
                other => panic!("expected validation error, got {other:?}"),
            }
            assert_eq!(wizard.step(), WizardStep::ContactInfo);
        }
    }

    #[test]
    fn valid_contact_commits_and_advances() {
        let mut wizard = filled();
        let scope = wizard.advance(AdvanceTrigger::Next).unwrap();
        assert!(scope.steps);
        assert_eq!(wizard.step(), WizardStep::Plan);
        assert_eq!(wizard.data().email, "a@b.co");
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn revalidation_clears_previous_errors() {
        let mut wizard = filled();
        wizard.set_contact_field(ContactField::Email, "nope").unwrap();
        assert!(wizard.advance(AdvanceTrigger::Next).is_err());
        assert!(wizard.errors().get(ContactField::Email).is_some());
        wizard.set_contact_field(ContactField::Email, "a@b.co").unwrap();
        wizard.advance(AdvanceTrigger::Next).unwrap();
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn retreat_at_first_step_is_noop() {
        let mut wizard = SignupWizard::new(CurrencyCode::Gbp);
        assert!(wizard.retreat().is_empty());
        assert_eq!(wizard.step(), WizardStep::ContactInfo);
    }

    #[test]
    fn confirm_jumps_to_terminal_and_advance_is_then_noop() {
        let mut wizard = filled();
        wizard.advance(AdvanceTrigger::Next).unwrap();
        wizard.advance(AdvanceTrigger::Confirm).unwrap();
        assert_eq!(wizard.step(), WizardStep::Confirmation);
        assert!(wizard.advance(AdvanceTrigger::Next).unwrap().is_empty());
        assert!(wizard.retreat().is_empty());
        assert_eq!(wizard.step(), WizardStep::Confirmation);
        assert_eq!(wizard.set_plan(PlanName::Pro), Err(WizardError::Locked));
    }

    #[test]
    fn entering_summary_requests_summary_render() {
        let mut wizard = filled();
        wizard.advance(AdvanceTrigger::Next).unwrap();
        let scope = wizard.advance(AdvanceTrigger::Next).unwrap();
        assert!(scope.addons);
        let scope = wizard.advance(AdvanceTrigger::Next).unwrap();
        assert!(scope.summary);
        assert_eq!(wizard.step(), WizardStep::Summary);
    }

    #[test]
    fn change_plan_returns_to_plan_step_only_backwards() {
        let mut wizard = filled();
        assert_eq!(
            wizard.jump_to(WizardStep::Summary),
            Err(WizardError::ForwardJump(WizardStep::Summary))
        );
        for _ in 0..3 {
            wizard.advance(AdvanceTrigger::Next).unwrap();
        }
        wizard.change_plan().unwrap();
        assert_eq!(wizard.step(), WizardStep::Plan);
    }

    #[test]
    fn double_toggle_restores_addons() {
        let mut wizard = SignupWizard::new(CurrencyCode::Gbp);
        let before = wizard.data().addons.clone();
        for addon in AddonName::ALL {
            wizard.toggle_addon(addon).unwrap();
            wizard.toggle_addon(addon).unwrap();
            assert_eq!(wizard.data().addons, before);
        }
    }

    #[test]
    fn price_mutations_on_summary_include_summary() {
        let mut wizard = filled();
        assert!(!wizard.set_billing(BillingCadence::Yearly).unwrap().summary);
        for _ in 0..3 {
            wizard.advance(AdvanceTrigger::Next).unwrap();
        }
        let scope = wizard.toggle_addon(AddonName::OnlineService).unwrap();
        assert!(scope.summary && scope.addons && !scope.plans);
        let scope = wizard.set_currency(CurrencyCode::Usd).unwrap();
        assert!(scope.summary && scope.plans && scope.addons && scope.currency);
    }
}
