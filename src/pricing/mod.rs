//! Plans, add-ons, billing cadences and the base price table.

pub mod calculator;
pub mod formatter;

use std::{
    collections::HashMap,
    fmt,
    iter::Sum,
    ops::Add,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

pub use calculator::PriceCalculator;
pub use formatter::{format_price, UNAVAILABLE_PLACEHOLDER};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BillingCadence {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCadence {
    pub fn label(self) -> &'static str {
        match self {
            BillingCadence::Monthly => "Monthly",
            BillingCadence::Yearly => "Yearly",
        }
    }

    /// Period suffix appended to formatted prices.
    pub fn suffix(self) -> &'static str {
        match self {
            BillingCadence::Monthly => "mo",
            BillingCadence::Yearly => "yr",
        }
    }

    pub fn total_label(self) -> &'static str {
        match self {
            BillingCadence::Monthly => "Total (per month)",
            BillingCadence::Yearly => "Total (per year)",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            BillingCadence::Monthly => BillingCadence::Yearly,
            BillingCadence::Yearly => BillingCadence::Monthly,
        }
    }
}

impl FromStr for BillingCadence {
    type Err = UnknownItem;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "mo" => Ok(BillingCadence::Monthly),
            "yearly" | "year" | "yr" => Ok(BillingCadence::Yearly),
            _ => Err(UnknownItem::new("billing cadence", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlanName {
    #[default]
    Arcade,
    Advanced,
    Pro,
}

impl PlanName {
    pub const ALL: [PlanName; 3] = [PlanName::Arcade, PlanName::Advanced, PlanName::Pro];

    pub fn as_str(self) -> &'static str {
        match self {
            PlanName::Arcade => "Arcade",
            PlanName::Advanced => "Advanced",
            PlanName::Pro => "Pro",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddonName {
    #[serde(rename = "Online service")]
    OnlineService,
    #[serde(rename = "Larger storage")]
    LargerStorage,
    #[serde(rename = "Customizable Profile")]
    CustomizableProfile,
}

impl AddonName {
    pub const ALL: [AddonName; 3] = [
        AddonName::OnlineService,
        AddonName::LargerStorage,
        AddonName::CustomizableProfile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AddonName::OnlineService => "Online service",
            AddonName::LargerStorage => "Larger storage",
            AddonName::CustomizableProfile => "Customizable Profile",
        }
    }
}

/// Accepts display names case-insensitively, with dashes or underscores standing
/// in for spaces (`larger-storage`).
fn normalize_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|ch| if ch == '-' || ch == '_' { ' ' } else { ch })
        .collect::<String>()
        .to_ascii_lowercase()
}

impl FromStr for PlanName {
    type Err = UnknownItem;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = normalize_label(value);
        Self::ALL
            .iter()
            .copied()
            .find(|plan| plan.as_str().to_ascii_lowercase() == needle)
            .ok_or_else(|| UnknownItem::new("plan", value))
    }
}

impl FromStr for AddonName {
    type Err = UnknownItem;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = normalize_label(value);
        Self::ALL
            .iter()
            .copied()
            .find(|addon| addon.as_str().to_ascii_lowercase() == needle)
            .ok_or_else(|| UnknownItem::new("add-on", value))
    }
}

impl fmt::Display for PlanName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for AddonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Anything with a row in the pricing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemName {
    Plan(PlanName),
    Addon(AddonName),
}

impl From<PlanName> for ItemName {
    fn from(plan: PlanName) -> Self {
        ItemName::Plan(plan)
    }
}

impl From<AddonName> for ItemName {
    fn from(addon: AddonName) -> Self {
        ItemName::Addon(addon)
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemName::Plan(plan) => fmt::Display::fmt(plan, f),
            ItemName::Addon(addon) => fmt::Display::fmt(addon, f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownItem {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownItem {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.trim().to_string(),
        }
    }
}

impl fmt::Display for UnknownItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for UnknownItem {}

/// A converted price, or the marker for a price that cannot be computed yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    Amount(f64),
    Unavailable,
}

impl Price {
    pub fn amount(self) -> Option<f64> {
        match self {
            Price::Amount(value) => Some(value),
            Price::Unavailable => None,
        }
    }
}

impl Add for Price {
    type Output = Price;

    /// `Unavailable` is absorbing: a sum with a missing term is itself missing.
    fn add(self, rhs: Price) -> Price {
        match (self, rhs) {
            (Price::Amount(lhs), Price::Amount(rhs)) => Price::Amount(lhs + rhs),
            _ => Price::Unavailable,
        }
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::Amount(0.0), Add::add)
    }
}

/// Base prices in the base currency, keyed by cadence and item.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    prices: HashMap<(BillingCadence, ItemName), f64>,
}

impl PricingTable {
    pub fn empty() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    /// The published price list. Yearly prices are ten monthly payments.
    pub fn standard() -> Self {
        use AddonName::*;
        use BillingCadence::*;
        use PlanName::*;

        let rows: [(ItemName, f64, f64); 6] = [
            (Arcade.into(), 9.0, 90.0),
            (Advanced.into(), 12.0, 120.0),
            (Pro.into(), 15.0, 150.0),
            (OnlineService.into(), 1.0, 10.0),
            (LargerStorage.into(), 2.0, 20.0),
            (CustomizableProfile.into(), 2.0, 20.0),
        ];
        rows.into_iter()
            .fold(Self::empty(), |table, (item, monthly, yearly)| {
                table
                    .with_price(Monthly, item, monthly)
                    .with_price(Yearly, item, yearly)
            })
    }

    /// Returns the table with `price` set for `(billing, item)`. Negative or
    /// non-finite prices are clamped to zero.
    pub fn with_price(
        mut self,
        billing: BillingCadence,
        item: impl Into<ItemName>,
        price: f64,
    ) -> Self {
        let price = if price.is_finite() { price.max(0.0) } else { 0.0 };
        self.prices.insert((billing, item.into()), price);
        self
    }

    pub fn base_price(&self, billing: BillingCadence, item: impl Into<ItemName>) -> Option<f64> {
        self.prices.get(&(billing, item.into())).copied()
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::standard()
    }
}
