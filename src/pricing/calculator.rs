use crate::currency::CurrencyCode;
use crate::rates::ExchangeRates;

use super::{BillingCadence, ItemName, Price, PricingTable};

/// Converts base-currency list prices into a display currency.
///
/// Holds borrowed snapshots only; every call reads the rates as they are now.
#[derive(Debug, Clone, Copy)]
pub struct PriceCalculator<'a> {
    table: &'a PricingTable,
    rates: &'a ExchangeRates,
}

impl<'a> PriceCalculator<'a> {
    pub fn new(table: &'a PricingTable, rates: &'a ExchangeRates) -> Self {
        Self { table, rates }
    }

    /// `base price * rate`, or `Unavailable` when either factor is unknown.
    pub fn get_price(
        &self,
        item: impl Into<ItemName>,
        billing: BillingCadence,
        currency: CurrencyCode,
    ) -> Price {
        let Some(base_price) = self.table.base_price(billing, item) else {
            return Price::Unavailable;
        };
        match self.rates.rate(currency) {
            Some(rate) => Price::Amount(base_price * rate),
            None => Price::Unavailable,
        }
    }
}
