//! Exchange-rate cache and the provider that keeps it fresh.

pub mod provider;
pub mod source;

use std::collections::BTreeMap;

use crate::currency::CurrencyCode;

pub use provider::{ExchangeRateProvider, FetchTicket, RateEvent};
pub use source::{HttpRateSource, RateSource, RateTable};

/// Last known conversion rates from the base currency.
///
/// The base currency always resolves to `1.0`; other currencies resolve only
/// after a successful fetch has delivered them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRates {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
}

impl ExchangeRates {
    pub fn new(base: CurrencyCode) -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(base, 1.0);
        Self { base, rates }
    }

    pub fn base(&self) -> CurrencyCode {
        self.base
    }

    pub fn rate(&self, currency: CurrencyCode) -> Option<f64> {
        if currency == self.base {
            return Some(1.0);
        }
        self.rates.get(&currency).copied()
    }

    pub fn is_known(&self, currency: CurrencyCode) -> bool {
        self.rate(currency).is_some()
    }

    /// Merges fetched rates into the cache, keeping entries the response omits.
    /// The base entry and non-positive or non-finite rates are ignored.
    pub fn merge(&mut self, incoming: &RateTable) -> usize {
        let mut merged = 0;
        for (code, rate) in incoming {
            if *code == self.base || !rate.is_finite() || *rate <= 0.0 {
                continue;
            }
            self.rates.insert(*code, *rate);
            merged += 1;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_is_always_one() {
        let mut rates = ExchangeRates::new(CurrencyCode::Gbp);
        let mut incoming = RateTable::new();
        incoming.insert(CurrencyCode::Gbp, 2.0);
        rates.merge(&incoming);
        assert_eq!(rates.rate(CurrencyCode::Gbp), Some(1.0));
    }

    #[test]
    fn merge_preserves_missing_entries() {
        let mut rates = ExchangeRates::new(CurrencyCode::Gbp);
        let mut first = RateTable::new();
        first.insert(CurrencyCode::Eur, 1.17);
        first.insert(CurrencyCode::Usd, 1.27);
        rates.merge(&first);

        let mut second = RateTable::new();
        second.insert(CurrencyCode::Usd, 1.30);
        assert_eq!(rates.merge(&second), 1);

        assert_eq!(rates.rate(CurrencyCode::Eur), Some(1.17));
        assert_eq!(rates.rate(CurrencyCode::Usd), Some(1.30));
    }

    #[test]
    fn rejects_nonsense_rates() {
        let mut rates = ExchangeRates::new(CurrencyCode::Gbp);
        let mut incoming = RateTable::new();
        incoming.insert(CurrencyCode::Eur, f64::NAN);
        incoming.insert(CurrencyCode::Usd, -1.0);
        assert_eq!(rates.merge(&incoming), 0);
        assert!(!rates.is_known(CurrencyCode::Eur));
        assert!(!rates.is_known(CurrencyCode::Usd));
    }
}
