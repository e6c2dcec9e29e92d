//! Supported display currencies and their locale-specific rendering.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// ISO 4217 codes the signup can display prices in.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum CurrencyCode {
    #[default]
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "USD")]
    Usd,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 3] = [CurrencyCode::Gbp, CurrencyCode::Eur, CurrencyCode::Usd];

    pub fn as_str(self) -> &'static str {
        match self {
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Usd => "USD",
        }
    }

    /// Locale pairing used when rendering amounts in this currency.
    pub fn settings(self) -> CurrencySettings {
        match self {
            CurrencyCode::Gbp => CurrencySettings {
                locale: "en-GB",
                symbol: "£",
                placement: SymbolPlacement::Prefix,
                grouping_separator: ',',
            },
            CurrencyCode::Eur => CurrencySettings {
                locale: "de-DE",
                symbol: "€",
                placement: SymbolPlacement::Suffix,
                grouping_separator: '.',
            },
            CurrencyCode::Usd => CurrencySettings {
                locale: "en-US",
                symbol: "$",
                placement: SymbolPlacement::Prefix,
                grouping_separator: ',',
            },
        }
    }

    /// Every supported currency other than `base`, in declaration order.
    pub fn others(base: CurrencyCode) -> Vec<CurrencyCode> {
        Self::ALL
            .iter()
            .copied()
            .filter(|code| *code != base)
            .collect()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCurrency(pub String);

impl fmt::Display for UnknownCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported currency `{}` (expected GBP, EUR or USD)", self.0)
    }
}

impl std::error::Error for UnknownCurrency {}

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == normalized)
            .ok_or_else(|| UnknownCurrency(value.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPlacement {
    Prefix,
    Suffix,
}

/// Locale-aware formatting preferences for a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencySettings {
    pub locale: &'static str,
    pub symbol: &'static str,
    pub placement: SymbolPlacement,
    pub grouping_separator: char,
}

/// Renders `amount` with no fractional digits using the locale paired with `code`.
///
/// Halves round away from zero. Suffixed symbols are separated by a no-break
/// space, matching the de-DE convention.
pub fn format_currency_value(amount: f64, code: CurrencyCode) -> String {
    let settings = code.settings();
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let body = group_digits(&digits, settings.grouping_separator);
    let sign = if negative { "-" } else { "" };
    match settings.placement {
        SymbolPlacement::Prefix => format!("{}{}{}", sign, settings.symbol, body),
        SymbolPlacement::Suffix => format!("{}{}\u{a0}{}", sign, body, settings.symbol),
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}
