use crate::currency::{format_currency_value, CurrencyCode};

use super::{BillingCadence, Price};

/// Shown wherever a price cannot be computed (rate still loading or never fetched).
pub const UNAVAILABLE_PLACEHOLDER: &str = "Loading...";

/// Formats `value` for display, appending `/mo` or `/yr` when `suffix` is set.
pub fn format_price(
    value: Price,
    billing: BillingCadence,
    currency: CurrencyCode,
    suffix: bool,
) -> String {
    let Price::Amount(amount) = value else {
        return UNAVAILABLE_PLACEHOLDER.to_string();
    };
    let formatted = format_currency_value(amount, currency);
    if suffix {
        format!("{}/{}", formatted, billing.suffix())
    } else {
        formatted
    }
}
