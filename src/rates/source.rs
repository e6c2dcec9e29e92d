//! Where exchange rates come from.

use std::{collections::{BTreeMap, HashMap}, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::currency::CurrencyCode;
use crate::errors::{RateFetchError, SignupError};

/// Rates keyed by target currency, relative to the requested base.
pub type RateTable = BTreeMap<CurrencyCode, f64>;

/// A lookup of conversion rates from `base` into `targets`.
///
/// `base` is a raw code rather than a [`CurrencyCode`] so callers can ask for
/// codes the service will reject.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(
        &self,
        base: &str,
        targets: &[CurrencyCode],
    ) -> Result<RateTable, RateFetchError>;
}

#[derive(Debug, Deserialize)]
struct RatesPayload {
    rates: HashMap<String, f64>,
}

/// Parses a `{"rates": {"EUR": 1.17, ...}}` body. Codes outside the supported
/// set are dropped.
pub fn parse_rates_payload(body: &[u8]) -> Result<RateTable, RateFetchError> {
    let payload: RatesPayload =
        serde_json::from_slice(body).map_err(|err| RateFetchError::Malformed(err.to_string()))?;
    let mut table = RateTable::new();
    for (code, rate) in payload.rates {
        match code.parse::<CurrencyCode>() {
            Ok(currency) => {
                table.insert(currency, rate);
            }
            Err(_) => debug!(%code, "ignoring unsupported currency in rate payload"),
        }
    }
    Ok(table)
}

/// Rate lookup against a frankfurter-style `GET ?from=&to=` endpoint.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: Client,
    endpoint: String,
}

impl HttpRateSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SignupError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

fn join_codes(targets: &[CurrencyCode]) -> String {
    targets
        .iter()
        .map(|code| code.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl RateSource for HttpRateSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch(
        &self,
        base: &str,
        targets: &[CurrencyCode],
    ) -> Result<RateTable, RateFetchError> {
        let to = join_codes(targets);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("from", base), ("to", to.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateFetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let table = parse_rates_payload(&body)?;
        debug!(count = table.len(), "rate payload parsed");
        Ok(table)
    }
}
