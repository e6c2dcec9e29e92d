//! Asynchronous exchange-rate fetching with request sequencing.
//!
//! Fetches run on a tokio runtime while the caller keeps working with the
//! cached rates. Outcomes travel back over a channel and are only applied when
//! the owner drains them, so the cache is never touched from another thread.
//!
//! Each fetch gets a ticket. Successful responses older than the last applied
//! one are dropped, and a failure counts only if no newer request has been
//! issued since.

use std::{fmt, sync::Arc};

use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, info, warn};

use crate::currency::CurrencyCode;
use crate::errors::RateFetchError;

use super::{ExchangeRates, RateSource, RateTable};

/// Identifies one fetch request; later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Applied result of a fetch, handed to the caller.
#[derive(Debug)]
pub enum RateEvent {
    /// Rates were merged into the cache.
    Updated { ticket: FetchTicket, merged: usize },
    /// The newest request failed; the cache is unchanged.
    Failed {
        ticket: FetchTicket,
        error: RateFetchError,
    },
}

struct FetchOutcome {
    ticket: FetchTicket,
    result: Result<RateTable, RateFetchError>,
}

pub struct ExchangeRateProvider {
    source: Arc<dyn RateSource>,
    runtime: Handle,
    rates: ExchangeRates,
    issued: u64,
    applied: u64,
    in_flight: usize,
    outcomes_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl ExchangeRateProvider {
    pub fn new(source: Arc<dyn RateSource>, runtime: Handle, base: CurrencyCode) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            source,
            runtime,
            rates: ExchangeRates::new(base),
            issued: 0,
            applied: 0,
            in_flight: 0,
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn rates(&self) -> &ExchangeRates {
        &self.rates
    }

    pub fn base(&self) -> CurrencyCode {
        self.rates.base()
    }

    /// Number of fetches whose outcome has not been drained yet.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Starts a fetch from the configured base into every other supported currency.
    pub fn fetch_rates(&mut self) -> FetchTicket {
        let base = self.base().as_str().to_string();
        self.fetch_with_base(base)
    }

    /// Starts a fetch using an arbitrary base code. Used to exercise the failure
    /// path with a code the rate service rejects.
    pub fn fetch_with_base(&mut self, base: impl Into<String>) -> FetchTicket {
        self.issued += 1;
        let ticket = FetchTicket(self.issued);
        let base = base.into();
        let targets = CurrencyCode::others(self.base());
        let source = Arc::clone(&self.source);
        let tx = self.outcomes_tx.clone();
        self.in_flight += 1;

        debug!(%ticket, %base, "starting rate fetch");
        self.runtime.spawn(async move {
            let result = source.fetch(&base, &targets).await;
            // The receiver lives as long as the provider; a send error means it is gone.
            let _ = tx.send(FetchOutcome { ticket, result });
        });
        ticket
    }

    /// Applies every outcome that has already arrived, without waiting.
    pub fn poll_events(&mut self) -> Vec<RateEvent> {
        let mut events = Vec::new();
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            if let Some(event) = self.apply(outcome) {
                events.push(event);
            }
        }
        events
    }

    /// Waits for the next applicable outcome. Returns `None` once nothing is in flight.
    pub async fn next_event(&mut self) -> Option<RateEvent> {
        while self.in_flight > 0 {
            let outcome = self.outcomes_rx.recv().await?;
            self.in_flight -= 1;
            if let Some(event) = self.apply(outcome) {
                return Some(event);
            }
        }
        None
    }

    /// Forgets every cached rate and invalidates all outstanding requests.
    pub fn reset(&mut self) {
        self.rates = ExchangeRates::new(self.base());
        self.applied = self.issued;
    }

    fn apply(&mut self, outcome: FetchOutcome) -> Option<RateEvent> {
        let FetchOutcome { ticket, result } = outcome;
        match result {
            Ok(table) => {
                if ticket.0 <= self.applied {
                    debug!(%ticket, applied = self.applied, "discarding stale rate response");
                    return None;
                }
                self.applied = ticket.0;
                let merged = self.rates.merge(&table);
                info!(%ticket, merged, "exchange rates updated");
                Some(RateEvent::Updated { ticket, merged })
            }
            Err(error) => {
                if ticket.0 != self.issued || ticket.0 <= self.applied {
                    debug!(%ticket, %error, "discarding superseded rate failure");
                    return None;
                }
                self.applied = ticket.0;
                warn!(%ticket, %error, "failed to fetch exchange rates");
                Some(RateEvent::Failed { ticket, error })
            }
        }
    }
}

impl fmt::Debug for ExchangeRateProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeRateProvider")
            .field("rates", &self.rates)
            .field("issued", &self.issued)
            .field("applied", &self.applied)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}
