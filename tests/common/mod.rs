#![allow(dead_code)]

use std::{collections::VecDeque, sync::Arc, sync::Mutex, time::Duration};

use async_trait::async_trait;
use plan_signup::{
    config::SignupConfig,
    currency::CurrencyCode,
    errors::RateFetchError,
    rates::{RateSource, RateTable},
    session::SignupSession,
    wizard::{AdvanceTrigger, ContactField},
};
use tokio::runtime::Handle;

pub const USD_RATE: f64 = 1.27;
pub const EUR_RATE: f64 = 1.17;

pub fn standard_rates() -> RateTable {
    let mut table = RateTable::new();
    table.insert(CurrencyCode::Usd, USD_RATE);
    table.insert(CurrencyCode::Eur, EUR_RATE);
    table
}

/// Always answers with the same table and records the bases it was asked for.
#[derive(Default)]
pub struct FixedSource {
    pub requested: Mutex<Vec<String>>,
}

#[async_trait]
impl RateSource for FixedSource {
    async fn fetch(
        &self,
        base: &str,
        _targets: &[CurrencyCode],
    ) -> Result<RateTable, RateFetchError> {
        self.requested
            .lock()
            .expect("lock requested bases")
            .push(base.to_string());
        Ok(standard_rates())
    }
}

/// Fails every lookup the way the rate service rejects an unknown base.
pub struct FailingSource;

#[async_trait]
impl RateSource for FailingSource {
    async fn fetch(
        &self,
        _base: &str,
        _targets: &[CurrencyCode],
    ) -> Result<RateTable, RateFetchError> {
        Err(RateFetchError::Status(404))
    }
}

pub enum Reply {
    Rates(f64),
    Fail,
}

/// Replies in the queued order, each after its own delay.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<(Duration, Reply)>>,
}

impl ScriptedSource {
    pub fn new(replies: Vec<(u64, Reply)>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|(millis, reply)| (Duration::from_millis(millis), reply))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl RateSource for ScriptedSource {
    async fn fetch(
        &self,
        _base: &str,
        _targets: &[CurrencyCode],
    ) -> Result<RateTable, RateFetchError> {
        let next = self.replies.lock().expect("lock replies").pop_front();
        let Some((delay, reply)) = next else {
            return Err(RateFetchError::Malformed("no reply queued".into()));
        };
        tokio::time::sleep(delay).await;
        match reply {
            Reply::Rates(usd) => {
                let mut table = RateTable::new();
                table.insert(CurrencyCode::Usd, usd);
                Ok(table)
            }
            Reply::Fail => Err(RateFetchError::Status(422)),
        }
    }
}

/// Session on the current runtime with default settings.
pub fn session_with(source: Arc<dyn RateSource>) -> SignupSession {
    SignupSession::new(&SignupConfig::default(), source, Handle::current())
}

pub fn fill_contact(session: &mut SignupSession) {
    session
        .set_contact_field(ContactField::Name, "Ada Lovelace")
        .expect("set name");
    session
        .set_contact_field(ContactField::Email, "ada@example.com")
        .expect("set email");
    session
        .set_contact_field(ContactField::Phone, "+44 20 7946 0000")
        .expect("set phone");
}

/// Fills the contact step and walks forward to the summary.
pub fn advance_to_summary(session: &mut SignupSession) {
    fill_contact(session);
    for _ in 0..3 {
        session.advance(AdvanceTrigger::Next).expect("advance");
    }
}
