#![doc(test(attr(deny(warnings))))]

//! Plan Signup drives a multi-step subscription signup: contact details, a plan,
//! optional add-ons and a billing cadence, priced in a display currency whose
//! exchange rate is looked up on demand.

pub mod cli;
pub mod config;
pub mod currency;
pub mod errors;
pub mod pricing;
pub mod rates;
pub mod session;
pub mod utils;
pub mod view;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Plan Signup tracing initialized.");
    });
}
