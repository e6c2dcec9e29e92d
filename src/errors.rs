use thiserror::Error;

use crate::currency::CurrencyCode;
use crate::wizard::{validator::FieldErrors, WizardStep};

/// Failures raised while loading configuration or building collaborators.
#[derive(Debug, Error)]
pub enum SignupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Reasons an exchange-rate lookup did not produce usable rates.
#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("rate request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rate service returned status {0}")]
    Status(u16),
    #[error("malformed rate payload: {0}")]
    Malformed(String),
}

/// Rejected wizard operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("contact details are incomplete")]
    Validation(FieldErrors),
    #[error("the signup has already been confirmed")]
    Locked,
    #[error("cannot jump forward to the {0} step")]
    ForwardJump(WizardStep),
}

/// Errors surfaced by session-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("{0} is no longer available")]
    CurrencyDisabled(CurrencyCode),
    #[error("test mode is disabled; enable it with `settings test-mode on`")]
    TestModeDisabled,
}
