use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use crate::{currency::CurrencyCode, errors::SignupError, utils};

pub const DEFAULT_RATES_URL: &str = "https://api.frankfurter.app/latest";
const RATES_URL_ENV: &str = "PLAN_SIGNUP_RATES_URL";
const TEST_MODE_ENV: &str = "PLAN_SIGNUP_TEST_MODE";
/// Upper bound for a single rate request.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Application settings. Read-only at runtime; form state is never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignupConfig {
    pub base_currency: CurrencyCode,
    pub rates_url: String,
    /// How long the "currency unavailable" notice stays up.
    pub notice_seconds: u64,
    pub request_timeout_secs: u64,
    pub test_mode: bool,
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self {
            base_currency: CurrencyCode::Gbp,
            rates_url: DEFAULT_RATES_URL.into(),
            notice_seconds: 3,
            request_timeout_secs: 10,
            test_mode: false,
        }
    }
}

impl SignupConfig {
    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs(self.notice_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.clamp(1, MAX_REQUEST_TIMEOUT_SECS))
    }

    /// Applies `PLAN_SIGNUP_RATES_URL` and `PLAN_SIGNUP_TEST_MODE` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var(RATES_URL_ENV) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.rates_url = trimmed.to_string();
            }
        }
        if let Ok(raw) = env::var(TEST_MODE_ENV) {
            if let Some(flag) = parse_flag(&raw) {
                self.test_mode = flag;
            }
        }
    }

    fn validate(&self) -> Result<(), SignupError> {
        if self.rates_url.trim().is_empty() {
            return Err(SignupError::Config("rates_url cannot be empty".into()));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(SignupError::Config(format!(
                "request_timeout_secs must be at most {}",
                MAX_REQUEST_TIMEOUT_SECS
            )));
        }
        Ok(())
    }
}

pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_path(utils::config_file())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the config file if present, falling back to defaults.
    pub fn load(&self) -> Result<SignupConfig, SignupError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file; using defaults");
            return Ok(SignupConfig::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: SignupConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));
        let config = manager.load().unwrap();
        assert_eq!(config, SignupConfig::default());
        assert_eq!(config.notice_duration(), Duration::from_secs(3));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"base_currency":"EUR","test_mode":true}"#).unwrap();
        let config = ConfigManager::with_path(&path).load().unwrap();
        assert_eq!(config.base_currency, CurrencyCode::Eur);
        assert!(config.test_mode);
        assert_eq!(config.rates_url, DEFAULT_RATES_URL);
    }

    #[test]
    fn empty_rates_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"rates_url":"  "}"#).unwrap();
        let err = ConfigManager::with_path(&path).load().unwrap_err();
        assert!(matches!(err, SignupError::Config(_)));
    }

    #[test]
    fn oversized_request_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"request_timeout_secs":18446744073709551615}"#).unwrap();
        let err = ConfigManager::with_path(&path).load().unwrap_err();
        assert!(
            matches!(err, SignupError::Config(message) if message.contains("request_timeout_secs"))
        );
    }

    #[test]
    fn request_timeout_is_clamped() {
        let mut config = SignupConfig {
            request_timeout_secs: u64::MAX,
            ..SignupConfig::default()
        };
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(MAX_REQUEST_TIMEOUT_SECS)
        );
        config.request_timeout_secs = 0;
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn flags_parse_loosely() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
