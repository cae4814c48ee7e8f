//! SDK configuration.
//!
//! [`AgentrixConfig`] is the constructor input of [`crate::Agentrix`]. It can
//! be built in code, deserialized, or read from `<PREFIX>_*` environment
//! variables for a given [`Brand`].
//!
//! # Environment Variables
//!
//! - `<PREFIX>_API_KEY` - API key (required)
//! - `<PREFIX>_BASE_URL` - Override the brand's default base URL
//! - `<PREFIX>_TIMEOUT_SECS` - Per-attempt timeout in seconds (default: `30`)
//! - `<PREFIX>_RETRIES` - Total attempts per call (default: `3`)
//! - `<PREFIX>_WEBHOOK_SECRET` - Enables webhook verification
//!
//! A numeric variable that is set but does not parse is a validation error,
//! not a silent fallback to the default.

use std::time::Duration;

use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};

use crate::brand::Brand;
use crate::error::{Result, ValidationError};

/// Configuration for [`crate::Agentrix`] and [`crate::HttpClient`].
#[serde_as]
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentrixConfig {
    /// API key sent as a bearer token.
    pub api_key: String,

    /// Base URL overriding the brand default.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-attempt request timeout (default: 30 seconds).
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Total attempts per call (default: 3).
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Unit of the exponential backoff between attempts (default: 1 second).
    #[serde(skip, default = "default_backoff_unit")]
    pub backoff_unit: Duration,

    /// Whether 4xx responses are retried (default: `true`).
    #[serde(default = "default_retry_client_errors")]
    pub retry_client_errors: bool,

    /// Secret enabling [`crate::WebhookHandler`].
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Product branding.
    #[serde(skip)]
    pub brand: Brand,
}

const fn default_timeout() -> Duration {
    AgentrixConfig::DEFAULT_TIMEOUT
}

const fn default_retries() -> u32 {
    AgentrixConfig::DEFAULT_RETRIES
}

const fn default_backoff_unit() -> Duration {
    AgentrixConfig::DEFAULT_BACKOFF_UNIT
}

const fn default_retry_client_errors() -> bool {
    true
}

impl AgentrixConfig {
    /// Default per-attempt timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default number of attempts per call.
    pub const DEFAULT_RETRIES: u32 = 3;

    /// Default backoff unit.
    pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

    /// Creates a configuration with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: Self::DEFAULT_TIMEOUT,
            retries: Self::DEFAULT_RETRIES,
            backoff_unit: Self::DEFAULT_BACKOFF_UNIT,
            retry_client_errors: true,
            webhook_secret: None,
            brand: Brand::default(),
        }
    }

    /// Reads the configuration from `<PREFIX>_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `<PREFIX>_API_KEY` is not set, or if a
    /// numeric variable is set but is not a non-negative integer.
    pub fn from_env(brand: Brand) -> Result<Self> {
        let key_var = brand.env_var("API_KEY");
        let api_key = std::env::var(&key_var)
            .map_err(|_| ValidationError::new(format!("{key_var} is not set")))?;
        Self::new(api_key).with_brand(brand).merge_env()
    }

    /// Overlays the optional `<PREFIX>_*` variables of this configuration's
    /// brand: base URL, timeout, attempts and webhook secret.
    ///
    /// The API key is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a numeric variable is set but is not a
    /// non-negative integer.
    pub fn merge_env(mut self) -> Result<Self> {
        let brand = self.brand;
        if let Ok(url) = std::env::var(brand.env_var("BASE_URL")) {
            self.base_url = Some(url);
        }
        if let Some(secs) = env_number(&brand.env_var("TIMEOUT_SECS"))? {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = env_number(&brand.env_var("RETRIES"))? {
            self.retries = retries;
        }
        if let Ok(secret) = std::env::var(brand.env_var("WEBHOOK_SECRET")) {
            self.webhook_secret = Some(secret);
        }
        Ok(self)
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the total number of attempts per call.
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the backoff unit.
    #[must_use]
    pub const fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Controls whether 4xx responses are retried.
    #[must_use]
    pub const fn with_retry_client_errors(mut self, retry: bool) -> Self {
        self.retry_client_errors = retry;
        self
    }

    /// Sets the webhook secret.
    #[must_use]
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Sets the brand.
    #[must_use]
    pub const fn with_brand(mut self, brand: Brand) -> Self {
        self.brand = brand;
        self
    }

    /// Returns the effective base URL: the override or the brand default.
    #[must_use]
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(self.brand.default_base_url)
    }
}

/// Reads an optional numeric variable; set but unparseable is an error.
fn env_number<T: std::str::FromStr>(var: &str) -> Result<Option<T>> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            ValidationError::new(format!("{var} must be a non-negative integer")).into()
        }),
        Err(_) => Ok(None),
    }
}

impl std::fmt::Debug for AgentrixConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentrixConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("backoff_unit", &self.backoff_unit)
            .field("retry_client_errors", &self.retry_client_errors)
            .field("has_webhook_secret", &self.webhook_secret.is_some())
            .field("brand", &self.brand.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentrixConfig::new("key");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retries, 3);
        assert_eq!(config.effective_base_url(), Brand::AGENTRIX.default_base_url);
    }

    #[test]
    fn test_brand_switches_default_url() {
        let config = AgentrixConfig::new("key").with_brand(Brand::PAYMIND);
        assert_eq!(config.effective_base_url(), "https://api.paymind.com/api");
        let config = config.with_base_url("http://localhost:3001/api/");
        assert_eq!(config.effective_base_url(), "http://localhost:3001/api/");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: AgentrixConfig =
            serde_json::from_str(r#"{"apiKey":"k","timeout":5,"webhookSecret":"whsec"}"#)
                .unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retries, 3);
        assert!(config.retry_client_errors);
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = AgentrixConfig::new("sk_secret").with_webhook_secret("whsec_secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk_secret"));
        assert!(!debug.contains("whsec_secret"));
    }

    // Each test uses its own brand prefix so parallel tests never share
    // variables.
    fn brand_with_prefix(prefix: &'static str) -> Brand {
        Brand {
            env_prefix: prefix,
            ..Brand::AGENTRIX
        }
    }

    fn set(var: &str, value: &str) {
        // SAFETY: each test owns the variables of its prefix.
        unsafe { std::env::set_var(var, value) };
    }

    #[test]
    fn test_from_env_reads_numbers() {
        set("CFGOK_API_KEY", "sk_env");
        set("CFGOK_TIMEOUT_SECS", " 12 ");
        set("CFGOK_RETRIES", "5");
        let config = AgentrixConfig::from_env(brand_with_prefix("CFGOK")).unwrap();
        assert_eq!(config.api_key, "sk_env");
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.retries, 5);
    }

    #[test]
    fn test_from_env_rejects_unparseable_numbers() {
        set("CFGBAD_API_KEY", "sk_env");
        set("CFGBAD_RETRIES", "abc");
        let err = AgentrixConfig::from_env(brand_with_prefix("CFGBAD")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.message(), "CFGBAD_RETRIES must be a non-negative integer");

        set("CFGNEG_API_KEY", "sk_env");
        set("CFGNEG_TIMEOUT_SECS", "-1");
        let err = AgentrixConfig::from_env(brand_with_prefix("CFGNEG")).unwrap_err();
        assert!(err.message().contains("CFGNEG_TIMEOUT_SECS"));
    }

    #[test]
    fn test_merge_env_keeps_explicit_key() {
        set("CFGMERGE_RETRIES", "7");
        set("CFGMERGE_WEBHOOK_SECRET", "whsec_env");
        let config = AgentrixConfig::new("sk_flag")
            .with_brand(brand_with_prefix("CFGMERGE"))
            .merge_env()
            .unwrap();
        assert_eq!(config.api_key, "sk_flag");
        assert_eq!(config.retries, 7);
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec_env"));
    }
}
