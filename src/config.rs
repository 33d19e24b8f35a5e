//! Client configuration.
//!
//! Settings come from `PARLEY_*` environment variables with defaults that
//! match a backend running locally.

use std::time::Duration;

use crate::error::AppError;
use crate::models::DEFAULT_MODEL;

/// Backend base URL used when `PARLEY_API_BASE_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Extra attempts after a transport failure.
pub const DEFAULT_RETRIES: u32 = 1;

/// Pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(300);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the backend client and chat app.
///
/// # Example
///
/// ```ignore
/// use parley::config::ClientConfig;
///
/// let config = ClientConfig::from_env()?
///     .with_retries(0)
///     .with_default_model("openai/gpt-4o-mini");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash
    pub api_base_url: String,
    /// Model for new conversations and chats without a selection
    pub default_model: String,
    /// Retries after a transport failure (0 disables retrying)
    pub retries: u32,
    /// Delay before each retry
    pub retry_delay: Duration,
    /// Upper bound on establishing a connection
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend base URL. A trailing `/` is removed.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = normalize_base_url(&url.into());
        self
    }

    /// Set the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the number of retries.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the delay between retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Build a config from the environment.
    ///
    /// Reads `PARLEY_API_BASE_URL`, `PARLEY_MODEL`, `PARLEY_RETRIES`,
    /// `PARLEY_RETRY_DELAY_MS` and `PARLEY_CONNECT_TIMEOUT_SECS`. Unset or
    /// empty variables keep their defaults; unparsable numbers are an error.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(url) = env_var("PARLEY_API_BASE_URL") {
            config = config.with_api_base_url(url);
        }
        if let Some(model) = env_var("PARLEY_MODEL") {
            config = config.with_default_model(model);
        }
        if let Some(retries) = parse_env::<u32>("PARLEY_RETRIES")? {
            config = config.with_retries(retries);
        }
        if let Some(ms) = parse_env::<u64>("PARLEY_RETRY_DELAY_MS")? {
            config = config.with_retry_delay(Duration::from_millis(ms));
        }
        if let Some(secs) = parse_env::<u64>("PARLEY_CONNECT_TIMEOUT_SECS")? {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }

        tracing::debug!(base_url = %config.api_base_url, retries = config.retries, "Loaded client config");
        Ok(config)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{}={:?}: {}", name, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "PARLEY_API_BASE_URL",
        "PARLEY_MODEL",
        "PARLEY_RETRIES",
        "PARLEY_RETRY_DELAY_MS",
        "PARLEY_CONNECT_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.retries, 1);
        assert_eq!(config.retry_delay, Duration::from_millis(300));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let config = ClientConfig::new()
            .with_api_base_url("https://chat.example.com/")
            .with_retries(3)
            .with_retry_delay(Duration::ZERO);
        assert_eq!(config.api_base_url, "https://chat.example.com");
        assert_eq!(config.retries, 3);
        assert_eq!(config.retry_delay, Duration::ZERO);
    }

    #[test]
    #[serial]
    fn test_from_env_unset_uses_defaults() {
        clear_env();
        assert_eq!(ClientConfig::from_env().unwrap(), ClientConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        clear_env();
        std::env::set_var("PARLEY_API_BASE_URL", "http://backend:9000//");
        std::env::set_var("PARLEY_MODEL", "openai/gpt-4o-mini");
        std::env::set_var("PARLEY_RETRIES", "0");
        std::env::set_var("PARLEY_RETRY_DELAY_MS", "50");
        std::env::set_var("PARLEY_CONNECT_TIMEOUT_SECS", "2");

        let config = ClientConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.api_base_url, "http://backend:9000");
        assert_eq!(config.default_model, "openai/gpt-4o-mini");
        assert_eq!(config.retries, 0);
        assert_eq!(config.retry_delay, Duration::from_millis(50));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_number() {
        clear_env();
        std::env::set_var("PARLEY_RETRIES", "many");

        let result = ClientConfig::from_env();
        clear_env();

        match result {
            Err(AppError::Config(message)) => assert!(message.contains("PARLEY_RETRIES")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_from_env_blank_values_are_ignored() {
        clear_env();
        std::env::set_var("PARLEY_MODEL", "   ");

        let config = ClientConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.default_model, DEFAULT_MODEL);
    }
}
