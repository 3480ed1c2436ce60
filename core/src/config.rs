//! Dispatcher configuration.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a `RequestDispatcher` is constructed from.
#[derive(Clone)]
pub struct DispatcherConfig {
    /// Root address all relative paths resolve against.
    pub base_url: String,
    /// Bearer token sent as `authorization` (None = anonymous).
    pub credential: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for DispatcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherConfig")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DispatcherConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `<PREFIX>_BASE_URL`, `<PREFIX>_API_KEY` and
    /// `<PREFIX>_TIMEOUT_SECS` from the process environment.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(prefix, |name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_key = format!("{prefix}_BASE_URL");
        let base_url = lookup(&base_key)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(base_key))?;

        let mut config = Self::new(base_url);

        if let Some(key) = lookup(&format!("{prefix}_API_KEY")).filter(|v| !v.is_empty()) {
            config = config.credential(key);
        }

        let timeout_key = format!("{prefix}_TIMEOUT_SECS");
        if let Some(raw) = lookup(&timeout_key) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid {
                    name: timeout_key,
                    value: raw.clone(),
                })?;
            config = config.timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
