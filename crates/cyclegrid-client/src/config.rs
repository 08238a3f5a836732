#![forbid(unsafe_code)]

//! Client configuration and the upstream `base` bounds.

use std::time::Duration;

use crate::error::{FetchError, Result};

/// Service address used when neither the CLI nor the environment names one.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Environment variable that overrides [`DEFAULT_API_BASE`].
pub const API_BASE_ENV: &str = "CYCLEGRID_API_BASE";

/// Smallest modulus the cycles service accepts.
pub const MIN_BASE: i64 = 1;

/// Largest modulus the cycles service accepts.
pub const MAX_BASE: i64 = 700;

/// Clamp a user-entered modulus into the range the service accepts.
#[inline]
pub fn clamp_base(modulus: i64) -> i64 {
    modulus.clamp(MIN_BASE, MAX_BASE)
}

/// Reject a modulus the service would never produce or accept.
pub fn check_base(base: i64) -> Result<i64> {
    if (MIN_BASE..=MAX_BASE).contains(&base) {
        Ok(base)
    } else {
        Err(FetchError::BaseOutOfRange {
            base,
            min: MIN_BASE,
            max: MAX_BASE,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root, without the `/cycles` path.
    pub api_base: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

impl ClientConfig {
    /// Apply the service address: `cli` wins over `env`, which wins over the
    /// current value. Blank strings count as unset.
    #[must_use]
    pub fn with_api_base(mut self, cli: Option<String>, env: Option<String>) -> Self {
        let chosen = [cli, env]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty());
        if let Some(base) = chosen {
            self.api_base = base;
        }
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the cycles endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/cycles", self.api_base.trim_end_matches('/'))
    }
}
