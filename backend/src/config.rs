//! Backend endpoint configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(&'static str),
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash, e.g. `https://project.example.co`.
    pub base_url: String,
    /// Public API key sent with every request.
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl BackendConfig {
    /// Build typed backend config from environment variables.
    ///
    /// Required:
    /// - `BACKEND_URL`: http(s) base URL of the hosted backend
    /// - `BACKEND_API_KEY`: public API key
    ///
    /// Optional:
    /// - `BACKEND_REQUEST_TIMEOUT_SECS`: default 15
    /// - `BACKEND_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the URL has no
    /// http(s) scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("BACKEND_URL").ok(),
            std::env::var("BACKEND_API_KEY").ok(),
            std::env::var("BACKEND_REQUEST_TIMEOUT_SECS").ok(),
            std::env::var("BACKEND_CONNECT_TIMEOUT_SECS").ok(),
        )
    }

    fn from_vars(
        base_url: Option<String>,
        api_key: Option<String>,
        request_timeout: Option<String>,
        connect_timeout: Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.ok_or(ConfigError::MissingVar("BACKEND_URL"))?;
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "BACKEND_URL",
                reason: format!("expected an http(s) URL, got `{base_url}`"),
            });
        }

        let api_key = api_key.ok_or(ConfigError::MissingVar("BACKEND_API_KEY"))?;

        Ok(Self {
            base_url,
            api_key,
            request_timeout_secs: parse_secs(request_timeout, DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: parse_secs(connect_timeout, DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }
}

fn parse_secs(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.parse::<u64>().ok()).unwrap_or(default)
}
