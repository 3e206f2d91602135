//! Application configuration. Backend endpoint, credentials, timeouts.

use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Per-request timeout when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Backend base URL. Read from TRAINING_API_URL.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Bearer token sent with every request. Read from TRAINING_API_TOKEN.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Read from TRAINING_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Use the in-memory backend with demo data. Read from TRAINING_OFFLINE.
    #[serde(default)]
    pub offline: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("TRAINING").try_parsing(true));
        if let Ok(path) = std::env::var("TRAINING_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the backend base URL without a trailing slash.
    pub fn api_url_or_default(&self) -> String {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Returns the bearer token, if set and non-blank.
    pub fn api_token(&self) -> Option<String> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// Returns request timeout in seconds. Defaults to 30 if unset or zero.
    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// Returns true when the in-memory backend should be used.
    pub fn is_offline(&self) -> bool {
        self.offline.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_url_or_default(), "http://localhost:3000");
        assert_eq!(cfg.api_token(), None);
        assert_eq!(cfg.request_timeout_secs_or_default(), 30);
        assert!(!cfg.is_offline());
    }

    #[test]
    fn test_overrides_are_normalized() {
        let cfg = AppConfig {
            api_url: Some(" https://training.example.com/api/ ".into()),
            api_token: Some("   ".into()),
            request_timeout_secs: Some(0),
            offline: Some(true),
        };
        assert_eq!(cfg.api_url_or_default(), "https://training.example.com/api");
        assert_eq!(cfg.api_token(), None);
        assert_eq!(cfg.request_timeout_secs_or_default(), 30);
        assert!(cfg.is_offline());
    }
}
