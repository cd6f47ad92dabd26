//! Backend connection settings.
//!
//! The base origin is resolved once at process start and never changes for
//! the lifetime of a transport.

use std::time::Duration;

use url::Url;

use crate::error::{Result, TransportError};

/// Environment variable holding the backend origin.
pub const API_URL_ENV: &str = "OCEANDESK_API_URL";

/// Environment variable holding the request timeout in seconds (`0` disables it).
pub const API_TIMEOUT_ENV: &str = "OCEANDESK_API_TIMEOUT_SECS";

/// Origin used when nothing is configured (local development backend).
pub const DEFAULT_API_URL: &str = "http://localhost:8001";

/// Default bound on a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base origin every request path is resolved against.
    pub base_url: Url,
    /// Upper bound on a single request, `None` for no bound.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    /// Creates a configuration for the given origin with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base(base_url)?,
            timeout: Some(DEFAULT_TIMEOUT),
        })
    }

    /// Sets the request timeout (`None` disables it).
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup(API_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = match lookup(API_TIMEOUT_ENV) {
            None => Some(DEFAULT_TIMEOUT),
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    TransportError::InvalidConfig(format!(
                        "{API_TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"
                    ))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
        };

        Ok(Self::new(url.trim())?.with_timeout(timeout))
    }
}

/// Parses the origin and makes sure relative paths resolve beneath it.
fn normalize_base(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(TransportError::InvalidConfig(format!(
            "unsupported scheme {:?} in {raw}",
            url.scheme()
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_defaults_to_local_backend() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:8001/");
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert_eq!(config, ApiConfig::new(DEFAULT_API_URL).unwrap());
    }

    #[test]
    fn test_reads_origin_and_timeout() {
        let config = ApiConfig::from_lookup(lookup(&[
            (API_URL_ENV, "https://agent.example.com/api"),
            (API_TIMEOUT_ENV, "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.as_str(), "https://agent.example.com/api/");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let config = ApiConfig::from_lookup(lookup(&[(API_TIMEOUT_ENV, "0")])).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ApiConfig::from_lookup(lookup(&[(API_TIMEOUT_ENV, "soon")])).is_err());
        assert!(ApiConfig::new("ftp://example.com").is_err());
        assert!(ApiConfig::new("not a url").is_err());
    }

    #[test]
    fn test_blank_origin_falls_back() {
        let config = ApiConfig::from_lookup(lookup(&[(API_URL_ENV, "   ")])).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8001/");
    }
}
