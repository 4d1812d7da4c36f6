use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Catalog API root, e.g. `https://api.example.com/api/`.
    pub api_url: String,
    /// Image upload service root; `images` is appended.
    pub image_api_url: String,
    /// Song upload service root; `upload-song` is appended.
    pub upload_song_api_url: String,
    pub request_timeout: Duration,
    /// How long a cached list page is served without refetching.
    pub cache_stale_after: Duration,
    pub notification_ttl: Duration,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api/".to_string(),
            image_api_url: "http://localhost:3001/api/".to_string(),
            upload_song_api_url: "http://localhost:3002/api/".to_string(),
            request_timeout: Duration::from_secs(30),
            cache_stale_after: Duration::from_secs(30),
            notification_ttl: Duration::from_secs(3),
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Only the API url is
    /// mandatory; upload services default to it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("TUNEDESK_API_URL")
            .filter(|v| !v.trim().is_empty())
            .map(with_trailing_slash)
            .ok_or(ConfigError::Missing("TUNEDESK_API_URL"))?;

        let image_api_url = lookup("TUNEDESK_IMAGE_API_URL")
            .map(with_trailing_slash)
            .unwrap_or_else(|| api_url.clone());
        let upload_song_api_url = lookup("TUNEDESK_UPLOAD_SONG_API_URL")
            .map(with_trailing_slash)
            .unwrap_or_else(|| api_url.clone());

        let secs = |name: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::Invalid {
                        name,
                        expected: "a whole number of seconds",
                        value,
                    }),
            }
        };

        Ok(Self {
            api_url,
            image_api_url,
            upload_song_api_url,
            request_timeout: secs("TUNEDESK_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
            cache_stale_after: secs("TUNEDESK_CACHE_STALE_SECS", defaults.cache_stale_after)?,
            notification_ttl: secs("TUNEDESK_NOTIFICATION_TTL_SECS", defaults.notification_ttl)?,
        })
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn api_url_is_required() {
        assert_matches!(
            AdminConfig::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("TUNEDESK_API_URL"))
        );
    }

    #[test]
    fn upload_services_default_to_api_url() {
        let config = AdminConfig::from_lookup(lookup(&[("TUNEDESK_API_URL", "https://api.test/v1")])).unwrap();
        assert_eq!(config.api_url, "https://api.test/v1/");
        assert_eq!(config.image_api_url, "https://api.test/v1/");
        assert_eq!(config.cache_stale_after, Duration::from_secs(30));
    }

    #[test]
    fn bad_timeout_is_reported() {
        let result = AdminConfig::from_lookup(lookup(&[
            ("TUNEDESK_API_URL", "https://api.test/"),
            ("TUNEDESK_REQUEST_TIMEOUT_SECS", "soon"),
        ]));
        assert_matches!(result, Err(ConfigError::Invalid { name: "TUNEDESK_REQUEST_TIMEOUT_SECS", .. }));
    }
}
