//! Service configuration.
//!
//! One plain struct, built once in `main` and threaded into the
//! application state — no globals, no implicit lookups from handlers.
//! Secrets (the weather API key) come from the environment; everything
//! else has a sensible local-development default and a CLI flag in the
//! `plinthd` binary.

use std::path::PathBuf;
use std::time::Duration;

/// Everything the service needs to know at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// `host:port` to bind.
    pub addr: String,
    /// Directory holding the file-backed collections.
    pub data_dir: PathBuf,
    /// Bearer-token lifetime.
    pub token_lifetime: Duration,
    /// Short-link expiry; redirects past this age are 404.
    pub short_link_lifetime: Duration,
    /// Origins allowed by the CORS middleware.
    pub allowed_origins: Vec<String>,
    /// Base URL prefixed to generated short codes.
    pub public_base_url: String,
    /// Upstream weather API key; `None` makes the weather routes fail
    /// with a 500, matching a service deployed without its secret.
    pub weather_api_key: Option<String>,
    /// Upstream weather base URL, overridable for tests.
    pub weather_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8000".into(),
            data_dir: PathBuf::from("data"),
            token_lifetime: Duration::from_secs(3600),
            short_link_lifetime: Duration::from_secs(7 * 24 * 3600),
            allowed_origins: vec![
                "http://localhost:3000".into(),
                "http://localhost:3001".into(),
                "http://localhost".into(),
            ],
            public_base_url: "http://localhost:8000".into(),
            weather_api_key: None,
            weather_base_url: "https://api.openweathermap.org/data/2.5".into(),
        }
    }
}

impl Config {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("OPENWEATHER_API_KEY") {
            if !key.is_empty() {
                config.weather_api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("WEATHER_BASE_URL") {
            if !url.is_empty() {
                config.weather_base_url = url;
            }
        }
        config
    }
}
