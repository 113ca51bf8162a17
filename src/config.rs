use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};
use url::Url;

/// Bulletin service endpoint. Both the probe and the district queries post here.
pub const DEFAULT_ENDPOINT: &str = "https://sede.miteco.gob.es/BoleHWeb/bolehSRV";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "es-ES,es;q=0.9";

/// Runtime settings for the scraper.
///
/// Every field has a default, so a YAML file only needs the keys it changes:
///
/// ```yaml
/// endpoint: https://sede.miteco.gob.es/BoleHWeb/bolehSRV
/// accept_invalid_certs: true
/// fetch_concurrency: 4
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub endpoint: Url,
    /// Skip TLS certificate validation for `endpoint`.
    ///
    /// The service presents a certificate chain that common trust stores
    /// reject, so this is on unless explicitly turned off. It only affects
    /// the scraper's own HTTP client.
    pub accept_invalid_certs: bool,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    /// Maximum district requests in flight for one week.
    pub fetch_concurrency: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint should parse"),
            accept_invalid_certs: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout_secs: 60,
            fetch_concurrency: 1,
        }
    }
}

impl ScraperConfig {
    /// Load settings from a YAML file, filling unspecified keys with defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let mut cfg: Self = serde_yaml::from_str(text)?;
        cfg.fetch_concurrency = cfg.fetch_concurrency.max(1);
        Ok(cfg)
    }
}
