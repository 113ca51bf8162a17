// Requests against the bulletin service. Both request shapes are
// form-encoded POSTs to the same endpoint and return HTML.

use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    Client, StatusCode,
};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::ScraperConfig;

pub mod district;
pub mod probe;

pub use district::fetch_district;
pub use probe::{clamp_end_date, probe_availability, Availability};

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Raw answer from the service.
#[derive(Clone, Debug)]
pub struct BulletinPage {
    pub status: StatusCode,
    pub body: String,
}

impl BulletinPage {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Build the HTTP client used for every request of a run.
///
/// Certificate checks are relaxed here, and only here, when the config asks for it.
pub fn build_client(config: &ScraperConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language).context("invalid accept_language")?,
    );

    if config.accept_invalid_certs {
        warn!(endpoint = %config.endpoint, "TLS certificate validation disabled for bulletin client");
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
        .context("building bulletin HTTP client")
}

async fn post_form(client: &Client, endpoint: &Url, form: &[(String, String)]) -> Result<BulletinPage> {
    debug!(%endpoint, fields = form.len(), "POST");
    let resp = client
        .post(endpoint.clone())
        .form(form)
        .send()
        .await
        .with_context(|| format!("POST {}", endpoint))?;
    let status = resp.status();
    let body = resp
        .text()
        .await
        .with_context(|| format!("reading body from {}", endpoint))?;
    Ok(BulletinPage { status, body })
}
