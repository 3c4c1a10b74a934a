//! Shared HTTP client for the weather and news upstreams

use crate::config::HttpConfig;
use crate::{Result, WeatherNewsError};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::debug;

const USER_AGENT: &str = concat!("weathernews/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Build the retrying client used by every upstream call.
///
/// Transient failures (connect errors, timeouts, 5xx, 429) are retried with
/// exponential backoff; each attempt is bounded by the configured timeout.
pub fn build_client(config: &HttpConfig) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WeatherNewsError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// GET `url` and decode a JSON body.
///
/// Non-success statuses become [`WeatherNewsError::Http`] carrying the
/// upstream body, undecodable payloads become [`WeatherNewsError::Parse`].
pub async fn get_json<T: DeserializeOwned>(
    client: &ClientWithMiddleware,
    url: reqwest::Url,
) -> Result<T> {
    let response = client.get(url).send().await?;
    let status = response.status();
    debug!("Upstream responded with status {}", status);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(WeatherNewsError::http(status.as_u16(), truncate(&body)));
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| WeatherNewsError::parse(e.to_string()))
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
