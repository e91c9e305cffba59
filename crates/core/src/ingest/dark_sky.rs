use crate::config::Settings;
use crate::error::UpstreamError;
use crate::http;
use crate::ingest::ForecastFetcher;
use crate::location::Coordinates;
use anyhow::Context;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.darksky.net";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRIES: u32 = 2;
const EXCLUDE_BLOCKS: &str = "currently,minutely,daily,alerts,flags";
const BASE_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct DarkSkyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retries: u32,
}

impl DarkSkyClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_dark_sky_api_key()?.to_string();
        let base_url = settings
            .dark_sky_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("FORECAST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("FORECAST_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        Self::new(base_url, api_key, Duration::from_secs(timeout_secs), retries)
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        retries: u32,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build forecast http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            retries: retries.max(1),
        })
    }

    fn url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}/forecast/{}/{},{}",
            self.base_url.trim_end_matches('/'),
            self.api_key,
            coordinates.latitude,
            coordinates.longitude
        )
    }

    async fn fetch_once(
        &self,
        coordinates: Coordinates,
    ) -> Result<serde_json::Value, UpstreamError> {
        let res = self
            .http
            .get(self.url(coordinates))
            .query(&[("exclude", EXCLUDE_BLOCKS)])
            .send()
            .await
            .map_err(UpstreamError::Network)?;

        http::read_json(res).await
    }
}

#[async_trait::async_trait]
impl ForecastFetcher for DarkSkyClient {
    fn provider_name(&self) -> &'static str {
        "dark_sky"
    }

    async fn fetch_hourly(
        &self,
        coordinates: Coordinates,
    ) -> Result<serde_json::Value, UpstreamError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(coordinates).await {
                Ok(raw) => return Ok(raw),
                // Only transport failures are worth repeating.
                Err(UpstreamError::Network(err)) if attempt < self.retries => {
                    let backoff = backoff(attempt);
                    tracing::warn!(attempt, ?backoff, error = %err, "forecast fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Delay before the next try: doubles from `BASE_BACKOFF` and never exceeds `MAX_BACKOFF`.
fn backoff(attempt: u32) -> Duration {
    let factor = 1u32
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    BASE_BACKOFF.saturating_mul(factor).min(MAX_BACKOFF)
}
