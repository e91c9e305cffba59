use crate::config::Settings;
use crate::error::{DeviceLocationError, UpstreamError};
use crate::http;
use crate::location::{DeviceIdentity, PostalCodeSource};
use anyhow::Context;
use reqwest::Url;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.amazonalexa.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// Regional address API hosts a request's `apiEndpoint` may point at.
const PLATFORM_HOSTS: &[&str] = &[
    "api.amazonalexa.com",
    "api.eu.amazonalexa.com",
    "api.fe.amazonalexa.com",
];

/// Looks up the postal code registered for a device through the voice platform's address API.
#[derive(Debug, Clone)]
pub struct DeviceAddressClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviceAddressClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .device_api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid device address base url: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "device address base url cannot carry a path: {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build device address http client")?;
        Ok(Self { http, base_url })
    }

    /// The request's own endpoint when it is a platform host, otherwise the configured one.
    fn endpoint(&self, requested: Option<&str>) -> Url {
        let Some(requested) = requested else {
            return self.base_url.clone();
        };
        match Url::parse(requested) {
            Ok(url) if is_platform_host(&url) => url,
            _ => {
                tracing::warn!(api_endpoint = %requested, "ignoring unrecognised api endpoint");
                self.base_url.clone()
            }
        }
    }

    fn url(&self, device: &DeviceIdentity) -> Result<Url, DeviceLocationError> {
        let device_id = device.device_id.trim();
        if matches!(device_id, "" | "." | "..") {
            return Err(DeviceLocationError::InvalidDeviceId(device.device_id.clone()));
        }

        let mut url = self.endpoint(device.api_endpoint.as_deref());
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| DeviceLocationError::InvalidDeviceId(device.device_id.clone()))?
            .pop_if_empty()
            .extend([
                "v1",
                "devices",
                device_id,
                "settings",
                "address",
                "countryAndPostalCode",
            ]);
        Ok(url)
    }
}

fn is_platform_host(url: &Url) -> bool {
    url.scheme() == "https"
        && url.port().is_none()
        && url
            .host_str()
            .is_some_and(|host| PLATFORM_HOSTS.contains(&host))
}

#[async_trait::async_trait]
impl PostalCodeSource for DeviceAddressClient {
    async fn postal_code(&self, device: &DeviceIdentity) -> Result<String, DeviceLocationError> {
        let Some(token) = device.consent_token.as_deref().filter(|t| !t.is_empty()) else {
            tracing::info!(device_id = %device.device_id, "no consent token for device address");
            return Err(DeviceLocationError::ConsentMissing);
        };

        let res = self
            .http
            .get(self.url(device)?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(UpstreamError::Network)?;
        let body = http::read_json(res).await?;

        body.get("postalCode")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or(DeviceLocationError::MissingPostalCode)
    }
}

/// Always answers with the same postal code, whatever the device.
#[derive(Debug, Clone)]
pub struct FixedPostalCode(pub String);

#[async_trait::async_trait]
impl PostalCodeSource for FixedPostalCode {
    async fn postal_code(&self, _device: &DeviceIdentity) -> Result<String, DeviceLocationError> {
        Ok(self.0.clone())
    }
}
