//! Failure taxonomy for a single skill request.
//!
//! Every variant of [`SkillError`] is terminal for the request that raised it and
//! maps to exactly one spoken apology.

use thiserror::Error;

/// The forecast payload reached the engine but failed structural validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("malformed forecast: {detail}")]
pub struct MalformedForecast {
    pub detail: String,
}

impl MalformedForecast {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Failure talking to an upstream JSON-over-HTTPS service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed with status {0}")]
    Status(u16),
    #[error("expected application/json but received {0:?}")]
    ContentType(Option<String>),
    #[error("response is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("request could not be completed: {0}")]
    Network(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum DeviceLocationError {
    #[error("no consent token was provided for the device address")]
    ConsentMissing,
    #[error("device address response has no postal code")]
    MissingPostalCode,
    #[error("device id {0:?} cannot be used in an address lookup")]
    InvalidDeviceId(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("device location consent missing")]
    ConsentMissing,
    #[error("device location lookup failed: {0}")]
    DeviceLocationFailed(#[source] DeviceLocationError),
    #[error("no coordinates known for zip code {0:?}")]
    LocationNotFound(String),
    #[error("forecast fetch failed: {0}")]
    ForecastFetchFailed(#[from] UpstreamError),
    #[error(transparent)]
    MalformedForecast(#[from] MalformedForecast),
    #[error("request application id {0:?} does not match this skill")]
    ApplicationMismatch(String),
}

const APOLOGY_POSTAL_CODE: &str = "Sorry, we could not get the zip code associated with your device. Please make sure you have provided consent for location data";
const APOLOGY_LOCATION: &str = "Sorry, I cannot find weather information for your zip code.";
const APOLOGY_FETCH: &str = "Sorry, I was unable to fetch the weather data.";
const APOLOGY_MALFORMED: &str = "Sorry, I was unable to complete the request to fetch weather data.";
const APOLOGY_APPLICATION: &str = "Sorry, this request was not meant for Jeep Man.";

impl SkillError {
    /// Fixed utterance spoken back to the user for this failure.
    pub fn apology(&self) -> &'static str {
        match self {
            Self::ConsentMissing | Self::DeviceLocationFailed(_) => APOLOGY_POSTAL_CODE,
            Self::LocationNotFound(_) => APOLOGY_LOCATION,
            Self::ForecastFetchFailed(_) => APOLOGY_FETCH,
            Self::MalformedForecast(_) => APOLOGY_MALFORMED,
            Self::ApplicationMismatch(_) => APOLOGY_APPLICATION,
        }
    }
}

impl From<DeviceLocationError> for SkillError {
    fn from(err: DeviceLocationError) -> Self {
        match err {
            DeviceLocationError::ConsentMissing => Self::ConsentMissing,
            other => Self::DeviceLocationFailed(other),
        }
    }
}
