pub mod device;
pub mod zip;

use crate::error::DeviceLocationError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Maps a postal code to coordinates; `None` when the code is unknown.
pub trait LocationResolver: Send + Sync {
    fn resolve(&self, postal_code: &str) -> Option<Coordinates>;
}

/// Who is asking, as reported by the voice platform.
#[derive(Debug, Clone, Default)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub consent_token: Option<String>,
    pub api_endpoint: Option<String>,
}

#[async_trait::async_trait]
pub trait PostalCodeSource: Send + Sync {
    async fn postal_code(&self, device: &DeviceIdentity) -> Result<String, DeviceLocationError>;
}
