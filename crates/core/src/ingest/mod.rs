pub mod dark_sky;

use crate::error::UpstreamError;
use crate::location::Coordinates;

#[async_trait::async_trait]
pub trait ForecastFetcher: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Raw hourly forecast document for `coordinates`.
    async fn fetch_hourly(
        &self,
        coordinates: Coordinates,
    ) -> Result<serde_json::Value, UpstreamError>;
}
