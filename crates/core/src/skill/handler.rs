use crate::config::Settings;
use crate::engine;
use crate::error::SkillError;
use crate::ingest::dark_sky::DarkSkyClient;
use crate::ingest::ForecastFetcher;
use crate::location::device::{DeviceAddressClient, FixedPostalCode};
use crate::location::zip::ZipTable;
use crate::location::{Coordinates, DeviceIdentity, LocationResolver, PostalCodeSource};
use crate::skill::envelope::{
    Route, SkillRequest, SkillResponse, CANCEL_INTENT, HELP_INTENT, STOP_INTENT,
    TOP_OFF_TODAY_INTENT,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

const WELCOME: &str =
    "Welcome to Jeep Man, developed by Scott Rehlander. Ask me if you can take your top down.";
const HELP: &str =
    "Welcome to JeepMan, developed by Scott Rehlander. Ask me if you should take your top down.";
const GOODBYE: &str = "Ok";
const UNHANDLED: &str = "You may only ask Jeep Man if you should take your top down.";

/// Routes voice-platform requests and answers the top-down question.
pub struct SkillHandler {
    postal_codes: Arc<dyn PostalCodeSource>,
    locations: Arc<dyn LocationResolver>,
    forecasts: Arc<dyn ForecastFetcher>,
    app_id: Option<String>,
}

impl SkillHandler {
    pub fn new(
        postal_codes: Arc<dyn PostalCodeSource>,
        locations: Arc<dyn LocationResolver>,
        forecasts: Arc<dyn ForecastFetcher>,
    ) -> Self {
        Self {
            postal_codes,
            locations,
            forecasts,
            app_id: None,
        }
    }

    /// Only accept requests addressed to `app_id`.
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let postal_codes: Arc<dyn PostalCodeSource> = match &settings.fixed_postal_code {
            Some(zip) => {
                tracing::warn!(%zip, "FIXED_POSTAL_CODE set; ignoring device locations");
                Arc::new(FixedPostalCode(zip.clone()))
            }
            None => Arc::new(DeviceAddressClient::from_settings(settings)?),
        };
        let locations = Arc::new(ZipTable::load(settings.zip_table_path())?);
        let forecasts = Arc::new(DarkSkyClient::from_settings(settings)?);

        let handler = Self::new(postal_codes, locations, forecasts);
        Ok(match &settings.skill_app_id {
            Some(app_id) => handler.with_app_id(app_id.clone()),
            None => handler,
        })
    }

    /// Only an application id mismatch is an error; every other failure is spoken as an apology.
    pub async fn handle(
        &self,
        req: &SkillRequest,
        now: DateTime<Utc>,
    ) -> Result<SkillResponse, SkillError> {
        self.verify_application(req)?;

        let route = req.route();
        tracing::info!(
            ?route,
            request_id = req.request.request_id.as_deref().unwrap_or(""),
            user_id = %req.context.system.user.user_id,
            "handling skill request"
        );

        let response = match route {
            Route::Launch => SkillResponse::ask(WELCOME),
            Route::SessionEnded => SkillResponse::end(),
            Route::Intent(HELP_INTENT) => SkillResponse::ask(HELP),
            Route::Intent(STOP_INTENT) | Route::Intent(CANCEL_INTENT) => {
                SkillResponse::tell(GOODBYE)
            }
            Route::Intent(TOP_OFF_TODAY_INTENT) => {
                match self.top_down_today(&req.device_identity(), now).await {
                    Ok(utterance) => SkillResponse::tell(&utterance),
                    Err(err) => {
                        tracing::warn!(error = %err, "could not answer top-down question");
                        SkillResponse::tell(err.apology())
                    }
                }
            }
            Route::Intent(_) | Route::Unknown => SkillResponse::tell(UNHANDLED),
        };

        Ok(response)
    }

    pub async fn top_down_today(
        &self,
        device: &DeviceIdentity,
        now: DateTime<Utc>,
    ) -> Result<String, SkillError> {
        let zip = self.postal_codes.postal_code(device).await?;
        tracing::info!(device_id = %device.device_id, %zip, "resolved device postal code");
        self.answer_for_postal_code(&zip, now).await
    }

    pub async fn answer_for_postal_code(
        &self,
        zip: &str,
        now: DateTime<Utc>,
    ) -> Result<String, SkillError> {
        let coordinates = self
            .locations
            .resolve(zip)
            .ok_or_else(|| SkillError::LocationNotFound(zip.to_string()))?;
        tracing::info!(%zip, ?coordinates, "resolved zip code");
        answer_for_coordinates(self.forecasts.as_ref(), coordinates, now).await
    }

    fn verify_application(&self, req: &SkillRequest) -> Result<(), SkillError> {
        let Some(expected) = self.app_id.as_deref() else {
            return Ok(());
        };
        match req.application_id() {
            Some(actual) if actual == expected => Ok(()),
            actual => Err(SkillError::ApplicationMismatch(
                actual.unwrap_or_default().to_string(),
            )),
        }
    }
}

/// Fetches the forecast for `coordinates` and runs it through the engine.
pub async fn answer_for_coordinates(
    forecasts: &dyn ForecastFetcher,
    coordinates: Coordinates,
    now: DateTime<Utc>,
) -> Result<String, SkillError> {
    let raw = forecasts.fetch_hourly(coordinates).await?;
    tracing::debug!(provider = forecasts.provider_name(), "fetched forecast");
    Ok(engine::classify_and_respond_json(now, &raw)?)
}
