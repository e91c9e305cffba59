use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use topdown_core::error::{DeviceLocationError, SkillError, UpstreamError};
use topdown_core::ingest::ForecastFetcher;
use topdown_core::location::zip::ZipTable;
use topdown_core::location::{Coordinates, DeviceIdentity, PostalCodeSource};
use topdown_core::skill::{SkillHandler, SkillRequest};

struct ConsentedDevice;

#[async_trait::async_trait]
impl PostalCodeSource for ConsentedDevice {
    async fn postal_code(&self, device: &DeviceIdentity) -> Result<String, DeviceLocationError> {
        match device.consent_token.as_deref() {
            Some(_) => Ok("10001".to_string()),
            None => Err(DeviceLocationError::ConsentMissing),
        }
    }
}

enum Canned {
    Forecast(serde_json::Value),
    Status(u16),
}

struct CannedForecast {
    canned: Canned,
    calls: AtomicUsize,
}

impl CannedForecast {
    fn new(canned: Canned) -> Arc<Self> {
        Arc::new(Self {
            canned,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl ForecastFetcher for CannedForecast {
    fn provider_name(&self) -> &'static str {
        "canned"
    }

    async fn fetch_hourly(
        &self,
        _coordinates: Coordinates,
    ) -> Result<serde_json::Value, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.canned {
            Canned::Forecast(raw) => Ok(raw.clone()),
            Canned::Status(code) => Err(UpstreamError::Status(*code)),
        }
    }
}

fn monday_afternoon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap()
}

// 14:00 local at UTC-4; light rain this evening before 7pm, dry tonight.
fn forecast_json(now: DateTime<Utc>) -> serde_json::Value {
    let data: Vec<_> = (0..24)
        .map(|h| {
            let p = if h == 3 { 0.12 } else { 0.0 };
            json!({"time": now.timestamp() + h * 3600, "precipProbability": p})
        })
        .collect();
    json!({"offset": -4, "hourly": {"data": data}})
}

fn zips() -> Arc<ZipTable> {
    Arc::new(
        [(
            "10001".to_string(),
            Coordinates {
                latitude: 40.7506,
                longitude: -73.9972,
            },
        )]
        .into_iter()
        .collect(),
    )
}

fn request(kind: &str, intent: Option<&str>, consent: bool) -> SkillRequest {
    let mut request = json!({"type": kind, "requestId": "amzn1.echo-api.request.1"});
    if let Some(name) = intent {
        request["intent"] = json!({"name": name});
    }
    let mut user = json!({"userId": "amzn1.ask.account.U"});
    if consent {
        user["permissions"] = json!({"consentToken": "consent-123"});
    }
    serde_json::from_value(json!({
        "version": "1.0",
        "context": {
            "System": {
                "application": {"applicationId": "amzn1.ask.skill.jeep"},
                "user": user,
                "device": {"deviceId": "amzn1.ask.device.D"},
                "apiEndpoint": "https://api.amazonalexa.com"
            }
        },
        "request": request
    }))
    .unwrap()
}

fn handler(forecast: Arc<CannedForecast>) -> SkillHandler {
    SkillHandler::new(Arc::new(ConsentedDevice), zips(), forecast)
}

#[tokio::test]
async fn answers_the_top_down_question() {
    let now = monday_afternoon();
    let skill = handler(CannedForecast::new(Canned::Forecast(forecast_json(now))));

    let res = skill
        .handle(&request("IntentRequest", Some("TopOffToday"), true), now)
        .await
        .unwrap();

    assert!(res.response.should_end_session);
    assert_eq!(
        res.speech_text(),
        Some("Be careful, there is a 12 percent chance of precipitation today, but tonight should be clear.")
    );
}

#[tokio::test]
async fn missing_consent_is_apologised_for_without_fetching() {
    let now = monday_afternoon();
    let forecast = CannedForecast::new(Canned::Forecast(forecast_json(now)));
    let skill = handler(forecast.clone());

    let res = skill
        .handle(&request("IntentRequest", Some("TopOffToday"), false), now)
        .await
        .unwrap();

    assert_eq!(res.speech_text(), Some(SkillError::ConsentMissing.apology()));
    assert_eq!(forecast.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_zip_is_location_not_found() {
    let now = monday_afternoon();
    let skill = handler(CannedForecast::new(Canned::Forecast(forecast_json(now))));

    let err = skill.answer_for_postal_code("99999", now).await.unwrap_err();
    assert!(matches!(err, SkillError::LocationNotFound(ref zip) if zip == "99999"));
}

#[tokio::test]
async fn upstream_failure_is_spoken_as_fetch_apology() {
    let now = monday_afternoon();
    let skill = handler(CannedForecast::new(Canned::Status(500)));

    let res = skill
        .handle(&request("IntentRequest", Some("TopOffToday"), true), now)
        .await
        .unwrap();
    assert_eq!(
        res.speech_text(),
        Some("Sorry, I was unable to fetch the weather data.")
    );
}

#[tokio::test]
async fn malformed_forecast_is_spoken_as_its_own_apology() {
    let now = monday_afternoon();
    let skill = handler(CannedForecast::new(Canned::Forecast(json!({"offset": -4}))));

    let err = skill.answer_for_postal_code("10001", now).await.unwrap_err();
    assert!(matches!(err, SkillError::MalformedForecast(_)));
    assert_eq!(
        err.apology(),
        "Sorry, I was unable to complete the request to fetch weather data."
    );
}

#[tokio::test]
async fn conversational_intents() {
    let now = monday_afternoon();
    let forecast = CannedForecast::new(Canned::Status(500));
    let skill = handler(forecast.clone());

    let launch = skill.handle(&request("LaunchRequest", None, true), now).await.unwrap();
    assert!(!launch.response.should_end_session);
    assert!(launch.speech_text().unwrap().starts_with("Welcome to Jeep Man"));

    let help = skill
        .handle(&request("IntentRequest", Some("AMAZON.HelpIntent"), true), now)
        .await
        .unwrap();
    assert!(!help.response.should_end_session);
    assert!(help.speech_text().unwrap().contains("should take your top down"));

    for intent in ["AMAZON.StopIntent", "AMAZON.CancelIntent"] {
        let res = skill
            .handle(&request("IntentRequest", Some(intent), true), now)
            .await
            .unwrap();
        assert_eq!(res.speech_text(), Some("Ok"));
    }

    let other = skill
        .handle(&request("IntentRequest", Some("WhatIsTheWeather"), true), now)
        .await
        .unwrap();
    assert_eq!(
        other.speech_text(),
        Some("You may only ask Jeep Man if you should take your top down.")
    );

    let ended = skill
        .handle(&request("SessionEndedRequest", None, true), now)
        .await
        .unwrap();
    assert_eq!(ended.speech_text(), None);
    assert!(ended.response.should_end_session);

    assert_eq!(forecast.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejects_requests_for_another_skill() {
    let now = monday_afternoon();
    let skill = handler(CannedForecast::new(Canned::Status(500)))
        .with_app_id("amzn1.ask.skill.other");

    let err = skill
        .handle(&request("LaunchRequest", None, true), now)
        .await
        .unwrap_err();
    assert!(matches!(err, SkillError::ApplicationMismatch(_)));

    let accepted = handler(CannedForecast::new(Canned::Status(500)))
        .with_app_id("amzn1.ask.skill.jeep")
        .handle(&request("LaunchRequest", None, true), now)
        .await;
    assert!(accepted.is_ok());
}
