//! Forecast in, recommendation out. Pure and synchronous; all I/O happens before this runs.

use crate::domain::forecast::ForecastPayload;
use crate::domain::risk::{self, WindowRisk};
use crate::error::MalformedForecast;
use crate::speech::responses::{select_response, Outlook};
use crate::time::windows;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub today: WindowRisk,
    pub tonight: WindowRisk,
    pub tomorrow_daytime: WindowRisk,
    pub outlook: Outlook,
    pub utterance: String,
}

pub fn assess(now: DateTime<Utc>, payload: &ForecastPayload) -> Assessment {
    let parts = windows::partition(now, payload);

    let today = risk::reduce(&parts.today);
    let tonight = risk::reduce(&parts.tonight);
    let tomorrow_daytime = risk::reduce(&parts.tomorrow_daytime);

    let outlook = Outlook::for_today(!parts.today.is_empty());
    let utterance = match outlook {
        Outlook::TodayAndTonight => select_response(outlook, today, tonight),
        Outlook::TonightAndTomorrow => select_response(outlook, tonight, tomorrow_daytime),
    };

    tracing::info!(
        ?outlook,
        today = ?today.tier,
        tonight = ?tonight.tier,
        tomorrow_daytime = ?tomorrow_daytime.tier,
        "classified forecast"
    );

    Assessment {
        today,
        tonight,
        tomorrow_daytime,
        outlook,
        utterance,
    }
}

pub fn classify_and_respond(now: DateTime<Utc>, payload: &ForecastPayload) -> String {
    assess(now, payload).utterance
}

/// Validates a raw provider document before classifying it.
pub fn classify_and_respond_json(
    now: DateTime<Utc>,
    raw: &serde_json::Value,
) -> Result<String, MalformedForecast> {
    let payload = ForecastPayload::from_json(raw)?;
    Ok(classify_and_respond(now, &payload))
}
