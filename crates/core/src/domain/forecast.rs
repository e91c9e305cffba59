use crate::error::MalformedForecast;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

// The forecast provider reports `offset` in hours; anything this small is
// treated as hours, larger magnitudes as minutes.
const HOURS_OFFSET_LIMIT: f64 = 16.0;
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// One hourly sample of the forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub time: DateTime<Utc>,
    pub precip_probability: f64,
}

impl ForecastPoint {
    pub fn from_epoch(timestamp_utc: i64, precip_probability: f64) -> Option<Self> {
        Some(Self {
            time: DateTime::from_timestamp(timestamp_utc, 0)?,
            precip_probability,
        })
    }

    pub fn timestamp_utc(&self) -> i64 {
        self.time.timestamp()
    }
}

/// A validated hourly forecast for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPayload {
    utc_offset_minutes: i32,
    offset: FixedOffset,
    points: Vec<ForecastPoint>,
}

impl ForecastPayload {
    pub fn new(
        utc_offset_minutes: i32,
        points: Vec<ForecastPoint>,
    ) -> Result<Self, MalformedForecast> {
        if utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
            return Err(MalformedForecast::new(format!(
                "offset out of range: {utc_offset_minutes} minutes"
            )));
        }
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            MalformedForecast::new(format!("invalid offset: {utc_offset_minutes} minutes"))
        })?;

        for (idx, point) in points.iter().enumerate() {
            let p = point.precip_probability;
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(MalformedForecast::new(format!(
                    "hourly.data[{idx}].precipProbability must be between 0 and 1 (got {p})"
                )));
            }
        }

        Ok(Self {
            utc_offset_minutes,
            offset,
            points,
        })
    }

    /// Validates the provider's JSON document (`offset` + `hourly.data`).
    pub fn from_json(raw: &serde_json::Value) -> Result<Self, MalformedForecast> {
        let wire = WireForecast::deserialize(raw)
            .map_err(|e| MalformedForecast::new(e.to_string()))?;
        wire.validate_and_into_payload()
    }

    pub fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }
}

#[derive(Debug, Deserialize)]
struct WireForecast {
    offset: f64,
    hourly: WireHourly,
}

#[derive(Debug, Deserialize)]
struct WireHourly {
    data: Vec<WirePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePoint {
    time: i64,
    // Omitted by the provider for hours with no chance of precipitation.
    #[serde(default)]
    precip_probability: f64,
}

impl WireForecast {
    fn validate_and_into_payload(self) -> Result<ForecastPayload, MalformedForecast> {
        let utc_offset_minutes = offset_minutes(self.offset)?;

        let mut points = Vec::with_capacity(self.hourly.data.len());
        for (idx, p) in self.hourly.data.into_iter().enumerate() {
            let point = ForecastPoint::from_epoch(p.time, p.precip_probability).ok_or_else(|| {
                MalformedForecast::new(format!(
                    "hourly.data[{idx}].time out of range: {}",
                    p.time
                ))
            })?;
            points.push(point);
        }

        ForecastPayload::new(utc_offset_minutes, points)
    }
}

fn offset_minutes(offset: f64) -> Result<i32, MalformedForecast> {
    if !offset.is_finite() {
        return Err(MalformedForecast::new(format!("offset is not finite: {offset}")));
    }

    let minutes = if offset.abs() < HOURS_OFFSET_LIMIT {
        offset * 60.0
    } else {
        offset
    };
    let minutes = minutes.round();
    if minutes.abs() > f64::from(MAX_OFFSET_MINUTES) {
        return Err(MalformedForecast::new(format!("offset out of range: {offset}")));
    }

    Ok(minutes as i32)
}
