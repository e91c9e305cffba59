//! Splits an hourly forecast into today / tonight / tomorrow-daytime windows
//! relative to the caller's local "now".

use crate::domain::forecast::{ForecastPayload, ForecastPoint};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;

// Local hour at which "today" ends and "tonight" begins (7pm).
const EVENING_START_HOUR: u32 = 19;
// Local hour at which tomorrow's daytime begins (8am); earlier hours still count as tonight.
const MORNING_START_HOUR: u32 = 8;
// Some calendars number the day after Saturday as 7 rather than wrapping to 0.
const DAY_NUMBER_ALIAS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    Today,
    Tonight,
    TomorrowDaytime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionedForecast {
    pub today: Vec<ForecastPoint>,
    pub tonight: Vec<ForecastPoint>,
    pub tomorrow_daytime: Vec<ForecastPoint>,
}

impl PartitionedForecast {
    pub fn window(&self, window: Window) -> &[ForecastPoint] {
        match window {
            Window::Today => &self.today,
            Window::Tonight => &self.tonight,
            Window::TomorrowDaytime => &self.tomorrow_daytime,
        }
    }

    fn push(&mut self, window: Window, point: ForecastPoint) {
        match window {
            Window::Today => self.today.push(point),
            Window::Tonight => self.tonight.push(point),
            Window::TomorrowDaytime => self.tomorrow_daytime.push(point),
        }
    }
}

/// Assigns each point to at most one window, preserving input order.
///
/// Day numbers count from Sunday = 0. Points past tomorrow's daytime are dropped.
pub fn partition(now: DateTime<Utc>, payload: &ForecastPayload) -> PartitionedForecast {
    let offset = payload.offset();
    let local_now = now.with_timezone(&offset);
    let local_day_now = local_now.weekday().num_days_from_sunday();

    tracing::debug!(%local_now, local_day_now, "partitioning hourly forecast");

    let mut out = PartitionedForecast::default();
    for point in payload.points() {
        let local = point.time.with_timezone(&offset);
        let local_day = local.weekday().num_days_from_sunday();
        match classify(local_day_now, local_day, local.hour()) {
            Some(window) => {
                tracing::debug!(%local, ?window, p = point.precip_probability, "classified point");
                out.push(window, *point);
            }
            None => {
                tracing::debug!(%local, "point is outside the forecast windows");
            }
        }
    }

    out
}

/// Window membership for a point at `local_day`/`local_hour`, seen from `local_day_now`.
///
/// Only `local_day_now + 1` and the `(0, 7)` alias count as tomorrow, so with Sunday-based
/// numbering a Saturday "now" never sees Sunday points.
pub fn classify(local_day_now: u32, local_day: u32, local_hour: u32) -> Option<Window> {
    if local_day == local_day_now {
        if local_hour < EVENING_START_HOUR {
            Some(Window::Today)
        } else {
            Some(Window::Tonight)
        }
    } else if local_day == local_day_now + 1
        || (local_day == 0 && local_day_now == DAY_NUMBER_ALIAS)
    {
        if local_hour < MORNING_START_HOUR {
            Some(Window::Tonight)
        } else if local_hour < EVENING_START_HOUR {
            Some(Window::TomorrowDaytime)
        } else {
            None
        }
    } else {
        None
    }
}
