//! Spoken recommendations, one hand-written sentence per pair of risk tiers.
//!
//! Each table is indexed `[first][second]` by [`RiskTier`]. `{first}` and `{second}`
//! are replaced with the corresponding window's peak probability as a whole percent.

use crate::domain::risk::{RiskTier, WindowRisk};
use serde::Serialize;

/// Which pair of windows the recommendation talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    /// Hours are left today: (today, tonight).
    TodayAndTonight,
    /// Today is over: (tonight, tomorrow daytime).
    TonightAndTomorrow,
}

impl Outlook {
    pub fn for_today(today_has_hours: bool) -> Self {
        if today_has_hours {
            Self::TodayAndTonight
        } else {
            Self::TonightAndTomorrow
        }
    }
}

const FIRST: &str = "{first}";
const SECOND: &str = "{second}";

const TODAY_AND_TONIGHT: [[&str; 3]; 3] = [
    [
        "All looks clear, there should be no precipitation today or tonight.",
        "There should be no precipitation today, but be careful because there is a {second} percent chance of precipitation tonight.",
        "You should be okay today, but be careful because there is a {second} percent chance of precipitation tonight.",
    ],
    [
        "Be careful, there is a {first} percent chance of precipitation today, but tonight should be clear.",
        "Be careful, there is a {first} percent chance of precipitation today and a {second} percent chance of precipitation tonight.",
        "Be careful, there is a {first} percent chance of precipitation today. But you should put your top on tonight because there is a {second} percent chance of precipitation.",
    ],
    [
        "There is a {first} percent chance of precipitation today. But you could put your top down tonight, it should be clear.",
        "There is a {first} percent chance of precipitation today. But you might be able to put your top down tonight, there is a {second} percent chance of precipitation.",
        "There is a {first} percent chance of precipitation today and a {second} percent chance of precipitation tonight.",
    ],
];

const TONIGHT_AND_TOMORROW: [[&str; 3]; 3] = [
    [
        "All looks good, there should be no precipitation tonight or tomorrow morning.",
        "Tonight looks good. There should be no precipitation tonight, but be careful because there is a {second} percent chance of precipitation tomorrow during the day.",
        "You should be okay tonight, but make sure to put your top on before tomorrow because there is a {second} percent chance of precipitation during the day.",
    ],
    [
        "Careful, there is a {first} percent chance of precipitation tonight, but tomorrow during the day should be clear.",
        "Be careful, there is a {first} percent chance of precipitation tonight and a {second} percent chance of precipitation tomorrow during the day.",
        "Be careful, there is a {first} percent chance of precipitation tonight. But you should put your top on before tomorrow because there is a {second} percent chance of precipitation during the day.",
    ],
    [
        "There is a {first} percent chance of precipitation tonight. But you could put your top down tomorrow during the day, it should be clear.",
        "There is a {first} percent chance of precipitation tonight. But you might be able to put your top down tomorrow during the day. There is a {second} percent chance of precipitation.",
        "There is a {first} percent chance of precipitation tonight and a {second} percent chance of precipitation tomorrow during the day.",
    ],
];

pub fn template(outlook: Outlook, first: RiskTier, second: RiskTier) -> &'static str {
    let table = match outlook {
        Outlook::TodayAndTonight => &TODAY_AND_TONIGHT,
        Outlook::TonightAndTomorrow => &TONIGHT_AND_TOMORROW,
    };
    table[first.index()][second.index()]
}

pub fn select_response(outlook: Outlook, first: WindowRisk, second: WindowRisk) -> String {
    template(outlook, first.tier, second.tier)
        .replace(FIRST, &percent(first.probability).to_string())
        .replace(SECOND, &percent(second.probability).to_string())
}

/// Probability as a whole percent, rounding halves up.
pub fn percent(probability: f64) -> u32 {
    (probability * 100.0 + 0.5).floor().max(0.0) as u32
}
