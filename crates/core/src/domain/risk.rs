use crate::domain::forecast::ForecastPoint;
use serde::Serialize;

pub const UNLIKELY_THRESHOLD: f64 = 0.05;
pub const LIKELY_THRESHOLD: f64 = 0.25;

/// Coarse precipitation likelihood, ordered from driest to wettest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    None,
    Unlikely,
    Likely,
}

impl RiskTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability < UNLIKELY_THRESHOLD {
            Self::None
        } else if probability < LIKELY_THRESHOLD {
            Self::Unlikely
        } else {
            Self::Likely
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::None => 0,
            Self::Unlikely => 1,
            Self::Likely => 2,
        }
    }
}

/// Peak probability observed in a window together with its tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowRisk {
    pub tier: RiskTier,
    pub probability: f64,
}

impl WindowRisk {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            tier: RiskTier::from_probability(probability),
            probability,
        }
    }
}

/// Reduces a window to its worst hour. An empty window is dry.
pub fn reduce(points: &[ForecastPoint]) -> WindowRisk {
    let probability = points
        .iter()
        .map(|p| p.precip_probability)
        .fold(0.0_f64, f64::max);
    WindowRisk::from_probability(probability)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(probabilities: &[f64]) -> Vec<ForecastPoint> {
        probabilities
            .iter()
            .enumerate()
            .map(|(i, p)| ForecastPoint::from_epoch(1_792_418_400 + 3600 * i as i64, *p).unwrap())
            .collect()
    }

    #[test]
    fn tier_boundaries_are_inclusive_on_the_low_end() {
        assert_eq!(RiskTier::from_probability(0.0), RiskTier::None);
        assert_eq!(RiskTier::from_probability(0.0499), RiskTier::None);
        assert_eq!(RiskTier::from_probability(0.05), RiskTier::Unlikely);
        assert_eq!(RiskTier::from_probability(0.2499), RiskTier::Unlikely);
        assert_eq!(RiskTier::from_probability(0.25), RiskTier::Likely);
        assert_eq!(RiskTier::from_probability(1.0), RiskTier::Likely);
    }

    #[test]
    fn tiers_are_ordered_by_wetness() {
        assert!(RiskTier::None < RiskTier::Unlikely);
        assert!(RiskTier::Unlikely < RiskTier::Likely);
    }

    #[test]
    fn empty_window_is_dry() {
        let risk = reduce(&[]);
        assert_eq!(risk.probability, 0.0);
        assert_eq!(risk.tier, RiskTier::None);
    }

    #[test]
    fn reduces_to_the_peak_hour() {
        let risk = reduce(&points(&[0.01, 0.3, 0.12, 0.0]));
        assert_eq!(risk.probability, 0.3);
        assert_eq!(risk.tier, RiskTier::Likely);
    }

    #[test]
    fn single_point_at_lower_boundary_is_unlikely() {
        let risk = reduce(&points(&[0.05]));
        assert_eq!(risk.probability, 0.05);
        assert_eq!(risk.tier, RiskTier::Unlikely);
    }
}
