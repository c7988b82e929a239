//! Weighted Risk Score

use serde::{Deserialize, Serialize};

const MISSING_FACTOR: f64 = 0.5;

/// Normalized risk factors, each expected in [0, 1]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub liquidity: Option<f64>,
    #[serde(default)]
    pub correlation: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub age: Option<f64>,
}

impl RiskFactors {
    fn weighted(&self) -> [(Option<f64>, f64); 5] {
        [
            (self.volatility, 0.3),
            (self.liquidity, 0.2),
            (self.correlation, 0.2),
            (self.market_cap, 0.15),
            (self.age, 0.15),
        ]
    }
}

/// Weighted sum scaled to 0-100; absent or non-finite factors count as 0.5
pub fn calculate_risk_score(factors: &RiskFactors) -> f64 {
    let score: f64 = factors
        .weighted()
        .iter()
        .map(|(value, weight)| value.filter(|v| v.is_finite()).unwrap_or(MISSING_FACTOR) * weight)
        .sum();

    (score * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_all_missing_is_midpoint() {
        assert!(close(calculate_risk_score(&RiskFactors::default()), 50.0));
    }

    #[test]
    fn test_weights() {
        let factors = RiskFactors { volatility: Some(1.0), liquidity: Some(0.0), correlation: Some(0.0), market_cap: Some(0.0), age: Some(0.0) };
        assert!(close(calculate_risk_score(&factors), 30.0));

        let factors = RiskFactors { volatility: Some(0.0), liquidity: Some(0.0), correlation: Some(0.0), market_cap: Some(1.0), age: Some(1.0) };
        assert!(close(calculate_risk_score(&factors), 30.0));
    }

    #[test]
    fn test_clamped() {
        let high = RiskFactors { volatility: Some(10.0), ..Default::default() };
        assert!(close(calculate_risk_score(&high), 100.0));

        let low = RiskFactors { volatility: Some(-10.0), ..Default::default() };
        assert!(close(calculate_risk_score(&low), 0.0));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let factors: RiskFactors = serde_json::from_str(r#"{"marketCap":0.2,"age":0.4}"#).unwrap();
        assert_eq!(factors.market_cap, Some(0.2));
        assert_eq!(factors.volatility, None);
    }
}
