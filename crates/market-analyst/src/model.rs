//! Domain Models
//!
//! Request context, market snapshot and recommendation records.
//! Prices and balances use `rust_decimal`; index levels stay `f64`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Risk tolerance declared by the vault user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskProfile {
    Low,
    #[default]
    Moderate,
    High,
}

impl RiskProfile {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
        }
    }

    /// Exact-match label lookup; anything else, including other casings,
    /// is `Moderate`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("LOW") => Self::Low,
            Some("HIGH") => Self::High,
            _ => Self::Moderate,
        }
    }
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recommendation request, decoded from the oracle payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequestContext {
    /// Wallet address of the vault user (opaque)
    pub user_address: String,

    /// Vault token balance (aRWA)
    pub token_balance: Decimal,

    /// Declared risk tolerance
    pub risk_profile: RiskProfile,

    /// Request time, unix seconds
    pub timestamp: i64,
}

impl UserRequestContext {
    /// Address used when the request cannot be decoded
    pub const UNKNOWN_USER: &'static str = "0xUNKNOWN";

    pub fn new(
        user_address: impl Into<String>,
        token_balance: Decimal,
        risk_profile: RiskProfile,
    ) -> Self {
        Self {
            user_address: user_address.into(),
            token_balance,
            risk_profile,
            timestamp: Utc::now().timestamp(),
        }
    }

    pub const fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Default context substituted for malformed requests
    pub fn fallback() -> Self {
        Self::new(Self::UNKNOWN_USER, dec!(100), RiskProfile::Moderate)
    }
}

/// Recommended vault action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }

    /// Exact-match label lookup
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            "HOLD" => Some(Self::Hold),
            _ => None,
        }
    }
}

/// Risk assessment attached to a recommendation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Integer stored on-chain
    pub const fn code(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    /// Exact-match label lookup
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

/// Aggregated market signals for one request
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// BTC spot price in USD
    pub crypto_price: Decimal,

    /// BTC 24h change, percent
    pub crypto_change_24h: Decimal,

    /// S&P 500 level
    pub traditional_index: f64,

    /// NASDAQ composite level
    pub nasdaq_index: f64,

    /// VIX level
    pub volatility_index: f64,

    /// Network gas price in gwei
    pub gas_price_gwei: u32,

    /// Daily active addresses
    pub active_addresses: u64,

    /// Fear & Greed index, 0-100
    pub sentiment_index: u8,

    /// Fear & Greed classification ("Fear", "Greed", ...)
    pub sentiment_label: String,

    /// Sources that answered successfully
    pub sources: Vec<String>,

    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    pub const DEFAULT_CRYPTO_PRICE: Decimal = dec!(42000);
    pub const DEFAULT_CRYPTO_CHANGE: Decimal = dec!(2.5);

    /// Fixed snapshot used when aggregation as a whole fails
    pub fn fallback() -> Self {
        Self {
            crypto_price: Self::DEFAULT_CRYPTO_PRICE,
            crypto_change_24h: Self::DEFAULT_CRYPTO_CHANGE,
            traditional_index: 4700.0,
            nasdaq_index: 16500.0,
            volatility_index: 15.0,
            gas_price_gwei: 30,
            active_addresses: 500_000,
            sentiment_index: 60,
            sentiment_label: "Greed".into(),
            sources: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Starting point before readings are applied: per-field fallbacks,
    /// sentiment randomized around the midpoint
    pub fn seeded() -> Self {
        Self {
            sentiment_index: random_midpoint_sentiment(),
            sentiment_label: "Neutral".into(),
            ..Self::fallback()
        }
    }
}

/// 50 ± 20, the stand-in when the sentiment feed is down
fn random_midpoint_sentiment() -> u8 {
    use rand::Rng;
    rand::rng().random_range(30..70)
}

/// Unbounded analysis produced by either the model or the rule engine.
///
/// Labels stay raw strings and confidence stays unclamped until encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnalysis {
    pub action: String,
    pub confidence: i64,
    pub reasoning: String,
    pub risk: String,

    /// True only when the model-backed path produced this analysis
    #[serde(default)]
    pub is_ai_generated: bool,
}

/// Final, bounded recommendation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub action: Action,

    /// Human-readable action text stored on-chain
    pub recommendation: String,

    /// 0-100
    pub confidence: u8,

    pub reasoning: String,

    pub risk_level: RiskLevel,

    /// Generation time, unix seconds
    pub timestamp: i64,

    #[serde(rename = "isAIGenerated")]
    pub is_ai_generated: bool,
}

/// Exact record the vault contract decodes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainPayload {
    pub recommendation: String,
    pub confidence: u8,
    #[serde(rename = "riskLevel")]
    pub risk_level: u8,
    pub timestamp: i64,
}

impl From<&Recommendation> for OnChainPayload {
    fn from(rec: &Recommendation) -> Self {
        Self {
            recommendation: rec.recommendation.clone(),
            confidence: rec.confidence,
            risk_level: rec.risk_level.code(),
            timestamp: rec.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_profile_parse() {
        assert_eq!(RiskProfile::parse(Some("LOW")), RiskProfile::Low);
        assert_eq!(RiskProfile::parse(Some("HIGH")), RiskProfile::High);
        assert_eq!(RiskProfile::parse(Some(" high ")), RiskProfile::Moderate);
        assert_eq!(RiskProfile::parse(Some("low")), RiskProfile::Moderate);
        assert_eq!(RiskProfile::parse(Some("AGGRESSIVE")), RiskProfile::Moderate);
        assert_eq!(RiskProfile::parse(None), RiskProfile::Moderate);
    }

    #[test]
    fn test_fallback_context() {
        let ctx = UserRequestContext::fallback();
        assert_eq!(ctx.user_address, "0xUNKNOWN");
        assert_eq!(ctx.token_balance, dec!(100));
        assert_eq!(ctx.risk_profile, RiskProfile::Moderate);
        assert!(ctx.timestamp > 0);
    }

    #[test]
    fn test_risk_level_codes() {
        assert_eq!(RiskLevel::Low.code(), 0);
        assert_eq!(RiskLevel::Medium.code(), 1);
        assert_eq!(RiskLevel::High.code(), 2);
        assert_eq!(RiskLevel::from_label("high"), None);
    }

    #[test]
    fn test_seeded_snapshot_is_populated() {
        for _ in 0..50 {
            let snap = MarketSnapshot::seeded();
            assert!((30..70).contains(&snap.sentiment_index));
            assert_eq!(snap.crypto_price, dec!(42000));
            assert!(snap.sources.is_empty());
        }
    }

    #[test]
    fn test_payload_field_names() {
        let rec = Recommendation {
            action: Action::Buy,
            recommendation: "BUY - AI recommends accumulating position".into(),
            confidence: 80,
            reasoning: "cheap".into(),
            risk_level: RiskLevel::Low,
            timestamp: 1_700_000_000,
            is_ai_generated: false,
        };
        let json = serde_json::to_value(OnChainPayload::from(&rec)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["riskLevel"], 0);
        assert_eq!(obj["confidence"], 80);
    }
}
