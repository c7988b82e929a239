//! Rule-Based Recommendation Engine
//!
//! Three-way partition on BTC price and the Fear & Greed index, followed by
//! an independent risk-profile adjustment pass.
//!
//! ```text
//!                     sentiment
//!                 < 30      30..=70     > 70
//!   price > 45k   HOLD       HOLD       SELL (75, HIGH)
//!   35k..=45k     HOLD       HOLD       HOLD
//!   price < 35k   BUY (80)   HOLD       HOLD
//!                 LOW
//!   HOLD = 65, MEDIUM
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{Action, MarketSnapshot, RawAnalysis, RiskLevel, RiskProfile, UserRequestContext};

const SELL_PRICE_ABOVE: Decimal = dec!(45000);
const SELL_SENTIMENT_ABOVE: u8 = 70;
const BUY_PRICE_BELOW: Decimal = dec!(35000);
const BUY_SENTIMENT_BELOW: u8 = 30;

/// Output of the rule engine before encoding
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleOutcome {
    pub action: Action,
    /// Not clamped; the high-profile bonus may push this past 100
    pub confidence: i64,
    pub reasoning: String,
    pub risk: RiskLevel,
}

impl RuleOutcome {
    pub fn into_raw(self) -> RawAnalysis {
        RawAnalysis {
            action: self.action.as_str().into(),
            confidence: self.confidence,
            reasoning: self.reasoning,
            risk: self.risk.as_str().into(),
            is_ai_generated: false,
        }
    }
}

/// Evaluate the rule table for a request
pub fn evaluate(ctx: &UserRequestContext, snapshot: &MarketSnapshot) -> RuleOutcome {
    let price = snapshot.crypto_price;
    let sentiment = snapshot.sentiment_index;

    // First matching branch wins
    let mut outcome = if price > SELL_PRICE_ABOVE && sentiment > SELL_SENTIMENT_ABOVE {
        RuleOutcome {
            action: Action::Sell,
            confidence: 75,
            reasoning: "Market showing extreme greed, price at high levels".into(),
            risk: RiskLevel::High,
        }
    } else if price < BUY_PRICE_BELOW && sentiment < BUY_SENTIMENT_BELOW {
        RuleOutcome {
            action: Action::Buy,
            confidence: 80,
            reasoning: "Market fear high, price at attractive levels".into(),
            risk: RiskLevel::Low,
        }
    } else {
        RuleOutcome {
            action: Action::Hold,
            confidence: 65,
            reasoning: "Market conditions neutral, maintain current position".into(),
            risk: RiskLevel::Medium,
        }
    };

    if ctx.risk_profile == RiskProfile::Low && outcome.risk == RiskLevel::High {
        outcome.action = Action::Hold;
        outcome.confidence = 70;
        outcome.reasoning.push_str(" Adjusted for low risk tolerance");
    }

    if ctx.risk_profile == RiskProfile::High && outcome.risk == RiskLevel::Low {
        outcome.confidence += 10;
    }

    tracing::debug!(
        action = outcome.action.as_str(),
        confidence = outcome.confidence,
        risk = outcome.risk.as_str(),
        profile = %ctx.risk_profile,
        "Rule-based analysis complete"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(price: Decimal, sentiment: u8) -> MarketSnapshot {
        MarketSnapshot {
            crypto_price: price,
            sentiment_index: sentiment,
            ..MarketSnapshot::fallback()
        }
    }

    fn ctx(profile: RiskProfile) -> UserRequestContext {
        UserRequestContext::new("0xabc", dec!(100), profile)
    }

    #[test]
    fn test_extreme_greed_sells() {
        let out = evaluate(&ctx(RiskProfile::Moderate), &snapshot(dec!(46000), 75));
        assert_eq!(out.action, Action::Sell);
        assert_eq!(out.confidence, 75);
        assert_eq!(out.risk, RiskLevel::High);
        assert_eq!(out.reasoning, "Market showing extreme greed, price at high levels");
    }

    #[test]
    fn test_low_profile_holds_on_high_risk() {
        let out = evaluate(&ctx(RiskProfile::Low), &snapshot(dec!(46000), 75));
        assert_eq!(out.action, Action::Hold);
        assert_eq!(out.confidence, 70);
        assert_eq!(out.risk, RiskLevel::High);
        assert_eq!(
            out.reasoning,
            "Market showing extreme greed, price at high levels Adjusted for low risk tolerance"
        );
    }

    #[test]
    fn test_fear_buys_without_adjustment_for_low_profile() {
        let out = evaluate(&ctx(RiskProfile::Low), &snapshot(dec!(30000), 20));
        assert_eq!(out.action, Action::Buy);
        assert_eq!(out.confidence, 80);
        assert_eq!(out.risk, RiskLevel::Low);
    }

    #[test]
    fn test_high_profile_bonus_on_low_risk() {
        let out = evaluate(&ctx(RiskProfile::High), &snapshot(dec!(30000), 20));
        assert_eq!(out.action, Action::Buy);
        assert_eq!(out.confidence, 90);
        assert_eq!(out.risk, RiskLevel::Low);
    }

    #[test]
    fn test_neutral_holds() {
        for profile in [RiskProfile::Low, RiskProfile::Moderate, RiskProfile::High] {
            let out = evaluate(&ctx(profile), &snapshot(dec!(40000), 50));
            assert_eq!(out.action, Action::Hold);
            assert_eq!(out.confidence, 65);
            assert_eq!(out.risk, RiskLevel::Medium);
        }
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Boundary values fall through to HOLD
        assert_eq!(evaluate(&ctx(RiskProfile::Moderate), &snapshot(dec!(45000), 75)).action, Action::Hold);
        assert_eq!(evaluate(&ctx(RiskProfile::Moderate), &snapshot(dec!(46000), 70)).action, Action::Hold);
        assert_eq!(evaluate(&ctx(RiskProfile::Moderate), &snapshot(dec!(35000), 20)).action, Action::Hold);
        assert_eq!(evaluate(&ctx(RiskProfile::Moderate), &snapshot(dec!(30000), 30)).action, Action::Hold);
        // High price with fear, low price with greed: neither rule applies
        assert_eq!(evaluate(&ctx(RiskProfile::Moderate), &snapshot(dec!(50000), 10)).action, Action::Hold);
        assert_eq!(evaluate(&ctx(RiskProfile::Moderate), &snapshot(dec!(20000), 90)).action, Action::Hold);
    }

    #[test]
    fn test_into_raw_labels() {
        let raw = evaluate(&ctx(RiskProfile::High), &snapshot(dec!(30000), 20)).into_raw();
        assert_eq!(raw.action, "BUY");
        assert_eq!(raw.risk, "LOW");
        assert_eq!(raw.confidence, 90);
        assert!(!raw.is_ai_generated);
    }
}
