//! Result Encoder
//!
//! Normalizes a [`RawAnalysis`] into a bounded [`Recommendation`] and
//! serializes the four-field record the vault contract decodes:
//!
//! ```text
//! {"recommendation":"BUY - AI recommends accumulating position","confidence":80,"riskLevel":0,"timestamp":1700000000}
//! ```

use chrono::Utc;
use serde_json::json;

use crate::error::Result;
use crate::model::{Action, OnChainPayload, RawAnalysis, Recommendation, RiskLevel};

/// Text fields are cut to this many characters
pub const MAX_TEXT_CHARS: usize = 200;

/// Recommendation length used on the single oversize retry
pub const COMPACT_TEXT_CHARS: usize = 100;

/// Serialized payload cap, in bytes
pub const MAX_PAYLOAD_BYTES: usize = 1024;

pub const UNCLEAR_SIGNAL: &str = "HOLD - No clear signal";
pub const DEFAULT_REASONING: &str = "Market analysis completed";
pub const FALLBACK_RECOMMENDATION: &str = "HOLD - AI analysis unavailable, using conservative strategy";

/// On-chain text for an action label; exact match only
pub fn recommendation_text(action: &str) -> &'static str {
    match Action::from_label(action) {
        Some(Action::Buy) => "BUY - AI recommends accumulating position",
        Some(Action::Sell) => "SELL - AI recommends reducing exposure",
        Some(Action::Hold) => "HOLD - AI recommends maintaining position",
        None => UNCLEAR_SIGNAL,
    }
}

pub fn clamp_confidence(confidence: i64) -> u8 {
    u8::try_from(confidence.clamp(0, 100)).unwrap_or(100)
}

/// LOW/MEDIUM/HIGH → 0/1/2, anything else → 1
pub fn risk_code(risk: &str) -> u8 {
    risk_level(risk).code()
}

fn risk_level(risk: &str) -> RiskLevel {
    RiskLevel::from_label(risk).unwrap_or(RiskLevel::Medium)
}

/// Build a recommendation stamped with the current time
pub fn build(raw: &RawAnalysis) -> Recommendation {
    build_at(raw, Utc::now().timestamp())
}

pub fn build_at(raw: &RawAnalysis, timestamp: i64) -> Recommendation {
    let action = Action::from_label(&raw.action).unwrap_or(Action::Hold);
    let reasoning = if raw.reasoning.is_empty() {
        DEFAULT_REASONING.to_string()
    } else {
        truncate_chars(&raw.reasoning, MAX_TEXT_CHARS)
    };

    Recommendation {
        action,
        recommendation: truncate_chars(recommendation_text(&raw.action), MAX_TEXT_CHARS),
        confidence: clamp_confidence(raw.confidence),
        reasoning,
        risk_level: risk_level(&raw.risk),
        timestamp,
        is_ai_generated: raw.is_ai_generated,
    }
}

/// Serialize the on-chain payload, compacting the text once if oversize
pub fn encode(rec: &Recommendation) -> Result<Vec<u8>> {
    let mut payload = OnChainPayload::from(rec);
    let bytes = serde_json::to_vec(&payload)?;
    if bytes.len() <= MAX_PAYLOAD_BYTES {
        return Ok(bytes);
    }

    tracing::warn!(size = bytes.len(), "Payload over {MAX_PAYLOAD_BYTES} bytes, compacting recommendation text");
    payload.recommendation = truncate_chars(&payload.recommendation, COMPACT_TEXT_CHARS);
    Ok(serde_json::to_vec(&payload)?)
}

/// Recommendation returned when the pipeline itself fails
pub fn fallback_recommendation() -> Recommendation {
    Recommendation {
        action: Action::Hold,
        recommendation: FALLBACK_RECOMMENDATION.into(),
        confidence: 50,
        reasoning: DEFAULT_REASONING.into(),
        risk_level: RiskLevel::Medium,
        timestamp: Utc::now().timestamp(),
        is_ai_generated: false,
    }
}

/// Encoded fallback; built without fallible serialization
pub fn fallback_payload() -> Vec<u8> {
    json!({
        "recommendation": FALLBACK_RECOMMENDATION,
        "confidence": 50,
        "riskLevel": RiskLevel::Medium.code(),
        "timestamp": Utc::now().timestamp(),
    })
    .to_string()
    .into_bytes()
}

/// Cut to at most `max` characters on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn raw(action: &str, confidence: i64, risk: &str) -> RawAnalysis {
        RawAnalysis {
            action: action.into(),
            confidence,
            reasoning: "because".into(),
            risk: risk.into(),
            is_ai_generated: false,
        }
    }

    #[test]
    fn test_confidence_always_bounded() {
        for c in [-500, -1, 0, 37, 100, 101, 110, i64::MAX, i64::MIN] {
            let rec = build(&raw("BUY", c, "LOW"));
            assert!(rec.confidence <= 100, "confidence {c} → {}", rec.confidence);
        }
        assert_eq!(clamp_confidence(-3), 0);
        assert_eq!(clamp_confidence(90), 90);
        assert_eq!(clamp_confidence(110), 100);
    }

    #[test]
    fn test_unknown_action_has_no_clear_signal() {
        for action in ["", "buy", "Strong Buy", "HODL", " SELL"] {
            assert_eq!(recommendation_text(action), UNCLEAR_SIGNAL);
            assert_eq!(build(&raw(action, 50, "LOW")).recommendation, UNCLEAR_SIGNAL);
        }
        assert_eq!(recommendation_text("SELL"), "SELL - AI recommends reducing exposure");
    }

    #[test]
    fn test_unknown_risk_maps_to_medium() {
        for risk in ["", "low", "EXTREME", "Medium"] {
            assert_eq!(risk_code(risk), 1);
        }
        assert_eq!(risk_code("LOW"), 0);
        assert_eq!(risk_code("HIGH"), 2);
    }

    #[test]
    fn test_reasoning_bounded_and_defaulted() {
        let mut long = raw("HOLD", 65, "MEDIUM");
        long.reasoning = "é".repeat(500);
        assert_eq!(build(&long).reasoning.chars().count(), MAX_TEXT_CHARS);

        let mut empty = raw("HOLD", 65, "MEDIUM");
        empty.reasoning.clear();
        assert_eq!(build(&empty).reasoning, DEFAULT_REASONING);
    }

    #[test]
    fn test_encode_has_exactly_four_fields() {
        let rec = build_at(&raw("SELL", 75, "HIGH"), 1_700_000_000);
        let value: Value = serde_json::from_slice(&encode(&rec).unwrap()).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), 4);
        assert_eq!(obj["recommendation"], "SELL - AI recommends reducing exposure");
        assert_eq!(obj["confidence"], 75);
        assert_eq!(obj["riskLevel"], 2);
        assert_eq!(obj["timestamp"], 1_700_000_000);
    }

    #[test]
    fn test_oversize_payload_compacted_once() {
        let mut rec = build_at(&raw("BUY", 80, "LOW"), 1);
        rec.recommendation = "x".repeat(2000);

        let value: Value = serde_json::from_slice(&encode(&rec).unwrap()).unwrap();
        assert_eq!(value["recommendation"].as_str().unwrap().len(), COMPACT_TEXT_CHARS);
    }

    #[test]
    fn test_encoder_is_idempotent() {
        let input = raw("BUY", 140, "NONSENSE");
        let a = build(&input);
        let b = build(&input);
        assert_eq!(a.recommendation, b.recommendation);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.risk_level, b.risk_level);
    }

    #[test]
    fn test_fallback_payload_shape() {
        let value: Value = serde_json::from_slice(&fallback_payload()).unwrap();
        assert_eq!(value["recommendation"], FALLBACK_RECOMMENDATION);
        assert_eq!(value["confidence"], 50);
        assert_eq!(value["riskLevel"], 1);
        assert!(value["timestamp"].as_i64().unwrap() > 0);
        assert_eq!(fallback_recommendation().risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
