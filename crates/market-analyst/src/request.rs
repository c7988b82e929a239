//! Request Decoding
//!
//! The oracle hands over a UTF-8 JSON buffer:
//!
//! ```text
//! {"user":"0x...","balance":"100","timestamp":"1234567890","riskProfile":"LOW"}
//! ```
//!
//! Anything that does not decode into a usable context is replaced by
//! [`UserRequestContext::fallback`]; decoding never fails the request.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::error::{AnalystError, Result};
use crate::model::{RiskProfile, UserRequestContext};

/// Wire format of an incoming request
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, rename = "riskProfile", skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<Value>,
}

/// Decode a request, substituting the default context on any problem
pub fn decode_request(bytes: &[u8]) -> UserRequestContext {
    match try_decode_request(bytes) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::warn!(error = %e, "Using default user context due to parse error");
            UserRequestContext::fallback()
        }
    }
}

/// Strict decode; the error says why the buffer was rejected
pub fn try_decode_request(bytes: &[u8]) -> Result<UserRequestContext> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| AnalystError::InvalidRequest(format!("not UTF-8: {e}")))?;
    let envelope: RequestEnvelope = serde_json::from_str(text)
        .map_err(|e| AnalystError::InvalidRequest(format!("not a JSON object: {e}")))?;

    let user = envelope.user
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AnalystError::InvalidRequest("missing user".into()))?;

    let balance = envelope.balance
        .as_ref()
        .and_then(parse_balance)
        .ok_or_else(|| AnalystError::InvalidRequest("missing or invalid balance".into()))?;

    let timestamp = envelope.timestamp
        .as_ref()
        .and_then(parse_timestamp)
        .unwrap_or_else(|| Utc::now().timestamp());

    let risk_profile = RiskProfile::parse(envelope.risk_profile.as_ref().and_then(Value::as_str));

    Ok(UserRequestContext::new(user, balance, risk_profile).with_timestamp(timestamp))
}

/// Serialize a context in the request wire format
pub fn simulate_request(ctx: &UserRequestContext) -> Vec<u8> {
    let envelope = RequestEnvelope {
        user: Some(Value::String(ctx.user_address.clone())),
        balance: Some(Value::String(ctx.token_balance.to_string())),
        timestamp: Some(Value::String(ctx.timestamp.to_string())),
        risk_profile: Some(Value::String(ctx.risk_profile.as_str().into())),
    };
    serde_json::to_value(&envelope)
        .unwrap_or(Value::Null)
        .to_string()
        .into_bytes()
}

/// Leading numeric literal; trailing text is ignored ("12abc" is 12).
/// Values outside the `Decimal` range are rejected.
fn parse_balance(value: &Value) -> Option<Decimal> {
    let balance = match value {
        Value::String(s) => parse_decimal(numeric_prefix(s.trim()))?,
        Value::Number(n) => parse_decimal(&n.to_string())?,
        _ => return None,
    };
    (!balance.is_sign_negative()).then_some(balance)
}

fn parse_decimal(literal: &str) -> Option<Decimal> {
    Decimal::from_str(literal)
        .or_else(|_| Decimal::from_scientific(literal))
        .ok()
}

/// Longest prefix of `s` shaped like `[+-]digits[.digits][e[+-]digits]`
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_end = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = digits_end(sign);
    let mut mantissa_digits = end - sign;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_end(end + 1);
        if frac_end > end + 1 {
            mantissa_digits += frac_end - end - 1;
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_digits = end + 1 + usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_end(exp_digits);
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    &s[..end]
}

fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
    .filter(|ts| *ts > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_full_request() {
        let raw = br#"{"user":"0xabc","balance":"250.5","timestamp":"1700000000","riskProfile":"HIGH"}"#;
        let ctx = decode_request(raw);
        assert_eq!(ctx.user_address, "0xabc");
        assert_eq!(ctx.token_balance, dec!(250.5));
        assert_eq!(ctx.timestamp, 1_700_000_000);
        assert_eq!(ctx.risk_profile, RiskProfile::High);
    }

    #[test]
    fn test_optional_fields_default() {
        let ctx = decode_request(br#"{"user":"0xabc","balance":100}"#);
        assert_eq!(ctx.risk_profile, RiskProfile::Moderate);
        assert!(ctx.timestamp > 1_600_000_000);
        assert_eq!(ctx.token_balance, dec!(100));
    }

    #[test]
    fn test_unparseable_timestamp_defaults_to_now() {
        let ctx = decode_request(br#"{"user":"0xabc","balance":"1","timestamp":"soon"}"#);
        assert_eq!(ctx.user_address, "0xabc");
        assert!(ctx.timestamp > 1_600_000_000);
    }

    #[test]
    fn test_malformed_json_uses_fallback() {
        let ctx = decode_request(b"{not json");
        assert_eq!(ctx.user_address, "0xUNKNOWN");
        assert_eq!(ctx.token_balance, dec!(100));
        assert_eq!(ctx.risk_profile, RiskProfile::Moderate);
    }

    #[test]
    fn test_missing_fields_use_fallback() {
        assert_eq!(decode_request(br#"{"balance":"5"}"#).user_address, "0xUNKNOWN");
        assert_eq!(decode_request(br#"{"user":"0x1"}"#).user_address, "0xUNKNOWN");
        assert_eq!(decode_request(br#"{"user":"0x1","balance":"-3"}"#).user_address, "0xUNKNOWN");
        assert_eq!(decode_request(br#"{"user":"0x1","balance":"lots"}"#).user_address, "0xUNKNOWN");
        assert_eq!(decode_request(&[0xff, 0xfe]).user_address, "0xUNKNOWN");
        assert_eq!(decode_request(b"[1,2,3]").user_address, "0xUNKNOWN");
    }

    #[test]
    fn test_balance_reads_numeric_prefix() {
        let balance = |raw: &str| decode_request(raw.as_bytes()).token_balance;
        assert_eq!(balance(r#"{"user":"0x1","balance":"12abc"}"#), dec!(12));
        assert_eq!(balance(r#"{"user":"0x1","balance":" 7.25 tokens"}"#), dec!(7.25));
        assert_eq!(balance(r#"{"user":"0x1","balance":"1.5e3"}"#), dec!(1500));
        assert_eq!(balance(r#"{"user":"0x1","balance":"3.e"}"#), dec!(3));
    }

    #[test]
    fn test_balance_out_of_range_rejected() {
        assert_eq!(decode_request(br#"{"user":"0x1","balance":"1e30"}"#).user_address, "0xUNKNOWN");
        assert_eq!(decode_request(br#"{"user":"0x1","balance":1e30}"#).user_address, "0xUNKNOWN");
        assert_eq!(decode_request(br#"{"user":"0x1","balance":"e5"}"#).user_address, "0xUNKNOWN");
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(numeric_prefix("12abc"), "12");
        assert_eq!(numeric_prefix("-4.5e-2x"), "-4.5e-2");
        assert_eq!(numeric_prefix("9e+"), "9");
        assert_eq!(numeric_prefix(".abc"), "");
    }

    #[test]
    fn test_try_decode_reports_reason() {
        let err = try_decode_request(br#"{"user":""}"#).unwrap_err();
        assert!(err.to_string().contains("missing user"));
    }

    #[test]
    fn test_simulated_request_decodes_back() {
        let ctx = UserRequestContext::new("0xfeed", dec!(42.25), RiskProfile::Low)
            .with_timestamp(1_700_000_123);
        let decoded = try_decode_request(&simulate_request(&ctx)).unwrap();
        assert_eq!(decoded, ctx);
    }
}
