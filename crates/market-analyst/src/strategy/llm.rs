//! Model-Backed Analysis
//!
//! Sends the request context and market snapshot to an LLM and reads back
//! `{"action", "confidence", "reasoning", "risk"}`. Replies that are not
//! valid JSON are mined for keywords instead of being rejected.

use std::sync::Arc;

use analyst_core::{GenerationOptions, LlmProvider, Message};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::model::{MarketSnapshot, RawAnalysis, UserRequestContext};

/// System prompt for the market analyst
pub const ANALYST_SYSTEM_PROMPT: &str = "You are an AI investment analyst for a privacy-focused RWA vault. \
Answer with a single JSON object and nothing else.";

const REASONING_EXCERPT_CHARS: usize = 200;
const DEFAULT_CONFIDENCE: i64 = 50;

/// LLM-backed analyst
pub struct LlmAnalyst {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl LlmAnalyst {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider_name(&self) -> String {
        self.provider.info().name
    }

    /// One attempt; any provider error is returned to the caller
    pub async fn analyze(
        &self,
        ctx: &UserRequestContext,
        snapshot: &MarketSnapshot,
    ) -> Result<RawAnalysis> {
        let messages = [
            Message::system(ANALYST_SYSTEM_PROMPT),
            Message::user(build_prompt(ctx, snapshot)),
        ];

        let completion = self.provider.complete(&messages, &self.options).await?;
        tracing::info!(model = %completion.model, "Model analysis received");
        tracing::debug!(content = %completion.content, "Model analysis text");

        let mut analysis = parse_analysis(&completion.content);
        analysis.is_ai_generated = true;
        Ok(analysis)
    }
}

/// Prompt describing the user and the market
pub fn build_prompt(ctx: &UserRequestContext, snapshot: &MarketSnapshot) -> String {
    format!(
        "As an AI investment analyst for a privacy-focused RWA vault, analyze this data:\n\
         \n\
         USER PROFILE:\n\
         - Address: {address}\n\
         - Token Balance: {balance} aRWA\n\
         - Risk Profile: {profile}\n\
         \n\
         MARKET DATA:\n\
         - Bitcoin Price: ${price}\n\
         - 24h Change: {change}%\n\
         - S&P 500: {sp500:.2}\n\
         - Fear & Greed Index: {fng} ({label})\n\
         - Gas Price: {gas} gwei\n\
         \n\
         Provide a concise investment recommendation with:\n\
         1. Action (HOLD/BUY/SELL)\n\
         2. Confidence score (0-100)\n\
         3. Brief reasoning\n\
         4. Risk assessment (LOW/MEDIUM/HIGH)\n\
         \n\
         Format as JSON: {{\"action\": \"...\", \"confidence\": 85, \"reasoning\": \"...\", \"risk\": \"...\"}}",
        address = ctx.user_address,
        balance = ctx.token_balance,
        profile = ctx.risk_profile,
        price = snapshot.crypto_price,
        change = snapshot.crypto_change_24h,
        sp500 = snapshot.traditional_index,
        fng = snapshot.sentiment_index,
        label = snapshot.sentiment_label,
        gas = snapshot.gas_price_gwei,
    )
}

#[derive(Debug, Deserialize)]
struct ModelAnalysis {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    risk: Option<String>,
}

/// Interpret model output: embedded JSON first, keyword heuristics otherwise
pub fn parse_analysis(text: &str) -> RawAnalysis {
    if let Some(parsed) = json_candidates(text)
        .into_iter()
        .find_map(|json| serde_json::from_str::<ModelAnalysis>(json).ok())
    {
        return RawAnalysis {
            action: parsed.action.unwrap_or_default().trim().to_string(),
            confidence: parsed.confidence.as_ref().and_then(confidence_value).unwrap_or(DEFAULT_CONFIDENCE),
            reasoning: parsed.reasoning.unwrap_or_default(),
            risk: parsed.risk.unwrap_or_default().trim().to_string(),
            is_ai_generated: false,
        };
    }

    tracing::warn!("Failed to parse model response as JSON, extracting fields from text");
    RawAnalysis {
        action: extract_action(text).into(),
        confidence: extract_confidence(text),
        reasoning: text.chars().take(REASONING_EXCERPT_CHARS).collect(),
        risk: extract_risk_level(text).into(),
        is_ai_generated: false,
    }
}

/// Places a JSON object may sit, most specific first: the body of a
/// leading code fence, then the first `{` to the last `}`
pub fn json_candidates(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    let mut candidates = Vec::with_capacity(2);
    if let Some(body) = fenced_body(trimmed) {
        candidates.push(body);
    }
    if let Some(span) = brace_span(trimmed) {
        candidates.push(span);
    }
    candidates
}

fn fenced_body(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    // Drop the info string line ("json") and the closing fence
    let inner = rest.split_once('\n').map_or(rest, |(_, body)| body);
    let inner = inner.rfind("```").map_or(inner, |end| &inner[..end]);
    Some(inner.trim())
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[allow(clippy::cast_possible_truncation)]
fn confidence_value(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then(|| number.round() as i64)
}

fn extract_action(text: &str) -> &'static str {
    if text.contains("BUY") || text.contains("buy") {
        "BUY"
    } else if text.contains("SELL") || text.contains("sell") {
        "SELL"
    } else {
        "HOLD"
    }
}

fn extract_risk_level(text: &str) -> &'static str {
    if text.contains("LOW") || text.contains("low") {
        "LOW"
    } else if text.contains("HIGH") || text.contains("high") {
        "HIGH"
    } else {
        "MEDIUM"
    }
}

/// First standalone 1-3 digit number followed, on the same line, by the word
/// "confidence" (any case)
fn extract_confidence(text: &str) -> i64 {
    for line in text.lines() {
        let Some(keyword_at) = line.to_ascii_lowercase().rfind("confidence") else {
            continue;
        };

        for (start, word) in words(line) {
            if start + word.len() > keyword_at {
                break;
            }
            if (1..=3).contains(&word.len()) && word.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(n) = word.parse() {
                    return n;
                }
            }
        }
    }
    DEFAULT_CONFIDENCE
}

/// Maximal runs of `[A-Za-z0-9_]` with their byte offsets
fn words(line: &str) -> impl Iterator<Item = (usize, &str)> {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut rest = line.char_indices().peekable();
    std::iter::from_fn(move || {
        while let Some(&(_, c)) = rest.peek() {
            if is_word(c) {
                break;
            }
            rest.next();
        }
        let (start, _) = *rest.peek()?;
        let mut end = start;
        while let Some(&(i, c)) = rest.peek() {
            if !is_word(c) {
                break;
            }
            end = i + c.len_utf8();
            rest.next();
        }
        Some((start, &line[start..end]))
    })
}
