//! Analysis Strategies
//!
//! ```text
//! AnalysisStrategy::analyze
//!   ├── llm configured ── LlmAnalyst::analyze ──┬── Ok  → RawAnalysis (isAIGenerated)
//!   │                                            └── Err → rules::evaluate
//!   └── no llm ─────────── rules::evaluate
//! ```
//!
//! One model attempt per request, never retried.

pub mod llm;
pub mod rules;

pub use llm::LlmAnalyst;
pub use rules::{RuleOutcome, evaluate};

use crate::model::{MarketSnapshot, RawAnalysis, UserRequestContext};

/// Which path a strategy will try first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisPath {
    Model,
    RuleBased,
}

impl AnalysisPath {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::RuleBased => "rule-based",
        }
    }
}

/// Chooses between the model-backed analyst and the rule engine
#[derive(Default)]
pub struct AnalysisStrategy {
    llm: Option<LlmAnalyst>,
}

impl AnalysisStrategy {
    pub const fn rule_based() -> Self {
        Self { llm: None }
    }

    pub const fn with_model(llm: LlmAnalyst) -> Self {
        Self { llm: Some(llm) }
    }

    pub const fn path(&self) -> AnalysisPath {
        if self.llm.is_some() {
            AnalysisPath::Model
        } else {
            AnalysisPath::RuleBased
        }
    }

    /// Produce a raw analysis; model failures degrade to the rule engine
    pub async fn analyze(&self, ctx: &UserRequestContext, snapshot: &MarketSnapshot) -> RawAnalysis {
        if let Some(llm) = &self.llm {
            match llm.analyze(ctx, snapshot).await {
                Ok(analysis) => return analysis,
                Err(e) => {
                    tracing::warn!(
                        provider = %llm.provider_name(),
                        error = %e,
                        "Model analysis failed, using rule-based analysis"
                    );
                }
            }
        }

        tracing::info!("Using rule-based analysis");
        evaluate(ctx, snapshot).into_raw()
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::ScriptedProvider;
    use super::*;
    use crate::model::RiskProfile;
    use analyst_core::GenerationOptions;
    use rust_decimal_macros::dec;

    fn snapshot(price: rust_decimal::Decimal, sentiment: u8) -> MarketSnapshot {
        MarketSnapshot { crypto_price: price, sentiment_index: sentiment, ..MarketSnapshot::fallback() }
    }

    fn ctx() -> UserRequestContext {
        UserRequestContext::new("0xabc", dec!(100), RiskProfile::Moderate)
    }

    #[tokio::test]
    async fn test_without_model_uses_rules() {
        let strategy = AnalysisStrategy::rule_based();
        assert_eq!(strategy.path(), AnalysisPath::RuleBased);

        let raw = strategy.analyze(&ctx(), &snapshot(dec!(46000), 75)).await;
        assert_eq!(raw.action, "SELL");
        assert_eq!(raw.confidence, 75);
        assert!(!raw.is_ai_generated);
    }

    #[tokio::test]
    async fn test_model_result_is_flagged() {
        let provider = Arc::new(ScriptedProvider::replying(
            r#"{"action":"BUY","confidence":88,"reasoning":"Fear is high","risk":"LOW"}"#,
        ));
        let strategy = AnalysisStrategy::with_model(LlmAnalyst::new(provider.clone(), GenerationOptions::default()));
        assert_eq!(strategy.path(), AnalysisPath::Model);

        let raw = strategy.analyze(&ctx(), &snapshot(dec!(40000), 50)).await;
        assert_eq!(raw.action, "BUY");
        assert_eq!(raw.confidence, 88);
        assert!(raw.is_ai_generated);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_once() {
        let provider = Arc::new(ScriptedProvider::failing());
        let strategy = AnalysisStrategy::with_model(LlmAnalyst::new(provider.clone(), GenerationOptions::default()));

        let raw = strategy.analyze(&ctx(), &snapshot(dec!(40000), 50)).await;
        assert_eq!(raw.action, "HOLD");
        assert_eq!(raw.confidence, 65);
        assert_eq!(raw.risk, "MEDIUM");
        assert!(!raw.is_ai_generated);
        assert_eq!(provider.calls(), 1);
    }
}
