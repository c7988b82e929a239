//! Analysis Pipeline
//!
//! ```text
//! bytes ─▶ decode ─▶ aggregate ─▶ strategy ─▶ encode ─▶ [privacy wrap] ─▶ bytes
//!            │           │            │          │             │
//!         default     fixed        rules      fallback     unwrapped
//!         context    snapshot    fallback     record        result
//! ```
//!
//! Every stage has its own degradation path. Anything that still escapes,
//! including a panic, is caught once at the top and turned into the
//! conservative fallback record.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use analyst_core::{GenerationOptions, LlmProvider};
use futures::FutureExt;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::aggregator::MarketDataAggregator;
use crate::config::AnalystConfig;
use crate::error::Result;
use crate::model::{MarketSnapshot, Recommendation, UserRequestContext};
use crate::request::{decode_request, simulate_request};
use crate::sources::{BlockchainSource, CoinGeckoSource, FearGreedSource, MarketSimSource, MarketSource};
use crate::strategy::{AnalysisStrategy, LlmAnalyst};
use crate::svckit::encoder;
use crate::svckit::privacy::{EncryptedUserData, PrivacyWrapper};

const USER_AGENT: &str = concat!("aegis-market-analyst/", env!("CARGO_PKG_VERSION"));

/// Everything produced for one request
#[derive(Clone, Debug)]
pub struct AnalysisOutcome {
    pub recommendation: Recommendation,

    /// Encoded on-chain record
    pub payload: Vec<u8>,

    pub snapshot: MarketSnapshot,

    /// Present only when privacy wrapping is configured and succeeded
    pub encrypted_user_data: Option<EncryptedUserData>,
}

impl AnalysisOutcome {
    fn fallback() -> Self {
        Self {
            recommendation: encoder::fallback_recommendation(),
            payload: encoder::fallback_payload(),
            snapshot: MarketSnapshot::fallback(),
            encrypted_user_data: None,
        }
    }
}

/// Which optional features are active
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub analysis_path: &'static str,
    pub privacy_wrapping: bool,
    pub sources: Vec<String>,
}

/// Off-chain recommendation engine
pub struct MarketAnalyst {
    aggregator: MarketDataAggregator,
    strategy: AnalysisStrategy,
    privacy: Option<PrivacyWrapper>,
}

impl MarketAnalyst {
    pub fn builder(config: AnalystConfig) -> MarketAnalystBuilder {
        MarketAnalystBuilder::new(config)
    }

    pub fn features(&self) -> Features {
        Features {
            analysis_path: self.strategy.path().as_str(),
            privacy_wrapping: self.privacy.is_some(),
            sources: self.aggregator.source_names(),
        }
    }

    /// Request bytes in, on-chain record bytes out; never fails
    pub async fn analyze(&self, input: &[u8]) -> Vec<u8> {
        self.analyze_detailed(input).await.payload
    }

    /// Like [`analyze`](Self::analyze) but keeps the intermediate results
    pub async fn analyze_detailed(&self, input: &[u8]) -> AnalysisOutcome {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analysis", %request_id);

        async move {
            match AssertUnwindSafe(self.run(input)).catch_unwind().await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Analysis failed, returning conservative fallback");
                    AnalysisOutcome::fallback()
                }
                Err(_) => {
                    tracing::error!("Analysis panicked, returning conservative fallback");
                    AnalysisOutcome::fallback()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run the pipeline on a request built from a context
    pub async fn simulate(&self, ctx: &UserRequestContext) -> AnalysisOutcome {
        self.analyze_detailed(&simulate_request(ctx)).await
    }

    async fn run(&self, input: &[u8]) -> Result<AnalysisOutcome> {
        let ctx = decode_request(input);
        tracing::info!(
            user = %ctx.user_address,
            risk_profile = %ctx.risk_profile,
            "Processing recommendation request"
        );

        let snapshot = self.aggregator.aggregate(&ctx).await;
        let raw = self.strategy.analyze(&ctx, &snapshot).await;
        let recommendation = encoder::build(&raw);
        let payload = encoder::encode(&recommendation)?;

        tracing::info!(
            recommendation = %recommendation.recommendation,
            confidence = recommendation.confidence,
            risk_level = recommendation.risk_level.code(),
            ai_generated = recommendation.is_ai_generated,
            bytes = payload.len(),
            "Recommendation encoded"
        );

        let encrypted_user_data = self.wrap_user(&ctx);

        Ok(AnalysisOutcome {
            recommendation,
            payload,
            snapshot,
            encrypted_user_data,
        })
    }

    fn wrap_user(&self, ctx: &UserRequestContext) -> Option<EncryptedUserData> {
        let wrapper = self.privacy.as_ref()?;
        match wrapper.wrap_user(ctx) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(error = %e, "Encryption failed, returning unwrapped recommendation");
                None
            }
        }
    }
}

/// Assembles a [`MarketAnalyst`] from configuration
pub struct MarketAnalystBuilder {
    config: AnalystConfig,
    provider: Option<Arc<dyn LlmProvider>>,
    sources: Option<Vec<Arc<dyn MarketSource>>>,
}

impl MarketAnalystBuilder {
    pub fn new(config: AnalystConfig) -> Self {
        Self { config, provider: None, sources: None }
    }

    /// Model provider; only used when a model credential is configured
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the default market sources
    pub fn with_sources(mut self, sources: Vec<Arc<dyn MarketSource>>) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn build(self) -> Result<MarketAnalyst> {
        let sources = match self.sources {
            Some(sources) => sources,
            None => default_sources(&self.config)?,
        };
        let aggregator = MarketDataAggregator::new(sources, self.config.source_timeout);

        let strategy = match (self.provider, self.config.model_credential()) {
            (Some(provider), Some(_)) => {
                let options = GenerationOptions { model: self.config.model.clone(), ..Default::default() };
                AnalysisStrategy::with_model(LlmAnalyst::new(provider, options))
            }
            (Some(_), None) => {
                tracing::warn!("Model provider supplied without a model credential, using rule-based analysis");
                AnalysisStrategy::rule_based()
            }
            (None, _) => AnalysisStrategy::rule_based(),
        };

        let privacy = self.config.encryption_key().and_then(|pem| match PrivacyWrapper::from_pem(pem) {
            Ok(wrapper) => Some(wrapper),
            Err(e) => {
                tracing::warn!(error = %e, "Encryption key unusable, privacy wrapping disabled");
                None
            }
        });

        Ok(MarketAnalyst { aggregator, strategy, privacy })
    }
}

/// The four production feeds; CoinGecko only with a market data key
fn default_sources(config: &AnalystConfig) -> Result<Vec<Arc<dyn MarketSource>>> {
    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.source_timeout)
        .build()?;

    let mut sources: Vec<Arc<dyn MarketSource>> = Vec::with_capacity(4);
    match config.market_data_credential() {
        Some(key) => sources.push(Arc::new(CoinGeckoSource::new(http.clone(), key))),
        None => tracing::info!("COINGECKO_API_KEY not set, crypto price source disabled"),
    }
    sources.push(Arc::new(MarketSimSource));
    sources.push(Arc::new(BlockchainSource));
    sources.push(Arc::new(FearGreedSource::new(http)));
    Ok(sources)
}

impl std::fmt::Debug for MarketAnalyst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketAnalyst")
            .field("path", &self.strategy.path())
            .field("sources", &self.aggregator.source_names())
            .field("privacy", &self.privacy.is_some())
            .finish()
    }
}
