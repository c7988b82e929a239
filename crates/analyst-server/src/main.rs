//! Aegis Market Analyst HTTP Server
//!
//! Axum front end for the recommendation pipeline. `/api/analyze` speaks
//! the oracle wire format byte for byte; the other routes are for operators
//! and local testing.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analyst_core::LlmProvider;
use analyst_runtime::{OpenAiConfig, OpenAiProvider};
use market_analyst::{AnalystConfig, MarketAnalyst};

use crate::handlers::{analyze, analyze_detailed, health_check, risk_score, simulate};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = AnalystConfig::from_env();
    let mut builder = MarketAnalyst::builder(config.clone());

    // Model provider only when a real key is configured
    if let Some(provider_config) = provider_config(&config) {
        let provider = Arc::new(OpenAiProvider::new(provider_config)?);
        match provider.health_check().await {
            Ok(true) => tracing::info!(model = %config.model, "✓ Connected to model provider"),
            Ok(false) | Err(_) => {
                tracing::warn!("⚠ Model provider not reachable - requests will fall back to rules");
            }
        }
        builder = builder.with_provider(provider);
    } else {
        tracing::warn!("⚠ OPENAI_API_KEY not set - using rule-based analysis");
    }

    let analyst = builder.build()?;
    let features = analyst.features();
    tracing::info!(
        path = features.analysis_path,
        privacy = features.privacy_wrapping,
        sources = ?features.sources,
        "Market analyst ready"
    );

    let app = router(AppState::new(analyst));

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 Aegis market analyst running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                - Health check");
    tracing::info!("  POST /api/analyze           - Oracle request → on-chain record");
    tracing::info!("  POST /api/analyze/detailed  - Full analysis breakdown");
    tracing::info!("  POST /api/simulate          - Analyze a simulated request");
    tracing::info!("  POST /api/risk-score        - Weighted risk score");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Provider settings keyed on the same credential that gates the model path
fn provider_config(config: &AnalystConfig) -> Option<OpenAiConfig> {
    let key = config.model_credential()?;
    Some(OpenAiConfig::from_env(key).with_model(config.model.clone()))
}

fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze))
        .route("/api/analyze/detailed", post(analyze_detailed))
        .route("/api/simulate", post(simulate))
        .route("/api/risk-score", post(risk_score))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
