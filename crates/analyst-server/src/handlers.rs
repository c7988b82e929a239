//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use market_analyst::{
    AnalysisOutcome, Features, MarketSnapshot, Recommendation, RiskProfile, UserRequestContext,
    svckit::{EncryptedUserData, RiskFactors, calculate_risk_score},
};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub features: Features,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedResponse {
    pub recommendation: Recommendation,

    /// The exact on-chain record, decoded for readability
    pub payload: Value,

    pub market: MarketSnapshot,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_user_data: Option<EncryptedUserData>,
}

impl From<AnalysisOutcome> for DetailedResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        let payload = serde_json::from_slice(&outcome.payload).unwrap_or(Value::Null);
        Self {
            recommendation: outcome.recommendation,
            payload,
            market: outcome.snapshot,
            encrypted_user_data: outcome.encrypted_user_data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub user: String,
    pub balance: Decimal,
    #[serde(default)]
    pub risk_profile: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RiskScoreResponse {
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: error.into(), code: "INVALID_REQUEST".into() }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        features: state.analyst.features(),
    })
}

/// Oracle-compatible endpoint: raw request bytes in, raw record bytes out
pub async fn analyze(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let output = state.analyst.analyze(&body).await;
    ([(header::CONTENT_TYPE, "application/json")], output)
}

/// Same input as `analyze`, with intermediate results in the response
pub async fn analyze_detailed(State(state): State<AppState>, body: Bytes) -> Json<DetailedResponse> {
    Json(state.analyst.analyze_detailed(&body).await.into())
}

/// Run the pipeline on a request assembled from a small JSON form
pub async fn simulate(
    State(state): State<AppState>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<DetailedResponse>, ApiError> {
    if req.user.trim().is_empty() {
        return Err(bad_request("user must not be empty"));
    }
    if req.balance.is_sign_negative() {
        return Err(bad_request("balance must not be negative"));
    }

    let profile = RiskProfile::parse(req.risk_profile.as_deref());
    let ctx = UserRequestContext::new(req.user.trim(), req.balance, profile);
    tracing::info!(user = %ctx.user_address, risk_profile = %profile, "Simulating request");

    Ok(Json(state.analyst.simulate(&ctx).await.into()))
}

/// Weighted risk score for a set of 0-1 factors
pub async fn risk_score(Json(factors): Json<RiskFactors>) -> Json<RiskScoreResponse> {
    Json(RiskScoreResponse { score: calculate_risk_score(&factors) })
}
