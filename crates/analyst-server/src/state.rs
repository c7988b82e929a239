//! Application State

use std::sync::Arc;

use market_analyst::MarketAnalyst;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Recommendation pipeline; holds no per-request state
    pub analyst: Arc<MarketAnalyst>,
}

impl AppState {
    pub fn new(analyst: MarketAnalyst) -> Self {
        Self { analyst: Arc::new(analyst) }
    }
}
