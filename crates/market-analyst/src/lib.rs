//! # market-analyst
//!
//! Off-chain recommendation engine for the Aegis confidential RWA vault.
//! An oracle job hands over a small JSON request and gets back a compact
//! record the vault contract stores on-chain.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Request      │──▶│ Market Data │──▶│ Strategy     │──▶│ Encoder  │──▶ bytes
//! │ Decoder      │   │ Aggregator  │   │ LLM │ Rules  │   │ ≤ 1 KiB  │
//! └──────────────┘   └─────────────┘   └──────────────┘   └────┬─────┘
//!                                                              │
//!                                                     ┌────────▼────────┐
//!                                                     │ Privacy Wrapper │ (optional)
//!                                                     └─────────────────┘
//! ```
//!
//! ## Degradation
//!
//! The caller always receives a well-formed record:
//!
//! - malformed request → default context (`0xUNKNOWN`, 100, MODERATE)
//! - a source fails → that source is omitted from the snapshot
//! - every source fails → fixed fallback snapshot
//! - model call fails → rule engine
//! - encryption fails → unwrapped recommendation
//! - anything else → `HOLD - AI analysis unavailable, using conservative strategy`
//!
//! ## Output
//!
//! ```text
//! {"recommendation":"HOLD - AI recommends maintaining position","confidence":65,"riskLevel":1,"timestamp":1700000000}
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod request;
pub mod sources;
pub mod strategy;
pub mod svckit;

pub use aggregator::MarketDataAggregator;
pub use config::AnalystConfig;
pub use error::{AnalystError, Result};
pub use model::{
    Action, MarketSnapshot, OnChainPayload, RawAnalysis, Recommendation, RiskLevel, RiskProfile,
    UserRequestContext,
};
pub use pipeline::{AnalysisOutcome, Features, MarketAnalyst, MarketAnalystBuilder};
pub use request::{decode_request, simulate_request};
pub use strategy::{AnalysisPath, AnalysisStrategy, LlmAnalyst};
