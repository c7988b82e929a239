//! Error Types for the Market Analyst
//!
//! None of these reach the on-chain caller: every variant is either recovered
//! where it occurs or converted into the conservative fallback record by the
//! pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalystError>;

#[derive(Error, Debug)]
pub enum AnalystError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    
    #[error("Market source {name} failed: {message}")]
    Source {
        name: String,
        message: String,
    },
    
    #[error("Market source {0} timed out")]
    SourceTimeout(String),
    
    #[error("Market data aggregation failed: {0}")]
    Aggregation(String),
    
    #[error("Model analysis failed: {0}")]
    Model(#[from] analyst_core::AgentError),
    
    #[error("Encryption error: {0}")]
    Encryption(String),
    
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    
    #[error("Crypto error: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),
}

impl AnalystError {
    pub fn source_failure(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            name: name.into(),
            message: message.into(),
        }
    }
}
