//! Analyst Configuration
//!
//! Each credential is independently optional and gates exactly one feature:
//!
//! | Option                  | Env var                  | Gates                    |
//! |-------------------------|--------------------------|--------------------------|
//! | `model_api_key`         | `OPENAI_API_KEY`         | model-backed analysis    |
//! | `market_data_api_key`   | `COINGECKO_API_KEY`      | CoinGecko price source   |
//! | `encryption_public_key` | `ENCRYPTION_PUBLIC_KEY`  | privacy wrapping         |

use std::time::Duration;

use analyst_core::provider::DEFAULT_MODEL;

/// Value shipped in sample `.env` files; treated as "not configured"
pub const MODEL_KEY_PLACEHOLDER: &str = "your_openai_key_here";

const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct AnalystConfig {
    pub model_api_key: Option<String>,
    pub market_data_api_key: Option<String>,

    /// PEM-encoded RSA public key
    pub encryption_public_key: Option<String>,

    /// Chat model used for the model-backed path
    pub model: String,

    /// Per-source fetch timeout
    pub source_timeout: Duration,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            model_api_key: None,
            market_data_api_key: None,
            encryption_public_key: None,
            model: DEFAULT_MODEL.into(),
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
        }
    }
}

impl AnalystConfig {
    pub fn from_env() -> Self {
        let source_timeout = std::env::var("SOURCE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS), Duration::from_secs);

        Self {
            model_api_key: non_empty_env("OPENAI_API_KEY"),
            market_data_api_key: non_empty_env("COINGECKO_API_KEY"),
            // PEMs in .env files usually carry literal "\n" sequences
            encryption_public_key: non_empty_env("ENCRYPTION_PUBLIC_KEY")
                .map(|pem| pem.replace("\\n", "\n")),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            source_timeout,
        }
    }

    /// Model credential, if present and not the sample placeholder
    pub fn model_credential(&self) -> Option<&str> {
        self.model_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != MODEL_KEY_PLACEHOLDER)
    }

    pub fn market_data_credential(&self) -> Option<&str> {
        self.market_data_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn encryption_key(&self) -> Option<&str> {
        self.encryption_public_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_disable_everything() {
        let config = AnalystConfig::default();
        assert!(config.model_credential().is_none());
        assert!(config.market_data_credential().is_none());
        assert!(config.encryption_key().is_none());
        assert_eq!(config.source_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_placeholder_key_is_not_a_credential() {
        let config = AnalystConfig {
            model_api_key: Some(MODEL_KEY_PLACEHOLDER.into()),
            ..Default::default()
        };
        assert!(config.model_credential().is_none());

        let config = AnalystConfig {
            model_api_key: Some("sk-live-123".into()),
            ..Default::default()
        };
        assert_eq!(config.model_credential(), Some("sk-live-123"));
    }

    #[test]
    fn test_blank_keys_are_absent() {
        let config = AnalystConfig {
            market_data_api_key: Some("   ".into()),
            encryption_public_key: Some(String::new()),
            ..Default::default()
        };
        assert!(config.market_data_credential().is_none());
        assert!(config.encryption_key().is_none());
    }
}
