//! CoinGecko Price Source

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{MarketSource, SourceReading};
use crate::error::{AnalystError, Result};
use crate::model::UserRequestContext;

const NAME: &str = "CoinGecko";
const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// BTC/ETH spot prices from the CoinGecko simple-price endpoint
pub struct CoinGeckoSource {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CoinQuote {
    usd: Decimal,
    #[serde(default)]
    usd_24h_change: Option<Decimal>,
}

impl CoinGeckoSource {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse(body: &str) -> Result<SourceReading> {
        let quotes: HashMap<String, CoinQuote> = serde_json::from_str(body)?;
        let btc = quotes
            .get("bitcoin")
            .ok_or_else(|| AnalystError::source_failure(NAME, "response has no bitcoin quote"))?;

        Ok(SourceReading::Crypto {
            price: btc.usd.round_dp(2),
            change_24h: btc.usd_24h_change.unwrap_or_default().round_dp(2),
        })
    }
}

#[async_trait]
impl MarketSource for CoinGeckoSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, _ctx: &UserRequestContext) -> Result<SourceReading> {
        let url = format!(
            "{}/simple/price?ids=bitcoin,ethereum&vs_currencies=usd&include_24h_change=true",
            self.base_url.trim_end_matches('/')
        );

        let res = self.http
            .get(url)
            .header("Accept", "application/json")
            .header("x-cg-demo-api-key", &self.api_key)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(AnalystError::source_failure(NAME, format!("API error: {status}")));
        }

        Self::parse(&res.text().await?)
    }
}
