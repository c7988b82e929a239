//! Fear & Greed Index Source (alternative.me)

use async_trait::async_trait;
use serde::Deserialize;

use super::{MarketSource, SourceReading};
use crate::error::{AnalystError, Result};
use crate::model::UserRequestContext;

const NAME: &str = "FearGreed";
const DEFAULT_URL: &str = "https://api.alternative.me/fng/?limit=1";

pub struct FearGreedSource {
    http: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct FngResponse {
    data: Vec<FngEntry>,
}

#[derive(Debug, Deserialize)]
struct FngEntry {
    value: String,
    value_classification: String,
}

impl FearGreedSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            url: DEFAULT_URL.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn parse(body: &str) -> Result<SourceReading> {
        let response: FngResponse = serde_json::from_str(body)?;
        let entry = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AnalystError::source_failure(NAME, "empty data array"))?;

        let index: u8 = entry
            .value
            .trim()
            .parse()
            .ok()
            .filter(|v| *v <= 100)
            .ok_or_else(|| AnalystError::source_failure(NAME, format!("bad index value {:?}", entry.value)))?;

        Ok(SourceReading::Sentiment {
            index,
            label: entry.value_classification,
        })
    }
}

#[async_trait]
impl MarketSource for FearGreedSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, _ctx: &UserRequestContext) -> Result<SourceReading> {
        let res = self.http.get(&self.url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(AnalystError::source_failure(NAME, format!("API error: {status}")));
        }
        Self::parse(&res.text().await?)
    }
}
