//! Market Data Sources
//!
//! Each source is one independent read. The aggregator runs them
//! concurrently and tolerates any subset failing.

mod coingecko;
mod fear_greed;
mod simulated;

#[cfg(test)]
pub(crate) mod mock;

pub use coingecko::CoinGeckoSource;
pub use fear_greed::FearGreedSource;
pub use simulated::{BlockchainSource, MarketSimSource};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::model::{MarketSnapshot, UserRequestContext};

/// One source's contribution to a snapshot
#[derive(Clone, Debug, PartialEq)]
pub enum SourceReading {
    Crypto {
        price: Decimal,
        change_24h: Decimal,
    },
    Traditional {
        sp500: f64,
        nasdaq: f64,
        vix: f64,
    },
    OnChain {
        gas_price_gwei: u32,
        active_addresses: u64,
    },
    Sentiment {
        index: u8,
        label: String,
    },
}

impl SourceReading {
    /// Overwrite the snapshot fields this reading covers
    pub fn apply_to(self, snapshot: &mut MarketSnapshot) {
        match self {
            Self::Crypto { price, change_24h } => {
                snapshot.crypto_price = price;
                snapshot.crypto_change_24h = change_24h;
            }
            Self::Traditional { sp500, nasdaq, vix } => {
                snapshot.traditional_index = sp500;
                snapshot.nasdaq_index = nasdaq;
                snapshot.volatility_index = vix;
            }
            Self::OnChain { gas_price_gwei, active_addresses } => {
                snapshot.gas_price_gwei = gas_price_gwei;
                snapshot.active_addresses = active_addresses;
            }
            Self::Sentiment { index, label } => {
                snapshot.sentiment_index = index;
                snapshot.sentiment_label = label;
            }
        }
    }
}

/// Market data source trait (Strategy pattern)
///
/// Implement this for each feed: price APIs, index feeds, RPC metrics.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Identifier recorded in `MarketSnapshot::sources` on success
    fn name(&self) -> &str;
    
    /// Fetch one reading for the given request
    async fn fetch(&self, ctx: &UserRequestContext) -> Result<SourceReading>;
}
