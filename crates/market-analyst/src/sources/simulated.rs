//! Simulated Feeds
//!
//! Stand-ins for equity-index and RPC metric feeds that the job has no
//! credentials for. Values jitter around realistic levels.

use async_trait::async_trait;
use rand::Rng;

use super::{MarketSource, SourceReading};
use crate::error::Result;
use crate::model::UserRequestContext;

/// S&P 500, NASDAQ and VIX levels
#[derive(Default)]
pub struct MarketSimSource;

impl MarketSimSource {
    fn sample() -> SourceReading {
        let mut rng = rand::rng();
        SourceReading::Traditional {
            sp500: 4700.0 + rng.random_range(-50.0..50.0),
            nasdaq: 16500.0 + rng.random_range(-100.0..100.0),
            vix: 15.0 + rng.random_range(-2.5..2.5),
        }
    }
}

#[async_trait]
impl MarketSource for MarketSimSource {
    fn name(&self) -> &str {
        "MarketSim"
    }

    async fn fetch(&self, _ctx: &UserRequestContext) -> Result<SourceReading> {
        Ok(Self::sample())
    }
}

/// Gas price and network activity
#[derive(Default)]
pub struct BlockchainSource;

impl BlockchainSource {
    fn sample() -> SourceReading {
        let mut rng = rand::rng();
        SourceReading::OnChain {
            gas_price_gwei: rng.random_range(20..40),
            active_addresses: rng.random_range(500_000..600_000),
        }
    }
}

#[async_trait]
impl MarketSource for BlockchainSource {
    fn name(&self) -> &str {
        "Blockchain"
    }

    async fn fetch(&self, ctx: &UserRequestContext) -> Result<SourceReading> {
        tracing::trace!(user = %ctx.user_address, "Sampling simulated on-chain metrics");
        Ok(Self::sample())
    }
}
