//! Market Data Aggregator
//!
//! Two nested error boundaries:
//!
//! ```text
//! aggregate()                         outer: any error → fixed fallback snapshot
//! └── collect()
//!     ├── spawn(timeout(CoinGecko))   inner: failure → source omitted
//!     ├── spawn(timeout(MarketSim))
//!     ├── spawn(timeout(Blockchain))
//!     └── spawn(timeout(FearGreed))
//! ```
//!
//! Sources run concurrently and are all joined before the snapshot is built.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::error::{AnalystError, Result};
use crate::model::{MarketSnapshot, UserRequestContext};
use crate::sources::MarketSource;

pub struct MarketDataAggregator {
    sources: Vec<Arc<dyn MarketSource>>,
    timeout: Duration,
}

impl MarketDataAggregator {
    pub fn new(sources: Vec<Arc<dyn MarketSource>>, timeout: Duration) -> Self {
        Self { sources, timeout }
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Build a snapshot; never fails
    pub async fn aggregate(&self, ctx: &UserRequestContext) -> MarketSnapshot {
        match self.collect(ctx).await {
            Ok(snapshot) => {
                tracing::info!(
                    sources = ?snapshot.sources,
                    "Fetched data from {} sources",
                    snapshot.sources.len()
                );
                snapshot
            }
            Err(e) => {
                tracing::warn!(error = %e, "Market data aggregation failed, using fallback snapshot");
                MarketSnapshot::fallback()
            }
        }
    }

    /// Fetch every source concurrently, tolerating individual failures
    pub async fn collect(&self, ctx: &UserRequestContext) -> Result<MarketSnapshot> {
        let handles = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let ctx = ctx.clone();
            let timeout = self.timeout;

            tokio::spawn(async move {
                let name = source.name().to_string();
                let outcome = tokio::time::timeout(timeout, source.fetch(&ctx))
                    .await
                    .unwrap_or_else(|_| Err(AnalystError::SourceTimeout(name.clone())));
                (name, outcome)
            })
        });

        let joined = join_all(handles).await;

        let mut snapshot = MarketSnapshot::seeded();
        for result in joined {
            let (name, outcome) = result
                .map_err(|e| AnalystError::Aggregation(format!("source task failed: {e}")))?;

            match outcome {
                Ok(reading) => {
                    reading.apply_to(&mut snapshot);
                    snapshot.sources.push(name);
                }
                Err(e) => {
                    tracing::warn!(source = %name, error = %e, "Market source failed");
                }
            }
        }

        if snapshot.sources.is_empty() {
            return Err(AnalystError::Aggregation("no market source succeeded".into()));
        }

        Ok(snapshot)
    }
}
