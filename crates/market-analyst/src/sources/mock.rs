//! Mock Sources
//!
//! Deterministic sources for tests: fixed readings, failures, stalls and
//! panics. `serve` stands up a loopback HTTP server for the real clients.

use std::time::Duration;

use async_trait::async_trait;

use super::{MarketSource, SourceReading};
use crate::error::{AnalystError, Result};
use crate::model::UserRequestContext;

pub enum Behavior {
    Reading(SourceReading),
    Fail,
    Stall(Duration),
    Panic,
}

pub struct MockSource {
    name: &'static str,
    behavior: Behavior,
}

impl MockSource {
    pub fn new(name: &'static str, behavior: Behavior) -> Self {
        Self { name, behavior }
    }

    pub fn reading(name: &'static str, reading: SourceReading) -> Self {
        Self::new(name, Behavior::Reading(reading))
    }

    pub fn failing(name: &'static str) -> Self {
        Self::new(name, Behavior::Fail)
    }
}

#[async_trait]
impl MarketSource for MockSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, _ctx: &UserRequestContext) -> Result<SourceReading> {
        match &self.behavior {
            Behavior::Reading(r) => Ok(r.clone()),
            Behavior::Fail => Err(AnalystError::source_failure(self.name, "mock failure")),
            Behavior::Stall(d) => {
                tokio::time::sleep(*d).await;
                Err(AnalystError::source_failure(self.name, "stalled"))
            }
            Behavior::Panic => panic!("mock source {} panicked", self.name),
        }
    }
}

/// Serve `app` on an ephemeral loopback port; returns its base URL
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
