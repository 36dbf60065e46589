//! NATS event publisher
//!
//! Implements `EventPublisher` using plain NATS core publish.

mod client;
mod config;

pub use client::NatsClient;
pub use config::NatsConfig;

use crate::error::EventResult;
use crate::provider::EventPublisher;
use async_trait::async_trait;
use bytes::Bytes;

/// NATS event publisher
///
/// Wraps `NatsClient` and implements the `EventPublisher` trait.
pub struct NatsPublisher {
    client: NatsClient,
}

impl NatsPublisher {
    /// Connect to NATS
    pub async fn connect(config: NatsConfig) -> EventResult<Self> {
        let client = NatsClient::connect(config).await?;
        Ok(Self { client })
    }
}

#[async_trait]
impl EventPublisher for NatsPublisher {
    async fn publish(&self, subject: &str, payload: Bytes) -> EventResult<()> {
        self.client.publish(subject, payload).await
    }

    fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    async fn close(&self) -> EventResult<()> {
        self.client.close().await
    }

    fn name(&self) -> &str {
        "nats"
    }
}
