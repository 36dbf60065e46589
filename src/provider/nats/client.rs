//! NATS client — connect, publish, flush

use super::config::NatsConfig;
use crate::error::{EventError, EventResult};
use async_nats::connection::State;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// NATS core client
///
/// Low-level wrapper over `async_nats::Client` for fire-and-forget
/// publishing. No JetStream: delivery is best-effort.
pub struct NatsClient {
    /// NATS client connection
    client: async_nats::Client,

    /// Set once `close()` has run; later publishes are rejected
    closed: AtomicBool,

    /// Configuration
    config: Arc<NatsConfig>,
}

impl NatsClient {
    /// Connect to NATS, bounded by `connect_timeout_secs`
    pub async fn connect(config: NatsConfig) -> EventResult<Self> {
        let connect_opts = build_connect_options(&config);
        let timeout = Duration::from_secs(config.connect_timeout_secs);

        let client = tokio::time::timeout(timeout, connect_opts.connect(config.url.as_str()))
            .await
            .map_err(|_| {
                EventError::Timeout(format!(
                    "Connecting to {} exceeded {}s",
                    config.url, config.connect_timeout_secs
                ))
            })?
            .map_err(|e| EventError::Connection(format!("{}: {}", config.url, e)))?;

        tracing::info!(url = %config.url, "Connected to NATS");

        Ok(Self {
            client,
            closed: AtomicBool::new(false),
            config: Arc::new(config),
        })
    }

    /// Publish a payload to a subject
    pub async fn publish(&self, subject: &str, payload: Bytes) -> EventResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(EventError::Closed);
        }

        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| EventError::Publish {
                subject: subject.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(subject = %subject, "Event published");
        Ok(())
    }

    /// Flush buffered messages to the server
    pub async fn flush(&self) -> EventResult<()> {
        self.client
            .flush()
            .await
            .map_err(|e| EventError::Connection(format!("flush failed: {}", e)))
    }

    /// Flush and stop accepting publishes
    ///
    /// The socket itself is released when the last handle is dropped.
    pub async fn close(&self) -> EventResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let result = self.flush().await;
        tracing::info!(url = %self.config.url, "NATS connection closed");
        result
    }

    /// Whether the connection is live and not closed
    pub fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
            && matches!(self.client.connection_state(), State::Connected)
    }
}

/// Build NATS connect options from config
fn build_connect_options(config: &NatsConfig) -> async_nats::ConnectOptions {
    let mut opts = async_nats::ConnectOptions::new()
        .name(config.name.clone())
        .connection_timeout(Duration::from_secs(config.connect_timeout_secs));

    if let Some(ref token) = config.token {
        opts = opts.token(token.clone());
    }

    opts
}
