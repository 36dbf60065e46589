//! In-memory event publisher
//!
//! Records every published message instead of sending it anywhere. Used
//! by tests, benchmarks, and deployments that run without a bus.

use crate::error::{EventError, EventResult};
use crate::provider::EventPublisher;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A message captured by `MemoryPublisher`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

impl PublishedMessage {
    /// Decode the payload as JSON
    pub fn json(&self) -> EventResult<serde_json::Value> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Publisher that keeps messages in memory
#[derive(Default)]
pub struct MemoryPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
    closed: AtomicBool,
    fail_publishes: AtomicBool,
    publish_delay: Option<Duration>,
}

impl MemoryPublisher {
    /// Delay every publish, simulating a slow bus
    pub fn with_publish_delay(mut self, delay: Duration) -> Self {
        self.publish_delay = Some(delay);
        self
    }

    /// Make subsequent publishes fail (or succeed again)
    pub fn set_fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::Release);
    }

    /// Snapshot of all messages published so far
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Whether `close()` has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn publish(&self, subject: &str, payload: Bytes) -> EventResult<()> {
        if let Some(delay) = self.publish_delay {
            tokio::time::sleep(delay).await;
        }

        if self.is_closed() {
            return Err(EventError::Closed);
        }
        if self.fail_publishes.load(Ordering::Acquire) {
            return Err(EventError::Publish {
                subject: subject.to_string(),
                reason: "simulated failure".to_string(),
            });
        }

        let mut messages = self.messages.lock().map_err(|e| EventError::Publish {
            subject: subject.to_string(),
            reason: format!("Failed to acquire message lock: {e}"),
        })?;
        messages.push(PublishedMessage {
            subject: subject.to_string(),
            payload,
        });
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.is_closed()
    }

    async fn close(&self) -> EventResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
