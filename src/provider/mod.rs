//! Event publisher trait — the seam between the adapter and a bus backend
//!
//! Backends (NATS, in-memory) implement `EventPublisher`. The
//! `EventAdapter` owns one publisher once connected and never exposes
//! its failures to request handlers.

use crate::error::EventResult;
use async_trait::async_trait;
use bytes::Bytes;

pub mod memory;
pub mod nats;

/// Core trait for message bus backends
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Send a single message to `subject`
    async fn publish(&self, subject: &str, payload: Bytes) -> EventResult<()>;

    /// Whether the underlying connection is currently usable
    fn is_connected(&self) -> bool;

    /// Flush pending data and release the connection
    ///
    /// Must be safe to call more than once.
    async fn close(&self) -> EventResult<()>;

    /// Provider name (e.g., "nats", "memory")
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for std::sync::Arc<T> {
    async fn publish(&self, subject: &str, payload: Bytes) -> EventResult<()> {
        (**self).publish(subject, payload).await
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    async fn close(&self) -> EventResult<()> {
        (**self).close().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
