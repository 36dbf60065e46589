//! Best-effort event adapter
//!
//! `EventAdapter` owns the bus connection for the lifetime of the process.
//! Handlers hand it notifications through a non-blocking queue; a single
//! background worker performs the sends. Connection and send failures are
//! logged and never reach a caller.
//!
//! State machine:
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──ok──▶ Connected ──close──▶ Closed
//!                               │
//!                               └──err──▶ ConnectFailed
//! ```

use crate::error::{EventError, EventResult};
use crate::provider::nats::{NatsConfig, NatsPublisher};
use crate::provider::EventPublisher;
use crate::types::User;
use bytes::Bytes;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Subject for record-created notifications
pub const USER_CREATED_SUBJECT: &str = "user.created";

/// Observable adapter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Disconnected,
    Connecting,
    Connected,
    ConnectFailed,
    Closed,
}

/// Upper bound applied to `AdapterOptions::queue_capacity`
pub const MAX_QUEUE_CAPACITY: usize = 1 << 20;

/// Tuning for the outbound queue and shutdown
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// Maximum queued notifications before new ones are dropped
    pub queue_capacity: usize,

    /// Bound on draining the queue, and separately on releasing the connection
    pub close_timeout: Duration,
}

impl AdapterOptions {
    /// Queue capacity clamped to `1..=MAX_QUEUE_CAPACITY`
    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity.clamp(1, MAX_QUEUE_CAPACITY)
    }
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            close_timeout: Duration::from_secs(5),
        }
    }
}

struct Outbound {
    subject: String,
    payload: Bytes,
}

/// A live connection plus its send worker
struct Link {
    publisher: Arc<dyn EventPublisher>,
    outbox: mpsc::Sender<Outbound>,
    worker: JoinHandle<()>,
}

enum Connection {
    Disconnected,
    Connecting,
    Connected(Link),
    ConnectFailed(String),
    Closed,
}

/// Process-scoped, best-effort connection to the message bus
pub struct EventAdapter {
    connection: RwLock<Connection>,
    options: AdapterOptions,
}

impl EventAdapter {
    pub fn new(options: AdapterOptions) -> Self {
        Self {
            connection: RwLock::new(Connection::Disconnected),
            options,
        }
    }

    /// Current state
    pub fn state(&self) -> AdapterState {
        match self.connection.read() {
            Ok(conn) => match &*conn {
                Connection::Disconnected => AdapterState::Disconnected,
                Connection::Connecting => AdapterState::Connecting,
                Connection::Connected(_) => AdapterState::Connected,
                Connection::ConnectFailed(_) => AdapterState::ConnectFailed,
                Connection::Closed => AdapterState::Closed,
            },
            Err(_) => AdapterState::Closed,
        }
    }

    /// True while connected and the underlying client reports a live link
    pub fn is_connected(&self) -> bool {
        self.connection
            .read()
            .map(|conn| match &*conn {
                Connection::Connected(link) => link.publisher.is_connected(),
                _ => false,
            })
            .unwrap_or(false)
    }

    /// Reason for the last failed connection attempt, if any
    pub fn last_error(&self) -> Option<String> {
        self.connection.read().ok().and_then(|conn| match &*conn {
            Connection::ConnectFailed(reason) => Some(reason.clone()),
            _ => None,
        })
    }

    /// Connect to NATS. Never fails; a failure is logged and recorded.
    pub async fn connect(&self, config: NatsConfig) {
        let url = config.url.clone();
        tracing::info!(url = %url, "Connecting to NATS");
        self.connect_with(NatsPublisher::connect(config)).await;
    }

    /// Connect using an arbitrary connector future
    ///
    /// Only proceeds from `Disconnected`; any later call is ignored.
    pub async fn connect_with<P, F>(&self, connector: F)
    where
        P: EventPublisher + 'static,
        F: Future<Output = EventResult<P>>,
    {
        if !self.begin_connect() {
            tracing::warn!(state = ?self.state(), "Ignoring connect request, adapter already used");
            return;
        }

        match connector.await {
            Ok(publisher) => self.attach(Arc::new(publisher)).await,
            Err(e) => self.fail(e),
        }
    }

    fn begin_connect(&self) -> bool {
        let Ok(mut conn) = self.connection.write() else {
            return false;
        };
        if matches!(*conn, Connection::Disconnected) {
            *conn = Connection::Connecting;
            true
        } else {
            false
        }
    }

    async fn attach(&self, publisher: Arc<dyn EventPublisher>) {
        let (outbox, inbox) = mpsc::channel(self.options.effective_queue_capacity());
        let attached = match self.connection.write() {
            Ok(mut conn) if matches!(*conn, Connection::Connecting) => {
                let worker = tokio::spawn(run_worker(Arc::clone(&publisher), inbox));
                *conn = Connection::Connected(Link {
                    publisher: Arc::clone(&publisher),
                    outbox,
                    worker,
                });
                true
            }
            _ => false,
        };

        if attached {
            tracing::info!(provider = publisher.name(), "Event adapter connected");
            return;
        }

        // Closed while the connect was in flight
        tracing::info!(provider = publisher.name(), "Adapter closed during connect, releasing connection");
        release(publisher, self.options.close_timeout).await;
    }

    fn fail(&self, error: EventError) {
        tracing::warn!(error = %error, "Event bus unavailable, continuing without notifications");
        if let Ok(mut conn) = self.connection.write() {
            if matches!(*conn, Connection::Connecting) {
                *conn = Connection::ConnectFailed(error.to_string());
            }
        }
    }

    /// Queue a message without waiting
    ///
    /// Silently skipped unless connected. A full queue drops the message.
    pub fn publish(&self, subject: &str, payload: Bytes) {
        let Ok(conn) = self.connection.read() else {
            return;
        };
        let Connection::Connected(link) = &*conn else {
            tracing::debug!(subject = %subject, "Event bus not connected, skipping publish");
            return;
        };

        let outbound = Outbound {
            subject: subject.to_string(),
            payload,
        };
        match link.outbox.try_send(outbound) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(msg)) => {
                tracing::warn!(subject = %msg.subject, "Publish queue full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(msg)) => {
                tracing::debug!(subject = %msg.subject, "Publish queue closed, dropping event");
            }
        }
    }

    /// Serialize `value` as JSON and queue it
    pub fn publish_json<T: Serialize>(&self, subject: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(payload) => self.publish(subject, Bytes::from(payload)),
            Err(e) => tracing::warn!(subject = %subject, error = %e, "Failed to serialize event"),
        }
    }

    /// Announce a newly created user on `user.created`
    pub fn notify_user_created(&self, user: &User) {
        self.publish_json(USER_CREATED_SUBJECT, user);
    }

    /// Drain queued messages, then release the connection
    ///
    /// Both steps are bounded by `close_timeout`; anything still pending
    /// afterwards is abandoned. Idempotent and safe when never connected.
    pub async fn close(&self) {
        let previous = match self.connection.write() {
            Ok(mut conn) => std::mem::replace(&mut *conn, Connection::Closed),
            Err(_) => return,
        };

        match previous {
            Connection::Connected(Link {
                publisher,
                outbox,
                mut worker,
            }) => {
                drop(outbox);
                match tokio::time::timeout(self.options.close_timeout, &mut worker).await {
                    Ok(Ok(())) => tracing::debug!("Publish queue drained"),
                    Ok(Err(e)) => tracing::warn!(error = %e, "Publish worker failed"),
                    Err(_) => {
                        tracing::warn!(
                            timeout_ms = self.options.close_timeout.as_millis() as u64,
                            "Publish queue not drained in time, abandoning pending events"
                        );
                        worker.abort();
                    }
                }
                release(publisher, self.options.close_timeout).await;
            }
            Connection::Closed => {}
            _ => tracing::debug!("Event adapter closed without a connection"),
        }
    }
}

impl Default for EventAdapter {
    fn default() -> Self {
        Self::new(AdapterOptions::default())
    }
}

async fn run_worker(publisher: Arc<dyn EventPublisher>, mut inbox: mpsc::Receiver<Outbound>) {
    while let Some(msg) = inbox.recv().await {
        if let Err(e) = publisher.publish(&msg.subject, msg.payload).await {
            tracing::warn!(subject = %msg.subject, error = %e, "Failed to publish event");
        }
    }
}

async fn release(publisher: Arc<dyn EventPublisher>, timeout: Duration) {
    match tokio::time::timeout(timeout, publisher.close()).await {
        Ok(Ok(())) => tracing::info!(provider = publisher.name(), "Event bus connection released"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Error while closing event bus connection"),
        Err(_) => tracing::warn!("Timed out closing event bus connection"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::memory::MemoryPublisher;
    use chrono::Utc;

    fn sample_user(id: u64) -> User {
        User {
            id,
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    async fn connected(publisher: Arc<MemoryPublisher>) -> EventAdapter {
        let adapter = EventAdapter::default();
        adapter.connect_with(async move { Ok(publisher) }).await;
        adapter
    }

    #[tokio::test]
    async fn test_new_adapter_is_disconnected() {
        let adapter = EventAdapter::default();
        assert_eq!(adapter.state(), AdapterState::Disconnected);
        assert!(!adapter.is_connected());

        // No-op while disconnected
        adapter.notify_user_created(&sample_user(1));
    }

    #[tokio::test]
    async fn test_connect_success_and_publish() {
        let publisher = Arc::new(MemoryPublisher::default());
        let adapter = connected(Arc::clone(&publisher)).await;
        assert_eq!(adapter.state(), AdapterState::Connected);
        assert!(adapter.is_connected());

        adapter.notify_user_created(&sample_user(7));
        adapter.close().await;

        let messages = publisher.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject, USER_CREATED_SUBJECT);
        assert_eq!(messages[0].json().unwrap()["id"], 7);
        assert!(publisher.is_closed());
    }

    #[tokio::test]
    async fn test_connect_failure_is_swallowed() {
        let adapter = EventAdapter::default();
        adapter
            .connect_with(async {
                Err::<MemoryPublisher, _>(EventError::Connection("refused".into()))
            })
            .await;

        assert_eq!(adapter.state(), AdapterState::ConnectFailed);
        assert!(!adapter.is_connected());
        assert!(adapter.last_error().unwrap().contains("refused"));

        adapter.notify_user_created(&sample_user(1));
        adapter.close().await;
        assert_eq!(adapter.state(), AdapterState::Closed);
    }

    #[tokio::test]
    async fn test_connect_is_attempted_once() {
        let first = Arc::new(MemoryPublisher::default());
        let second = Arc::new(MemoryPublisher::default());
        let adapter = connected(Arc::clone(&first)).await;

        let other = Arc::clone(&second);
        adapter.connect_with(async move { Ok(other) }).await;

        adapter.notify_user_created(&sample_user(1));
        adapter.close().await;
        assert_eq!(first.messages().len(), 1);
        assert!(second.messages().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_propagate() {
        let publisher = Arc::new(MemoryPublisher::default());
        publisher.set_fail_publishes(true);
        let adapter = connected(Arc::clone(&publisher)).await;

        adapter.notify_user_created(&sample_user(1));
        adapter.close().await;

        assert!(publisher.messages().is_empty());
        assert_eq!(adapter.state(), AdapterState::Closed);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let never = EventAdapter::default();
        never.close().await;
        never.close().await;
        assert_eq!(never.state(), AdapterState::Closed);

        let publisher = Arc::new(MemoryPublisher::default());
        let adapter = connected(Arc::clone(&publisher)).await;
        adapter.close().await;
        adapter.close().await;
        assert!(publisher.is_closed());
        assert!(!adapter.is_connected());
    }

    #[tokio::test]
    async fn test_connect_after_close_is_ignored() {
        let adapter = EventAdapter::default();
        adapter.close().await;

        let publisher = Arc::new(MemoryPublisher::default());
        let handle = Arc::clone(&publisher);
        adapter.connect_with(async move { Ok(handle) }).await;
        assert_eq!(adapter.state(), AdapterState::Closed);
    }

    #[tokio::test]
    async fn test_close_during_connect_releases_connection() {
        let adapter = Arc::new(EventAdapter::default());
        let publisher = Arc::new(MemoryPublisher::default());
        let (ready_tx, ready_rx) = tokio::sync::oneshot::channel::<()>();

        let task = {
            let adapter = Arc::clone(&adapter);
            let publisher = Arc::clone(&publisher);
            tokio::spawn(async move {
                adapter
                    .connect_with(async move {
                        let _ = ready_rx.await;
                        Ok(publisher)
                    })
                    .await;
            })
        };

        tokio::time::timeout(Duration::from_secs(1), async {
            while adapter.state() != AdapterState::Connecting {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        adapter.close().await;
        ready_tx.send(()).unwrap();
        task.await.unwrap();

        assert_eq!(adapter.state(), AdapterState::Closed);
        assert!(publisher.is_closed());
    }

    #[tokio::test]
    async fn test_close_abandons_slow_publishes() {
        let publisher =
            Arc::new(MemoryPublisher::default().with_publish_delay(Duration::from_secs(30)));
        let adapter = EventAdapter::new(AdapterOptions {
            queue_capacity: 16,
            close_timeout: Duration::from_millis(100),
        });
        let handle = Arc::clone(&publisher);
        adapter.connect_with(async move { Ok(handle) }).await;

        adapter.notify_user_created(&sample_user(1));

        let started = std::time::Instant::now();
        adapter.close().await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(publisher.messages().is_empty());
    }

    #[test]
    fn test_queue_capacity_is_clamped() {
        let opts = |queue_capacity| AdapterOptions {
            queue_capacity,
            ..Default::default()
        };
        assert_eq!(opts(0).effective_queue_capacity(), 1);
        assert_eq!(opts(64).effective_queue_capacity(), 64);
        assert_eq!(opts(MAX_QUEUE_CAPACITY).effective_queue_capacity(), MAX_QUEUE_CAPACITY);
        assert_eq!(opts(usize::MAX).effective_queue_capacity(), MAX_QUEUE_CAPACITY);
    }

    #[tokio::test]
    async fn test_oversized_queue_capacity_still_connects() {
        let publisher = Arc::new(MemoryPublisher::default());
        let adapter = Arc::new(EventAdapter::new(AdapterOptions {
            queue_capacity: usize::MAX,
            close_timeout: Duration::from_secs(1),
        }));

        let task = {
            let adapter = Arc::clone(&adapter);
            let handle = Arc::clone(&publisher);
            tokio::spawn(async move { adapter.connect_with(async move { Ok(handle) }).await })
        };
        task.await.unwrap();

        assert_eq!(adapter.state(), AdapterState::Connected);
        assert!(adapter.is_connected());

        adapter.notify_user_created(&sample_user(1));
        adapter.close().await;
        assert_eq!(adapter.state(), AdapterState::Closed);
        assert_eq!(publisher.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_events() {
        let publisher =
            Arc::new(MemoryPublisher::default().with_publish_delay(Duration::from_millis(50)));
        let adapter = EventAdapter::new(AdapterOptions {
            queue_capacity: 1,
            close_timeout: Duration::from_secs(2),
        });
        let handle = Arc::clone(&publisher);
        adapter.connect_with(async move { Ok(handle) }).await;

        for id in 1..=10 {
            adapter.notify_user_created(&sample_user(id));
        }
        adapter.close().await;

        let delivered = publisher.messages().len();
        assert!(delivered >= 1);
        assert!(delivered <= 2);
    }
}
