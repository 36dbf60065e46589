//! # a3s-users
//!
//! In-memory user CRUD over HTTP with best-effort NATS notifications.
//!
//! ## Overview
//!
//! `a3s-users` serves a small REST API over a process-local collection of
//! user records. Creating a user publishes a `user.created` message to NATS
//! when a bus connection is available; the API never waits on, or fails
//! because of, the bus.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_users::{EventAdapter, UserStore};
//! use a3s_users::provider::memory::MemoryPublisher;
//!
//! # async fn example() {
//! let store = UserStore::new();
//! let events = EventAdapter::default();
//! events.connect_with(async { Ok(MemoryPublisher::default()) }).await;
//!
//! let user = store
//!     .create(Some("John Doe".into()), Some("john@example.com".into()))
//!     .unwrap();
//! events.notify_user_created(&user);
//! events.close().await;
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **UserStore** — owns records and the id counter
//! - **EventAdapter** — best-effort bus connection with a non-blocking queue
//! - **EventPublisher** trait — bus backends (NATS, in-memory)
//! - **server** — axum router, shared state, startup and graceful shutdown

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod provider;
pub mod server;
pub mod store;
pub mod types;

// Re-export core types
pub use config::ServiceConfig;
pub use error::{EventError, Result, ServiceError, UserError};
pub use events::{AdapterOptions, AdapterState, EventAdapter, USER_CREATED_SUBJECT};
pub use provider::EventPublisher;
pub use server::state::AppState;
pub use store::UserStore;
pub use types::{BuildInfo, CreateUserRequest, UpdateUserRequest, User, UserList};

// Re-export providers for convenience
pub use provider::memory::{MemoryPublisher, PublishedMessage};
pub use provider::nats::{NatsClient, NatsConfig, NatsPublisher};
