use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::events::AdapterOptions;
use crate::provider::nats::NatsConfig;
use crate::types::BuildInfo;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_NATS_URL: &str = "nats://localhost:4222";
const DEFAULT_NATS_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PUBLISH_QUEUE_CAPACITY: usize = 1024;
const UNKNOWN: &str = "unknown";

/// Service settings, read once at startup from the environment or flags.
#[derive(Debug, Clone, Parser)]
#[command(name = "a3s-users", version, about = "User CRUD service with NATS notifications")]
pub struct ServiceConfig {
    /// Host address for the HTTP server
    #[arg(long, env = "BIND_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port for the HTTP server
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// NATS server URL for record notifications
    #[arg(long, env = "NATS_URL", default_value = DEFAULT_NATS_URL)]
    pub nats_url: String,

    /// Attempt the NATS connection at startup
    #[arg(long, env = "NATS_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub nats_enabled: bool,

    /// Upper bound on the initial NATS connection attempt
    #[arg(long, env = "NATS_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_NATS_CONNECT_TIMEOUT_SECS)]
    pub nats_connect_timeout_secs: u64,

    /// Optional NATS auth token
    #[arg(long, env = "NATS_TOKEN", hide_env_values = true)]
    pub nats_token: Option<String>,

    /// Application version reported by /health and /api/version
    #[arg(long = "app-version", env = "APP_VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub app_version: String,

    /// Build timestamp reported by /api/version
    #[arg(long, env = "BUILD_TIME", default_value = UNKNOWN)]
    pub build_time: String,

    /// Source revision reported by /api/version
    #[arg(long, env = "GIT_COMMIT", default_value = UNKNOWN)]
    pub git_commit: String,

    /// Bound on draining pending events and closing the bus on shutdown
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    pub shutdown_timeout_secs: u64,

    /// Notifications buffered before new ones are dropped
    #[arg(long, env = "PUBLISH_QUEUE_CAPACITY", default_value_t = DEFAULT_PUBLISH_QUEUE_CAPACITY)]
    pub publish_queue_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            nats_url: DEFAULT_NATS_URL.to_string(),
            nats_enabled: true,
            nats_connect_timeout_secs: DEFAULT_NATS_CONNECT_TIMEOUT_SECS,
            nats_token: None,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            build_time: UNKNOWN.to_string(),
            git_commit: UNKNOWN.to_string(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            publish_queue_capacity: DEFAULT_PUBLISH_QUEUE_CAPACITY,
        }
    }
}

impl ServiceConfig {
    /// Returns the server bind address string (e.g., "0.0.0.0:3000").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Metadata served by `GET /api/version`.
    pub fn build_info(&self) -> BuildInfo {
        BuildInfo {
            version: self.app_version.clone(),
            build_time: self.build_time.clone(),
            git_commit: self.git_commit.clone(),
        }
    }

    pub fn nats_config(&self) -> NatsConfig {
        NatsConfig {
            url: self.nats_url.clone(),
            connect_timeout_secs: self.nats_connect_timeout_secs,
            token: self.nats_token.clone(),
            ..Default::default()
        }
    }

    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            queue_capacity: self.publish_queue_capacity,
            close_timeout: self.shutdown_timeout(),
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
