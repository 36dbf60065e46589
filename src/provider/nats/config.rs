//! NATS connection configuration

use serde::{Deserialize, Serialize};

/// Settings for connecting to a NATS server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatsConfig {
    /// Server URL (e.g., "nats://localhost:4222")
    pub url: String,

    /// Client name reported to the server
    #[serde(default = "default_client_name")]
    pub name: String,

    /// Upper bound on the initial connection attempt
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Optional auth token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_client_name() -> String {
    "a3s-users".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            name: default_client_name(),
            connect_timeout_secs: default_connect_timeout_secs(),
            token: None,
        }
    }
}
