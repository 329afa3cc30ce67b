use crate::infrastructure::error::{ClientError, Result};
use pairplay_core::ReconnectPolicy;
use std::time::Duration;

/// Relay connection configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay base URL (`ws://` or `wss://`)
    pub server_url: String,

    /// WebSocket path on the relay
    pub path: String,

    /// Time allowed for one connect attempt to open
    pub connect_timeout: Duration,

    /// Interval between heartbeat pings while open
    pub heartbeat_interval: Duration,

    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:3001".to_string(),
            path: "/ws".to_string(),
            connect_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(25),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Full socket URL, e.g. `wss://relay.example.com/ws`
    pub fn url(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(ClientError::InvalidConfig(format!(
                "server URL must start with ws:// or wss://, got {}",
                self.server_url
            )));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(ClientError::InvalidConfig(
                "heartbeat interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
