use serde::{Deserialize, Serialize};

/// ICE server entry handed to the peer connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    /// Server URLs (several entries act as failover)
    pub urls: Vec<String>,
    /// Username (TURN only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Credential (TURN only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServer {
    /// STUN server without credentials
    pub fn stun(url: impl Into<String>) -> Self {
        Self::from_urls(vec![url.into()])
    }

    /// TURN relay with credentials
    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self::stun(url).with_auth(username, credential)
    }

    pub fn from_urls(urls: Vec<String>) -> Self {
        Self {
            urls,
            username: None,
            credential: None,
        }
    }

    pub fn with_auth(mut self, username: impl Into<String>, credential: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.credential = Some(credential.into());
        self
    }

    /// Whether any URL points at a TURN relay
    pub fn is_relay(&self) -> bool {
        self.urls
            .iter()
            .any(|url| url.starts_with("turn:") || url.starts_with("turns:"))
    }

    /// Public STUN servers followed by the fallback TURN relays
    pub fn default_servers() -> Vec<Self> {
        vec![
            Self::stun("stun:stun.l.google.com:19302"),
            Self::stun("stun:stun1.l.google.com:19302"),
            Self::turn(
                "turn:openrelay.metered.ca:80",
                "openrelayproject",
                "openrelayproject",
            ),
            Self::turn(
                "turn:openrelay.metered.ca:443",
                "openrelayproject",
                "openrelayproject",
            ),
            Self::turn(
                "turn:openrelay.metered.ca:443?transport=tcp",
                "openrelayproject",
                "openrelayproject",
            ),
        ]
    }
}
