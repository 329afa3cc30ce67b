use serde::{Deserialize, Serialize};

/// Negotiator phase as shown to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationPhase {
    #[default]
    Idle,
    Negotiating,
    Connected,
    Disconnected,
    Failed,
}

/// ICE connection state reported by the media subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IceConnectionState {
    #[default]
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl IceConnectionState {
    /// Phase this ICE state moves the negotiator to
    pub fn phase(self) -> NegotiationPhase {
        match self {
            Self::New | Self::Checking => NegotiationPhase::Negotiating,
            Self::Connected | Self::Completed => NegotiationPhase::Connected,
            Self::Disconnected | Self::Closed => NegotiationPhase::Disconnected,
            Self::Failed => NegotiationPhase::Failed,
        }
    }

    /// The call overlay is shown only on these states
    pub fn shows_overlay(self) -> bool {
        matches!(self, Self::Connected | Self::Completed)
    }
}
