/// Local media acquisition failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("No device matches the constraints")]
    DeviceNotFound,

    #[error("Media unavailable: {0}")]
    Unavailable(String),
}

/// Negotiation errors
#[derive(Debug, thiserror::Error)]
pub enum P2PError {
    #[error("Negotiation failed: {0}")]
    Negotiation(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("No peer connection")]
    NoPeerConnection,

    #[error("Negotiation already in progress")]
    InProgress,

    #[error("Unexpected signal: {0}")]
    UnexpectedSignal(&'static str),

    #[error("Invalid signal payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Signal send failed: {0}")]
    SendFailed(String),
}

pub type Result<T> = std::result::Result<T, P2PError>;
