use pairplay_core::{CallError, ProtocolError};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Connect timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    #[error("Connection closed")]
    Closed,

    #[error("Session runtime stopped")]
    RuntimeStopped,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Call error: {0}")]
    Call(#[from] CallError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
