//! Relay client for two-player rooms: a reconnecting session runtime plus
//! the glue that feeds call signaling into the peer negotiator.

pub mod application;
pub mod infrastructure;

pub use application::{
    CallBridge, LinkEvent, LinkStatus, RelaySink, SessionConnection, SessionEvent, SessionHandle,
    SessionRuntime, SessionSnapshot,
};
pub use infrastructure::{
    ClientConfig, ClientError, LogConfig, Result, Transport, WebSocketTransport,
};
