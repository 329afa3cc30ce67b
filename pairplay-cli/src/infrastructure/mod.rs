pub mod config;
pub mod error;
pub mod observability;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use observability::LogConfig;
pub use transport::{Incoming, Link, Outgoing, Transport, WebSocketTransport};
