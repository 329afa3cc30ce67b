pub mod call_bridge;
pub mod runtime;
pub mod session_connection;

pub use call_bridge::{CallBridge, RelaySink};
pub use runtime::{LinkStatus, SessionEvent, SessionHandle, SessionRuntime, SessionSnapshot};
pub use session_connection::{ConnectReply, LinkEvent, SessionConnection};
