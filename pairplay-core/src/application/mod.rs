pub mod action_sync;
pub mod batching;
pub mod call_signaling;
pub mod room_protocol;

pub use action_sync::{ActionSyncAdapter, RemoteApply, SyncError, SyncableGame};
pub use batching::{StrokeBatcher, STROKE_WINDOW};
pub use call_signaling::{CallError, CallEvent, CallSignalingChannel, CallState};
pub use room_protocol::{Dispatch, GameEvent, RoomEvent, RoomProtocolHandler, DISCONNECTED_REASON};
