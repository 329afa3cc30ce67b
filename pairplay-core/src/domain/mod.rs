pub mod message;
pub mod reconnect;
pub mod round_lock;
pub mod session;

pub use message::{
    GameAction, GameUpdate, Message, PlayerId, PlayerInfo, ProtocolError, RoomCode, Scores,
};
pub use reconnect::{
    CloseDecision, ReconnectPolicy, ReconnectState, RoomMembership, NORMAL_CLOSURE,
};
pub use round_lock::GameRoundLock;
pub use session::{ActiveGame, LinkPhase, Session};
