//! Sans-IO session layer for two-player rooms: relay protocol, room state,
//! reconnect bookkeeping, call matching and round-locked action sync.

pub mod application;
pub mod domain;
pub mod games;

pub use application::{
    ActionSyncAdapter, CallError, CallEvent, CallSignalingChannel, CallState, Dispatch, GameEvent,
    RemoteApply, RoomEvent, RoomProtocolHandler, StrokeBatcher, SyncError, SyncableGame,
};
pub use domain::{
    ActiveGame, CloseDecision, GameAction, GameRoundLock, GameUpdate, LinkPhase, Message,
    PlayerId, PlayerInfo, ProtocolError, ReconnectPolicy, ReconnectState, RoomCode,
    RoomMembership, Scores, Session, NORMAL_CLOSURE,
};
pub use games::{generate_questions, DrawInput, FreeDraw, MathQuiz, Point, Stroke};
