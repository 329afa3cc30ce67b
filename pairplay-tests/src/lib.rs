use cucumber::World;
use pairplay_core::{
    ActionSyncAdapter, CloseDecision, Dispatch, GameAction, MathQuiz, Message, ReconnectState,
    RemoteApply, RoomProtocolHandler, SyncError,
};
use pairplay_p2p::PeerConnectionNegotiator;
use std::fmt;

pub mod media;

use media::{NoCamera, Outbox, PeerLog, ScriptedFactory};

pub type CallNegotiator = PeerConnectionNegotiator<ScriptedFactory, NoCamera, Outbox>;

#[derive(World)]
#[world(init = Self::new)]
pub struct PairPlayWorld {
    /// Room protocol state machine (the system under test)
    pub rooms: RoomProtocolHandler,

    /// Dispatches produced by inbound frames, oldest first
    pub dispatches: Vec<Dispatch>,

    pub reconnect: ReconnectState,

    /// Every close decision taken so far
    pub decisions: Vec<CloseDecision>,

    /// Frame sent when the link reopened
    pub rejoin: Option<Message>,

    pub quiz: Option<ActionSyncAdapter<MathQuiz>>,
    pub quiz_seed: u64,
    pub last_sync: Option<Result<GameAction, SyncError>>,
    pub last_apply: Option<RemoteApply>,

    pub negotiator: CallNegotiator,
    pub peer_log: PeerLog,
    pub outbox: Outbox,
}

impl PairPlayWorld {
    pub fn new() -> Self {
        let peer_log = PeerLog::default();
        let outbox = Outbox::default();
        let negotiator = PeerConnectionNegotiator::new(
            Default::default(),
            ScriptedFactory::new(peer_log.clone()),
            NoCamera,
            outbox.clone(),
        );
        Self {
            rooms: RoomProtocolHandler::new(),
            dispatches: Vec::new(),
            reconnect: ReconnectState::default(),
            decisions: Vec::new(),
            rejoin: None,
            quiz: None,
            quiz_seed: 0,
            last_sync: None,
            last_apply: None,
            negotiator,
            peer_log,
            outbox,
        }
    }

    /// Feed one relay frame to the room handler
    pub fn receive(&mut self, message: Message) {
        if let Some(dispatch) = self.rooms.handle(message) {
            self.dispatches.push(dispatch);
        }
    }

    pub fn last_dispatch(&self) -> Option<&Dispatch> {
        self.dispatches.last()
    }

    /// Quiz adapter (panics if no quiz was started)
    pub fn quiz(&mut self) -> &mut ActionSyncAdapter<MathQuiz> {
        self.quiz.as_mut().expect("No quiz started")
    }
}

impl Default for PairPlayWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PairPlayWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairPlayWorld")
            .field("session", self.rooms.session())
            .field("dispatches", &self.dispatches.len())
            .field("reconnect", &self.reconnect)
            .field("decisions", &self.decisions)
            .field("quiz_scores", &self.quiz.as_ref().map(|q| q.game().scores().clone()))
            .field("negotiation", &self.negotiator.phase())
            .field("pending_candidates", &self.negotiator.pending_candidates())
            .finish()
    }
}
