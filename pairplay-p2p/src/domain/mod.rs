pub mod candidate_queue;
pub mod ice_server;
pub mod negotiation;
pub mod signal;

pub use candidate_queue::PendingCandidates;
pub use ice_server::IceServer;
pub use negotiation::{IceConnectionState, NegotiationPhase};
pub use signal::{IceCandidate, RtcSignal, SdpKind, SessionDescription};
