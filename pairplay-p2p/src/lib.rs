// Domain layer (signal payloads, phases, ICE servers)
pub mod domain;

// Application layer (negotiator)
pub mod application;

// Infrastructure layer (media subsystem seams)
pub mod infrastructure;

// Re-exports for convenience
pub use application::{NegotiatorConfig, PeerConnectionNegotiator};
pub use domain::{
    IceCandidate, IceConnectionState, IceServer, NegotiationPhase, PendingCandidates, RtcSignal,
    SdpKind, SessionDescription,
};
pub use infrastructure::{
    LocalStream, MediaConstraints, MediaDevices, MediaError, P2PError, PeerConnection,
    PeerConnectionFactory, RemoteStream, Result, SignalSink,
};
