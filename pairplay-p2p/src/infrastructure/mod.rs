pub mod error;
pub mod media;

pub use error::{MediaError, P2PError, Result};
pub use media::{
    LocalStream, MediaConstraints, MediaDevices, PeerConnection, PeerConnectionFactory,
    RemoteStream, SignalSink,
};
