use crate::domain::{IceCandidate, IceServer, SessionDescription};
use crate::infrastructure::error::{MediaError, Result};
use async_trait::async_trait;
use pairplay_core::Message;

/// Which tracks to request from the local devices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub video: bool,
    pub audio: bool,
}

impl MediaConstraints {
    pub const VIDEO_AUDIO: Self = Self {
        video: true,
        audio: true,
    };

    pub const AUDIO_ONLY: Self = Self {
        video: false,
        audio: true,
    };
}

/// Handle for acquired local tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStream {
    pub id: String,
    pub constraints: MediaConstraints,
}

/// Handle for the partner's tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    pub id: String,
}

/// Camera and microphone access (trait seam for mocking)
#[async_trait]
pub trait MediaDevices: Send {
    async fn acquire(
        &mut self,
        constraints: MediaConstraints,
    ) -> std::result::Result<LocalStream, MediaError>;

    /// Stop every track of `stream`
    fn stop(&mut self, stream: &LocalStream);
}

/// One WebRTC peer connection
#[async_trait]
pub trait PeerConnection: Send {
    async fn add_stream(&mut self, stream: &LocalStream) -> Result<()>;
    async fn create_offer(&mut self) -> Result<SessionDescription>;
    async fn create_answer(&mut self) -> Result<SessionDescription>;
    async fn set_local_description(&mut self, description: SessionDescription) -> Result<()>;
    async fn set_remote_description(&mut self, description: SessionDescription) -> Result<()>;
    async fn add_ice_candidate(&mut self, candidate: IceCandidate) -> Result<()>;
    fn close(&mut self);
}

/// Creates peer connections from an ICE server list
pub trait PeerConnectionFactory: Send {
    type Connection: PeerConnection;

    fn create(&mut self, ice_servers: &[IceServer]) -> Result<Self::Connection>;
}

/// Outbound path for `rtc:*` frames (the relay socket)
#[async_trait]
pub trait SignalSink: Send {
    async fn send_signal(&mut self, message: Message) -> Result<()>;
}
