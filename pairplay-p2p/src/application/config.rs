use crate::domain::IceServer;
use crate::infrastructure::MediaConstraints;

/// Configuration for the peer connection negotiator
#[derive(Debug, Clone)]
pub struct NegotiatorConfig {
    /// ICE servers for every peer connection
    pub ice_servers: Vec<IceServer>,

    /// Constraints tried in order when acquiring local media
    pub media_fallback: Vec<MediaConstraints>,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            ice_servers: IceServer::default_servers(),
            media_fallback: vec![MediaConstraints::VIDEO_AUDIO, MediaConstraints::AUDIO_ONLY],
        }
    }
}

impl NegotiatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServer>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    pub fn with_media_fallback(mut self, fallback: Vec<MediaConstraints>) -> Self {
        self.media_fallback = fallback;
        self
    }
}
