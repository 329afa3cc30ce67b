//! Scripted media stack for negotiation scenarios

use async_trait::async_trait;
use pairplay_core::Message;
use pairplay_p2p::{
    IceCandidate, IceServer, LocalStream, MediaConstraints, MediaDevices, MediaError,
    PeerConnection, PeerConnectionFactory, Result, SdpKind, SessionDescription, SignalSink,
};
use std::sync::{Arc, Mutex};

/// What happened on the scripted peer connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerStep {
    RemoteDescription(SdpKind),
    Candidate(String),
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct PeerLog(Arc<Mutex<Vec<PeerStep>>>);

impl PeerLog {
    fn push(&self, step: PeerStep) {
        self.0.lock().unwrap().push(step);
    }

    pub fn steps(&self) -> Vec<PeerStep> {
        self.0.lock().unwrap().clone()
    }

    /// Candidates applied so far, in order
    pub fn applied_candidates(&self) -> Vec<String> {
        self.steps()
            .into_iter()
            .filter_map(|step| match step {
                PeerStep::Candidate(candidate) => Some(candidate),
                _ => None,
            })
            .collect()
    }
}

pub struct ScriptedPeer {
    log: PeerLog,
}

#[async_trait]
impl PeerConnection for ScriptedPeer {
    async fn add_stream(&mut self, _stream: &LocalStream) -> Result<()> {
        Ok(())
    }

    async fn create_offer(&mut self) -> Result<SessionDescription> {
        Ok(SessionDescription::offer("v=0 scripted-offer"))
    }

    async fn create_answer(&mut self) -> Result<SessionDescription> {
        Ok(SessionDescription::answer("v=0 scripted-answer"))
    }

    async fn set_local_description(&mut self, _description: SessionDescription) -> Result<()> {
        Ok(())
    }

    async fn set_remote_description(&mut self, description: SessionDescription) -> Result<()> {
        self.log.push(PeerStep::RemoteDescription(description.kind));
        Ok(())
    }

    async fn add_ice_candidate(&mut self, candidate: IceCandidate) -> Result<()> {
        self.log.push(PeerStep::Candidate(candidate.candidate));
        Ok(())
    }

    fn close(&mut self) {
        self.log.push(PeerStep::Closed);
    }
}

pub struct ScriptedFactory {
    log: PeerLog,
}

impl ScriptedFactory {
    pub fn new(log: PeerLog) -> Self {
        Self { log }
    }
}

impl PeerConnectionFactory for ScriptedFactory {
    type Connection = ScriptedPeer;

    fn create(&mut self, _ice_servers: &[IceServer]) -> Result<ScriptedPeer> {
        Ok(ScriptedPeer {
            log: self.log.clone(),
        })
    }
}

/// A device with neither camera nor microphone
pub struct NoCamera;

#[async_trait]
impl MediaDevices for NoCamera {
    async fn acquire(
        &mut self,
        _constraints: MediaConstraints,
    ) -> std::result::Result<LocalStream, MediaError> {
        Err(MediaError::DeviceNotFound)
    }

    fn stop(&mut self, _stream: &LocalStream) {}
}

/// Frames the negotiator handed to the relay
#[derive(Debug, Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<Message>>>);

impl Outbox {
    pub fn tags(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().iter().map(Message::tag).collect()
    }
}

#[async_trait]
impl SignalSink for Outbox {
    async fn send_signal(&mut self, message: Message) -> Result<()> {
        self.0.lock().unwrap().push(message);
        Ok(())
    }
}
