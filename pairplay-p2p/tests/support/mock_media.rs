use async_trait::async_trait;
use pairplay_core::Message;
use pairplay_p2p::{
    IceCandidate, IceServer, LocalStream, MediaConstraints, MediaDevices, MediaError, P2PError,
    PeerConnection, PeerConnectionFactory, Result, SdpKind, SessionDescription, SignalSink,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Calls made on mock peer connections, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerCall {
    Created(usize),
    AddStream(String),
    CreateOffer,
    CreateAnswer,
    SetLocal(SdpKind),
    SetRemote(SdpKind),
    AddCandidate(String),
    Close,
}

/// Shared, cloneable call log
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<PeerCall>>>);

impl CallLog {
    fn record(&self, call: PeerCall) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<PeerCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn applied_candidates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PeerCall::AddCandidate(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, call: &PeerCall) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }
}

/// Failure switches flipped from the test body
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub fail_offer: Arc<AtomicBool>,
    pub rejected_candidate: Arc<Mutex<Option<String>>>,
}

impl Faults {
    pub fn set_fail_offer(&self, fail: bool) {
        self.fail_offer.store(fail, Ordering::SeqCst);
    }

    pub fn reject_candidate(&self, candidate: &str) {
        *self.rejected_candidate.lock().unwrap() = Some(candidate.to_string());
    }
}

pub struct MockPeerConnection {
    log: CallLog,
    faults: Faults,
}

#[async_trait]
impl PeerConnection for MockPeerConnection {
    async fn add_stream(&mut self, stream: &LocalStream) -> Result<()> {
        self.log.record(PeerCall::AddStream(stream.id.clone()));
        Ok(())
    }

    async fn create_offer(&mut self) -> Result<SessionDescription> {
        if self.faults.fail_offer.load(Ordering::SeqCst) {
            return Err(P2PError::Negotiation("createOffer rejected".to_string()));
        }
        self.log.record(PeerCall::CreateOffer);
        Ok(SessionDescription::offer("v=0 offer"))
    }

    async fn create_answer(&mut self) -> Result<SessionDescription> {
        self.log.record(PeerCall::CreateAnswer);
        Ok(SessionDescription::answer("v=0 answer"))
    }

    async fn set_local_description(&mut self, description: SessionDescription) -> Result<()> {
        self.log.record(PeerCall::SetLocal(description.kind));
        Ok(())
    }

    async fn set_remote_description(&mut self, description: SessionDescription) -> Result<()> {
        self.log.record(PeerCall::SetRemote(description.kind));
        Ok(())
    }

    async fn add_ice_candidate(&mut self, candidate: IceCandidate) -> Result<()> {
        let rejected = self.faults.rejected_candidate.lock().unwrap().clone();
        if rejected.as_deref() == Some(candidate.candidate.as_str()) {
            return Err(P2PError::Negotiation("bad candidate".to_string()));
        }
        self.log.record(PeerCall::AddCandidate(candidate.candidate));
        Ok(())
    }

    fn close(&mut self) {
        self.log.record(PeerCall::Close);
    }
}

pub struct MockFactory {
    log: CallLog,
    faults: Faults,
}

impl PeerConnectionFactory for MockFactory {
    type Connection = MockPeerConnection;

    fn create(&mut self, ice_servers: &[IceServer]) -> Result<MockPeerConnection> {
        self.log.record(PeerCall::Created(ice_servers.len()));
        Ok(MockPeerConnection {
            log: self.log.clone(),
            faults: self.faults.clone(),
        })
    }
}

/// Devices that grant only the listed constraints
pub struct MockMedia {
    allowed: Vec<MediaConstraints>,
    acquired: usize,
    stopped: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl MediaDevices for MockMedia {
    async fn acquire(
        &mut self,
        constraints: MediaConstraints,
    ) -> std::result::Result<LocalStream, MediaError> {
        if !self.allowed.contains(&constraints) {
            return Err(MediaError::PermissionDenied);
        }
        self.acquired += 1;
        Ok(LocalStream {
            id: format!("local-{}", self.acquired),
            constraints,
        })
    }

    fn stop(&mut self, stream: &LocalStream) {
        self.stopped.lock().unwrap().push(stream.id.clone());
    }
}

/// Sink recording every relayed signal
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub sent: Arc<Mutex<Vec<Message>>>,
}

#[async_trait]
impl SignalSink for RecordingSink {
    async fn send_signal(&mut self, message: Message) -> Result<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Handles the test keeps after the mocks move into the negotiator
pub struct MockHandles {
    pub log: CallLog,
    pub faults: Faults,
    pub sent: Arc<Mutex<Vec<Message>>>,
    pub stopped: Arc<Mutex<Vec<String>>>,
}

impl MockHandles {
    pub fn sent_tags(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(Message::tag).collect()
    }
}

pub fn mock_media_stack(
    allowed: Vec<MediaConstraints>,
) -> (MockFactory, MockMedia, RecordingSink, MockHandles) {
    let log = CallLog::default();
    let faults = Faults::default();
    let sink = RecordingSink::default();
    let stopped = Arc::new(Mutex::new(Vec::new()));

    let factory = MockFactory {
        log: log.clone(),
        faults: faults.clone(),
    };
    let media = MockMedia {
        allowed,
        acquired: 0,
        stopped: stopped.clone(),
    };
    let handles = MockHandles {
        log,
        faults,
        sent: sink.sent.clone(),
        stopped,
    };
    (factory, media, sink, handles)
}
