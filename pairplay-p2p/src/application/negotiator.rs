use crate::application::NegotiatorConfig;
use crate::domain::{
    IceCandidate, IceConnectionState, NegotiationPhase, PendingCandidates, RtcSignal,
    SessionDescription,
};
use crate::infrastructure::{
    LocalStream, MediaDevices, P2PError, PeerConnection, PeerConnectionFactory, RemoteStream,
    Result, SignalSink,
};
use pairplay_core::Message;
use tracing::Instrument;
use uuid::Uuid;

/// Offer/answer/ICE state machine for one audio/video call.
///
/// Remote candidates that arrive before a remote description are queued and
/// applied in arrival order right after the description is set. Any
/// negotiation error tears everything down and leaves the phase at
/// [`NegotiationPhase::Failed`]; `start_call` or an incoming offer starts over.
pub struct PeerConnectionNegotiator<F, M, S>
where
    F: PeerConnectionFactory,
{
    config: NegotiatorConfig,
    factory: F,
    media: M,
    signals: S,

    local_stream: Option<LocalStream>,
    remote_stream: Option<RemoteStream>,
    peer: Option<F::Connection>,
    pending: PendingCandidates,
    remote_description_set: bool,

    phase: NegotiationPhase,
    ice_state: IceConnectionState,
    call_id: Option<Uuid>,
}

impl<F, M, S> PeerConnectionNegotiator<F, M, S>
where
    F: PeerConnectionFactory,
    M: MediaDevices,
    S: SignalSink,
{
    pub fn new(config: NegotiatorConfig, factory: F, media: M, signals: S) -> Self {
        Self {
            config,
            factory,
            media,
            signals,
            local_stream: None,
            remote_stream: None,
            peer: None,
            pending: PendingCandidates::new(),
            remote_description_set: false,
            phase: NegotiationPhase::Idle,
            ice_state: IceConnectionState::New,
            call_id: None,
        }
    }

    // ===== Getters =====

    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    pub fn ice_state(&self) -> IceConnectionState {
        self.ice_state
    }

    /// Whether the call overlay should be visible
    pub fn overlay_visible(&self) -> bool {
        self.peer.is_some() && self.ice_state.shows_overlay()
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending.len()
    }

    pub fn local_stream(&self) -> Option<&LocalStream> {
        self.local_stream.as_ref()
    }

    pub fn remote_stream(&self) -> Option<&RemoteStream> {
        self.remote_stream.as_ref()
    }

    pub fn has_peer_connection(&self) -> bool {
        self.peer.is_some()
    }

    pub fn call_id(&self) -> Option<Uuid> {
        self.call_id
    }

    // ===== Negotiation =====

    /// Caller side: acquire media, create the connection and send an offer
    pub async fn start_call(&mut self) -> Result<()> {
        if self.peer.is_some() {
            match self.phase {
                NegotiationPhase::Negotiating | NegotiationPhase::Connected => {
                    return Err(P2PError::InProgress);
                }
                _ => self.release(),
            }
        }
        self.begin();
        tracing::info!("📹 Starting call {:?}", self.call_id);

        let span = self.call_span();
        let result = self.offer_path().instrument(span).await;
        self.settle(result)
    }

    /// Callee side: answer a remote offer
    pub async fn handle_offer(&mut self, offer: SessionDescription) -> Result<()> {
        if self.peer.is_some() {
            tracing::info!("🔄 New offer replaces the current peer connection");
            // Candidates queued before this offer belong to it
            let queued = std::mem::take(&mut self.pending);
            self.release();
            self.pending = queued;
        }
        self.begin();
        tracing::info!(
            "📨 Answering offer ({} candidates queued)",
            self.pending.len()
        );

        let span = self.call_span();
        let result = self.answer_path(offer).instrument(span).await;
        self.settle(result)
    }

    /// Caller side: apply the remote answer
    pub async fn handle_answer(&mut self, answer: SessionDescription) -> Result<()> {
        if self.peer.is_none() {
            tracing::warn!("⚠️ Ignoring answer without a peer connection");
            return Ok(());
        }
        let span = self.call_span();
        let result = self.accept_answer(answer).instrument(span).await;
        self.settle(result)
    }

    /// Apply a remote candidate now, or queue it until a remote description exists
    pub async fn handle_remote_candidate(&mut self, candidate: IceCandidate) -> Result<()> {
        if self.remote_description_set {
            if let Some(peer) = self.peer.as_mut() {
                if let Err(e) = peer.add_ice_candidate(candidate).await {
                    tracing::warn!("⚠️ Failed to add ICE candidate: {}", e);
                }
                return Ok(());
            }
        }

        tracing::debug!("🧊 Queueing ICE candidate ({} pending)", self.pending.len() + 1);
        self.pending.push(candidate);
        Ok(())
    }

    /// Route an `rtc:*` frame; other frames are ignored
    pub async fn handle_signal(&mut self, message: &Message) -> Result<()> {
        let Some(signal) = RtcSignal::from_message(message)? else {
            return Ok(());
        };
        signal.validate()?;

        match signal {
            RtcSignal::Offer(offer) => self.handle_offer(offer).await,
            RtcSignal::Answer(answer) => self.handle_answer(answer).await,
            RtcSignal::Candidate(candidate) => self.handle_remote_candidate(candidate).await,
        }
    }

    /// Relay a locally gathered candidate immediately
    pub async fn on_local_candidate(&mut self, candidate: IceCandidate) -> Result<()> {
        if self.peer.is_none() {
            tracing::debug!("Dropping local candidate without a peer connection");
            return Ok(());
        }
        self.send(RtcSignal::Candidate(candidate)).await
    }

    pub fn on_ice_connection_state(&mut self, state: IceConnectionState) -> NegotiationPhase {
        if self.peer.is_none() {
            tracing::debug!("Ignoring ICE state {:?} without a peer connection", state);
            return self.phase;
        }
        self.ice_state = state;
        self.phase = state.phase();
        tracing::info!("🧊 ICE {:?} → {:?}", state, self.phase);
        self.phase
    }

    pub fn on_remote_stream(&mut self, stream: RemoteStream) {
        tracing::info!("🎥 Remote stream {}", stream.id);
        self.remote_stream = Some(stream);
    }

    /// Stop tracks, close the connection and clear the queue. Idempotent.
    pub fn teardown(&mut self) {
        self.release();
        self.phase = NegotiationPhase::Idle;
    }

    // ===== Internals =====

    async fn offer_path(&mut self) -> Result<()> {
        self.open_peer().await?;
        let offer = self.peer_mut()?.create_offer().await?;
        self.peer_mut()?.set_local_description(offer.clone()).await?;
        self.send(RtcSignal::Offer(offer)).await
    }

    async fn answer_path(&mut self, offer: SessionDescription) -> Result<()> {
        self.open_peer().await?;
        self.peer_mut()?.set_remote_description(offer).await?;
        self.remote_description_set = true;
        self.drain_pending().await?;

        let answer = self.peer_mut()?.create_answer().await?;
        self.peer_mut()?.set_local_description(answer.clone()).await?;
        self.send(RtcSignal::Answer(answer)).await
    }

    async fn accept_answer(&mut self, answer: SessionDescription) -> Result<()> {
        self.peer_mut()?.set_remote_description(answer).await?;
        self.remote_description_set = true;
        self.drain_pending().await
    }

    async fn open_peer(&mut self) -> Result<()> {
        self.ensure_media().await;
        let peer = self.factory.create(&self.config.ice_servers)?;
        self.peer = Some(peer);

        if let Some(stream) = self.local_stream.clone() {
            self.peer_mut()?.add_stream(&stream).await?;
        }
        Ok(())
    }

    /// Video+audio, then audio only, then no local media at all
    async fn ensure_media(&mut self) {
        if self.local_stream.is_some() {
            return;
        }
        for constraints in self.config.media_fallback.clone() {
            match self.media.acquire(constraints).await {
                Ok(stream) => {
                    tracing::info!("🎙️ Acquired local media {:?}", constraints);
                    self.local_stream = Some(stream);
                    return;
                }
                Err(e) => tracing::warn!("⚠️ Media {:?} unavailable: {}", constraints, e),
            }
        }
        tracing::warn!("⚠️ Continuing without local media");
    }

    async fn drain_pending(&mut self) -> Result<()> {
        let candidates = self.pending.drain();
        if candidates.is_empty() {
            return Ok(());
        }
        tracing::debug!("🧊 Applying {} queued candidates", candidates.len());

        let peer = self.peer_mut()?;
        for candidate in candidates {
            if let Err(e) = peer.add_ice_candidate(candidate).await {
                tracing::warn!("⚠️ Failed to add queued ICE candidate: {}", e);
            }
        }
        Ok(())
    }

    async fn send(&mut self, signal: RtcSignal) -> Result<()> {
        let message = signal.into_message()?;
        self.signals.send_signal(message).await
    }

    fn peer_mut(&mut self) -> Result<&mut F::Connection> {
        self.peer.as_mut().ok_or(P2PError::NoPeerConnection)
    }

    fn call_span(&self) -> tracing::Span {
        match self.call_id {
            Some(id) => tracing::info_span!("call", id = %id),
            None => tracing::info_span!("call"),
        }
    }

    fn begin(&mut self) {
        self.phase = NegotiationPhase::Negotiating;
        self.ice_state = IceConnectionState::New;
        self.call_id = Some(Uuid::new_v4());
    }

    fn settle(&mut self, result: Result<()>) -> Result<()> {
        if let Err(e) = &result {
            tracing::error!("❌ Negotiation failed: {}", e);
            self.release();
            self.phase = NegotiationPhase::Failed;
        }
        result
    }

    fn release(&mut self) {
        if let Some(stream) = self.local_stream.take() {
            self.media.stop(&stream);
        }
        if let Some(mut peer) = self.peer.take() {
            peer.close();
        }
        self.remote_stream = None;
        self.pending.clear();
        self.remote_description_set = false;
        self.ice_state = IceConnectionState::New;
        self.call_id = None;
    }
}
