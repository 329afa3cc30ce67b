use crate::application::runtime::{SessionEvent, SessionHandle};
use async_trait::async_trait;
use pairplay_core::{CallEvent, Message, RoomEvent};
use pairplay_p2p::{
    MediaDevices, P2PError, PeerConnectionFactory, PeerConnectionNegotiator, SignalSink,
};
use tokio::sync::broadcast;

/// Sends `rtc:*` frames over the relay session
#[derive(Clone)]
pub struct RelaySink {
    handle: SessionHandle,
}

impl RelaySink {
    pub fn new(handle: SessionHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl SignalSink for RelaySink {
    async fn send_signal(&mut self, message: Message) -> pairplay_p2p::Result<()> {
        self.handle
            .send(message)
            .map_err(|e| P2PError::SendFailed(e.to_string()))
    }
}

/// Feeds session events into a [`PeerConnectionNegotiator`].
///
/// The caller that initiated a matched call sends the offer. Leaving the
/// room, or the partner leaving it, tears the call down.
pub struct CallBridge<F, M, S>
where
    F: PeerConnectionFactory,
{
    negotiator: PeerConnectionNegotiator<F, M, S>,
}

impl<F, M, S> CallBridge<F, M, S>
where
    F: PeerConnectionFactory,
    M: MediaDevices,
    S: SignalSink,
{
    pub fn new(negotiator: PeerConnectionNegotiator<F, M, S>) -> Self {
        Self { negotiator }
    }

    pub fn negotiator(&self) -> &PeerConnectionNegotiator<F, M, S> {
        &self.negotiator
    }

    pub fn negotiator_mut(&mut self) -> &mut PeerConnectionNegotiator<F, M, S> {
        &mut self.negotiator
    }

    /// Apply one session event; negotiation errors are logged, not fatal
    pub async fn on_event(&mut self, event: &SessionEvent) {
        let result = match event {
            SessionEvent::Rtc(message) => self.negotiator.handle_signal(message).await,
            SessionEvent::Call(CallEvent::Matched {
                initiated: true, ..
            }) => self.negotiator.start_call().await,
            SessionEvent::Room(RoomEvent::PlayerLeft { .. } | RoomEvent::Left { .. }) => {
                self.negotiator.teardown();
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            tracing::warn!("⚠️ Call negotiation error: {}", e);
        }
    }

    /// Drive the bridge until the runtime stops publishing
    pub async fn run(mut self, mut events: broadcast::Receiver<SessionEvent>) -> Self {
        loop {
            match events.recv().await {
                Ok(event) => self.on_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("⚠️ Call bridge lagged, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        self.negotiator.teardown();
        self
    }
}
