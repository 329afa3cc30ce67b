pub mod mock_transport;

use mock_transport::{MockTransport, Plan, ServerEnd};
use pairplay_cli::{
    ClientConfig, LinkEvent, LinkStatus, SessionConnection, SessionEvent, SessionHandle, SessionRuntime,
};
use pairplay_core::ReconnectPolicy;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Default backoff with fewer attempts
pub fn limited_policy(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy::default().with_max_attempts(max_attempts)
}

/// Connection driven directly by the test
pub struct ConnectionFixture {
    pub connection: SessionConnection<MockTransport>,
    pub transport: MockTransport,
    pub ends: mpsc::UnboundedReceiver<ServerEnd>,
}

impl ConnectionFixture {
    pub fn new(plans: Vec<Plan>, fallback: Plan) -> Self {
        Self::with_config(plans, fallback, ClientConfig::default())
    }

    pub fn with_config(plans: Vec<Plan>, fallback: Plan, config: ClientConfig) -> Self {
        let (transport, ends) = MockTransport::new(plans, fallback);
        Self {
            connection: SessionConnection::new(transport.clone(), config),
            transport,
            ends,
        }
    }

    /// Connect and wait until open; returns the relay side
    pub async fn open(&mut self) -> ServerEnd {
        let (tx, rx) = oneshot::channel();
        self.connection.connect(Some(tx));
        assert_eq!(
            self.connection.next_event().await,
            LinkEvent::Opened { rejoined: false }
        );
        rx.await.unwrap().unwrap();
        self.ends.try_recv().unwrap()
    }

    /// Next link event, or `None` if nothing happens within `limit`
    pub async fn event_within(&mut self, limit: Duration) -> Option<LinkEvent> {
        tokio::time::timeout(limit, self.connection.next_event())
            .await
            .ok()
    }
}

/// Runtime plus the relay side of its sockets
pub struct RuntimeFixture {
    pub runtime: SessionRuntime,
    pub handle: SessionHandle,
    pub events: broadcast::Receiver<SessionEvent>,
    pub transport: MockTransport,
    pub ends: mpsc::UnboundedReceiver<ServerEnd>,
}

impl RuntimeFixture {
    pub fn new(plans: Vec<Plan>, fallback: Plan, config: ClientConfig) -> Self {
        let (transport, ends) = MockTransport::new(plans, fallback);
        let runtime = SessionRuntime::spawn(transport.clone(), config);
        let handle = runtime.handle();
        let events = handle.subscribe();
        Self {
            runtime,
            handle,
            events,
            transport,
            ends,
        }
    }

    pub fn accepting() -> Self {
        Self::new(Vec::new(), Plan::Accept, ClientConfig::default())
    }

    /// Connect, consume the open event and return the relay side of the socket
    pub async fn connect(&mut self) -> ServerEnd {
        self.handle.connect().await.unwrap();
        let server = self.ends.recv().await.unwrap();
        self.wait_for(|e| matches!(e, SessionEvent::Link(LinkStatus::Opened { .. })))
            .await;
        server
    }

    /// Wait for the next published event
    pub async fn next_event(&mut self) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(120), self.events.recv())
            .await
            .expect("no session event within two minutes")
            .unwrap()
    }

    /// Skip events until `pred` matches
    pub async fn wait_for(&mut self, pred: impl Fn(&SessionEvent) -> bool) -> SessionEvent {
        loop {
            let event = self.next_event().await;
            if pred(&event) {
                return event;
            }
        }
    }
}
