use crate::infrastructure::{ClientConfig, ClientError, Incoming, Link, Outgoing, Result, Transport};
use pairplay_core::{
    CloseDecision, LinkPhase, Message, ReconnectState, RoomMembership, NORMAL_CLOSURE,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, Interval, MissedTickBehavior};

type PendingAttempt = Pin<Box<dyn Future<Output = Result<Link>> + Send>>;

/// Reply channel for a caller waiting on `connect`
pub type ConnectReply = oneshot::Sender<Result<()>>;

/// What happened on the relay link
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// Link open; `rejoined` when a room rejoin was sent automatically
    Opened { rejoined: bool },
    /// Application frame (heartbeat already consumed)
    Frame(Message),
    /// Closed without a retry (intentional or normal closure)
    Closed { code: Option<u16> },
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// Attempts exhausted; emitted once
    GaveUp,
}

enum Step {
    AttemptDone(Result<Link>),
    Incoming(Option<Incoming>),
    RetryDue,
    Heartbeat,
}

/// Relay socket owner: connect, heartbeat, backoff reconnect and rejoin.
///
/// Every timer lives here as an explicit handle and is dropped on
/// [`SessionConnection::disconnect`]. Drive it by awaiting
/// [`SessionConnection::next_event`], which is cancel safe.
pub struct SessionConnection<T: Transport> {
    transport: Arc<T>,
    config: ClientConfig,
    phase: LinkPhase,
    link: Option<Link>,
    reconnect: ReconnectState,

    attempt: Option<PendingAttempt>,
    waiters: Vec<ConnectReply>,
    retry_at: Option<Instant>,
    heartbeat: Option<Interval>,
}

impl<T: Transport> SessionConnection<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        let reconnect = ReconnectState::new(config.reconnect);
        Self {
            transport: Arc::new(transport),
            config,
            phase: LinkPhase::Idle,
            link: None,
            reconnect,
            attempt: None,
            waiters: Vec::new(),
            retry_at: None,
            heartbeat: None,
        }
    }

    // ===== Getters =====

    pub fn phase(&self) -> LinkPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == LinkPhase::Open
    }

    pub fn reconnect_state(&self) -> &ReconnectState {
        &self.reconnect
    }

    /// When the next retry fires, if one is scheduled
    pub fn retry_deadline(&self) -> Option<Instant> {
        self.retry_at
    }

    // ===== Commands =====

    /// Connect, joining an in-flight attempt instead of opening a second socket
    pub fn connect(&mut self, reply: Option<ConnectReply>) {
        self.reconnect.begin_connect();

        match self.phase {
            LinkPhase::Open => {
                if let Some(reply) = reply {
                    let _ = reply.send(Ok(()));
                }
            }
            LinkPhase::Connecting => {
                tracing::debug!("Joining in-flight connect attempt");
                self.waiters.extend(reply);
            }
            LinkPhase::Idle | LinkPhase::Closed => {
                self.retry_at = None;
                self.waiters.extend(reply);
                self.start_attempt();
            }
        }
    }

    /// Send if open; otherwise the frame is dropped
    pub fn send(&mut self, message: &Message) -> bool {
        let Some(link) = self.link.as_ref().filter(|_| self.phase == LinkPhase::Open) else {
            tracing::debug!("Dropping {} while {:?}", message.tag(), self.phase);
            return false;
        };
        match message.encode() {
            Ok(text) => {
                tracing::debug!("📤 {}", message.tag());
                link.tx.send(Outgoing::Text(text)).is_ok()
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to encode {}: {}", message.tag(), e);
                false
            }
        }
    }

    /// Close with normal closure and cancel every timer; no reconnect follows
    pub fn disconnect(&mut self) {
        tracing::info!("👋 Disconnecting from relay");
        self.reconnect.mark_intentional();
        if let Some(link) = self.link.take() {
            let _ = link.tx.send(Outgoing::Close(NORMAL_CLOSURE));
        }
        self.attempt = None;
        self.retry_at = None;
        self.heartbeat = None;
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(Err(ClientError::Closed));
        }
        self.phase = LinkPhase::Closed;
    }

    /// Foreground transition: reconnect now if the session should be connected
    pub fn resume(&mut self) -> bool {
        if !self.reconnect.should_resume() {
            return false;
        }
        if matches!(self.phase, LinkPhase::Open | LinkPhase::Connecting) {
            return false;
        }
        tracing::info!("⏩ Resuming connection, skipping backoff");
        self.retry_at = None;
        self.start_attempt();
        true
    }

    /// Keep the room to rejoin in sync with the session
    pub fn set_membership(&mut self, membership: Option<RoomMembership>) {
        match membership {
            Some(membership) if self.reconnect.membership() != Some(&membership) => {
                self.reconnect.remember_room(membership)
            }
            Some(_) => {}
            None => self.reconnect.forget_room(),
        }
    }

    // ===== Event loop =====

    /// Wait for the next link event
    pub async fn next_event(&mut self) -> LinkEvent {
        loop {
            let step = tokio::select! {
                result = attempt_done(&mut self.attempt) => Step::AttemptDone(result),
                incoming = next_incoming(&mut self.link) => Step::Incoming(incoming),
                _ = retry_due(self.retry_at) => Step::RetryDue,
                _ = heartbeat_due(&mut self.heartbeat) => Step::Heartbeat,
            };

            if let Some(event) = self.apply(step) {
                return event;
            }
        }
    }

    fn apply(&mut self, step: Step) -> Option<LinkEvent> {
        match step {
            Step::AttemptDone(Ok(link)) => Some(self.on_open(link)),
            Step::AttemptDone(Err(e)) => {
                tracing::warn!("⚠️ Connect attempt failed: {}", e);
                self.attempt = None;
                self.phase = LinkPhase::Idle;
                for waiter in self.waiters.drain(..) {
                    let _ = waiter.send(Err(ClientError::ConnectFailed(e.to_string())));
                }
                Some(self.on_close(None))
            }
            Step::Incoming(Some(Incoming::Text(text))) => self.on_text(&text),
            Step::Incoming(Some(Incoming::Closed { code })) => {
                tracing::info!("🔌 Link closed ({:?})", code);
                self.drop_link();
                Some(self.on_close(code))
            }
            Step::Incoming(None) => {
                self.drop_link();
                Some(self.on_close(None))
            }
            Step::RetryDue => {
                self.retry_at = None;
                tracing::info!(
                    "🔄 Reconnect attempt {}/{}",
                    self.reconnect.attempt_count(),
                    self.reconnect.max_attempts()
                );
                self.start_attempt();
                None
            }
            Step::Heartbeat => {
                self.send(&Message::Ping);
                None
            }
        }
    }

    fn on_open(&mut self, link: Link) -> LinkEvent {
        self.attempt = None;
        self.link = Some(link);
        self.phase = LinkPhase::Open;

        let period = self.config.heartbeat_interval;
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.heartbeat = Some(heartbeat);

        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(Ok(()));
        }

        let rejoin = self.reconnect.on_open();
        let rejoined = match rejoin {
            Some(message) => {
                tracing::info!("🔁 Rejoining room after reconnect");
                self.send(&message)
            }
            None => false,
        };
        LinkEvent::Opened { rejoined }
    }

    fn on_text(&mut self, text: &str) -> Option<LinkEvent> {
        match Message::decode(text) {
            Ok(Message::Ping) => {
                self.send(&Message::Pong);
                None
            }
            Ok(Message::Pong) => {
                tracing::trace!("💓 pong");
                None
            }
            Ok(message) => {
                tracing::debug!("📥 {}", message.tag());
                Some(LinkEvent::Frame(message))
            }
            Err(e) => {
                tracing::warn!("⚠️ Dropping malformed frame: {}", e);
                None
            }
        }
    }

    fn on_close(&mut self, code: Option<u16>) -> LinkEvent {
        match self.reconnect.on_close(code) {
            CloseDecision::Stay => LinkEvent::Closed { code },
            CloseDecision::Retry { attempt, delay } => {
                tracing::info!("⏳ Reconnecting in {:?} (attempt {})", delay, attempt);
                self.retry_at = Some(Instant::now() + delay);
                LinkEvent::ReconnectScheduled { attempt, delay }
            }
            CloseDecision::GiveUp => LinkEvent::GaveUp,
        }
    }

    fn start_attempt(&mut self) {
        self.phase = LinkPhase::Connecting;
        let transport = Arc::clone(&self.transport);
        let url = self.config.url();
        let timeout = self.config.connect_timeout;
        tracing::info!("🔌 Connecting to {}", url);

        self.attempt = Some(Box::pin(async move {
            match tokio::time::timeout(timeout, transport.open(&url)).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Timeout(timeout)),
            }
        }));
    }

    fn drop_link(&mut self) {
        self.link = None;
        self.heartbeat = None;
        self.phase = LinkPhase::Closed;
    }
}

async fn attempt_done(attempt: &mut Option<PendingAttempt>) -> Result<Link> {
    match attempt {
        Some(fut) => fut.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn next_incoming(link: &mut Option<Link>) -> Option<Incoming> {
    match link {
        Some(link) => link.rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn retry_due(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn heartbeat_due(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
