use crate::domain::{Message, RoomCode};
use std::time::Duration;

/// Close code for a normal closure; never followed by a reconnect
pub const NORMAL_CLOSURE: u16 = 1000;

/// Exponential backoff policy for reconnect attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry
    pub base: Duration,
    /// Growth factor per attempt
    pub factor: f64,
    /// Upper bound for any delay
    pub cap: Duration,
    /// Attempts allowed before giving up
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            factor: 1.5,
            cap: Duration::from_millis(15_000),
            max_attempts: 15,
        }
    }
}

impl ReconnectPolicy {
    pub fn with_base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_cap(mut self, cap: Duration) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before attempt `attempt` (1-based): `min(base * factor^(attempt-1), cap)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let millis = self.base.as_millis() as f64 * self.factor.powi(exponent);
        let capped = millis.min(self.cap.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }
}

/// Room the client should return to after a reconnect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMembership {
    pub room_code: RoomCode,
    pub display_name: String,
    pub avatar: Option<String>,
}

impl RoomMembership {
    pub fn new(room_code: RoomCode, display_name: impl Into<String>) -> Self {
        Self {
            room_code,
            display_name: display_name.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: Option<String>) -> Self {
        self.avatar = avatar;
        self
    }

    /// Frame that puts this client back into the room
    pub fn rejoin_message(&self) -> Message {
        Message::RoomRejoin {
            room_code: self.room_code.clone(),
            player_name: self.display_name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// What to do after the link closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Intentional or normal closure
    Stay,
    /// Schedule attempt `attempt` after `delay`
    Retry { attempt: u32, delay: Duration },
    /// Attempts exhausted; emitted once
    GiveUp,
}

/// Reconnect bookkeeping that survives socket teardown
#[derive(Debug, Clone)]
pub struct ReconnectState {
    policy: ReconnectPolicy,
    attempt_count: u32,
    intentional_disconnect: bool,
    exhausted: bool,
    requested: bool,
    membership: Option<RoomMembership>,
}

impl ReconnectState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempt_count: 0,
            intentional_disconnect: false,
            exhausted: false,
            requested: false,
            membership: None,
        }
    }

    // ===== Getters =====

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    pub fn is_intentional(&self) -> bool {
        self.intentional_disconnect
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn membership(&self) -> Option<&RoomMembership> {
        self.membership.as_ref()
    }

    // ===== Transitions =====

    /// Explicit connect request from the caller
    pub fn begin_connect(&mut self) {
        self.intentional_disconnect = false;
        self.requested = true;
        if self.exhausted {
            self.exhausted = false;
            self.attempt_count = 0;
        }
    }

    /// Explicit disconnect: no retries and no remembered room
    pub fn mark_intentional(&mut self) {
        self.intentional_disconnect = true;
        self.requested = false;
        self.attempt_count = 0;
        self.membership = None;
    }

    pub fn remember_room(&mut self, membership: RoomMembership) {
        tracing::debug!("💾 Remembering room {}", membership.room_code);
        self.membership = Some(membership);
    }

    pub fn forget_room(&mut self) {
        self.membership = None;
    }

    /// Link closed with `code` (None when the attempt never opened)
    pub fn on_close(&mut self, code: Option<u16>) -> CloseDecision {
        if self.intentional_disconnect || self.exhausted {
            return CloseDecision::Stay;
        }
        if code == Some(NORMAL_CLOSURE) {
            return CloseDecision::Stay;
        }

        if self.attempt_count >= self.policy.max_attempts {
            self.exhausted = true;
            self.requested = false;
            self.membership = None;
            tracing::warn!(
                "🛑 Giving up after {} reconnect attempts",
                self.attempt_count
            );
            return CloseDecision::GiveUp;
        }

        self.attempt_count += 1;
        let delay = self.policy.delay_for(self.attempt_count);
        CloseDecision::Retry {
            attempt: self.attempt_count,
            delay,
        }
    }

    /// Link opened; returns the rejoin frame if a room is remembered
    pub fn on_open(&mut self) -> Option<Message> {
        self.attempt_count = 0;
        self.membership.as_ref().map(RoomMembership::rejoin_message)
    }

    /// Whether a foreground transition should trigger an immediate attempt
    pub fn should_resume(&self) -> bool {
        self.requested && !self.intentional_disconnect && !self.exhausted
    }
}

impl Default for ReconnectState {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}
