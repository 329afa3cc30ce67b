use crate::domain::{Message, RoomCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity-based calling state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CallState {
    #[default]
    Unregistered,
    Available,
    Dialing { target: String },
    Ringing { target: String },
    Waiting { target: String },
    Incoming { from: String, from_name: Option<String> },
    Matched { room_code: RoomCode },
}

impl CallState {
    fn name(&self) -> &'static str {
        match self {
            CallState::Unregistered => "unregistered",
            CallState::Available => "available",
            CallState::Dialing { .. } => "dialing",
            CallState::Ringing { .. } => "ringing",
            CallState::Waiting { .. } => "waiting",
            CallState::Incoming { .. } => "incoming",
            CallState::Matched { .. } => "matched",
        }
    }

    fn outgoing_target(&self) -> Option<&str> {
        match self {
            CallState::Dialing { target }
            | CallState::Ringing { target }
            | CallState::Waiting { target } => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Call outcomes surfaced to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallEvent {
    Ringing { target: String },
    Waiting { target: String },
    Incoming { from: String, from_name: Option<String> },
    Matched { room_code: RoomCode, initiated: bool },
    Declined,
    Cancelled,
    TimedOut,
}

/// Operation attempted in a state that does not allow it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("Not registered for calls")]
    NotRegistered,

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },
}

/// Client half of the relay's call matching
#[derive(Debug, Default)]
pub struct CallSignalingChannel {
    state: CallState,
    character: Option<String>,
    player_name: Option<String>,
}

impl CallSignalingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CallState {
        &self.state
    }

    pub fn character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// Advertise this client as reachable under `character`
    pub fn register(
        &mut self,
        character: impl Into<String>,
        player_name: impl Into<String>,
    ) -> Result<Message, CallError> {
        match self.state {
            CallState::Unregistered | CallState::Available | CallState::Matched { .. } => {}
            _ => return Err(self.invalid("register")),
        }
        let character = character.into();
        let player_name = player_name.into();
        tracing::info!("📇 Registering for calls as {}", character);
        self.character = Some(character.clone());
        self.player_name = Some(player_name.clone());
        self.state = CallState::Available;
        Ok(Message::CallRegister {
            character,
            player_name,
        })
    }

    pub fn initiate(&mut self, target: impl Into<String>) -> Result<Message, CallError> {
        match self.state {
            CallState::Unregistered => return Err(CallError::NotRegistered),
            CallState::Available => {}
            _ => return Err(self.invalid("initiate")),
        }
        let target = target.into();
        tracing::info!("📞 Calling {}", target);
        self.state = CallState::Dialing {
            target: target.clone(),
        };
        Ok(Message::CallInitiate {
            target_character: target,
        })
    }

    pub fn accept(&mut self) -> Result<Message, CallError> {
        match self.state {
            CallState::Incoming { .. } => Ok(Message::CallAccept),
            _ => Err(self.invalid("accept")),
        }
    }

    pub fn decline(&mut self) -> Result<Message, CallError> {
        match self.state {
            CallState::Incoming { .. } => {
                self.state = CallState::Available;
                Ok(Message::CallDecline)
            }
            _ => Err(self.invalid("decline")),
        }
    }

    pub fn cancel(&mut self) -> Result<Message, CallError> {
        match self.state.outgoing_target() {
            Some(_) => {
                self.state = CallState::Available;
                Ok(Message::CallCancel)
            }
            None => Err(self.invalid("cancel")),
        }
    }

    /// Call is over; available for the next one
    pub fn finish(&mut self) {
        if matches!(self.state, CallState::Matched { .. }) {
            self.state = CallState::Available;
        }
    }

    /// Apply an inbound `call:*` frame
    pub fn handle(&mut self, message: &Message) -> Option<CallEvent> {
        match message {
            Message::CallRinging { target_character } => {
                let target = self.resolve_target(target_character)?;
                self.state = CallState::Ringing {
                    target: target.clone(),
                };
                Some(CallEvent::Ringing { target })
            }
            Message::CallWaiting { target_character } => {
                let target = self.resolve_target(target_character)?;
                self.state = CallState::Waiting {
                    target: target.clone(),
                };
                Some(CallEvent::Waiting { target })
            }
            Message::CallIncoming {
                from_character,
                from_name,
            } => {
                if self.state != CallState::Available {
                    tracing::debug!("Ignoring call:incoming while {}", self.state);
                    return None;
                }
                tracing::info!("🔔 Incoming call from {}", from_character);
                self.state = CallState::Incoming {
                    from: from_character.clone(),
                    from_name: from_name.clone(),
                };
                Some(CallEvent::Incoming {
                    from: from_character.clone(),
                    from_name: from_name.clone(),
                })
            }
            Message::CallMatched { room_code } => {
                let initiated = match &self.state {
                    state if state.outgoing_target().is_some() => true,
                    CallState::Incoming { .. } => false,
                    state => {
                        tracing::debug!("Ignoring call:matched while {}", state);
                        return None;
                    }
                };
                self.state = CallState::Matched {
                    room_code: room_code.clone(),
                };
                Some(CallEvent::Matched {
                    room_code: room_code.clone(),
                    initiated,
                })
            }
            Message::CallDeclined => {
                self.state.outgoing_target()?;
                self.state = CallState::Available;
                Some(CallEvent::Declined)
            }
            Message::CallCancelled => {
                if !matches!(self.state, CallState::Incoming { .. }) {
                    return None;
                }
                self.state = CallState::Available;
                Some(CallEvent::Cancelled)
            }
            Message::CallTimeout => {
                let pending = self.state.outgoing_target().is_some()
                    || matches!(self.state, CallState::Incoming { .. });
                if !pending {
                    return None;
                }
                self.state = CallState::Available;
                Some(CallEvent::TimedOut)
            }
            _ => None,
        }
    }

    fn resolve_target(&self, from_frame: &Option<String>) -> Option<String> {
        let current = self.state.outgoing_target()?;
        Some(from_frame.clone().unwrap_or_else(|| current.to_string()))
    }

    fn invalid(&self, operation: &'static str) -> CallError {
        CallError::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }
}
