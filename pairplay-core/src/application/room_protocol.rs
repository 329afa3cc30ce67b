use crate::domain::{
    ActiveGame, GameUpdate, Message, PlayerId, PlayerInfo, RoomCode, RoomMembership, Scores,
    Session,
};
use serde::{Deserialize, Serialize};

/// Reason attached to a player-left that was not an explicit leave
pub const DISCONNECTED_REASON: &str = "disconnected";

/// Room lifecycle notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomEvent {
    Created {
        room_code: RoomCode,
        player_id: PlayerId,
    },
    JoinAcknowledged {
        room_code: RoomCode,
        player_id: PlayerId,
    },
    RosterChanged {
        players: Vec<PlayerInfo>,
    },
    Rejoined {
        room_code: RoomCode,
        player_id: PlayerId,
    },
    /// Entered through a matched call
    Matched {
        room_code: RoomCode,
        is_host: bool,
    },
    Error {
        message: String,
    },
    PlayerLeft {
        player_id: Option<PlayerId>,
        player_name: Option<String>,
        reason: Option<String>,
        /// True for the terminal notice about this client itself
        local: bool,
    },
    Left {
        room_code: RoomCode,
    },
}

/// Game flow notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    AgeSelected { age: u8 },
    Started(ActiveGame),
    Update(GameUpdate),
    Ended { scores: Option<Scores> },
}

/// Where an inbound frame goes after the handler has applied it
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Room(RoomEvent),
    /// Forwarded to the call signaling channel
    Call(Message),
    /// Opaque media signaling for the negotiator
    Rtc(Message),
    /// For the active sync adapter
    Game(GameEvent),
}

#[derive(Debug, Clone, PartialEq)]
struct Profile {
    display_name: String,
    avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum PendingRequest {
    Create,
    Join(RoomCode),
    Rejoin(RoomCode),
}

/// Applies relay frames to the [`Session`] and routes them
#[derive(Debug, Default)]
pub struct RoomProtocolHandler {
    session: Session,
    profile: Option<Profile>,
    pending: Option<PendingRequest>,
}

impl RoomProtocolHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Room to rejoin after a reconnect
    pub fn membership(&self) -> Option<RoomMembership> {
        let room_code = self.session.room_code()?.clone();
        let profile = self.profile.as_ref()?;
        Some(
            RoomMembership::new(room_code, profile.display_name.clone())
                .with_avatar(profile.avatar.clone()),
        )
    }

    // ===== Outbound requests =====

    pub fn create_room(&mut self, player_name: impl Into<String>, avatar: Option<String>) -> Message {
        let player_name = player_name.into();
        self.remember_profile(&player_name, &avatar);
        self.pending = Some(PendingRequest::Create);
        Message::RoomCreate {
            player_name,
            avatar,
        }
    }

    pub fn join_room(
        &mut self,
        room_code: RoomCode,
        player_name: impl Into<String>,
        avatar: Option<String>,
    ) -> Message {
        let player_name = player_name.into();
        self.remember_profile(&player_name, &avatar);
        self.pending = Some(PendingRequest::Join(room_code.clone()));
        Message::RoomJoin {
            room_code,
            player_name,
            avatar,
        }
    }

    /// Leave synchronously: room state is gone before the frame is sent
    pub fn leave(&mut self) -> Message {
        if let Some(code) = self.session.room_code() {
            tracing::info!("👋 Leaving room {}", code);
        }
        self.session.clear_room();
        self.pending = None;
        Message::RoomLeave
    }

    pub fn select_age(&self, age: u8) -> Message {
        Message::AgeSelect { age }
    }

    pub fn select_game(&self, game: impl Into<String>, age: u8, total_questions: u32) -> Message {
        Message::GameSelect {
            game: game.into(),
            age,
            total_questions,
        }
    }

    // ===== Inbound =====

    /// The link sent `room:rejoin` on its own after reconnecting
    pub fn on_rejoin_sent(&mut self) {
        if let Some(code) = self.session.room_code() {
            self.pending = Some(PendingRequest::Rejoin(code.clone()));
        }
    }

    /// Enter the room assigned by a matched call; the initiator hosts
    pub fn on_call_matched(
        &mut self,
        room_code: RoomCode,
        initiated: bool,
        display_name: impl Into<String>,
    ) -> Dispatch {
        tracing::info!("📞 Call matched into room {} (host: {})", room_code, initiated);
        let display_name = display_name.into();
        let avatar = self.profile.as_ref().and_then(|p| p.avatar.clone());
        self.remember_profile(&display_name, &avatar);
        self.pending = None;
        self.session.clear_room();
        self.session.enter_matched_room(room_code.clone(), initiated);
        Dispatch::Room(RoomEvent::Matched {
            room_code,
            is_host: initiated,
        })
    }

    /// Reconnection exhausted: drop the room and report this client as gone
    pub fn on_connection_lost(&mut self) -> Dispatch {
        let player_id = self.session.player_id().cloned();
        let player_name = self.profile.as_ref().map(|p| p.display_name.clone());
        self.session.clear_room();
        self.pending = None;
        Dispatch::Room(RoomEvent::PlayerLeft {
            player_id,
            player_name,
            reason: Some(DISCONNECTED_REASON.to_string()),
            local: true,
        })
    }

    /// Apply one inbound frame; yields at most one dispatch
    pub fn handle(&mut self, message: Message) -> Option<Dispatch> {
        match message {
            Message::Ping | Message::Pong => None,

            Message::RoomCreated {
                room_code,
                player_id,
                players,
            } => {
                if self.pending != Some(PendingRequest::Create) {
                    tracing::warn!("⚠️ Ignoring unsolicited room:created for {}", room_code);
                    return None;
                }
                self.pending = None;
                tracing::info!("🏠 Created room {} as {}", room_code, player_id);
                self.session.clear_room();
                self.session
                    .enter_room(room_code.clone(), player_id.clone(), true);
                if let Some(players) = players {
                    self.session.set_roster(players);
                }
                Some(Dispatch::Room(RoomEvent::Created {
                    room_code,
                    player_id,
                }))
            }

            Message::RoomJoinedAck {
                room_code,
                player_id,
            } => {
                if self.pending != Some(PendingRequest::Join(room_code.clone())) {
                    tracing::warn!("⚠️ Ignoring unsolicited room:joined-ack for {}", room_code);
                    return None;
                }
                self.pending = None;
                tracing::info!("🚪 Joined room {} as {}", room_code, player_id);
                self.session.clear_room();
                self.session
                    .enter_room(room_code.clone(), player_id.clone(), false);
                Some(Dispatch::Room(RoomEvent::JoinAcknowledged {
                    room_code,
                    player_id,
                }))
            }

            Message::RoomJoined { room_code, players } => {
                if !self.session.accepts_room(room_code.as_ref()) {
                    tracing::debug!("Ignoring room:joined for another room");
                    return None;
                }
                self.session.set_roster(players.clone());
                Some(Dispatch::Room(RoomEvent::RosterChanged { players }))
            }

            Message::RoomRejoined {
                room_code,
                player_id,
                players,
            } => {
                if !self.session.accepts_room(Some(&room_code)) {
                    tracing::debug!("Ignoring room:rejoined for {}", room_code);
                    return None;
                }
                tracing::info!("🔁 Rejoined room {} as {}", room_code, player_id);
                if matches!(self.pending, Some(PendingRequest::Rejoin(_))) {
                    self.pending = None;
                }
                self.session.restore(room_code.clone(), player_id.clone());
                if let Some(players) = players {
                    self.session.set_roster(players);
                }
                Some(Dispatch::Room(RoomEvent::Rejoined {
                    room_code,
                    player_id,
                }))
            }

            Message::RoomError { message } => {
                tracing::warn!("❌ Room error: {}", message);
                if let Some(PendingRequest::Rejoin(code)) = self.pending.take() {
                    tracing::info!("🚪 Room {} is gone, dropping it", code);
                    self.session.clear_room();
                }
                Some(Dispatch::Room(RoomEvent::Error { message }))
            }

            Message::RoomPlayerLeft {
                player_id,
                player_name,
                reason,
                room_code,
                players,
            } => {
                if !self.session.accepts_room(room_code.as_ref()) {
                    tracing::debug!("Ignoring room:player-left outside current room");
                    return None;
                }
                let removed = self.session.remove_player(&player_id);
                if let Some(players) = players {
                    self.session.set_roster(players);
                }
                let player_name = player_name.or(removed.map(|p| p.display_name));
                tracing::info!(
                    "🚶 Player {} left ({})",
                    player_id,
                    reason.as_deref().unwrap_or("leave")
                );
                Some(Dispatch::Room(RoomEvent::PlayerLeft {
                    player_id: Some(player_id),
                    player_name,
                    reason,
                    local: false,
                }))
            }

            Message::AgeSelected { age } => {
                if !self.session.in_room() {
                    return None;
                }
                self.session.select_age(age);
                Some(Dispatch::Game(GameEvent::AgeSelected { age }))
            }

            Message::GameStart {
                game,
                age,
                total_questions,
                seed,
            } => {
                if !self.session.in_room() {
                    return None;
                }
                tracing::info!("🎮 Starting {} ({} questions)", game, total_questions);
                let active = ActiveGame::new(game, age, total_questions, seed);
                self.session.start_game(active.clone());
                Some(Dispatch::Game(GameEvent::Started(active)))
            }

            Message::GameUpdate(update) => {
                if !self.session.in_room() {
                    return None;
                }
                if let Some(scores) = &update.scores {
                    self.session.update_scores(scores.clone());
                }
                Some(Dispatch::Game(GameEvent::Update(update)))
            }

            Message::GameEnd { scores } => {
                if !self.session.in_room() {
                    return None;
                }
                tracing::info!("🏁 Game ended");
                self.session.end_game(scores.clone());
                Some(Dispatch::Game(GameEvent::Ended { scores }))
            }

            message if message.is_call() => Some(Dispatch::Call(message)),
            message if message.is_rtc() => {
                if !self.session.in_room() {
                    tracing::debug!("Ignoring {} outside a room", message.tag());
                    return None;
                }
                Some(Dispatch::Rtc(message))
            }

            Message::Unknown => {
                tracing::debug!("Ignoring frame with unknown type");
                None
            }

            other => {
                tracing::warn!("⚠️ Ignoring client-bound {} frame", other.tag());
                None
            }
        }
    }

    fn remember_profile(&mut self, display_name: &str, avatar: &Option<String>) {
        self.profile = Some(Profile {
            display_name: display_name.to_string(),
            avatar: avatar.clone(),
        });
    }
}
