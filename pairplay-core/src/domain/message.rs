use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Short code identifying a room on the relay (e.g. "AB12")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Relay-assigned player identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Roster entry as broadcast by the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    #[serde(alias = "id")]
    pub player_id: PlayerId,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl PlayerInfo {
    pub fn new(player_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            player_id: PlayerId::new(player_id),
            display_name: display_name.into(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// Per-player scores carried by game updates
pub type Scores = BTreeMap<PlayerId, u32>;

/// Outbound game action (local input turned into a relay message)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAction {
    pub action_type: String,
    /// Question / round index the action belongs to
    pub round: u32,
    /// Game-specific fields, carried opaquely
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl GameAction {
    pub fn new(action_type: impl Into<String>, round: u32) -> Self {
        Self {
            action_type: action_type.into(),
            round,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Relayed resolution of a game action (echoed to both participants)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    pub action_type: String,
    pub player_id: PlayerId,
    pub round: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Scores>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl GameUpdate {
    /// Build the update the relay would echo for `action` sent by `player_id`
    pub fn echo_of(action: &GameAction, player_id: PlayerId) -> Self {
        Self {
            action_type: action.action_type.clone(),
            player_id,
            round: action.round,
            scores: None,
            fields: action.fields.clone(),
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Every frame exchanged with the relay. The `type` tag is the only dispatch key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Message {
    // ===== Heartbeat =====
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong")]
    Pong,

    // ===== Room lifecycle =====
    #[serde(rename = "room:create")]
    RoomCreate {
        player_name: String,
        #[serde(default)]
        avatar: Option<String>,
    },
    #[serde(rename = "room:created")]
    RoomCreated {
        room_code: RoomCode,
        player_id: PlayerId,
        #[serde(default)]
        players: Option<Vec<PlayerInfo>>,
    },
    #[serde(rename = "room:join")]
    RoomJoin {
        room_code: RoomCode,
        player_name: String,
        #[serde(default)]
        avatar: Option<String>,
    },
    #[serde(rename = "room:joined-ack")]
    RoomJoinedAck {
        room_code: RoomCode,
        player_id: PlayerId,
    },
    #[serde(rename = "room:joined")]
    RoomJoined {
        #[serde(default)]
        room_code: Option<RoomCode>,
        players: Vec<PlayerInfo>,
    },
    #[serde(rename = "room:rejoin")]
    RoomRejoin {
        room_code: RoomCode,
        player_name: String,
        #[serde(default)]
        avatar: Option<String>,
    },
    #[serde(rename = "room:rejoined")]
    RoomRejoined {
        room_code: RoomCode,
        player_id: PlayerId,
        #[serde(default)]
        players: Option<Vec<PlayerInfo>>,
    },
    #[serde(rename = "room:leave")]
    RoomLeave,
    #[serde(rename = "room:error")]
    RoomError { message: String },
    #[serde(rename = "room:player-left")]
    RoomPlayerLeft {
        player_id: PlayerId,
        #[serde(default)]
        player_name: Option<String>,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        room_code: Option<RoomCode>,
        #[serde(default)]
        players: Option<Vec<PlayerInfo>>,
    },

    // ===== Identity-based calling =====
    #[serde(rename = "call:register")]
    CallRegister {
        character: String,
        player_name: String,
    },
    #[serde(rename = "call:initiate")]
    CallInitiate { target_character: String },
    #[serde(rename = "call:accept")]
    CallAccept,
    #[serde(rename = "call:decline")]
    CallDecline,
    #[serde(rename = "call:cancel")]
    CallCancel,
    #[serde(rename = "call:ringing")]
    CallRinging {
        #[serde(default)]
        target_character: Option<String>,
    },
    #[serde(rename = "call:waiting")]
    CallWaiting {
        #[serde(default)]
        target_character: Option<String>,
    },
    #[serde(rename = "call:incoming")]
    CallIncoming {
        from_character: String,
        #[serde(default)]
        from_name: Option<String>,
    },
    #[serde(rename = "call:matched")]
    CallMatched { room_code: RoomCode },
    #[serde(rename = "call:declined")]
    CallDeclined,
    #[serde(rename = "call:cancelled")]
    CallCancelled,
    #[serde(rename = "call:timeout")]
    CallTimeout,

    // ===== Game flow =====
    #[serde(rename = "age:select")]
    AgeSelect { age: u8 },
    #[serde(rename = "age:selected")]
    AgeSelected { age: u8 },
    #[serde(rename = "game:select")]
    GameSelect {
        game: String,
        age: u8,
        total_questions: u32,
    },
    #[serde(rename = "game:start")]
    GameStart {
        game: String,
        age: u8,
        total_questions: u32,
        #[serde(default)]
        seed: Option<u64>,
    },
    #[serde(rename = "game:action")]
    GameAction(GameAction),
    #[serde(rename = "game:update")]
    GameUpdate(GameUpdate),
    #[serde(rename = "game:end")]
    GameEnd {
        #[serde(default)]
        scores: Option<Scores>,
    },

    // ===== Opaque media signaling relay =====
    #[serde(rename = "rtc:offer")]
    RtcOffer { data: Value },
    #[serde(rename = "rtc:answer")]
    RtcAnswer { data: Value },
    #[serde(rename = "rtc:ice")]
    RtcIce { data: Value },

    /// Any tag this client does not know (forward compatibility)
    #[serde(other)]
    Unknown,
}

/// Errors raised while decoding or encoding frames
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Frame has no type tag")]
    MissingType,
}

impl Message {
    /// Decode a text frame.
    ///
    /// Unknown tags decode to [`Message::Unknown`]; a known tag with missing or
    /// mistyped fields is a [`ProtocolError::Malformed`].
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.get("type").is_some_and(Value::is_string) {
            return Err(ProtocolError::MissingType);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Encode to a JSON text frame
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wire tag of this message
    pub fn tag(&self) -> &'static str {
        match self {
            Message::Ping => "ping",
            Message::Pong => "pong",
            Message::RoomCreate { .. } => "room:create",
            Message::RoomCreated { .. } => "room:created",
            Message::RoomJoin { .. } => "room:join",
            Message::RoomJoinedAck { .. } => "room:joined-ack",
            Message::RoomJoined { .. } => "room:joined",
            Message::RoomRejoin { .. } => "room:rejoin",
            Message::RoomRejoined { .. } => "room:rejoined",
            Message::RoomLeave => "room:leave",
            Message::RoomError { .. } => "room:error",
            Message::RoomPlayerLeft { .. } => "room:player-left",
            Message::CallRegister { .. } => "call:register",
            Message::CallInitiate { .. } => "call:initiate",
            Message::CallAccept => "call:accept",
            Message::CallDecline => "call:decline",
            Message::CallCancel => "call:cancel",
            Message::CallRinging { .. } => "call:ringing",
            Message::CallWaiting { .. } => "call:waiting",
            Message::CallIncoming { .. } => "call:incoming",
            Message::CallMatched { .. } => "call:matched",
            Message::CallDeclined => "call:declined",
            Message::CallCancelled => "call:cancelled",
            Message::CallTimeout => "call:timeout",
            Message::AgeSelect { .. } => "age:select",
            Message::AgeSelected { .. } => "age:selected",
            Message::GameSelect { .. } => "game:select",
            Message::GameStart { .. } => "game:start",
            Message::GameAction(_) => "game:action",
            Message::GameUpdate(_) => "game:update",
            Message::GameEnd { .. } => "game:end",
            Message::RtcOffer { .. } => "rtc:offer",
            Message::RtcAnswer { .. } => "rtc:answer",
            Message::RtcIce { .. } => "rtc:ice",
            Message::Unknown => "unknown",
        }
    }

    /// Heartbeat frames never reach the application dispatcher
    pub fn is_heartbeat(&self) -> bool {
        matches!(self, Message::Ping | Message::Pong)
    }

    pub fn is_call(&self) -> bool {
        self.tag().starts_with("call:")
    }

    pub fn is_rtc(&self) -> bool {
        matches!(
            self,
            Message::RtcOffer { .. } | Message::RtcAnswer { .. } | Message::RtcIce { .. }
        )
    }
}
