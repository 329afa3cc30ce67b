use crate::domain::{PlayerId, PlayerInfo, RoomCode, Scores};
use serde::{Deserialize, Serialize};

/// Transport link phase as seen by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPhase {
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Mini-game currently running in the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveGame {
    pub game: String,
    pub age: u8,
    pub total_questions: u32,
    pub seed: Option<u64>,
    pub scores: Scores,
    pub finished: bool,
}

impl ActiveGame {
    pub fn new(game: impl Into<String>, age: u8, total_questions: u32, seed: Option<u64>) -> Self {
        Self {
            game: game.into(),
            age,
            total_questions,
            seed,
            scores: Scores::new(),
            finished: false,
        }
    }
}

/// Client-side view of the shared session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    player_id: Option<PlayerId>,
    room_code: Option<RoomCode>,
    roster: Vec<PlayerInfo>,
    is_host: bool,
    link: LinkPhase,
    selected_age: Option<u8>,
    active_game: Option<ActiveGame>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Getters =====

    pub fn player_id(&self) -> Option<&PlayerId> {
        self.player_id.as_ref()
    }

    pub fn room_code(&self) -> Option<&RoomCode> {
        self.room_code.as_ref()
    }

    pub fn roster(&self) -> &[PlayerInfo] {
        &self.roster
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn link(&self) -> LinkPhase {
        self.link
    }

    pub fn selected_age(&self) -> Option<u8> {
        self.selected_age
    }

    pub fn active_game(&self) -> Option<&ActiveGame> {
        self.active_game.as_ref()
    }

    pub fn in_room(&self) -> bool {
        self.room_code.is_some()
    }

    /// The other participant, if present in the roster
    pub fn partner(&self) -> Option<&PlayerInfo> {
        let me = self.player_id.as_ref()?;
        self.roster.iter().find(|p| &p.player_id != me)
    }

    /// Whether a room-scoped frame tagged with `code` belongs to this room
    pub fn accepts_room(&self, code: Option<&RoomCode>) -> bool {
        match (&self.room_code, code) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(current), Some(code)) => current == code,
        }
    }

    // ===== Mutations =====

    pub fn set_link(&mut self, link: LinkPhase) {
        self.link = link;
    }

    pub fn enter_room(&mut self, room_code: RoomCode, player_id: PlayerId, is_host: bool) {
        self.room_code = Some(room_code);
        self.player_id = Some(player_id);
        self.is_host = is_host;
    }

    /// Room assigned by a matched call; identity arrives later
    pub fn enter_matched_room(&mut self, room_code: RoomCode, is_host: bool) {
        self.room_code = Some(room_code);
        self.is_host = is_host;
    }

    /// Re-establish identity after a rejoin, keeping the roster
    pub fn restore(&mut self, room_code: RoomCode, player_id: PlayerId) {
        self.room_code = Some(room_code);
        self.player_id = Some(player_id);
    }

    pub fn set_roster(&mut self, roster: Vec<PlayerInfo>) {
        self.roster = roster;
    }

    pub fn remove_player(&mut self, player_id: &PlayerId) -> Option<PlayerInfo> {
        let index = self.roster.iter().position(|p| &p.player_id == player_id)?;
        Some(self.roster.remove(index))
    }

    pub fn select_age(&mut self, age: u8) {
        self.selected_age = Some(age);
    }

    pub fn start_game(&mut self, game: ActiveGame) {
        self.selected_age = Some(game.age);
        self.active_game = Some(game);
    }

    pub fn update_scores(&mut self, scores: Scores) {
        if let Some(game) = self.active_game.as_mut() {
            game.scores = scores;
        }
    }

    pub fn end_game(&mut self, scores: Option<Scores>) {
        if let Some(game) = self.active_game.as_mut() {
            if let Some(scores) = scores {
                game.scores = scores;
            }
            game.finished = true;
        }
    }

    /// Drop all room-scoped state; link phase and identity survive
    pub fn clear_room(&mut self) {
        self.room_code = None;
        self.roster.clear();
        self.is_host = false;
        self.selected_age = None;
        self.active_game = None;
    }
}
