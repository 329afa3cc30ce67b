use crate::domain::{GameAction, GameRoundLock, GameUpdate};

/// Contract a mini-game implements to be driven through relayed actions.
///
/// The game never mutates itself from local input. It only derives an action,
/// and state changes arrive through [`SyncableGame::apply_update`] for both
/// participants alike.
pub trait SyncableGame {
    /// Raw local input (a tapped answer, a batch of stroke points, ...)
    type Input;

    fn game_id(&self) -> &str;

    /// Index of the round currently shown
    fn current_round(&self) -> u32;

    /// Turn local input into the action to relay. Must not mutate the game.
    fn derive_action(&self, input: Self::Input) -> GameAction;

    /// Apply a relayed update to the game state
    fn apply_update(&mut self, update: &GameUpdate);

    /// Whether `update` resolves the current round for this client
    fn resolves_round(&self, update: &GameUpdate) -> bool;

    /// Games with free-form continuous input opt out of the round lock
    fn uses_round_lock(&self) -> bool {
        true
    }

    fn is_finished(&self) -> bool {
        false
    }
}

/// Errors raised for local input the adapter refuses
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("Round {round} is locked until it resolves")]
    RoundLocked { round: u32 },

    #[error("Game {0} is finished")]
    Finished(String),
}

/// Outcome of applying a relayed update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteApply {
    /// Applied; `resolved` when it released the round lock
    Applied { resolved: bool },
    /// For a round this client already left behind
    Stale,
    /// For a round ahead of this client; applied and the lock cleared
    Desync { local_round: u32, remote_round: u32 },
}

/// Drives one [`SyncableGame`] through the relay with a round lock
#[derive(Debug)]
pub struct ActionSyncAdapter<G> {
    game: G,
    lock: GameRoundLock,
    desyncs: u32,
}

impl<G: SyncableGame> ActionSyncAdapter<G> {
    pub fn new(game: G) -> Self {
        Self {
            game,
            lock: GameRoundLock::new(),
            desyncs: 0,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn lock(&self) -> &GameRoundLock {
        &self.lock
    }

    /// Number of updates that arrived ahead of the local round
    pub fn desync_count(&self) -> u32 {
        self.desyncs
    }

    pub fn into_game(self) -> G {
        self.game
    }

    /// Derive the outbound action for `input`, locking its round
    pub fn on_local_action(&mut self, input: G::Input) -> Result<GameAction, SyncError> {
        if self.game.is_finished() {
            return Err(SyncError::Finished(self.game.game_id().to_string()));
        }
        if self.game.uses_round_lock() && self.lock.is_locked() {
            tracing::debug!(
                "🔒 Dropping local input for {}: round {} locked",
                self.game.game_id(),
                self.lock.round()
            );
            return Err(SyncError::RoundLocked {
                round: self.lock.round(),
            });
        }

        let action = self.game.derive_action(input);
        if self.game.uses_round_lock() {
            self.lock.try_acquire(action.round);
        }
        Ok(action)
    }

    /// Apply a relayed update. Local echoes and partner actions share this path.
    pub fn on_remote_action(&mut self, update: &GameUpdate) -> RemoteApply {
        let local_round = self.game.current_round();

        if update.round < local_round {
            tracing::debug!(
                "Ignoring stale {} for round {} (at {})",
                update.action_type,
                update.round,
                local_round
            );
            return RemoteApply::Stale;
        }

        if update.round > local_round {
            tracing::warn!(
                "⚠️ {} desync: update for round {} while at {}",
                self.game.game_id(),
                update.round,
                local_round
            );
            self.game.apply_update(update);
            self.lock.reset();
            self.desyncs += 1;
            return RemoteApply::Desync {
                local_round,
                remote_round: update.round,
            };
        }

        let resolves = self.game.resolves_round(update);
        self.game.apply_update(update);
        let resolved = resolves && self.lock.release_for(update.round);
        RemoteApply::Applied { resolved }
    }

    /// Clear the lock, e.g. when a new game starts
    pub fn reset_lock(&mut self) {
        self.lock.reset();
    }
}
