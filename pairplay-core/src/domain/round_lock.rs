/// Per-game lock preventing a second local action before the round resolves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRoundLock {
    locked: bool,
    round: u32,
}

impl GameRoundLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Round index held by the lock (meaningful only while locked)
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Lock `round`. Refused (false) while any round is locked.
    pub fn try_acquire(&mut self, round: u32) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        self.round = round;
        true
    }

    /// Release if `round` is the locked round. Returns whether it released.
    pub fn release_for(&mut self, round: u32) -> bool {
        if self.locked && self.round == round {
            self.locked = false;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.locked = false;
        self.round = 0;
    }
}
