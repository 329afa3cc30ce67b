use crate::application::SyncableGame;
use crate::domain::{GameAction, GameUpdate, PlayerId, Scores};
use serde::{Deserialize, Serialize};

pub const MATH_QUIZ_ID: &str = "math";

const ANSWER: &str = "answer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
}

/// One arithmetic question; both clients derive the same list from the seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub left: i64,
    pub right: i64,
    pub operation: Operation,
}

impl Question {
    pub fn answer(&self) -> i64 {
        match self.operation {
            Operation::Add => self.left + self.right,
            Operation::Subtract => self.left - self.right,
            Operation::Multiply => self.left * self.right,
        }
    }
}

/// Deterministic generator shared by both participants
#[derive(Debug, Clone)]
struct SeededRng(u64);

impl SeededRng {
    fn next(&mut self) -> u64 {
        // 64-bit LCG (Knuth MMIX constants)
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound.max(1)
    }
}

/// Question list for `age`, reproducible from `seed`
pub fn generate_questions(seed: u64, age: u8, count: u32) -> Vec<Question> {
    let mut rng = SeededRng(seed);
    let (max, operations): (u64, &[Operation]) = match age {
        0..=5 => (10, &[Operation::Add][..]),
        6..=7 => (20, &[Operation::Add, Operation::Subtract][..]),
        _ => (
            12,
            &[Operation::Add, Operation::Subtract, Operation::Multiply][..],
        ),
    };

    (0..count)
        .map(|_| {
            let operation = operations[rng.below(operations.len() as u64) as usize];
            let a = rng.below(max + 1) as i64;
            let b = rng.below(max + 1) as i64;
            let (left, right) = match operation {
                Operation::Subtract if b > a => (b, a),
                _ => (a, b),
            };
            Question {
                left,
                right,
                operation,
            }
        })
        .collect()
}

/// Result of the most recently applied answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub player_id: PlayerId,
    pub round: u32,
    pub answer: i64,
    pub correct: bool,
}

/// Quiz where the first correct answer wins the round
#[derive(Debug, Clone)]
pub struct MathQuiz {
    local_player: PlayerId,
    questions: Vec<Question>,
    round: u32,
    scores: Scores,
    last_outcome: Option<AnswerOutcome>,
}

impl MathQuiz {
    pub fn new(local_player: PlayerId, seed: u64, age: u8, total_questions: u32) -> Self {
        Self {
            local_player,
            questions: generate_questions(seed, age, total_questions),
            round: 0,
            scores: Scores::new(),
            last_outcome: None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.round as usize)
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        self.last_outcome.as_ref()
    }

    fn answer_of(update: &GameUpdate) -> Option<i64> {
        update.field(ANSWER).and_then(|v| v.as_i64())
    }

    fn is_correct(&self, update: &GameUpdate) -> bool {
        let Some(question) = self.questions.get(update.round as usize) else {
            return false;
        };
        Self::answer_of(update) == Some(question.answer())
    }
}

impl SyncableGame for MathQuiz {
    type Input = i64;

    fn game_id(&self) -> &str {
        MATH_QUIZ_ID
    }

    fn current_round(&self) -> u32 {
        self.round
    }

    fn derive_action(&self, answer: i64) -> GameAction {
        GameAction::new(ANSWER, self.round).with_field(ANSWER, answer)
    }

    fn apply_update(&mut self, update: &GameUpdate) {
        if update.action_type != ANSWER {
            return;
        }
        let Some(answer) = Self::answer_of(update) else {
            tracing::warn!("⚠️ Answer update without an answer field");
            return;
        };
        let correct = self.is_correct(update);

        match &update.scores {
            Some(scores) => self.scores = scores.clone(),
            None if correct => {
                *self.scores.entry(update.player_id.clone()).or_insert(0) += 1;
            }
            None => {}
        }

        if correct {
            self.round = update.round + 1;
        }

        self.last_outcome = Some(AnswerOutcome {
            player_id: update.player_id.clone(),
            round: update.round,
            answer,
            correct,
        });
    }

    fn resolves_round(&self, update: &GameUpdate) -> bool {
        update.action_type == ANSWER
            && update.round == self.round
            && (update.player_id == self.local_player || self.is_correct(update))
    }

    fn is_finished(&self) -> bool {
        self.round as usize >= self.questions.len()
    }
}
