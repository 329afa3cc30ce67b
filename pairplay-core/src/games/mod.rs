//! Reference games built on [`SyncableGame`](crate::application::SyncableGame)

pub mod free_draw;
pub mod math_quiz;

pub use free_draw::{DrawInput, FreeDraw, Point, Stroke, FREE_DRAW_ID};
pub use math_quiz::{generate_questions, AnswerOutcome, MathQuiz, Operation, Question, MATH_QUIZ_ID};
