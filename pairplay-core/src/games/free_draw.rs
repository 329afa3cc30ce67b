use crate::application::SyncableGame;
use crate::domain::{GameAction, GameUpdate, PlayerId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const FREE_DRAW_ID: &str = "draw";

const STROKE: &str = "stroke";
const CLEAR: &str = "clear";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn from_value(value: &Value) -> Option<Self> {
        let pair = value.as_array()?;
        let x = pair.first()?.as_f64()?;
        let y = pair.get(1)?.as_f64()?;
        Some(Self::new(x as f32, y as f32))
    }
}

/// Stroke segment drawn on the shared canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub player_id: PlayerId,
    pub points: Vec<Point>,
    pub color: String,
    pub width: f32,
}

/// Local drawing input
#[derive(Debug, Clone, PartialEq)]
pub enum DrawInput {
    /// One flushed batch of points
    Stroke {
        points: Vec<Point>,
        color: String,
        width: f32,
    },
    Clear,
}

/// Shared canvas without rounds; strokes are relayed in batches
#[derive(Debug, Clone, Default)]
pub struct FreeDraw {
    strokes: Vec<Stroke>,
}

impl FreeDraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }
}

impl SyncableGame for FreeDraw {
    type Input = DrawInput;

    fn game_id(&self) -> &str {
        FREE_DRAW_ID
    }

    fn current_round(&self) -> u32 {
        0
    }

    fn derive_action(&self, input: DrawInput) -> GameAction {
        match input {
            DrawInput::Stroke {
                points,
                color,
                width,
            } => {
                let points: Vec<Value> = points.iter().map(|p| json!([p.x, p.y])).collect();
                GameAction::new(STROKE, 0)
                    .with_field("points", points)
                    .with_field("color", color)
                    .with_field("width", width)
            }
            DrawInput::Clear => GameAction::new(CLEAR, 0),
        }
    }

    fn apply_update(&mut self, update: &GameUpdate) {
        match update.action_type.as_str() {
            STROKE => {
                let points: Vec<Point> = update
                    .field("points")
                    .and_then(Value::as_array)
                    .map(|values| values.iter().filter_map(Point::from_value).collect())
                    .unwrap_or_default();
                if points.is_empty() {
                    tracing::debug!("Ignoring empty stroke from {}", update.player_id);
                    return;
                }
                self.strokes.push(Stroke {
                    player_id: update.player_id.clone(),
                    points,
                    color: update
                        .field("color")
                        .and_then(Value::as_str)
                        .unwrap_or("#000000")
                        .to_string(),
                    width: update
                        .field("width")
                        .and_then(Value::as_f64)
                        .unwrap_or(4.0) as f32,
                });
            }
            CLEAR => self.strokes.clear(),
            other => tracing::debug!("Ignoring draw action {}", other),
        }
    }

    fn resolves_round(&self, _update: &GameUpdate) -> bool {
        false
    }

    fn uses_round_lock(&self) -> bool {
        false
    }
}
