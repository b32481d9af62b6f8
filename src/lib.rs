//! Simulation core of a vertically-scrolling formation shooter.
//!
//! Everything that decides the game lives here: the entity primitive and
//! its bounding-box collision test, fixed-capacity pools for short-lived
//! objects, the enemy formation state machine, the player state machine
//! with timed power-ups, and the per-frame orchestration in [`sim`].
//! Rendering, input, audio and content loading are consumed through the
//! narrow traits in [`interface`]; the terminal front end in `main.rs`
//! is one implementation of them.

pub mod entity;
pub mod formation;
pub mod interface;
pub mod level;
pub mod player;
pub mod pool;
pub mod powerup;
pub mod sim;
pub mod starfield;

use thiserror::Error;

/// Play-area dimensions in world pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct World {
    pub width: f32,
    pub height: f32,
}

impl Default for World {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 800.0,
        }
    }
}

/// Configuration errors. These surface at construction or level-load
/// time; per-frame logic never fails.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no level {0} in the level catalog")]
    UnknownLevel(usize),

    #[error("missing visual resource `{0}`")]
    MissingVisual(String),

    #[error("a visual needs at least one animation frame")]
    InvalidFrameCount,
}
