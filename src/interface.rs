//! Contracts for the collaborators the core consumes as black boxes:
//! content loading, input polling, draw submission and audio playback.
//! The core never calls a framework; a front end implements these.

use crate::entity::{Tint, Vec2};
use crate::GameError;

/// Opaque reference to a loaded visual. The id means nothing to the
/// core; the pixel dimensions feed bounding boxes and sprite origins.
/// Handles are stable for the whole session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

/// Loads named visuals, once, at construction time.
pub trait ContentSource {
    fn load_visual(&mut self, name: &str) -> Result<VisualHandle, GameError>;
}

/// The only keys the simulation cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Fire,
}

/// Polled once per frame by the simulation.
pub trait InputSource {
    fn is_key_down(&self, key: Key) -> bool;
    fn is_exit_requested(&self) -> bool;
}

/// Receives one call per visible entity per frame. Submission order
/// only matters for layering, never for correctness.
pub trait DrawSink {
    #[allow(clippy::too_many_arguments)]
    fn submit(
        &mut self,
        visual: VisualHandle,
        position: Vec2,
        frame: usize,
        tint: Tint,
        angle: f32,
        origin: Vec2,
        scale: f32,
    );
}

/// Discrete sound events, fire-and-forget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    MissileFired,
    SmallExplosion,
    BigExplosion,
    PowerupCollected,
}

pub trait AudioSink {
    fn play(&mut self, sound: Sound);
}

/// Every visual the simulation uses, loaded up front so that level
/// re-initialization never goes back to the content source.
#[derive(Clone, Copy, Debug)]
pub struct VisualBank {
    pub player: VisualHandle,
    pub burner: VisualHandle,
    pub shield: VisualHandle,
    pub missile: VisualHandle,
    pub missile_explode: VisualHandle,
    pub explosion: VisualHandle,
    pub enemy_explosions: [VisualHandle; 3],
    pub enemy_ships: [VisualHandle; 3],
    pub enemy_exhausts: [VisualHandle; 3],
    pub enemy_shot: VisualHandle,
    pub powerups: [VisualHandle; 3],
    pub asteroids: [VisualHandle; 3],
    pub star: VisualHandle,
}

impl VisualBank {
    pub fn load(content: &mut dyn ContentSource) -> Result<Self, GameError> {
        Ok(Self {
            player: content.load_visual("player")?,
            burner: content.load_visual("burner")?,
            shield: content.load_visual("shield")?,
            missile: content.load_visual("missile")?,
            missile_explode: content.load_visual("missile-explode")?,
            explosion: content.load_visual("explosion")?,
            enemy_explosions: [
                content.load_visual("enemies/explosion1")?,
                content.load_visual("enemies/explosion2")?,
                content.load_visual("enemies/explosion3")?,
            ],
            enemy_ships: [
                content.load_visual("enemies/ship1")?,
                content.load_visual("enemies/ship2")?,
                content.load_visual("enemies/ship3")?,
            ],
            enemy_exhausts: [
                content.load_visual("enemies/exhaust1")?,
                content.load_visual("enemies/exhaust2")?,
                content.load_visual("enemies/exhaust3")?,
            ],
            enemy_shot: content.load_visual("enemies/shot")?,
            powerups: [
                content.load_visual("powerups/rapid")?,
                content.load_visual("powerups/boost")?,
                content.load_visual("powerups/shield")?,
            ],
            asteroids: [
                content.load_visual("asteroid1")?,
                content.load_visual("asteroid2")?,
                content.load_visual("asteroid3")?,
            ],
            star: content.load_visual("star")?,
        })
    }
}
