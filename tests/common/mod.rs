//! Shared stub collaborators for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use space_raiders::entity::{Entity, GameTime, Tint, Vec2};
use space_raiders::interface::{
    AudioSink, ContentSource, DrawSink, InputSource, Key, Sound, VisualBank, VisualHandle,
};
use space_raiders::pool::ObjectPool;
use space_raiders::sim::{GameEvent, Services};
use space_raiders::GameError;

/// Content source with fixed dimensions: every sheet is 100x100 (the
/// star is a single pixel) so box arithmetic stays predictable.
pub struct StubContent;

impl ContentSource for StubContent {
    fn load_visual(&mut self, name: &str) -> Result<VisualHandle, GameError> {
        let (width, height) = if name == "star" { (1, 1) } else { (100, 100) };
        Ok(VisualHandle {
            id: 0,
            width,
            height,
        })
    }
}

pub fn bank() -> VisualBank {
    VisualBank::load(&mut StubContent).unwrap()
}

/// Input source with a fixed set of held keys.
#[derive(Default)]
pub struct HeldKeys {
    down: Vec<Key>,
}

impl HeldKeys {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn holding(keys: &[Key]) -> Self {
        Self {
            down: keys.to_vec(),
        }
    }
}

impl InputSource for HeldKeys {
    fn is_key_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    fn is_exit_requested(&self) -> bool {
        false
    }
}

/// Records every sound it is asked to play.
#[derive(Default)]
pub struct RecordingAudio {
    pub played: Vec<Sound>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, sound: Sound) {
        self.played.push(sound);
    }
}

impl RecordingAudio {
    pub fn count(&self, sound: Sound) -> usize {
        self.played.iter().filter(|&&s| s == sound).count()
    }
}

/// Counts draw submissions.
#[derive(Default)]
pub struct CountingSink {
    pub submissions: usize,
}

impl DrawSink for CountingSink {
    fn submit(
        &mut self,
        _visual: VisualHandle,
        _position: Vec2,
        _frame: usize,
        _tint: Tint,
        _angle: f32,
        _origin: Vec2,
        _scale: f32,
    ) {
        self.submissions += 1;
    }
}

/// Everything a component update needs, bundled the way the runner
/// bundles it.
pub struct Harness {
    pub rng: StdRng,
    pub audio: RecordingAudio,
    pub effects: ObjectPool<Entity>,
    pub events: Vec<GameEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(42),
            audio: RecordingAudio::default(),
            effects: ObjectPool::new("fx", (0..24).map(|_| Entity::new()).collect()),
            events: Vec::new(),
        }
    }

    pub fn svc(&mut self) -> Services<'_, StdRng> {
        Services {
            rng: &mut self.rng,
            audio: &mut self.audio,
            effects: &mut self.effects,
            events: &mut self.events,
        }
    }

    pub fn level_clears(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, GameEvent::LevelCleared))
            .count()
    }

    pub fn game_overs(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, GameEvent::GameOver))
            .count()
    }
}

/// A fixed-timestep tick `total_ms` into the session.
pub fn tick(total_ms: u64) -> GameTime {
    GameTime {
        total: Duration::from_millis(total_ms),
        delta: Duration::from_millis(33),
    }
}
