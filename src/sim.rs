//! Frame orchestration: update ordering across the starfield, player
//! and formation, the shared explosion pool, power-up spawning and
//! throttling, pause, and level progression.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::Rng;

use crate::entity::{Entity, EntityState, GameTime, Vec2};
use crate::formation::Formation;
use crate::interface::{AudioSink, ContentSource, DrawSink, InputSource, Sound, VisualBank, VisualHandle};
use crate::level::{level_data, LEVELS};
use crate::player::Player;
use crate::pool::ObjectPool;
use crate::powerup::{Powerup, PowerupKind};
use crate::starfield::Starfield;
use crate::{GameError, World};

/// Concurrent on-screen power-up ceiling.
const MAX_ACTIVE_POWERUPS: usize = 3;
const POWERUP_POOL: usize = 5;
const EFFECT_POOL: usize = 24;
/// Fall speed range for dropped power-ups, in px/s.
const POWERUP_MIN_FALL: f32 = 100.0;
const POWERUP_MAX_FALL: f32 = 250.0;
const POWERUP_SIZE: f32 = 50.0;
/// Falling objects are culled this far below the bottom edge.
const CULL_MARGIN: f32 = 50.0;

/// Signals raised by components during a frame and drained by the
/// runner once the update pass is over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    LevelCleared,
    GameOver,
    SpawnPowerup { pos: Vec2 },
}

/// The capabilities the runner lends to components for one update
/// call: chance, sound, the shared explosion pool, and the event
/// queue. Narrow on purpose; nothing here reaches back into the
/// runner.
pub struct Services<'a, R: Rng> {
    pub rng: &'a mut R,
    pub audio: &'a mut dyn AudioSink,
    pub effects: &'a mut ObjectPool<Entity>,
    pub events: &'a mut Vec<GameEvent>,
}

/// Take a slot from the shared effect pool and start an animation at
/// `pos`. The effect hides itself when the animation wraps. Returns
/// the slot for caller-specific shaping (scale, state).
pub fn spawn_effect<'a>(
    pool: &'a mut ObjectPool<Entity>,
    visual: VisualHandle,
    frames: usize,
    fps: u32,
    pos: Vec2,
) -> Option<&'a mut Entity> {
    let slot = pool.acquire()?;
    if let Err(err) = slot.init_visual(visual, frames) {
        warn!("effect visual rejected: {err}");
        return None;
    }
    slot.pos = pos;
    slot.animation_fps = fps;
    slot.hide_on_animation_end = true;
    slot.state = EntityState::Visible;
    Some(slot)
}

pub struct Simulation {
    world: World,
    bank: VisualBank,
    level: usize,
    player: Player,
    formation: Formation,
    starfield: Starfield,
    powerups: ObjectPool<Powerup>,
    effects: ObjectPool<Entity>,
    events: Vec<GameEvent>,
    rng: StdRng,
    /// Signed pause count; positive skips updates but not drawing.
    pause_count: i32,
    over: bool,
}

impl Simulation {
    pub fn new(
        level: usize,
        world: World,
        content: &mut dyn ContentSource,
        mut rng: StdRng,
    ) -> Result<Self, GameError> {
        let bank = VisualBank::load(content)?;
        let data = level_data(level)?;
        let formation = Formation::new(data, world, &bank)?;
        let player = Player::new(&bank)?;
        let mut starfield = Starfield::new(world, &bank, &mut rng)?;
        starfield.set_max_asteroids(data.max_asteroids);
        let powerups = (0..POWERUP_POOL).map(|_| Powerup::new()).collect();
        let effects = (0..EFFECT_POOL).map(|_| Entity::new()).collect();
        info!("level {level}: {}x{} enemies", data.rows, data.columns);
        Ok(Self {
            world,
            bank,
            level,
            player,
            formation,
            starfield,
            powerups: ObjectPool::new("power-up", powerups),
            effects: ObjectPool::new("explosion", effects),
            events: Vec::new(),
            rng,
            pause_count: 0,
            over: false,
        })
    }

    /// Focus loss and gain from the host environment nest; the
    /// simulation only runs while the count is back to zero.
    pub fn pause(&mut self, paused: bool) {
        self.pause_count += if paused { 1 } else { -1 };
    }

    pub fn is_paused(&self) -> bool {
        self.pause_count > 0
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.player.score()
    }

    pub fn lives(&self) -> u32 {
        self.player.lives()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn active_powerups(&self) -> usize {
        self.powerups
            .iter()
            .filter(|pu| pu.entity.is_visible())
            .count()
    }

    /// One fixed-timestep tick. The ordering is load-bearing: hazards
    /// first, then the player (missile and hazard resolution), then the
    /// formation (body contact and shots), then the passive pools, then
    /// the frame's events. A hit resolved in one stage cannot
    /// re-resolve later in the same frame because the entities involved
    /// have already gone Hidden.
    pub fn update(&mut self, t: &GameTime, input: &dyn InputSource, audio: &mut dyn AudioSink) {
        if self.pause_count > 0 {
            return;
        }

        {
            let mut svc = Services {
                rng: &mut self.rng,
                audio: &mut *audio,
                effects: &mut self.effects,
                events: &mut self.events,
            };
            self.starfield.update(t, self.player.is_alive(), svc.rng);
            self.player
                .update(t, input, &mut self.formation, &mut self.starfield, &mut svc);
            self.formation.update(t, &mut self.player, &mut svc);
        }

        // Explosions run their animations and hide themselves.
        for effect in self.effects.iter_mut() {
            effect.update(t);
        }

        // Power-ups fall, spin, get collected or drift off screen.
        let level = self.level;
        let bottom = self.world.height + CULL_MARGIN;
        for powerup in self.powerups.iter_mut() {
            if !powerup.entity.is_visible() {
                continue;
            }
            powerup.entity.update(t);
            if self.player.check_hit(&powerup.entity) {
                powerup.entity.hide();
                audio.play(Sound::PowerupCollected);
                self.player.apply_powerup(powerup.kind, t, level);
            } else if powerup.entity.pos.y > bottom {
                powerup.entity.hide();
            }
        }

        for event in std::mem::take(&mut self.events) {
            match event {
                GameEvent::SpawnPowerup { pos } => self.spawn_powerup(pos),
                GameEvent::LevelCleared => self.next_level(),
                GameEvent::GameOver => {
                    info!(
                        "game over at level {} with {} points",
                        self.level,
                        self.player.score()
                    );
                    self.over = true;
                }
            }
        }
    }

    /// Drop a power-up of random kind at `pos`, subject to the
    /// concurrency ceiling.
    pub fn spawn_powerup(&mut self, pos: Vec2) {
        if self.active_powerups() >= MAX_ACTIVE_POWERUPS {
            return;
        }
        let kind = PowerupKind::from_index(self.rng.gen_range(0..3));
        let visual = self.bank.powerups[kind as usize];
        let fall = self.rng.gen_range(POWERUP_MIN_FALL..POWERUP_MAX_FALL);
        let spin = self.rng.gen_range(-1.0..1.0);
        if let Some(powerup) = self.powerups.acquire() {
            if let Err(err) = powerup.entity.init_visual(visual, 1) {
                warn!("power-up visual rejected: {err}");
                return;
            }
            powerup.kind = kind;
            powerup.entity.pos = pos;
            powerup.entity.velocity = Vec2::new(0.0, fall);
            powerup.entity.spin = spin;
            powerup.entity.scale_to_width(POWERUP_SIZE);
            powerup.entity.state = EntityState::Visible;
        }
    }

    /// Fresh formation and hazard cap for the next level; the player
    /// carries score, lives and active boosts across. Past the end of
    /// the catalog the progression wraps back to level 1.
    pub fn next_level(&mut self) {
        let cleared = self.level;
        self.level = if self.level + 1 > LEVELS.len() {
            info!("level catalog exhausted, wrapping to level 1");
            1
        } else {
            self.level + 1
        };
        // In range by the wrap above.
        let data = &LEVELS[self.level - 1];
        self.formation = Formation::new(data, self.world, &self.bank)
            .expect("level formations build from already-validated visuals");
        self.starfield.set_max_asteroids(data.max_asteroids);
        info!("level {cleared} cleared, starting level {}", self.level);
    }

    /// Submit every drawable entity, back to front.
    pub fn submit(&self, sink: &mut dyn DrawSink) {
        self.starfield.submit(sink);
        self.player.submit(sink);
        self.formation.submit(sink);
        for effect in self.effects.iter() {
            effect.submit(sink);
        }
        for powerup in self.powerups.iter() {
            powerup.entity.submit(sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::Key;
    use rand::SeedableRng;
    use std::time::Duration;

    struct StubContent;

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

    struct NoInput;

    impl InputSource for NoInput {
        fn is_key_down(&self, _key: Key) -> bool {
            false
        }
        fn is_exit_requested(&self) -> bool {
            false
        }
    }

    struct NoAudio;

    impl AudioSink for NoAudio {
        fn play(&mut self, _sound: Sound) {}
    }

    fn sim() -> Simulation {
        Simulation::new(
            1,
            World::default(),
            &mut StubContent,
            StdRng::seed_from_u64(42),
        )
        .unwrap()
    }

    fn tick(ms: u64) -> GameTime {
        GameTime {
            total: Duration::from_millis(ms),
            delta: Duration::from_millis(33),
        }
    }

    #[test]
    fn level_cleared_event_reinitializes_next_level() {
        let mut sim = sim();
        sim.events.push(GameEvent::LevelCleared);
        sim.update(&tick(33), &NoInput, &mut NoAudio);
        assert_eq!(sim.level(), 2);
        // Level 2 is a fresh 3x8 grid.
        assert_eq!(sim.formation().alive_count(), 24);
    }

    #[test]
    fn game_over_event_sets_terminal_flag() {
        let mut sim = sim();
        assert!(!sim.is_over());
        sim.events.push(GameEvent::GameOver);
        sim.update(&tick(33), &NoInput, &mut NoAudio);
        assert!(sim.is_over());
    }

    #[test]
    fn spawn_powerup_event_respects_ceiling() {
        let mut sim = sim();
        for _ in 0..5 {
            sim.events.push(GameEvent::SpawnPowerup {
                pos: Vec2::new(500.0, 100.0),
            });
        }
        sim.update(&tick(33), &NoInput, &mut NoAudio);
        assert_eq!(sim.active_powerups(), MAX_ACTIVE_POWERUPS);
    }

    #[test]
    fn paused_simulation_defers_queued_events() {
        let mut sim = sim();
        sim.events.push(GameEvent::GameOver);
        sim.pause(true);
        sim.update(&tick(33), &NoInput, &mut NoAudio);
        assert!(!sim.is_over());
        sim.pause(false);
        sim.update(&tick(66), &NoInput, &mut NoAudio);
        assert!(sim.is_over());
    }
}
