//! The player ship: movement and firing, missile resolution against
//! enemies and hazards, timed power-ups, lives and score.

use std::time::Duration;

use rand::Rng;

use crate::entity::{Entity, EntityState, GameTime, Vec2};
use crate::formation::{Formation, HitOutcome};
use crate::interface::{DrawSink, InputSource, Key, Sound, VisualBank};
use crate::pool::ObjectPool;
use crate::powerup::PowerupKind;
use crate::sim::{spawn_effect, GameEvent, Services};
use crate::starfield::Starfield;
use crate::GameError;

// ── Tuning ────────────────────────────────────────────────────────────────────

const START_LIVES: u32 = 3;
/// Horizontal speed in px/s, boosted value and ceiling.
const BASE_SPEED: f32 = 250.0;
const SPEED_BOOST: f32 = 50.0;
const MAX_SPEED: f32 = 500.0;
/// Fire rate, boosted value and ceiling.
const BASE_MISSILES_PER_SECOND: f32 = 2.3;
const MAX_MISSILES_PER_SECOND: f32 = 5.5;
const MISSILE_SPEED: f32 = 500.0;
const MISSILE_POOL: usize = 10;
const MISSILE_FRAMES: usize = 10;
/// Missile damage is this plus 0..10 at random.
const MISSILE_BASE_DAMAGE: i32 = 5;
/// Points for a missile that damages without destroying.
const GRAZE_SCORE: u32 = 5;
/// Points per collected power-up, times the level number.
const POWERUP_SCORE: u32 = 100;

const RESPAWN_DELAY: Duration = Duration::from_secs(5);
const FIRE_BOOST_DURATION: Duration = Duration::from_secs(10);
const SPEED_BOOST_DURATION: Duration = Duration::from_secs(5);
const SHIELD_DURATION: Duration = Duration::from_secs(10);

const BURNER_FRAMES: usize = 10;
const EXPLOSION_FRAMES: usize = 7;
const EXPLOSION_FPS: u32 = 12;
const MISSILE_EXPLODE_FRAMES: usize = 9;
const MISSILE_EXPLODE_FPS: u32 = 22;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Alive,
    Respawn,
    Dead,
}

pub struct Player {
    bank: VisualBank,
    ship: Entity,
    burner: Entity,
    shield: Entity,
    missiles: ObjectPool<Entity>,
    state: PlayerState,
    score: u32,
    lives: u32,
    speed: f32,
    missiles_per_second: f32,
    next_missile_at: Duration,
    respawn_at: Duration,
    fire_boost_until: Option<Duration>,
    speed_boost_until: Option<Duration>,
    shield_until: Option<Duration>,
    shield_active: bool,
}

impl Player {
    pub fn new(bank: &VisualBank) -> Result<Self, GameError> {
        let mut ship = Entity::new();
        ship.init_visual(bank.player, 1)?;
        ship.pos = Vec2::new(300.0, 700.0);
        ship.scale_to_width(90.0);
        ship.state = EntityState::Visible;

        let mut burner = Entity::new();
        burner.init_visual(bank.burner, BURNER_FRAMES)?;
        burner.scale = 0.6;
        burner.animation_fps = 10;
        burner.pos = ship.pos + Vec2::new(0.0, ship.height() - 20.0);
        burner.state = EntityState::Visible;

        let mut shield = Entity::new();
        shield.init_visual(bank.shield, 1)?;
        shield.scale_to_width(90.0);

        let mut slots = Vec::with_capacity(MISSILE_POOL);
        for _ in 0..MISSILE_POOL {
            let mut missile = Entity::new();
            missile.init_visual(bank.missile, MISSILE_FRAMES)?;
            missile.scale = 0.4;
            missile.shrink_factor = 0.3;
            slots.push(missile);
        }

        Ok(Self {
            bank: *bank,
            ship,
            burner,
            shield,
            missiles: ObjectPool::new("missile", slots),
            state: PlayerState::Alive,
            score: 0,
            lives: START_LIVES,
            speed: BASE_SPEED,
            missiles_per_second: BASE_MISSILES_PER_SECOND,
            next_missile_at: Duration::ZERO,
            respawn_at: Duration::ZERO,
            fire_boost_until: None,
            speed_boost_until: None,
            shield_until: None,
            shield_active: false,
        })
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == PlayerState::Alive
    }

    pub fn is_shield_active(&self) -> bool {
        self.shield_active
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn missiles_per_second(&self) -> f32 {
        self.missiles_per_second
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn ship(&self) -> &Entity {
        &self.ship
    }

    pub fn missiles(&self) -> &ObjectPool<Entity> {
        &self.missiles
    }

    /// Does `other` touch the player's ship? Pure detection; the
    /// shield never suppresses this, only what the caller does next.
    pub fn check_hit(&self, other: &Entity) -> bool {
        self.ship.intersects(other)
    }

    /// Body contact with an enemy ship. The collision consumes the
    /// enemy either way; the player only dies unshielded.
    pub fn check_enemy_contact(
        &mut self,
        enemy_ship: &Entity,
        t: &GameTime,
        svc: &mut Services<impl Rng>,
    ) -> bool {
        if self.ship.intersects(enemy_ship) {
            self.take_hit(t, svc);
            true
        } else {
            false
        }
    }

    /// A lethal contact: the shield absorbs it, otherwise the ship
    /// explodes.
    pub fn take_hit(&mut self, t: &GameTime, svc: &mut Services<impl Rng>) {
        if self.shield_active {
            return;
        }
        self.explode(t, svc);
    }

    fn explode(&mut self, t: &GameTime, svc: &mut Services<impl Rng>) {
        if self.state != PlayerState::Alive {
            return;
        }
        svc.audio.play(Sound::BigExplosion);
        if let Some(explosion) = spawn_effect(
            svc.effects,
            self.bank.explosion,
            EXPLOSION_FRAMES,
            EXPLOSION_FPS,
            self.ship.pos,
        ) {
            explosion.scale_to_height(100.0);
        }
        self.ship.hide();
        self.burner.hide();

        // Every boost dies with the ship.
        self.fire_boost_until = None;
        self.speed_boost_until = None;
        self.shield_until = None;
        self.shield_active = false;
        self.shield.hide();
        self.missiles_per_second = BASE_MISSILES_PER_SECOND;
        self.speed = BASE_SPEED;

        self.lives = self.lives.saturating_sub(1);
        if self.lives > 0 {
            self.state = PlayerState::Respawn;
            self.respawn_at = t.total + RESPAWN_DELAY;
        } else {
            self.state = PlayerState::Dead;
            svc.events.push(GameEvent::GameOver);
        }
    }

    pub fn apply_powerup(&mut self, kind: PowerupKind, t: &GameTime, level: usize) {
        self.score += POWERUP_SCORE * level as u32;
        match kind {
            PowerupKind::FasterFire => {
                self.missiles_per_second =
                    (self.missiles_per_second + 1.0).min(MAX_MISSILES_PER_SECOND);
                self.fire_boost_until = Some(t.total + FIRE_BOOST_DURATION);
            }
            PowerupKind::FasterMove => {
                self.speed = (self.speed + SPEED_BOOST).min(MAX_SPEED);
                self.speed_boost_until = Some(t.total + SPEED_BOOST_DURATION);
            }
            PowerupKind::Shield => {
                if !self.shield_active {
                    self.shield_active = true;
                    self.shield.state = EntityState::Visible;
                }
                self.shield_until = Some(t.total + SHIELD_DURATION);
            }
        }
    }

    pub fn update(
        &mut self,
        t: &GameTime,
        input: &dyn InputSource,
        formation: &mut Formation,
        starfield: &mut Starfield,
        svc: &mut Services<impl Rng>,
    ) {
        match self.state {
            PlayerState::Alive => {
                if input.is_key_down(Key::Left) {
                    self.ship.velocity.x = -self.speed;
                } else if input.is_key_down(Key::Right) {
                    self.ship.velocity.x = self.speed;
                } else {
                    self.ship.velocity.x = 0.0;
                }
                self.burner.velocity = self.ship.velocity;

                if input.is_key_down(Key::Fire) && t.total > self.next_missile_at {
                    self.fire_missile(t, svc);
                }

                if starfield.check_player_hit(&self.ship) {
                    self.take_hit(t, svc);
                }

                self.ship.update(t);
                self.burner.update(t);

                if self.shield_active {
                    self.shield.pos = self.ship.pos - Vec2::new(0.0, 30.0);
                    let alpha = (t.total.as_millis() / 10 % 100) as f32 / 100.0;
                    self.shield.tint.a = (alpha * 255.0) as u8;
                }

                // Expired boosts revert to their base values.
                if self.fire_boost_until.is_some_and(|until| until < t.total) {
                    self.fire_boost_until = None;
                    self.missiles_per_second = BASE_MISSILES_PER_SECOND;
                }
                if self.speed_boost_until.is_some_and(|until| until < t.total) {
                    self.speed_boost_until = None;
                    self.speed = BASE_SPEED;
                }
                if self.shield_until.is_some_and(|until| until < t.total) {
                    self.shield_until = None;
                    self.shield_active = false;
                    self.shield.hide();
                }
            }

            PlayerState::Respawn => {
                if self.respawn_at < t.total {
                    // Survivors regroup at the top; the player gets a
                    // clean board to come back to.
                    formation.reset_positions();
                    self.ship.state = EntityState::Visible;
                    self.burner.state = EntityState::Visible;
                    self.state = PlayerState::Alive;
                }
            }

            PlayerState::Dead => {}
        }

        // Missiles already in the air keep flying and resolving
        // whatever the ship is doing.
        self.missile_pass(t, formation, starfield, svc);
    }

    fn fire_missile(&mut self, t: &GameTime, svc: &mut Services<impl Rng>) {
        let nose_y = self.ship.pos.y - self.ship.height();
        let nose_x = self.ship.pos.x;
        let cooldown = Duration::from_secs_f32(1.0 / self.missiles_per_second);
        if let Some(missile) = self.missiles.acquire() {
            missile.pos = Vec2::new(nose_x, nose_y + missile.height());
            missile.velocity = Vec2::new(0.0, -MISSILE_SPEED);
            missile.state = EntityState::Visible;
            self.next_missile_at = t.total + cooldown;
            svc.audio.play(Sound::MissileFired);
        }
    }

    fn missile_pass(
        &mut self,
        t: &GameTime,
        formation: &mut Formation,
        starfield: &Starfield,
        svc: &mut Services<impl Rng>,
    ) {
        for missile in self.missiles.iter_mut() {
            if missile.state != EntityState::Visible {
                continue;
            }

            if starfield.check_missile_hit(missile) {
                missile.hide();
                Self::explode_missile(&self.bank, missile.pos, svc);
                svc.audio.play(Sound::SmallExplosion);
            }

            // A missile hidden by the hazard hit above fails the
            // visibility check inside `find_hit`, so it can never
            // resolve against an enemy in the same frame.
            if let Some(index) = formation.find_hit(missile) {
                missile.hide();
                let damage = MISSILE_BASE_DAMAGE + svc.rng.gen_range(0..10);
                match formation.damage_enemy(index, damage, t, svc) {
                    HitOutcome::Damaged => {
                        Self::explode_missile(&self.bank, missile.pos, svc);
                        self.score += GRAZE_SCORE;
                        svc.audio.play(Sound::SmallExplosion);
                    }
                    HitOutcome::Destroyed { score } => {
                        self.score += score;
                        svc.audio.play(Sound::BigExplosion);
                    }
                }
            }

            missile.update(t);
            if missile.pos.y < -missile.height() {
                missile.hide();
            }
        }
    }

    fn explode_missile(bank: &VisualBank, pos: Vec2, svc: &mut Services<impl Rng>) {
        if let Some(explosion) = spawn_effect(
            svc.effects,
            bank.missile_explode,
            MISSILE_EXPLODE_FRAMES,
            MISSILE_EXPLODE_FPS,
            pos,
        ) {
            explosion.scale = 0.5;
            // Keeps animating and drawing, never collides.
            explosion.state = EntityState::Disabled;
        }
    }

    pub fn submit(&self, sink: &mut dyn DrawSink) {
        for missile in self.missiles.iter() {
            missile.submit(sink);
        }
        self.ship.submit(sink);
        self.burner.submit(sink);
        self.shield.submit(sink);
    }
}
