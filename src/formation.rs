//! The enemy wave: a grid of ships marching as one body, sweeping the
//! play area boustrophedon-style (march right, drop, march left, drop,
//! ...) and firing at the player while in a horizontal march.

use std::f32::consts::PI;
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::entity::{Entity, EntityState, GameTime, Vec2};
use crate::interface::{DrawSink, VisualBank};
use crate::level::LevelData;
use crate::player::Player;
use crate::pool::ObjectPool;
use crate::sim::{spawn_effect, GameEvent, Services};
use crate::{GameError, World};

// ── Tuning ────────────────────────────────────────────────────────────────────

/// Grid origin and spacing in world pixels.
const GRID_START_X: f32 = 100.0;
const GRID_START_Y: f32 = 70.0;
const COLUMN_SPACING: f32 = 110.0;
const ROW_SPACING: f32 = 50.0;

/// How far past a play-area edge the lead ship marches before the
/// formation drops.
const MARCH_MARGIN: f32 = 100.0;
/// Vertical distance covered by one drop.
const DROP_STEP: f32 = 40.0;
/// Downward speed while dropping, in px/s.
const DROP_SPEED: f32 = 70.0;
/// Group speed gain per completed drop.
const DROP_SPEED_GAIN: f32 = 5.0;
/// Group speed ceiling; drops and kill bonuses both clamp here.
const MAX_GROUP_SPEED: f32 = 500.0;

const SHOT_POOL: usize = 10;
/// Random extra shot speed on top of the level's base, in px/s.
const SHOT_SPEED_JITTER: f32 = 50.0;
/// Shots are culled this far below the bottom edge.
const SHOT_CULL_MARGIN: f32 = 40.0;

/// Percent chance that a kill drops a power-up...
const POWERUP_DROP_PROB: u32 = 10;
/// ...and the window after which the next kill is guaranteed to.
const POWERUP_DROP_WINDOW: Duration = Duration::from_secs(12);

const EXHAUST_FRAMES: usize = 4;
const EXPLOSION_FRAMES: usize = 8;
const EXPLOSION_FPS: u32 = 12;

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyState {
    MarchRight,
    MarchLeft,
    Drop,
    Halt,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyData {
    pub score: u32,
    /// Hit points, and also the group-speed bonus this enemy's death
    /// grants the survivors.
    pub power: i32,
}

/// The three enemy classes, indexed by `LevelData::enemy_rows`.
pub const ENEMY_TYPES: [EnemyData; 3] = [
    EnemyData {
        score: 10,
        power: 10,
    },
    EnemyData {
        score: 20,
        power: 20,
    },
    EnemyData {
        score: 80,
        power: 50,
    },
];

/// One formation member: a ship sprite with an exhaust trail behind
/// it. Created at level init and never reassigned; death leaves it
/// allocated but inert until the next level.
#[derive(Clone, Debug)]
pub struct Enemy {
    ship: Entity,
    exhaust: Entity,
    data: &'static EnemyData,
    hit_points: i32,
    alive: bool,
    state: EnemyState,
}

impl Enemy {
    pub fn new(class: usize, bank: &VisualBank) -> Result<Self, GameError> {
        let mut ship = Entity::new();
        ship.init_visual(bank.enemy_ships[class], 1)?;
        ship.scale = 0.8;
        let mut exhaust = Entity::new();
        exhaust.init_visual(bank.enemy_exhausts[class], EXHAUST_FRAMES)?;
        Ok(Self {
            ship,
            exhaust,
            data: &ENEMY_TYPES[class],
            hit_points: ENEMY_TYPES[class].power,
            alive: true,
            state: EnemyState::Halt,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn data(&self) -> &EnemyData {
        self.data
    }

    pub fn hit_points(&self) -> i32 {
        self.hit_points
    }

    pub fn ship(&self) -> &Entity {
        &self.ship
    }

    pub fn position(&self) -> Vec2 {
        self.ship.pos
    }

    /// Place the enemy and make it visible.
    pub fn set_position(&mut self, pos: Vec2) {
        self.ship.pos = pos;
        self.ship.state = EntityState::Visible;
        self.exhaust.state = EntityState::Visible;
    }

    fn set_direction(&mut self, speed: f32, angle: f32) {
        self.ship.velocity = Vec2::new(speed, 0.0);
        self.ship.angle = angle;
        self.exhaust.velocity = self.ship.velocity;
        self.exhaust.angle = angle;
        // The exhaust sits behind the nose, whichever way it points.
        self.exhaust.pos =
            self.ship.pos - Vec2::new(self.ship.width() / 2.5 * angle.cos(), 0.0);
    }

    pub fn goto_state(&mut self, state: EnemyState, speed: f32) {
        if state == self.state {
            return;
        }
        self.state = state;
        match state {
            EnemyState::MarchRight => self.set_direction(speed, 0.0),
            EnemyState::MarchLeft => self.set_direction(-speed, PI),
            EnemyState::Drop => {
                self.ship.velocity = Vec2::new(0.0, speed);
                self.exhaust.velocity = self.ship.velocity;
            }
            EnemyState::Halt => {
                self.ship.velocity = Vec2::zeros();
                self.exhaust.velocity = Vec2::zeros();
            }
            EnemyState::Dead => {
                self.ship.hide();
                self.exhaust.hide();
            }
        }
    }

    fn kill(&mut self) {
        self.alive = false;
        self.goto_state(EnemyState::Dead, 0.0);
    }

    /// Apply missile damage. The enemy dies when its hit points go
    /// strictly negative; returns whether it is still alive.
    pub fn hit(&mut self, damage: i32) -> bool {
        self.hit_points -= damage;
        if self.hit_points < 0 {
            self.kill();
        }
        self.alive
    }

    pub fn update(&mut self, t: &GameTime) {
        self.ship.update(t);
        self.exhaust.update(t);
    }

    pub fn submit(&self, sink: &mut dyn DrawSink) {
        self.ship.submit(sink);
        self.exhaust.submit(sink);
    }
}

/// Outcome of a missile strike on a formation member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Damaged,
    Destroyed { score: u32 },
}

// ── The formation ─────────────────────────────────────────────────────────────

pub struct Formation {
    world: World,
    bank: VisualBank,
    level: &'static LevelData,
    /// Row-major arena; row and column views are index arithmetic.
    enemies: Vec<Enemy>,
    state: EnemyState,
    prev_state: EnemyState,
    /// The enemy whose vertical position gates drop completion.
    lead: Option<usize>,
    target_x: f32,
    target_y: f32,
    speed: f32,
    alive: usize,
    shots: ObjectPool<Entity>,
    shots_in_flight: usize,
    last_powerup_request: Duration,
}

impl Formation {
    pub fn new(level: &'static LevelData, world: World, bank: &VisualBank) -> Result<Self, GameError> {
        let mut enemies = Vec::with_capacity(level.rows * level.columns);
        for row in 0..level.rows {
            for _ in 0..level.columns {
                enemies.push(Enemy::new(level.enemy_rows[row], bank)?);
            }
        }
        let mut slots = Vec::with_capacity(SHOT_POOL);
        for _ in 0..SHOT_POOL {
            let mut shot = Entity::new();
            shot.init_visual(bank.enemy_shot, 1)?;
            slots.push(shot);
        }
        let mut formation = Self {
            world,
            bank: *bank,
            level,
            enemies,
            state: EnemyState::Halt,
            prev_state: EnemyState::Halt,
            lead: None,
            target_x: world.width + MARCH_MARGIN,
            target_y: 0.0,
            speed: level.start_speed,
            alive: level.rows * level.columns,
            shots: ObjectPool::new("enemy shot", slots),
            shots_in_flight: 0,
            last_powerup_request: Duration::ZERO,
        };
        formation.reset_positions();
        Ok(formation)
    }

    /// Send the survivors back to their grid-start positions and
    /// restart the sweep at the current group speed. Dead enemies stay
    /// dead; hit points are untouched. Used at level init and after a
    /// player respawn.
    pub fn reset_positions(&mut self) {
        self.state = EnemyState::MarchRight;
        self.target_x = self.world.width + MARCH_MARGIN;
        self.lead = None;
        for row in 0..self.level.rows {
            for col in 0..self.level.columns {
                let enemy = &mut self.enemies[row * self.level.columns + col];
                if !enemy.is_alive() {
                    continue;
                }
                enemy.set_position(Vec2::new(
                    GRID_START_X + col as f32 * COLUMN_SPACING,
                    GRID_START_Y + row as f32 * ROW_SPACING,
                ));
                // Halt first so the march re-applies a fresh velocity
                // even to enemies already in MarchRight.
                enemy.goto_state(EnemyState::Halt, 0.0);
                enemy.goto_state(EnemyState::MarchRight, self.speed);
            }
        }
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn alive_count(&self) -> usize {
        self.alive
    }

    pub fn lead(&self) -> Option<usize> {
        self.lead
    }

    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    pub fn shots_in_flight(&self) -> usize {
        self.shots_in_flight
    }

    pub fn enemy(&self, index: usize) -> &Enemy {
        &self.enemies[index]
    }

    pub fn enemy_mut(&mut self, index: usize) -> &mut Enemy {
        &mut self.enemies[index]
    }

    /// Index of the first alive enemy whose ship intersects `other`.
    pub fn find_hit(&self, other: &Entity) -> Option<usize> {
        self.enemies
            .iter()
            .position(|enemy| enemy.is_alive() && enemy.ship.intersects(other))
    }

    pub fn update(
        &mut self,
        t: &GameTime,
        player: &mut Player,
        svc: &mut Services<impl Rng>,
    ) {
        let mut next_state = self.state;
        let mut next_speed = 0.0;

        for index in 0..self.enemies.len() {
            if !self.enemies[index].is_alive() {
                continue;
            }

            // Body contact destroys the enemy and (unless shielded)
            // the player. The sweep ends for this frame.
            if player.check_enemy_contact(&self.enemies[index].ship, t, svc) {
                self.enemies[index].kill();
                self.finish_kill(index, t, svc);
                break;
            }

            self.enemies[index].update(t);

            // The first enemy to satisfy a transition decides it for
            // the whole group this frame.
            if next_state == self.state {
                match self.state {
                    EnemyState::MarchRight => {
                        if self.enemies[index].position().x > self.target_x {
                            next_state = EnemyState::Drop;
                            next_speed = DROP_SPEED;
                            self.target_y = self.enemies[index].position().y + DROP_STEP;
                            self.lead = Some(index);
                        }
                    }
                    EnemyState::MarchLeft => {
                        if self.enemies[index].position().x < self.target_x {
                            next_state = EnemyState::Drop;
                            next_speed = DROP_SPEED;
                            self.target_y = self.enemies[index].position().y + DROP_STEP;
                            self.lead = Some(index);
                        }
                    }
                    EnemyState::Drop => {
                        if let Some(lead) = self.lead {
                            if self.enemies[lead].position().y > self.target_y {
                                if self.prev_state == EnemyState::MarchRight {
                                    next_state = EnemyState::MarchLeft;
                                    self.target_x = -MARCH_MARGIN;
                                } else {
                                    next_state = EnemyState::MarchRight;
                                    self.target_x = self.world.width + MARCH_MARGIN;
                                }
                                self.speed = (self.speed + DROP_SPEED_GAIN).min(MAX_GROUP_SPEED);
                                next_speed = self.speed;
                            }
                        }
                    }
                    EnemyState::Halt | EnemyState::Dead => {}
                }
            }

            // Shooting only happens mid-march, and only at a live
            // player, under the level's concurrency ceiling.
            if player.is_alive()
                && matches!(self.state, EnemyState::MarchRight | EnemyState::MarchLeft)
                && self.shots_in_flight < self.level.max_enemy_shots
                && svc.rng.gen_range(0..100) < self.level.shot_prob
            {
                self.begin_shot(index, svc);
            }
        }

        if next_state != self.state {
            self.prev_state = self.state;
            self.state = next_state;
            debug!("formation -> {:?} at {:.0} px/s", next_state, next_speed);
            for enemy in &mut self.enemies {
                if enemy.is_alive() {
                    enemy.goto_state(next_state, next_speed);
                }
            }
        }

        // Advance shots; cull the ones past the bottom edge, resolve
        // the ones reaching the player.
        let mut released = 0;
        for shot in self.shots.iter_mut() {
            if shot.state != EntityState::Visible {
                continue;
            }
            shot.update(t);
            if shot.pos.y > self.world.height + SHOT_CULL_MARGIN {
                shot.hide();
                released += 1;
            } else if player.check_hit(shot) {
                shot.hide();
                released += 1;
                player.take_hit(t, svc);
            }
        }
        self.shots_in_flight -= released;
    }

    fn begin_shot(&mut self, index: usize, svc: &mut Services<impl Rng>) {
        let nose = {
            let ship = &self.enemies[index].ship;
            Vec2::new(ship.pos.x, ship.pos.y + ship.height() / 2.0)
        };
        let speed = self.level.shot_speed + svc.rng.gen_range(0.0..SHOT_SPEED_JITTER);
        if let Some(shot) = self.shots.acquire() {
            shot.pos = nose;
            shot.velocity = Vec2::new(0.0, speed);
            shot.state = EntityState::Visible;
            self.shots_in_flight += 1;
        }
    }

    /// Apply missile damage to the enemy at `index` and resolve a kill
    /// if the damage was fatal. Score attribution is the caller's.
    pub fn damage_enemy(
        &mut self,
        index: usize,
        damage: i32,
        t: &GameTime,
        svc: &mut Services<impl Rng>,
    ) -> HitOutcome {
        debug_assert!(
            self.enemies[index].is_alive(),
            "damage applied to a dead enemy"
        );
        if self.enemies[index].hit(damage) {
            HitOutcome::Damaged
        } else {
            let score = self.enemies[index].data.score;
            self.finish_kill(index, t, svc);
            HitOutcome::Destroyed { score }
        }
    }

    /// Bookkeeping for an enemy that just died: explosion, alive
    /// counter, group speed bonus, lead hand-off, power-up drop, and
    /// the level-clear signal.
    fn finish_kill(&mut self, index: usize, t: &GameTime, svc: &mut Services<impl Rng>) {
        debug_assert!(self.alive > 0, "kill with no enemies alive");
        let pos = self.enemies[index].ship.pos;
        let width = self.enemies[index].ship.width();
        let visual = self.bank.enemy_explosions[svc.rng.gen_range(0..3)];
        if let Some(explosion) = spawn_effect(svc.effects, visual, EXPLOSION_FRAMES, EXPLOSION_FPS, pos)
        {
            explosion.scale_to_height(width);
        }

        self.alive -= 1;
        self.speed = (self.speed + self.enemies[index].data.power as f32).min(MAX_GROUP_SPEED);

        // If the drop's lead just died the completion check would never
        // fire, stalling the formation. Hand the lead to any survivor
        // and re-base the target by the row offset between the two, so
        // the remaining drop distance is preserved.
        if self.state == EnemyState::Drop && self.lead == Some(index) {
            match (0..self.enemies.len()).find(|&i| self.enemies[i].is_alive()) {
                Some(next) => {
                    self.target_y +=
                        self.enemies[next].position().y - self.enemies[index].position().y;
                    self.lead = Some(next);
                }
                None => self.lead = None,
            }
        }

        if self.alive == 0 {
            svc.events.push(GameEvent::LevelCleared);
        } else if svc.rng.gen_range(0..100) < POWERUP_DROP_PROB
            || self.last_powerup_request + POWERUP_DROP_WINDOW < t.total
        {
            svc.events.push(GameEvent::SpawnPowerup { pos });
            self.last_powerup_request = t.total;
        }
    }

    pub fn submit(&self, sink: &mut dyn DrawSink) {
        for enemy in &self.enemies {
            enemy.submit(sink);
        }
        for shot in self.shots.iter() {
            shot.submit(sink);
        }
    }
}
