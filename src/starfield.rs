//! Ambient background: drifting stars and tumbling asteroid hazards.
//! Stars are purely visual; asteroids are lethal to the player and
//! indestructible to missiles.

use rand::Rng;
use std::f32::consts::TAU;

use crate::entity::{Entity, EntityState, GameTime, Tint, Vec2};
use crate::interface::{DrawSink, VisualBank, VisualHandle};
use crate::{GameError, World};

const STAR_COUNT: usize = 100;
/// Percent chance per frame of a new asteroid while under the cap.
const ASTEROID_SPAWN_PROB: u32 = 2;
/// Asteroids are culled this far below the bottom edge.
const ASTEROID_CULL_MARGIN: f32 = 100.0;

struct Star {
    pos: Vec2,
    /// Downward drift in px/s.
    speed: f32,
    tint: Tint,
}

pub struct Starfield {
    world: World,
    stars: Vec<Star>,
    asteroids: Vec<Entity>,
    max_asteroids: usize,
    /// Hidden templates cloned per spawn, one per asteroid visual.
    templates: [Entity; 3],
    star_visual: VisualHandle,
}

impl Starfield {
    pub fn new(world: World, bank: &VisualBank, rng: &mut impl Rng) -> Result<Self, GameError> {
        let stars = (0..STAR_COUNT)
            .map(|_| Self::make_star(world, rng, true))
            .collect();
        let make_template = |visual| -> Result<Entity, GameError> {
            let mut template = Entity::new();
            template.init_visual(visual, 1)?;
            Ok(template)
        };
        let templates = [
            make_template(bank.asteroids[0])?,
            make_template(bank.asteroids[1])?,
            make_template(bank.asteroids[2])?,
        ];
        Ok(Self {
            world,
            stars,
            asteroids: Vec::with_capacity(8),
            max_asteroids: 0,
            templates,
            star_visual: bank.star,
        })
    }

    fn make_star(world: World, rng: &mut impl Rng, anywhere: bool) -> Star {
        // Fresh stars cover the whole sky; respawns re-enter above it.
        let y = if anywhere {
            rng.gen_range(-world.height..world.height)
        } else {
            rng.gen_range(-500.0..-200.0)
        };
        Star {
            pos: Vec2::new(rng.gen_range(0.0..world.width), y),
            speed: rng.gen_range(12.0..192.0),
            tint: Tint::grey(rng.gen_range(20..220)),
        }
    }

    fn spawn_asteroid(&self, rng: &mut impl Rng) -> Entity {
        let mut asteroid = self.templates[rng.gen_range(0..self.templates.len())].clone();
        asteroid.pos = Vec2::new(
            rng.gen_range(0.0..self.world.width),
            rng.gen_range(-200.0..-100.0),
        );
        asteroid.velocity = Vec2::new(rng.gen_range(-2.5..2.5), rng.gen_range(15.0..80.0));
        asteroid.angle = rng.gen_range(0.0..TAU);
        asteroid.spin = rng.gen_range(-1.0..1.0);
        // Knock one colour channel down for variety.
        let mut tint = Tint::WHITE;
        let cut: u8 = rng.gen_range(0..200);
        match rng.gen_range(0..3) {
            0 => tint.r -= cut,
            1 => tint.g -= cut,
            _ => tint.b -= cut,
        }
        asteroid.tint = tint;
        asteroid.state = EntityState::Visible;
        asteroid
    }

    /// New cap at level start. Existing asteroids keep falling.
    pub fn set_max_asteroids(&mut self, max: usize) {
        self.max_asteroids = max;
    }

    pub fn asteroid_count(&self) -> usize {
        self.asteroids.len()
    }

    pub fn update(&mut self, t: &GameTime, player_alive: bool, rng: &mut impl Rng) {
        for star in &mut self.stars {
            star.pos.y += star.speed * t.delta_secs();
            if star.pos.y > self.world.height + 10.0 {
                *star = Self::make_star(self.world, rng, false);
            }
        }

        if player_alive
            && self.asteroids.len() < self.max_asteroids
            && rng.gen_range(0..100) < ASTEROID_SPAWN_PROB
        {
            let asteroid = self.spawn_asteroid(rng);
            self.asteroids.push(asteroid);
        }

        for asteroid in &mut self.asteroids {
            asteroid.update(t);
        }
        let bottom = self.world.height + ASTEROID_CULL_MARGIN;
        self.asteroids.retain(|asteroid| asteroid.pos.y <= bottom);
    }

    /// Lethal contact test. The first asteroid touching `ship` is
    /// consumed by the collision and removed.
    pub fn check_player_hit(&mut self, ship: &Entity) -> bool {
        match self
            .asteroids
            .iter()
            .position(|asteroid| asteroid.intersects(ship))
        {
            Some(index) => {
                self.asteroids.remove(index);
                true
            }
            None => false,
        }
    }

    /// Missiles detonate on asteroids but never destroy them.
    pub fn check_missile_hit(&self, missile: &Entity) -> bool {
        self.asteroids
            .iter()
            .any(|asteroid| asteroid.intersects(missile))
    }

    pub fn submit(&self, sink: &mut dyn DrawSink) {
        for star in &self.stars {
            sink.submit(
                self.star_visual,
                star.pos,
                0,
                star.tint,
                0.0,
                Vec2::zeros(),
                1.0,
            );
        }
        for asteroid in &self.asteroids {
            asteroid.submit(sink);
        }
    }
}
