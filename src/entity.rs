//! The entity primitive: a positioned, animated, collidable sprite.
//!
//! Every moving thing in the simulation is one of these. Variants that
//! used to warrant their own types (tumbling asteroids, self-hiding
//! explosions, spinning power-ups) are expressed through plain fields:
//! `spin` and `hide_on_animation_end`.

use std::f32::consts::TAU;
use std::time::Duration;

use nalgebra::Vector2;

use crate::interface::{DrawSink, VisualHandle};
use crate::pool::PoolSlot;
use crate::GameError;

pub type Vec2 = Vector2<f32>;

/// Total elapsed time plus the current frame's slice, shared by every
/// update in a tick. Deadlines are absolute comparisons against
/// `total`, so a known time sequence reproduces a run exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct GameTime {
    pub total: Duration,
    pub delta: Duration,
}

impl GameTime {
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Lifecycle state. Hidden entities are inert: no update, no draw, no
/// collision. Disabled entities animate and draw but never collide
/// (missile-explosion effects use this).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityState {
    Visible,
    Hidden,
    Disabled,
}

/// RGBA modulation applied at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Tint {
    pub const WHITE: Tint = Tint {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    pub fn grey(value: u8) -> Tint {
        Tint {
            r: value,
            g: value,
            b: value,
            a: 255,
        }
    }
}

/// Axis-aligned box in world pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Overlap test on centre distance: boxes intersect iff both centre
    /// deltas are smaller than the half-extent sums.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        (other.x + other.width / 2.0 - self.x - self.width / 2.0).abs()
            < (self.width + other.width) / 2.0
            && (other.y + other.height / 2.0 - self.y - self.height / 2.0).abs()
                < (self.height + other.height) / 2.0
    }

    /// Trim `amount` (a fraction in [0, 1)) off the box symmetrically,
    /// keeping it centred. Used to tighten hit detection relative to
    /// the sprite's visual bounds.
    pub fn shrink(mut self, amount: f32) -> BoundingBox {
        self.x += self.width * amount / 2.0;
        self.y += self.height * amount / 2.0;
        self.width *= 1.0 - amount;
        self.height *= 1.0 - amount;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub scale: f32,
    pub angle: f32,
    /// Radians per second added to `angle` each update.
    pub spin: f32,
    pub tint: Tint,
    pub state: EntityState,
    pub animation_fps: u32,
    /// When the animation wraps past its last frame, go Hidden.
    pub hide_on_animation_end: bool,
    /// Fraction of the bounding box trimmed before collision testing.
    pub shrink_factor: f32,
    visual: Option<VisualHandle>,
    frame: usize,
    total_frames: usize,
    frame_height: u32,
    last_frame_at: Duration,
}

impl Entity {
    /// A blank, hidden entity, typically a pool slot waiting for a
    /// visual.
    pub fn new() -> Self {
        Self {
            pos: Vec2::zeros(),
            velocity: Vec2::zeros(),
            scale: 1.0,
            angle: 0.0,
            spin: 0.0,
            tint: Tint::WHITE,
            state: EntityState::Hidden,
            animation_fps: 8,
            hide_on_animation_end: false,
            shrink_factor: 0.1,
            visual: None,
            frame: 0,
            total_frames: 1,
            frame_height: 0,
            last_frame_at: Duration::ZERO,
        }
    }

    /// A visible entity bound to `visual` from the start.
    pub fn with_visual(visual: VisualHandle, frames: usize) -> Result<Self, GameError> {
        let mut entity = Self::new();
        entity.init_visual(visual, frames)?;
        entity.state = EntityState::Visible;
        Ok(entity)
    }

    /// (Re)bind a visual and reset animation timing. The sheet is split
    /// into `frames` vertical strips.
    pub fn init_visual(&mut self, visual: VisualHandle, frames: usize) -> Result<(), GameError> {
        if frames < 1 {
            return Err(GameError::InvalidFrameCount);
        }
        self.frame_height = visual.height / frames as u32;
        self.visual = Some(visual);
        self.total_frames = frames;
        self.frame = 0;
        self.last_frame_at = Duration::ZERO;
        Ok(())
    }

    pub fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    fn bound_visual(&self) -> VisualHandle {
        match self.visual {
            Some(visual) => visual,
            None => panic!("no visual bound to this entity"),
        }
    }

    /// Scaled sprite width. Panics without a bound visual; that is an
    /// initialization-order bug, not a recoverable condition.
    pub fn width(&self) -> f32 {
        self.bound_visual().width as f32 * self.scale
    }

    /// Scaled height of one animation frame.
    pub fn height(&self) -> f32 {
        self.frame_height as f32 * self.scale
    }

    pub fn scale_to_width(&mut self, width: f32) {
        self.scale = width / self.bound_visual().width as f32;
    }

    pub fn scale_to_height(&mut self, height: f32) {
        self.scale = height / self.frame_height as f32;
    }

    pub fn hide(&mut self) {
        self.state = EntityState::Hidden;
    }

    pub fn is_visible(&self) -> bool {
        self.state == EntityState::Visible
    }

    /// Advance animation, spin and position by one frame slice. No-op
    /// while Hidden.
    pub fn update(&mut self, t: &GameTime) {
        if self.last_frame_at == Duration::ZERO {
            self.last_frame_at = t.total;
        }
        if self.state == EntityState::Hidden {
            return;
        }

        if self.total_frames > 1
            && t.total - self.last_frame_at
                > Duration::from_millis(u64::from(1000 / self.animation_fps))
        {
            self.frame = (self.frame + 1) % self.total_frames;
            self.last_frame_at = t.total;
            if self.frame == 0 && self.hide_on_animation_end {
                self.state = EntityState::Hidden;
            }
        }

        if self.spin != 0.0 {
            self.angle += self.spin * t.delta_secs();
            if self.angle > TAU {
                self.angle -= TAU;
            } else if self.angle < 0.0 {
                self.angle += TAU;
            }
        }

        self.pos += self.velocity * t.delta_secs();
    }

    /// Collision box: centred on the position, sized by the visual
    /// dimensions times scale, then trimmed by the shrink factor.
    pub fn bounds(&self) -> BoundingBox {
        let width = self.width();
        let height = self.height();
        BoundingBox {
            x: self.pos.x - width / 2.0,
            y: self.pos.y - height / 2.0,
            width,
            height,
        }
        .shrink(self.shrink_factor)
    }

    /// False unless both entities are Visible, regardless of overlap.
    pub fn intersects(&self, other: &Entity) -> bool {
        if self.state != EntityState::Visible || other.state != EntityState::Visible {
            return false;
        }
        self.bounds().intersects(&other.bounds())
    }

    /// One draw call when not Hidden.
    pub fn submit(&self, sink: &mut dyn DrawSink) {
        if self.state == EntityState::Hidden {
            return;
        }
        if let Some(visual) = self.visual {
            let origin = Vec2::new(visual.width as f32 / 2.0, self.frame_height as f32 / 2.0);
            sink.submit(
                visual, self.pos, self.frame, self.tint, self.angle, origin, self.scale,
            );
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolSlot for Entity {
    fn is_free(&self) -> bool {
        self.state == EntityState::Hidden
    }

    /// Clears transient motion state. Per-type presets (visual binding,
    /// scale, shrink factor, fps) survive, so pre-configured slots like
    /// missiles come back ready to fly.
    fn reset(&mut self) {
        self.velocity = Vec2::zeros();
        self.angle = 0.0;
        self.spin = 0.0;
        self.tint = Tint::WHITE;
        self.hide_on_animation_end = false;
        self.frame = 0;
        self.last_frame_at = Duration::ZERO;
    }
}
