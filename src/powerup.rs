//! Falling power-up items. A power-up is an ordinary pooled entity
//! plus a kind tag; the tumble comes from the entity's `spin` field.

use crate::entity::Entity;
use crate::pool::PoolSlot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerupKind {
    FasterFire,
    FasterMove,
    Shield,
}

impl PowerupKind {
    pub fn from_index(index: usize) -> PowerupKind {
        match index {
            0 => PowerupKind::FasterFire,
            1 => PowerupKind::FasterMove,
            _ => PowerupKind::Shield,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Powerup {
    pub entity: Entity,
    pub kind: PowerupKind,
}

impl Powerup {
    pub fn new() -> Self {
        Self {
            entity: Entity::new(),
            kind: PowerupKind::FasterFire,
        }
    }
}

impl Default for Powerup {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolSlot for Powerup {
    fn is_free(&self) -> bool {
        self.entity.is_free()
    }

    fn reset(&mut self) {
        self.entity.reset();
    }
}
