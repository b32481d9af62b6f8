//! Per-level static configuration. The catalog is 1-indexed and
//! immutable; an out-of-range index is a configuration error the
//! simulation cannot recover from.

use crate::GameError;

#[derive(Clone, Copy, Debug)]
pub struct LevelData {
    /// Ceiling on concurrent ambient asteroids.
    pub max_asteroids: usize,
    pub rows: usize,
    pub columns: usize,
    /// Initial horizontal group speed in px/s.
    pub start_speed: f32,
    /// Ceiling on concurrent enemy shots.
    pub max_enemy_shots: usize,
    /// Percent chance per alive enemy per frame of firing.
    pub shot_prob: u32,
    /// Base downward shot speed in px/s (jitter is added on top).
    pub shot_speed: f32,
    /// Enemy class per row, top to bottom; indexes `ENEMY_TYPES`.
    pub enemy_rows: &'static [usize],
}

pub const LEVELS: &[LevelData] = &[
    LevelData {
        max_asteroids: 1,
        rows: 3,
        columns: 6,
        start_speed: 50.0,
        max_enemy_shots: 3,
        shot_prob: 5,
        shot_speed: 50.0,
        enemy_rows: &[0, 1, 0],
    },
    LevelData {
        max_asteroids: 2,
        rows: 3,
        columns: 8,
        start_speed: 55.0,
        max_enemy_shots: 3,
        shot_prob: 5,
        shot_speed: 50.0,
        enemy_rows: &[0, 1, 1],
    },
    LevelData {
        max_asteroids: 2,
        rows: 3,
        columns: 9,
        start_speed: 60.0,
        max_enemy_shots: 3,
        shot_prob: 5,
        shot_speed: 50.0,
        enemy_rows: &[2, 0, 1],
    },
    LevelData {
        max_asteroids: 2,
        rows: 4,
        columns: 7,
        start_speed: 70.0,
        max_enemy_shots: 3,
        shot_prob: 5,
        shot_speed: 50.0,
        enemy_rows: &[0, 1, 2, 1],
    },
    LevelData {
        max_asteroids: 3,
        rows: 4,
        columns: 9,
        start_speed: 75.0,
        max_enemy_shots: 3,
        shot_prob: 5,
        shot_speed: 50.0,
        enemy_rows: &[1, 2, 1, 2],
    },
    LevelData {
        max_asteroids: 3,
        rows: 5,
        columns: 8,
        start_speed: 80.0,
        max_enemy_shots: 3,
        shot_prob: 5,
        shot_speed: 50.0,
        enemy_rows: &[1, 2, 1, 2, 0],
    },
];

/// Look up a level by its 1-based index.
pub fn level_data(level: usize) -> Result<&'static LevelData, GameError> {
    if level == 0 {
        return Err(GameError::UnknownLevel(level));
    }
    LEVELS.get(level - 1).ok_or(GameError::UnknownLevel(level))
}
