//! Live enemy set: steering, collision and cleanup
//!
//! Enemies are kept sorted by id (ids only ever grow), so every pass over the
//! field is in a stable, deterministic order.

use glam::Vec3;

use super::state::{Difficulty, Enemy};
use crate::step_toward;
use crate::tuning::EnemyTuning;

/// Result of advancing the field by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Every live enemy moved
    Clear,
    /// An enemy reached the player; the tick stopped there
    Collision { enemy_id: u32 },
    /// Field is frozen after an earlier collision; nothing ran
    Frozen,
}

#[derive(Debug, Clone)]
pub struct EnemyField {
    enemies: Vec<Enemy>,
    next_id: u32,
    frozen: bool,
}

impl Default for EnemyField {
    fn default() -> Self {
        Self::new()
    }
}

/// Current enemy speed for the given difficulty snapshot
pub fn enemy_speed(difficulty: Difficulty, tuning: &EnemyTuning) -> f32 {
    tuning.base_speed
        + difficulty.destroyed as f32 * tuning.speed_per_destroyed
        + difficulty.survival_secs as f32 * tuning.speed_per_second
}

impl EnemyField {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            next_id: 1,
            frozen: false,
        }
    }

    /// Add an enemy and return its id
    pub fn spawn(&mut self, position: Vec3, spawned_at: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.enemies.push(Enemy::new(id, position, spawned_at));
        id
    }

    /// Mark a live enemy destroyed. Returns false if it was unknown or already down.
    pub fn destroy(&mut self, id: u32) -> bool {
        match self.enemies.iter_mut().find(|e| e.id == id) {
            Some(enemy) if !enemy.destroyed => {
                enemy.destroyed = true;
                true
            }
            _ => false,
        }
    }

    /// Drop every destroyed enemy, returning how many were removed
    pub fn sweep(&mut self) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| !e.destroyed);
        before - self.enemies.len()
    }

    /// Remove everything and thaw. Ids keep counting up.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.frozen = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn get(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// All enemies, destroyed ones included, in id order
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    /// Enemies that can still move, collide and be targeted
    pub fn live(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| !e.destroyed)
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Advance every live enemy toward `player`.
    ///
    /// Each enemy is checked for collision before it is moved. The first one
    /// within range ends the tick: later enemies are neither checked nor moved
    /// and the field stays frozen until `clear`.
    pub fn advance(
        &mut self,
        player: Vec3,
        difficulty: Difficulty,
        tuning: &EnemyTuning,
        dt: f32,
    ) -> FieldOutcome {
        if self.frozen {
            return FieldOutcome::Frozen;
        }

        let step = enemy_speed(difficulty, tuning) * dt.max(0.0);
        for enemy in self.enemies.iter_mut().filter(|e| !e.destroyed) {
            if enemy.position.distance(player) < tuning.collision_distance {
                self.frozen = true;
                return FieldOutcome::Collision { enemy_id: enemy.id };
            }
            enemy.position = step_toward(enemy.position, player, step);
        }
        FieldOutcome::Clear
    }
}
