//! Enemy spawning and difficulty curve
//!
//! Bursts speed up linearly over the first 30 seconds, then plateau, while
//! burst size keeps growing by one cube every 15 seconds.

use glam::Vec3;

use super::field::EnemyField;
use crate::platform::RandomSource;
use crate::tuning::SpawnTuning;

/// Milliseconds between bursts after surviving `t` seconds
pub fn spawn_interval_ms(t: u32, tuning: &SpawnTuning) -> f64 {
    let ramp = if tuning.ramp_secs > 0.0 {
        (t as f64 / tuning.ramp_secs).min(1.0)
    } else {
        1.0
    };
    tuning.max_interval_ms - (tuning.max_interval_ms - tuning.min_interval_ms) * ramp
}

/// Cubes per burst after surviving `t` seconds
pub fn cubes_per_spawn(t: u32, tuning: &SpawnTuning) -> u32 {
    1 + t.checked_div(tuning.secs_per_extra_cube).unwrap_or(0)
}

/// Uniform position inside the spawn volume
pub fn random_spawn_position(rng: &mut dyn RandomSource, tuning: &SpawnTuning) -> Vec3 {
    let x = rng.range_f32(tuning.x_range.0, tuning.x_range.1);
    let y = rng.range_f32(tuning.y_range.0, tuning.y_range.1);
    let z = rng.range_f32(tuning.z_range.0, tuning.z_range.1);
    Vec3::new(x, y, z)
}

#[derive(Debug, Clone, Default)]
pub struct EnemySpawner {
    tuning: SpawnTuning,
    bursts_fired: u64,
}

impl EnemySpawner {
    pub fn new(tuning: SpawnTuning) -> Self {
        Self {
            tuning,
            bursts_fired: 0,
        }
    }

    pub fn tuning(&self) -> &SpawnTuning {
        &self.tuning
    }

    /// Total bursts fired over the spawner's lifetime
    pub fn bursts_fired(&self) -> u64 {
        self.bursts_fired
    }

    /// Interval until the burst after one fired at survival time `t`
    pub fn interval_ms(&self, t: u32) -> f64 {
        spawn_interval_ms(t, &self.tuning)
    }

    /// Spawn one burst into `field`. Returns `(id, position)` of each new enemy.
    pub fn fire_burst(
        &mut self,
        survival_secs: u32,
        rng: &mut dyn RandomSource,
        field: &mut EnemyField,
    ) -> Vec<(u32, Vec3)> {
        let count = cubes_per_spawn(survival_secs, &self.tuning);
        self.bursts_fired += 1;
        (0..count)
            .map(|_| {
                let position = random_spawn_position(rng, &self.tuning);
                let id = field.spawn(position, survival_secs as f32);
                log::debug!("Spawned enemy {} at {:?}", id, position);
                (id, position)
            })
            .collect()
    }
}
