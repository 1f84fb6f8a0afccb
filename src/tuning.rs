//! Data-driven game balance
//!
//! Every knob defaults to the value in [`crate::consts`]. A partial JSON
//! document overrides only the fields it names. Documents that would stall or
//! break the session (zero periods, negative frame caps, NaN anywhere) are
//! rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Why a tuning document was refused
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tuning field `{field}` must be {rule}, got {value}")]
    OutOfRange {
        field: &'static str,
        rule: &'static str,
        value: f64,
    },
}

fn positive(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            field,
            rule: "finite and > 0",
            value,
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            field,
            rule: "finite and >= 0",
            value,
        })
    }
}

fn ordered(field: &'static str, (lo, hi): (f32, f32)) -> Result<(), TuningError> {
    if lo.is_finite() && hi.is_finite() && lo <= hi {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            field,
            rule: "a finite [lo, hi] pair with lo <= hi",
            value: f64::from(hi - lo),
        })
    }
}

/// Spawn cadence and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub max_interval_ms: f64,
    pub min_interval_ms: f64,
    pub ramp_secs: f64,
    pub secs_per_extra_cube: u32,
    pub x_range: (f32, f32),
    pub y_range: (f32, f32),
    pub z_range: (f32, f32),
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            max_interval_ms: SPAWN_MAX_INTERVAL_MS,
            min_interval_ms: SPAWN_MIN_INTERVAL_MS,
            ramp_secs: SPAWN_RAMP_SECS,
            secs_per_extra_cube: SECS_PER_EXTRA_CUBE,
            x_range: SPAWN_X_RANGE,
            y_range: SPAWN_Y_RANGE,
            z_range: SPAWN_Z_RANGE,
        }
    }
}

/// Enemy motion and collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub base_speed: f32,
    pub speed_per_destroyed: f32,
    pub speed_per_second: f32,
    pub collision_distance: f32,
    pub half_extent: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            base_speed: ENEMY_BASE_SPEED,
            speed_per_destroyed: SPEED_PER_DESTROYED,
            speed_per_second: SPEED_PER_SECOND,
            collision_distance: COLLISION_DISTANCE,
            half_extent: ENEMY_HALF_EXTENT,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub spawn: SpawnTuning,
    pub enemy: EnemyTuning,
    pub survival_tick_ms: f64,
    pub sweep_interval_ms: f64,
    pub max_frame_dt: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn: SpawnTuning::default(),
            enemy: EnemyTuning::default(),
            survival_tick_ms: SURVIVAL_TICK_MS,
            sweep_interval_ms: SWEEP_INTERVAL_MS,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl Tuning {
    /// Parse and validate a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check every knob the session relies on for progress
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("survival_tick_ms", self.survival_tick_ms)?;
        positive("sweep_interval_ms", self.sweep_interval_ms)?;
        non_negative("max_frame_dt", f64::from(self.max_frame_dt))?;

        let spawn = &self.spawn;
        positive("spawn.max_interval_ms", spawn.max_interval_ms)?;
        positive("spawn.min_interval_ms", spawn.min_interval_ms)?;
        non_negative("spawn.ramp_secs", spawn.ramp_secs)?;
        ordered("spawn.x_range", spawn.x_range)?;
        ordered("spawn.y_range", spawn.y_range)?;
        ordered("spawn.z_range", spawn.z_range)?;

        let enemy = &self.enemy;
        non_negative("enemy.base_speed", f64::from(enemy.base_speed))?;
        non_negative("enemy.speed_per_destroyed", f64::from(enemy.speed_per_destroyed))?;
        non_negative("enemy.speed_per_second", f64::from(enemy.speed_per_second))?;
        non_negative("enemy.collision_distance", f64::from(enemy.collision_distance))?;
        positive("enemy.half_extent", f64::from(enemy.half_extent))?;
        Ok(())
    }
}
