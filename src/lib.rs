//! Cube Survival - first-person "survive and destroy" game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (session state machine, spawning, enemy field, targeting)
//! - `animation`: Weapon prop clip triggers toward an external animation player
//! - `platform`: RNG and clock ports
//! - `persistence`: Key-value store backends (memory, file, LocalStorage)
//! - `tuning`: Data-driven game balance
//! - `game`: Host wiring of session, animation, scores and settings

pub mod animation;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use highscores::{ScoreEntry, ScoreLedger};
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Largest frame delta the session will simulate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Survival ticker period
    pub const SURVIVAL_TICK_MS: f64 = 1000.0;
    /// Period of the destroyed-enemy sweep
    pub const SWEEP_INTERVAL_MS: f64 = 1500.0;

    /// Spawn cadence: slowest interval between bursts (t = 0)
    pub const SPAWN_MAX_INTERVAL_MS: f64 = 1200.0;
    /// Spawn cadence: fastest interval between bursts (t >= ramp)
    pub const SPAWN_MIN_INTERVAL_MS: f64 = 350.0;
    /// Seconds over which the interval ramps from max to min
    pub const SPAWN_RAMP_SECS: f64 = 30.0;
    /// Seconds of survival per extra cube in a burst
    pub const SECS_PER_EXTRA_CUBE: u32 = 15;

    /// Spawn volume, relative to the play origin (never behind the player)
    pub const SPAWN_X_RANGE: (f32, f32) = (-2.0, 2.0);
    pub const SPAWN_Y_RANGE: (f32, f32) = (0.7, 2.2);
    pub const SPAWN_Z_RANGE: (f32, f32) = (-10.0, -6.0);

    /// Enemy speed = base + destroyed * k1 + survival * k2
    pub const ENEMY_BASE_SPEED: f32 = 1.2;
    pub const SPEED_PER_DESTROYED: f32 = 0.08;
    pub const SPEED_PER_SECOND: f32 = 0.07;
    /// Distance to the player below which an enemy ends the run
    pub const COLLISION_DISTANCE: f32 = 0.7;
    /// Half edge length of an enemy cube (for ray picking)
    pub const ENEMY_HALF_EXTENT: f32 = 0.25;

    /// Default viewpoint: eye height at the play origin, looking down -Z
    pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 1.6, 0.0);
    pub const DEFAULT_FORWARD: Vec3 = Vec3::NEG_Z;

    /// Menu button cube placement
    pub const BUTTON_CENTER: Vec3 = Vec3::new(0.0, 1.6, -3.0);
    pub const BUTTON_HALF_EXTENT: f32 = 0.3;

    /// Look sensitivity bounds
    pub const MIN_SENSITIVITY: f32 = 0.2;
    pub const MAX_SENSITIVITY: f32 = 2.0;
    pub const DEFAULT_SENSITIVITY: f32 = 1.0;
}

/// Move `from` toward `to` by at most `max_step`, never past it
#[inline]
pub fn step_toward(from: Vec3, to: Vec3, max_step: f32) -> Vec3 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= max_step || dist <= f32::EPSILON {
        to
    } else {
        from + delta / dist * max_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_toward_partial() {
        let p = step_toward(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 2.5);
        assert!((p.x - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_step_toward_does_not_overshoot() {
        let target = Vec3::new(0.0, 1.0, -1.0);
        let p = step_toward(Vec3::new(0.0, 1.0, -1.2), target, 5.0);
        assert_eq!(p, target);
    }
}
