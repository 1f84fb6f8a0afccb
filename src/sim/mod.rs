//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through frame deltas fed to the session
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod field;
pub mod scheduler;
pub mod session;
pub mod spawner;
pub mod state;
pub mod targeting;

pub use field::{EnemyField, FieldOutcome, enemy_speed};
pub use scheduler::{ScheduledTask, Scheduler, TaskKind};
pub use session::{FrameInput, GameSession, Viewpoint, WeaponSignal};
pub use spawner::{EnemySpawner, cubes_per_spawn, random_spawn_position, spawn_interval_ms};
pub use state::{Command, Difficulty, Enemy, GameEvent, GamePhase, RunSummary};
pub use targeting::{ButtonTarget, Ray, TargetHit, TargetResolver, ray_cube_distance};
