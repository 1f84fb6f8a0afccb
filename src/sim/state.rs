//! Game state and core simulation types

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Title screen, nothing simulated
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused, everything frozen
    Paused,
    /// Run ended by a collision
    GameOver,
}

/// Discrete input commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Restart,
    ReturnToMenu,
    Click,
}

/// A cube converging on the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub position: Vec3,
    /// Shot down; kept around until the next sweep so fade-outs can run
    pub destroyed: bool,
    /// Survival time (seconds) at which it spawned
    pub spawned_at: f32,
}

impl Enemy {
    pub fn new(id: u32, position: Vec3, spawned_at: f32) -> Self {
        Self {
            id,
            position,
            destroyed: false,
            spawned_at,
        }
    }
}

/// Session counters the enemy field scales its speed with.
///
/// Taken as one snapshot per frame after all periodic tasks have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Difficulty {
    pub destroyed: u32,
    pub survival_secs: u32,
}

/// Final counters of a run, handed to the score ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Seconds survived
    pub time: u32,
    /// Cubes destroyed
    pub cubes: u32,
}

/// Things that happened during a command or frame, in order
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SessionStarted { epoch: u64 },
    Paused,
    Resumed,
    SurvivalTick { seconds: u32 },
    EnemySpawned { id: u32, position: Vec3 },
    EnemyDestroyed { id: u32 },
    EnemiesSwept { count: usize },
    ButtonPressed,
    GameOver { enemy_id: u32, summary: RunSummary },
    ReturnedToMenu,
}
