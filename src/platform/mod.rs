//! Platform abstraction layer
//!
//! Ports the simulation depends on instead of ambient globals:
//! - Seeded randomness for spawn placement
//! - Wall-clock time for score timestamps

pub mod rng;
pub mod time;

pub use rng::{RandomSource, SeededRng};
pub use time::{Clock, ManualClock, SystemClock};
