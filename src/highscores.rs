//! High score leaderboard system
//!
//! Persisted under `fps_scoreboard`, tracks the top 10 runs ranked by
//! survival time, then cubes destroyed.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, SCOREBOARD_KEY};
use crate::sim::RunSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;
/// Maximum player name length (characters)
pub const MAX_NAME_LEN: usize = 16;
/// Name used when the player leaves it blank
pub const DEFAULT_NAME: &str = "Anonymous";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Player name
    pub name: String,
    /// Seconds survived
    pub time: u32,
    /// Cubes destroyed
    pub cubes: u32,
    /// Unix timestamp (ms) when achieved
    pub date: f64,
}

impl ScoreEntry {
    /// Build an entry, normalizing the name (trimmed, ≤16 chars, default "Anonymous")
    pub fn new(name: &str, time: u32, cubes: u32, date: f64) -> Self {
        Self {
            name: sanitize_name(name),
            time,
            cubes,
            date,
        }
    }

    pub fn from_run(name: &str, run: RunSummary, date: f64) -> Self {
        Self::new(name, run.time, run.cubes, date)
    }

    /// True if `self` ranks strictly above `other`
    fn beats(&self, time: u32, cubes: u32) -> bool {
        (self.time, self.cubes) > (time, cubes)
    }
}

/// Trim and cap a player name, falling back to the default
pub fn sanitize_name(name: &str) -> String {
    let trimmed: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// High score leaderboard, stored as a plain JSON array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreLedger {
    entries: Vec<ScoreEntry>,
}

impl ScoreLedger {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Ranked entries, best first
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best entry (if any)
    pub fn top(&self) -> Option<&ScoreEntry> {
        self.entries.first()
    }

    /// Check if a run would make the leaderboard
    pub fn qualifies(&self, time: u32, cubes: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Ties with the last entry lose: stable sort keeps the older entry first
        self.entries
            .last()
            .map(|e| !e.beats(time, cubes) && (e.time, e.cubes) != (time, cubes))
            .unwrap_or(true)
    }

    /// Get the rank a run would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, time: u32, cubes: u32) -> Option<usize> {
        if !self.qualifies(time, cubes) {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .position(|e| !e.beats(time, cubes) && (e.time, e.cubes) != (time, cubes));
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Append an entry, re-rank, and keep the top 10.
    ///
    /// Returns the rank achieved (1-indexed) or None if it fell off the board.
    pub fn record(&mut self, entry: ScoreEntry) -> Option<usize> {
        self.entries.push(entry);
        let inserted = self.entries.len() - 1;

        // Stable sort: equal (time, cubes) keep insertion order
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            let (ea, eb) = (&self.entries[a], &self.entries[b]);
            (eb.time, eb.cubes).cmp(&(ea.time, ea.cubes))
        });
        let rank = order.iter().position(|&i| i == inserted).map(|p| p + 1);

        self.sort_and_truncate();
        rank.filter(|&r| r <= MAX_HIGH_SCORES)
    }

    fn sort_and_truncate(&mut self) {
        self.entries
            .sort_by(|a, b| (b.time, b.cubes).cmp(&(a.time, a.cubes)));
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// Load the leaderboard from the store.
    ///
    /// Missing, unreadable or corrupt data yields an empty leaderboard.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(Some(mut scores)) => {
                // Tolerate hand-edited or foreign data
                scores.sort_and_truncate();
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding unreadable high scores: {}", e);
                Self::new()
            }
        }
    }

    fn try_load(store: &dyn KeyValueStore) -> persistence::Result<Option<Self>> {
        match store.get(SCOREBOARD_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Save the leaderboard to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) -> persistence::Result<()> {
        let json = serde_json::to_string(self)?;
        store.set(SCOREBOARD_KEY, &json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Format a timestamp as a relative date string
pub fn format_date(timestamp: f64, now: f64) -> String {
    let diff_secs = (now - timestamp) / 1000.0;
    let diff_mins = diff_secs / 60.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}
