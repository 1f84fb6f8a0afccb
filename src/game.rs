//! Host wiring
//!
//! Owns the session plus everything around it that touches the outside
//! world: the weapon animation bridge, the scoreboard and settings with their
//! store, and the wall clock used to date scores.

use crate::animation::{AnimationTriggerBridge, ClipPlayer, PlayToken};
use crate::highscores::{DEFAULT_NAME, ScoreEntry, ScoreLedger, sanitize_name};
use crate::persistence::KeyValueStore;
use crate::platform::Clock;
use crate::settings::Settings;
use crate::sim::{Command, FrameInput, GameEvent, GameSession, RunSummary};

pub struct Game<S: KeyValueStore, C: Clock> {
    session: GameSession,
    weapon: AnimationTriggerBridge,
    ledger: ScoreLedger,
    settings: Settings,
    store: S,
    clock: C,
    player_name: String,
    last_rank: Option<usize>,
}

impl<S: KeyValueStore, C: Clock> Game<S, C> {
    /// Wrap a session, loading scores and settings from `store`
    pub fn new(session: GameSession, store: S, clock: C) -> Self {
        let ledger = ScoreLedger::load(&store);
        let settings = Settings::load(&store);
        Self {
            session,
            weapon: AnimationTriggerBridge::new(),
            ledger,
            settings,
            store,
            clock,
            player_name: DEFAULT_NAME.to_string(),
            last_rank: None,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn weapon(&self) -> &AnimationTriggerBridge {
        &self.weapon
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rank of the most recently recorded run, if it made the board
    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = sanitize_name(name);
    }

    /// Change look sensitivity (clamped) and persist it
    pub fn set_sensitivity(&mut self, value: f32) -> f32 {
        let applied = self.settings.set_sensitivity(value);
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Failed to save settings: {}", e);
        }
        applied
    }

    /// Apply a discrete command; returns the events it produced
    pub fn command(&mut self, command: Command, player: &mut dyn ClipPlayer) -> Vec<GameEvent> {
        if matches!(command, Command::Start | Command::Restart) {
            // Settings are re-read at every session start
            self.settings = Settings::load(&self.store);
        }
        if !self.session.apply(command) {
            log::debug!("Ignored {:?} in {:?}", command, self.session.phase());
        }
        self.pump(player)
    }

    /// Run one frame; returns the events it produced
    pub fn frame(&mut self, input: &FrameInput, player: &mut dyn ClipPlayer) -> Vec<GameEvent> {
        self.session.update(input);
        self.pump(player)
    }

    /// Forward a finished one-shot from the animation player
    pub fn clip_finished(&mut self, token: PlayToken, player: &mut dyn ClipPlayer) {
        self.weapon.on_clip_finished(token, player);
    }

    fn pump(&mut self, player: &mut dyn ClipPlayer) -> Vec<GameEvent> {
        let events = self.session.drain_events();
        for event in &events {
            if let GameEvent::GameOver { summary, .. } = event {
                self.record_run(*summary);
            }
        }
        self.weapon.sync(self.session.weapon_signal(), player);
        events
    }

    fn record_run(&mut self, summary: RunSummary) {
        let entry = ScoreEntry::from_run(&self.player_name, summary, self.clock.now_ms());
        self.last_rank = self.ledger.record(entry);
        match self.last_rank {
            Some(rank) => log::info!(
                "Run ranked #{} ({}s, {} cubes)",
                rank,
                summary.time,
                summary.cubes
            ),
            None => log::info!("Run did not make the board"),
        }
        if let Err(e) = self.ledger.save(&mut self.store) {
            log::warn!("Failed to save high scores: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TimedClipPlayer;
    use crate::persistence::{MemoryStore, SENSITIVITY_KEY};
    use crate::platform::ManualClock;
    use crate::sim::{GamePhase, Viewpoint};

    fn game() -> Game<MemoryStore, ManualClock> {
        Game::new(
            GameSession::new(7),
            MemoryStore::new(),
            ManualClock::new(1_700_000_000_000.0),
        )
    }

    /// Step until the run ends (enemies always reach a stationary player)
    fn play_until_game_over(
        game: &mut Game<MemoryStore, ManualClock>,
        player: &mut TimedClipPlayer,
    ) -> Vec<GameEvent> {
        let look_away = FrameInput {
            dt: 0.05,
            viewpoint: Some(Viewpoint {
                forward: glam::Vec3::Y,
                ..Default::default()
            }),
        };
        let mut all = Vec::new();
        for _ in 0..2_000 {
            all.extend(game.frame(&look_away, player));
            if game.session().phase() == GamePhase::GameOver {
                break;
            }
        }
        all
    }

    #[test]
    fn test_game_over_records_and_persists_score() {
        let mut game = game();
        let mut player = TimedClipPlayer::standard();
        game.set_player_name("  Rook  ");
        game.command(Command::Start, &mut player);
        let events = play_until_game_over(&mut game, &mut player);

        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
        assert_eq!(game.last_rank(), Some(1));
        let top = game.ledger().top().unwrap();
        assert_eq!(top.name, "Rook");
        assert_eq!(top.time, game.session().survival_time_secs());
        assert_eq!(top.date, 1_700_000_000_000.0);

        let reloaded = ScoreLedger::load(game.store());
        assert_eq!(&reloaded, game.ledger());
    }

    #[test]
    fn test_sensitivity_clamped_and_persisted() {
        let mut game = game();
        assert_eq!(game.set_sensitivity(7.0), 2.0);
        assert_eq!(
            game.store().get(SENSITIVITY_KEY).unwrap().as_deref(),
            Some("2")
        );
    }

    #[test]
    fn test_illegal_command_produces_no_events() {
        let mut game = game();
        let mut player = TimedClipPlayer::standard();
        assert!(game.command(Command::Pause, &mut player).is_empty());
        assert_eq!(game.session().phase(), GamePhase::Menu);
    }

    #[test]
    fn test_restart_resets_weapon_to_idle() {
        let mut game = game();
        let mut player = TimedClipPlayer::standard();
        game.command(Command::Start, &mut player);
        play_until_game_over(&mut game, &mut player);
        game.command(Command::Restart, &mut player);

        assert_eq!(game.session().phase(), GamePhase::Playing);
        assert!(player.is_playing("idle"));
    }
}
