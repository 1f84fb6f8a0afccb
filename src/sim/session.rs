//! Game session state machine and per-frame tick
//!
//! Frame order while Playing:
//! 1. advance the scheduler clock and run due tasks (ticker, bursts, sweep)
//! 2. snapshot the difficulty counters
//! 3. move enemies / detect collision
//! 4. resolve the crosshair target
//!
//! Nothing advances outside Playing, so a pause freezes every timer where it
//! stands and a resume picks up from there.

use glam::Vec3;

use super::field::{EnemyField, FieldOutcome};
use super::scheduler::{ScheduledTask, Scheduler, TaskKind};
use super::spawner::EnemySpawner;
use super::state::{Command, Difficulty, GameEvent, GamePhase, RunSummary};
use super::targeting::{ButtonTarget, Ray, TargetHit, TargetResolver};
use crate::consts::{DEFAULT_EYE, DEFAULT_FORWARD};
use crate::platform::{RandomSource, SeededRng};
use crate::tuning::Tuning;

/// Where the player stands and looks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    /// Eye position; enemies steer toward it
    pub origin: Vec3,
    /// Crosshair direction
    pub forward: Vec3,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            origin: DEFAULT_EYE,
            forward: DEFAULT_FORWARD,
        }
    }
}

impl Viewpoint {
    pub fn ray(&self) -> Ray {
        Ray::new(self.origin, self.forward)
    }
}

/// Continuous input for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Seconds since the previous frame
    pub dt: f32,
    /// Camera pose, if it changed
    pub viewpoint: Option<Viewpoint>,
}

/// What the weapon prop's animation layer needs each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeaponSignal {
    pub hovered: bool,
    /// Increments once per click that hit something
    pub press_trigger: u32,
    pub epoch: u64,
}

pub struct GameSession {
    tuning: Tuning,
    phase: GamePhase,
    survival_time_secs: u32,
    destroyed_count: u32,
    session_started_at: f64,
    epoch: u64,
    scheduler: Scheduler,
    spawner: EnemySpawner,
    field: EnemyField,
    resolver: TargetResolver,
    button: ButtonTarget,
    viewpoint: Viewpoint,
    hover: TargetHit,
    press_trigger: u32,
    rng: Box<dyn RandomSource>,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Session with default tuning and a seeded RNG
    pub fn new(seed: u64) -> Self {
        Self::with_parts(Tuning::default(), Box::new(SeededRng::new(seed)))
    }

    /// Session with explicit tuning and RNG. A tuning table that fails
    /// [`Tuning::validate`] is replaced by the defaults.
    pub fn with_parts(tuning: Tuning, rng: Box<dyn RandomSource>) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Rejected tuning ({}), using defaults", e);
                Tuning::default()
            }
        };
        Self {
            spawner: EnemySpawner::new(tuning.spawn.clone()),
            resolver: TargetResolver::new(tuning.enemy.half_extent),
            tuning,
            phase: GamePhase::Menu,
            survival_time_secs: 0,
            destroyed_count: 0,
            session_started_at: 0.0,
            epoch: 0,
            scheduler: Scheduler::new(),
            field: EnemyField::new(),
            button: ButtonTarget::default(),
            viewpoint: Viewpoint::default(),
            hover: TargetHit::None,
            press_trigger: 0,
            rng,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn survival_time_secs(&self) -> u32 {
        self.survival_time_secs
    }

    pub fn destroyed_count(&self) -> u32 {
        self.destroyed_count
    }

    /// Scheduler time (ms) at which the current run entered Playing
    pub fn session_started_at(&self) -> f64 {
        self.session_started_at
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn enemies(&self) -> &EnemyField {
        &self.field
    }

    pub fn hover(&self) -> TargetHit {
        self.hover
    }

    pub fn viewpoint(&self) -> Viewpoint {
        self.viewpoint
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn button(&self) -> &ButtonTarget {
        &self.button
    }

    pub fn set_button_enabled(&mut self, enabled: bool) {
        self.button.enabled = enabled;
        if !enabled && self.hover == TargetHit::Button {
            self.hover = TargetHit::None;
        }
    }

    /// Counters of the current (or last) run
    pub fn run_summary(&self) -> RunSummary {
        RunSummary {
            time: self.survival_time_secs,
            cubes: self.destroyed_count,
        }
    }

    pub fn weapon_signal(&self) -> WeaponSignal {
        WeaponSignal {
            hovered: self.hover.is_some(),
            press_trigger: self.press_trigger,
            epoch: self.epoch,
        }
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply a discrete command. Returns false (and changes nothing) if it
    /// isn't legal in the current phase.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Restart => self.restart(),
            Command::ReturnToMenu => self.return_to_menu(),
            Command::Click => self.click(),
        }
    }

    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Menu {
            return false;
        }
        self.enter_playing();
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::Paused;
        self.events.push(GameEvent::Paused);
        log::info!("Paused at {}s", self.survival_time_secs);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Resumed);
        log::info!("Resumed");
        true
    }

    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.enter_playing();
        true
    }

    pub fn return_to_menu(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::Menu;
        self.hover = TargetHit::None;
        self.button.enabled = true;
        self.events.push(GameEvent::ReturnedToMenu);
        log::info!("Returned to menu");
        true
    }

    /// Resolve a click against the target hovered on the last frame.
    ///
    /// The button fires once, then stays disabled until the next visit to the
    /// menu.
    pub fn click(&mut self) -> bool {
        match (self.phase, self.hover) {
            (GamePhase::Menu | GamePhase::Playing, TargetHit::Button) if self.button.enabled => {
                self.set_button_enabled(false);
                self.press_trigger = self.press_trigger.wrapping_add(1);
                self.events.push(GameEvent::ButtonPressed);
                true
            }
            (GamePhase::Playing, TargetHit::Enemy(id)) => {
                if !self.field.destroy(id) {
                    return false;
                }
                self.destroyed_count += 1;
                self.press_trigger = self.press_trigger.wrapping_add(1);
                self.events.push(GameEvent::EnemyDestroyed { id });
                log::debug!("Destroyed enemy {} ({} total)", id, self.destroyed_count);
                true
            }
            _ => false,
        }
    }

    /// Advance one frame
    pub fn update(&mut self, input: &FrameInput) {
        let dt = if input.dt.is_finite() {
            input.dt.clamp(0.0, self.tuning.max_frame_dt)
        } else {
            0.0
        };
        if let Some(viewpoint) = input.viewpoint {
            self.viewpoint = viewpoint;
        }

        match self.phase {
            GamePhase::Playing => {
                self.run_due_tasks(dt);
                let difficulty = Difficulty {
                    destroyed: self.destroyed_count,
                    survival_secs: self.survival_time_secs,
                };
                let player = self.viewpoint.origin;
                let outcome = self.field.advance(player, difficulty, &self.tuning.enemy, dt);
                if let FieldOutcome::Collision { enemy_id } = outcome {
                    self.on_collision(enemy_id);
                    return;
                }
                self.hover = self
                    .resolver
                    .resolve(&self.viewpoint.ray(), &self.button, Some(&self.field));
            }
            GamePhase::Menu => {
                self.hover = self
                    .resolver
                    .resolve(&self.viewpoint.ray(), &self.button, None);
            }
            GamePhase::Paused | GamePhase::GameOver => {}
        }
    }

    fn enter_playing(&mut self) {
        self.epoch += 1;
        self.survival_time_secs = 0;
        self.destroyed_count = 0;
        self.field.clear();
        self.hover = TargetHit::None;
        // The button belongs to the menu; it would shadow enemies straight ahead
        self.button.enabled = false;
        self.phase = GamePhase::Playing;
        self.session_started_at = self.scheduler.now_ms();

        let epoch = self.epoch;
        self.scheduler
            .schedule(self.tuning.survival_tick_ms, epoch, TaskKind::SurvivalTick);
        self.scheduler
            .schedule(self.tuning.sweep_interval_ms, epoch, TaskKind::Sweep);
        self.events.push(GameEvent::SessionStarted { epoch });
        log::info!("Session started (epoch {})", epoch);

        // First burst goes out immediately
        let now = self.scheduler.now_ms();
        self.spawn_burst(now);
    }

    fn run_due_tasks(&mut self, dt: f32) {
        self.scheduler.advance(dt as f64 * 1000.0);
        while let Some(task) = self.scheduler.pop_due() {
            if task.epoch != self.epoch {
                log::trace!("Dropping stale {:?} from epoch {}", task.kind, task.epoch);
                continue;
            }
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: ScheduledTask) {
        match task.kind {
            TaskKind::SurvivalTick => {
                self.survival_time_secs += 1;
                self.events.push(GameEvent::SurvivalTick {
                    seconds: self.survival_time_secs,
                });
                self.scheduler.schedule_at(
                    task.due_ms + self.tuning.survival_tick_ms,
                    self.epoch,
                    TaskKind::SurvivalTick,
                );
            }
            TaskKind::SpawnBurst => self.spawn_burst(task.due_ms),
            TaskKind::Sweep => {
                let count = self.field.sweep();
                if count > 0 {
                    self.events.push(GameEvent::EnemiesSwept { count });
                }
                self.scheduler.schedule_at(
                    task.due_ms + self.tuning.sweep_interval_ms,
                    self.epoch,
                    TaskKind::Sweep,
                );
            }
        }
    }

    /// Fire a burst and queue the next one relative to `fired_at_ms`
    fn spawn_burst(&mut self, fired_at_ms: f64) {
        let t = self.survival_time_secs;
        let spawned = self
            .spawner
            .fire_burst(t, self.rng.as_mut(), &mut self.field);
        self.events.extend(
            spawned
                .into_iter()
                .map(|(id, position)| GameEvent::EnemySpawned { id, position }),
        );
        self.scheduler.schedule_at(
            fired_at_ms + self.spawner.interval_ms(t),
            self.epoch,
            TaskKind::SpawnBurst,
        );
    }

    fn on_collision(&mut self, enemy_id: u32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.hover = TargetHit::None;
        let summary = self.run_summary();
        self.events.push(GameEvent::GameOver { enemy_id, summary });
        log::info!(
            "Game over: enemy {} hit after {}s, {} cubes destroyed",
            enemy_id,
            summary.time,
            summary.cubes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SPAWN_MAX_INTERVAL_MS, SURVIVAL_TICK_MS};

    /// Frame size that keeps every enemy far from the player for a few seconds
    const DT: f32 = 0.05;

    fn frame(dt: f32) -> FrameInput {
        FrameInput {
            dt,
            viewpoint: None,
        }
    }

    fn run_secs(session: &mut GameSession, secs: f32) {
        let steps = (secs / DT).round() as u32;
        for _ in 0..steps {
            session.update(&frame(DT));
        }
    }

    fn count_game_overs(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count()
    }

    /// Crash the run by dropping enemies onto the player
    fn force_game_over(session: &mut GameSession, enemies: usize) {
        let eye = session.viewpoint.origin;
        for _ in 0..enemies {
            session.field.spawn(eye, 0.0);
        }
        session.update(&frame(DT));
    }

    #[test]
    fn test_initial_state() {
        let session = GameSession::new(1);
        assert_eq!(session.phase(), GamePhase::Menu);
        assert_eq!(session.survival_time_secs(), 0);
        assert_eq!(session.destroyed_count(), 0);
        assert!(session.enemies().is_empty());
    }

    #[test]
    fn test_start_fires_first_burst_immediately() {
        let mut session = GameSession::new(42);
        assert!(session.start());
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.enemies().len(), 1);

        let enemy = session.enemies().iter().next().unwrap();
        assert!((-2.0..=2.0).contains(&enemy.position.x));
        assert!((0.7..=2.2).contains(&enemy.position.y));
        assert!((-10.0..=-6.0).contains(&enemy.position.z));

        // A zero-length frame fires nothing new
        session.update(&frame(0.0));
        assert_eq!(session.enemies().len(), 1);
    }

    #[test]
    fn test_next_burst_after_max_interval() {
        let mut session = GameSession::new(3);
        session.start();
        run_secs(&mut session, (SPAWN_MAX_INTERVAL_MS / 1000.0) as f32 - 0.1);
        assert_eq!(session.enemies().len(), 1);
        run_secs(&mut session, 0.2);
        assert_eq!(session.enemies().len(), 2);
    }

    #[test]
    fn test_survival_ticker_counts_seconds() {
        let mut session = GameSession::new(5);
        session.start();
        run_secs(&mut session, 2.5);
        assert_eq!(session.survival_time_secs(), 2);
    }

    #[test]
    fn test_illegal_commands_are_noops() {
        let mut session = GameSession::new(1);
        assert!(!session.pause());
        assert!(!session.resume());
        assert!(!session.restart());
        assert!(!session.return_to_menu());
        assert!(!session.click());
        assert_eq!(session.phase(), GamePhase::Menu);

        session.start();
        assert!(!session.start());
        assert!(!session.restart());
        assert!(!session.return_to_menu());
        assert_eq!(session.phase(), GamePhase::Playing);

        session.pause();
        assert!(!session.pause());
        assert!(!session.start());
        assert_eq!(session.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut session = GameSession::new(9);
        session.start();
        run_secs(&mut session, 1.5);
        let survived = session.survival_time_secs();
        let positions: Vec<Vec3> = session.enemies().iter().map(|e| e.position).collect();

        assert!(session.pause());
        // Wall-clock passes but nothing runs
        for _ in 0..100 {
            session.update(&frame(0.1));
        }
        assert_eq!(session.survival_time_secs(), survived);
        let frozen: Vec<Vec3> = session.enemies().iter().map(|e| e.position).collect();
        assert_eq!(positions, frozen);

        // Resuming with a huge delta does not catch up the paused time
        assert!(session.resume());
        session.update(&frame(30.0));
        assert_eq!(session.survival_time_secs(), survived);
    }

    #[test]
    fn test_resume_continues_frozen_timer() {
        let mut session = GameSession::new(11);
        session.start();
        run_secs(&mut session, 0.6);
        session.pause();
        session.update(&frame(5.0));
        session.resume();
        // 0.6s was banked before the pause; the first tick is 0.4s away
        run_secs(&mut session, 0.3);
        assert_eq!(session.survival_time_secs(), 0);
        run_secs(&mut session, 0.2);
        assert_eq!(session.survival_time_secs(), 1);
    }

    #[test]
    fn test_collision_reported_once() {
        let mut session = GameSession::new(21);
        session.start();
        session.drain_events();

        force_game_over(&mut session, 2);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(count_game_overs(&session.drain_events()), 1);

        // Nothing further happens in GameOver
        let eye = session.viewpoint.origin;
        session.field.spawn(eye, 0.0);
        session.update(&frame(DT));
        session.on_collision(1);
        assert_eq!(count_game_overs(&session.drain_events()), 0);
        assert_eq!(session.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_game_over_stops_ticker_and_spawns() {
        let mut session = GameSession::new(22);
        session.start();
        run_secs(&mut session, 1.1);
        force_game_over(&mut session, 1);
        let survived = session.survival_time_secs();
        let count = session.enemies().len();

        run_secs(&mut session, 5.0);
        assert_eq!(session.survival_time_secs(), survived);
        assert_eq!(session.enemies().len(), count);
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut session = GameSession::new(23);
        session.start();
        run_secs(&mut session, 2.1);
        session.destroyed_count = 4;
        force_game_over(&mut session, 1);
        assert_eq!(session.run_summary(), RunSummary { time: 2, cubes: 4 });

        let old_epoch = session.epoch();
        assert!(session.restart());
        assert_eq!(session.epoch(), old_epoch + 1);
        assert_eq!(session.survival_time_secs(), 0);
        assert_eq!(session.destroyed_count(), 0);
        assert_eq!(session.enemies().len(), 1);
    }

    #[test]
    fn test_stale_spawn_never_lands_after_restart() {
        let mut session = GameSession::new(31);
        session.start();
        // Old burst is now due ~900ms from here
        run_secs(&mut session, 0.3);
        force_game_over(&mut session, 1);
        let old_epoch = session.epoch();
        assert_eq!(session.scheduler().pending_for(old_epoch, TaskKind::SpawnBurst), 1);

        session.restart();
        let after_restart = session.enemies().len();
        assert_eq!(after_restart, 1);

        // Past the stale burst's due time, before the new one's
        run_secs(&mut session, 1.0);
        assert_eq!(session.enemies().len(), after_restart);
        assert_eq!(session.scheduler().pending_for(old_epoch, TaskKind::SpawnBurst), 0);

        // New epoch's ticker drives the clock, not the stale one
        assert_eq!(session.survival_time_secs(), 1);
    }

    #[test]
    fn test_stale_ticker_does_not_double_count() {
        let mut session = GameSession::new(32);
        session.start();
        run_secs(&mut session, 0.5);
        force_game_over(&mut session, 1);
        session.restart();

        // Stale tick comes due first and must be dropped
        run_secs(&mut session, 0.8);
        assert_eq!(session.survival_time_secs(), 0);
        run_secs(&mut session, 0.25);
        assert_eq!(session.survival_time_secs(), 1);
    }

    #[test]
    fn test_click_destroys_hovered_enemy_only() {
        let mut session = GameSession::new(40);
        session.start();
        let eye = session.viewpoint.origin;
        let target = session.field.spawn(eye + Vec3::new(0.0, 0.0, -5.0), 0.0);
        let bystander = session.field.spawn(Vec3::new(2.0, 2.0, -9.0), 0.0);

        session.update(&frame(0.0));
        assert_eq!(session.hover(), TargetHit::Enemy(target));

        assert!(session.click());
        assert_eq!(session.destroyed_count(), 1);
        assert!(session.enemies().get(target).unwrap().destroyed);
        assert!(!session.enemies().get(bystander).unwrap().destroyed);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.weapon_signal().press_trigger, 1);

        // Re-click before the next frame cannot double count
        assert!(!session.click());
        assert_eq!(session.destroyed_count(), 1);
    }

    #[test]
    fn test_click_on_nothing_is_noop() {
        let mut session = GameSession::new(41);
        session.start();
        session.update(&FrameInput {
            dt: 0.0,
            viewpoint: Some(Viewpoint {
                origin: DEFAULT_EYE,
                forward: Vec3::Y,
            }),
        });
        assert_eq!(session.hover(), TargetHit::None);
        assert!(!session.click());
        assert_eq!(session.destroyed_count(), 0);
        assert_eq!(session.weapon_signal().press_trigger, 0);
    }

    #[test]
    fn test_menu_button_hover_and_click() {
        let mut session = GameSession::new(42);
        session.update(&frame(0.0));
        assert_eq!(session.hover(), TargetHit::Button);
        assert!(session.weapon_signal().hovered);
        assert!(session.click());
        assert_eq!(session.drain_events(), vec![GameEvent::ButtonPressed]);

        // The button fires once and is no longer a target
        assert!(!session.button().enabled);
        assert!(!session.click());
        session.update(&frame(0.0));
        assert_eq!(session.hover(), TargetHit::None);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_button_hidden_while_playing() {
        let mut session = GameSession::new(43);
        session.start();
        assert!(!session.button().enabled);

        // An enemy behind the button's spot is still targetable
        let eye = session.viewpoint.origin;
        let behind = session.field.spawn(eye + Vec3::new(0.0, 0.0, -5.5), 0.0);
        session.update(&frame(0.0));
        assert_eq!(session.hover(), TargetHit::Enemy(behind));

        force_game_over(&mut session, 1);
        assert!(session.return_to_menu());
        assert!(session.button().enabled);
        session.update(&frame(0.0));
        assert_eq!(session.hover(), TargetHit::Button);
    }

    #[test]
    fn test_speed_uses_post_tick_snapshot() {
        let mut tuning = Tuning::default();
        tuning.spawn.max_interval_ms = 1.0e9;
        let mut session = GameSession::with_parts(tuning, Box::new(SeededRng::new(50)));
        session.start();
        let id = session.enemies().iter().next().unwrap().id;

        // Advance to just before the first tick, then across it in one frame
        let pre_steps = ((SURVIVAL_TICK_MS / 1000.0) as f32 / DT).round() as u32 - 1;
        for _ in 0..pre_steps {
            session.update(&frame(DT));
        }
        let before = session.enemies().get(id).unwrap().position;
        session.update(&frame(DT));
        assert_eq!(session.survival_time_secs(), 1);
        let after = session.enemies().get(id).unwrap().position;

        let expected = (1.2 + 0.07) * DT;
        assert!((before.distance(after) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_tuning_falls_back_to_defaults() {
        let mut tuning = Tuning::default();
        tuning.max_frame_dt = -1.0;
        tuning.survival_tick_ms = 0.0;
        let mut session = GameSession::with_parts(tuning, Box::new(SeededRng::new(51)));
        assert_eq!(session.tuning(), &Tuning::default());

        // Frames run and return; the ticker keeps its normal cadence
        session.start();
        run_secs(&mut session, 1.05);
        assert_eq!(session.survival_time_secs(), 1);
    }

    #[test]
    fn test_sweep_removes_destroyed() {
        let mut session = GameSession::new(60);
        session.start();
        let id = session.enemies().iter().next().unwrap().id;
        session.field.destroy(id);
        run_secs(&mut session, 1.6);
        assert!(session.enemies().get(id).is_none());
        assert!(
            session
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::EnemiesSwept { count: 1 }))
        );
    }

    #[test]
    fn test_return_to_menu_keeps_counters() {
        let mut session = GameSession::new(70);
        session.start();
        run_secs(&mut session, 1.05);
        force_game_over(&mut session, 1);
        assert!(session.return_to_menu());
        assert_eq!(session.phase(), GamePhase::Menu);
        assert_eq!(session.survival_time_secs(), 1);

        assert!(session.apply(Command::Start));
        assert_eq!(session.survival_time_secs(), 0);
    }
}
