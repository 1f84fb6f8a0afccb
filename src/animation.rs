//! Weapon prop animation triggers
//!
//! Turns the session's per-frame `WeaponSignal` into named-clip requests for
//! an external animation player. The player itself (skinning, blending,
//! playback) lives outside this crate; it only has to look clips up, play and
//! stop them, and report back when a one-shot finishes.
//!
//! Controller rules:
//! - at most one one-shot (`hoverIn`, `hoverOut`, `press`) plays at a time;
//!   starting one stops the previous
//! - `press` is dropped, not queued, while a press is still playing
//! - hover edges arriving while a press plays are absorbed; the press runs to
//!   its end and hands over to `idle`
//! - when `hoverOut` or `press` finishes, `idle` resumes looping
//! - clips the asset doesn't have are skipped

use std::collections::HashMap;

use crate::sim::WeaponSignal;

/// Named clips the weapon prop understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clip {
    HoverIn,
    HoverOut,
    Press,
    Idle,
}

impl Clip {
    pub fn name(&self) -> &'static str {
        match self {
            Clip::HoverIn => "hoverIn",
            Clip::HoverOut => "hoverOut",
            Clip::Press => "press",
            Clip::Idle => "idle",
        }
    }

    pub fn mode(&self) -> PlayMode {
        match self {
            Clip::Idle => PlayMode::Loop,
            _ => PlayMode::Once,
        }
    }
}

/// How a clip should play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Play once and hold the final pose
    Once,
    /// Loop until stopped
    Loop,
}

/// Handed to the player with every play request and returned on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayToken {
    pub clip: Clip,
    pub epoch: u64,
    pub serial: u64,
}

/// The external animation player
pub trait ClipPlayer {
    fn has_clip(&self, name: &str) -> bool;
    fn play(&mut self, name: &str, mode: PlayMode, token: PlayToken);
    fn stop(&mut self, name: &str);
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimState {
    #[default]
    Idle,
    PlayingOneShot(Clip),
}

#[derive(Debug, Default)]
pub struct AnimationTriggerBridge {
    state: AnimState,
    /// One-shot currently owned by the controller
    active: Option<PlayToken>,
    idle_looping: bool,
    hovered: bool,
    press_seen: u32,
    epoch: u64,
    serial: u64,
    synced: bool,
}

impl AnimationTriggerBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AnimState {
        self.state
    }

    pub fn is_idle_looping(&self) -> bool {
        self.idle_looping
    }

    /// Feed this frame's weapon signal
    pub fn sync(&mut self, signal: WeaponSignal, player: &mut dyn ClipPlayer) {
        if !self.synced || signal.epoch != self.epoch {
            self.reset(signal, player);
        }

        if signal.hovered != self.hovered {
            self.hovered = signal.hovered;
            if self.state == AnimState::PlayingOneShot(Clip::Press) {
                // A kill drops the hover right after the click; let the press finish
                log::trace!("Hover edge absorbed by running press");
            } else {
                let clip = if signal.hovered {
                    Clip::HoverIn
                } else {
                    Clip::HoverOut
                };
                self.play_one_shot(clip, player);
            }
        }

        if signal.press_trigger != self.press_seen {
            self.press_seen = signal.press_trigger;
            if self.state == AnimState::PlayingOneShot(Clip::Press) {
                log::debug!("Press dropped: previous press still playing");
            } else {
                self.play_one_shot(Clip::Press, player);
            }
        }
    }

    /// The player reports a one-shot reached its end
    pub fn on_clip_finished(&mut self, token: PlayToken, player: &mut dyn ClipPlayer) {
        if token.epoch != self.epoch || self.active != Some(token) {
            log::trace!("Ignoring stale finish for {}", token.clip.name());
            return;
        }
        self.active = None;
        self.state = AnimState::Idle;
        if matches!(token.clip, Clip::HoverOut | Clip::Press) {
            self.play_idle(player);
        }
    }

    /// New session epoch: drop whatever was playing and settle into idle
    fn reset(&mut self, signal: WeaponSignal, player: &mut dyn ClipPlayer) {
        if let Some(token) = self.active.take() {
            player.stop(token.clip.name());
        }
        self.state = AnimState::Idle;
        self.epoch = signal.epoch;
        self.hovered = false;
        self.press_seen = signal.press_trigger;
        self.synced = true;
        self.play_idle(player);
    }

    fn next_token(&mut self, clip: Clip) -> PlayToken {
        self.serial += 1;
        PlayToken {
            clip,
            epoch: self.epoch,
            serial: self.serial,
        }
    }

    fn play_one_shot(&mut self, clip: Clip, player: &mut dyn ClipPlayer) {
        if !player.has_clip(clip.name()) {
            log::debug!("Clip '{}' missing, skipping", clip.name());
            return;
        }
        if let Some(current) = self.active.take() {
            player.stop(current.clip.name());
        }
        if self.idle_looping {
            player.stop(Clip::Idle.name());
            self.idle_looping = false;
        }

        let token = self.next_token(clip);
        player.play(clip.name(), clip.mode(), token);
        self.active = Some(token);
        self.state = AnimState::PlayingOneShot(clip);
    }

    fn play_idle(&mut self, player: &mut dyn ClipPlayer) {
        if self.idle_looping || !player.has_clip(Clip::Idle.name()) {
            return;
        }
        let token = self.next_token(Clip::Idle);
        player.play(Clip::Idle.name(), Clip::Idle.mode(), token);
        self.idle_looping = true;
    }
}

#[derive(Debug, Clone)]
struct Playback {
    name: String,
    mode: PlayMode,
    token: PlayToken,
    remaining: f32,
}

/// Reference player with fixed clip durations, advanced by frame deltas.
///
/// Good enough for headless runs and tests; real hosts wrap their engine's
/// animation mixer instead.
#[derive(Debug, Clone, Default)]
pub struct TimedClipPlayer {
    durations: HashMap<String, f32>,
    playing: Vec<Playback>,
}

impl TimedClipPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The weapon prop's usual clip set
    pub fn standard() -> Self {
        Self::new()
            .with_clip(Clip::HoverIn.name(), 0.25)
            .with_clip(Clip::HoverOut.name(), 0.25)
            .with_clip(Clip::Press.name(), 0.4)
            .with_clip(Clip::Idle.name(), 2.0)
    }

    pub fn with_clip(mut self, name: &str, duration: f32) -> Self {
        self.durations.insert(name.to_string(), duration.max(0.0));
        self
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.playing.iter().any(|p| p.name == name)
    }

    /// Names of clips currently running
    pub fn playing(&self) -> impl Iterator<Item = &str> {
        self.playing.iter().map(|p| p.name.as_str())
    }

    /// Advance playback; returns tokens of one-shots that finished
    pub fn advance(&mut self, dt: f32) -> Vec<PlayToken> {
        let mut finished = Vec::new();
        for playback in &mut self.playing {
            playback.remaining -= dt;
            if playback.mode == PlayMode::Loop {
                let length = self.durations.get(&playback.name).copied().unwrap_or(0.0);
                if length > 0.0 {
                    while playback.remaining <= 0.0 {
                        playback.remaining += length;
                    }
                }
            } else if playback.remaining <= 0.0 {
                finished.push(playback.token);
            }
        }
        self.playing
            .retain(|p| p.mode == PlayMode::Loop || p.remaining > 0.0);
        finished
    }
}

impl ClipPlayer for TimedClipPlayer {
    fn has_clip(&self, name: &str) -> bool {
        self.durations.contains_key(name)
    }

    fn play(&mut self, name: &str, mode: PlayMode, token: PlayToken) {
        let Some(&remaining) = self.durations.get(name) else {
            return;
        };
        self.playing.retain(|p| p.name != name);
        self.playing.push(Playback {
            name: name.to_string(),
            mode,
            token,
            remaining,
        });
    }

    fn stop(&mut self, name: &str) {
        self.playing.retain(|p| p.name != name);
    }
}
