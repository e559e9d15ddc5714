//! Animation-frame driver
//!
//! Owns the session and turns host callbacks (frames, keys, pointer, commands)
//! into simulation calls. The driver keeps at most one frame request
//! outstanding, cancels it when the game stops needing frames, and publishes
//! elapsed time in 100 ms chunks.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{
    Direction, GameEvent, GameState, PlayField, RoundPhase, SmoothedPursuit, SteeringPolicy,
    effects, scoring, tick,
};
use crate::snapshot::Snapshot;
use crate::tuning::Tuning;

/// Token for a requested animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host frame callback registration (`requestAnimationFrame` and friends)
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler for hosts that poll: the host asks whether a frame is wanted
/// and calls [`Driver::on_frame`] itself
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    outstanding: Option<FrameHandle>,
    pub requested: u64,
    pub cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outstanding(&self) -> Option<FrameHandle> {
        self.outstanding
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.outstanding = Some(handle);
        self.requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
            self.cancelled += 1;
        }
    }
}

/// Discrete host commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    TogglePause,
    ResetRound,
    ResetGame { auto_start: bool },
    TriggerAbility,
    /// Space bar: start, restart or reset depending on the phase
    PrimaryAction,
}

impl Command {
    /// Map a DOM `KeyboardEvent.key` name
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " => Some(Command::PrimaryAction),
            "p" | "P" => Some(Command::TogglePause),
            "l" | "L" => Some(Command::TriggerAbility),
            _ => None,
        }
    }
}

pub struct Driver<S: FrameScheduler> {
    state: GameState,
    steering: Box<dyn SteeringPolicy>,
    scheduler: S,
    pending_frame: Option<FrameHandle>,
    /// Timestamp of the previous frame; `None` makes the next frame's delta zero
    last_timestamp: Option<f64>,
    elapsed_bucket: f32,
    /// Latest dimensions reported by the host
    host_field: PlayField,
    store: Box<dyn KeyValueStore>,
    high_score: HighScore,
    settings: Settings,
    events: Vec<GameEvent>,
}

impl<S: FrameScheduler> Driver<S> {
    pub fn new(scheduler: S, store: Box<dyn KeyValueStore>, tuning: Tuning, seed: u64) -> Self {
        let high_score = HighScore::load(store.as_ref());
        let settings = Settings::load(store.as_ref());

        let mut state = GameState::new(seed, tuning, PlayField::default());
        state.high_score_ms = high_score.best_ms;
        log::info!("Session created with seed {}", seed);

        Self {
            state,
            steering: Box::new(SmoothedPursuit),
            scheduler,
            pending_frame: None,
            last_timestamp: None,
            elapsed_bucket: 0.0,
            host_field: PlayField::default(),
            store,
            high_score,
            settings,
            events: Vec::new(),
        }
    }

    /// Same as [`Driver::new`] with a seed drawn from OS entropy
    pub fn with_entropy(scheduler: S, store: Box<dyn KeyValueStore>, tuning: Tuning) -> Self {
        let seed = rand::rng().random::<u64>();
        Self::new(scheduler, store, tuning, seed)
    }

    pub fn with_steering(mut self, steering: Box<dyn SteeringPolicy>) -> Self {
        self.steering = steering;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn high_score(&self) -> HighScore {
        self.high_score
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn complete_tutorial(&mut self) {
        if !self.settings.tutorial_seen {
            self.settings.complete_tutorial();
            self.settings.save(self.store.as_mut());
        }
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Record the host's room size. Applied at the next reset, or right away
    /// if no usable field has been latched yet.
    pub fn set_play_field(&mut self, width: f32, height: f32) {
        self.host_field = PlayField::new(width, height);
        if self.state.field.is_degenerate() || self.state.phase == RoundPhase::Ready {
            if self.latch_field() {
                scoring::reset_round(&mut self.state);
            }
        }
    }

    /// Host animation callback
    pub fn on_frame(&mut self, now_ms: f64) {
        self.pending_frame = None;
        if !self.state.phase.wants_frames() {
            self.last_timestamp = None;
            return;
        }

        // Host not laid out yet: try again next frame
        if self.state.field.is_degenerate() {
            if !self.latch_field() {
                log::trace!("Waiting for a play field");
                self.request_frame();
                return;
            }
            scoring::reset_round(&mut self.state);
        }

        let dt = match self.last_timestamp {
            Some(last) if now_ms > last => (now_ms - last) as f32,
            _ => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        if self.state.phase == RoundPhase::Running {
            self.elapsed_bucket += dt;
            if self.elapsed_bucket >= ELAPSED_PUBLISH_MS {
                self.state.elapsed_ms += self.elapsed_bucket;
                self.elapsed_bucket = 0.0;
            }
        }

        tick(&mut self.state, dt, self.steering.as_ref());

        if self.state.phase == RoundPhase::GameOver {
            self.flush_elapsed();
            self.record_high_score();
        }
        self.collect_events();

        if self.state.phase.wants_frames() {
            self.request_frame();
        }
    }

    /// Returns true if the key belongs to the game
    pub fn key_down(&mut self, key: &str) -> bool {
        if let Some(command) = Command::from_key(key) {
            self.command(command);
            return true;
        }
        let Some(dir) = Direction::from_key(key) else {
            return false;
        };

        if self.accepts_movement() && self.state.controls.press(dir) {
            self.decoy_moved();
        }
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(dir) => {
                self.state.controls.release(dir);
                true
            }
            None => false,
        }
    }

    /// Pointer or touch sample in field coordinates
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.state.controls.pointer = Some(Vec2::new(x, y));
        }
    }

    /// Pointer left the room or the touch ended: PJ stops
    pub fn pointer_released(&mut self) {
        self.state.controls.pointer = None;
        self.state.interceptor.vel = Vec2::ZERO;
    }

    /// Virtual joystick direction, each axis in `[-1, 1]`. Letting go is
    /// always accepted, a push only while the decoy may move.
    pub fn joystick(&mut self, x: f32, y: f32) {
        let dir = Vec2::new(x, y);
        if !dir.is_finite() {
            return;
        }
        if dir == Vec2::ZERO {
            self.state.controls.joystick = Vec2::ZERO;
            return;
        }
        if self.accepts_movement() {
            self.state.controls.joystick = dir;
            self.decoy_moved();
        }
    }

    pub fn command(&mut self, command: Command) {
        log::debug!("Command {:?} in {:?}", command, self.state.phase);
        match command {
            Command::Start => {
                scoring::start(&mut self.state);
            }
            Command::TogglePause => {
                scoring::toggle_pause(&mut self.state);
            }
            Command::ResetRound => {
                self.latch_field();
                scoring::reset_round(&mut self.state);
            }
            Command::ResetGame { auto_start } => self.reset_game(auto_start),
            Command::TriggerAbility => {
                effects::trigger_lightning(&mut self.state);
            }
            Command::PrimaryAction => match self.state.phase {
                RoundPhase::Ready => {
                    scoring::start(&mut self.state);
                }
                RoundPhase::Paused | RoundPhase::GameOver => self.reset_game(true),
                RoundPhase::Running => self.reset_game(false),
                RoundPhase::Transitioning | RoundPhase::LevelTransition => {}
            },
        }
        self.collect_events();
        self.sync_frames();
    }

    fn reset_game(&mut self, auto_start: bool) {
        self.latch_field();
        scoring::reset_game(&mut self.state, auto_start);
        self.elapsed_bucket = 0.0;
        self.last_timestamp = None;
    }

    fn accepts_movement(&self) -> bool {
        matches!(self.state.phase, RoundPhase::Ready | RoundPhase::Running)
    }

    /// First move arms PJ's autopilot and leaves the ready screen
    fn decoy_moved(&mut self) {
        self.state.autopilot_armed = true;
        if self.state.phase == RoundPhase::Ready {
            self.command(Command::Start);
        }
    }

    fn latch_field(&mut self) -> bool {
        if self.host_field.is_degenerate() {
            return false;
        }
        if self.state.field != self.host_field {
            log::info!("Play field {}x{}", self.host_field.width, self.host_field.height);
        }
        self.state.field = self.host_field;
        true
    }

    /// Publish whatever is left in the elapsed bucket
    fn flush_elapsed(&mut self) {
        self.state.elapsed_ms += self.elapsed_bucket;
        self.elapsed_bucket = 0.0;
    }

    fn record_high_score(&mut self) {
        if self.high_score.record(self.state.elapsed_ms) {
            self.high_score.save(self.store.as_mut());
        }
        self.state.high_score_ms = self.high_score.best_ms;
    }

    fn collect_events(&mut self) {
        for event in self.state.events.drain(..) {
            log::trace!("Event {:?}", event);
            self.events.push(event);
        }
    }

    fn request_frame(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Start or stop the frame stream to match the phase
    fn sync_frames(&mut self) {
        if self.state.phase.wants_frames() {
            if self.pending_frame.is_none() {
                // Resuming: the first frame must not see the idle gap
                self.last_timestamp = None;
                self.request_frame();
            }
        } else {
            self.cancel_frame();
            self.last_timestamp = None;
        }
    }
}

impl<S: FrameScheduler> Drop for Driver<S> {
    fn drop(&mut self) {
        self.cancel_frame();
        let dropped = self.state.deferred.cancel_all();
        log::debug!("Driver torn down ({} pending outcome(s) dropped)", dropped);
    }
}
