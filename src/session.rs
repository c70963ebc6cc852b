//! Session controller.
//!
//! Owns the authoritative [`GameState`] and drives it through
//! idle → running ⇄ paused → over.  Both periodic inputs (the per-frame
//! simulation step and the one-second countdown) arrive here on the same
//! thread, so each reads the one status flag current at the time it runs.
//! Requests that are invalid in the current state are ignored and report
//! `false`.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::compute::{self, Direction};
use crate::config::GameConfig;
use crate::display::format_time;
use crate::entities::{GameState, GameStatus, Outcome};
use crate::input::{InputSampler, Key};
use crate::storage::ScoreStore;

/// The one-second countdown ticker.
///
/// There is at most one: [`Countdown::start`] replaces whatever was armed
/// before and [`Countdown::stop`] clears it.  [`Countdown::suspend`] stops
/// counting but keeps the partial second for [`Countdown::resume`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Countdown {
    /// Time accumulated toward the next whole second.
    carry: Duration,
    armed: bool,
}

impl Countdown {
    pub fn start(&mut self) {
        self.carry = Duration::ZERO;
        self.armed = true;
    }

    pub fn stop(&mut self) {
        self.carry = Duration::ZERO;
        self.armed = false;
    }

    pub fn suspend(&mut self) {
        self.armed = false;
    }

    pub fn resume(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Feed real elapsed time; returns the whole seconds that fired.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.armed {
            return 0;
        }
        self.carry += dt;
        let secs = self.carry.as_secs();
        self.carry -= Duration::from_secs(secs);
        secs as u32
    }
}

/// What the frame driver does after a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// What the end-of-session screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub outcome: Outcome,
    pub title: &'static str,
    pub message: String,
    pub final_score: u32,
    pub final_time: String,
    pub best_score: u32,
    pub new_record: bool,
}

pub fn title(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "VICTORY!",
        Outcome::Lose => "GAME OVER",
    }
}

/// End-of-session figures for `state`; `None` unless it is over.
pub fn summarize(state: &GameState, config: &GameConfig) -> Option<Summary> {
    let outcome = state.outcome()?;
    let message = match outcome {
        Outcome::Win => format!("You scored {} points in time!", config.target_score),
        Outcome::Lose => format!("Time's up! You needed {} points.", config.target_score),
    };
    Some(Summary {
        outcome,
        title: title(outcome),
        message,
        final_score: state.score,
        final_time: format_time(state.time_remaining, config.variant),
        best_score: state.best_score,
        new_record: state.new_record,
    })
}

pub struct Session<R: Rng> {
    config: GameConfig,
    state: GameState,
    countdown: Countdown,
    /// Last wall-clock reading seen by [`Session::sync_clock`].
    last_clock: Option<Instant>,
    store: Box<dyn ScoreStore>,
    rng: R,
}

impl<R: Rng> Session<R> {
    /// An idle session; the best score is read from `store` once, here.
    pub fn new(config: GameConfig, store: Box<dyn ScoreStore>, mut rng: R) -> Self {
        let best = store.load();
        let state = compute::init_state(&config, best, &mut rng);
        Session {
            config,
            state,
            countdown: Countdown::default(),
            last_clock: None,
            store,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn store(&self) -> &dyn ScoreStore {
        self.store.as_ref()
    }

    // ── Transitions ─────────────────────────────────────────────────────────

    /// idle → running.
    pub fn start(&mut self) -> bool {
        if self.state.status != GameStatus::Idle {
            return false;
        }
        self.begin();
        log::info!(
            "Session started: {} points in {}s",
            self.config.target_score,
            self.config.time_limit_secs
        );
        true
    }

    /// running → paused.  The countdown is suspended, nothing else changes.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state.status = GameStatus::Paused;
        self.countdown.suspend();
        log::debug!("Paused with {}s left", self.state.time_remaining);
        true
    }

    /// paused → running, state untouched.
    pub fn resume(&mut self) -> bool {
        if self.state.status != GameStatus::Paused {
            return false;
        }
        self.state.status = GameStatus::Running;
        self.countdown.resume();
        self.last_clock = None;
        log::debug!("Resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.state.status {
            GameStatus::Running => self.pause(),
            GameStatus::Paused => self.resume(),
            _ => false,
        }
    }

    /// paused/over → running with a full reset.
    pub fn restart(&mut self) -> bool {
        if !matches!(self.state.status, GameStatus::Paused | GameStatus::Over(_)) {
            return false;
        }
        self.begin();
        log::info!("Session restarted");
        true
    }

    /// paused/over → idle (home screen).
    pub fn exit(&mut self) -> bool {
        if !matches!(self.state.status, GameStatus::Paused | GameStatus::Over(_)) {
            return false;
        }
        self.countdown.stop();
        self.state = compute::init_state(&self.config, self.state.best_score, &mut self.rng);
        log::info!("Back to the home screen");
        true
    }

    /// Route a key-down event to its action.  Movement keys only mark
    /// themselves held in `input`; they have no action of their own.
    pub fn on_press(&mut self, key: Key, input: &mut InputSampler, now: Instant) -> Control {
        match key {
            Key::Fire => {
                if input.fire(now, self.is_running()) {
                    self.shoot();
                }
            }
            Key::Start => {
                self.start();
            }
            Key::Pause => {
                self.toggle_pause();
            }
            Key::Restart => {
                if self.restart() {
                    input.clear();
                }
            }
            Key::Exit => {
                if self.state.status == GameStatus::Idle {
                    return Control::Quit;
                }
                self.exit();
            }
            Key::Left | Key::Right | Key::Up | Key::Down => {}
        }
        Control::Continue
    }

    // ── Per-frame work ───────────────────────────────────────────────────────

    /// Fire one bullet.  Rate limiting happens in the input sampler.
    pub fn shoot(&mut self) {
        self.state = compute::player_shoot(&self.state, &self.config);
    }

    /// One simulation step with the held movement `dir`.
    pub fn frame(&mut self, dir: Direction) {
        if !self.is_running() {
            return;
        }
        let before = self.state.score;
        self.state = compute::tick(&self.state, dir, &self.config, &mut self.rng);
        if self.state.score > before {
            log::debug!("Hit! {}/{}", self.state.score, self.config.target_score);
        }
        self.finish_if_over();
    }

    /// Feed a wall-clock reading.  The first reading after a start, restart
    /// or resume only sets the reference point, so time that passed before
    /// the session was running is never counted.
    pub fn sync_clock(&mut self, now: Instant) {
        let dt = match self.last_clock.replace(now) {
            Some(prev) => now.saturating_duration_since(prev),
            None => Duration::ZERO,
        };
        self.advance_clock(dt);
    }

    /// Feed real elapsed time to the countdown.
    pub fn advance_clock(&mut self, dt: Duration) {
        for _ in 0..self.countdown.advance(dt) {
            if !self.is_running() {
                break;
            }
            self.state = compute::countdown_tick(&self.state, &self.config);
            self.finish_if_over();
        }
    }

    /// End-of-session figures; `None` unless the session is over.
    pub fn summary(&self) -> Option<Summary> {
        summarize(&self.state, &self.config)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn begin(&mut self) {
        self.state = compute::start_session(&self.state, &self.config, &mut self.rng);
        self.countdown.start();
        self.last_clock = None;
    }

    fn finish_if_over(&mut self) {
        let Some(outcome) = self.state.outcome() else {
            return;
        };
        // Settled already.
        if !self.countdown.is_armed() {
            return;
        }
        self.countdown.stop();
        log::info!(
            "Session over: {:?}, score {}/{}, {}s left",
            outcome,
            self.state.score,
            self.config.target_score,
            self.state.time_remaining
        );
        if self.state.score > self.state.best_score {
            self.state.best_score = self.state.score;
            self.state.new_record = true;
            log::info!("New best score: {}", self.state.score);
            if let Err(e) = self.store.save(self.state.score) {
                log::warn!("Could not save best score: {}", e);
            }
        }
    }
}
