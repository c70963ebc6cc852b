/// Input sampling: held keys and the shot rate limit.
///
/// Instead of acting on each key event individually, the sampler records the
/// frame number of the last press/repeat event for every key.  Each frame the
/// game asks which keys are still "fresh" and applies them all together, so
/// moving and firing can happen at the same time.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (kitty protocol): proper `Release`
///   events → keys are dropped on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire after `HOLD_WINDOW` frames of silence,
///   which is longer than the OS repeat interval.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use crate::compute::Direction;

/// Frames a key stays held without a fresh press/repeat event
/// (≈133 ms at 60 FPS; OS key-repeat is ≥ 15 Hz).
pub const HOLD_WINDOW: u64 = 8;

/// Logical keys the game reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Start,
    Pause,
    Restart,
    Exit,
}

impl Key {
    /// Arrow keys, WASD, space, Enter, P/Esc, R and Q.
    pub fn from_code(code: KeyCode) -> Option<Key> {
        let key = match code {
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Key::Left,
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Key::Right,
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Key::Up,
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Key::Down,
            KeyCode::Char(' ') => Key::Fire,
            KeyCode::Enter => Key::Start,
            KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => Key::Pause,
            KeyCode::Char('r') | KeyCode::Char('R') => Key::Restart,
            KeyCode::Char('q') | KeyCode::Char('Q') => Key::Exit,
            _ => return None,
        };
        Some(key)
    }
}

pub struct InputSampler {
    /// Each held key → the frame it was last seen (press or repeat).
    seen: HashMap<Key, u64>,
    shot_interval: Duration,
    last_shot: Option<Instant>,
}

impl InputSampler {
    pub fn new(shot_interval: Duration) -> Self {
        InputSampler {
            seen: HashMap::new(),
            shot_interval,
            last_shot: None,
        }
    }

    /// Record a press or repeat event.
    pub fn press(&mut self, key: Key, frame: u64) {
        self.seen.insert(key, frame);
    }

    pub fn release(&mut self, key: Key) {
        self.seen.remove(&key);
    }

    /// Forget every held key and the last shot, e.g. on restart.
    pub fn clear(&mut self) {
        self.seen.clear();
        self.last_shot = None;
    }

    /// True if `key` was seen within the last `HOLD_WINDOW` frames.
    pub fn is_held(&self, key: Key, frame: u64) -> bool {
        self.seen
            .get(&key)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    /// Net movement from the held direction keys.
    pub fn direction(&self, frame: u64) -> Direction {
        let axis = |neg: Key, pos: Key| {
            self.is_held(pos, frame) as i8 - self.is_held(neg, frame) as i8
        };
        Direction {
            dx: axis(Key::Left, Key::Right),
            dy: axis(Key::Up, Key::Down),
        }
    }

    /// Edge-triggered fire request.  Granted only while the session is
    /// `active` and at least `shot_interval` after the last granted shot;
    /// refused requests do not reset the interval.
    pub fn fire(&mut self, now: Instant, active: bool) -> bool {
        if !active {
            return false;
        }
        let ready = self
            .last_shot
            .map(|last| now.saturating_duration_since(last) >= self.shot_interval)
            .unwrap_or(true);
        if ready {
            self.last_shot = Some(now);
        }
        ready
    }
}
