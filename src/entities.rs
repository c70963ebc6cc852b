/// All game entity types. Pure data, no logic.
///
/// Positions are in logical surface units (see `GameConfig::width/height`);
/// the origin is the top-left corner and y grows downward.

use crate::surface::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// Home screen; nothing is simulated.
    Idle,
    Running,
    Paused,
    /// Terminal: score and time are frozen until a restart.
    Over(Outcome),
}

// ── Player & projectiles ──────────────────────────────────────────────────────

/// The ship.  Size and speed are fixed by the config.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
}

/// A player shot.  Travels right along its row at a fixed speed.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub alive: bool,
    /// Frames until a destroyed enemy comes back (classic variant).
    pub respawn_in: u32,
    /// +1.0 moving down, -1.0 moving up (swarm variant).
    pub dir: f32,
    /// Vertical speed per frame; zero for a static enemy.
    pub speed: f32,
}

// ── Cosmetics ─────────────────────────────────────────────────────────────────

/// One spark of an explosion burst.  No gameplay effect.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Remaining life in [0, 1]; doubles as draw opacity.
    pub life: f32,
    pub color: Rgb,
}

/// Background star drifting leftward (swarm variant).
#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub size: f32,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    pub score: u32,
    /// Whole seconds left on the countdown.
    pub time_remaining: u32,
    /// Best score ever recorded, including this session once it ends.
    pub best_score: u32,
    /// Set when the session that just ended beat the previous best.
    pub new_record: bool,
    pub status: GameStatus,
}

impl GameState {
    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            GameStatus::Over(outcome) => Some(outcome),
            _ => None,
        }
    }
}
