/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (plus the config and, where needed, an RNG handle) and returns
/// a brand-new `GameState`.  Side effects are limited to the injected RNG.

use rand::Rng;

use crate::config::{GameConfig, HitTest, Variant};
use crate::entities::{Bullet, Enemy, GameState, GameStatus, Outcome, Particle, Player, Star};
use crate::surface::Rgb;

/// Enemy fill; explosion sparks take the same colour.
pub const ENEMY_COLOR: Rgb = Rgb(0x9b, 0x59, 0xb6);

/// Movement keys held this frame, one axis each in {-1, 0, 1}.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Direction {
    pub dx: i8,
    pub dy: i8,
}

// ── Spawning ─────────────────────────────────────────────────────────────────

fn player_start(config: &GameConfig) -> Player {
    Player {
        x: 100.0_f32.clamp(config.player_x_range().0, config.player_x_range().1),
        y: config.height / 2.0,
    }
}

/// Vertical band a swarm enemy oscillates in.
pub fn patrol_range(config: &GameConfig) -> (f32, f32) {
    let top = config.enemy_size;
    let bottom = (config.height - config.enemy_size).max(top);
    (top, bottom)
}

/// A fresh live enemy at a randomised position.
pub fn spawn_enemy(config: &GameConfig, rng: &mut impl Rng) -> Enemy {
    let (y_min, y_max) = config.respawn_y_range();
    match config.variant {
        Variant::Classic => Enemy {
            x: config.width - 150.0,
            y: rng.gen_range(y_min..y_max),
            alive: true,
            respawn_in: 0,
            dir: 1.0,
            speed: 0.0,
        },
        Variant::Swarm => {
            let x_min = config.width * 0.6;
            let x_max = (config.width - config.enemy_size).max(x_min + 1.0);
            Enemy {
                x: rng.gen_range(x_min..x_max),
                y: rng.gen_range(y_min..y_max),
                alive: true,
                respawn_in: 0,
                dir: if rng.gen_bool(0.5) { 1.0 } else { -1.0 },
                speed: rng.gen_range(config.enemy_min_speed..=config.enemy_max_speed),
            }
        }
    }
}

fn seed_enemies(config: &GameConfig, rng: &mut impl Rng) -> Vec<Enemy> {
    match config.variant {
        // The lone enemy always opens centred on its column.
        Variant::Classic => vec![Enemy {
            y: config.height / 2.0,
            ..spawn_enemy(config, rng)
        }],
        Variant::Swarm => (0..config.roster_size())
            .map(|_| spawn_enemy(config, rng))
            .collect(),
    }
}

fn seed_stars(config: &GameConfig, rng: &mut impl Rng) -> Vec<Star> {
    (0..config.starfield_size())
        .map(|_| Star {
            x: rng.gen_range(0.0..config.width),
            y: rng.gen_range(0.0..config.height),
            speed: rng.gen_range(0.5..2.5),
            size: rng.gen_range(1.0..3.0),
        })
        .collect()
}

/// Explosion sparks flying out of `(x, y)`.
pub fn burst(x: f32, y: f32, count: usize, rng: &mut impl Rng) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            x,
            y,
            vx: (rng.gen::<f32>() - 0.5) * 6.0,
            vy: (rng.gen::<f32>() - 0.5) * 6.0,
            life: 1.0,
            color: ENEMY_COLOR,
        })
        .collect()
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the home-screen state: nothing moves until a session starts.
pub fn init_state(config: &GameConfig, best_score: u32, rng: &mut impl Rng) -> GameState {
    GameState {
        player: player_start(config),
        bullets: Vec::new(),
        enemies: seed_enemies(config, rng),
        particles: Vec::new(),
        stars: seed_stars(config, rng),
        score: 0,
        time_remaining: config.time_limit_secs,
        best_score,
        new_record: false,
        status: GameStatus::Idle,
    }
}

/// A running session with score, timer, player and every entity list reset.
/// Only the best score carries over.
pub fn start_session(state: &GameState, config: &GameConfig, rng: &mut impl Rng) -> GameState {
    GameState {
        status: GameStatus::Running,
        ..init_state(config, state.best_score, rng)
    }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Apply one frame of held movement, clamped to the player's envelope.
pub fn move_player(state: &GameState, dir: Direction, config: &GameConfig) -> GameState {
    GameState {
        player: step_player(&state.player, dir, config),
        ..state.clone()
    }
}

fn step_player(player: &Player, dir: Direction, config: &GameConfig) -> Player {
    let (x_min, x_max) = config.player_x_range();
    let (y_min, y_max) = config.player_y_range();
    Player {
        x: (player.x + dir.dx as f32 * config.player_speed).clamp(x_min, x_max),
        y: (player.y + dir.dy as f32 * config.player_speed).clamp(y_min, y_max),
    }
}

/// Fire a bullet from the ship's nose.  Ignored unless the session is running.
pub fn player_shoot(state: &GameState, config: &GameConfig) -> GameState {
    if !state.is_running() {
        return state.clone();
    }
    let mut bullets = state.bullets.clone();
    bullets.push(Bullet {
        x: state.player.x + config.player_size,
        y: state.player.y,
    });
    GameState {
        bullets,
        ..state.clone()
    }
}

// ── Collision ────────────────────────────────────────────────────────────────

/// Whether `bullet` hits `enemy` under the configured test.
pub fn collides(bullet: &Bullet, enemy: &Enemy, config: &GameConfig) -> bool {
    let dx = bullet.x - enemy.x;
    let dy = bullet.y - enemy.y;
    match config.hit_test {
        HitTest::Euclidean => (dx * dx + dy * dy).sqrt() < config.bullet_radius + config.enemy_size,
        HitTest::AxisAligned => {
            dx.abs() < config.bullet_half_width + config.enemy_size
                && dy.abs() < config.bullet_half_height + config.enemy_size
        }
    }
}

// ── Outcome ──────────────────────────────────────────────────────────────────

/// Terminal outcome implied by the score and clock; a win takes precedence.
pub fn outcome(state: &GameState, config: &GameConfig) -> Option<Outcome> {
    if state.score >= config.target_score {
        Some(Outcome::Win)
    } else if state.time_remaining == 0 {
        Some(Outcome::Lose)
    } else {
        None
    }
}

fn settle(state: GameState, config: &GameConfig) -> GameState {
    match outcome(&state, config) {
        Some(result) => GameState {
            status: GameStatus::Over(result),
            ..state
        },
        None => state,
    }
}

/// One wall-clock second of countdown.  Frozen unless running.
pub fn countdown_tick(state: &GameState, config: &GameConfig) -> GameState {
    if !state.is_running() {
        return state.clone();
    }
    settle(
        GameState {
            time_remaining: state.time_remaining.saturating_sub(1),
            ..state.clone()
        },
        config,
    )
}

// ── Per-frame tick (RNG is injected) ──────────────────────────────────

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
/// A no-op unless the session is running.
pub fn tick(
    state: &GameState,
    dir: Direction,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> GameState {
    if !state.is_running() {
        return state.clone();
    }

    // ── 1. Scroll the starfield ──────────────────────────────────────────────
    let stars: Vec<Star> = state
        .stars
        .iter()
        .map(|s| {
            let x = s.x - s.speed;
            if x < 0.0 {
                Star {
                    x: config.width,
                    y: rng.gen_range(0.0..config.height),
                    ..s.clone()
                }
            } else {
                Star { x, ..s.clone() }
            }
        })
        .collect();

    // ── 2. Move the player ───────────────────────────────────────────────────
    let player = step_player(&state.player, dir, config);

    // ── 3. Move bullets, dropping those past the far edge ────────────────────
    let bullets: Vec<Bullet> = state
        .bullets
        .iter()
        .map(|b| Bullet {
            x: b.x + config.bullet_speed,
            ..b.clone()
        })
        .filter(|b| b.x <= config.width)
        .collect();

    // ── 4. Move enemies / count down respawns ────────────────────────────────
    let (top, bottom) = patrol_range(config);
    let mut enemies: Vec<Enemy> = Vec::with_capacity(state.enemies.len());
    for e in &state.enemies {
        let next = if !e.alive {
            if e.respawn_in <= 1 {
                spawn_enemy(config, rng)
            } else {
                Enemy {
                    respawn_in: e.respawn_in - 1,
                    ..e.clone()
                }
            }
        } else if e.speed > 0.0 {
            let y = e.y + e.dir * e.speed;
            if y <= top {
                Enemy { y: top, dir: 1.0, ..e.clone() }
            } else if y >= bottom {
                Enemy { y: bottom, dir: -1.0, ..e.clone() }
            } else {
                Enemy { y, ..e.clone() }
            }
        } else {
            e.clone()
        };
        enemies.push(next);
    }

    // ── 5. Collision: bullets ↔ live enemies ─────────────────────────────────
    // Each bullet scores at most once and each enemy falls at most once per
    // frame; no points are counted past the target.
    let mut killed_enemies: Vec<usize> = Vec::new();
    let mut used_bullets: Vec<usize> = Vec::new();
    let room = config.target_score.saturating_sub(state.score) as usize;

    for (bi, bullet) in bullets.iter().enumerate() {
        if killed_enemies.len() >= room {
            break;
        }
        let hit = enemies.iter().enumerate().position(|(ei, enemy)| {
            enemy.alive && !killed_enemies.contains(&ei) && collides(bullet, enemy, config)
        });
        if let Some(ei) = hit {
            killed_enemies.push(ei);
            used_bullets.push(bi);
        }
    }

    let bullets: Vec<Bullet> = bullets
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !used_bullets.contains(i))
        .map(|(_, b)| b)
        .collect();

    // ── 6. Sparks: advance the old, then add bursts for new kills ────────────
    let mut particles: Vec<Particle> = state
        .particles
        .iter()
        .map(|p| Particle {
            x: p.x + p.vx,
            y: p.y + p.vy,
            life: p.life - config.particle_decay,
            ..p.clone()
        })
        .filter(|p| p.life > 0.0)
        .collect();

    for &ei in &killed_enemies {
        let dead = enemies[ei].clone();
        particles.extend(burst(dead.x, dead.y, config.particle_count, rng));
        enemies[ei] = if config.respawn_delay_frames == 0 {
            spawn_enemy(config, rng)
        } else {
            Enemy {
                alive: false,
                respawn_in: config.respawn_delay_frames,
                ..dead
            }
        };
    }

    // ── 7. Score & status ────────────────────────────────────────────────────
    settle(
        GameState {
            player,
            bullets,
            enemies,
            particles,
            stars,
            score: state.score + killed_enemies.len() as u32,
            ..state.clone()
        },
        config,
    )
}
