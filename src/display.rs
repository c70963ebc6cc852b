/// Rendering layer, a pure function of the game state.
///
/// Each function receives a drawing surface and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into draw calls.

use std::f32::consts::PI;

use crate::config::{GameConfig, Variant};
use crate::entities::{Bullet, Enemy, GameState, GameStatus, Outcome, Particle, Player, Star};
use crate::session;
use crate::surface::{Align, Rgb, Surface};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BACKGROUND: Rgb = Rgb(0x1a, 0x1a, 0x2e);
const C_GRID: Rgb = Rgb(0xff, 0xff, 0xff);
const C_STAR: Rgb = Rgb(0xcc, 0xcc, 0xff);
const C_PLAYER: Rgb = Rgb(0x34, 0x98, 0xdb);
const C_OUTLINE: Rgb = Rgb(0xff, 0xff, 0xff);
const C_ENEMY: Rgb = crate::compute::ENEMY_COLOR;
const C_BULLET: Rgb = Rgb(0xe7, 0x4c, 0x3c);
const C_TEXT: Rgb = Rgb(0xff, 0xff, 0xff);
const C_GOOD: Rgb = Rgb(0x4a, 0xff, 0x4a);
const C_WARN: Rgb = Rgb(0xff, 0xaa, 0x00);
const C_BAR: Rgb = Rgb(0x4a, 0x4a, 0xff);
const C_DANGER: Rgb = Rgb(0xff, 0x55, 0x55);
const C_HINT: Rgb = Rgb(0x88, 0x88, 0x99);

/// Timer turns orange at or below this many seconds.
const TIME_WARN_SECS: u32 = 30;
const BAR_WIDTH: f32 = 300.0;
const BAR_HEIGHT: f32 = 20.0;

// ── Public entry points ───────────────────────────────────────────────────────

/// Remaining time as the HUD shows it: `MM:SS` (classic) or `NNs` (swarm).
pub fn format_time(seconds: u32, variant: Variant) -> String {
    match variant {
        Variant::Classic => format!("{:02}:{:02}", seconds / 60, seconds % 60),
        Variant::Swarm => format!("{}s", seconds),
    }
}

/// Render one complete frame.
pub fn render<S: Surface>(surface: &mut S, state: &GameState, config: &GameConfig) {
    surface.set_alpha(1.0);
    surface.clear(C_BACKGROUND);

    match config.variant {
        Variant::Classic => draw_grid(surface, config),
        Variant::Swarm => draw_stars(surface, &state.stars),
    }

    if state.status == GameStatus::Idle {
        draw_menu(surface, state, config);
        return;
    }

    draw_player(surface, &state.player, config);
    for enemy in state.enemies.iter().filter(|e| e.alive) {
        draw_enemy(surface, enemy, config);
    }
    for bullet in &state.bullets {
        draw_bullet(surface, bullet, config);
    }
    draw_particles(surface, &state.particles);
    draw_hud(surface, state, config);

    match state.status {
        GameStatus::Paused => draw_paused(surface, config),
        GameStatus::Over(_) => draw_game_over(surface, state, config),
        _ => {}
    }
}

// ── Background ────────────────────────────────────────────────────────────────

fn draw_grid<S: Surface>(surface: &mut S, config: &GameConfig) {
    surface.set_alpha(0.05);
    let mut x = 0.0;
    while x < config.width {
        surface.line(x, 0.0, x, config.height, C_GRID);
        x += config.grid_spacing;
    }
    let mut y = 0.0;
    while y < config.height {
        surface.line(0.0, y, config.width, y, C_GRID);
        y += config.grid_spacing;
    }
    surface.set_alpha(1.0);
}

fn draw_stars<S: Surface>(surface: &mut S, stars: &[Star]) {
    for star in stars {
        // Faster stars are nearer, so brighter.
        surface.set_alpha((star.speed / 2.5).clamp(0.3, 1.0));
        let glyph = if star.size >= 2.0 { "+" } else { "·" };
        surface.text(star.x, star.y, glyph, C_STAR, Align::Left);
    }
    surface.set_alpha(1.0);
}

// ── Shapes ────────────────────────────────────────────────────────────────────

/// Ship pointing right: nose at `x + size`.
pub fn ship_points(x: f32, y: f32, size: f32) -> [(f32, f32); 3] {
    [
        (x + size, y),
        (x - size / 2.0, y - size),
        (x - size / 2.0, y + size),
    ]
}

/// Regular pentagon with one vertex straight up.
pub fn pentagon_points(x: f32, y: f32, size: f32) -> Vec<(f32, f32)> {
    (0..5)
        .map(|i| {
            let angle = PI * 2.0 * i as f32 / 5.0 - PI / 2.0;
            (x + angle.cos() * size, y + angle.sin() * size)
        })
        .collect()
}

/// Five-pointed star, outer radius `size`.
pub fn star_points(x: f32, y: f32, size: f32) -> Vec<(f32, f32)> {
    (0..10)
        .map(|i| {
            let angle = PI * i as f32 / 5.0 - PI / 2.0;
            let r = if i % 2 == 0 { size } else { size * 0.45 };
            (x + angle.cos() * r, y + angle.sin() * r)
        })
        .collect()
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<S: Surface>(surface: &mut S, player: &Player, config: &GameConfig) {
    let points = ship_points(player.x, player.y, config.player_size);
    surface.fill_polygon(&points, C_PLAYER, Some(C_OUTLINE));
}

fn draw_enemy<S: Surface>(surface: &mut S, enemy: &Enemy, config: &GameConfig) {
    let points = match config.variant {
        Variant::Classic => pentagon_points(enemy.x, enemy.y, config.enemy_size),
        Variant::Swarm => star_points(enemy.x, enemy.y, config.enemy_size),
    };
    surface.fill_polygon(&points, C_ENEMY, Some(C_OUTLINE));
}

fn draw_bullet<S: Surface>(surface: &mut S, bullet: &Bullet, config: &GameConfig) {
    match config.variant {
        Variant::Classic => surface.fill_circle(bullet.x, bullet.y, config.bullet_radius, C_BULLET),
        Variant::Swarm => surface.fill_rect(
            bullet.x - config.bullet_half_width,
            bullet.y - config.bullet_half_height,
            config.bullet_half_width * 2.0,
            config.bullet_half_height * 2.0,
            C_BULLET,
        ),
    }
}

fn draw_particles<S: Surface>(surface: &mut S, particles: &[Particle]) {
    for p in particles {
        surface.set_alpha(p.life);
        surface.fill_circle(p.x, p.y, 3.0, p.color);
    }
    surface.set_alpha(1.0);
}

// ── HUD ───────────────────────────────────────────────────────────────────────

fn progress_color(score: u32, target: u32) -> Rgb {
    if score >= target {
        C_GOOD
    } else if score as f32 >= target as f32 * 0.7 {
        C_WARN
    } else {
        C_BAR
    }
}

fn draw_hud<S: Surface>(surface: &mut S, state: &GameState, config: &GameConfig) {
    let target = config.target_score;

    // Score progress bar, top right
    let bar_x = config.width - 320.0;
    let filled = (state.score as f32 / target as f32).min(1.0) * BAR_WIDTH;
    surface.set_alpha(0.1);
    surface.fill_rect(bar_x, 20.0, BAR_WIDTH, BAR_HEIGHT, C_TEXT);
    surface.set_alpha(1.0);
    surface.fill_rect(bar_x, 20.0, filled, BAR_HEIGHT, progress_color(state.score, target));
    surface.stroke_rect(bar_x, 20.0, BAR_WIDTH, BAR_HEIGHT, C_BAR);
    surface.text(
        bar_x + 10.0,
        35.0,
        &format!("Score: {}/{}", state.score, target),
        C_TEXT,
        Align::Left,
    );

    // Low-time flash
    if state.time_remaining <= config.low_time_secs && state.is_running() {
        surface.set_alpha(0.3);
        surface.fill_rect(0.0, 0.0, config.width, config.height, C_DANGER);
        surface.set_alpha(1.0);
        surface.text(
            config.width / 2.0,
            config.height / 2.0,
            &format!("HURRY! {}s", state.time_remaining),
            C_DANGER,
            Align::Center,
        );
    }

    // Timer and best, top left
    let time_color = if state.time_remaining <= TIME_WARN_SECS {
        C_WARN
    } else {
        C_GOOD
    };
    surface.text(
        20.0,
        40.0,
        &format!("Time: {}", format_time(state.time_remaining, config.variant)),
        time_color,
        Align::Left,
    );
    if state.best_score > 0 {
        surface.text(
            20.0,
            65.0,
            &format!("Best: {}", state.best_score),
            C_HINT,
            Align::Left,
        );
    }
}

// ── Screens ───────────────────────────────────────────────────────────────────

fn draw_menu<S: Surface>(surface: &mut S, state: &GameState, config: &GameConfig) {
    let cx = config.width / 2.0;
    let cy = config.height / 2.0;

    surface.text(cx, cy - 150.0, "★  SPACE  SHOOTER  ★", C_BAR, Align::Center);
    let mode = match config.variant {
        Variant::Classic => "[ CLASSIC ]",
        Variant::Swarm => "[ SWARM ]",
    };
    surface.text(cx, cy - 120.0, mode, C_ENEMY, Align::Center);

    if state.best_score > 0 {
        surface.text(
            cx,
            cy - 90.0,
            &format!("Best Score: {}", state.best_score),
            C_WARN,
            Align::Center,
        );
    }

    surface.text(
        cx,
        cy - 40.0,
        &format!(
            "Score {} points in {}",
            config.target_score,
            format_time(config.time_limit_secs, config.variant)
        ),
        C_TEXT,
        Align::Center,
    );

    let controls = [
        "← → ↑ ↓ / W A S D : Move",
        "SPACE : Shoot",
        "P / ESC : Pause",
        "R : Restart",
    ];
    for (i, line) in controls.iter().enumerate() {
        surface.text(cx, cy + i as f32 * 25.0, line, C_HINT, Align::Center);
    }

    surface.text(cx, cy + 130.0, "ENTER - Start   Q - Quit", C_GOOD, Align::Center);
}

fn draw_paused<S: Surface>(surface: &mut S, config: &GameConfig) {
    let cx = config.width / 2.0;
    let cy = config.height / 2.0;
    surface.set_alpha(0.5);
    surface.fill_rect(0.0, 0.0, config.width, config.height, C_BACKGROUND);
    surface.set_alpha(1.0);
    surface.text(cx, cy - 20.0, "PAUSED", C_WARN, Align::Center);
    surface.text(
        cx,
        cy + 20.0,
        "P - Resume   R - Restart   Q - Menu",
        C_TEXT,
        Align::Center,
    );
}

fn draw_game_over<S: Surface>(surface: &mut S, state: &GameState, config: &GameConfig) {
    let Some(summary) = session::summarize(state, config) else {
        return;
    };
    let cx = config.width / 2.0;
    let cy = config.height / 2.0;

    surface.set_alpha(0.6);
    surface.fill_rect(0.0, 0.0, config.width, config.height, C_BACKGROUND);
    surface.set_alpha(1.0);

    let title_color = match summary.outcome {
        Outcome::Win => C_GOOD,
        Outcome::Lose => C_DANGER,
    };
    let best_line = if summary.new_record {
        format!("★ NEW BEST: {} ★", summary.best_score)
    } else {
        format!("Best Score: {}", summary.best_score)
    };
    let lines: [(String, Rgb); 5] = [
        (summary.title.to_string(), title_color),
        (summary.message, C_TEXT),
        (format!("Final Score: {}", summary.final_score), C_WARN),
        (format!("Time Left: {}", summary.final_time), C_WARN),
        (best_line, if summary.new_record { C_WARN } else { C_HINT }),
    ];
    for (i, (text, color)) in lines.iter().enumerate() {
        surface.text(cx, cy - 90.0 + i as f32 * 30.0, text, *color, Align::Center);
    }

    surface.text(cx, cy + 90.0, "R - Play Again   Q - Menu", C_TEXT, Align::Center);
}
