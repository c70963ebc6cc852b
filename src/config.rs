//! Game tuning for the two variants.
//!
//! [`GameConfig::preset`] holds the built-in values for each [`Variant`].
//! An optional TOML file can override any subset of the tunable fields; keys
//! that are absent keep the preset value, unknown keys are rejected.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Which rule set the session plays by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Variant {
    /// One static enemy, Euclidean hits, delayed respawn, grid background.
    Classic,
    /// A roster of oscillating enemies, box hits, instant respawn, starfield.
    Swarm,
}

/// How a bullet/enemy pair is tested for a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTest {
    /// `distance < bullet radius + enemy size`
    Euclidean,
    /// `|dx| < half width + size && |dy| < half height + size`
    AxisAligned,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub variant: Variant,

    // ── Surface ──────────────────────────────────────────────────────────────
    pub width: f32,
    pub height: f32,

    // ── Session ──────────────────────────────────────────────────────────────
    pub target_score: u32,
    pub time_limit_secs: u32,
    /// Below or at this many seconds the HUD flashes a warning.
    pub low_time_secs: u32,

    // ── Player ───────────────────────────────────────────────────────────────
    pub player_size: f32,
    pub player_speed: f32,
    /// Gap kept between the player's right edge limit and the centre line.
    pub player_center_margin: f32,

    // ── Bullets ──────────────────────────────────────────────────────────────
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub bullet_half_width: f32,
    pub bullet_half_height: f32,
    /// Minimum time between two shots; zero disables the limit.
    pub shot_interval_ms: u64,

    // ── Enemies ──────────────────────────────────────────────────────────────
    pub enemy_count: usize,
    pub enemy_size: f32,
    pub enemy_min_speed: f32,
    pub enemy_max_speed: f32,
    /// Frames a destroyed enemy stays down; zero respawns at once.
    pub respawn_delay_frames: u32,
    /// Keeps respawn positions this far from the top and bottom edges.
    pub respawn_margin: f32,
    pub hit_test: HitTest,

    // ── Cosmetics ────────────────────────────────────────────────────────────
    pub particle_count: usize,
    pub particle_decay: f32,
    pub star_count: usize,
    pub grid_spacing: f32,
}

impl GameConfig {
    /// Built-in values for a variant.
    pub fn preset(variant: Variant) -> Self {
        let classic = GameConfig {
            variant,
            width: 800.0,
            height: 600.0,
            target_score: 30,
            time_limit_secs: 90,
            low_time_secs: 10,
            player_size: 30.0,
            player_speed: 6.0,
            player_center_margin: 50.0,
            bullet_speed: 8.0,
            bullet_radius: 8.0,
            bullet_half_width: 7.0,
            bullet_half_height: 2.0,
            shot_interval_ms: 0,
            enemy_count: 1,
            enemy_size: 40.0,
            enemy_min_speed: 0.0,
            enemy_max_speed: 0.0,
            // 300 ms at 60 FPS
            respawn_delay_frames: 18,
            respawn_margin: 50.0,
            hit_test: HitTest::Euclidean,
            particle_count: 15,
            particle_decay: 0.02,
            star_count: 0,
            grid_spacing: 50.0,
        };
        match variant {
            Variant::Classic => classic,
            Variant::Swarm => GameConfig {
                target_score: 25,
                time_limit_secs: 60,
                shot_interval_ms: 200,
                enemy_count: 5,
                enemy_size: 24.0,
                enemy_min_speed: 1.0,
                enemy_max_speed: 3.0,
                respawn_delay_frames: 0,
                hit_test: HitTest::AxisAligned,
                star_count: 60,
                ..classic
            },
        }
    }

    /// Preset for `variant`, with overrides from `path` applied when given.
    pub fn load(variant: Variant, path: Option<&Path>) -> Result<Self> {
        let mut config = Self::preset(variant);
        if let Some(path) = path {
            let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let overrides: Overrides =
                toml::from_str(&text).map_err(|source| Error::ConfigSyntax {
                    path: path.to_path_buf(),
                    source,
                })?;
            overrides.apply(&mut config);
            log::info!("Applied config overrides from {}", path.display());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.target_score == 0, "target_score", "must be at least 1"),
            (self.time_limit_secs == 0, "time_limit_secs", "must be at least 1"),
            (self.enemy_count == 0, "enemy_count", "must be at least 1"),
            (
                self.enemy_max_speed < self.enemy_min_speed,
                "enemy_max_speed",
                "must not be below enemy_min_speed",
            ),
            // Written so that NaN and infinity fail as well.
            (
                !(self.player_speed.is_finite() && self.player_speed > 0.0),
                "player_speed",
                "must be positive and finite",
            ),
            (
                !(self.bullet_speed.is_finite() && self.bullet_speed > 0.0),
                "bullet_speed",
                "must be positive and finite",
            ),
            (
                !(self.particle_decay > 0.0 && self.particle_decay <= 1.0),
                "particle_decay",
                "must be in (0, 1]",
            ),
        ];
        for (failed, field, reason) in checks {
            if failed {
                return Err(Error::ConfigValue { field, reason });
            }
        }
        Ok(())
    }

    /// Horizontal movement envelope of the player: left half of the surface.
    pub fn player_x_range(&self) -> (f32, f32) {
        let min = self.player_size;
        let max = (self.width / 2.0 - self.player_center_margin).max(min);
        (min, max)
    }

    /// Vertical movement envelope of the player: full height minus margin.
    pub fn player_y_range(&self) -> (f32, f32) {
        let min = self.player_size;
        let max = (self.height - self.player_size).max(min);
        (min, max)
    }

    /// Number of enemies on the field; the classic variant always has one.
    pub fn roster_size(&self) -> usize {
        match self.variant {
            Variant::Classic => 1,
            Variant::Swarm => self.enemy_count,
        }
    }

    /// Stars in the background; the classic variant draws a grid instead.
    pub fn starfield_size(&self) -> usize {
        match self.variant {
            Variant::Classic => 0,
            Variant::Swarm => self.star_count,
        }
    }

    /// Rows an enemy may respawn on.
    pub fn respawn_y_range(&self) -> (f32, f32) {
        let min = self.respawn_margin;
        let max = (self.height - self.respawn_margin).max(min + 1.0);
        (min, max)
    }
}

/// Subset of [`GameConfig`] accepted from a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Overrides {
    target_score: Option<u32>,
    time_limit_secs: Option<u32>,
    low_time_secs: Option<u32>,
    player_speed: Option<f32>,
    bullet_speed: Option<f32>,
    shot_interval_ms: Option<u64>,
    enemy_count: Option<usize>,
    respawn_delay_frames: Option<u32>,
    particle_count: Option<usize>,
    star_count: Option<usize>,
}

impl Overrides {
    fn apply(self, config: &mut GameConfig) {
        let given = self;
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(v) = given.$field { config.$field = v; })*
            };
        }
        set!(
            target_score,
            time_limit_secs,
            low_time_secs,
            player_speed,
            bullet_speed,
            shot_interval_ms,
            enemy_count,
            respawn_delay_frames,
            particle_count,
            star_count
        );
    }
}
