/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// A file that does not parse is reported in the log and ignored.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::ai::EnemyParams;
use crate::domain::entity::GemParams;
use crate::domain::physics::PhysicsParams;
use crate::sim::rng::DEFAULT_LEVEL_SEED;
use crate::sim::world::{ScoringParams, Tuning, ViewParams};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    /// Redraw interval. The simulation itself always advances in fixed steps.
    pub frame_ms: u64,
    pub level_seed: u64,
}

/// Gamepad button names (gilrs `Button` names such as "South", or the
/// face-letter aliases "A", "B", "X", "Y").
#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub attack: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    enemy: TomlEnemy,
    #[serde(default)]
    gem: TomlGem,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    view: TomlView,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default = "default_level_seed")]
    level_seed: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_move_acceleration")]
    move_acceleration: f32,
    #[serde(default = "default_max_move_speed")]
    max_move_speed: f32,
    #[serde(default = "default_ground_drag_factor")]
    ground_drag_factor: f32,
    #[serde(default = "default_air_drag_factor")]
    air_drag_factor: f32,
    #[serde(default = "default_max_jump_time")]
    max_jump_time: f32,
    #[serde(default = "default_jump_launch_velocity")]
    jump_launch_velocity: f32,
    #[serde(default = "default_gravity_acceleration")]
    gravity_acceleration: f32,
    #[serde(default = "default_max_fall_speed")]
    max_fall_speed: f32,
    #[serde(default = "default_jump_control_power")]
    jump_control_power: f32,
    #[serde(default = "default_move_stick_scale")]
    move_stick_scale: f32,
    #[serde(default = "default_accelerometer_scale")]
    accelerometer_scale: f32,
    #[serde(default = "default_max_attack_time")]
    max_attack_time: f32,
}

#[derive(Deserialize, Debug)]
struct TomlEnemy {
    #[serde(default = "default_enemy_speed")]
    move_speed: f32,
    #[serde(default = "default_wait_time")]
    max_wait_time: f32,
    #[serde(default = "default_death_time")]
    death_time: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGem {
    #[serde(default = "default_gem_points")]
    point_value: u32,
    #[serde(default = "default_bounce_height")]
    bounce_height: f32,
    #[serde(default = "default_bounce_rate")]
    bounce_rate: f32,
    #[serde(default = "default_bounce_sync")]
    bounce_sync: f32,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default = "default_time_limit")]
    time_limit_secs: u64,
    #[serde(default = "default_points_per_second")]
    points_per_second: u32,
    #[serde(default = "default_warning_time")]
    warning_secs: u64,
}

#[derive(Deserialize, Debug)]
struct TomlView {
    #[serde(default = "default_viewport_width")]
    viewport_width: f32,
    #[serde(default = "default_view_margin")]
    view_margin: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump_buttons")]
    jump: Vec<String>,
    #[serde(default = "default_attack_buttons")]
    attack: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_levels_dir() -> String { "levels".into() }
fn default_frame_ms() -> u64 { 16 }      // ~60 redraws per second
fn default_level_seed() -> u64 { DEFAULT_LEVEL_SEED }

fn default_move_acceleration() -> f32 { PhysicsParams::default().move_acceleration }
fn default_max_move_speed() -> f32 { PhysicsParams::default().max_move_speed }
fn default_ground_drag_factor() -> f32 { PhysicsParams::default().ground_drag_factor }
fn default_air_drag_factor() -> f32 { PhysicsParams::default().air_drag_factor }
fn default_max_jump_time() -> f32 { PhysicsParams::default().max_jump_time }
fn default_jump_launch_velocity() -> f32 { PhysicsParams::default().jump_launch_velocity }
fn default_gravity_acceleration() -> f32 { PhysicsParams::default().gravity_acceleration }
fn default_max_fall_speed() -> f32 { PhysicsParams::default().max_fall_speed }
fn default_jump_control_power() -> f32 { PhysicsParams::default().jump_control_power }
fn default_move_stick_scale() -> f32 { PhysicsParams::default().move_stick_scale }
fn default_accelerometer_scale() -> f32 { PhysicsParams::default().accelerometer_scale }
fn default_max_attack_time() -> f32 { PhysicsParams::default().max_attack_time }

fn default_enemy_speed() -> f32 { EnemyParams::default().move_speed }
fn default_wait_time() -> f32 { EnemyParams::default().max_wait_time }
fn default_death_time() -> f32 { EnemyParams::default().death_time_max }

fn default_gem_points() -> u32 { GemParams::default().point_value }
fn default_bounce_height() -> f32 { GemParams::default().bounce_height }
fn default_bounce_rate() -> f32 { GemParams::default().bounce_rate }
fn default_bounce_sync() -> f32 { GemParams::default().bounce_sync }

fn default_time_limit() -> u64 { 120 }
fn default_points_per_second() -> u32 { 5 }
fn default_warning_time() -> u64 { 30 }

fn default_viewport_width() -> f32 { 800.0 }
fn default_view_margin() -> f32 { 0.35 }

fn default_jump_buttons() -> Vec<String> { vec!["A".into()] }
fn default_attack_buttons() -> Vec<String> { vec!["X".into(), "B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            frame_ms: default_frame_ms(),
            level_seed: default_level_seed(),
        }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            move_acceleration: default_move_acceleration(),
            max_move_speed: default_max_move_speed(),
            ground_drag_factor: default_ground_drag_factor(),
            air_drag_factor: default_air_drag_factor(),
            max_jump_time: default_max_jump_time(),
            jump_launch_velocity: default_jump_launch_velocity(),
            gravity_acceleration: default_gravity_acceleration(),
            max_fall_speed: default_max_fall_speed(),
            jump_control_power: default_jump_control_power(),
            move_stick_scale: default_move_stick_scale(),
            accelerometer_scale: default_accelerometer_scale(),
            max_attack_time: default_max_attack_time(),
        }
    }
}

impl Default for TomlEnemy {
    fn default() -> Self {
        TomlEnemy {
            move_speed: default_enemy_speed(),
            max_wait_time: default_wait_time(),
            death_time: default_death_time(),
        }
    }
}

impl Default for TomlGem {
    fn default() -> Self {
        TomlGem {
            point_value: default_gem_points(),
            bounce_height: default_bounce_height(),
            bounce_rate: default_bounce_rate(),
            bounce_sync: default_bounce_sync(),
        }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring {
            time_limit_secs: default_time_limit(),
            points_per_second: default_points_per_second(),
            warning_secs: default_warning_time(),
        }
    }
}

impl Default for TomlView {
    fn default() -> Self {
        TomlView {
            viewport_width: default_viewport_width(),
            view_margin: default_view_margin(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump_buttons(),
            attack: default_attack_buttons(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) system data directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Resolve levels directory
        let levels_dir_str = toml_cfg.general.levels_dir.clone();
        let levels_dir = if PathBuf::from(&levels_dir_str).is_absolute() {
            PathBuf::from(&levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(&levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(&levels_dir_str))
        };

        let mut cfg = GameConfig::from_toml(toml_cfg);
        cfg.levels_dir = levels_dir;
        cfg
    }

    /// Parse config text. Unknown or missing keys use defaults.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(t: TomlConfig) -> Self {
        let p = t.physics;
        let defaults = PhysicsParams::default();
        let physics = PhysicsParams {
            move_acceleration: p.move_acceleration,
            max_move_speed: p.max_move_speed,
            ground_drag_factor: p.ground_drag_factor,
            air_drag_factor: p.air_drag_factor,
            max_jump_time: positive_or("physics.max_jump_time", p.max_jump_time, defaults.max_jump_time),
            jump_launch_velocity: p.jump_launch_velocity,
            gravity_acceleration: p.gravity_acceleration,
            max_fall_speed: positive_or("physics.max_fall_speed", p.max_fall_speed, defaults.max_fall_speed),
            jump_control_power: p.jump_control_power,
            move_stick_scale: p.move_stick_scale,
            accelerometer_scale: p.accelerometer_scale,
            max_attack_time: p.max_attack_time,
        };

        let tuning = Tuning {
            physics,
            enemy: EnemyParams {
                move_speed: t.enemy.move_speed,
                max_wait_time: t.enemy.max_wait_time,
                death_time_max: t.enemy.death_time,
            },
            gem: GemParams {
                point_value: t.gem.point_value,
                bounce_height: t.gem.bounce_height,
                bounce_rate: t.gem.bounce_rate,
                bounce_sync: t.gem.bounce_sync,
                ..GemParams::default()
            },
            scoring: ScoringParams {
                time_limit: Duration::from_secs(t.scoring.time_limit_secs),
                points_per_second: t.scoring.points_per_second,
                warning_time: Duration::from_secs(t.scoring.warning_secs),
            },
            view: ViewParams {
                viewport_width: positive_or("view.viewport_width", t.view.viewport_width, default_viewport_width()),
                view_margin: t.view.view_margin.clamp(0.0, 0.5),
            },
        };

        GameConfig {
            tuning,
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                attack: t.gamepad.attack,
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
            },
            levels_dir: PathBuf::from(t.general.levels_dir),
            frame_ms: t.general.frame_ms.max(1),
            level_seed: t.general.level_seed,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

fn positive_or(key: &str, value: f32, fallback: f32) -> f32 {
    if value > 0.0 {
        value
    } else {
        warn!(key, value, fallback, "config value must be positive, using default");
        fallback
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/ninjarun)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/ninjarun");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/ninjarun)
    let sys = PathBuf::from("/usr/share/ninjarun");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        info!(path = %path.display(), "loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "config.toml parse error, using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read config file");
                }
            }
        }
    }
    TomlConfig::default()
}
