/// Level: the complete state of one running level.
///
/// ## Ownership
///
/// The Level owns the grid and every entity. Entities never point back at
/// the Level; anything that needs the grid borrows `&self.grid`.
/// Gems and enemies are destroyed by removal from their lists. The
/// player is never destroyed, only reset.
///
/// ## Camera
///
/// Horizontal scroll only. World x maps to screen x as
/// `screen = world - camera.position`. The camera follows the player with
/// a dead zone and is clamped to the level.

use std::time::Duration;

use crate::domain::ai::EnemyParams;
use crate::domain::entity::{Enemy, Gem, GemParams, Player};
use crate::domain::geometry::{Point, Vec2};
use crate::domain::grid::TileGrid;
use crate::domain::physics::PhysicsParams;
use super::level::LevelLayout;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ScoringParams {
    pub time_limit: Duration,
    /// Points per second of time left when the exit is reached.
    pub points_per_second: u32,
    /// Below this the HUD timer starts blinking.
    pub warning_time: Duration,
}

impl Default for ScoringParams {
    fn default() -> Self {
        ScoringParams {
            time_limit: Duration::from_secs(120),
            points_per_second: 5,
            warning_time: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ViewParams {
    /// Viewport width in pixels.
    pub viewport_width: f32,
    /// Dead-zone margin as a fraction of the viewport width.
    pub view_margin: f32,
}

impl Default for ViewParams {
    fn default() -> Self {
        ViewParams { viewport_width: 800.0, view_margin: 0.35 }
    }
}

/// All gameplay tuning in one place; built from `config.toml`.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Tuning {
    pub physics: PhysicsParams,
    pub enemy: EnemyParams,
    pub gem: GemParams,
    pub scoring: ScoringParams,
    pub view: ViewParams,
}

/// Horizontal camera with dead-zone follow.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Camera {
    /// World x of the viewport's left edge.
    pub position: f32,
}

impl Camera {
    pub fn scroll(&mut self, player_x: f32, level_pixel_width: f32, view: &ViewParams) {
        let margin = view.viewport_width * view.view_margin;
        let left_edge = self.position + margin;
        let right_edge = self.position + view.viewport_width - margin;

        let movement = if player_x < left_edge {
            player_x - left_edge
        } else if player_x > right_edge {
            player_x - right_edge
        } else {
            0.0
        };

        // A level narrower than the viewport pins the camera at 0
        let max = level_pixel_width - view.viewport_width;
        self.position = (self.position + movement).min(max).max(0.0);
    }
}

pub struct Level {
    pub grid: TileGrid,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub gems: Vec<Gem>,
    pub start: Vec2,
    pub exit: Point,
    pub time_remaining: Duration,
    pub score: u32,
    pub reached_exit: bool,
    pub camera: Camera,
    pub tuning: Tuning,
}

impl Level {
    pub fn new(layout: LevelLayout, tuning: Tuning) -> Self {
        let LevelLayout { grid, start, exit, gems, enemies } = layout;
        Level {
            grid,
            player: Player::new(start),
            enemies: enemies.into_iter().map(|s| Enemy::new(s.position, s.sprite_set)).collect(),
            gems: gems.into_iter().map(Gem::new).collect(),
            start,
            exit,
            time_remaining: tuning.scoring.time_limit,
            score: 0,
            reached_exit: false,
            camera: Camera::default(),
            tuning,
        }
    }

    /// Revive the player at the start point. Time and score carry on.
    pub fn start_new_life(&mut self) {
        self.player.reset(self.start);
    }

    pub fn time_exhausted(&self) -> bool {
        self.time_remaining.is_zero()
    }

    pub fn pixel_width(&self) -> f32 {
        self.grid.pixel_width() as f32
    }

    pub fn scroll_camera(&mut self) {
        let width = self.pixel_width();
        self.camera.scroll(self.player.position.x, width, &self.tuning.view);
    }
}
