/// Enemy AI: patrol / wait / dead state machine driven by grid probes.
///
/// States:
///   1. **Moving**: walk in the facing direction until the tile ahead is
///      a wall (at body height) or a drop (at foot height).
///   2. **Waiting**: stand still for `max_wait_time`, then turn around.
///   3. **Dead**: terminal. The death timer counts down so the level
///      can purge the enemy once it has played its death animation.

use super::animation::EnemyAnimation;
use super::entity::{Enemy, ENEMY_SHAPE};
use super::grid::TileGrid;
use super::tile::{TileKind, TILE_HEIGHT, TILE_WIDTH};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnemyState {
    Moving,
    Waiting,
    Dead,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct EnemyParams {
    /// Pixels per second.
    pub move_speed: f32,
    pub max_wait_time: f32,
    pub death_time_max: f32,
}

impl Default for EnemyParams {
    fn default() -> Self {
        EnemyParams { move_speed: 64.0, max_wait_time: 0.5, death_time_max: 1.0 }
    }
}

/// Advance one enemy by `dt` seconds.
pub fn update_enemy(enemy: &mut Enemy, grid: &TileGrid, params: &EnemyParams, dt: f32) {
    match enemy.state {
        EnemyState::Dead => {
            enemy.death_time = (enemy.death_time - dt).max(0.0);
        }
        EnemyState::Waiting => {
            enemy.wait_time = (enemy.wait_time - dt).max(0.0);
            if enemy.wait_time == 0.0 {
                enemy.facing = enemy.facing.flipped();
                enemy.state = EnemyState::Moving;
            }
        }
        EnemyState::Moving => {
            if path_blocked(enemy, grid) {
                enemy.wait_time = params.max_wait_time;
                enemy.state = EnemyState::Waiting;
            } else {
                enemy.position.x += enemy.facing.sign() as f32 * params.move_speed * dt;
            }
        }
    }
}

/// Wall ahead at body height, or nothing to stand on ahead.
fn path_blocked(enemy: &Enemy, grid: &TileGrid) -> bool {
    let dir = enemy.facing.sign();
    let lead_x = enemy.position.x + (ENEMY_SHAPE.local.width / 2 * dir) as f32;
    let tile_x = (lead_x / TILE_WIDTH as f32).floor() as i32 - dir;
    let tile_y = (enemy.position.y / TILE_HEIGHT as f32).floor() as i32;

    grid.collision_at(tile_x + dir, tile_y - 1) == TileKind::Impassable
        || grid.collision_at(tile_x + dir, tile_y) == TileKind::Passable
}

/// Kill the enemy. Returns `true` only on the alive → dead transition.
pub fn kill(enemy: &mut Enemy, params: &EnemyParams) -> bool {
    if enemy.state == EnemyState::Dead {
        return false;
    }
    enemy.state = EnemyState::Dead;
    enemy.death_time = params.death_time_max;
    true
}

/// Dead enemies whose death animation has finished.
pub fn can_purge(enemy: &Enemy) -> bool {
    enemy.state == EnemyState::Dead && enemy.death_time <= 0.0
}

/// Which animation the enemy shows this frame.
pub fn select_animation(enemy: &Enemy, player_alive: bool, time_exhausted: bool) -> EnemyAnimation {
    if enemy.state == EnemyState::Dead {
        EnemyAnimation::Die
    } else if !player_alive || time_exhausted || enemy.state == EnemyState::Waiting {
        EnemyAnimation::Idle
    } else {
        EnemyAnimation::Run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Facing, SpriteSet};
    use crate::domain::geometry::Vec2;
    use crate::domain::tile::{Tile, TileVisual};

    fn grid_from(rows: &[&str]) -> TileGrid {
        let tiles = rows
            .iter()
            .flat_map(|r| r.chars())
            .map(|c| match c {
                '#' => Tile::new(TileVisual::BlockA(0), TileKind::Impassable),
                _ => Tile::EMPTY,
            })
            .collect();
        TileGrid::from_tiles(rows[0].len(), rows.len(), tiles)
    }

    #[test]
    fn walks_then_waits_at_wall() {
        let g = grid_from(&["#....#", "#....#", "######"]);
        let params = EnemyParams::default();
        let mut e = Enemy::new(Vec2::new(52.0, 64.0), SpriteSet::A);

        update_enemy(&mut e, &g, &params, 0.1);
        assert_eq!(e.state, EnemyState::Moving);
        assert!((e.position.x - 45.6).abs() < 1e-4);

        update_enemy(&mut e, &g, &params, 0.1);
        assert_eq!(e.state, EnemyState::Waiting);
        assert_eq!(e.wait_time, params.max_wait_time);
        assert!((e.position.x - 45.6).abs() < 1e-4);
    }

    #[test]
    fn waits_at_ledge() {
        let g = grid_from(&["......", "......", "..##.."]);
        let params = EnemyParams::default();
        let mut e = Enemy::new(Vec2::new(92.0, 64.0), SpriteSet::B);

        update_enemy(&mut e, &g, &params, 0.05);
        assert_eq!(e.state, EnemyState::Moving);
        update_enemy(&mut e, &g, &params, 0.05);
        assert_eq!(e.state, EnemyState::Waiting);
    }

    #[test]
    fn waiting_ends_exactly_at_zero() {
        let g = grid_from(&["......", "......", "######"]);
        let params = EnemyParams::default();
        let mut e = Enemy::new(Vec2::new(100.0, 64.0), SpriteSet::C);
        e.state = EnemyState::Waiting;
        e.wait_time = 0.5;

        update_enemy(&mut e, &g, &params, 0.2);
        update_enemy(&mut e, &g, &params, 0.2);
        assert_eq!(e.state, EnemyState::Waiting);
        assert_eq!(e.facing, Facing::Left);
        assert!(e.wait_time > 0.0);

        update_enemy(&mut e, &g, &params, 0.2);
        assert_eq!(e.wait_time, 0.0);
        assert_eq!(e.state, EnemyState::Moving);
        assert_eq!(e.facing, Facing::Right);
        assert_eq!(e.position.x, 100.0);
    }

    #[test]
    fn kill_is_one_way_and_purges_after_timer() {
        let g = grid_from(&["......", "######"]);
        let params = EnemyParams::default();
        let mut e = Enemy::new(Vec2::new(100.0, 32.0), SpriteSet::D);

        assert!(kill(&mut e, &params));
        assert!(!kill(&mut e, &params));
        assert!(!e.is_alive());
        assert!(!can_purge(&e));

        let x = e.position.x;
        for _ in 0..11 {
            update_enemy(&mut e, &g, &params, 0.1);
        }
        assert_eq!(e.position.x, x);
        assert_eq!(e.death_time, 0.0);
        assert!(can_purge(&e));
    }

    #[test]
    fn animation_choice() {
        let mut e = Enemy::new(Vec2::new(100.0, 32.0), SpriteSet::A);
        assert_eq!(select_animation(&e, true, false), EnemyAnimation::Run);
        assert_eq!(select_animation(&e, false, false), EnemyAnimation::Idle);
        assert_eq!(select_animation(&e, true, true), EnemyAnimation::Idle);
        e.state = EnemyState::Waiting;
        assert_eq!(select_animation(&e, true, false), EnemyAnimation::Idle);
        kill(&mut e, &EnemyParams::default());
        assert_eq!(select_animation(&e, true, false), EnemyAnimation::Die);
    }
}
