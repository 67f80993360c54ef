/// Axis-separated resolution of an actor against the tile grid.
///
/// ## Pass order
///
/// 1. Compute the tile range covered by the actor's bounds.
/// 2. Walk it row-major; skip Passable tiles and non-overlapping tiles.
/// 3. Resolve on the vertical axis when the vertical depth is shallower,
///    or always for Platforms. Otherwise resolve horizontally, and only
///    against Impassable tiles.
/// 4. A vertical hit counts as ground when last tick's bottom edge was at
///    or above the tile's top. Platforms only correct once that happened.
/// 5. Bounds are recomputed after every correction, so corrections stack.

use super::animation::FRAME_ORIGIN;
use super::geometry::{Rect, Vec2};
use super::grid::TileGrid;
use super::tile::{TileKind, TILE_HEIGHT, TILE_WIDTH};

/// Collision box of an actor, relative to its 64x64 frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BodyShape {
    pub local: Rect,
}

impl BodyShape {
    /// Box that is `width_frac` of the frame wide and `height_frac` tall,
    /// centered horizontally and resting on the frame's bottom edge.
    pub fn from_fractions(frame: i32, width_frac: f32, height_frac: f32) -> Self {
        let width = (frame as f32 * width_frac) as i32;
        let height = (frame as f32 * height_frac) as i32;
        let left = (frame - width) / 2;
        let top = frame - height;
        BodyShape { local: Rect::new(left, top, width, height) }
    }

    /// World bounds for an actor whose feet are at `position`.
    pub fn bounds_at(&self, position: Vec2) -> Rect {
        let left = (position.x - FRAME_ORIGIN.x).round_ties_even() as i32 + self.local.left;
        let top = (position.y - FRAME_ORIGIN.y).round_ties_even() as i32 + self.local.top;
        Rect::new(left, top, self.local.width, self.local.height)
    }
}

/// Push `position` out of every solid tile it overlaps.
///
/// Returns whether the actor is standing on ground this tick and stores
/// the resolved bottom edge into `previous_bottom` for the next call.
pub fn resolve_collisions(
    position: &mut Vec2,
    previous_bottom: &mut f32,
    shape: &BodyShape,
    grid: &TileGrid,
) -> bool {
    let mut bounds = shape.bounds_at(*position);
    let left_tile = (bounds.left as f32 / TILE_WIDTH as f32).floor() as i32;
    let right_tile = (bounds.right() as f32 / TILE_WIDTH as f32).ceil() as i32 - 1;
    let top_tile = (bounds.top as f32 / TILE_HEIGHT as f32).floor() as i32;
    let bottom_tile = (bounds.bottom() as f32 / TILE_HEIGHT as f32).ceil() as i32 - 1;

    let mut on_ground = false;

    for y in top_tile..=bottom_tile {
        for x in left_tile..=right_tile {
            let kind = grid.collision_at(x, y);
            if !kind.is_collidable() {
                continue;
            }

            let tile_bounds = TileGrid::bounds(x, y);
            let depth = bounds.intersection_depth(&tile_bounds);
            if depth == Vec2::ZERO {
                continue;
            }

            if depth.y.abs() < depth.x.abs() || kind.is_platform() {
                if *previous_bottom <= tile_bounds.top as f32 {
                    on_ground = true;
                }
                // Platforms are solid only once the actor came from above
                if kind == TileKind::Impassable || on_ground {
                    position.y += depth.y;
                    bounds = shape.bounds_at(*position);
                }
            } else if kind.blocks_horizontal() {
                position.x += depth.x;
                bounds = shape.bounds_at(*position);
            }
        }
    }

    *previous_bottom = bounds.bottom() as f32;
    on_ground
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::{Tile, TileVisual};

    fn grid_from(rows: &[&str]) -> TileGrid {
        let h = rows.len();
        let w = rows[0].len();
        let tiles = rows
            .iter()
            .flat_map(|r| r.chars())
            .map(|c| match c {
                '#' => Tile::new(TileVisual::BlockA(0), TileKind::Impassable),
                '-' => Tile::new(TileVisual::Platform, TileKind::Platform),
                _ => Tile::EMPTY,
            })
            .collect();
        TileGrid::from_tiles(w, h, tiles)
    }

    fn player_shape() -> BodyShape {
        BodyShape::from_fractions(64, 0.4, 0.8)
    }

    #[test]
    fn shape_from_fractions() {
        assert_eq!(player_shape().local, Rect::new(19, 13, 25, 51));
        assert_eq!(BodyShape::from_fractions(64, 0.35, 0.7).local, Rect::new(21, 20, 22, 44));
    }

    #[test]
    fn bounds_bottom_is_the_feet() {
        let b = player_shape().bounds_at(Vec2::new(100.0, 64.0));
        assert_eq!(b, Rect::new(87, 13, 25, 51));
        assert_eq!(b.bottom(), 64);
    }

    #[test]
    fn platform_lands_from_above() {
        let g = grid_from(&["....", "..-.", "...."]);
        let mut pos = Vec2::new(100.0, 36.0);
        let mut prev_bottom = 32.0;
        let grounded = resolve_collisions(&mut pos, &mut prev_bottom, &player_shape(), &g);
        assert!(grounded);
        assert_eq!(pos, Vec2::new(100.0, 32.0));
        assert_eq!(prev_bottom, 32.0);
    }

    #[test]
    fn platform_is_ignored_from_below() {
        let g = grid_from(&["....", "..-.", "...."]);
        let mut pos = Vec2::new(100.0, 60.0);
        let mut prev_bottom = 70.0;
        let grounded = resolve_collisions(&mut pos, &mut prev_bottom, &player_shape(), &g);
        assert!(!grounded);
        assert_eq!(pos, Vec2::new(100.0, 60.0));
        assert_eq!(prev_bottom, 60.0);
    }

    #[test]
    fn wall_pushes_out_sideways() {
        let g = grid_from(&["....", ".#..", "...."]);
        // Right edge sits 2 px inside the block at column 1
        let mut pos = Vec2::new(30.0, 60.0);
        let mut prev_bottom = 60.0;
        let grounded = resolve_collisions(&mut pos, &mut prev_bottom, &player_shape(), &g);
        assert!(!grounded);
        assert_eq!(pos.x, 28.0);
        assert_eq!(pos.y, 60.0);
    }

    #[test]
    fn floor_corrections_stack_with_wall() {
        let g = grid_from(&["....", ".#..", "####"]);
        let mut pos = Vec2::new(29.0, 65.0);
        let mut prev_bottom = 64.0;
        let grounded = resolve_collisions(&mut pos, &mut prev_bottom, &player_shape(), &g);
        assert!(grounded);
        assert_eq!(pos, Vec2::new(28.0, 64.0));
        assert_eq!(prev_bottom, 64.0);
    }

    #[test]
    fn level_edges_are_walls() {
        let g = grid_from(&["...", "...", "###"]);
        // Left edge of bounds 3 px past the level's left side
        let mut pos = Vec2::new(10.0, 64.0);
        let mut prev_bottom = 64.0;
        resolve_collisions(&mut pos, &mut prev_bottom, &player_shape(), &g);
        assert_eq!(pos.x, 13.0);
    }
}
