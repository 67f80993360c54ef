/// TileGrid: the level's immutable collision layer.
///
/// ## Boundary policy
///
/// Out-of-range queries are answered asymmetrically:
///   - `x` outside `[0, width)`  → Impassable (the level is walled in)
///   - `y` outside `[0, height)` → Passable   (jump above the top, fall off the bottom)
///
/// Falling out of the level is detected by the interaction pass, not here.

use super::geometry::Rect;
use super::tile::{Tile, TileKind, TILE_HEIGHT, TILE_WIDTH};

#[derive(Clone, Debug)]
pub struct TileGrid {
    width: usize,
    height: usize,
    /// Row-major, `tiles[y * width + x]`.
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Build from row-major tiles. The loader guarantees
    /// `tiles.len() == width * height`.
    pub(crate) fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        TileGrid { width, height, tiles }
    }

    /// Width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_width(&self) -> i32 {
        self.width as i32 * TILE_WIDTH
    }

    pub fn pixel_height(&self) -> i32 {
        self.height as i32 * TILE_HEIGHT
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        if x < self.width && y < self.height {
            self.tiles.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Collision kind at tile coordinate (x, y). See the boundary policy above.
    #[inline]
    pub fn collision_at(&self, x: i32, y: i32) -> TileKind {
        if x < 0 || x >= self.width as i32 {
            return TileKind::Impassable;
        }
        if y < 0 || y >= self.height as i32 {
            return TileKind::Passable;
        }
        self.tiles[y as usize * self.width + x as usize].kind
    }

    /// Pixel rectangle of the tile at (x, y).
    pub fn bounds(x: i32, y: i32) -> Rect {
        Rect::new(x * TILE_WIDTH, y * TILE_HEIGHT, TILE_WIDTH, TILE_HEIGHT)
    }

    /// All tiles with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Tile)> {
        let w = self.width.max(1);
        self.tiles.iter().enumerate().map(move |(i, t)| (i % w, i / w, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::TileVisual;
    use proptest::prelude::*;

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

    #[test]
    fn in_range_returns_stored_kind() {
        let g = grid_from(&["#.-", "..."]);
        assert_eq!(g.collision_at(0, 0), TileKind::Impassable);
        assert_eq!(g.collision_at(1, 0), TileKind::Passable);
        assert_eq!(g.collision_at(2, 0), TileKind::Platform);
        assert_eq!(g.pixel_width(), 120);
        assert_eq!(g.pixel_height(), 64);
    }

    #[test]
    fn tile_bounds() {
        assert_eq!(TileGrid::bounds(2, 3), Rect::new(80, 96, 40, 32));
        assert_eq!(TileGrid::bounds(-1, 0), Rect::new(-40, 0, 40, 32));
    }

    #[test]
    fn iter_is_row_major() {
        let g = grid_from(&["#.", ".-"]);
        let coords: Vec<_> = g.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    proptest! {
        #[test]
        fn horizontal_edges_are_walls(y in -50i32..50) {
            let g = grid_from(&["....", "....", "...."]);
            prop_assert_eq!(g.collision_at(-1, y), TileKind::Impassable);
            prop_assert_eq!(g.collision_at(g.width() as i32, y), TileKind::Impassable);
        }

        #[test]
        fn vertical_edges_are_open(x in 0i32..4) {
            let g = grid_from(&["####", "####", "####"]);
            prop_assert_eq!(g.collision_at(x, -1), TileKind::Passable);
            prop_assert_eq!(g.collision_at(x, g.height() as i32), TileKind::Passable);
        }
    }
}
