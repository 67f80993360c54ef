/// Tile kinds and their collision semantics.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

pub const TILE_WIDTH: i32 = 40;
pub const TILE_HEIGHT: i32 = 32;

/// Variant counts for the randomized block textures.
pub const BLOCK_A_VARIANTS: u32 = 7;
pub const BLOCK_B_VARIANTS: u32 = 2;

/// Collision category of a grid cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TileKind {
    /// Does not hinder motion at all.
    #[default]
    Passable,
    /// Solid from every side.
    Impassable,
    /// Solid only when landed on from above.
    Platform,
}

impl TileKind {
    /// Does this tile take part in collision resolution at all?
    pub fn is_collidable(self) -> bool {
        !matches!(self, TileKind::Passable)
    }

    /// Can this tile push an actor sideways?
    pub fn blocks_horizontal(self) -> bool {
        matches!(self, TileKind::Impassable)
    }

    /// Is this a one-way platform?
    pub fn is_platform(self) -> bool {
        matches!(self, TileKind::Platform)
    }
}

/// What a tile looks like. Opaque to the simulation; the asset
/// binding turns it into a texture handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum TileVisual {
    #[default]
    None,
    Exit,
    Platform,
    BlockA(u8),
    BlockB(u8),
}

impl TileVisual {
    /// Asset path for the texture, or `None` for invisible tiles.
    pub fn asset_path(self) -> Option<String> {
        match self {
            TileVisual::None => None,
            TileVisual::Exit => Some("Tiles/Exit".to_string()),
            TileVisual::Platform => Some("Tiles/Platform".to_string()),
            TileVisual::BlockA(v) => Some(format!("Tiles/BlockA{v}")),
            TileVisual::BlockB(v) => Some(format!("Tiles/BlockB{v}")),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tile {
    pub visual: TileVisual,
    pub kind: TileKind,
}

impl Tile {
    pub const EMPTY: Tile = Tile { visual: TileVisual::None, kind: TileKind::Passable };

    pub const fn new(visual: TileVisual, kind: TileKind) -> Self {
        Tile { visual, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_impassable_blocks_sideways() {
        assert!(TileKind::Impassable.blocks_horizontal());
        assert!(!TileKind::Platform.blocks_horizontal());
        assert!(!TileKind::Passable.blocks_horizontal());
        assert!(TileKind::Platform.is_collidable());
        assert!(!TileKind::Passable.is_collidable());
    }

    #[test]
    fn visual_paths() {
        assert_eq!(TileVisual::None.asset_path(), None);
        assert_eq!(TileVisual::BlockA(3).asset_path().as_deref(), Some("Tiles/BlockA3"));
        assert_eq!(TileVisual::Exit.asset_path().as_deref(), Some("Tiles/Exit"));
    }
}
