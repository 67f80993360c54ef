/// Terminal asset catalog and loader.
///
/// Every asset path the simulation can ask for is known up front and
/// mapped to either character art or a sound effect. The catalog is
/// built once and shared read-only by the loader, the renderer and the
/// sound board; the loader only tracks reference counts.
///
/// Unknown paths resolve to the `MISSING` entry (a magenta `?`), so a
/// typo in a path shows up on screen instead of crashing the game.

use std::collections::HashMap;

use crossterm::style::Color;
use tracing::{debug, warn};

use crate::domain::animation::{EnemyAnimation, PlayerAnimation};
use crate::domain::entity::SpriteSet;
use crate::domain::tile::{TileVisual, BLOCK_A_VARIANTS, BLOCK_B_VARIANTS};
use crate::sim::assets::GEM_TEXTURE;
use crate::sim::event::SoundId;
use crate::sim::ports::{AssetHandle, AssetLoader};

/// Where the position passed to `draw_sprite` sits on the art.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Anchor {
    /// Tiles: position is the tile's top-left pixel.
    TopLeft,
    /// Gems: position is the center of the texture.
    Center,
    /// Characters: position is the feet.
    BottomCenter,
}

/// Character art. Spaces are transparent. Every frame has the same
/// dimensions; the frame index wraps.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Art {
    pub frames: &'static [&'static [&'static str]],
    pub fg: Color,
    pub bg: Option<Color>,
    pub anchor: Anchor,
}

impl Art {
    pub fn frame(&self, index: usize) -> &'static [&'static str] {
        self.frames[index % self.frames.len()]
    }

    pub fn width(&self) -> usize {
        self.frames[0].iter().map(|row| row.chars().count()).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.frames[0].len()
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AssetEntry {
    Sprite(Art),
    Sound(SoundId),
}

// ── Art tables ──

const MISSING: Art = Art {
    frames: &[&["?"]],
    fg: Color::Magenta,
    bg: None,
    anchor: Anchor::Center,
};

const BLOCK_A_COLORS: [Color; BLOCK_A_VARIANTS as usize] = [
    Color::Rgb { r: 120, g: 92, b: 64 },
    Color::Rgb { r: 128, g: 98, b: 70 },
    Color::Rgb { r: 112, g: 86, b: 60 },
    Color::Rgb { r: 134, g: 104, b: 72 },
    Color::Rgb { r: 118, g: 90, b: 66 },
    Color::Rgb { r: 124, g: 94, b: 62 },
    Color::Rgb { r: 108, g: 82, b: 58 },
];

const BLOCK_B_COLORS: [Color; BLOCK_B_VARIANTS as usize] = [
    Color::Rgb { r: 96, g: 104, b: 120 },
    Color::Rgb { r: 88, g: 96, b: 112 },
];

fn tile_art(visual: TileVisual) -> Art {
    match visual {
        TileVisual::None => MISSING,
        TileVisual::Exit => Art {
            frames: &[&["[]"]],
            fg: Color::Black,
            bg: Some(Color::Green),
            anchor: Anchor::TopLeft,
        },
        TileVisual::Platform => Art {
            frames: &[&["=="]],
            fg: Color::Rgb { r: 190, g: 150, b: 90 },
            bg: None,
            anchor: Anchor::TopLeft,
        },
        TileVisual::BlockA(v) => Art {
            frames: &[&["██"]],
            fg: BLOCK_A_COLORS[v as usize % BLOCK_A_COLORS.len()],
            bg: None,
            anchor: Anchor::TopLeft,
        },
        TileVisual::BlockB(v) => Art {
            frames: &[&["▓▓"]],
            fg: BLOCK_B_COLORS[v as usize % BLOCK_B_COLORS.len()],
            bg: None,
            anchor: Anchor::TopLeft,
        },
    }
}

const PLAYER_FG: Color = Color::Rgb { r: 110, g: 200, b: 255 };

fn player_art(anim: PlayerAnimation) -> Art {
    // Drawn facing left; the renderer mirrors it for right-facing sprites.
    let frames: &'static [&'static [&'static str]] = match anim {
        PlayerAnimation::Idle => &[&[" o ", "/|\\"]],
        PlayerAnimation::Run => &[&["<o ", "/| "], &["<o ", " |\\"]],
        PlayerAnimation::Jump => &[&["\\o/", "/ \\"]],
        PlayerAnimation::Celebrate => &[&["\\o/", "/ \\"], &[" o ", "/|\\"]],
        PlayerAnimation::Die => &[&["   ", "_o_"]],
        PlayerAnimation::Attack => &[&[" o ", "-|\\"], &[" o ", "=|\\"]],
    };
    Art { frames, fg: PLAYER_FG, bg: None, anchor: Anchor::BottomCenter }
}

fn enemy_art(set: SpriteSet, anim: EnemyAnimation) -> Art {
    let fg = match set {
        SpriteSet::A => Color::Red,
        SpriteSet::B => Color::Magenta,
        SpriteSet::C => Color::DarkYellow,
        SpriteSet::D => Color::DarkRed,
    };
    let frames: &'static [&'static [&'static str]] = match anim {
        EnemyAnimation::Idle => &[&["(oo)", "/  \\"]],
        EnemyAnimation::Run => &[
            &["(oo)", "/  \\"],
            &["(oo)", " /\\ "],
        ],
        EnemyAnimation::Die => &[&["    ", "(xx)"], &["    ", " .. "]],
    };
    Art { frames, fg, bg: None, anchor: Anchor::BottomCenter }
}

const GEM_ART: Art = Art {
    frames: &[&["◆"]],
    fg: Color::Yellow,
    bg: None,
    anchor: Anchor::Center,
};

// ── Catalog ──

pub struct Catalog {
    entries: Vec<AssetEntry>,
    by_path: HashMap<String, AssetHandle>,
}

impl Catalog {
    pub const MISSING_HANDLE: AssetHandle = AssetHandle(0);

    pub fn new() -> Self {
        let mut catalog = Catalog { entries: Vec::new(), by_path: HashMap::new() };
        catalog.insert("", AssetEntry::Sprite(MISSING));

        let tiles = (0..BLOCK_A_VARIANTS as u8)
            .map(TileVisual::BlockA)
            .chain((0..BLOCK_B_VARIANTS as u8).map(TileVisual::BlockB))
            .chain([TileVisual::Platform, TileVisual::Exit]);
        for visual in tiles {
            if let Some(path) = visual.asset_path() {
                catalog.insert(&path, AssetEntry::Sprite(tile_art(visual)));
            }
        }

        for anim in PlayerAnimation::ALL {
            catalog.insert(anim.asset_path(), AssetEntry::Sprite(player_art(anim)));
        }

        for set in [SpriteSet::A, SpriteSet::B, SpriteSet::C, SpriteSet::D] {
            for anim in EnemyAnimation::ALL {
                let path = format!("{}/{}", set.asset_dir(), anim.name());
                catalog.insert(&path, AssetEntry::Sprite(enemy_art(set, anim)));
            }
        }

        catalog.insert(GEM_TEXTURE, AssetEntry::Sprite(GEM_ART));

        for id in SoundId::ALL {
            catalog.insert(id.asset_path(), AssetEntry::Sound(id));
        }

        debug!(entries = catalog.entries.len(), "asset catalog built");
        catalog
    }

    fn insert(&mut self, path: &str, entry: AssetEntry) {
        let handle = AssetHandle(self.entries.len() as u32);
        self.entries.push(entry);
        self.by_path.insert(path.to_string(), handle);
    }

    pub fn lookup(&self, path: &str) -> Option<AssetHandle> {
        self.by_path.get(path).copied()
    }

    pub fn entry(&self, handle: AssetHandle) -> AssetEntry {
        self.entries
            .get(handle.0 as usize)
            .copied()
            .unwrap_or(AssetEntry::Sprite(MISSING))
    }

    pub fn art(&self, handle: AssetHandle) -> Option<Art> {
        match self.entry(handle) {
            AssetEntry::Sprite(art) => Some(art),
            AssetEntry::Sound(_) => None,
        }
    }

    pub fn sound(&self, handle: AssetHandle) -> Option<SoundId> {
        match self.entry(handle) {
            AssetEntry::Sound(id) => Some(id),
            AssetEntry::Sprite(_) => None,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new()
    }
}

// ── Loader ──

/// Hands out catalog handles and counts how many loads of each are live.
pub struct TerminalLoader<'a> {
    catalog: &'a Catalog,
    live: HashMap<AssetHandle, u32>,
}

impl<'a> TerminalLoader<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        TerminalLoader { catalog, live: HashMap::new() }
    }

    /// Total outstanding loads.
    pub fn live_count(&self) -> u32 {
        self.live.values().sum()
    }
}

impl AssetLoader for TerminalLoader<'_> {
    fn load(&mut self, path: &str) -> AssetHandle {
        let handle = self.catalog.lookup(path).unwrap_or_else(|| {
            warn!(path, "unknown asset path");
            Catalog::MISSING_HANDLE
        });
        *self.live.entry(handle).or_insert(0) += 1;
        handle
    }

    fn release(&mut self, handle: AssetHandle) {
        match self.live.get_mut(&handle) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.live.remove(&handle);
            }
            None => warn!(handle = handle.0, "release of an asset that is not loaded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sim_path_is_known() {
        let catalog = Catalog::new();
        for v in 0..BLOCK_A_VARIANTS as u8 {
            let path = TileVisual::BlockA(v).asset_path().unwrap();
            assert!(catalog.lookup(&path).is_some(), "{path}");
        }
        assert!(catalog.lookup("Tiles/Exit").is_some());
        assert!(catalog.lookup("Sprites/MonsterD/Die").is_some());
        assert!(catalog.lookup(GEM_TEXTURE).is_some());
        for id in SoundId::ALL {
            let h = catalog.lookup(id.asset_path()).unwrap();
            assert_eq!(catalog.sound(h), Some(id));
        }
    }

    #[test]
    fn art_frames_are_rectangular() {
        let catalog = Catalog::new();
        for entry in &catalog.entries {
            if let AssetEntry::Sprite(art) = entry {
                for frame in art.frames {
                    assert_eq!(frame.len(), art.height());
                }
            }
        }
    }

    #[test]
    fn loader_counts_references() {
        let catalog = Catalog::new();
        let mut loader = TerminalLoader::new(&catalog);
        let a = loader.load("Sprites/Gem");
        let b = loader.load("Sprites/Gem");
        assert_eq!(a, b);
        assert_eq!(loader.live_count(), 2);

        loader.release(a);
        assert_eq!(loader.live_count(), 1);
        loader.release(b);
        assert_eq!(loader.live_count(), 0);
    }

    #[test]
    fn unknown_path_maps_to_placeholder() {
        let catalog = Catalog::new();
        let mut loader = TerminalLoader::new(&catalog);
        let h = loader.load("Sprites/Nope");
        assert_eq!(h, Catalog::MISSING_HANDLE);
        assert_eq!(catalog.art(h).map(|a| a.frame(0)[0]), Some("?"));
    }
}
