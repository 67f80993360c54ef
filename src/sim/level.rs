/// Level loader: character map → tile grid + entity placements.
///
/// ## Sources (priority order):
///   1. `levels/` directory: `0.txt`, `1.txt`, … read until the first gap
///   2. Built-in embedded levels
///
/// ## Format
///   One line per row, one character per tile. Every row must be as wide
///   as the first one.
///
/// ## Tile legend:
///   '.' = Empty                  'X' = Exit (exactly one)
///   'G' = Gem                    '-' = Platform
///   '~' = Platform (block B)     ':' = Passable decoration (block B)
///   '#' = Solid block (block A)  '1' = Player start (exactly one)
///   'A'..'D' = Enemy with that sprite set

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::entity::SpriteSet;
use crate::domain::geometry::{Point, Vec2};
use crate::domain::grid::TileGrid;
use crate::domain::tile::{Tile, TileKind, TileVisual, BLOCK_A_VARIANTS, BLOCK_B_VARIANTS};
use super::rng::VariantSource;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("row {row} is {actual} tiles wide, expected {expected}")]
    Format { row: usize, expected: usize, actual: usize },
    #[error("unsupported tile '{ch}' at row {row}, column {column}")]
    UnsupportedTile { ch: char, row: usize, column: usize },
    #[error("level has no start point")]
    MissingStart,
    #[error("second start point at row {row}, column {column}")]
    DuplicateStart { row: usize, column: usize },
    #[error("level has no exit")]
    MissingExit,
    #[error("second exit at row {row}, column {column}")]
    DuplicateExit { row: usize, column: usize },
    #[error("no levels to play")]
    NoLevels,
    #[error("cannot read level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct EnemySpawn {
    pub position: Vec2,
    pub sprite_set: SpriteSet,
}

/// A parsed level, before any entity is created.
#[derive(Clone, Debug)]
pub struct LevelLayout {
    pub grid: TileGrid,
    /// Player feet position (bottom-center of the start tile).
    pub start: Vec2,
    /// Center of the exit tile.
    pub exit: Point,
    pub gems: Vec<Vec2>,
    pub enemies: Vec<EnemySpawn>,
}

/// Raw level text plus a display name.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub text: String,
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

pub fn parse_layout(text: &str, variants: &mut dyn VariantSource) -> Result<LevelLayout, LevelError> {
    let rows: Vec<Vec<char>> = text.lines().map(|l| l.chars().collect()).collect();

    let width = rows.first().map_or(0, |r| r.len());
    for (row, line) in rows.iter().enumerate() {
        if line.len() != width {
            return Err(LevelError::Format { row, expected: width, actual: line.len() });
        }
    }
    let height = rows.len();

    let mut tiles = Vec::with_capacity(width * height);
    let mut start: Option<Vec2> = None;
    let mut exit: Option<Point> = None;
    let mut gems = vec![];
    let mut enemies = vec![];

    for (y, line) in rows.iter().enumerate() {
        for (x, &ch) in line.iter().enumerate() {
            let bounds = TileGrid::bounds(x as i32, y as i32);
            let tile = match ch {
                '.' => Tile::EMPTY,
                'X' => {
                    if exit.is_some() {
                        return Err(LevelError::DuplicateExit { row: y, column: x });
                    }
                    exit = Some(bounds.center());
                    Tile::new(TileVisual::Exit, TileKind::Passable)
                }
                'G' => {
                    let c = bounds.center();
                    gems.push(Vec2::new(c.x as f32, c.y as f32));
                    Tile::EMPTY
                }
                '-' => Tile::new(TileVisual::Platform, TileKind::Platform),
                '~' => Tile::new(block_b(variants), TileKind::Platform),
                ':' => Tile::new(block_b(variants), TileKind::Passable),
                '#' => Tile::new(block_a(variants), TileKind::Impassable),
                '1' => {
                    if start.is_some() {
                        return Err(LevelError::DuplicateStart { row: y, column: x });
                    }
                    start = Some(bounds.bottom_center());
                    Tile::EMPTY
                }
                _ => match SpriteSet::from_char(ch) {
                    Some(sprite_set) => {
                        enemies.push(EnemySpawn { position: bounds.bottom_center(), sprite_set });
                        Tile::EMPTY
                    }
                    None => {
                        return Err(LevelError::UnsupportedTile { ch, row: y, column: x });
                    }
                },
            };
            tiles.push(tile);
        }
    }

    let start = start.ok_or(LevelError::MissingStart)?;
    let exit = exit.ok_or(LevelError::MissingExit)?;

    Ok(LevelLayout {
        grid: TileGrid::from_tiles(width, height, tiles),
        start,
        exit,
        gems,
        enemies,
    })
}

fn block_a(variants: &mut dyn VariantSource) -> TileVisual {
    TileVisual::BlockA(variants.next_variant(BLOCK_A_VARIANTS) as u8)
}

fn block_b(variants: &mut dyn VariantSource) -> TileVisual {
    TileVisual::BlockB(variants.next_variant(BLOCK_B_VARIANTS) as u8)
}

// ══════════════════════════════════════════════════════════════
// Level sources
// ══════════════════════════════════════════════════════════════

/// Levels from `dir` (`0.txt`, `1.txt`, …), or the embedded set when the
/// directory is missing or has no `0.txt`.
pub fn load_level_defs(dir: &Path) -> Result<Vec<LevelDef>, LevelError> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "levels directory not found, using built-in levels");
        return Ok(embedded_levels());
    }

    let mut levels = vec![];
    for index in 0.. {
        let path = dir.join(format!("{index}.txt"));
        if !path.is_file() {
            break;
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|source| LevelError::Io { path: path.clone(), source })?;
        levels.push(LevelDef { name: format!("Level {}", index + 1), text });
    }

    if levels.is_empty() {
        debug!(dir = %dir.display(), "no level files, using built-in levels");
        return Ok(embedded_levels());
    }
    info!(count = levels.len(), dir = %dir.display(), "loaded level files");
    Ok(levels)
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Level 1", include_str!("../../levels/0.txt")),
        make_embedded("Level 2", include_str!("../../levels/1.txt")),
        make_embedded("Level 3", include_str!("../../levels/2.txt")),
    ]
}

fn make_embedded(name: &str, text: &str) -> LevelDef {
    LevelDef { name: name.to_string(), text: text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::SeededVariants;

    /// Replays a fixed sequence of variants.
    struct Scripted(Vec<u32>, usize);

    impl VariantSource for Scripted {
        fn next_variant(&mut self, count: u32) -> u32 {
            let v = self.0[self.1 % self.0.len()] % count;
            self.1 += 1;
            v
        }
    }

    fn parse(rows: &[&str]) -> Result<LevelLayout, LevelError> {
        parse_layout(&rows.join("\n"), &mut SeededVariants::default())
    }

    #[test]
    fn minimal_level_loads() {
        let layout = parse(&["#####", "#1..X", "#####"]).unwrap();
        assert_eq!(layout.grid.width(), 5);
        assert_eq!(layout.grid.height(), 3);
        // Bottom-center of tile (1,1)
        assert_eq!(layout.start, Vec2::new(60.0, 64.0));
        // Center of tile (4,1)
        assert_eq!(layout.exit, Point { x: 180, y: 48 });
        assert_eq!(layout.grid.collision_at(0, 0), TileKind::Impassable);
        assert_eq!(layout.grid.collision_at(4, 1), TileKind::Passable);
    }

    #[test]
    fn entities_and_tiles_are_placed() {
        let layout = parse(&["G.-~:", "1A..X", "#####"]).unwrap();
        assert_eq!(layout.gems, vec![Vec2::new(20.0, 16.0)]);
        assert_eq!(
            layout.enemies,
            vec![EnemySpawn { position: Vec2::new(60.0, 64.0), sprite_set: SpriteSet::A }]
        );
        assert_eq!(layout.grid.collision_at(2, 0), TileKind::Platform);
        assert_eq!(layout.grid.collision_at(3, 0), TileKind::Platform);
        assert_eq!(layout.grid.collision_at(4, 0), TileKind::Passable);
        assert!(matches!(layout.grid.tile(4, 0).map(|t| t.visual), Some(TileVisual::BlockB(_))));
    }

    #[test]
    fn variants_come_from_the_source() {
        let mut src = Scripted(vec![3, 1, 6], 0);
        let layout = parse_layout("###\n1.X", &mut src).unwrap();
        let visuals: Vec<_> = (0..3).filter_map(|x| layout.grid.tile(x, 0)).map(|t| t.visual).collect();
        assert_eq!(
            visuals,
            vec![TileVisual::BlockA(3), TileVisual::BlockA(1), TileVisual::BlockA(6)]
        );
    }

    #[test]
    fn same_seed_same_level() {
        let text = "#:#~#\n1...X";
        let a = parse_layout(text, &mut SeededVariants::new(9)).unwrap();
        let b = parse_layout(text, &mut SeededVariants::new(9)).unwrap();
        let va: Vec<_> = a.grid.iter().map(|(_, _, t)| *t).collect();
        let vb: Vec<_> = b.grid.iter().map(|(_, _, t)| *t).collect();
        assert_eq!(va, vb);
    }

    #[test]
    fn ragged_rows_fail() {
        let err = parse(&["#####", "#1.X", "#####"]).unwrap_err();
        assert!(matches!(err, LevelError::Format { row: 1, expected: 5, actual: 4 }));
    }

    #[test]
    fn unknown_character_fails() {
        let err = parse(&["#####", "#1.?X", "#####"]).unwrap_err();
        assert!(matches!(err, LevelError::UnsupportedTile { ch: '?', row: 1, column: 3 }));
    }

    #[test]
    fn start_must_be_unique() {
        assert!(matches!(parse(&["...X", "####"]).unwrap_err(), LevelError::MissingStart));
        assert!(matches!(
            parse(&["1.1X", "####"]).unwrap_err(),
            LevelError::DuplicateStart { row: 0, column: 2 }
        ));
    }

    #[test]
    fn exit_must_be_unique() {
        assert!(matches!(parse(&["1...", "####"]).unwrap_err(), LevelError::MissingExit));
        assert!(matches!(
            parse(&["1X.X", "####"]).unwrap_err(),
            LevelError::DuplicateExit { row: 0, column: 3 }
        ));
    }

    #[test]
    fn embedded_levels_all_parse() {
        for def in embedded_levels() {
            let r = parse_layout(&def.text, &mut SeededVariants::default());
            assert!(r.is_ok(), "{}: {:?}", def.name, r.err());
        }
    }

    #[test]
    fn missing_directory_falls_back() {
        let defs = load_level_defs(Path::new("/definitely/not/here")).unwrap();
        assert_eq!(defs.len(), embedded_levels().len());
    }

    #[test]
    fn directory_levels_in_numeric_order() {
        let dir = std::env::temp_dir().join(format!("ninjarun-levels-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("0.txt"), "1.X\n###").unwrap();
        std::fs::write(dir.join("1.txt"), "X.1\n###").unwrap();
        std::fs::write(dir.join("3.txt"), "ignored").unwrap();

        let defs = load_level_defs(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].text, "1.X\n###");
        assert_eq!(defs[1].name, "Level 2");
    }
}
