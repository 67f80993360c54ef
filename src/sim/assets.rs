/// Per-level asset binding and the draw pass.
///
/// `LevelAssets::load` asks the loader for every texture and sound the
/// level can use; `release` hands them all back. Teardown is explicit:
/// nothing is released on drop.
///
/// Draw order: tiles, gems, player, enemies. Every position handed to the
/// renderer is in screen space (world x minus camera position).

use std::collections::HashMap;

use crate::domain::ai;
use crate::domain::animation::{EnemyAnimation, PlayerAnimation};
use crate::domain::entity::SpriteSet;
use crate::domain::geometry::Vec2;
use crate::domain::grid::TileGrid;
use crate::domain::tile::{TileVisual, TILE_WIDTH};
use super::event::SoundId;
use super::ports::{AssetHandle, AssetLoader, SpriteRenderer};
use super::world::Level;

pub const GEM_TEXTURE: &str = "Sprites/Gem";

#[derive(Default)]
pub struct LevelAssets {
    tiles: HashMap<TileVisual, AssetHandle>,
    player: HashMap<PlayerAnimation, AssetHandle>,
    enemies: HashMap<(SpriteSet, EnemyAnimation), AssetHandle>,
    gem: Option<AssetHandle>,
    sounds: HashMap<SoundId, AssetHandle>,
}

impl LevelAssets {
    pub fn load(level: &Level, loader: &mut dyn AssetLoader) -> Self {
        let mut assets = LevelAssets::default();

        for (_, _, tile) in level.grid.iter() {
            if assets.tiles.contains_key(&tile.visual) {
                continue;
            }
            if let Some(path) = tile.visual.asset_path() {
                assets.tiles.insert(tile.visual, loader.load(&path));
            }
        }

        for anim in PlayerAnimation::ALL {
            assets.player.insert(anim, loader.load(anim.asset_path()));
        }

        for enemy in &level.enemies {
            for anim in EnemyAnimation::ALL {
                let key = (enemy.sprite_set, anim);
                if !assets.enemies.contains_key(&key) {
                    let path = format!("{}/{}", enemy.sprite_set.asset_dir(), anim.name());
                    assets.enemies.insert(key, loader.load(&path));
                }
            }
        }

        if !level.gems.is_empty() {
            assets.gem = Some(loader.load(GEM_TEXTURE));
        }

        for id in SoundId::ALL {
            assets.sounds.insert(id, loader.load(id.asset_path()));
        }

        assets
    }

    /// Hand every handle back to the loader.
    pub fn release(self, loader: &mut dyn AssetLoader) {
        let handles = self
            .tiles
            .into_values()
            .chain(self.player.into_values())
            .chain(self.enemies.into_values())
            .chain(self.gem)
            .chain(self.sounds.into_values());
        for handle in handles {
            loader.release(handle);
        }
    }

    pub fn sound(&self, id: SoundId) -> Option<AssetHandle> {
        self.sounds.get(&id).copied()
    }

    /// Advance animations by `elapsed` seconds and issue sprite draws.
    pub fn draw(&self, level: &mut Level, elapsed: f32, renderer: &mut dyn SpriteRenderer) {
        let camera = level.camera.position;
        self.draw_tiles(level, renderer);

        if let Some(gem) = self.gem {
            for g in &level.gems {
                renderer.draw_sprite(gem, to_screen(g.position(), camera), 0, false);
            }
        }

        let player = &mut level.player;
        let anim = player.sprite.current();
        let frame = player.sprite.advance(elapsed, &anim.animation());
        if let Some(&h) = self.player.get(&anim) {
            renderer.draw_sprite(h, to_screen(player.position, camera), frame, player.facing.sprite_flip());
        }

        let player_alive = level.player.alive;
        let time_exhausted = level.time_exhausted();
        for enemy in &mut level.enemies {
            let anim = ai::select_animation(enemy, player_alive, time_exhausted);
            enemy.sprite.play(anim);
            let frame = enemy.sprite.advance(elapsed, &anim.animation());
            if let Some(&h) = self.enemies.get(&(enemy.sprite_set, anim)) {
                renderer.draw_sprite(h, to_screen(enemy.position, camera), frame, enemy.facing.sprite_flip());
            }
        }
    }

    /// Only the columns under the viewport.
    fn draw_tiles(&self, level: &Level, renderer: &mut dyn SpriteRenderer) {
        let camera = level.camera.position;
        let width = level.grid.width();
        if width == 0 {
            return;
        }
        let left = (camera / TILE_WIDTH as f32).floor().max(0.0) as usize;
        let visible = (level.tuning.view.viewport_width / TILE_WIDTH as f32) as usize;
        let right = (left + visible).min(width - 1);

        for y in 0..level.grid.height() {
            for x in left..=right {
                let Some(tile) = level.grid.tile(x, y) else { continue };
                if let Some(&h) = self.tiles.get(&tile.visual) {
                    let b = TileGrid::bounds(x as i32, y as i32);
                    let pos = to_screen(Vec2::new(b.left as f32, b.top as f32), camera);
                    renderer.draw_sprite(h, pos, 0, false);
                }
            }
        }
    }
}

fn to_screen(world: Vec2, camera: f32) -> Vec2 {
    Vec2::new(world.x - camera, world.y)
}
