/// Session: level rotation, continue handling, HUD status.
///
/// The session owns the level list, the live `Level` and its bound
/// assets. Collaborators are passed in per call, never stored.
///
/// Level switches parse the new level first, so a broken level file
/// leaves the current level running and the error goes to the caller.

use std::time::Duration;

use tracing::{info, warn};

use crate::domain::controls::{self, InputSnapshot};
use super::assets::LevelAssets;
use super::event::GameEvent;
use super::level::{parse_layout, LevelDef, LevelError};
use super::ports::{AssetLoader, AudioPort, SpriteRenderer};
use super::rng::SeededVariants;
use super::step::{self, GameTime};
use super::world::{Level, Tuning};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Overlay {
    YouWin,
    TimeUp,
    YouDied,
}

/// What the status bar shows.
#[derive(Clone, PartialEq, Debug)]
pub struct Hud {
    pub level_name: String,
    pub time_remaining: Duration,
    pub score: u32,
    /// Timer drawn in the warning color this frame.
    pub warning: bool,
    pub overlay: Option<Overlay>,
}

pub struct Session {
    levels: Vec<LevelDef>,
    index: usize,
    level: Level,
    assets: LevelAssets,
    tuning: Tuning,
    seed: u64,
    total: Duration,
}

impl Session {
    /// Start at the first level. Fails if `levels` is empty or the first
    /// level does not parse.
    pub fn new(
        levels: Vec<LevelDef>,
        tuning: Tuning,
        seed: u64,
        loader: &mut dyn AssetLoader,
    ) -> Result<Self, LevelError> {
        let first = levels.first().ok_or(LevelError::NoLevels)?;
        let level = build_level(first, tuning, seed)?;
        let assets = LevelAssets::load(&level, loader);
        info!(name = %first.name, count = levels.len(), "session started");
        Ok(Session { levels, index: 0, level, assets, tuning, seed, total: Duration::ZERO })
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn level_name(&self) -> &str {
        &self.levels[self.index].name
    }

    // ── Level switching ──

    pub fn load_next_level(&mut self, loader: &mut dyn AssetLoader) -> Result<(), LevelError> {
        let next = (self.index + 1) % self.levels.len();
        self.load_level(next, loader)
    }

    pub fn reload_current_level(&mut self, loader: &mut dyn AssetLoader) -> Result<(), LevelError> {
        self.load_level(self.index, loader)
    }

    fn load_level(&mut self, index: usize, loader: &mut dyn AssetLoader) -> Result<(), LevelError> {
        let def = &self.levels[index];
        let level = match build_level(def, self.tuning, self.seed) {
            Ok(level) => level,
            Err(e) => {
                warn!(name = %def.name, error = %e, "level failed to load");
                return Err(e);
            }
        };
        info!(name = %def.name, index, "loading level");

        std::mem::take(&mut self.assets).release(loader);
        self.assets = LevelAssets::load(&level, loader);
        self.level = level;
        self.index = index;
        Ok(())
    }

    /// Release the current level's assets. The session is unusable after.
    pub fn shutdown(self, loader: &mut dyn AssetLoader) {
        self.assets.release(loader);
    }

    // ── Per-frame ──

    /// Handle continue, run one simulation step and play its sounds.
    pub fn tick(
        &mut self,
        elapsed: Duration,
        snapshot: &InputSnapshot,
        loader: &mut dyn AssetLoader,
        audio: &mut dyn AudioPort,
    ) -> Result<Vec<GameEvent>, LevelError> {
        if snapshot.continue_pressed {
            self.handle_continue(loader)?;
        }

        self.total += elapsed;
        let input = controls::resolve(snapshot, &self.tuning.physics);
        let events = step::update(&mut self.level, GameTime::new(elapsed, self.total), input);
        self.play_sounds(&events, audio);
        Ok(events)
    }

    fn handle_continue(&mut self, loader: &mut dyn AssetLoader) -> Result<(), LevelError> {
        if !self.level.player.alive {
            info!("new life");
            self.level.start_new_life();
        } else if self.level.time_exhausted() {
            if self.level.reached_exit {
                self.load_next_level(loader)?;
            } else {
                self.reload_current_level(loader)?;
            }
        }
        Ok(())
    }

    pub fn play_sounds(&self, events: &[GameEvent], audio: &mut dyn AudioPort) {
        for event in events {
            if let Some(handle) = self.assets.sound(event.sound()) {
                audio.play(handle);
            }
        }
    }

    pub fn draw(&mut self, elapsed: Duration, renderer: &mut dyn SpriteRenderer) {
        self.assets.draw(&mut self.level, elapsed.as_secs_f32(), renderer);
    }

    pub fn hud(&self) -> Hud {
        let level = &self.level;
        let remaining = level.time_remaining;
        let warning = remaining <= self.tuning.scoring.warning_time
            && !level.reached_exit
            && remaining.as_secs() % 2 == 1;

        let overlay = if level.time_exhausted() {
            Some(if level.reached_exit { Overlay::YouWin } else { Overlay::TimeUp })
        } else if !level.player.alive {
            Some(Overlay::YouDied)
        } else {
            None
        };

        Hud {
            level_name: self.level_name().to_string(),
            time_remaining: remaining,
            score: level.score,
            warning,
            overlay,
        }
    }
}

fn build_level(def: &LevelDef, tuning: Tuning, seed: u64) -> Result<Level, LevelError> {
    let layout = parse_layout(&def.text, &mut SeededVariants::new(seed))?;
    Ok(Level::new(layout, tuning))
}
