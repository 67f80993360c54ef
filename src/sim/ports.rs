/// Collaborator ports. The simulation calls out through these traits and
/// never touches a terminal, a sound device or a file handle itself.

use crate::domain::controls::InputSnapshot;
use crate::domain::geometry::Vec2;

/// Opaque handle to a loaded texture or sound.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AssetHandle(pub u32);

pub trait AssetLoader {
    /// Load the asset at `path` (e.g. `"Tiles/BlockA3"`, `"Sounds/GemCollected"`).
    fn load(&mut self, path: &str) -> AssetHandle;
    fn release(&mut self, handle: AssetHandle);
}

pub trait AudioPort {
    fn play(&mut self, sound: AssetHandle);
}

pub trait SpriteRenderer {
    /// `position` is the sprite's anchor in screen space (world minus
    /// camera). The anchor kind is a property of the asset.
    fn draw_sprite(&mut self, sprite: AssetHandle, position: Vec2, frame: usize, flip: bool);
}

pub trait InputPort {
    fn snapshot(&mut self) -> InputSnapshot;
}

/// Recording fakes shared by the sim tests.
#[cfg(test)]
pub mod fakes {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub struct RecordingLoader {
        next: u32,
        pub paths: HashMap<AssetHandle, String>,
        pub released: Vec<AssetHandle>,
    }

    impl RecordingLoader {
        pub fn live(&self) -> usize {
            self.paths.len() - self.released.len()
        }

        pub fn path(&self, handle: AssetHandle) -> &str {
            self.paths.get(&handle).map(String::as_str).unwrap_or("")
        }
    }

    impl AssetLoader for RecordingLoader {
        fn load(&mut self, path: &str) -> AssetHandle {
            let h = AssetHandle(self.next);
            self.next += 1;
            self.paths.insert(h, path.to_string());
            h
        }

        fn release(&mut self, handle: AssetHandle) {
            self.released.push(handle);
        }
    }

    #[derive(Default)]
    pub struct RecordingAudio {
        pub played: Vec<AssetHandle>,
    }

    impl AudioPort for RecordingAudio {
        fn play(&mut self, sound: AssetHandle) {
            self.played.push(sound);
        }
    }

    #[derive(Default)]
    pub struct RecordingRenderer {
        pub calls: Vec<(AssetHandle, Vec2, usize, bool)>,
    }

    impl SpriteRenderer for RecordingRenderer {
        fn draw_sprite(&mut self, sprite: AssetHandle, position: Vec2, frame: usize, flip: bool) {
            self.calls.push((sprite, position, frame, flip));
        }
    }
}
