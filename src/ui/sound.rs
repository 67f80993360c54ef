/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time, one
/// per `SoundId`. Playback is fire-and-forget (non-blocking) via rodio's
/// Sink.
///
/// `SoundBoard` is the audio port the session plays through: it turns an
/// asset handle back into a `SoundId` via the catalog.
///
/// Compile without the "sound" feature to disable audio entirely (the
/// stub SoundEngine does nothing).

use tracing::trace;

use crate::sim::event::SoundId;
use crate::sim::ports::{AssetHandle, AudioPort};
use super::assets::Catalog;

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::{info, warn};

    use crate::sim::event::SoundId;

    pub(super) const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: HashMap<SoundId, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };

            let buffers = SoundId::ALL
                .iter()
                .map(|&id| (id, Arc::new(make_wav(&generate(id)))))
                .collect();
            info!("sound engine ready");

            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, id: SoundId) {
            let Some(buf) = self.buffers.get(&id) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    pub(super) fn generate(id: SoundId) -> Vec<f32> {
        match id {
            SoundId::PlayerJump => gen_jump(),
            SoundId::PlayerKilled => gen_killed(),
            SoundId::PlayerFall => gen_fall(),
            SoundId::MonsterKilled => gen_monster_killed(),
            SoundId::GemCollected => gen_gem(),
            SoundId::ExitReached => gen_exit(),
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    const TAU: f32 = std::f32::consts::TAU;

    fn samples_for(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Frequency sweep from `from` to `to` Hz with a fade-out.
    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(duration);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq * TAU / SAMPLE_RATE as f32;
                phase.sin() * (1.0 - t).powf(0.6) * volume
            })
            .collect()
    }

    /// A run of short notes, sine plus a touch of harmonics for a retro feel.
    fn notes(freqs: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in freqs {
            let n = samples_for(note_dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Jump: quick rising chirp
    fn gen_jump() -> Vec<f32> {
        sweep(320.0, 880.0, 0.12, 0.25)
    }

    /// Fall into a pit: long descending whistle
    fn gen_fall() -> Vec<f32> {
        sweep(900.0, 150.0, 0.45, 0.25)
    }

    /// Killed by a monster: sad descending tones A4→F#4→Eb4→C4
    fn gen_killed() -> Vec<f32> {
        let mut samples = notes(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.3);
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    /// Monster killed: noise burst over a falling tone
    fn gen_monster_killed() -> Vec<f32> {
        let n = samples_for(0.16);
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 180.0 + (1.0 - t) * 320.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * TAU).sin();
                // Simple LCG noise
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.5 + noise * 0.5) * (1.0 - t).powf(0.8) * 0.3
            })
            .collect()
    }

    /// Gem: ascending arpeggio C6→E6→G6
    fn gen_gem() -> Vec<f32> {
        notes(&[1047.0, 1319.0, 1568.0], 0.045, 0.25)
    }

    /// Exit reached: fanfare C5→E5→G5→C6 with a held last note
    fn gen_exit() -> Vec<f32> {
        let mut samples = notes(&[523.0, 659.0, 784.0, 1047.0], 0.1, 0.3);
        samples.extend(notes(&[1047.0], 0.3, 0.3));
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _id: SoundId) {}
}

/// Audio port backed by the catalog and an optional engine.
pub struct SoundBoard<'a> {
    catalog: &'a Catalog,
    engine: Option<SoundEngine>,
    muted: bool,
}

impl<'a> SoundBoard<'a> {
    pub fn new(catalog: &'a Catalog, engine: Option<SoundEngine>) -> Self {
        SoundBoard { catalog, engine, muted: false }
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }
}

impl AudioPort for SoundBoard<'_> {
    fn play(&mut self, sound: AssetHandle) {
        if self.muted {
            return;
        }
        let id: SoundId = match self.catalog.sound(sound) {
            Some(id) => id,
            None => return,
        };
        trace!(?id, "play sound");
        if let Some(engine) = &self.engine {
            engine.play(id);
        }
    }
}

#[cfg(all(test, feature = "sound"))]
mod tests {
    use super::inner::{generate, make_wav, SAMPLE_RATE};
    use super::*;

    #[test]
    fn every_sound_renders_a_valid_wav() {
        for id in SoundId::ALL {
            let samples = generate(id);
            assert!(!samples.is_empty(), "{id:?}");
            assert!(samples.iter().all(|s| s.abs() <= 1.0));

            let wav = make_wav(&samples);
            assert_eq!(&wav[..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
            assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), SAMPLE_RATE);
        }
    }

    #[test]
    fn sound_board_ignores_sprite_handles() {
        let catalog = Catalog::new();
        let mut board = SoundBoard::new(&catalog, None);
        let gem = catalog.lookup("Sprites/Gem").unwrap();
        board.play(gem);
        assert!(board.toggle_mute());
        board.play(catalog.lookup(SoundId::PlayerJump.asset_path()).unwrap());
    }
}
