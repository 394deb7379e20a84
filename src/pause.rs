//! Silence between segments

use crate::audio;
use crate::config::{PauseConfig, MAX_PAUSE_SECONDS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces jittered silence.
///
/// The random source is a type parameter so callers can supply a seeded
/// generator and get reproducible pause lengths.
pub struct PauseGenerator<R = StdRng> {
    rng: R,
    sample_rate: u32,
    jitter_seconds: f32,
}

impl PauseGenerator<StdRng> {
    /// Generator seeded from the operating system
    pub fn new(sample_rate: u32, jitter_seconds: f32) -> Self {
        Self::with_rng(StdRng::from_os_rng(), sample_rate, jitter_seconds)
    }

    /// Generator with a fixed seed
    pub fn seeded(seed: u64, sample_rate: u32, jitter_seconds: f32) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), sample_rate, jitter_seconds)
    }

    /// Build from pause settings, honoring `seed` when present
    pub fn from_config(config: &PauseConfig, sample_rate: u32) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed, sample_rate, config.jitter_seconds),
            None => Self::new(sample_rate, config.jitter_seconds),
        }
    }
}

impl<R: Rng> PauseGenerator<R> {
    /// Generator drawing jitter from `rng`.
    ///
    /// Jitter is clamped to `0..=MAX_PAUSE_SECONDS`; a non-finite value
    /// disables it.
    pub fn with_rng(rng: R, sample_rate: u32, jitter_seconds: f32) -> Self {
        let jitter_seconds = if jitter_seconds.is_finite() {
            jitter_seconds.abs().min(MAX_PAUSE_SECONDS)
        } else {
            0.0
        };
        Self {
            rng,
            sample_rate,
            jitter_seconds,
        }
    }

    /// Sample rate of produced silence
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Draw a pause length: `base` plus uniform jitter, kept within
    /// `0..=MAX_PAUSE_SECONDS + jitter`
    pub fn duration(&mut self, base_seconds: f32) -> f32 {
        let base_seconds = base_seconds.clamp(0.0, MAX_PAUSE_SECONDS);
        let jitter = self
            .rng
            .random_range(-self.jitter_seconds..=self.jitter_seconds);
        (base_seconds + jitter).max(0.0)
    }

    /// Silence of roughly `base_seconds`
    pub fn pause(&mut self, base_seconds: f32) -> Vec<f32> {
        let seconds = self.duration(base_seconds);
        audio::silence(seconds, self.sample_rate)
    }
}

/// Base pause length after a segment by `speaker`, given who spoke before it
pub fn base_pause(config: &PauseConfig, previous: Option<&str>, speaker: &str) -> f32 {
    if previous == Some(speaker) {
        config.same_speaker_seconds
    } else {
        config.speaker_change_seconds
    }
}
