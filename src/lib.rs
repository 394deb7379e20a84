//! # Podcast TTS
//!
//! Converts a speaker-tagged script into one audio file. Each speaker block
//! is spoken by an external text-to-speech engine using that speaker's voice,
//! short randomized pauses are placed between blocks, and the result is
//! written once as a mono WAV.
//!
//! ```rust,no_run
//! # #[cfg(feature = "python")]
//! # fn main() -> podcast_tts::Result<()> {
//! use podcast_tts::python::KokoroFactory;
//! use podcast_tts::{Config, PodcastGenerator};
//!
//! let config = Config::default();
//! let factory = KokoroFactory::new(config.engine.clone())?;
//! let mut generator = PodcastGenerator::new(config, factory)?;
//! generator.generate("Host:\nWelcome!\n\nGuest:\nThanks.", "episode.wav")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "python"))]
//! # fn main() {}
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod pause;
pub mod pipeline;
#[cfg(feature = "python")]
pub mod python;
pub mod script;
pub mod speakers;
pub mod synthesis;

pub use audio::{AudioOutput, SampleEncoding};
pub use config::Config;
pub use error::{PodcastError, Result};
pub use pipeline::{Assembly, AudioPiece, GenerationReport, PodcastGenerator, SegmentFailure};
pub use script::{parse_script, Segment};
pub use speakers::{SpeakerConfig, SpeakerRegistry};
pub use synthesis::{EngineFactory, SpeechChunk, SpeechEngine, SynthesisRequest, Synthesizer};
