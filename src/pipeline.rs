//! Script-to-audio assembly
//!
//! Segments are spoken strictly in order. After every spoken segment a pause
//! is appended: long when the speaker differs from the previous segment's
//! speaker (or there is none), short when the same speaker continues.
//! Unregistered speakers are skipped, and a segment whose synthesis fails is
//! replaced by an empty buffer so the rest of the script still renders.

use crate::audio::{self, AudioOutput};
use crate::config::{AudioConfig, Config, PauseConfig};
use crate::error::{PodcastError, Result};
use crate::pause::{self, PauseGenerator};
use crate::script::{parse_script, Segment};
use crate::speakers::{SpeakerConfig, SpeakerRegistry};
use crate::synthesis::{EngineFactory, Synthesizer};
use rand::rngs::StdRng;
use rand::Rng;
use std::path::{Path, PathBuf};

/// One buffer of the output timeline
#[derive(Debug, Clone, PartialEq)]
pub enum AudioPiece {
    /// Speech for a segment; empty when synthesis failed
    Speech {
        /// Index of the segment in the parsed script
        segment: usize,
        /// Who spoke
        speaker: String,
        /// Samples at the output rate
        samples: Vec<f32>,
    },
    /// Silence following a segment
    Pause {
        /// Nominal length before jitter
        base_seconds: f32,
        /// Silent samples at the output rate
        samples: Vec<f32>,
    },
}

impl AudioPiece {
    /// Samples of this piece
    pub fn samples(&self) -> &[f32] {
        match self {
            AudioPiece::Speech { samples, .. } | AudioPiece::Pause { samples, .. } => samples,
        }
    }

    /// Whether this piece is silence
    pub fn is_pause(&self) -> bool {
        matches!(self, AudioPiece::Pause { .. })
    }
}

/// A segment that was kept in the timeline as an empty buffer
#[derive(Debug)]
pub struct SegmentFailure {
    /// Index of the segment in the parsed script
    pub segment: usize,
    /// Speaker of the segment
    pub speaker: String,
    /// What went wrong
    pub error: PodcastError,
}

/// The ordered timeline built from a script, before it is written out
#[derive(Debug, Default)]
pub struct Assembly {
    /// Speech and pause buffers in playback order
    pub pieces: Vec<AudioPiece>,
    /// Segments handed to the assembler
    pub segments: usize,
    /// Segments that produced speech without error
    pub spoken: usize,
    /// Speakers of skipped segments, in order
    pub skipped_speakers: Vec<String>,
    /// Segments replaced by empty audio
    pub failures: Vec<SegmentFailure>,
}

impl Assembly {
    /// Concatenate all pieces into one buffer
    pub fn samples(&self) -> Vec<f32> {
        audio::concat(self.pieces.iter().map(AudioPiece::samples))
    }

    /// Total number of samples across pieces
    pub fn len(&self) -> usize {
        self.pieces.iter().map(|p| p.samples().len()).sum()
    }

    /// Whether the timeline holds no samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Summary of a finished run
#[derive(Debug)]
pub struct GenerationReport {
    /// Where the audio was written
    pub output_path: PathBuf,
    /// Segments parsed from the script
    pub segments: usize,
    /// Segments that produced speech without error
    pub spoken: usize,
    /// Speakers of skipped segments, in order
    pub skipped_speakers: Vec<String>,
    /// Segments replaced by empty audio
    pub failures: Vec<SegmentFailure>,
    /// Samples written
    pub samples: usize,
    /// Length of the written audio
    pub duration_seconds: f32,
}

/// Turns scripts into a single audio file.
///
/// Holds the speaker registry, the engine cache and the pause source for
/// its whole lifetime; runs are sequential and share the engine cache.
pub struct PodcastGenerator<F: EngineFactory, R = StdRng> {
    speakers: SpeakerRegistry,
    audio: AudioConfig,
    pause: PauseConfig,
    synthesizer: Synthesizer<F>,
    pauses: PauseGenerator<R>,
}

impl<F: EngineFactory> PodcastGenerator<F> {
    /// Create a generator; pauses are seeded from `config.pause.seed` when set
    pub fn new(config: Config, factory: F) -> Result<Self> {
        config.validate()?;
        let pauses = PauseGenerator::from_config(&config.pause, config.audio.sample_rate);
        Ok(Self::assemble_parts(config, factory, pauses))
    }
}

impl<F: EngineFactory, R: Rng> PodcastGenerator<F, R> {
    /// Create a generator drawing pause jitter from `rng`
    pub fn with_rng(config: Config, factory: F, rng: R) -> Result<Self> {
        config.validate()?;
        let pauses =
            PauseGenerator::with_rng(rng, config.audio.sample_rate, config.pause.jitter_seconds);
        Ok(Self::assemble_parts(config, factory, pauses))
    }

    fn assemble_parts(config: Config, factory: F, pauses: PauseGenerator<R>) -> Self {
        Self {
            speakers: config.speakers,
            audio: config.audio,
            pause: config.pause,
            synthesizer: Synthesizer::new(factory),
            pauses,
        }
    }

    /// Registered speakers
    pub fn speakers(&self) -> &SpeakerRegistry {
        &self.speakers
    }

    /// The engine cache
    pub fn synthesizer(&self) -> &Synthesizer<F> {
        &self.synthesizer
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.audio.sample_rate
    }

    /// Render `script` and write it to `output_path`, returning the path
    pub fn generate<P: AsRef<Path>>(&mut self, script: &str, output_path: P) -> Result<PathBuf> {
        self.generate_with_report(script, output_path)
            .map(|report| report.output_path)
    }

    /// Render `script`, write it to `output_path`, and describe the run
    pub fn generate_with_report<P: AsRef<Path>>(
        &mut self,
        script: &str,
        output_path: P,
    ) -> Result<GenerationReport> {
        let output_path = output_path.as_ref().to_path_buf();
        let assembly = self.assemble(script);
        let samples = assembly.samples();

        if samples.is_empty() {
            tracing::warn!("No audio produced, writing an empty file");
        }

        audio::write_wav(
            &output_path,
            &samples,
            self.audio.sample_rate,
            self.audio.encoding,
        )?;

        let duration_seconds = audio::duration_seconds(&samples, self.audio.sample_rate);
        tracing::info!(
            "Wrote {} ({:.2}s, {} of {} segment(s) spoken, {} failed)",
            output_path.display(),
            duration_seconds,
            assembly.spoken,
            assembly.segments,
            assembly.failures.len()
        );

        Ok(GenerationReport {
            output_path,
            segments: assembly.segments,
            spoken: assembly.spoken,
            skipped_speakers: assembly.skipped_speakers,
            failures: assembly.failures,
            samples: samples.len(),
            duration_seconds,
        })
    }

    /// Parse `script` against the registry and build its timeline
    pub fn assemble(&mut self, script: &str) -> Assembly {
        let segments = parse_script(script, &self.speakers);
        self.assemble_segments(&segments)
    }

    /// Build the timeline for already parsed segments
    pub fn assemble_segments(&mut self, segments: &[Segment]) -> Assembly {
        let mut assembly = Assembly {
            segments: segments.len(),
            ..Assembly::default()
        };
        let total = segments.len();
        let mut previous: Option<&str> = None;

        for (index, segment) in segments.iter().enumerate() {
            let speaker = match self.speakers.require(&segment.speaker) {
                Ok(speaker) => speaker,
                Err(e) => {
                    tracing::warn!("Skipping segment {}: {}", index + 1, e);
                    assembly.skipped_speakers.push(segment.speaker.clone());
                    continue;
                }
            };

            tracing::info!(
                "[{}/{}] {}: {}",
                index + 1,
                total,
                segment.speaker,
                preview(&segment.text)
            );

            let samples = match speak(&mut self.synthesizer, segment, speaker, self.audio.sample_rate)
            {
                Ok(samples) => {
                    assembly.spoken += 1;
                    samples
                }
                Err(error) => {
                    tracing::warn!(
                        "Segment {} ({}) failed, substituting empty audio: {}",
                        index + 1,
                        segment.speaker,
                        error
                    );
                    assembly.failures.push(SegmentFailure {
                        segment: index,
                        speaker: segment.speaker.clone(),
                        error,
                    });
                    Vec::new()
                }
            };

            assembly.pieces.push(AudioPiece::Speech {
                segment: index,
                speaker: segment.speaker.clone(),
                samples,
            });

            let base_seconds = pause::base_pause(&self.pause, previous, &segment.speaker);
            assembly.pieces.push(AudioPiece::Pause {
                base_seconds,
                samples: self.pauses.pause(base_seconds),
            });

            previous = Some(&segment.speaker);
        }

        assembly
    }
}

fn speak<F: EngineFactory>(
    synthesizer: &mut Synthesizer<F>,
    segment: &Segment,
    speaker: &SpeakerConfig,
    sample_rate: u32,
) -> Result<Vec<f32>> {
    let output: AudioOutput = synthesizer.synthesize(
        &segment.text,
        &speaker.voice,
        &speaker.language_code,
        speaker.speed,
    )?;
    tracing::debug!(
        "{:.2}s at {} Hz for {}",
        output.duration_seconds(),
        output.sample_rate,
        segment.speaker
    );
    output.into_rate(sample_rate)
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 60;
    if text.chars().count() <= MAX_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_CHARS).collect();
        format!("{}...", cut)
    }
}
