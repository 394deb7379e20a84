//! Audio buffers, silence, resampling and WAV encoding

use crate::error::{PodcastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default output sample rate, matching the Kokoro models
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Sample encoding used when writing the output WAV
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// Signed 16-bit integer PCM
    #[default]
    Pcm16,
    /// 32-bit IEEE float
    Float32,
}

impl std::str::FromStr for SampleEncoding {
    type Err = PodcastError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pcm16" | "pcm_s16le" | "pcm" => Ok(SampleEncoding::Pcm16),
            "float32" | "f32" | "float" => Ok(SampleEncoding::Float32),
            _ => Err(PodcastError::InvalidParameter(format!(
                "Unknown sample encoding: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for SampleEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleEncoding::Pcm16 => write!(f, "pcm16"),
            SampleEncoding::Float32 => write!(f, "float32"),
        }
    }
}

/// Mono audio produced by an engine, tagged with its native sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioOutput {
    /// Raw mono samples
    pub samples: Vec<f32>,
    /// Sample rate of `samples`
    pub sample_rate: u32,
}

impl AudioOutput {
    /// Create a new audio output
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Convert to `target_rate`, leaving the buffer untouched when the rates match
    pub fn into_rate(self, target_rate: u32) -> Result<Vec<f32>> {
        if self.sample_rate == target_rate {
            return Ok(self.samples);
        }
        resample(&self.samples, self.sample_rate, target_rate)
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        duration_seconds(&self.samples, self.sample_rate)
    }

    /// Get the number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the audio is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Number of samples covering `seconds`, rounded to the nearest sample
pub fn samples_for(seconds: f32, sample_rate: u32) -> usize {
    let seconds = f64::from(seconds.max(0.0));
    (f64::from(sample_rate) * seconds).round() as usize
}

/// A silent buffer lasting `seconds`
pub fn silence(seconds: f32, sample_rate: u32) -> Vec<f32> {
    vec![0.0; samples_for(seconds, sample_rate)]
}

/// Join buffers end to end, preserving order
pub fn concat<'a, I>(buffers: I) -> Vec<f32>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let buffers: Vec<&[f32]> = buffers.into_iter().collect();
    let total = buffers.iter().map(|b| b.len()).sum();
    let mut joined = Vec::with_capacity(total);
    for buffer in buffers {
        joined.extend_from_slice(buffer);
    }
    joined
}

/// Write mono samples to a WAV file
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
    encoding: SampleEncoding,
) -> Result<()> {
    let spec = match encoding {
        SampleEncoding::Pcm16 => hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        },
        SampleEncoding::Float32 => hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        },
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(wav_error("create WAV file"))?;

    for &sample in samples {
        let written = match encoding {
            SampleEncoding::Pcm16 => writer.write_sample(to_i16(sample)),
            SampleEncoding::Float32 => writer.write_sample(sample),
        };
        written.map_err(wav_error("write sample"))?;
    }

    writer.finalize().map_err(wav_error("finalize WAV"))?;

    Ok(())
}

/// Load a WAV file as mono f32 samples, returning the file's sample rate
#[cfg(test)]
pub(crate) fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioOutput> {
    let path = path.as_ref();

    let reader = hound::WavReader::open(path).map_err(wav_error("open WAV file"))?;

    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(wav_error("read samples"))?,
        hound::SampleFormat::Int => {
            let scale = match spec.bits_per_sample {
                16 => 32767.0,
                24 => 8388607.0,
                32 => 2147483647.0,
                bits => {
                    return Err(PodcastError::AudioProcessing(format!(
                        "Unsupported bit depth: {}",
                        bits
                    )))
                }
            };
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(wav_error("read samples"))?
        }
    };

    // Downmix
    let mono = if spec.channels > 1 {
        samples
            .chunks(spec.channels as usize)
            .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
            .collect()
    } else {
        samples
    };

    Ok(AudioOutput::new(mono, spec.sample_rate))
}

/// Resample audio from one sample rate to another
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(PodcastError::InvalidParameter(format!(
            "Cannot resample from {} Hz to {} Hz",
            from_rate, to_rate
        )));
    }

    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)
        .map_err(|e| PodcastError::AudioProcessing(format!("Resampler creation failed: {}", e)))?;

    let waves_in = vec![samples.to_vec()];
    let waves_out = resampler
        .process(&waves_in, None)
        .map_err(|e| PodcastError::AudioProcessing(format!("Resampling failed: {}", e)))?;

    Ok(waves_out.into_iter().next().unwrap_or_default())
}

/// Calculate audio duration in seconds
pub fn duration_seconds(samples: &[f32], sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    samples.len() as f32 / sample_rate as f32
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

fn wav_error(action: &'static str) -> impl Fn(hound::Error) -> PodcastError {
    move |e| PodcastError::AudioProcessing(format!("Failed to {}: {}", action, e))
}
