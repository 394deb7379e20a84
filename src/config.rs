//! Configuration for podcast generation

use crate::audio::{SampleEncoding, DEFAULT_SAMPLE_RATE};
use crate::error::{PodcastError, Result};
use crate::speakers::SpeakerRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output audio configuration
    pub audio: AudioConfig,
    /// Pause timing between segments
    pub pause: PauseConfig,
    /// Speech engine configuration
    pub engine: EngineConfig,
    /// Speakers recognized in scripts
    pub speakers: SpeakerRegistry,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            pause: PauseConfig::default(),
            engine: EngineConfig::default(),
            speakers: SpeakerRegistry::podcast_defaults(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();

        // Audio config
        if let Ok(rate) = std::env::var("PODCAST_SAMPLE_RATE") {
            if let Ok(r) = rate.parse() {
                config.audio.sample_rate = r;
            }
        }
        if let Ok(encoding) = std::env::var("PODCAST_ENCODING") {
            if let Ok(e) = encoding.parse() {
                config.audio.encoding = e;
            }
        }

        // Pause config
        if let Ok(seed) = std::env::var("PODCAST_PAUSE_SEED") {
            if let Ok(s) = seed.parse() {
                config.pause.seed = Some(s);
            }
        }

        // Speakers
        if let Ok(path) = std::env::var("PODCAST_SPEAKERS_FILE") {
            match SpeakerRegistry::from_file(&path) {
                Ok(speakers) => config.speakers = speakers,
                Err(e) => tracing::warn!("Ignoring PODCAST_SPEAKERS_FILE: {}", e),
            }
        }

        // Engine config
        if let Ok(device) = std::env::var("DEVICE") {
            config.engine.device = device;
        }
        if let Ok(repo_id) = std::env::var("KOKORO_REPO_ID") {
            config.engine.repo_id = Some(repo_id);
        }
        if let Ok(python_path) = std::env::var("KOKORO_PYTHON_PATH") {
            config.engine.python_path = Some(PathBuf::from(python_path));
        }

        config
    }

    /// Load configuration from a JSON file; missing sections take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PodcastError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(PodcastError::Configuration(
                "sample_rate must be greater than zero".to_string(),
            ));
        }
        self.pause.validate()?;
        self.speakers.validate()
    }
}

/// Output audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output sample rate; speech at other rates is resampled
    pub sample_rate: u32,
    /// WAV sample encoding
    pub encoding: SampleEncoding,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            encoding: SampleEncoding::default(),
        }
    }
}

/// Longest pause or jitter accepted from configuration
pub const MAX_PAUSE_SECONDS: f32 = 60.0;

/// Pause timing between segments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseConfig {
    /// Nominal pause when the speaker changes
    pub speaker_change_seconds: f32,
    /// Nominal pause when the same speaker continues
    pub same_speaker_seconds: f32,
    /// Maximum random deviation, applied in both directions
    pub jitter_seconds: f32,
    /// Seed for reproducible pauses
    pub seed: Option<u64>,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            speaker_change_seconds: 0.7,
            same_speaker_seconds: 0.4,
            jitter_seconds: 0.1,
            seed: None,
        }
    }
}

impl PauseConfig {
    /// Reject durations outside `0..=MAX_PAUSE_SECONDS`
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("speaker_change_seconds", self.speaker_change_seconds),
            ("same_speaker_seconds", self.same_speaker_seconds),
            ("jitter_seconds", self.jitter_seconds),
        ];
        for (name, value) in fields {
            if !(0.0..=MAX_PAUSE_SECONDS).contains(&value) {
                return Err(PodcastError::Configuration(format!(
                    "{} must be between 0 and {} seconds, got {}",
                    name, MAX_PAUSE_SECONDS, value
                )));
            }
        }
        Ok(())
    }
}

/// Speech engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Device to run inference on (auto, cpu, cuda, mps)
    pub device: String,
    /// Model repository passed to the engine, if not its default
    pub repo_id: Option<String>,
    /// Extra directory prepended to the interpreter's module path
    pub python_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device: "auto".to_string(),
            repo_id: None,
            python_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.audio.sample_rate, 24000);
        assert_eq!(config.audio.encoding, SampleEncoding::Pcm16);
        assert_eq!(config.pause.speaker_change_seconds, 0.7);
        assert_eq!(config.pause.same_speaker_seconds, 0.4);
        assert_eq!(config.pause.jitter_seconds, 0.1);
        assert_eq!(config.engine.device, "auto");
        assert_eq!(config.speakers.names().collect::<Vec<_>>(), vec!["Guest", "Host"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "audio": {"sample_rate": 22050, "encoding": "float32"},
            "pause": {"seed": 5},
            "speakers": {"Host": {"voice": "af_heart", "language_code": "a"}}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.audio.sample_rate, 22050);
        assert_eq!(config.audio.encoding, SampleEncoding::Float32);
        assert_eq!(config.pause.seed, Some(5));
        assert_eq!(config.pause.speaker_change_seconds, 0.7);
        assert!(config.speakers.contains("Host"));
        assert!(!config.speakers.contains("Guest"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podcast.json");
        std::fs::write(&path, r#"{"audio": {"sample_rate": 16000}}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.audio.sample_rate, 16000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.audio.sample_rate = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pause.same_speaker_seconds = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_pauses() {
        let mut config = Config::default();
        config.pause.jitter_seconds = 3.0e38;
        assert!(matches!(config.validate(), Err(PodcastError::Configuration(_))));

        let mut config = Config::default();
        config.pause.speaker_change_seconds = 1.0e30;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pause.same_speaker_seconds = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pause.speaker_change_seconds = MAX_PAUSE_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_speaker_names_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podcast.json");
        std::fs::write(
            &path,
            r#"{"speakers": {" Host ": {"voice": "af_heart", "language_code": "a"}}}"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.speakers.contains("Host"));
        let segments = crate::script::parse_script("Host:\nHi", &config.speakers);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].speaker, "Host");
    }

    #[test]
    fn test_file_rejects_colliding_speaker_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podcast.json");
        std::fs::write(
            &path,
            r#"{"speakers": {
                "Host": {"voice": "af_heart", "language_code": "a"},
                " Host": {"voice": "am_michael", "language_code": "a"}
            }}"#,
        )
        .unwrap();

        assert!(Config::from_file(&path).is_err());
    }
}
