//! Speaker registry: who may speak, and with which voice

use crate::error::{PodcastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

fn default_speed() -> f32 {
    1.0
}

/// Voice settings for one speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerConfig {
    /// Engine voice identifier (e.g. `af_heart`)
    pub voice: String,
    /// Engine language code; one engine instance is kept per code
    #[serde(alias = "lang_code")]
    pub language_code: String,
    /// Speaking rate multiplier
    #[serde(default = "default_speed")]
    pub speed: f32,
}

impl SpeakerConfig {
    /// Create a speaker config at normal speed
    pub fn new(voice: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            language_code: language_code.into(),
            speed: default_speed(),
        }
    }

    /// Set the speaking rate
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.voice.trim().is_empty() {
            return Err(PodcastError::InvalidParameter(
                "voice must not be empty".to_string(),
            ));
        }
        if self.language_code.trim().is_empty() {
            return Err(PodcastError::InvalidParameter(
                "language_code must not be empty".to_string(),
            ));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(PodcastError::InvalidParameter(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        Ok(())
    }
}

/// Mapping from speaker name to voice settings.
///
/// Names are stored trimmed and matched exactly (case-sensitive). The
/// registry is fixed for the duration of a run; it doubles as the set of
/// names the script parser accepts as block headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, SpeakerConfig>",
    into = "BTreeMap<String, SpeakerConfig>"
)]
pub struct SpeakerRegistry {
    speakers: BTreeMap<String, SpeakerConfig>,
}

impl TryFrom<BTreeMap<String, SpeakerConfig>> for SpeakerRegistry {
    type Error = PodcastError;

    /// Trim every name, rejecting two entries that trim to the same name
    fn try_from(raw: BTreeMap<String, SpeakerConfig>) -> Result<Self> {
        let mut registry = Self::new();
        for (name, config) in raw {
            if registry.contains(name.trim()) {
                return Err(PodcastError::Configuration(format!(
                    "speaker '{}' is defined more than once",
                    name.trim()
                )));
            }
            registry.insert(name, config);
        }
        Ok(registry)
    }
}

impl From<SpeakerRegistry> for BTreeMap<String, SpeakerConfig> {
    fn from(registry: SpeakerRegistry) -> Self {
        registry.speakers
    }
}

impl SpeakerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Two American English voices, `Host` and `Guest`
    pub fn podcast_defaults() -> Self {
        Self::new()
            .with_speaker("Host", SpeakerConfig::new("af_heart", "a"))
            .with_speaker("Guest", SpeakerConfig::new("am_michael", "a"))
    }

    /// Parse a registry from a JSON object of `name -> config`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, SpeakerConfig> = serde_json::from_str(json)?;
        let registry = Self::try_from(raw)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Load a registry from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PodcastError::Configuration(format!(
                "Failed to read speakers file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Add a speaker, builder style
    pub fn with_speaker(mut self, name: impl Into<String>, config: SpeakerConfig) -> Self {
        self.insert(name, config);
        self
    }

    /// Add or replace a speaker, returning the previous config
    pub fn insert(&mut self, name: impl Into<String>, config: SpeakerConfig) -> Option<SpeakerConfig> {
        let name = name.into();
        self.speakers.insert(name.trim().to_string(), config)
    }

    /// Look up a speaker
    pub fn get(&self, name: &str) -> Option<&SpeakerConfig> {
        self.speakers.get(name)
    }

    /// Look up a speaker, failing with [`PodcastError::UnknownSpeaker`]
    pub fn require(&self, name: &str) -> Result<&SpeakerConfig> {
        self.get(name)
            .ok_or_else(|| PodcastError::UnknownSpeaker(name.to_string()))
    }

    /// Whether `name` is a registered speaker
    pub fn contains(&self, name: &str) -> bool {
        self.speakers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.speakers.keys().map(String::as_str)
    }

    /// Distinct language codes across all speakers
    pub fn language_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .speakers
            .values()
            .map(|s| s.language_code.as_str())
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }

    /// Number of speakers
    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    /// Validate every speaker
    pub fn validate(&self) -> Result<()> {
        for (name, config) in &self.speakers {
            if name.trim().is_empty() {
                return Err(PodcastError::InvalidParameter(
                    "speaker name must not be empty".to_string(),
                ));
            }
            config.validate().map_err(|e| {
                PodcastError::Configuration(format!("speaker '{}': {}", name, e))
            })?;
        }
        Ok(())
    }
}
