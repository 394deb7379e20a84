//! Speech synthesis adapter
//!
//! Engines are external collaborators behind [`SpeechEngine`]. The
//! [`Synthesizer`] owns one engine per language code, created on first use
//! through an [`EngineFactory`] and kept for the synthesizer's lifetime.

use crate::audio::AudioOutput;
use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Clause boundaries handed to engines: newlines, and whitespace after
/// terminal punctuation (Python `re` syntax).
pub const SPLIT_PATTERN: &str = r"\n+|(?<=[.!?])\s+";

/// Rust equivalent of [`SPLIT_PATTERN`]; the punctuation is kept by the caller
static CLAUSE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n+|[.!?]\s+").expect("clause pattern is valid"));

/// One synthesis call's input
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    /// Text to speak
    pub text: &'a str,
    /// Engine voice identifier
    pub voice: &'a str,
    /// Speaking rate multiplier
    pub speed: f32,
    /// Pattern the engine splits `text` on before synthesizing each piece
    pub split_pattern: &'a str,
}

/// Audio for one clause
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechChunk {
    /// The clause text the engine spoke
    pub text: String,
    /// Mono samples at the engine's sample rate
    pub samples: Vec<f32>,
}

/// A text-to-speech engine bound to one language
pub trait SpeechEngine {
    /// Native sample rate of produced chunks
    fn sample_rate(&self) -> u32;

    /// Speak `request.text`, one chunk per clause, in order
    fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<Vec<SpeechChunk>>;
}

/// Builds engines for a language code
pub trait EngineFactory {
    /// Engine type produced
    type Engine: SpeechEngine;

    /// Construct an engine for `language_code`
    fn create(&self, language_code: &str) -> Result<Self::Engine>;
}

/// Caching front end over an [`EngineFactory`]
pub struct Synthesizer<F: EngineFactory> {
    factory: F,
    engines: HashMap<String, F::Engine>,
    split_pattern: String,
}

impl<F: EngineFactory> Synthesizer<F> {
    /// Create a synthesizer using [`SPLIT_PATTERN`]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            engines: HashMap::new(),
            split_pattern: SPLIT_PATTERN.to_string(),
        }
    }

    /// The pattern passed to engines
    pub fn split_pattern(&self) -> &str {
        &self.split_pattern
    }

    /// Language codes with a live engine
    pub fn cached_languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Speak `text` and join the chunks into one buffer.
    ///
    /// An engine that yields no chunks gives an empty buffer. Engine errors
    /// are returned as is; deciding what to do with them is up to the caller.
    pub fn synthesize(
        &mut self,
        text: &str,
        voice: &str,
        language_code: &str,
        speed: f32,
    ) -> Result<AudioOutput> {
        let engine = match self.engines.entry(language_code.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                tracing::debug!("Creating engine for language '{}'", language_code);
                entry.insert(self.factory.create(language_code)?)
            }
        };

        let request = SynthesisRequest {
            text,
            voice,
            speed,
            split_pattern: &self.split_pattern,
        };

        let chunks = engine.synthesize(&request)?;
        tracing::debug!("Engine returned {} chunk(s)", chunks.len());

        let samples = chunks.into_iter().flat_map(|chunk| chunk.samples).collect();
        Ok(AudioOutput::new(samples, engine.sample_rate()))
    }
}

/// Split text into clauses the way [`SPLIT_PATTERN`] does.
///
/// Breaks on runs of newlines and on whitespace following `.`, `!` or `?`,
/// keeping the punctuation with its clause. Empty clauses are dropped.
pub fn split_clauses(text: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut start = 0;

    for found in CLAUSE_BREAK.find_iter(text) {
        // terminal punctuation is one byte and stays with the clause
        let end = if found.as_str().starts_with('\n') {
            found.start()
        } else {
            found.start() + 1
        };
        let clause = text[start..end].trim();
        if !clause.is_empty() {
            clauses.push(clause);
        }
        start = found.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        clauses.push(tail);
    }

    clauses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PodcastError;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// One sample per byte of each clause, valued by speed
    struct ClauseEngine {
        language_code: String,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl SpeechEngine for ClauseEngine {
        fn sample_rate(&self) -> u32 {
            24000
        }

        fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<Vec<SpeechChunk>> {
            assert_eq!(request.split_pattern, SPLIT_PATTERN);
            if request.text.contains("FAIL") {
                return Err(PodcastError::Synthesis("unsupported phoneme".to_string()));
            }
            self.calls
                .borrow_mut()
                .push(format!("{}:{}:{}", self.language_code, request.voice, request.text));
            Ok(split_clauses(request.text)
                .into_iter()
                .map(|clause| SpeechChunk {
                    text: clause.to_string(),
                    samples: vec![request.speed; clause.len()],
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        created: Rc<RefCell<Vec<String>>>,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl EngineFactory for CountingFactory {
        type Engine = ClauseEngine;

        fn create(&self, language_code: &str) -> Result<ClauseEngine> {
            if language_code == "zz" {
                return Err(PodcastError::EngineInit {
                    language_code: language_code.to_string(),
                    message: "no such language".to_string(),
                });
            }
            self.created.borrow_mut().push(language_code.to_string());
            Ok(ClauseEngine {
                language_code: language_code.to_string(),
                calls: self.calls.clone(),
            })
        }
    }

    #[test]
    fn test_split_clauses() {
        assert_eq!(
            split_clauses("Hello there. How are you?  Fine!\nNext line\n\nLast"),
            vec!["Hello there.", "How are you?", "Fine!", "Next line", "Last"]
        );
        assert_eq!(split_clauses("v1.2 stays whole"), vec!["v1.2 stays whole"]);
        assert!(split_clauses("").is_empty());
        assert!(split_clauses(" \n \n").is_empty());
    }

    #[test]
    fn test_chunks_are_concatenated() {
        let mut synth = Synthesizer::new(CountingFactory::default());
        let audio = synth.synthesize("Hi. Bye.", "af_heart", "a", 1.0).unwrap();

        // "Hi." + "Bye."
        assert_eq!(audio.len(), 7);
        assert_eq!(audio.sample_rate, 24000);
    }

    #[test]
    fn test_no_chunks_gives_empty_buffer() {
        let mut synth = Synthesizer::new(CountingFactory::default());
        let audio = synth.synthesize("   ", "af_heart", "a", 1.0).unwrap();
        assert!(audio.is_empty());
    }

    #[test]
    fn test_one_engine_per_language() {
        let factory = CountingFactory::default();
        let created = factory.created.clone();
        let calls = factory.calls.clone();
        let mut synth = Synthesizer::new(factory);

        synth.synthesize("One.", "af_heart", "a", 1.0).unwrap();
        synth.synthesize("Two.", "am_michael", "a", 1.0).unwrap();
        synth.synthesize("Trois.", "ff_siwis", "f", 1.0).unwrap();
        synth.synthesize("Four.", "af_heart", "a", 1.0).unwrap();

        assert_eq!(*created.borrow(), vec!["a", "f"]);
        assert_eq!(synth.cached_languages(), vec!["a", "f"]);
        assert_eq!(
            *calls.borrow(),
            vec![
                "a:af_heart:One.",
                "a:am_michael:Two.",
                "f:ff_siwis:Trois.",
                "a:af_heart:Four."
            ]
        );
    }

    #[test]
    fn test_engine_errors_propagate() {
        let mut synth = Synthesizer::new(CountingFactory::default());
        let err = synth.synthesize("FAIL", "af_heart", "a", 1.0).unwrap_err();
        assert!(matches!(err, PodcastError::Synthesis(_)));

        // the engine stays cached after a failed call
        assert_eq!(synth.cached_languages(), vec!["a"]);
    }

    #[test]
    fn test_factory_errors_are_not_cached() {
        let mut synth = Synthesizer::new(CountingFactory::default());
        let err = synth.synthesize("Hi.", "v", "zz", 1.0).unwrap_err();
        assert!(matches!(err, PodcastError::EngineInit { .. }));
        assert!(synth.cached_languages().is_empty());
    }
}
