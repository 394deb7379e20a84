//! Kokoro engine through an embedded Python interpreter

use crate::audio::DEFAULT_SAMPLE_RATE;
use crate::config::EngineConfig;
use crate::error::{PodcastError, Result};
use crate::synthesis::{EngineFactory, SpeechChunk, SpeechEngine, SynthesisRequest};
use once_cell::sync::OnceCell;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::Path;

/// Global Python initialization state
static PYTHON_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize the Python runtime, optionally prepending a module search path
pub fn initialize_python(python_path: Option<&Path>) -> Result<()> {
    PYTHON_INITIALIZED.get_or_try_init(|| {
        pyo3::prepare_freethreaded_python();

        Python::with_gil(|py| -> Result<()> {
            if let Some(path) = python_path {
                let sys = py.import("sys")?;
                let sys_path = sys.getattr("path")?;
                sys_path.call_method1("insert", (0, path.to_string_lossy().into_owned()))?;
            }

            match py.import("kokoro") {
                Ok(_) => tracing::info!("Python kokoro module loaded successfully"),
                Err(e) => tracing::warn!("Failed to import kokoro: {}", e),
            }
            Ok(())
        })
    })?;

    Ok(())
}

/// Detect the best available device (cuda, mps, or cpu)
pub fn detect_device() -> String {
    Python::with_gil(|py| {
        let torch = match py.import("torch") {
            Ok(t) => t,
            Err(_) => return "cpu".to_string(),
        };

        let cuda = torch
            .getattr("cuda")
            .and_then(|cuda| cuda.call_method0("is_available"))
            .and_then(|available| available.extract::<bool>())
            .unwrap_or(false);
        if cuda {
            return "cuda".to_string();
        }

        let mps = torch
            .getattr("backends")
            .and_then(|backends| backends.getattr("mps"))
            .and_then(|mps| mps.call_method0("is_available"))
            .and_then(|available| available.extract::<bool>())
            .unwrap_or(false);
        if mps {
            return "mps".to_string();
        }

        "cpu".to_string()
    })
}

/// A `kokoro.KPipeline` bound to one language code
pub struct KokoroEngine {
    pipeline: PyObject,
    language_code: String,
}

impl KokoroEngine {
    /// Language code this pipeline was built for
    pub fn language_code(&self) -> &str {
        &self.language_code
    }
}

impl SpeechEngine for KokoroEngine {
    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }

    fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<Vec<SpeechChunk>> {
        let result: PyResult<Vec<SpeechChunk>> = Python::with_gil(|py| {
            let pipeline = self.pipeline.bind(py);

            let kwargs = PyDict::new(py);
            kwargs.set_item("voice", request.voice)?;
            kwargs.set_item("speed", request.speed)?;
            kwargs.set_item("split_pattern", request.split_pattern)?;

            let generator = pipeline.call((request.text,), Some(&kwargs))?;

            let mut chunks = Vec::new();
            for item in generator.try_iter()? {
                // each result unpacks as (graphemes, phonemes, audio)
                let mut fields = item?.try_iter()?;
                let graphemes = match fields.next() {
                    Some(g) => g?.extract::<String>().unwrap_or_default(),
                    None => continue,
                };
                let _phonemes = fields.next();
                let audio = match fields.next() {
                    Some(audio) => audio?,
                    None => continue,
                };
                if audio.is_none() {
                    continue;
                }

                let samples: Vec<f32> = audio
                    .call_method0("flatten")?
                    .call_method0("tolist")?
                    .extract()?;
                chunks.push(SpeechChunk {
                    text: graphemes,
                    samples,
                });
            }

            Ok(chunks)
        });

        result.map_err(|e| PodcastError::Synthesis(e.to_string()))
    }
}

/// Builds one [`KokoroEngine`] per language code
pub struct KokoroFactory {
    config: EngineConfig,
    device: String,
}

impl KokoroFactory {
    /// Initialize Python and resolve the device
    pub fn new(config: EngineConfig) -> Result<Self> {
        initialize_python(config.python_path.as_deref())?;

        let device = if config.device == "auto" {
            detect_device()
        } else {
            config.device.clone()
        };
        tracing::info!("Kokoro pipelines will run on {}", device);

        Ok(Self { config, device })
    }

    /// Device pipelines are created on
    pub fn device(&self) -> &str {
        &self.device
    }
}

impl EngineFactory for KokoroFactory {
    type Engine = KokoroEngine;

    fn create(&self, language_code: &str) -> Result<KokoroEngine> {
        let result: PyResult<PyObject> = Python::with_gil(|py| {
            let kokoro = py.import("kokoro")?;
            let pipeline_class = kokoro.getattr("KPipeline")?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("lang_code", language_code)?;
            kwargs.set_item("device", &self.device)?;
            if let Some(ref repo_id) = self.config.repo_id {
                kwargs.set_item("repo_id", repo_id)?;
            }

            let pipeline = pipeline_class.call((), Some(&kwargs))?;
            Ok(pipeline.unbind())
        });

        match result {
            Ok(pipeline) => {
                tracing::info!(
                    "Loaded Kokoro pipeline for language '{}' on {}",
                    language_code,
                    self.device
                );
                Ok(KokoroEngine {
                    pipeline,
                    language_code: language_code.to_string(),
                })
            }
            Err(e) => Err(PodcastError::EngineInit {
                language_code: language_code.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
