//! Podcast TTS command line
//!
//! Reads a speaker-tagged script and writes the spoken episode as a WAV file
//! using Kokoro voices.

use anyhow::Context;
use clap::Parser;
use podcast_tts::python::KokoroFactory;
use podcast_tts::{Config, PodcastGenerator, SampleEncoding, SpeakerRegistry};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "podcast-tts", version, about = "Render a speaker-tagged script to audio")]
struct Cli {
    /// Script file to render
    script: PathBuf,

    /// Output WAV path
    #[arg(short, long, default_value = "podcast.wav")]
    output: PathBuf,

    /// JSON configuration file (defaults come from the environment)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON speakers file, replacing the configured speakers
    #[arg(short, long, env = "PODCAST_SPEAKERS_FILE")]
    speakers: Option<PathBuf>,

    /// Output sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Output sample encoding (pcm16, float32)
    #[arg(long)]
    encoding: Option<SampleEncoding>,

    /// Seed for reproducible pauses
    #[arg(long)]
    seed: Option<u64>,

    /// Inference device (auto, cpu, cuda, mps)
    #[arg(long)]
    device: Option<String>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "podcast_tts=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env file if present
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file found: {}", e);
    }

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::from_env(),
    };
    if let Some(ref path) = cli.speakers {
        config.speakers = SpeakerRegistry::from_file(path)
            .with_context(|| format!("loading speakers {}", path.display()))?;
    }
    if let Some(rate) = cli.sample_rate {
        config.audio.sample_rate = rate;
    }
    if let Some(encoding) = cli.encoding {
        config.audio.encoding = encoding;
    }
    if let Some(seed) = cli.seed {
        config.pause.seed = Some(seed);
    }
    if let Some(device) = cli.device {
        config.engine.device = device;
    }

    tracing::info!("Podcast TTS v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Configuration:");
    tracing::info!("  Sample rate: {} Hz", config.audio.sample_rate);
    tracing::info!("  Encoding: {}", config.audio.encoding);
    tracing::info!(
        "  Speakers: {}",
        config.speakers.names().collect::<Vec<_>>().join(", ")
    );
    tracing::info!(
        "  Languages: {}",
        config.speakers.language_codes().join(", ")
    );
    tracing::info!("  Device: {}", config.engine.device);

    let script = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("reading script {}", cli.script.display()))?;

    tracing::info!("Initializing Python runtime...");
    let factory = KokoroFactory::new(config.engine.clone())?;

    let mut generator = PodcastGenerator::new(config, factory)?;

    let start = std::time::Instant::now();
    let report = generator.generate_with_report(&script, &cli.output)?;

    println!("Generated podcast:");
    println!("  Output: {}", report.output_path.display());
    println!("  Duration: {:.2}s", report.duration_seconds);
    println!("  Segments: {} spoken of {}", report.spoken, report.segments);
    if !report.skipped_speakers.is_empty() {
        println!("  Skipped speakers: {}", report.skipped_speakers.join(", "));
    }
    for failure in &report.failures {
        println!(
            "  Failed segment {} ({}): {}",
            failure.segment + 1,
            failure.speaker,
            failure.error
        );
    }
    println!("  Elapsed: {:.2}s", start.elapsed().as_secs_f32());

    Ok(())
}
