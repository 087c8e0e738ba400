use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jarvis::assistant::{self, Assistant};
use jarvis::http::ReqwestTransport;
use jarvis::voice::{AudioCapture, AudioPlayback, calculate_rms};
use jarvis::{Config, WeatherClient};

/// Jarvis - voice assistant for weather, time, and questions
#[derive(Parser)]
#[command(name = "jarvis", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Type commands and read replies instead of using audio devices
    #[arg(long, env = "JARVIS_TEXT_MODE")]
    text: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Show a microphone level meter
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Play a test tone
    TestSpeaker,
    /// Speak a sentence through the configured voice
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Print the weather sentence for a city
    TestWeather {
        /// City name
        city: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,jarvis=info",
        1 => "info,jarvis=debug",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries the conversation in console mode
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_with_options(cli.text)?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text } => test_tts(&config, &text).await,
            Command::TestWeather { city } => test_weather(&config, &city).await,
        };
    }

    tracing::info!(voice = config.voice.enabled, "starting jarvis");
    let mut assistant = Assistant::from_config(&config)?;

    assistant
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}

/// Print a live RMS meter for the default microphone
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds, speak now...\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    capture.stop();
    println!("\nIf the meter moved, the microphone works.");
    Ok(())
}

/// Play two seconds of a 440Hz tone
async fn test_speaker() -> anyhow::Result<()> {
    let mut playback = AudioPlayback::new()?;

    let sample_rate = jarvis::voice::PLAYBACK_SAMPLE_RATE;
    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..sample_rate * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.3
        })
        .collect();

    println!("Playing a 440Hz tone...");
    playback.play(samples).await?;
    println!("If you heard the tone, the speaker works.");
    Ok(())
}

/// Speak one sentence with the configured output
#[allow(clippy::future_not_send)]
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    let mut voice = assistant::build_voice(config)?;
    voice.speak(text).await?;
    Ok(())
}

/// Fetch and print one weather report
async fn test_weather(config: &Config, city: &str) -> anyhow::Result<()> {
    let client = WeatherClient::new(
        Arc::new(ReqwestTransport::new()),
        config.weather.base_url.clone(),
    );
    println!("{}", client.report(city).await);
    Ok(())
}
