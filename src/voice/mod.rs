//! Speech input and output
//!
//! [`Voice`] is the only thing the dispatcher talks to: `listen()` yields a
//! transcript (or an empty string once retries are spent) and `speak()`
//! voices a reply, printing it when no synthesizer is available.
//!
//! Backends plug in through [`SpeechInput`] and [`SpeechOutput`]:
//! microphone + Whisper, TTS + speakers, or the console.

mod capture;
mod console;
mod endpoint;
mod microphone;
mod playback;
mod speaker;
mod stt;
mod tts;

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;

pub use capture::{AudioCapture, SAMPLE_RATE, calculate_rms, samples_to_wav};
pub use console::ConsoleInput;
pub use endpoint::{DetectorState, UtteranceDetector};
pub use microphone::{ListenSettings, MicrophoneInput};
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE};
pub use speaker::SpeakerOutput;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;

use crate::Result;

const DIDNT_CATCH: &str = "I didn't catch that. Could you please repeat?";
const GAVE_UP: &str = "Sorry, I couldn't understand. Please try again.";
const NETWORK_TROUBLE: &str = "Network error. Please check your internet connection.";
const MIC_RETRYING: &str = "Having trouble with the microphone. Trying again...";
const MIC_FAILED: &str =
    "I'm having trouble accessing the microphone. Please check your microphone settings.";

/// Why a single capture produced no transcript
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Nothing intelligible was said
    #[error("no speech recognized")]
    NoMatch,

    /// The recognition service could not be reached
    #[error("recognition service error: {0}")]
    Service(String),

    /// The input device failed
    #[error("input device error: {0}")]
    Device(String),

    /// The input source is gone for good (console EOF)
    #[error("input closed")]
    Closed,
}

/// Source of transcripts
#[async_trait(?Send)]
pub trait SpeechInput {
    /// Capture one utterance and return its transcript
    async fn capture(&mut self) -> std::result::Result<String, CaptureError>;
}

/// Sink for spoken replies
#[async_trait(?Send)]
pub trait SpeechOutput {
    /// Voice `text`, returning once playback finishes
    async fn say(&mut self, text: &str) -> Result<()>;
}

/// Retry behavior of [`Voice::listen`]
#[derive(Debug, Clone)]
pub struct ListenPolicy {
    /// Captures attempted before giving up
    pub attempts: u32,
    /// Pause after a device failure
    pub device_retry_delay: Duration,
}

impl Default for ListenPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            device_retry_delay: Duration::from_secs(1),
        }
    }
}

/// Speech I/O adapter used by the assistant loop
pub struct Voice {
    input: Box<dyn SpeechInput>,
    output: Option<Box<dyn SpeechOutput>>,
    console: Box<dyn Write>,
    policy: ListenPolicy,
    input_closed: bool,
}

impl Voice {
    /// Create an adapter that prints fallback text to stdout
    #[must_use]
    pub fn new(input: Box<dyn SpeechInput>, output: Option<Box<dyn SpeechOutput>>) -> Self {
        Self::with_console(input, output, Box::new(std::io::stdout()))
    }

    /// Create an adapter with an explicit fallback writer
    #[must_use]
    pub fn with_console(
        input: Box<dyn SpeechInput>,
        output: Option<Box<dyn SpeechOutput>>,
        console: Box<dyn Write>,
    ) -> Self {
        Self {
            input,
            output,
            console,
            policy: ListenPolicy::default(),
            input_closed: false,
        }
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_policy(mut self, policy: ListenPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether the input reported that no further transcripts will arrive
    #[must_use]
    pub const fn input_closed(&self) -> bool {
        self.input_closed
    }

    /// Listen for one command
    ///
    /// Returns the lowercased transcript, or an empty string after the
    /// user has been told why nothing was heard.
    pub async fn listen(&mut self) -> String {
        for attempt in 0..self.policy.attempts {
            let last = attempt + 1 >= self.policy.attempts;
            tracing::info!(attempt, "listening");

            let result = match self.input.capture().await {
                Ok(text) if text.trim().is_empty() => Err(CaptureError::NoMatch),
                other => other,
            };

            match result {
                Ok(text) => {
                    let command = text.trim().to_lowercase();
                    tracing::info!(command = %command, "heard");
                    return command;
                }
                Err(CaptureError::NoMatch) => {
                    tracing::debug!(attempt, "nothing recognized");
                    if last {
                        self.announce(GAVE_UP).await;
                        return String::new();
                    }
                    self.announce(DIDNT_CATCH).await;
                }
                Err(CaptureError::Service(e)) => {
                    tracing::warn!(error = %e, "recognition service failed");
                    self.announce(NETWORK_TROUBLE).await;
                    return String::new();
                }
                Err(CaptureError::Device(e)) => {
                    tracing::warn!(attempt, error = %e, "input device failed");
                    if last {
                        self.announce(MIC_FAILED).await;
                        return String::new();
                    }
                    self.announce(MIC_RETRYING).await;
                    tokio::time::sleep(self.policy.device_retry_delay).await;
                }
                Err(CaptureError::Closed) => {
                    tracing::info!("speech input closed");
                    self.input_closed = true;
                    return String::new();
                }
            }
        }

        String::new()
    }

    /// Speak `text`, printing it if synthesis is unavailable or fails
    ///
    /// # Errors
    ///
    /// Returns error only if the console fallback cannot be written
    pub async fn speak(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        if let Some(output) = self.output.as_mut() {
            match output.say(text).await {
                Ok(()) => return Ok(()),
                Err(e) => tracing::warn!(error = %e, "speech output failed, printing instead"),
            }
        }

        writeln!(self.console, "JARVIS: {text}")?;
        self.console.flush()?;
        Ok(())
    }

    /// Speak `text`, logging instead of failing
    pub async fn announce(&mut self, text: &str) {
        if let Err(e) = self.speak(text).await {
            tracing::error!(error = %e, "could not deliver message");
        }
    }
}
