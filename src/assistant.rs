//! The listen, dispatch, speak loop

use std::future::Future;
use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::config::Config;
use crate::dispatch::{Dispatcher, Flow};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::voice::{
    AudioPlayback, ConsoleInput, ListenSettings, MicrophoneInput, SpeakerOutput, SpeechInput,
    SpeechOutput, SpeechToText, TextToSpeech, Voice,
};
use crate::weather::WeatherClient;
use crate::Result;

/// Spoken once at startup
pub const WELCOME: &str = "Hello! I'm your AI assistant. How can I help you today?";

/// Spoken when interrupted
pub const INTERRUPTED: &str = "Goodbye!";

/// Voice assistant: a dispatcher plus the voice it listens and speaks with
pub struct Assistant {
    dispatcher: Dispatcher,
    voice: Voice,
}

impl Assistant {
    #[must_use]
    pub const fn new(dispatcher: Dispatcher, voice: Voice) -> Self {
        Self { dispatcher, voice }
    }

    /// Wire up real services from configuration
    ///
    /// # Errors
    ///
    /// Returns error if a configured speech backend cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
        let dispatcher = build_dispatcher(config, transport);
        let voice = build_voice(config)?;
        Ok(Self::new(dispatcher, voice))
    }

    /// Run until the user says goodbye, input closes, or `shutdown` resolves
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        self.voice.announce(WELCOME).await;

        loop {
            let outcome = tokio::select! {
                () = &mut shutdown => None,
                flow = self.turn() => Some(flow),
            };

            match outcome {
                None => {
                    tracing::info!("interrupted, shutting down");
                    self.voice.announce(INTERRUPTED).await;
                    break;
                }
                Some(Flow::Exit) => {
                    tracing::info!("exit requested");
                    break;
                }
                Some(Flow::Continue) if self.voice.input_closed() => {
                    tracing::info!("input closed, shutting down");
                    break;
                }
                Some(Flow::Continue) => {}
            }
        }
    }

    /// One listen and, if something was heard, one dispatch
    async fn turn(&mut self) -> Flow {
        let command = self.voice.listen().await;
        if command.is_empty() {
            return Flow::Continue;
        }
        self.dispatcher.dispatch(&mut self.voice, &command).await
    }
}

/// Build the dispatcher and its remote clients
#[must_use]
pub fn build_dispatcher(config: &Config, transport: Arc<dyn HttpTransport>) -> Dispatcher {
    let weather = WeatherClient::new(Arc::clone(&transport), config.weather.base_url.clone());
    let completion = CompletionClient::new(
        transport,
        config.api_keys.huggingface.clone(),
        config.ai.primary_url.clone(),
        config.ai.fallback_url.clone(),
    );
    Dispatcher::new(weather, completion)
}

/// Pick speech backends
///
/// Microphone input and spoken output both need an `OpenAI` key. Without
/// one, input falls back to the console and replies are printed.
///
/// # Errors
///
/// Returns error if a speech client rejects its configuration
pub fn build_voice(config: &Config) -> Result<Voice> {
    let openai = config.api_keys.openai.as_ref();

    let input: Box<dyn SpeechInput> = match openai {
        Some(key) if config.voice.enabled => {
            let stt = SpeechToText::new(key.clone(), config.voice.stt_model.clone())?;
            tracing::info!(model = %config.voice.stt_model, "using microphone input");
            Box::new(MicrophoneInput::new(stt, ListenSettings::default()))
        }
        None if config.voice.enabled => {
            tracing::warn!("OPENAI_API_KEY not set, reading commands from the console");
            Box::new(ConsoleInput::stdin())
        }
        _ => Box::new(ConsoleInput::stdin()),
    };

    let output: Option<Box<dyn SpeechOutput>> = match openai {
        Some(key) if config.voice.enabled => {
            let tts = TextToSpeech::new(
                key.clone(),
                config.voice.tts_model.clone(),
                config.voice.tts_voice.clone(),
                config.voice.tts_speed,
            )?;
            match AudioPlayback::new() {
                Ok(playback) => {
                    let speaker: Box<dyn SpeechOutput> =
                        Box::new(SpeakerOutput::new(tts, playback));
                    Some(speaker)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "no speaker available, printing replies");
                    None
                }
            }
        }
        _ => None,
    };

    Ok(Voice::new(input, output))
}
