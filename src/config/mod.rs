//! Configuration management for Jarvis
//!
//! Each value comes from the environment first, then the TOML file, then a
//! built-in default. Missing API keys are not errors here: the features
//! that need them degrade per call.

pub mod file;

use secrecy::SecretString;

use crate::completion::{DEFAULT_FALLBACK_URL, DEFAULT_PRIMARY_URL};
use crate::weather::DEFAULT_BASE_URL;
use crate::{Error, Result};

/// Jarvis configuration
#[derive(Debug)]
pub struct Config {
    pub api_keys: ApiKeys,
    pub weather: WeatherConfig,
    pub ai: AiConfig,
    pub voice: VoiceConfig,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// Hugging Face token for text generation
    pub huggingface: Option<SecretString>,
    /// `OpenAI` key for Whisper transcription and TTS
    pub openai: Option<SecretString>,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Forecast API base URL
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub primary_url: String,
    pub fallback_url: String,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Use microphone and speakers; false means console only
    pub enabled: bool,

    /// Whisper model
    pub stt_model: String,

    /// TTS model
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f64,
}

/// Non-empty environment variable
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(name: &str) -> Option<bool> {
    env_var(name).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl Config {
    /// Load configuration, optionally forcing console mode
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is out of range
    pub fn load_with_options(text_mode: bool) -> Result<Self> {
        let fc = file::load_config_file();

        let api_keys = ApiKeys {
            huggingface: env_var("HF_API_KEY")
                .or(fc.api_keys.huggingface)
                .map(SecretString::from),
            openai: env_var("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .map(SecretString::from),
        };

        let weather = WeatherConfig {
            base_url: env_var("JARVIS_WEATHER_URL")
                .or(fc.weather.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        let ai = AiConfig {
            primary_url: env_var("JARVIS_AI_PRIMARY_URL")
                .or(fc.ai.primary_url)
                .unwrap_or_else(|| DEFAULT_PRIMARY_URL.to_string()),
            fallback_url: env_var("JARVIS_AI_FALLBACK_URL")
                .or(fc.ai.fallback_url)
                .unwrap_or_else(|| DEFAULT_FALLBACK_URL.to_string()),
        };

        let text_mode = text_mode || env_flag("JARVIS_TEXT_MODE").unwrap_or(false);
        if text_mode {
            tracing::info!("console mode requested, voice disabled");
        }

        let tts_speed = match env_var("JARVIS_TTS_SPEED") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("JARVIS_TTS_SPEED is not a number: {raw}")))?,
            None => fc.voice.tts_speed.unwrap_or(1.0),
        };

        let voice = VoiceConfig {
            enabled: !text_mode && fc.voice.enabled.unwrap_or(true),
            stt_model: env_var("JARVIS_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            tts_model: env_var("JARVIS_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: env_var("JARVIS_TTS_VOICE")
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "onyx".to_string()),
            tts_speed,
        };

        let config = Self {
            api_keys,
            weather,
            ai,
            voice,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns error naming the first invalid value
    pub fn validate(&self) -> Result<()> {
        if !(0.25..=4.0).contains(&self.voice.tts_speed) {
            return Err(Error::Config(format!(
                "tts_speed must be between 0.25 and 4.0, got {}",
                self.voice.tts_speed
            )));
        }

        for (name, url) in [
            ("weather.base_url", &self.weather.base_url),
            ("ai.primary_url", &self.ai.primary_url),
            ("ai.fallback_url", &self.ai.fallback_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!("{name} must be an http(s) URL: {url}")));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: ApiKeys::default(),
            weather: WeatherConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
            },
            ai: AiConfig {
                primary_url: DEFAULT_PRIMARY_URL.to_string(),
                fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            },
            voice: VoiceConfig {
                enabled: true,
                stt_model: "whisper-1".to_string(),
                tts_model: "tts-1".to_string(),
                tts_voice: "onyx".to_string(),
                tts_speed: 1.0,
            },
        }
    }
}
