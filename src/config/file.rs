//! TOML configuration file loading
//!
//! Reads `~/.config/jarvis/config.toml` (or `$JARVIS_CONFIG`). Every field
//! is optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct JarvisConfigFile {
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    #[serde(default)]
    pub weather: WeatherFileConfig,

    #[serde(default)]
    pub ai: AiFileConfig,

    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// API keys for external services
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    /// Hugging Face inference token
    pub huggingface: Option<String>,
    /// `OpenAI` key (Whisper and TTS)
    pub openai: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeatherFileConfig {
    /// Forecast API base URL
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AiFileConfig {
    pub primary_url: Option<String>,
    pub fallback_url: Option<String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Use microphone and speakers (false: console only)
    pub enabled: Option<bool>,
    pub stt_model: Option<String>,
    pub tts_model: Option<String>,
    pub tts_voice: Option<String>,
    pub tts_speed: Option<f64>,
}

/// Load the TOML config file
///
/// Returns `JarvisConfigFile::default()` if the file is missing or unreadable.
pub fn load_config_file() -> JarvisConfigFile {
    let Some(path) = config_file_path() else {
        return JarvisConfigFile::default();
    };

    if !path.exists() {
        return JarvisConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to parse config file, using defaults"
            );
            JarvisConfigFile::default()
        }),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            JarvisConfigFile::default()
        }
    }
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the TOML is malformed or a field has the wrong type
pub fn parse_config(content: &str) -> crate::Result<JarvisConfigFile> {
    let config = toml::from_str(content)?;
    Ok(config)
}

/// Config file path: `$JARVIS_CONFIG`, else `~/.config/jarvis/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("JARVIS_CONFIG") {
        return Some(PathBuf::from(path));
    }
    directories::BaseDirs::new().map(|d| d.config_dir().join("jarvis").join("config.toml"))
}
