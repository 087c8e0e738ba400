//! Spoken output: synthesize, then play

use async_trait::async_trait;

use super::SpeechOutput;
use super::playback::AudioPlayback;
use super::tts::TextToSpeech;
use crate::Result;

/// [`SpeechOutput`] that voices text through TTS and the default speaker
pub struct SpeakerOutput {
    tts: TextToSpeech,
    playback: AudioPlayback,
}

impl SpeakerOutput {
    #[must_use]
    pub const fn new(tts: TextToSpeech, playback: AudioPlayback) -> Self {
        Self { tts, playback }
    }
}

#[async_trait(?Send)]
impl SpeechOutput for SpeakerOutput {
    async fn say(&mut self, text: &str) -> Result<()> {
        let mp3 = self.tts.synthesize(text).await?;
        self.playback.play_mp3(&mp3).await
    }
}
