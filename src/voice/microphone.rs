//! Microphone input: capture, endpoint, transcribe

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
use super::endpoint::{DetectorState, UtteranceDetector};
use super::stt::SpeechToText;
use super::{CaptureError, SpeechInput};

/// How often the capture buffer is drained
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timing for one listen
#[derive(Debug, Clone)]
pub struct ListenSettings {
    /// Background noise sampled before each listen
    pub calibration: Duration,
    /// Give up if speech has not started by then
    pub start_timeout: Duration,
    /// Cut an utterance off at this length
    pub phrase_limit: Duration,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            calibration: Duration::from_millis(500),
            start_timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(5),
        }
    }
}

/// [`SpeechInput`] reading the default microphone and transcribing with Whisper
///
/// The device is opened on first use, so a missing microphone surfaces as a
/// retryable device error rather than a startup failure.
pub struct MicrophoneInput {
    capture: Option<AudioCapture>,
    stt: SpeechToText,
    settings: ListenSettings,
}

impl MicrophoneInput {
    #[must_use]
    pub const fn new(stt: SpeechToText, settings: ListenSettings) -> Self {
        Self {
            capture: None,
            stt,
            settings,
        }
    }

    /// Open (if needed) and start the microphone
    ///
    /// A device that fails to start is dropped so the next call reopens it.
    fn device(&mut self) -> Result<&mut AudioCapture, CaptureError> {
        if self.capture.is_none() {
            let capture =
                AudioCapture::new().map_err(|e| CaptureError::Device(e.to_string()))?;
            self.capture = Some(capture);
        }

        let started = self.capture.as_mut().map(AudioCapture::start);
        if let Some(Err(e)) = started {
            self.capture = None;
            return Err(CaptureError::Device(e.to_string()));
        }

        self.capture
            .as_mut()
            .ok_or_else(|| CaptureError::Device("microphone unavailable".to_string()))
    }

    /// Record until an utterance completes
    async fn record_utterance(&mut self) -> Result<Vec<f32>, CaptureError> {
        let settings = self.settings.clone();
        let capture = self.device()?;

        let mut detector = UtteranceDetector::new();
        detector.calibrate(&capture.record(settings.calibration).await);

        let phrase_samples = duration_to_samples(settings.phrase_limit);
        let started = Instant::now();

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;

            let samples = capture.take_buffer();
            let done = poll_step(
                &mut detector,
                &samples,
                started.elapsed(),
                phrase_samples,
                settings.start_timeout,
            )?;
            if done {
                break;
            }
        }

        Ok(detector.take_utterance())
    }
}

/// Feed one polled block to the detector
///
/// Returns `Ok(true)` once an utterance is ready to take. Silence past
/// `start_timeout` is reported as a device error, the same as a microphone
/// that produced nothing.
fn poll_step(
    detector: &mut UtteranceDetector,
    samples: &[f32],
    elapsed: Duration,
    phrase_samples: usize,
    start_timeout: Duration,
) -> Result<bool, CaptureError> {
    match detector.process(samples) {
        DetectorState::Complete => Ok(true),
        DetectorState::Speaking if detector.buffered_samples() >= phrase_samples => {
            detector.finish();
            Ok(true)
        }
        DetectorState::Idle if elapsed > start_timeout => {
            tracing::debug!(?elapsed, "no speech before timeout");
            Err(CaptureError::Device("no speech before timeout".to_string()))
        }
        _ => Ok(false),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn duration_to_samples(duration: Duration) -> usize {
    (duration.as_millis() as usize).saturating_mul(SAMPLE_RATE as usize) / 1000
}

#[async_trait(?Send)]
impl SpeechInput for MicrophoneInput {
    async fn capture(&mut self) -> Result<String, CaptureError> {
        let utterance = self.record_utterance().await?;
        tracing::debug!(samples = utterance.len(), "utterance captured");

        let wav = samples_to_wav(&utterance, SAMPLE_RATE)
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        let text = self
            .stt
            .transcribe(&wav)
            .await
            .map_err(|e| CaptureError::Service(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(CaptureError::NoMatch);
        }
        Ok(text)
    }
}
