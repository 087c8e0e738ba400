//! Utterance endpointing
//!
//! Splits a live sample stream into a single utterance using frame energy:
//! speech starts when energy crosses the threshold and ends after a run of
//! quiet samples. The threshold is raised above the room's ambient level
//! by [`UtteranceDetector::calibrate`].

use super::capture::calculate_rms;

/// Lowest energy ever treated as speech
const ENERGY_FLOOR: f32 = 0.03;

/// Speech must be this many times louder than the calibrated ambient level
const AMBIENT_RATIO: f32 = 1.5;

/// Minimum speech before the trailing quiet (0.3s at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Trailing quiet that ends an utterance (0.5s at 16kHz)
const SILENCE_SAMPLES: usize = 8000;

/// Detector progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Waiting for speech
    Idle,
    /// Speech started, accumulating
    Speaking,
    /// Utterance ended, ready to take
    Complete,
}

/// Finds one utterance in a stream of sample blocks
pub struct UtteranceDetector {
    threshold: f32,
    state: DetectorState,
    buffer: Vec<f32>,
    silence_counter: usize,
}

impl Default for UtteranceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl UtteranceDetector {
    /// Create a detector with the floor threshold
    #[must_use]
    pub const fn new() -> Self {
        Self {
            threshold: ENERGY_FLOOR,
            state: DetectorState::Idle,
            buffer: Vec::new(),
            silence_counter: 0,
        }
    }

    /// Adjust the speech threshold to a sample of background noise
    pub fn calibrate(&mut self, ambient: &[f32]) {
        let level = calculate_rms(ambient);
        self.threshold = (level * AMBIENT_RATIO).max(ENERGY_FLOOR);
        tracing::debug!(ambient = level, threshold = self.threshold, "calibrated for ambient noise");
    }

    /// Feed a block of samples and return the new state
    pub fn process(&mut self, samples: &[f32]) -> DetectorState {
        if samples.is_empty() {
            return self.state;
        }

        let energy = calculate_rms(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            DetectorState::Idle => {
                if is_speech {
                    self.state = DetectorState::Speaking;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(samples);
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            DetectorState::Speaking => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                let voiced = self.buffer.len().saturating_sub(self.silence_counter);
                if self.silence_counter > SILENCE_SAMPLES && voiced > MIN_SPEECH_SAMPLES {
                    tracing::debug!(samples = self.buffer.len(), "utterance complete");
                    self.state = DetectorState::Complete;
                } else if self.silence_counter > SILENCE_SAMPLES * 2 {
                    tracing::trace!("blip too short, resetting");
                    self.reset();
                }
            }
            DetectorState::Complete => {}
        }

        self.state
    }

    /// End an in-progress utterance early (phrase length limit)
    pub fn finish(&mut self) {
        if self.state == DetectorState::Speaking {
            self.state = DetectorState::Complete;
        }
    }

    /// Return to idle, discarding buffered speech
    pub fn reset(&mut self) {
        self.state = DetectorState::Idle;
        self.buffer.clear();
        self.silence_counter = 0;
    }

    /// Take the buffered utterance and reset
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let utterance = std::mem::take(&mut self.buffer);
        self.reset();
        utterance
    }

    #[must_use]
    pub const fn state(&self) -> DetectorState {
        self.state
    }

    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Samples buffered since speech started
    #[must_use]
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }
}
