//! Jarvis - a small voice assistant
//!
//! Listens for a spoken command, classifies it by keyword, answers it, and
//! speaks the answer back:
//!
//! ```text
//!  microphone ─► Whisper ─► Voice::listen ─► Dispatcher ─┬─► WeatherClient ─► Open-Meteo
//!                                                        ├─► clock
//!                                                        ├─► fixed replies
//!                                                        └─► CompletionClient ─► HF inference
//!  speaker ◄─ TTS ◄─ Voice::speak ◄──────────────────────┘
//! ```
//!
//! Remote services sit behind [`http::HttpTransport`] and the
//! [`voice::SpeechInput`] / [`voice::SpeechOutput`] traits so the loop can be
//! exercised without audio hardware or network access.

pub mod assistant;
pub mod city;
pub mod clock;
pub mod completion;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod retry;
pub mod voice;
pub mod weather;

pub use assistant::Assistant;
pub use completion::CompletionClient;
pub use config::Config;
pub use dispatch::{Dispatcher, Flow, Intent};
pub use error::{Error, Result};
pub use voice::Voice;
pub use weather::WeatherClient;
