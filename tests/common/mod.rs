//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use jarvis::http::{HttpResponse, HttpTransport};
use jarvis::voice::{CaptureError, SpeechInput, SpeechOutput};
use jarvis::{Error, Result};

/// A request seen by [`FakeTransport`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub timeout: Duration,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Transport that replays scripted results and records every call
///
/// Once the script runs out every call fails with a network error.
#[derive(Default)]
pub struct FakeTransport {
    script: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    #[must_use]
    pub fn new(script: Vec<Result<HttpResponse>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::default(),
        })
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: RecordedRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Network("script exhausted".to_string())))
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        self.next(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            timeout,
            bearer: None,
            body: None,
        })
    }

    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse> {
        self.next(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            timeout,
            bearer: Some(bearer.to_string()),
            body: Some(body.clone()),
        })
    }
}

/// Forecast body as the weather service returns it
#[must_use]
pub fn forecast_body(temperature: f64, code: i64, humidity: i64, wind: f64) -> String {
    serde_json::json!({
        "latitude": 26.85,
        "longitude": 80.95,
        "current": {
            "time": "2026-05-01T14:00",
            "temperature_2m": temperature,
            "relative_humidity_2m": humidity,
            "wind_speed_10m": wind,
            "weather_code": code
        }
    })
    .to_string()
}

/// Generation body as the text model returns it
#[must_use]
pub fn generation_body(text: &str) -> String {
    serde_json::json!([{ "generated_text": text }]).to_string()
}

/// Speech input that yields scripted captures, then reports closed
#[derive(Clone, Default)]
pub struct ScriptedInput {
    script: Arc<Mutex<VecDeque<std::result::Result<String, CaptureError>>>>,
    captures: Arc<Mutex<usize>>,
}

impl ScriptedInput {
    #[must_use]
    pub fn new(script: Vec<std::result::Result<String, CaptureError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            captures: Arc::default(),
        }
    }

    /// Input that says each line in turn
    #[must_use]
    pub fn saying(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| Ok((*l).to_string())).collect())
    }

    #[must_use]
    pub fn captures(&self) -> usize {
        *self.captures.lock().unwrap()
    }
}

#[async_trait(?Send)]
impl SpeechInput for ScriptedInput {
    async fn capture(&mut self) -> std::result::Result<String, CaptureError> {
        *self.captures.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CaptureError::Closed))
    }
}

/// Speech output that remembers what it was asked to say
#[derive(Clone, Default)]
pub struct RecordingOutput {
    spoken: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Output whose every call fails
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl SpeechOutput for RecordingOutput {
    async fn say(&mut self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(Error::Tts("speaker unplugged".to_string()));
        }
        Ok(())
    }
}

/// Console writer whose contents can be read back
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Console writer that always fails
pub struct BrokenConsole;

impl Write for BrokenConsole {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
