//! Typed input for headless use

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use super::{CaptureError, SpeechInput};

/// [`SpeechInput`] reading one command per line
///
/// A blank line counts as "nothing recognized"; end of input closes the
/// assistant.
pub struct ConsoleInput<R> {
    lines: Lines<BufReader<R>>,
}

impl ConsoleInput<tokio::io::Stdin> {
    /// Read commands from standard input
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin> ConsoleInput<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }
}

#[async_trait(?Send)]
impl<R: AsyncRead + Unpin> SpeechInput for ConsoleInput<R> {
    async fn capture(&mut self) -> Result<String, CaptureError> {
        match self.lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => Err(CaptureError::NoMatch),
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(CaptureError::Closed),
            Err(e) => Err(CaptureError::Device(e.to_string())),
        }
    }
}
