//! Command classification and handling
//!
//! A transcript is matched against [`RULES`] in order; the first rule with
//! a keyword contained in the transcript decides the [`Intent`]. Matching
//! is plain substring search, so "this" contains "hi" and reads as a
//! greeting. Anything unmatched goes to the completion model.

use crate::clock;
use crate::completion::CompletionClient;
use crate::voice::Voice;
use crate::weather::WeatherClient;
use crate::Result;

/// Asked when a weather request names no city
pub const CITY_PROMPT: &str = "Which city's weather would you like to know?";
pub const GREETING: &str = "Hello! How can I help you today?";
pub const FAREWELL: &str = "Goodbye! Have a great day!";
pub const ERROR_APOLOGY: &str = "I encountered an error. Please try again.";
pub const HELP_TEXT: &str = "I can help you with:\n\
    1. Weather information - just ask 'what's the weather in [city]'\n\
    2. Current time - ask 'what time is it'\n\
    3. General questions - just ask anything else\n\
    4. To exit, just say 'goodbye' or 'exit'";

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Weather,
    Time,
    Greeting,
    Exit,
    Help,
    /// Nothing matched; ask the completion model
    Fallback,
}

/// Keyword rule: matches when any keyword occurs in the transcript
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
}

impl IntentRule {
    #[must_use]
    pub fn matches(&self, transcript: &str) -> bool {
        self.keywords.iter().any(|kw| transcript.contains(kw))
    }
}

/// Classification rules in priority order
pub const RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Weather,
        keywords: &["weather"],
    },
    IntentRule {
        intent: Intent::Time,
        keywords: &["time", "clock"],
    },
    IntentRule {
        intent: Intent::Greeting,
        keywords: &["hello", "hi", "hey"],
    },
    IntentRule {
        intent: Intent::Exit,
        keywords: &["bye", "goodbye", "exit", "quit"],
    },
    IntentRule {
        intent: Intent::Help,
        keywords: &["help"],
    },
];

/// Classify a lowercased, trimmed transcript
#[must_use]
pub fn classify(transcript: &str) -> Intent {
    RULES
        .iter()
        .find(|rule| rule.matches(transcript))
        .map_or(Intent::Fallback, |rule| rule.intent)
}

/// City named after the first "in", trimmed
///
/// "in" is matched anywhere, including inside words, and the remainder may
/// be empty.
#[must_use]
pub fn extract_city(transcript: &str) -> Option<&str> {
    transcript.split_once("in").map(|(_, rest)| rest.trim())
}

/// Whether the assistant loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Routes commands to their handlers and speaks the results
pub struct Dispatcher {
    weather: WeatherClient,
    completion: CompletionClient,
}

impl Dispatcher {
    #[must_use]
    pub const fn new(weather: WeatherClient, completion: CompletionClient) -> Self {
        Self {
            weather,
            completion,
        }
    }

    /// Handle one command
    ///
    /// Errors while handling are logged and answered with an apology; they
    /// never end the loop.
    pub async fn dispatch(&self, voice: &mut Voice, transcript: &str) -> Flow {
        let command = transcript.trim().to_lowercase();
        if command.is_empty() {
            return Flow::Continue;
        }

        match self.handle(voice, &command).await {
            Ok(flow) => flow,
            Err(e) => {
                tracing::error!(error = %e, command = %command, "error processing command");
                voice.announce(ERROR_APOLOGY).await;
                Flow::Continue
            }
        }
    }

    async fn handle(&self, voice: &mut Voice, command: &str) -> Result<Flow> {
        let intent = classify(command);
        tracing::debug!(?intent, command, "classified command");

        match intent {
            Intent::Weather => {
                let city = if let Some(city) = extract_city(command) {
                    city.to_string()
                } else {
                    voice.speak(CITY_PROMPT).await?;
                    let reply = voice.listen().await;
                    if reply.is_empty() {
                        return Ok(Flow::Continue);
                    }
                    reply
                };
                let report = self.weather.report(&city).await;
                voice.speak(&report).await?;
            }
            Intent::Time => {
                let now = chrono::Local::now().time();
                voice.speak(&clock::time_greeting(now)).await?;
            }
            Intent::Greeting => voice.speak(GREETING).await?,
            Intent::Exit => {
                voice.speak(FAREWELL).await?;
                return Ok(Flow::Exit);
            }
            Intent::Help => voice.speak(HELP_TEXT).await?,
            Intent::Fallback => {
                let answer = self.completion.complete(command).await;
                voice.speak(&answer).await?;
            }
        }

        Ok(Flow::Continue)
    }
}
