//! Dispatcher integration tests
//!
//! Commands flow through a scripted voice and transport, so every reply
//! can be checked without audio hardware or network access.

use std::sync::Arc;

use secrecy::SecretString;

use jarvis::completion::MISSING_KEY_MESSAGE;
use jarvis::dispatch::{CITY_PROMPT, ERROR_APOLOGY, FAREWELL, GREETING, HELP_TEXT};
use jarvis::http::HttpResponse;
use jarvis::{CompletionClient, Dispatcher, Flow, Voice, WeatherClient};

mod common;

use common::{
    BrokenConsole, FakeTransport, RecordingOutput, ScriptedInput, SharedBuffer, forecast_body,
    generation_body,
};

fn dispatcher(transport: &Arc<FakeTransport>, hf_key: Option<&str>) -> Dispatcher {
    Dispatcher::new(
        WeatherClient::new(transport.clone(), "http://weather.test"),
        CompletionClient::new(
            transport.clone(),
            hf_key.map(|k| SecretString::from(k.to_string())),
            "http://models.test/primary",
            "http://models.test/fallback",
        ),
    )
}

fn voice(input: &ScriptedInput, output: &RecordingOutput) -> Voice {
    Voice::with_console(
        Box::new(input.clone()),
        Some(Box::new(output.clone())),
        Box::new(SharedBuffer::default()),
    )
}

#[tokio::test]
async fn test_weather_with_city_in_command() {
    let transport = FakeTransport::new(vec![Ok(HttpResponse::new(
        200,
        forecast_body(32.0, 0, 40, 10.0),
    ))]);
    let input = ScriptedInput::default();
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    let flow = dispatcher(&transport, None)
        .dispatch(&mut voice, "What's the weather in Lucknow")
        .await;

    assert_eq!(flow, Flow::Continue);
    assert_eq!(input.captures(), 0);

    let spoken = output.spoken();
    assert_eq!(spoken.len(), 1);
    assert!(spoken[0].starts_with("The weather in lucknow is 32.0°C, which is hot."));
    assert!(spoken[0].contains("clear sky"));
    assert!(transport.requests()[0].url.contains("latitude=26.8467"));
}

#[tokio::test]
async fn test_weather_prompts_for_city() {
    let transport = FakeTransport::new(vec![Ok(HttpResponse::new(
        200,
        forecast_body(18.0, 3, 65, 7.0),
    ))]);
    let input = ScriptedInput::saying(&["Agra"]);
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    let flow = dispatcher(&transport, None)
        .dispatch(&mut voice, "weather")
        .await;

    assert_eq!(flow, Flow::Continue);
    assert_eq!(input.captures(), 1);

    let spoken = output.spoken();
    assert_eq!(spoken[0], CITY_PROMPT);
    assert!(spoken[1].starts_with("The weather in agra is 18.0°C, which is cool."));
    assert!(transport.requests()[0].url.contains("latitude=27.1767"));
}

#[tokio::test]
async fn test_weather_prompt_without_reply_is_abandoned() {
    let transport = FakeTransport::new(vec![]);
    let input = ScriptedInput::new(vec![
        Err(jarvis::voice::CaptureError::NoMatch),
        Err(jarvis::voice::CaptureError::NoMatch),
        Err(jarvis::voice::CaptureError::NoMatch),
    ]);
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    let flow = dispatcher(&transport, None)
        .dispatch(&mut voice, "weather")
        .await;

    assert_eq!(flow, Flow::Continue);
    assert!(transport.requests().is_empty());

    let spoken = output.spoken();
    assert_eq!(spoken.first().map(String::as_str), Some(CITY_PROMPT));
    assert_eq!(
        spoken.last().map(String::as_str),
        Some("Sorry, I couldn't understand. Please try again.")
    );
}

#[tokio::test]
async fn test_weather_for_unsupported_city() {
    let transport = FakeTransport::new(vec![]);
    let input = ScriptedInput::default();
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    dispatcher(&transport, None)
        .dispatch(&mut voice, "weather in atlantis")
        .await;

    assert_eq!(
        output.spoken(),
        ["Sorry, I couldn't find weather data for 'atlantis'. Please try a different city."]
    );
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_time_is_announced() {
    let transport = FakeTransport::new(vec![]);
    let input = ScriptedInput::default();
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    let flow = dispatcher(&transport, None)
        .dispatch(&mut voice, "what time is it")
        .await;

    assert_eq!(flow, Flow::Continue);
    let spoken = output.spoken();
    assert_eq!(spoken.len(), 1);
    assert!(spoken[0].starts_with("Good "));
    assert!(spoken[0].contains("! The current time is "));
    assert!(spoken[0].ends_with("AM") || spoken[0].ends_with("PM"));
}

#[tokio::test]
async fn test_greeting_ignores_case_and_padding() {
    let transport = FakeTransport::new(vec![]);
    let input = ScriptedInput::default();
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    dispatcher(&transport, None)
        .dispatch(&mut voice, "  HELLO there ")
        .await;

    assert_eq!(output.spoken(), [GREETING]);
}

#[tokio::test]
async fn test_goodbye_exits() {
    let transport = FakeTransport::new(vec![]);
    let input = ScriptedInput::default();
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    let flow = dispatcher(&transport, None)
        .dispatch(&mut voice, "goodbye")
        .await;

    assert_eq!(flow, Flow::Exit);
    assert_eq!(output.spoken(), [FAREWELL]);
}

#[tokio::test]
async fn test_help_lists_capabilities() {
    let transport = FakeTransport::new(vec![]);
    let input = ScriptedInput::default();
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    dispatcher(&transport, None)
        .dispatch(&mut voice, "help")
        .await;

    assert_eq!(output.spoken(), [HELP_TEXT]);
}

#[tokio::test]
async fn test_unmatched_goes_to_completion() {
    let transport = FakeTransport::new(vec![Ok(HttpResponse::new(
        200,
        generation_body("A joke about compilers."),
    ))]);
    let input = ScriptedInput::default();
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    dispatcher(&transport, Some("hf_key"))
        .dispatch(&mut voice, "Tell me a joke")
        .await;

    assert_eq!(output.spoken(), ["A joke about compilers."]);
    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["inputs"], "tell me a joke");
}

#[tokio::test]
async fn test_unmatched_without_key() {
    let transport = FakeTransport::new(vec![]);
    let input = ScriptedInput::default();
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    dispatcher(&transport, None)
        .dispatch(&mut voice, "tell me a joke")
        .await;

    assert_eq!(output.spoken(), [MISSING_KEY_MESSAGE]);
}

#[tokio::test]
async fn test_empty_command_is_ignored() {
    let transport = FakeTransport::new(vec![]);
    let input = ScriptedInput::default();
    let output = RecordingOutput::new();
    let mut voice = voice(&input, &output);

    let flow = dispatcher(&transport, None)
        .dispatch(&mut voice, "   ")
        .await;

    assert_eq!(flow, Flow::Continue);
    assert!(output.spoken().is_empty());
}

#[tokio::test]
async fn test_reply_falls_back_to_console() {
    let transport = FakeTransport::new(vec![]);
    let console = SharedBuffer::default();
    let mut voice = Voice::with_console(
        Box::new(ScriptedInput::default()),
        None,
        Box::new(console.clone()),
    );

    dispatcher(&transport, None)
        .dispatch(&mut voice, "hello")
        .await;

    assert_eq!(console.contents(), format!("JARVIS: {GREETING}\n"));
}

#[tokio::test]
async fn test_failure_while_speaking_is_contained() {
    let transport = FakeTransport::new(vec![]);
    let output = RecordingOutput::failing();
    let mut voice = Voice::with_console(
        Box::new(ScriptedInput::default()),
        Some(Box::new(output.clone())),
        Box::new(BrokenConsole),
    );

    let flow = dispatcher(&transport, None)
        .dispatch(&mut voice, "goodbye")
        .await;

    // the farewell never went out, so the loop keeps running
    assert_eq!(flow, Flow::Continue);
    assert_eq!(output.spoken(), [FAREWELL, ERROR_APOLOGY]);
}
