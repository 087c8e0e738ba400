//! Current-conditions lookup against the Open-Meteo forecast API
//!
//! [`WeatherClient::report`] never fails: every outcome, including network
//! trouble and unknown cities, is a sentence ready to be spoken.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Number;

use crate::city::{self, Coordinates};
use crate::http::HttpTransport;
use crate::retry::{RetryPolicy, is_rate_limited};
use crate::Error;

/// Default Open-Meteo base URL
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

/// Current-value fields requested from the forecast endpoint
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code";

/// Description used for codes missing from [`WEATHER_CODES`]
pub const UNKNOWN_CONDITIONS: &str = "unknown conditions";

/// Spoken when the final attempt times out
pub const TIMEOUT_MESSAGE: &str =
    "Sorry, the weather service is taking too long to respond. Please try again.";

/// Spoken when every attempt got an error status
pub const EXHAUSTED_MESSAGE: &str =
    "Sorry, I couldn't fetch the weather information. Please try again later.";

/// WMO weather interpretation codes
pub const WEATHER_CODES: &[(i64, &str)] = &[
    (0, "clear sky"),
    (1, "mainly clear"),
    (2, "partly cloudy"),
    (3, "overcast"),
    (45, "foggy"),
    (48, "depositing rime fog"),
    (51, "light drizzle"),
    (53, "moderate drizzle"),
    (55, "dense drizzle"),
    (61, "slight rain"),
    (63, "moderate rain"),
    (65, "heavy rain"),
    (71, "slight snow"),
    (73, "moderate snow"),
    (75, "heavy snow"),
    (77, "snow grains"),
    (80, "slight rain showers"),
    (81, "moderate rain showers"),
    (82, "violent rain showers"),
    (85, "slight snow showers"),
    (86, "heavy snow showers"),
    (95, "thunderstorm"),
    (96, "thunderstorm with slight hail"),
    (99, "thunderstorm with heavy hail"),
];

/// Describe a WMO weather code
#[must_use]
pub fn describe_code(code: i64) -> &'static str {
    WEATHER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(UNKNOWN_CONDITIONS, |(_, desc)| *desc)
}

/// Qualitative temperature band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    Hot,
    Warm,
    Pleasant,
    Cool,
    Cold,
}

impl TemperatureBand {
    /// Bucket a Celsius reading; thresholds are strict (`30.0` is warm)
    #[must_use]
    pub fn from_celsius(temperature: f64) -> Self {
        if temperature > 30.0 {
            Self::Hot
        } else if temperature > 25.0 {
            Self::Warm
        } else if temperature > 20.0 {
            Self::Pleasant
        } else if temperature > 15.0 {
            Self::Cool
        } else {
            Self::Cold
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Warm => "warm",
            Self::Pleasant => "pleasant",
            Self::Cool => "cool",
            Self::Cold => "cold",
        }
    }
}

impl fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

/// The `current` block of a forecast response
///
/// Readings keep the number as the service sent it, so a float reading of
/// `32.0` is spoken as "32.0" and an integer humidity as "40".
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub temperature_2m: Number,
    pub relative_humidity_2m: Number,
    pub wind_speed_10m: Number,
    pub weather_code: i64,
}

impl CurrentConditions {
    /// Temperature in Celsius as a float
    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature_2m.as_f64().unwrap_or_default()
    }
}

/// Render current conditions as a single spoken sentence
#[must_use]
pub fn format_report(city: &str, current: &CurrentConditions) -> String {
    let band = TemperatureBand::from_celsius(current.temperature());
    let description = describe_code(current.weather_code);

    format!(
        "The weather in {city} is {}°C, which is {band}. Conditions are {description}. \
         Humidity is {}% and wind speed is {} km/h.",
        current.temperature_2m, current.relative_humidity_2m, current.wind_speed_10m
    )
}

fn not_found(city: &str) -> String {
    format!("Sorry, I couldn't find weather data for '{city}'. Please try a different city.")
}

/// Fetches and phrases current weather for supported cities
pub struct WeatherClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    policy: RetryPolicy,
}

impl WeatherClient {
    /// Create a client with the default retry policy
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self::with_policy(transport, base_url, RetryPolicy::default())
    }

    /// Create a client with an explicit retry policy
    #[must_use]
    pub fn with_policy(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// Forecast URL for a position
    #[must_use]
    pub fn forecast_url(&self, coords: Coordinates) -> String {
        format!(
            "{}/v1/forecast?latitude={}&longitude={}&current={CURRENT_FIELDS}&timezone=auto",
            self.base_url, coords.latitude, coords.longitude
        )
    }

    /// Describe the current weather in `city`
    ///
    /// Resolves the name, then makes up to `max_attempts` requests with
    /// growing deadlines. Rate-limited responses back off before retrying;
    /// timeouts and other failures retry immediately.
    pub async fn report(&self, city: &str) -> String {
        let Some((name, coords)) = city::resolve(city)
            .and_then(|name| city::coordinates(name).map(|coords| (name, coords)))
        else {
            tracing::info!(city, "weather requested for unsupported city");
            return not_found(city);
        };

        let url = self.forecast_url(coords);
        tracing::debug!(city = name, %url, "fetching weather");

        for attempt in 0..self.policy.max_attempts {
            let timeout = self.policy.timeout_for_attempt(attempt);
            let retry_left = self.policy.has_attempt_after(attempt);

            match self.transport.get(&url, timeout).await {
                Ok(response) if response.is_ok() => {
                    return match response.json::<ForecastResponse>() {
                        Ok(forecast) => format_report(name, &forecast.current),
                        Err(e) => {
                            tracing::warn!(error = %e, "unreadable forecast response");
                            format!("An error occurred: {e}")
                        }
                    };
                }
                Ok(response) if is_rate_limited(response.status) => {
                    tracing::warn!(attempt, "weather service rate limited");
                    if retry_left {
                        tokio::time::sleep(self.policy.backoff_for_attempt(attempt)).await;
                    }
                }
                Ok(response) => {
                    tracing::warn!(attempt, status = response.status, "weather service error status");
                }
                Err(Error::Timeout(elapsed)) => {
                    tracing::warn!(attempt, ?elapsed, "weather request timed out");
                    if !retry_left {
                        return TIMEOUT_MESSAGE.to_string();
                    }
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "weather request failed");
                    if !retry_left {
                        return format!("Error connecting to weather service: {e}");
                    }
                }
            }
        }

        EXHAUSTED_MESSAGE.to_string()
    }
}
