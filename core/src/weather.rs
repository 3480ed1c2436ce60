//! Read-only facade for an OpenWeatherMap-style API.
//!
//! The API key travels as the `appid` query parameter on every call, not as
//! a bearer header, so the underlying dispatcher is built without a
//! credential.

use std::fmt;

use serde_json::Value;

use crate::dispatcher::{Call, RequestDispatcher};
use crate::error::DispatchError;
use crate::transport::{Transport, UreqTransport};

pub const WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Forecast entries per day (3-hour steps).
pub const FORECAST_SAMPLES_PER_DAY: u32 = 8;

pub const DEFAULT_FORECAST_DAYS: u32 = 5;

/// Measurement system for returned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    /// Kelvin.
    Standard,
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

#[derive(Clone)]
pub struct WeatherApi<T = UreqTransport> {
    client: RequestDispatcher<T>,
    api_key: String,
}

impl<T> fmt::Debug for WeatherApi<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherApi")
            .field("client", &self.client)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl WeatherApi<UreqTransport> {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(WEATHER_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        Self::from_dispatcher(RequestDispatcher::new(base_url, None), api_key)
    }
}

impl<T: Transport> WeatherApi<T> {
    pub fn from_dispatcher(client: RequestDispatcher<T>, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
        }
    }

    pub fn client(&self) -> &RequestDispatcher<T> {
        &self.client
    }

    /// Current conditions for `city`.
    pub fn current_weather(&self, city: &str, units: Units) -> Result<Value, DispatchError> {
        self.client.get("/weather", self.query(city, units))
    }

    /// `days` worth of 3-hourly forecast entries for `city`, or
    /// [`DEFAULT_FORECAST_DAYS`] when `days` is `None`.
    pub fn forecast(
        &self,
        city: &str,
        days: Option<u32>,
        units: Units,
    ) -> Result<Value, DispatchError> {
        let call = self.query(city, units).param("cnt", entry_count(days));
        self.client.get("/forecast", call)
    }

    fn query(&self, city: &str, units: Units) -> Call {
        Call::new()
            .param("q", city)
            .param("appid", &self.api_key)
            .param("units", units.as_str())
    }
}

/// Widened so no `u32` day count can overflow.
fn entry_count(days: Option<u32>) -> u64 {
    u64::from(days.unwrap_or(DEFAULT_FORECAST_DAYS)) * u64::from(FORECAST_SAMPLES_PER_DAY)
}
