use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    condition::describe_condition,
    error::FetchError,
    model::{CurrentConditions, DailySeries, ForecastSnapshot, HourlySeries, Location, UnitSystem},
};

use super::{ForecastProvider, Geocoder};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m,is_day,uv_index";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,sunrise,sunset";

/// Hourly sequences are cut to one day regardless of how much the
/// provider returns.
const HOURLY_WINDOW: usize = 24;

/// Queries shorter than this never reach the network.
const MIN_QUERY_CHARS: usize = 2;

const MAX_SEARCH_RESULTS: usize = 5;

/// Client for the Open-Meteo forecast and geocoding endpoints. Both are
/// keyless; the endpoints can be overridden for tests.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_endpoints(FORECAST_URL, GEOCODING_URL)
    }

    pub fn with_endpoints(
        forecast_url: impl Into<String>,
        geocoding_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            forecast_url: forecast_url.into(),
            geocoding_url: geocoding_url.into(),
        }
    }

    async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        unit: UnitSystem,
    ) -> Result<ForecastSnapshot, FetchError> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        let res = self
            .http
            .get(&self.forecast_url)
            .query(&[
                ("latitude", lat.as_str()),
                ("longitude", lon.as_str()),
                ("current", CURRENT_FIELDS),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
                ("timezone", "auto"),
                ("temperature_unit", unit.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body)?;
        normalize(parsed)
    }

    async fn search(&self, query: &str) -> Vec<Location> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        let count = MAX_SEARCH_RESULTS.to_string();

        let res = match self
            .http
            .get(&self.geocoding_url)
            .query(&[
                ("name", query),
                ("count", count.as_str()),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                tracing::warn!("location search request failed: {e}");
                return Vec::new();
            }
        };

        if !res.status().is_success() {
            tracing::warn!("location search returned status {}", res.status());
            return Vec::new();
        }

        let parsed: OmSearchResponse = match res.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("failed to decode location search response: {e}");
                return Vec::new();
            }
        };

        parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|place| Location {
                name: place.name,
                latitude: place.latitude,
                longitude: place.longitude,
                country: place.country,
                admin1: place.admin1,
            })
            .collect()
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
        unit: UnitSystem,
    ) -> Result<ForecastSnapshot, FetchError> {
        self.fetch(latitude, longitude, unit).await
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    async fn search_locations(&self, query: &str) -> Vec<Location> {
        self.search(query).await
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: u8,
    weather_code: i32,
    wind_speed_10m: f64,
    is_day: u8,
    uv_index: f64,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    weather_code: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: OmCurrent,
    hourly: OmHourly,
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    results: Option<Vec<OmPlace>>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

/// Reshape the raw response into a snapshot: label the current code,
/// cut hourly sequences to one day, and align every parallel sequence
/// to a common length.
fn normalize(raw: OmForecastResponse) -> Result<ForecastSnapshot, FetchError> {
    let current = CurrentConditions {
        temperature: raw.current.temperature_2m,
        condition_code: raw.current.weather_code,
        condition: describe_condition(raw.current.weather_code).to_string(),
        humidity_pct: raw.current.relative_humidity_2m,
        wind_speed: raw.current.wind_speed_10m,
        uv_index: raw.current.uv_index,
        is_day: raw.current.is_day != 0,
    };

    let hours = raw
        .hourly
        .time
        .len()
        .min(raw.hourly.temperature_2m.len())
        .min(raw.hourly.weather_code.len())
        .min(HOURLY_WINDOW);

    let hourly = HourlySeries {
        time: parse_times(&raw.hourly.time[..hours])?,
        temperature: raw.hourly.temperature_2m[..hours].to_vec(),
        condition: raw.hourly.weather_code[..hours].to_vec(),
    };

    let days = raw
        .daily
        .time
        .len()
        .min(raw.daily.weather_code.len())
        .min(raw.daily.temperature_2m_max.len())
        .min(raw.daily.temperature_2m_min.len())
        .min(raw.daily.sunrise.len())
        .min(raw.daily.sunset.len());

    let daily = DailySeries {
        date: parse_dates(&raw.daily.time[..days])?,
        temp_max: raw.daily.temperature_2m_max[..days].to_vec(),
        temp_min: raw.daily.temperature_2m_min[..days].to_vec(),
        condition: raw.daily.weather_code[..days].to_vec(),
        sunrise: parse_times(&raw.daily.sunrise[..days])?,
        sunset: parse_times(&raw.daily.sunset[..days])?,
    };

    Ok(ForecastSnapshot {
        current,
        hourly,
        daily,
    })
}

// With timezone=auto the provider reports local times as ISO 8601 down
// to the minute, e.g. "2024-06-01T13:00".
fn parse_times(raw: &[String]) -> Result<Vec<NaiveDateTime>, FetchError> {
    raw.iter()
        .map(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").map_err(FetchError::from))
        .collect()
}

fn parse_dates(raw: &[String]) -> Result<Vec<NaiveDate>, FetchError> {
    raw.iter()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(FetchError::from))
        .collect()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
