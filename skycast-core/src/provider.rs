use crate::{
    error::FetchError,
    model::{ForecastSnapshot, Location, UnitSystem},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

/// Source of forecast snapshots. One call fetches the current, hourly
/// and daily blocks together; a failure produces no snapshot at all.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_weather(
        &self,
        latitude: f64,
        longitude: f64,
        unit: UnitSystem,
    ) -> Result<ForecastSnapshot, FetchError>;
}

/// Resolves free-text queries to candidate locations. "No results" and
/// "lookup failed" are indistinguishable to callers: both are an empty
/// list.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn search_locations(&self, query: &str) -> Vec<Location>;
}
