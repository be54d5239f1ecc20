//! Core library for the SkyCast weather dashboard.
//!
//! This crate defines:
//! - Shared domain models (locations, unit systems, forecast snapshots)
//! - Clients for the forecast, geocoding, positioning and summary providers
//! - The debounced search controller and the dashboard state machine
//! - Configuration and preference persistence
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod condition;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod insight;
pub mod locate;
pub mod model;
pub mod provider;
pub mod search;
pub mod store;

pub use condition::{describe_condition, icon_for};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardState};
pub use error::FetchError;
pub use insight::{FALLBACK_INSIGHT, GeminiInsights, InsightGenerator, NoInsights};
pub use locate::{CURRENT_LOCATION_NAME, DeviceLocator, IpLocator, LocateError};
pub use model::{
    ActiveForecast, CurrentConditions, DailySeries, ForecastSnapshot, HourlySeries, Location,
    UnitSystem,
};
pub use provider::{ForecastProvider, Geocoder, open_meteo::OpenMeteoClient};
pub use search::{DEBOUNCE_WINDOW, SearchBox, SearchPhase};
pub use store::{FileStore, KeyValueStore, MemoryStore};
