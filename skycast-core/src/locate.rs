//! Best-effort device positioning.
//!
//! A browser would ask the user for their position; on the command line
//! the closest equivalent is a single IP-based lookup. Either way it is
//! one attempt with no retry: the dashboard falls back to a fixed
//! default location when it fails.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::Location;

const IP_API_URL: &str = "http://ip-api.com/json";

/// Synthetic name for a device-derived position; there is no place name
/// to show until the user picks one.
pub const CURRENT_LOCATION_NAME: &str = "Current Location";

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("location service returned status {0}")]
    Status(StatusCode),

    #[error("location service could not resolve a position")]
    Unresolved,
}

#[async_trait]
pub trait DeviceLocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Location, LocateError>;
}

/// Coarse positioning from the caller's public IP address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    http: Client,
    url: String,
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_endpoint(IP_API_URL)
    }

    pub fn with_endpoint(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl DeviceLocator for IpLocator {
    async fn locate(&self) -> Result<Location, LocateError> {
        let res = self.http.get(&self.url).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocateError::Status(status));
        }

        let parsed: IpApiResponse = res.json().await?;
        if parsed.status != "success" {
            return Err(LocateError::Unresolved);
        }

        match (parsed.lat, parsed.lon) {
            (Some(latitude), Some(longitude)) => Ok(Location {
                name: CURRENT_LOCATION_NAME.to_string(),
                latitude,
                longitude,
                country: parsed.country,
                admin1: parsed.region_name,
            }),
            _ => Err(LocateError::Unresolved),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    country: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
}
