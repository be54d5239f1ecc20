use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A place returned by a location lookup, or restored from the favorites
/// store. Identity for favorite-matching is the coordinate pair, not the
/// name: several places can share a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
}

impl Location {
    /// Coordinate identity: two locations are the same place when both
    /// coordinates match exactly.
    pub fn same_place(&self, other: &Location) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }

    /// "Region, Country" suffix for display, whichever parts are present.
    pub fn region_label(&self) -> String {
        match (&self.admin1, &self.country) {
            (Some(admin1), Some(country)) => format!("{admin1}, {country}"),
            (Some(admin1), None) => admin1.clone(),
            (None, Some(country)) => country.clone(),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Celsius,
    Fahrenheit,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Celsius => "celsius",
            UnitSystem::Fahrenheit => "fahrenheit",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Celsius => UnitSystem::Fahrenheit,
            UnitSystem::Fahrenheit => UnitSystem::Celsius,
        }
    }

    pub fn degree_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Celsius => "°C",
            UnitSystem::Fahrenheit => "°F",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "celsius" => Ok(UnitSystem::Celsius),
            "fahrenheit" => Ok(UnitSystem::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: celsius, fahrenheit."
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub condition_code: i32,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub uv_index: f64,
    pub is_day: bool,
}

/// Hourly forecast as parallel sequences: index i across every field
/// refers to the same hour. Holds at most one day (24 entries).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlySeries {
    pub time: Vec<NaiveDateTime>,
    pub temperature: Vec<f64>,
    pub condition: Vec<i32>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Daily forecast as parallel sequences, one entry per day, in source
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySeries {
    pub date: Vec<NaiveDate>,
    pub temp_max: Vec<f64>,
    pub temp_min: Vec<f64>,
    pub condition: Vec<i32>,
    pub sunrise: Vec<NaiveDateTime>,
    pub sunset: Vec<NaiveDateTime>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
    }
}

/// One complete current/hourly/daily reading for a single location and
/// unit system. Produced atomically from one provider response; a new
/// fetch replaces the whole snapshot, it is never merged with the
/// previous one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    pub daily: DailySeries,
}

/// A snapshot paired with exactly the location it was fetched for. The
/// pairing is enforced by construction so the display can never show a
/// snapshot next to a different location's label.
#[derive(Debug, Clone)]
pub struct ActiveForecast {
    pub location: Location,
    pub snapshot: ForecastSnapshot,
}
