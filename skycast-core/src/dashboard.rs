//! The single authoritative dashboard state and its transitions.
//!
//! Everything the display needs lives in one `DashboardState` record,
//! owned by the `Dashboard` controller and mutated only through its
//! methods. Selections carry monotonic tickets so a slow response for
//! an older selection can never overwrite a newer one.

use crate::{
    error::FetchError,
    insight::InsightGenerator,
    locate::DeviceLocator,
    model::{ActiveForecast, ForecastSnapshot, Location, UnitSystem},
    provider::ForecastProvider,
    store::{self, KeyValueStore},
};

/// The one message shown for any forecast failure. Callers cannot tell
/// "network down" from "provider error", and neither can the user.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load weather data. Please try again.";

/// Where the dashboard lands when device positioning fails.
pub fn default_fallback_location() -> Location {
    Location {
        name: "Cordova, Cebu".to_string(),
        latitude: 10.2505,
        longitude: 123.9492,
        country: Some("Philippines".to_string()),
        admin1: None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub forecast: Option<ActiveForecast>,
    pub unit: UnitSystem,
    pub favorites: Vec<Location>,
    pub insight: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Ticket for one in-flight location selection.
#[derive(Debug)]
pub struct Selection {
    location: Location,
    ticket: u64,
}

impl Selection {
    pub fn location(&self) -> &Location {
        &self.location
    }
}

#[derive(Debug)]
pub struct Dashboard {
    state: DashboardState,
    last_ticket: u64,
    fallback: Location,
    provider: Box<dyn ForecastProvider>,
    insights: Box<dyn InsightGenerator>,
    store: Box<dyn KeyValueStore>,
}

impl Dashboard {
    /// Build the controller, restoring the persisted unit preference
    /// and favorites.
    pub fn new(
        provider: Box<dyn ForecastProvider>,
        insights: Box<dyn InsightGenerator>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        let unit = store::load_unit(&*store);
        let favorites = store::load_favorites(&*store);

        Self {
            state: DashboardState {
                unit,
                favorites,
                ..DashboardState::default()
            },
            last_ticket: 0,
            fallback: default_fallback_location(),
            provider,
            insights,
            store,
        }
    }

    pub fn with_fallback(mut self, fallback: Location) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Start a selection: marks loading, clears any previous error and
    /// hands back the ticket the resolution must present.
    pub fn begin_selection(&mut self, location: Location) -> Selection {
        self.last_ticket += 1;
        self.state.loading = true;
        self.state.error = None;

        Selection {
            location,
            ticket: self.last_ticket,
        }
    }

    /// Resolve a selection. A resolution whose ticket is no longer the
    /// latest issued is discarded outright, success or not. Returns
    /// whether a new snapshot is now displayed.
    pub fn apply_forecast(
        &mut self,
        selection: Selection,
        result: Result<ForecastSnapshot, FetchError>,
    ) -> bool {
        if selection.ticket != self.last_ticket {
            tracing::debug!(
                "discarding stale forecast for '{}'",
                selection.location.name
            );
            return false;
        }

        self.state.loading = false;
        match result {
            Ok(snapshot) => {
                self.state.forecast = Some(ActiveForecast {
                    location: selection.location,
                    snapshot,
                });
                self.state.error = None;
                true
            }
            Err(e) => {
                tracing::warn!("forecast fetch failed: {e}");
                self.state.error = Some(LOAD_ERROR_MESSAGE.to_string());
                false
            }
        }
    }

    /// Fetch and display the forecast for `location` under the current
    /// unit, then refresh the summary. The previous snapshot stays on
    /// screen if the fetch fails.
    pub async fn select_location(&mut self, location: Location) -> bool {
        let selection = self.begin_selection(location.clone());
        let result = self
            .provider
            .fetch_weather(location.latitude, location.longitude, self.state.unit)
            .await;

        let applied = self.apply_forecast(selection, result);
        if applied {
            self.refresh_insight().await;
        }
        applied
    }

    /// Best-effort summary for the displayed forecast. The insight
    /// surface is infallible, so this can never disturb the forecast.
    pub async fn refresh_insight(&mut self) {
        if let Some(active) = &self.state.forecast {
            let text = self
                .insights
                .summarize(&active.location, &active.snapshot)
                .await;
            self.state.insight = Some(text);
        }
    }

    /// One best-effort positioning attempt, falling back to the fixed
    /// default location. No retry, no periodic re-check.
    pub async fn bootstrap(&mut self, locator: &dyn DeviceLocator) -> bool {
        let location = match locator.locate().await {
            Ok(location) => location,
            Err(e) => {
                tracing::debug!("device position unavailable, using fallback: {e}");
                self.fallback.clone()
            }
        };

        self.select_location(location).await
    }

    /// Flip the unit preference, persist it, and re-fetch the displayed
    /// location so the numbers come back in the new unit.
    pub async fn toggle_unit(&mut self) {
        self.state.unit = self.state.unit.toggled();
        if let Err(e) = store::save_unit(&*self.store, self.state.unit) {
            tracing::warn!("failed to persist unit preference: {e:#}");
        }

        if let Some(active) = self.state.forecast.clone() {
            self.select_location(active.location).await;
        }
    }

    pub fn is_favorite(&self) -> bool {
        match &self.state.forecast {
            Some(active) => self
                .state
                .favorites
                .iter()
                .any(|f| f.same_place(&active.location)),
            None => false,
        }
    }

    /// Add or remove the displayed location from the favorites,
    /// matching by coordinate identity, and persist the full list.
    /// Returns whether the location is now a favorite.
    pub fn toggle_favorite(&mut self) -> bool {
        let Some(active) = &self.state.forecast else {
            return false;
        };
        let location = active.location.clone();

        match self
            .state
            .favorites
            .iter()
            .position(|f| f.same_place(&location))
        {
            Some(idx) => {
                self.state.favorites.remove(idx);
            }
            None => self.state.favorites.push(location),
        }

        if let Err(e) = store::save_favorites(&*self.store, &self.state.favorites) {
            tracing::warn!("failed to persist favorites: {e:#}");
        }

        self.is_favorite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        insight::NoInsights,
        locate::LocateError,
        model::{CurrentConditions, DailySeries, HourlySeries},
        store::MemoryStore,
    };
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    fn loc(name: &str, lat: f64, lon: f64) -> Location {
        Location {
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            country: None,
            admin1: None,
        }
    }

    fn snapshot(code: i32, temperature: f64) -> ForecastSnapshot {
        ForecastSnapshot {
            current: CurrentConditions {
                temperature,
                condition_code: code,
                condition: crate::condition::describe_condition(code).to_string(),
                humidity_pct: 60,
                wind_speed: 8.0,
                uv_index: 4.0,
                is_day: true,
            },
            hourly: HourlySeries {
                time: Vec::new(),
                temperature: Vec::new(),
                condition: Vec::new(),
            },
            daily: DailySeries {
                date: Vec::new(),
                temp_max: Vec::new(),
                temp_min: Vec::new(),
                condition: Vec::new(),
                sunrise: Vec::new(),
                sunset: Vec::new(),
            },
        }
    }

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        calls: Mutex<Vec<(f64, f64, UnitSystem)>>,
        fail: Mutex<bool>,
    }

    impl ScriptedProvider {
        fn set_failing(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        fn calls(&self) -> Vec<(f64, f64, UnitSystem)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ForecastProvider for &ScriptedProvider {
        async fn fetch_weather(
            &self,
            latitude: f64,
            longitude: f64,
            unit: UnitSystem,
        ) -> Result<ForecastSnapshot, FetchError> {
            self.calls.lock().unwrap().push((latitude, longitude, unit));
            if *self.fail.lock().unwrap() {
                Err(FetchError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_string(),
                })
            } else {
                Ok(snapshot(0, 27.0))
            }
        }
    }

    fn dashboard(provider: &'static ScriptedProvider) -> Dashboard {
        Dashboard::new(
            Box::new(provider),
            Box::new(NoInsights),
            Box::new(MemoryStore::default()),
        )
    }

    fn leaked_provider() -> &'static ScriptedProvider {
        Box::leak(Box::new(ScriptedProvider::default()))
    }

    #[test]
    fn new_restores_persisted_preferences() {
        let store = MemoryStore::default();
        store::save_unit(&store, UnitSystem::Fahrenheit).unwrap();
        store::save_favorites(&store, &[loc("Cebu", 10.3, 123.9)]).unwrap();

        let provider = leaked_provider();
        let dash = Dashboard::new(Box::new(provider), Box::new(NoInsights), Box::new(store));

        assert_eq!(dash.state().unit, UnitSystem::Fahrenheit);
        assert_eq!(dash.state().favorites.len(), 1);
    }

    #[tokio::test]
    async fn select_location_pairs_snapshot_with_its_location() {
        let provider = leaked_provider();
        let mut dash = dashboard(provider);

        assert!(dash.select_location(loc("London", 51.5, -0.12)).await);

        let state = dash.state();
        let active = state.forecast.as_ref().expect("forecast displayed");
        assert_eq!(active.location.name, "London");
        assert_eq!(active.snapshot.current.condition, "Clear sky");
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert!(state.insight.is_some());
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_snapshot_and_sets_message() {
        let provider = leaked_provider();
        let mut dash = dashboard(provider);

        assert!(dash.select_location(loc("London", 51.5, -0.12)).await);

        provider.set_failing(true);
        assert!(!dash.select_location(loc("Paris", 48.86, 2.35)).await);

        let state = dash.state();
        assert_eq!(state.error.as_deref(), Some(LOAD_ERROR_MESSAGE));
        assert!(!state.loading);
        // The display must never show Paris's label over London's data:
        // the previous pair is left exactly as it was.
        let active = state.forecast.as_ref().expect("previous forecast kept");
        assert_eq!(active.location.name, "London");
    }

    #[test]
    fn slower_older_selection_cannot_win() {
        let provider = leaked_provider();
        let mut dash = dashboard(provider);

        let older = dash.begin_selection(loc("A", 1.0, 1.0));
        let newer = dash.begin_selection(loc("B", 2.0, 2.0));

        // B resolves first, then A's slow response arrives.
        assert!(dash.apply_forecast(newer, Ok(snapshot(0, 20.0))));
        assert!(!dash.apply_forecast(older, Ok(snapshot(61, 12.0))));

        let active = dash.state().forecast.as_ref().expect("forecast displayed");
        assert_eq!(active.location.name, "B");
        assert_eq!(active.snapshot.current.condition_code, 0);
    }

    #[test]
    fn stale_failure_does_not_raise_error() {
        let provider = leaked_provider();
        let mut dash = dashboard(provider);

        let older = dash.begin_selection(loc("A", 1.0, 1.0));
        let newer = dash.begin_selection(loc("B", 2.0, 2.0));

        assert!(dash.apply_forecast(newer, Ok(snapshot(0, 20.0))));
        let failure = Err(FetchError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        });
        assert!(!dash.apply_forecast(older, failure));
        assert_eq!(dash.state().error, None);
    }

    #[tokio::test]
    async fn toggle_unit_persists_and_refetches_current_location() {
        let store = std::sync::Arc::new(MemoryStore::default());
        let provider = leaked_provider();
        let mut dash = Dashboard::new(
            Box::new(provider),
            Box::new(NoInsights),
            Box::new(store.clone()),
        );

        dash.select_location(loc("London", 51.5, -0.12)).await;
        dash.toggle_unit().await;

        assert_eq!(dash.state().unit, UnitSystem::Fahrenheit);
        assert_eq!(store::load_unit(&*store), UnitSystem::Fahrenheit);

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].2, UnitSystem::Fahrenheit);
    }

    #[tokio::test]
    async fn toggle_unit_without_selection_does_not_fetch() {
        let provider = leaked_provider();
        let mut dash = dashboard(provider);

        dash.toggle_unit().await;
        assert_eq!(dash.state().unit, UnitSystem::Fahrenheit);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn favorite_round_trip_restores_prior_order() {
        let store = std::sync::Arc::new(MemoryStore::default());
        store::save_favorites(
            &*store,
            &[loc("Cebu", 10.3, 123.9), loc("Tokyo", 35.7, 139.7)],
        )
        .unwrap();

        let provider = leaked_provider();
        let mut dash = Dashboard::new(
            Box::new(provider),
            Box::new(NoInsights),
            Box::new(store.clone()),
        );

        dash.select_location(loc("London", 51.5, -0.12)).await;
        assert!(!dash.is_favorite());

        assert!(dash.toggle_favorite());
        let names: Vec<_> = dash.state().favorites.iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["Cebu", "Tokyo", "London"]);

        assert!(!dash.toggle_favorite());
        let names: Vec<_> = dash.state().favorites.iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["Cebu", "Tokyo"]);

        let persisted = store::load_favorites(&*store);
        assert_eq!(persisted.len(), 2);
    }

    #[tokio::test]
    async fn favorite_matching_uses_coordinates_not_names() {
        let provider = leaked_provider();
        let mut dash = dashboard(provider);

        dash.select_location(loc("Current Location", 51.5, -0.12)).await;
        dash.toggle_favorite();

        // Same place found by search under its real name.
        dash.select_location(loc("London", 51.5, -0.12)).await;
        assert!(dash.is_favorite());
    }

    #[derive(Debug)]
    struct NoPosition;

    #[async_trait]
    impl DeviceLocator for NoPosition {
        async fn locate(&self) -> Result<Location, LocateError> {
            Err(LocateError::Unresolved)
        }
    }

    #[derive(Debug)]
    struct FixedPosition(f64, f64);

    #[async_trait]
    impl DeviceLocator for FixedPosition {
        async fn locate(&self) -> Result<Location, LocateError> {
            Ok(Location {
                name: crate::locate::CURRENT_LOCATION_NAME.to_string(),
                latitude: self.0,
                longitude: self.1,
                country: None,
                admin1: None,
            })
        }
    }

    #[tokio::test]
    async fn bootstrap_uses_device_position_when_available() {
        let provider = leaked_provider();
        let mut dash = dashboard(provider);

        assert!(dash.bootstrap(&FixedPosition(47.6, -122.3)).await);

        let active = dash.state().forecast.as_ref().expect("forecast displayed");
        assert_eq!(active.location.name, "Current Location");
        assert_eq!(provider.calls()[0].0, 47.6);
    }

    #[tokio::test]
    async fn bootstrap_falls_back_when_positioning_fails() {
        let provider = leaked_provider();
        let mut dash = dashboard(provider);

        assert!(dash.bootstrap(&NoPosition).await);

        let active = dash.state().forecast.as_ref().expect("forecast displayed");
        assert_eq!(active.location.name, "Cordova, Cebu");
        assert_eq!(provider.calls()[0].0, 10.2505);
    }
}
