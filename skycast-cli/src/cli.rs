use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::time::Instant;

use skycast_core::{
    Config, Dashboard, FileStore, GeminiInsights, InsightGenerator, IpLocator, Location,
    NoInsights, OpenMeteoClient, SearchBox, UnitSystem, provider::Geocoder,
};

use crate::view;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "SkyCast weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive dashboard (the default when no command is given).
    Dashboard,

    /// Show the forecast for a place, or for the detected location.
    Show {
        /// Place name to look up; omit to use the device position.
        place: Option<String>,

        /// One-off unit override, "celsius" or "fahrenheit".
        #[arg(long)]
        unit: Option<String>,
    },

    /// Search for locations by name.
    Search {
        /// Partial place name, at least two characters.
        query: String,
    },

    /// Configure the AI summary provider.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or(Command::Dashboard) {
            Command::Dashboard => run_dashboard().await,
            Command::Show { place, unit } => run_show(place, unit).await,
            Command::Search { query } => run_search(&query).await,
            Command::Configure => run_configure(),
        }
    }
}

fn build_dashboard(config: &Config) -> Result<Dashboard> {
    let store = FileStore::open_default()?;

    let insights: Box<dyn InsightGenerator> = match config.insight_api_key() {
        Some(key) => Box::new(GeminiInsights::new(key.to_string())),
        None => Box::new(NoInsights),
    };

    let mut dashboard = Dashboard::new(
        Box::new(OpenMeteoClient::new()),
        insights,
        Box::new(store),
    );

    if let Some(fallback) = &config.fallback_location {
        dashboard = dashboard.with_fallback(fallback.clone());
    }

    Ok(dashboard)
}

async fn run_dashboard() -> Result<()> {
    let config = Config::load()?;
    let mut dashboard = build_dashboard(&config)?;
    let geocoder = OpenMeteoClient::new();

    dashboard.bootstrap(&IpLocator::new()).await;

    loop {
        view::render(dashboard.state());
        println!();

        let options = vec![
            "Search location",
            "Open favorite",
            "Toggle unit",
            "Toggle favorite",
            "Refresh",
            "Quit",
        ];

        let Ok(action) = Select::new("What next?", options).prompt() else {
            break;
        };

        match action {
            "Search location" => {
                if let Some(location) = prompt_search(&geocoder).await {
                    dashboard.select_location(location).await;
                }
            }
            "Open favorite" => {
                let favorites = dashboard.state().favorites.clone();
                if favorites.is_empty() {
                    println!("No saved locations yet.");
                    continue;
                }

                let labels: Vec<String> = favorites.iter().map(view::candidate_label).collect();
                if let Ok(choice) = Select::new("Saved locations:", labels.clone()).prompt() {
                    if let Some(idx) = labels.iter().position(|label| *label == choice) {
                        dashboard.select_location(favorites[idx].clone()).await;
                    }
                }
            }
            "Toggle unit" => dashboard.toggle_unit().await,
            "Toggle favorite" => {
                if dashboard.state().forecast.is_none() {
                    println!("Nothing to save yet.");
                    continue;
                }
                if dashboard.toggle_favorite() {
                    println!("Saved.");
                } else {
                    println!("Removed.");
                }
            }
            "Refresh" => {
                if let Some(active) = dashboard.state().forecast.clone() {
                    dashboard.select_location(active.location).await;
                }
            }
            _ => break,
        }
    }

    Ok(())
}

/// One pass through the debounced search controller: take a line of
/// input, wait out the window, offer the candidates.
async fn prompt_search(geocoder: &OpenMeteoClient) -> Option<Location> {
    let query = Text::new("Search for a city:").prompt().ok()?;

    let mut search = SearchBox::new();
    search.input(&query, Instant::now());
    search.settle(geocoder).await;

    if search.results().is_empty() {
        println!("No matches.");
        search.dismiss();
        return None;
    }

    let labels: Vec<String> = search.results().iter().map(view::candidate_label).collect();
    match Select::new("Pick a location:", labels.clone()).prompt() {
        Ok(choice) => {
            let idx = labels.iter().position(|label| *label == choice)?;
            search.select(idx)
        }
        Err(_) => {
            search.dismiss();
            None
        }
    }
}

async fn run_show(place: Option<String>, unit: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let mut dashboard = build_dashboard(&config)?;

    if let Some(unit) = unit {
        let wanted = UnitSystem::try_from(unit.as_str())?;
        if dashboard.state().unit != wanted {
            dashboard.toggle_unit().await;
        }
    }

    match place {
        Some(place) => {
            let geocoder = OpenMeteoClient::new();
            let mut results = geocoder.search_locations(&place).await;
            if results.is_empty() {
                bail!("No locations found for '{place}'.");
            }
            dashboard.select_location(results.remove(0)).await;
        }
        None => {
            dashboard.bootstrap(&IpLocator::new()).await;
        }
    }

    view::render(dashboard.state());
    Ok(())
}

async fn run_search(query: &str) -> Result<()> {
    let geocoder = OpenMeteoClient::new();
    let results = geocoder.search_locations(query).await;

    if results.is_empty() {
        println!("No locations found.");
        return Ok(());
    }

    for location in &results {
        println!(
            "{}  ({:.4}, {:.4})",
            view::candidate_label(location),
            location.latitude,
            location.longitude,
        );
    }

    Ok(())
}

fn run_configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("Gemini API key for AI summaries:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Configuration cancelled")?;

    if key.trim().is_empty() {
        bail!("API key must not be empty.");
    }

    config.set_insight_api_key(key.trim().to_string());
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}
