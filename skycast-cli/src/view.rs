//! Plain-text rendering of the dashboard state.

use skycast_core::{ActiveForecast, DashboardState, Location, UnitSystem, icon_for};

const ANALYZING: &str = "Analyzing the atmosphere for you...";

pub fn render(state: &DashboardState) {
    if let Some(error) = &state.error {
        println!();
        println!("!! {error}");
    }

    let Some(active) = &state.forecast else {
        println!("No forecast loaded yet.");
        return;
    };

    let saved = state
        .favorites
        .iter()
        .any(|f| f.same_place(&active.location));

    render_forecast(active, state.unit, saved);

    println!();
    println!("SkyCast AI: {}", state.insight.as_deref().unwrap_or(ANALYZING));

    if !state.favorites.is_empty() {
        println!();
        println!("Saved locations:");
        for favorite in &state.favorites {
            println!("  {}", candidate_label(favorite));
        }
    }
}

fn render_forecast(active: &ActiveForecast, unit: UnitSystem, saved: bool) {
    let current = &active.snapshot.current;
    let suffix = unit.degree_suffix();
    let star = if saved { "  [saved]" } else { "" };

    println!();
    println!("== {} =={}", candidate_label(&active.location), star);
    println!(
        "  {:.0}{suffix}  {}  {}",
        current.temperature,
        icon_for(current.condition_code, current.is_day),
        current.condition,
    );
    println!(
        "  Humidity {}%  Wind {:.0} km/h  UV {:.1}",
        current.humidity_pct, current.wind_speed, current.uv_index,
    );

    let hourly = &active.snapshot.hourly;
    if !hourly.is_empty() {
        println!();
        println!("Hourly trend:");
        for i in (0..hourly.len()).step_by(3) {
            println!(
                "  {}  {:>4.0}{suffix}  {}",
                hourly.time[i].format("%H:%M"),
                hourly.temperature[i],
                icon_for(hourly.condition[i], true),
            );
        }
    }

    let daily = &active.snapshot.daily;
    if !daily.is_empty() {
        println!();
        println!("{}-day forecast:", daily.len());
        for i in 0..daily.len() {
            let day = if i == 0 {
                "Today".to_string()
            } else {
                daily.date[i].format("%a").to_string()
            };
            println!(
                "  {day:<6} {}  {:>4.0}{suffix} / {:.0}{suffix}",
                icon_for(daily.condition[i], true),
                daily.temp_max[i],
                daily.temp_min[i],
            );
        }

        println!();
        println!(
            "Sunrise {}  Sunset {}",
            daily.sunrise[0].format("%H:%M"),
            daily.sunset[0].format("%H:%M"),
        );
    }
}

/// "Name (Region, Country)" with whatever parts the location carries.
pub fn candidate_label(location: &Location) -> String {
    let region = location.region_label();
    if region.is_empty() {
        location.name.clone()
    } else {
        format!("{} ({region})", location.name)
    }
}
