//! WMO weather-code interpretation.
//!
//! See: https://open-meteo.com/en/docs#weathervariables

/// Human label for a WMO weather code. Total over `i32`: undocumented
/// codes map to "Unknown".
pub fn describe_condition(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        _ => "Unknown",
    }
}

/// Emoji glyph for a WMO weather code. Buckets are inclusive upper
/// bounds checked in ascending order; night variants exist only for the
/// clear and partly-cloudy buckets.
pub fn icon_for(code: i32, is_day: bool) -> &'static str {
    match code {
        i32::MIN..=0 => {
            if is_day {
                "☀️"
            } else {
                "🌙"
            }
        }
        1..=3 => {
            if is_day {
                "⛅"
            } else {
                "☁️"
            }
        }
        4..=48 => "🌫️",
        49..=55 => "🌦️",
        56..=65 => "🌧️",
        66..=77 => "❄️",
        78..=82 => "🚿",
        95..=i32::MAX => "⛈️",
        _ => "🌡️",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sky_has_day_and_night_glyphs() {
        assert_eq!(icon_for(0, true), "☀️");
        assert_eq!(icon_for(0, false), "🌙");
    }

    #[test]
    fn partly_cloudy_bucket_is_distinct_from_clear() {
        for code in 1..=3 {
            assert_eq!(icon_for(code, true), "⛅");
            assert_eq!(icon_for(code, false), "☁️");
        }
    }

    #[test]
    fn remaining_buckets_ignore_time_of_day() {
        for (code, glyph) in [(45, "🌫️"), (55, "🌦️"), (63, "🌧️"), (75, "❄️"), (81, "🚿"), (95, "⛈️")] {
            assert_eq!(icon_for(code, true), glyph);
            assert_eq!(icon_for(code, false), glyph);
        }
    }

    #[test]
    fn bucket_upper_bounds_are_inclusive() {
        assert_eq!(icon_for(48, true), "🌫️");
        assert_eq!(icon_for(49, true), "🌦️");
        assert_eq!(icon_for(65, true), "🌧️");
        assert_eq!(icon_for(66, true), "❄️");
        assert_eq!(icon_for(82, true), "🚿");
    }

    #[test]
    fn codes_between_showers_and_thunder_use_generic_glyph() {
        for code in 83..95 {
            assert_eq!(icon_for(code, true), "🌡️");
        }
    }

    #[test]
    fn icon_is_total_over_out_of_range_codes() {
        assert_eq!(icon_for(-7, true), "☀️");
        assert_eq!(icon_for(-7, false), "🌙");
        assert_eq!(icon_for(i32::MAX, true), "⛈️");
    }

    #[test]
    fn labels_cover_documented_codes() {
        assert_eq!(describe_condition(0), "Clear sky");
        assert_eq!(describe_condition(2), "Partly cloudy");
        assert_eq!(describe_condition(48), "Depositing rime fog");
        assert_eq!(describe_condition(55), "Dense drizzle");
        assert_eq!(describe_condition(65), "Heavy rain");
        assert_eq!(describe_condition(77), "Snow grains");
        assert_eq!(describe_condition(82), "Violent rain showers");
        assert_eq!(describe_condition(95), "Thunderstorm");
    }

    #[test]
    fn unknown_codes_get_unknown_label() {
        assert_eq!(describe_condition(42), "Unknown");
        assert_eq!(describe_condition(-1), "Unknown");
        assert_eq!(describe_condition(1000), "Unknown");
    }
}
